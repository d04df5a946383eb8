use std::cell::Cell;
use std::path::Path;

use chrono::Utc;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};

use crate::errors::LedgerError;
use crate::models::{ClientLedger, LedgerTransaction, TransactionEntry, TxnKind};

const LEDGERS_TREE: &str = "client_ledgers";
const TXNS_TREE: &str = "ledger_txns";

/// How many times a conflicting read-modify-write is re-run before the
/// append gives up.
const MAX_TXN_ATTEMPTS: u32 = 16;

/// Keyed document store for ledgers and their per-client transaction
/// sub-logs, on top of sled.
///
/// Layout:
/// - `client_ledgers`: ledger id -> JSON `ClientLedger`
/// - `ledger_txns`: `{ledger_id}/{seq:020}` -> JSON `LedgerTransaction`
///
/// The zero-padded `seq` keeps each sub-log prefix-scannable in
/// insertion order. Ledger ids never contain `/` (digits or `cl-` hex),
/// so one ledger's prefix can never shadow another's.
pub struct LedgerStore {
    db: Db,
    ledgers: Tree,
    txns: Tree,
}

impl LedgerStore {
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        Self::from_db(sled::open(path)?)
    }

    /// Wrap an already opened database. Lets callers (and tests) own the
    /// sled handle.
    pub fn from_db(db: Db) -> Result<Self, LedgerError> {
        let ledgers = db.open_tree(LEDGERS_TREE)?;
        let txns = db.open_tree(TXNS_TREE)?;
        Ok(Self { db, ledgers, txns })
    }

    /// Store-assigned monotonic id source.
    pub fn next_id(&self) -> Result<u64, LedgerError> {
        Ok(self.db.generate_id()?)
    }

    pub fn get_ledger(&self, id: &str) -> Result<Option<ClientLedger>, LedgerError> {
        match self.ledgers.get(id.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Unconditional insert. Only used with freshly generated ids.
    pub fn insert_ledger(&self, ledger: &ClientLedger) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec(ledger)?;
        self.ledgers.insert(ledger.id.as_bytes(), bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Create-if-absent. Returns false when another writer got there
    /// first; the existing document is left untouched.
    pub fn insert_ledger_if_absent(&self, ledger: &ClientLedger) -> Result<bool, LedgerError> {
        let bytes = serde_json::to_vec(ledger)?;
        let swapped = self
            .ledgers
            .compare_and_swap(ledger.id.as_bytes(), None as Option<&[u8]>, Some(bytes))?;
        if swapped.is_ok() {
            self.db.flush()?;
        }
        Ok(swapped.is_ok())
    }

    pub fn list_ledgers(&self) -> Result<Vec<ClientLedger>, LedgerError> {
        let mut out = Vec::new();
        for item in self.ledgers.iter() {
            let (_, raw) = item?;
            out.push(serde_json::from_slice(&raw)?);
        }
        Ok(out)
    }

    /// Per-client sub-log in insertion (seq) order.
    pub fn list_transactions(&self, ledger_id: &str) -> Result<Vec<LedgerTransaction>, LedgerError> {
        let prefix = format!("{}/", ledger_id);
        let mut out = Vec::new();
        for item in self.txns.scan_prefix(prefix.as_bytes()) {
            let (_, raw) = item?;
            out.push(serde_json::from_slice(&raw)?);
        }
        Ok(out)
    }

    /// The ledger update protocol: append one transaction and recompute
    /// the cached aggregates as a single atomic unit.
    ///
    /// The closure re-reads the ledger on every run, so a concurrent
    /// append that commits first is picked up on the retry instead of
    /// being overwritten. Either both writes commit or neither does.
    pub fn append_transaction(
        &self,
        ledger_id: &str,
        entry: &TransactionEntry,
    ) -> Result<LedgerTransaction, LedgerError> {
        let seq = self.next_id()?;
        let txn = LedgerTransaction {
            id: format!("{:020}", seq),
            seq,
            kind: entry.kind,
            amount: entry.amount,
            description: entry.description.trim().to_string(),
            date: entry.date,
            created_at: Utc::now(),
        };
        let txn_key = format!("{}/{:020}", ledger_id, seq);
        let txn_bytes = serde_json::to_vec(&txn)?;
        let updated_at = txn.created_at;

        let attempts = Cell::new(0u32);
        let result = (&self.ledgers, &self.txns).transaction(|(ledgers, txns)| {
            if attempts.get() >= MAX_TXN_ATTEMPTS {
                return Err(ConflictableTransactionError::Abort(
                    LedgerError::ConflictRetryExhausted {
                        ledger_id: ledger_id.to_string(),
                        attempts: attempts.get(),
                    },
                ));
            }
            attempts.set(attempts.get() + 1);

            // (a) latest aggregates, inside the transaction
            let raw = ledgers.get(ledger_id.as_bytes())?.ok_or_else(|| {
                ConflictableTransactionError::Abort(LedgerError::ClientLedgerNotFound(
                    ledger_id.to_string(),
                ))
            })?;
            let mut ledger: ClientLedger = serde_json::from_slice(&raw)
                .map_err(|e| ConflictableTransactionError::Abort(LedgerError::from(e)))?;

            // (b) recompute
            match entry.kind {
                TxnKind::Total => ledger.total_amount += entry.amount,
                TxnKind::Received => ledger.received_amount += entry.amount,
            }
            ledger.balance = ledger.total_amount - ledger.received_amount;
            ledger.updated_at = updated_at;

            let ledger_bytes = serde_json::to_vec(&ledger)
                .map_err(|e| ConflictableTransactionError::Abort(LedgerError::from(e)))?;

            // (c) + (d) commit together or not at all
            txns.insert(txn_key.as_bytes(), txn_bytes.as_slice())?;
            ledgers.insert(ledger_id.as_bytes(), ledger_bytes)?;
            Ok(())
        });

        match result {
            Ok(()) => {
                self.db.flush()?;
                Ok(txn)
            }
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(LedgerError::StoreUnavailable(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn open_store() -> (LedgerStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn entry(kind: TxnKind, amount: i64) -> TransactionEntry {
        TransactionEntry::new(kind, Decimal::new(amount, 0), "tour booking", Utc::now())
    }

    #[test]
    fn test_append_updates_aggregates() {
        let (store, _dir) = open_store();
        let ledger = ClientLedger::new("03037255114".into(), "Ali".into(), "03037255114".into());
        store.insert_ledger(&ledger).unwrap();

        store.append_transaction("03037255114", &entry(TxnKind::Total, 1000)).unwrap();
        store.append_transaction("03037255114", &entry(TxnKind::Received, 400)).unwrap();

        let after = store.get_ledger("03037255114").unwrap().unwrap();
        assert_eq!(after.total_amount, Decimal::new(1000, 0));
        assert_eq!(after.received_amount, Decimal::new(400, 0));
        assert_eq!(after.balance, Decimal::new(600, 0));
        assert_eq!(store.list_transactions("03037255114").unwrap().len(), 2);
    }

    #[test]
    fn test_append_to_missing_ledger_leaves_no_transaction() {
        let (store, _dir) = open_store();
        let err = store.append_transaction("0000000", &entry(TxnKind::Total, 10)).unwrap_err();
        assert!(matches!(err, LedgerError::ClientLedgerNotFound(_)));
        assert!(store.list_transactions("0000000").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_document_aborts_whole_unit() {
        let dir = TempDir::new().unwrap();
        let db = sled::open(dir.path()).unwrap();
        // Plant a document that cannot decode, through a raw handle.
        db.open_tree(LEDGERS_TREE).unwrap().insert(b"0301", b"not json").unwrap();

        let store = LedgerStore::from_db(db).unwrap();
        let err = store.append_transaction("0301", &entry(TxnKind::Total, 10)).unwrap_err();
        assert!(matches!(err, LedgerError::StoreUnavailable(_)));
        // Neither half of the pair is visible.
        assert!(store.list_transactions("0301").unwrap().is_empty());
        assert_eq!(&store.ledgers.get(b"0301").unwrap().unwrap()[..], b"not json");
    }

    #[test]
    fn test_if_absent_never_overwrites() {
        let (store, _dir) = open_store();
        let first = ClientLedger::new("0300".into(), "First".into(), "0300".into());
        let second = ClientLedger::new("0300".into(), "Second".into(), "0300".into());

        assert!(store.insert_ledger_if_absent(&first).unwrap());
        assert!(!store.insert_ledger_if_absent(&second).unwrap());
        assert_eq!(store.get_ledger("0300").unwrap().unwrap().name, "First");
    }

    #[test]
    fn test_sub_logs_are_isolated_per_client() {
        let (store, _dir) = open_store();
        for id in ["111", "1112"] {
            let ledger = ClientLedger::new(id.into(), "C".into(), id.into());
            store.insert_ledger(&ledger).unwrap();
            store.append_transaction(id, &entry(TxnKind::Total, 50)).unwrap();
        }
        // "111/" must not pick up "1112/" keys.
        assert_eq!(store.list_transactions("111").unwrap().len(), 1);
        assert_eq!(store.list_transactions("1112").unwrap().len(), 1);
    }
}
