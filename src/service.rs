use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::directory::ClientDirectory;
use crate::errors::LedgerError;
use crate::models::{
    is_placeholder_name, normalize_phone, ClientLedger, IdentityHint, LedgerTransaction,
    NewClientLedger, TransactionEntry, TxnKind,
};
use crate::store::LedgerStore;
use crate::validator::{validate_entry, validate_new_ledger};

/// Facade over the ledger store and the injected client directory.
///
/// All aggregate mutation goes through [`append_transaction`]; every
/// other operation is read-only against the store.
///
/// [`append_transaction`]: LedgerService::append_transaction
pub struct LedgerService {
    store: Arc<LedgerStore>,
    directory: Arc<dyn ClientDirectory>,
}

impl LedgerService {
    pub fn new(store: Arc<LedgerStore>, directory: Arc<dyn ClientDirectory>) -> Self {
        Self { store, directory }
    }

    /// Append one transaction to an existing ledger and fold it into the
    /// cached aggregates, atomically. The ledger must already exist;
    /// creation belongs to [`resolve_or_create`] or [`create_ledger`].
    ///
    /// [`resolve_or_create`]: LedgerService::resolve_or_create
    /// [`create_ledger`]: LedgerService::create_ledger
    pub async fn append_transaction(
        &self,
        ledger_id: &str,
        entry: TransactionEntry,
    ) -> Result<(), LedgerError> {
        validate_entry(&entry)?;
        let txn = self.store.append_transaction(ledger_id, &entry)?;
        log::info!(
            "ledger {}: appended {} {} (txn {})",
            ledger_id,
            entry.kind.as_str(),
            entry.amount,
            txn.id
        );
        Ok(())
    }

    /// Resolve a ledger by phone number, creating it on first contact.
    ///
    /// Idempotent: repeated calls with the same number (any formatting)
    /// return the one existing record and never overwrite its fields.
    pub async fn resolve_or_create(&self, hint: IdentityHint) -> Result<ClientLedger, LedgerError> {
        let phone = normalize_phone(&hint.phone)?;

        if let Some(existing) = self.store.get_ledger(&phone)? {
            return Ok(existing);
        }

        let name = self.resolve_display_name(&phone, hint.name.as_deref()).await;

        let mut ledger = ClientLedger::new(phone.clone(), name, phone.clone());
        ledger.email = hint.email.unwrap_or_default();
        ledger.notes = hint.notes.unwrap_or_default();
        ledger.original_client_id = hint.original_client_id;

        if self.store.insert_ledger_if_absent(&ledger)? {
            log::info!("materialized ledger {} ({})", ledger.id, ledger.name);
            return Ok(ledger);
        }

        // Lost the creation race; the winner's record stands.
        self.store
            .get_ledger(&phone)?
            .ok_or_else(|| LedgerError::StoreUnavailable(format!("ledger {} vanished after create race", phone)))
    }

    /// Best display name: a real supplied name wins, placeholders go to
    /// the directory, and `"Client {phone}"` covers everything else.
    async fn resolve_display_name(&self, phone: &str, supplied: Option<&str>) -> String {
        let mut name = supplied.unwrap_or_default().trim().to_string();

        if is_placeholder_name(&name) {
            match self.directory.get_by_phone(phone).await {
                Ok(Some(client)) if !client.name.trim().is_empty() => {
                    name = client.name.trim().to_string();
                }
                Ok(_) => {}
                Err(e) => {
                    // Name backfill is best-effort; the ledger is still
                    // created.
                    log::warn!("client directory lookup failed for {}: {}", phone, e);
                }
            }
        }

        if is_placeholder_name(&name) {
            name = format!("Client {}", phone);
        }
        name
    }

    /// Direct creation with an optional opening balance. The opening
    /// charge is appended as a separate step after the record exists;
    /// if it fails the zero-aggregate record remains and the error
    /// propagates.
    pub async fn create_ledger(&self, data: NewClientLedger) -> Result<String, LedgerError> {
        validate_new_ledger(&data)?;
        let phone = normalize_phone(&data.phone)
            .map_err(|_| LedgerError::ValidationError("phone number contains no digits".to_string()))?;

        let id = format!("cl-{:016x}", self.store.next_id()?);
        let mut ledger = ClientLedger::new(id.clone(), data.name.trim().to_string(), phone);
        ledger.notes = data.notes;
        self.store.insert_ledger(&ledger)?;
        log::info!("created ledger {} ({})", id, ledger.name);

        if let Some(initial) = data.initial_amount {
            if initial > Decimal::ZERO {
                let description = data
                    .initial_description
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| "Initial balance".to_string());
                let entry = TransactionEntry::new(TxnKind::Total, initial, &description, Utc::now());
                self.append_transaction(&id, entry).await?;
            }
        }

        Ok(id)
    }

    pub async fn get_by_id(&self, ledger_id: &str) -> Result<ClientLedger, LedgerError> {
        self.store
            .get_ledger(ledger_id)?
            .ok_or_else(|| LedgerError::ClientLedgerNotFound(ledger_id.to_string()))
    }

    /// Alternate lookup by phone, covering ledgers whose id is not the
    /// phone number (direct creation path).
    pub async fn get_by_phone(&self, phone: &str) -> Result<Option<ClientLedger>, LedgerError> {
        let phone = normalize_phone(phone)?;
        if let Some(found) = self.store.get_ledger(&phone)? {
            return Ok(Some(found));
        }
        let all = self.store.list_ledgers()?;
        Ok(all.into_iter().find(|l| l.phone == phone))
    }

    /// All ledgers, ordered by display name.
    pub async fn list_all(&self) -> Result<Vec<ClientLedger>, LedgerError> {
        let mut ledgers = self.store.list_ledgers()?;
        ledgers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(ledgers)
    }

    /// Operator search: case-insensitive substring on name, substring on
    /// phone. Full scan; there is no server-side text index at this
    /// scale.
    pub async fn find_by_free_text(&self, term: &str) -> Result<Vec<ClientLedger>, LedgerError> {
        let needle = term.trim().to_lowercase();
        let mut hits: Vec<ClientLedger> = self
            .store
            .list_ledgers()?
            .into_iter()
            .filter(|l| l.name.to_lowercase().contains(&needle) || l.phone.contains(&needle))
            .collect();
        hits.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(hits)
    }

    /// Full transaction log for one client, newest first.
    pub async fn list_transactions(
        &self,
        ledger_id: &str,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        let mut txns = self.store.list_transactions(ledger_id)?;
        txns.sort_by(|a, b| b.date.cmp(&a.date).then(b.seq.cmp(&a.seq)));
        Ok(txns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::NullDirectory;
    use tempfile::TempDir;

    fn service() -> (LedgerService, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LedgerStore::open(dir.path()).unwrap());
        (LedgerService::new(store, Arc::new(NullDirectory)), dir)
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_generic_name() {
        let (svc, _dir) = service();
        let ledger = svc
            .resolve_or_create(IdentityHint::from_phone("0303-7255114"))
            .await
            .unwrap();
        assert_eq!(ledger.id, "03037255114");
        assert_eq!(ledger.name, "Client 03037255114");
        assert_eq!(ledger.balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_resolve_keeps_supplied_real_name() {
        let (svc, _dir) = service();
        let mut hint = IdentityHint::from_phone("03001112223");
        hint.name = Some("Bilal Travels".into());
        let ledger = svc.resolve_or_create(hint).await.unwrap();
        assert_eq!(ledger.name, "Bilal Travels");
    }

    #[tokio::test]
    async fn test_create_ledger_ids_are_disjoint_from_phones() {
        let (svc, _dir) = service();
        let id = svc
            .create_ledger(NewClientLedger {
                name: "Ali".into(),
                phone: "0300-1234567".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(id.starts_with("cl-"));

        let ledger = svc.get_by_id(&id).await.unwrap();
        assert_eq!(ledger.phone, "03001234567");
        // Still findable via the phone index path.
        let by_phone = svc.get_by_phone("0300 1234567").await.unwrap().unwrap();
        assert_eq!(by_phone.id, id);
    }
}
