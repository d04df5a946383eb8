//! Read-side running-balance view of a client's transaction log.
//!
//! Pure: same input, same output, no store access. The caller hands in
//! the fully materialized log.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{LedgerTransaction, TxnKind};

/// A transaction annotated with the balance after it, in chronological
/// order of computation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedTransaction {
    #[serde(flatten)]
    pub txn: LedgerTransaction,
    pub running_balance: Decimal,
}

/// Display classification of a running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    Due,
    Overpaid,
}

impl BalanceStatus {
    /// Positive means the client still owes. Zero counts as overpaid,
    /// matching the comparison the ledger screen has always used.
    pub fn classify(running_balance: Decimal) -> Self {
        if running_balance > Decimal::ZERO {
            Self::Due
        } else {
            Self::Overpaid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Due => "Due",
            Self::Overpaid => "Overpaid",
        }
    }
}

/// Annotate each transaction with the balance after applying it in
/// business-date order (ties broken by insertion seq), then flip to
/// newest-first for display.
pub fn project(mut transactions: Vec<LedgerTransaction>) -> Vec<ProjectedTransaction> {
    transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.seq.cmp(&b.seq)));

    let mut running = Decimal::ZERO;
    let mut annotated: Vec<ProjectedTransaction> = transactions
        .into_iter()
        .map(|txn| {
            match txn.kind {
                TxnKind::Total => running += txn.amount,
                TxnKind::Received => running -= txn.amount,
            }
            ProjectedTransaction { txn, running_balance: running }
        })
        .collect();

    annotated.reverse();
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn txn(seq: u64, kind: TxnKind, amount: i64, day: u32) -> LedgerTransaction {
        LedgerTransaction {
            id: format!("{:020}", seq),
            seq,
            kind,
            amount: Decimal::new(amount, 0),
            description: "txn".into(),
            date: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_running_balance_newest_first() {
        // Charged 1000 Jan 1, paid 400 Jan 5, charged 200 Jan 10.
        let log = vec![
            txn(3, TxnKind::Total, 200, 10),
            txn(1, TxnKind::Total, 1000, 1),
            txn(2, TxnKind::Received, 400, 5),
        ];
        let view = project(log);

        let balances: Vec<Decimal> = view.iter().map(|p| p.running_balance).collect();
        assert_eq!(
            balances,
            vec![Decimal::new(800, 0), Decimal::new(600, 0), Decimal::new(1000, 0)]
        );
        assert_eq!(view[0].txn.amount, Decimal::new(200, 0));
        assert_eq!(view[2].txn.amount, Decimal::new(1000, 0));
    }

    #[test]
    fn test_same_date_ordered_by_seq() {
        let log = vec![
            txn(2, TxnKind::Received, 300, 1),
            txn(1, TxnKind::Total, 300, 1),
        ];
        let view = project(log);
        // Chronologically: +300 then -300; newest-first shows the
        // payment on top.
        assert_eq!(view[0].txn.seq, 2);
        assert_eq!(view[0].running_balance, Decimal::ZERO);
        assert_eq!(view[1].running_balance, Decimal::new(300, 0));
    }

    #[test]
    fn test_projection_is_stable() {
        let log = vec![
            txn(1, TxnKind::Total, 500, 1),
            txn(2, TxnKind::Received, 100, 2),
        ];
        let a = project(log.clone());
        let b = project(log);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.txn.seq, y.txn.seq);
            assert_eq!(x.running_balance, y.running_balance);
        }
    }

    #[test]
    fn test_empty_log() {
        assert!(project(Vec::new()).is_empty());
    }

    #[test]
    fn test_status_boundary_at_zero() {
        assert_eq!(BalanceStatus::classify(Decimal::new(1, 0)), BalanceStatus::Due);
        // Exactly settled still renders as Overpaid; kept as-is.
        assert_eq!(BalanceStatus::classify(Decimal::ZERO), BalanceStatus::Overpaid);
        assert_eq!(BalanceStatus::classify(Decimal::new(-50, 0)), BalanceStatus::Overpaid);
    }
}
