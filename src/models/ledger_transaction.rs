use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction kind. Closed enumeration: a ledger entry is either a
/// charge against the client (`total`) or a payment from them
/// (`received`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Total,
    Received,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Received => "received",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "total" => Some(Self::Total),
            "received" => Some(Self::Received),
            _ => None,
        }
    }
}

/// Immutable entry in a client's transaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    pub id: String,
    /// Store-assigned, strictly increasing across the database. Fixes
    /// the ordering of same-date entries in the projection.
    pub seq: u64,
    #[serde(rename = "type")]
    pub kind: TxnKind,
    pub amount: Decimal,
    pub description: String,
    /// Business date; may differ from `created_at` (insertion time).
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Caller input for the append protocol.
#[derive(Debug, Clone)]
pub struct TransactionEntry {
    pub kind: TxnKind,
    pub amount: Decimal,
    pub description: String,
    pub date: DateTime<Utc>,
}

impl TransactionEntry {
    pub fn new(kind: TxnKind, amount: Decimal, description: &str, date: DateTime<Utc>) -> Self {
        Self { kind, amount, description: description.to_string(), date }
    }
}
