use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One ledger record per client.
///
/// `total_amount`, `received_amount` and `balance` are cached aggregates
/// over the client's transaction log. They are only ever rewritten by the
/// atomic append protocol, so `balance == total_amount - received_amount`
/// holds after every committed update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLedger {
    /// Normalized phone number for materialized ledgers, `cl-` prefixed
    /// store id for directly created ones.
    pub id: String,
    pub name: String,
    /// Digits-only phone number, alternate lookup key.
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub notes: String,
    pub total_amount: Decimal,
    pub received_amount: Decimal,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Back-reference to the client-directory record this ledger was
    /// materialized from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_client_id: Option<String>,
}

impl ClientLedger {
    /// Fresh record with zeroed aggregates.
    pub fn new(id: String, name: String, phone: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            phone,
            email: String::new(),
            notes: String::new(),
            total_amount: Decimal::ZERO,
            received_amount: Decimal::ZERO,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
            original_client_id: None,
        }
    }
}

/// Input for the direct creation path (§ add-client form).
#[derive(Debug, Clone, Default)]
pub struct NewClientLedger {
    pub name: String,
    pub phone: String,
    pub notes: String,
    pub initial_amount: Option<Decimal>,
    pub initial_description: Option<String>,
}
