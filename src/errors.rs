// Error types for the client ledger core
use std::fmt;

#[derive(Debug, Clone)]
pub enum LedgerError {
    // Validation errors
    ValidationError(String),
    InvalidAmount(String),
    InvalidIdentity(String),

    // Lookup errors
    ClientLedgerNotFound(String),

    // Store errors
    ConflictRetryExhausted { ledger_id: String, attempts: u32 },
    StoreUnavailable(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation failed: {}", msg),
            Self::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            Self::InvalidIdentity(msg) => write!(f, "Invalid identity: {}", msg),
            Self::ClientLedgerNotFound(id) => write!(f, "Client ledger {} not found", id),
            Self::ConflictRetryExhausted { ledger_id, attempts } => {
                write!(f, "Update of ledger {} still conflicting after {} attempts", ledger_id, attempts)
            }
            Self::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        // A document that fails to decode is a store-side fault, never
        // the caller's.
        Self::StoreUnavailable(format!("document decode failed: {}", err))
    }
}

// Error code mapping for API responses
impl LedgerError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidIdentity(_) => "INVALID_IDENTITY",
            Self::ClientLedgerNotFound(_) => "CLIENT_LEDGER_NOT_FOUND",
            Self::ConflictRetryExhausted { .. } => "CONFLICT_RETRY_EXHAUSTED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidAmount(_) | Self::InvalidIdentity(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConflictRetryExhausted { .. } | Self::StoreUnavailable(_))
    }
}
