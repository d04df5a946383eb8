use rust_decimal::Decimal;

use crate::errors::LedgerError;
use crate::models::{NewClientLedger, TransactionEntry};

/// Validate a transaction entry before it reaches the store.
pub fn validate_entry(entry: &TransactionEntry) -> Result<(), LedgerError> {
    // 1. Amount must be strictly positive
    if entry.amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "amount must be a positive number, got {}",
            entry.amount
        )));
    }

    // 2. Description must carry content
    if entry.description.trim().is_empty() {
        return Err(LedgerError::ValidationError("description is required".to_string()));
    }

    Ok(())
}

/// Validate the direct-creation form input.
pub fn validate_new_ledger(data: &NewClientLedger) -> Result<(), LedgerError> {
    if data.name.trim().is_empty() {
        return Err(LedgerError::ValidationError("name is required".to_string()));
    }
    if data.phone.trim().is_empty() {
        return Err(LedgerError::ValidationError("phone is required".to_string()));
    }
    if let Some(initial) = data.initial_amount {
        if initial < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "initial amount must not be negative, got {}",
                initial
            )));
        }
    }
    Ok(())
}
