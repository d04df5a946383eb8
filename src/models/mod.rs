pub use client_ledger::*;
pub use identity::*;
pub use ledger_transaction::*;

pub mod client_ledger;
pub mod identity;
pub mod ledger_transaction;
