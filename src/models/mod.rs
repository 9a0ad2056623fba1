//! Contains the domain model types for the application.

mod transaction;

pub use transaction::{NewTransaction, Transaction, TransactionType};

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
