//! Defines the transaction store trait.

use time::Month;

use crate::{
    Error,
    models::{DatabaseID, NewTransaction, Transaction, TransactionType},
};

/// Handles the creation, retrieval, update and deletion of a user's
/// transactions.
///
/// The store is the sole authority for ID assignment: IDs are sequential
/// per user, strictly increasing and never reused, even after deletions.
pub trait TransactionStore {
    /// Create a new transaction for the user `username`.
    ///
    /// Assigns the next sequential ID for that user and returns the stored
    /// transaction. The user must have been created first, see
    /// [UserStore::create](crate::stores::UserStore::create).
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UserNotFound] if `username` has not been created,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn add(
        &mut self,
        username: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, Error>;

    /// Retrieve the transactions of `username` that match `query`, in
    /// ascending ID order.
    ///
    /// An empty vector is a valid, successful answer, never an error.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UserNotFound] if `username` has not been created,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_query(
        &self,
        username: &str,
        query: TransactionQuery,
    ) -> Result<Vec<Transaction>, Error>;

    /// Replace all field values of the transaction `id` of `username`. The
    /// ID itself is unchanged.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UserNotFound] if `username` has not been created,
    /// - [Error::UpdateMissingTransaction] if `id` does not refer to one of
    ///   the user's transactions,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        username: &str,
        id: DatabaseID,
        new_transaction: NewTransaction,
    ) -> Result<(), Error>;

    /// Remove the transaction `id` of `username` if it is present.
    ///
    /// Deleting an ID that is not in the store is a no-op, not an error.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UserNotFound] if `username` has not been created,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, username: &str, id: DatabaseID) -> Result<(), Error>;
}

/// Defines how transactions should be fetched from
/// [TransactionStore::get_query].
///
/// The default query matches every transaction. Each filter narrows the
/// result; filters compose with AND semantics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionQuery {
    /// Include transactions whose category equals this string exactly
    /// (case- and accent-sensitive).
    pub category: Option<String>,
    /// Include transactions of this type only.
    pub transaction_type: Option<TransactionType>,
    /// Include transactions whose date falls within this calendar month,
    /// inclusive of both endpoints.
    pub month: Option<MonthFilter>,
}

/// A calendar month of a specific year.
///
/// Using [time::Month] makes out-of-range month numbers unrepresentable;
/// request handlers validate the raw number before building this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthFilter {
    /// The calendar year.
    pub year: i32,
    /// The month within `year`.
    pub month: Month,
}
