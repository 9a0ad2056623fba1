//! Defines the user store trait.

use crate::Error;

/// The outcome of creating a user.
///
/// Creating a user that already exists is a benign signal rather than an
/// error, so callers can treat repeated creation as idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCreation {
    /// The user did not exist before and was created.
    Created,
    /// The user already existed; nothing was changed.
    AlreadyExists,
}

/// Handles the creation and lookup of users.
///
/// Each user owns an isolated set of transactions, see
/// [TransactionStore](crate::stores::TransactionStore). A user must be
/// created before any transaction operation against it is accepted.
pub trait UserStore {
    /// Create the user `username` if it does not exist yet.
    ///
    /// # Errors
    /// Returns an [Error::SqlError](crate::Error::SqlError) if there is an
    /// SQL error. Creating a user that already exists is not an error and
    /// returns [UserCreation::AlreadyExists].
    fn create(&mut self, username: &str) -> Result<UserCreation, Error>;

    /// Whether the user `username` has been created.
    fn exists(&self, username: &str) -> Result<bool, Error>;
}
