//! Contains convenience type alias and function for [AppState] that uses
//! the SQLite backend.

mod transaction;
mod user;

pub use transaction::SQLiteTransactionStore;
pub use user::SQLiteUserStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{AppState, Error, db::initialize};

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SQLAppState = AppState<SQLiteUserStore, SQLiteTransactionStore>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the
/// domain models to the database, if they do not exist yet.
///
/// # Errors
/// Returns an [Error::SqlError] if the schema could not be set up.
pub fn create_app_state(db_connection: Connection) -> Result<SQLAppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));
    let user_store = SQLiteUserStore::new(connection.clone());
    let transaction_store = SQLiteTransactionStore::new(connection);

    Ok(AppState::new(user_store, transaction_store))
}
