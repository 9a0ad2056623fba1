//! Implements a SQLite backed user store.
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    db::CreateTable,
    stores::{UserCreation, UserStore},
};

/// Stores users in a SQLite database.
///
/// Alongside the username, each row carries the counter used to assign the
/// user's next transaction ID, see
/// [SQLiteTransactionStore](crate::stores::sqlite::SQLiteTransactionStore).
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    /// Create the user `username` in the database if it does not exist yet.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error.
    fn create(&mut self, username: &str) -> Result<UserCreation, Error> {
        let rows_inserted = self.connection.lock().unwrap().execute(
            "INSERT INTO user (username) VALUES (?1) ON CONFLICT (username) DO NOTHING",
            (username,),
        )?;

        if rows_inserted == 0 {
            Ok(UserCreation::AlreadyExists)
        } else {
            Ok(UserCreation::Created)
        }
    }

    /// Whether the user `username` is in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error.
    fn exists(&self, username: &str) -> Result<bool, Error> {
        let user_exists = self.connection.lock().unwrap().query_row(
            "SELECT EXISTS (SELECT 1 FROM user WHERE username = :username)",
            &[(":username", username)],
            |row| row.get(0),
        )?;

        Ok(user_exists)
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    username TEXT PRIMARY KEY,
                    next_transaction_id INTEGER NOT NULL DEFAULT 1
                    )",
            (),
        )?;

        Ok(())
    }
}
