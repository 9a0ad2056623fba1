//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, NewTransaction, Transaction},
    stores::{
        TransactionStore,
        transaction::{MonthFilter, TransactionQuery},
    },
};

/// Stores transactions in a SQLite database.
///
/// All users share one table keyed by the composite `(username, id)`
/// primary key; the per-user ID sequence lives in the `user` table, so the
/// [SQLiteUserStore](crate::stores::sqlite::SQLiteUserStore) schema must be
/// set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction for the user `username` in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UserNotFound] if `username` has not been created,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn add(
        &mut self,
        username: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, Error> {
        let connection = self.connection.lock().unwrap();
        let sql_transaction = connection.unchecked_transaction()?;

        // Claiming the ID and inserting the row happen in one SQL
        // transaction, so concurrent additions can neither observe the same
        // ID nor a torn record.
        let id: DatabaseID = sql_transaction
            .prepare(
                "UPDATE user SET next_transaction_id = next_transaction_id + 1
                 WHERE username = :username
                 RETURNING next_transaction_id - 1",
            )?
            .query_row(&[(":username", username)], |row| row.get(0))
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound(username.to_string()),
                error => error.into(),
            })?;

        sql_transaction.execute(
            "INSERT INTO \"transaction\" (username, id, date, description, category, amount, kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                username,
                id,
                new_transaction.date,
                &new_transaction.description,
                &new_transaction.category,
                new_transaction.amount,
                new_transaction.transaction_type,
            ),
        )?;

        sql_transaction.commit()?;

        Ok(Transaction::new(id, new_transaction))
    }

    /// Query for the transactions of `username` in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UserNotFound] if `username` has not been created,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_query(
        &self,
        username: &str,
        filter: TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        let connection = self.connection.lock().unwrap();
        ensure_user_exists(&connection, username)?;

        let mut query_string_parts = vec![
            "SELECT id, date, description, category, amount, kind FROM \"transaction\""
                .to_string(),
        ];
        let mut where_clause_parts = vec!["username = ?1".to_string()];
        let mut query_parameters = vec![Value::Text(username.to_string())];

        if let Some(category) = filter.category {
            where_clause_parts.push(format!("category = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(category));
        }

        if let Some(transaction_type) = filter.transaction_type {
            where_clause_parts.push(format!("kind = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(transaction_type.as_str().to_string()));
        }

        if let Some(month) = filter.month {
            where_clause_parts.push(format!(
                "date BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            let (first_day, last_day) = month_bounds(month)?;
            query_parameters.push(Value::Text(first_day.to_string()));
            query_parameters.push(Value::Text(last_day.to_string()));
        }

        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        query_string_parts.push("ORDER BY id ASC".to_string());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        connection
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Replace the field values of the transaction `id` of `username` in
    /// the database.
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
    ) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();
        ensure_user_exists(&connection, username)?;

        let rows_updated = connection.execute(
            "UPDATE \"transaction\"
             SET date = ?1, description = ?2, category = ?3, amount = ?4, kind = ?5
             WHERE username = ?6 AND id = ?7",
            (
                new_transaction.date,
                &new_transaction.description,
                &new_transaction.category,
                new_transaction.amount,
                new_transaction.transaction_type,
                username,
                id,
            ),
        )?;

        if rows_updated == 0 {
            return Err(Error::UpdateMissingTransaction);
        }

        Ok(())
    }

    /// Remove the transaction `id` of `username` from the database if it is
    /// present.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UserNotFound] if `username` has not been created,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, username: &str, id: DatabaseID) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();
        ensure_user_exists(&connection, username)?;

        let rows_deleted = connection.execute(
            "DELETE FROM \"transaction\" WHERE username = ?1 AND id = ?2",
            (username, id),
        )?;

        if rows_deleted == 0 {
            tracing::debug!(
                "tried to delete transaction {id} for user '{username}' but it does not exist"
            );
        }

        Ok(())
    }
}

/// Check that `username` has been created before touching its transactions.
fn ensure_user_exists(connection: &Connection, username: &str) -> Result<(), Error> {
    let user_exists: bool = connection.query_row(
        "SELECT EXISTS (SELECT 1 FROM user WHERE username = :username)",
        &[(":username", username)],
        |row| row.get(0),
    )?;

    if user_exists {
        Ok(())
    } else {
        Err(Error::UserNotFound(username.to_string()))
    }
}

/// The first and last day of the month `filter`, for an inclusive BETWEEN.
fn month_bounds(filter: MonthFilter) -> Result<(Date, Date), Error> {
    let first_day = Date::from_calendar_date(filter.year, filter.month, 1)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;
    let last_day =
        Date::from_calendar_date(filter.year, filter.month, filter.month.length(filter.year))
            .map_err(|error| Error::InvalidDate(error.to_string()))?;

    Ok((first_day, last_day))
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    username TEXT NOT NULL,
                    id INTEGER NOT NULL,
                    date TEXT NOT NULL,
                    description TEXT NOT NULL,
                    category TEXT NOT NULL,
                    amount REAL NOT NULL,
                    kind TEXT NOT NULL,
                    PRIMARY KEY (username, id),
                    FOREIGN KEY (username) REFERENCES user(username) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let new_transaction = NewTransaction {
            date: row.get(offset + 1)?,
            description: row.get(offset + 2)?,
            category: row.get(offset + 3)?,
            amount: row.get(offset + 4)?,
            transaction_type: row.get(offset + 5)?,
        };

        Ok(Transaction::new(id, new_transaction))
    }
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use rusqlite::Connection;
    use time::{Date, Month};

    use crate::{
        Error,
        models::{NewTransaction, TransactionType},
        stores::{
            MonthFilter, TransactionQuery, UserStore,
            sqlite::{SQLAppState, create_app_state},
        },
    };

    use super::TransactionStore;

    fn get_app_state() -> SQLAppState {
        let conn = Connection::open_in_memory().unwrap();
        create_app_state(conn).unwrap()
    }

    fn get_app_state_with_user(username: &str) -> SQLAppState {
        let mut state = get_app_state();
        state.user_store.create(username).unwrap();
        state
    }

    fn new_transaction(
        date: Date,
        description: &str,
        category: &str,
        amount: f64,
        transaction_type: TransactionType,
    ) -> NewTransaction {
        NewTransaction {
            date,
            description: description.to_string(),
            category: category.to_string(),
            amount,
            transaction_type,
        }
    }

    fn june(day: u8) -> Date {
        Date::from_calendar_date(2025, Month::June, day).unwrap()
    }

    #[test]
    fn add_assigns_id_one_to_first_transaction() {
        let mut state = get_app_state_with_user("alice");
        let want = new_transaction(
            june(25),
            "Freelance",
            "Trabalho",
            1200.50,
            TransactionType::Credit,
        );

        let transaction = state
            .transaction_store
            .add("alice", want.clone())
            .expect("Could not create transaction");

        assert_eq!(transaction.id(), 1);
        assert_eq!(transaction.date(), &want.date);
        assert_eq!(transaction.description(), want.description);
        assert_eq!(transaction.category(), want.category);
        assert_eq!(transaction.amount(), want.amount);
        assert_eq!(transaction.transaction_type(), want.transaction_type);
    }

    #[test]
    fn add_assigns_strictly_increasing_ids() {
        let mut state = get_app_state_with_user("alice");

        let mut previous_id = 0;
        for day in 1..=5 {
            let transaction = state
                .transaction_store
                .add(
                    "alice",
                    new_transaction(june(day), "Almoço", "Alimentação", 35.0, TransactionType::Debit),
                )
                .unwrap();

            assert!(transaction.id() > previous_id);
            previous_id = transaction.id();
        }
    }

    #[test]
    fn add_does_not_reuse_ids_after_delete() {
        let mut state = get_app_state_with_user("alice");
        for day in 1..=2 {
            state
                .transaction_store
                .add(
                    "alice",
                    new_transaction(june(day), "Almoço", "Alimentação", 35.0, TransactionType::Debit),
                )
                .unwrap();
        }

        state.transaction_store.delete("alice", 2).unwrap();

        let transaction = state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(3), "Almoço", "Alimentação", 35.0, TransactionType::Debit),
            )
            .unwrap();

        assert_eq!(transaction.id(), 3);
    }

    #[test]
    fn add_fails_on_missing_user() {
        let mut state = get_app_state();

        let result = state.transaction_store.add(
            "alice",
            new_transaction(june(25), "Freelance", "Trabalho", 1200.50, TransactionType::Credit),
        );

        assert_eq!(result, Err(Error::UserNotFound("alice".to_string())));
    }

    #[test]
    fn add_keeps_users_isolated() {
        let mut state = get_app_state_with_user("alice");
        state.user_store.create("bob").unwrap();

        let alices_transaction = state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(25), "Freelance", "Trabalho", 1200.50, TransactionType::Credit),
            )
            .unwrap();
        let bobs_transaction = state
            .transaction_store
            .add(
                "bob",
                new_transaction(june(20), "Supermercado", "Alimentação", 200.0, TransactionType::Debit),
            )
            .unwrap();

        // ID sequences are per user, so both first transactions get ID 1.
        assert_eq!(alices_transaction.id(), 1);
        assert_eq!(bobs_transaction.id(), 1);

        let alices_transactions = state
            .transaction_store
            .get_query("alice", TransactionQuery::default())
            .unwrap();
        let bobs_transactions = state
            .transaction_store
            .get_query("bob", TransactionQuery::default())
            .unwrap();

        assert_eq!(alices_transactions, vec![alices_transaction]);
        assert_eq!(bobs_transactions, vec![bobs_transaction]);
    }

    #[test]
    fn get_query_returns_all_transactions_in_id_order() {
        let mut state = get_app_state_with_user("alice");
        let mut want = Vec::new();
        for day in [25, 10, 17] {
            want.push(
                state
                    .transaction_store
                    .add(
                        "alice",
                        new_transaction(june(day), "Almoço", "Alimentação", 35.0, TransactionType::Debit),
                    )
                    .unwrap(),
            );
        }

        let got = state
            .transaction_store
            .get_query("alice", TransactionQuery::default())
            .unwrap();

        assert_eq!(got, want, "got transactions {got:?}, want {want:?}");
    }

    #[test]
    fn get_query_returns_empty_for_user_without_transactions() {
        let state = get_app_state_with_user("alice");

        let got = state
            .transaction_store
            .get_query("alice", TransactionQuery::default())
            .unwrap();

        assert_eq!(got, vec![]);
    }

    #[test]
    fn get_query_fails_on_missing_user() {
        let state = get_app_state();

        let result = state
            .transaction_store
            .get_query("alice", TransactionQuery::default());

        assert_eq!(result, Err(Error::UserNotFound("alice".to_string())));
    }

    #[test]
    fn get_query_filters_by_exact_category() {
        let mut state = get_app_state_with_user("alice");
        let want = state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(5), "Pizza", "Alimentação", 50.0, TransactionType::Debit),
            )
            .unwrap();

        // Same string with different casing must not match.
        for category in ["Entretenimento", "alimentação", "Educação"] {
            state
                .transaction_store
                .add(
                    "alice",
                    new_transaction(june(6), "Outros", category, 10.0, TransactionType::Debit),
                )
                .unwrap();
        }

        let got = state
            .transaction_store
            .get_query(
                "alice",
                TransactionQuery {
                    category: Some("Alimentação".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn get_query_returns_empty_for_unmatched_category() {
        let state = get_app_state_with_user("alice");

        let got = state
            .transaction_store
            .get_query(
                "alice",
                TransactionQuery {
                    category: Some("Alimentação".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(got, vec![]);
    }

    #[test]
    fn get_query_by_type_partitions_transactions() {
        let mut state = get_app_state_with_user("alice");
        let credit = state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(25), "Freelance", "Trabalho", 1200.50, TransactionType::Credit),
            )
            .unwrap();
        let debit = state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(20), "Supermercado", "Alimentação", 200.0, TransactionType::Debit),
            )
            .unwrap();

        let debits = state
            .transaction_store
            .get_query(
                "alice",
                TransactionQuery {
                    transaction_type: Some(TransactionType::Debit),
                    ..Default::default()
                },
            )
            .unwrap();
        let credits = state
            .transaction_store
            .get_query(
                "alice",
                TransactionQuery {
                    transaction_type: Some(TransactionType::Credit),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(debits, vec![debit]);
        assert_eq!(credits, vec![credit]);
    }

    #[test]
    fn get_query_filters_by_month_inclusive_of_endpoints() {
        let mut state = get_app_state_with_user("alice");
        let mut want = Vec::new();
        let dates = [
            june(1),
            june(30),
            Date::from_calendar_date(2025, Month::July, 5).unwrap(),
            Date::from_calendar_date(2024, Month::June, 10).unwrap(),
        ];

        for date in dates {
            let transaction = state
                .transaction_store
                .add(
                    "alice",
                    new_transaction(date, "Almoço", "Alimentação", 35.0, TransactionType::Debit),
                )
                .unwrap();

            if date.year() == 2025 && date.month() == Month::June {
                want.push(transaction);
            }
        }

        let got = state
            .transaction_store
            .get_query(
                "alice",
                TransactionQuery {
                    month: Some(MonthFilter {
                        year: 2025,
                        month: Month::June,
                    }),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(got, want, "got transactions {got:?}, want {want:?}");
    }

    #[test]
    fn get_query_combines_filters() {
        let mut state = get_app_state_with_user("alice");
        let want = state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(5), "Pizza", "Alimentação", 50.0, TransactionType::Debit),
            )
            .unwrap();
        state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(6), "Reembolso", "Alimentação", 50.0, TransactionType::Credit),
            )
            .unwrap();

        let got = state
            .transaction_store
            .get_query(
                "alice",
                TransactionQuery {
                    category: Some("Alimentação".to_string()),
                    transaction_type: Some(TransactionType::Debit),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn update_replaces_all_fields_and_keeps_id() {
        let mut state = get_app_state_with_user("alice");
        let transaction = state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(10), "Internet", "Serviços", 99.90, TransactionType::Debit),
            )
            .unwrap();
        let new_values = new_transaction(
            june(11),
            "Internet Fibra",
            "Moradia",
            120.0,
            TransactionType::Debit,
        );

        state
            .transaction_store
            .update("alice", transaction.id(), new_values.clone())
            .unwrap();

        let got = state
            .transaction_store
            .get_query("alice", TransactionQuery::default())
            .unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id(), transaction.id());
        assert_eq!(got[0].date(), &new_values.date);
        assert_eq!(got[0].description(), new_values.description);
        assert_eq!(got[0].category(), new_values.category);
        assert_eq!(got[0].amount(), new_values.amount);
        assert_eq!(got[0].transaction_type(), new_values.transaction_type);
    }

    #[test]
    fn update_fails_on_missing_transaction() {
        let mut state = get_app_state_with_user("alice");

        let result = state.transaction_store.update(
            "alice",
            999,
            new_transaction(june(10), "Internet", "Serviços", 99.90, TransactionType::Debit),
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn update_fails_on_missing_user() {
        let mut state = get_app_state();

        let result = state.transaction_store.update(
            "alice",
            1,
            new_transaction(june(10), "Internet", "Serviços", 99.90, TransactionType::Debit),
        );

        assert_eq!(result, Err(Error::UserNotFound("alice".to_string())));
    }

    #[test]
    fn delete_removes_transaction() {
        let mut state = get_app_state_with_user("alice");
        let transaction = state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(1), "Academia", "Saúde", 80.0, TransactionType::Debit),
            )
            .unwrap();

        state
            .transaction_store
            .delete("alice", transaction.id())
            .unwrap();

        let got = state
            .transaction_store
            .get_query("alice", TransactionQuery::default())
            .unwrap();

        assert_eq!(got, vec![]);
    }

    #[test]
    fn delete_missing_transaction_is_a_noop() {
        let mut state = get_app_state_with_user("alice");
        let transaction = state
            .transaction_store
            .add(
                "alice",
                new_transaction(june(1), "Academia", "Saúde", 80.0, TransactionType::Debit),
            )
            .unwrap();

        let result = state.transaction_store.delete("alice", transaction.id() + 99);

        assert_eq!(result, Ok(()));
        let got = state
            .transaction_store
            .get_query("alice", TransactionQuery::default())
            .unwrap();
        assert_eq!(got, vec![transaction]);
    }

    #[test]
    fn delete_fails_on_missing_user() {
        let mut state = get_app_state();

        let result = state.transaction_store.delete("alice", 1);

        assert_eq!(result, Err(Error::UserNotFound("alice".to_string())));
    }
}
