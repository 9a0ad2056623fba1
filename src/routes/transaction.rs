//! Defines the endpoints for creating, listing, updating, deleting and
//! filtering a user's transactions.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::Month;

use crate::{
    Error,
    models::{DatabaseID, NewTransaction, TransactionType},
    state::AppState,
    stores::{MonthFilter, TransactionQuery, TransactionStore, UserStore},
};

/// A route handler for creating a new transaction.
///
/// The user must have been created first; otherwise the request is answered
/// with 404 and no transaction is stored.
pub(crate) async fn create_transaction<U, T>(
    State(state): State<AppState<U, T>>,
    Path(username): Path<String>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<Response, Error>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    if !state.user_store.exists(&username)? {
        tracing::warn!("add transaction attempt for non-existent user '{username}'");
        return Err(Error::UserNotFound(username));
    }

    let mut transaction_store = state.transaction_store;
    let transaction = transaction_store.add(&username, new_transaction)?;

    tracing::info!("transaction {} added for user '{username}'", transaction.id());

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Transaction added successfully.",
            "transactionId": transaction.id(),
        })),
    )
        .into_response())
}

/// A route handler for listing all of a user's transactions.
pub(crate) async fn get_transactions<U, T>(
    State(state): State<AppState<U, T>>,
    Path(username): Path<String>,
) -> Result<Response, Error>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    let transactions = state
        .transaction_store
        .get_query(&username, TransactionQuery::default())?;

    Ok((StatusCode::OK, Json(transactions)).into_response())
}

/// A route handler for listing the user's transactions with an exactly
/// matching category.
///
/// No matches is a valid, empty answer, not an error.
pub(crate) async fn get_transactions_by_category<U, T>(
    State(state): State<AppState<U, T>>,
    Path((username, category)): Path<(String, String)>,
) -> Result<Response, Error>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    let transactions = state.transaction_store.get_query(
        &username,
        TransactionQuery {
            category: Some(category),
            ..Default::default()
        },
    )?;

    Ok((StatusCode::OK, Json(transactions)).into_response())
}

/// A route handler for listing the user's debit (Despesa) transactions.
pub(crate) async fn get_debit_transactions<U, T>(
    State(state): State<AppState<U, T>>,
    Path(username): Path<String>,
) -> Result<Response, Error>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    get_transactions_by_type(&state, &username, TransactionType::Debit)
}

/// A route handler for listing the user's credit (Receita) transactions.
pub(crate) async fn get_credit_transactions<U, T>(
    State(state): State<AppState<U, T>>,
    Path(username): Path<String>,
) -> Result<Response, Error>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    get_transactions_by_type(&state, &username, TransactionType::Credit)
}

fn get_transactions_by_type<U, T>(
    state: &AppState<U, T>,
    username: &str,
    transaction_type: TransactionType,
) -> Result<Response, Error>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    let transactions = state.transaction_store.get_query(
        username,
        TransactionQuery {
            transaction_type: Some(transaction_type),
            ..Default::default()
        },
    )?;

    Ok((StatusCode::OK, Json(transactions)).into_response())
}

/// A route handler for listing the user's transactions within a calendar
/// month.
///
/// Month numbers outside of [1, 12] are rejected with 400 before reaching
/// the store.
pub(crate) async fn get_transactions_by_month<U, T>(
    State(state): State<AppState<U, T>>,
    Path((username, year, month)): Path<(String, i32, u8)>,
) -> Result<Response, Error>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    let month = Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?;

    let transactions = state.transaction_store.get_query(
        &username,
        TransactionQuery {
            month: Some(MonthFilter { year, month }),
            ..Default::default()
        },
    )?;

    Ok((StatusCode::OK, Json(transactions)).into_response())
}

/// A route handler for updating an existing transaction.
///
/// All field values are replaced with the request body; the transaction
/// keeps its ID. Updating a transaction that does not exist is answered
/// with 404.
pub(crate) async fn update_transaction<U, T>(
    State(state): State<AppState<U, T>>,
    Path((username, transaction_id)): Path<(String, DatabaseID)>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<Response, Error>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    let mut transaction_store = state.transaction_store;
    transaction_store.update(&username, transaction_id, new_transaction)?;

    tracing::info!("transaction {transaction_id} updated for user '{username}'");

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Transaction ID {transaction_id} updated successfully."),
        })),
    )
        .into_response())
}

/// A route handler for deleting a transaction.
///
/// Deleting a transaction that does not exist is a no-op answered with 200,
/// so clients can treat deletion as idempotent.
pub(crate) async fn delete_transaction<U, T>(
    State(state): State<AppState<U, T>>,
    Path((username, transaction_id)): Path<(String, DatabaseID)>,
) -> Result<Response, Error>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    let mut transaction_store = state.transaction_store;
    transaction_store.delete(&username, transaction_id)?;

    tracing::info!("transaction {transaction_id} deleted for user '{username}'");

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Transaction ID {transaction_id} deleted successfully."),
        })),
    )
        .into_response())
}
