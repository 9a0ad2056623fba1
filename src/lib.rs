//! Fintrack is a web service for tracking personal finances.
//!
//! Each user owns an isolated set of transactions (date, description,
//! category, amount and credit/debit type) which can be created, listed,
//! updated, deleted and filtered by category, type or calendar month.
//!
//! This library provides a REST API that serves JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

pub mod db;
pub mod endpoints;
pub mod models;
pub mod routes;
pub mod state;
pub mod stores;

pub use routes::build_router;
pub use state::AppState;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username in the request path does not refer to a user that has
    /// been created.
    ///
    /// Clients must create the user before performing transaction
    /// operations against it.
    #[error("user '{0}' does not exist")]
    UserNotFound(String),

    /// A month number outside of [1, 12] was used to filter transactions.
    #[error("{0} is not a valid month, months must be between 1 and 12")]
    InvalidMonth(u8),

    /// A string other than the two recognized type literals was used where
    /// a transaction type was expected.
    #[error("'{0}' is not a valid transaction type, expected 'Receita' or 'Despesa'")]
    InvalidTransactionType(String),

    /// A string could not be parsed as a calendar date.
    #[error("could not parse calendar date: {0}")]
    InvalidDate(String),

    /// Tried to update a transaction that does not exist.
    ///
    /// Deleting a missing transaction is a no-op rather than an error, see
    /// [TransactionStore::delete](crate::stores::TransactionStore::delete).
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {error}");
        Error::SqlError(error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Error::UserNotFound(username) => (
                StatusCode::NOT_FOUND,
                format!("User '{username}' does not exist. Create the user first."),
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                "The transaction could not be found.".to_string(),
            ),
            Error::InvalidMonth(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid month. Must be between 1 and 12.".to_string(),
            ),
            Error::InvalidTransactionType(_) | Error::InvalidDate(_) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid data provided: {self}"),
            ),
            // Storage faults are not intended to be shown to the client.
            Error::SqlError(error) => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
