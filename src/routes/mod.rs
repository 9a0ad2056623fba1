//! Application router configuration and the route handlers that adapt the
//! HTTP surface to the stores.

mod transaction;
mod user;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;

use crate::{
    endpoints,
    state::AppState,
    stores::{TransactionStore, UserStore},
};

/// Return a router with all the app's routes.
pub fn build_router<U, T>(state: AppState<U, T>) -> Router
where
    U: UserStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::ROOT, get(get_root))
        .route(endpoints::USER, post(user::create_user::<U>))
        .route(
            endpoints::TRANSACTIONS,
            post(transaction::create_transaction::<U, T>)
                .get(transaction::get_transactions::<U, T>),
        )
        .route(
            endpoints::TRANSACTION,
            put(transaction::update_transaction::<U, T>)
                .delete(transaction::delete_transaction::<U, T>),
        )
        .route(
            endpoints::TRANSACTIONS_BY_CATEGORY,
            get(transaction::get_transactions_by_category::<U, T>),
        )
        .route(
            endpoints::DEBITS,
            get(transaction::get_debit_transactions::<U, T>),
        )
        .route(
            endpoints::CREDITS,
            get(transaction::get_credit_transactions::<U, T>),
        )
        .route(
            endpoints::TRANSACTIONS_BY_MONTH,
            get(transaction::get_transactions_by_month::<U, T>),
        )
        .with_state(state)
}

/// Confirm that the service is up.
async fn get_root() -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "message": "fintrack API is running.",
        })),
    )
        .into_response()
}
