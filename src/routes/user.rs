//! Defines the endpoint for creating a user.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    Error,
    state::UserState,
    stores::{UserCreation, UserStore},
};

/// A route handler for creating a new user.
///
/// Creating a user that already exists is answered with 200 OK rather than
/// an error, so clients can treat user creation as idempotent.
pub(crate) async fn create_user<U>(
    State(state): State<UserState<U>>,
    Path(username): Path<String>,
) -> Result<Response, Error>
where
    U: UserStore + Clone + Send + Sync,
{
    let mut user_store = state.user_store;

    let response = match user_store.create(&username)? {
        UserCreation::Created => {
            tracing::info!("created user '{username}'");

            (
                StatusCode::CREATED,
                Json(json!({
                    "message": format!("User '{username}' created successfully."),
                })),
            )
        }
        UserCreation::AlreadyExists => (
            StatusCode::OK,
            Json(json!({
                "message": format!("User '{username}' already exists."),
            })),
        ),
    };

    Ok(response.into_response())
}
