//! Implements a struct that holds the state of the REST server.

use std::marker::{Send, Sync};

use axum::extract::FromRef;

use crate::stores::{TransactionStore, UserStore};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<U, T>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    /// The store for managing users.
    pub user_store: U,
    /// The store for managing the users' [transactions](crate::models::Transaction).
    pub transaction_store: T,
}

impl<U, T> AppState<U, T>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    /// Create a new [AppState].
    pub fn new(user_store: U, transaction_store: T) -> Self {
        Self {
            user_store,
            transaction_store,
        }
    }
}

/// The state needed to create or look up a user.
#[derive(Debug, Clone)]
pub struct UserState<U>
where
    U: UserStore + Send + Sync,
{
    /// The store for managing users.
    pub user_store: U,
}

impl<U, T> FromRef<AppState<U, T>> for UserState<U>
where
    U: UserStore + Clone + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    fn from_ref(state: &AppState<U, T>) -> Self {
        Self {
            user_store: state.user_store.clone(),
        }
    }
}
