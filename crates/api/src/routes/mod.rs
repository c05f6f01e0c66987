//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod loan_applications;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(transactions::routes())
        .merge(loan_applications::routes())
}
