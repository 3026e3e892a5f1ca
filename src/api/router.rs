use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, execute_command, get_item_status, get_late_loans, get_loan, get_loan_history,
    get_member_balance, get_member_loans,
};

/// Creates the API router
///
/// Command endpoint (write operations):
/// - POST /commands - Execute a tagged command
///
/// Query endpoints (read operations):
/// - GET /loans/late - Late loans as of a date
/// - GET /loans/:id - Loan summary
/// - GET /loans/:id/history - Loan event history
/// - GET /items/:id/status - Item availability
/// - GET /members/:id/balance - Amount owed
/// - GET /members/:id/loans - Loans of a member
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Command endpoint
        .route("/commands", post(execute_command))
        // Query endpoints
        .route("/loans/late", get(get_late_loans))
        .route("/loans/:id", get(get_loan))
        .route("/loans/:id/history", get(get_loan_history))
        .route("/items/:id/status", get(get_item_status))
        .route("/members/:id/balance", get(get_member_balance))
        .route("/members/:id/loans", get(get_member_loans))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
