//! Taskboard HTTP API
//!
//! Builds the axum router over the database layer. The binary is in
//! `main.rs`; integration tests construct the router directly through
//! [`build_state`] and [`router`].

pub mod auth;
pub mod error;
pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use taskboard_db::{
    CheckNoneFilter, Database, DateFilter, DbResult, FilterSet, TextFilter, UserId,
};

/// Shared state handed to every handler.
///
/// Everything here is immutable configuration: the database handle, the
/// token table, and the task filter set built once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: Arc<Database>,
    /// Accepted bearer tokens and the users they authenticate
    pub tokens: Arc<HashMap<String, UserId>>,
    /// Filters applied to task listings
    pub task_filters: Arc<FilterSet>,
}

/// Build the application state, constructing the task filter set.
///
/// The task list supports `date`/`date__*` on `created_at`,
/// `finished_at`/`finished_at__*`, the `finished` null-check family,
/// and `search` over name + description.
///
/// # Errors
///
/// Returns `DbError::FilterConfig` if a filter is misconfigured; this
/// is fatal to startup by design.
pub fn build_state(db: Database, tokens: HashMap<String, UserId>) -> DbResult<AppState> {
    let task_filters = FilterSet::new()
        .with(DateFilter::new([
            ("date", "created_at"),
            ("finished_at", "finished_at"),
        ])?)
        .with(CheckNoneFilter::new([("finished", "finished_at")])?)
        .with(TextFilter::new([("search", vec!["name", "description"])])?);

    Ok(AppState {
        db: Arc::new(db),
        tokens: Arc::new(tokens),
        task_filters: Arc::new(task_filters),
    })
}

/// Build the API router with authentication applied to every route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tasks", get(handlers::tasks::list).post(handlers::tasks::create))
        .route(
            "/tasks/{id}",
            get(handlers::tasks::retrieve)
                .put(handlers::tasks::replace)
                .patch(handlers::tasks::modify)
                .delete(handlers::tasks::remove),
        )
        .route(
            "/tasks/{id}/complete",
            post(handlers::tasks::complete).patch(handlers::tasks::complete),
        )
        .route(
            "/task-groups",
            get(handlers::groups::list).post(handlers::groups::create),
        )
        .route(
            "/task-groups/{id}",
            get(handlers::groups::retrieve)
                .put(handlers::groups::update)
                .patch(handlers::groups::update)
                .delete(handlers::groups::remove),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
