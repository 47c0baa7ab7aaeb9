//! Route definitions for the client follow-up application
//!
//! Two views, each with its action endpoints nested under its path:
//!
//! - `GET /` - client list (optional `?q=` search term)
//! - `POST /clients` - create or update a client from the form
//! - `POST /clients/form` - show/hide the client form
//! - `POST /clients/{id}/edit` - begin editing a client
//! - `POST /clients/{id}/toggle` - exclusive expand/collapse
//! - `POST /clients/{id}/delete` - confirmed deletion
//! - `GET /activities/{client_id}` - activity log for one client
//! - `POST /activities/{client_id}` - create or update an activity
//! - `POST /activities/{client_id}/{id}/edit` - begin editing an activity
//! - `POST /activities/{client_id}/{id}/delete` - confirmed deletion
//! - `POST /theme` - toggle the persisted dark/light choice

use axum::routing::{get, post};
use axum::Router;

use crate::gateway::AppState;
use crate::handler::{
    activity_log_view, begin_activity_edit, begin_client_edit, client_list_view, delete_activity,
    delete_client, submit_activity, submit_client, toggle_client, toggle_client_form, toggle_theme,
};

/// Creates and configures the application router with all routes.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(client_list_view))
        .route("/clients", post(submit_client))
        .route("/clients/form", post(toggle_client_form))
        .route("/clients/{id}/edit", post(begin_client_edit))
        .route("/clients/{id}/toggle", post(toggle_client))
        .route("/clients/{id}/delete", post(delete_client))
        .route("/activities/{client_id}", get(activity_log_view).post(submit_activity))
        .route("/activities/{client_id}/{id}/edit", post(begin_activity_edit))
        .route("/activities/{client_id}/{id}/delete", post(delete_activity))
        .route("/theme", post(toggle_theme))
        .with_state(state)
}
