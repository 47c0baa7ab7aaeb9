//! HTTP request handlers for the two views
//!
//! This module maps user actions onto the view modules:
//! - Rendering the client list and the per-client activity log
//! - Submitting the create/edit forms
//! - Confirmed deletion
//! - Exclusive expand/collapse and theme toggling
//!
//! Handlers hold the module lock only for the synchronous body of the
//! request; there are no awaits while a lock is held.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::gateway::AppState;
use crate::model::{ActivityForm, ClientForm, ConfirmPayload, SearchParams};

/// Renders the client list view.
///
/// Reloads the collection from the gateway on every visit; a failed reload
/// is logged and the previously cached collection is served instead. An
/// optional `?q=` parameter replaces the search term before rendering.
pub async fn client_list_view(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let mut directory = state.directory.lock().unwrap();

    if let Some(q) = params.q {
        directory.set_search(q);
    }

    if let Err(err) = directory.load() {
        tracing::warn!(error = %err, "client reload failed, serving cached collection");
    }

    Json(directory.view(state.theme.current()))
}

/// Submits the client form, creating or updating depending on whether an
/// edit is in progress.
///
/// # Response
///
/// - **200 OK** - saved; body is the refreshed view
/// - **422 Unprocessable Entity** - company name missing
/// - **409 Conflict** - company name already present in the collection
/// - **502 Bad Gateway** - the data gateway failed; the form keeps its values
pub async fn submit_client(
    State(state): State<AppState>,
    Json(form): Json<ClientForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut directory = state.directory.lock().unwrap();
    directory.submit(form)?;
    Ok(Json(directory.view(state.theme.current())))
}

/// Copies the cached client into the form and switches to edit mode.
pub async fn begin_client_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut directory = state.directory.lock().unwrap();
    directory.begin_edit(&id)?;
    Ok(Json(directory.view(state.theme.current())))
}

/// Expands the client's detail panel, collapsing any other open panel.
/// Toggling the open client collapses it.
pub async fn toggle_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut directory = state.directory.lock().unwrap();
    directory.toggle_expanded(&id);
    Json(json!({ "expanded": directory.expanded() }))
}

/// Shows or hides the client form.
pub async fn toggle_client_form(State(state): State<AppState>) -> impl IntoResponse {
    let mut directory = state.directory.lock().unwrap();
    directory.toggle_form();
    Json(json!({ "show_form": directory.show_form() }))
}

/// Deletes a client after explicit confirmation, then reloads.
///
/// # Response
///
/// - **200 OK** - deleted
/// - **422 Unprocessable Entity** - request body did not confirm
/// - **502 Bad Gateway** - deletion failed; nothing changed locally
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ConfirmPayload>,
) -> Result<impl IntoResponse, AppError> {
    if !payload.confirm {
        return Err(AppError::Validation("لم يتم تأكيد الحذف.".to_string()));
    }

    let mut directory = state.directory.lock().unwrap();
    directory.delete(&id)?;
    Ok(Json(json!({
        "message": "🗑️ تم حذف العميل.",
        "deleted_id": id
    })))
}

/// Renders the activity log for one client.
///
/// The path segment scopes the module before its first load. Load failures
/// for the collection or the client name are logged and leave the previous
/// values in place (a failed name lookup leaves the name blank).
pub async fn activity_log_view(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    let mut log = state.log.lock().unwrap();
    log.scope_to(&client_id);

    if let Err(err) = log.load() {
        tracing::warn!(error = %err, client_id, "activity reload failed");
    }
    if let Err(err) = log.load_client_name() {
        tracing::warn!(error = %err, client_id, "client name lookup failed");
    }

    Json(log.view(state.theme.current()))
}

/// Submits the activity form for the scoped client.
///
/// # Response
///
/// - **200 OK** - saved; body is the refreshed view
/// - **422 Unprocessable Entity** - type, result or date missing, or the
///   date is not a calendar date
/// - **502 Bad Gateway** - the data gateway failed; the form keeps its values
pub async fn submit_activity(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(form): Json<ActivityForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut log = state.log.lock().unwrap();
    log.scope_to(&client_id);
    log.submit(form)?;
    Ok(Json(log.view(state.theme.current())))
}

/// Copies the cached activity into the form and switches to edit mode.
pub async fn begin_activity_edit(
    State(state): State<AppState>,
    Path((client_id, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let mut log = state.log.lock().unwrap();
    log.scope_to(&client_id);
    log.begin_edit(&id)?;
    Ok(Json(log.view(state.theme.current())))
}

/// Deletes an activity after explicit confirmation, then reloads.
pub async fn delete_activity(
    State(state): State<AppState>,
    Path((client_id, id)): Path<(String, String)>,
    Json(payload): Json<ConfirmPayload>,
) -> Result<impl IntoResponse, AppError> {
    if !payload.confirm {
        return Err(AppError::Validation("لم يتم تأكيد الحذف.".to_string()));
    }

    let mut log = state.log.lock().unwrap();
    log.scope_to(&client_id);
    log.delete(&id)?;
    Ok(Json(json!({
        "message": "🗑️ تم حذف المتابعة.",
        "deleted_id": id
    })))
}

/// Flips the theme and persists the new choice.
pub async fn toggle_theme(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "theme": state.theme.toggle() }))
}
