use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Form;
use tracing::{error, info, warn};

use crate::domain::DomainError;
use crate::io::auth::AuthAccount;
use crate::io::rest::{domain_error_response, redirect_with_notice, OnboardingQuery};
use crate::AppState;
use shared::{
    Entry, EntryFieldError, EntryFormData, EntryFormPage, Parent, ToggleCompletionRequest,
    ToggleCompletionResponse,
};

/// Entry-type choices offered on the entry form. Notes are created through
/// their own quick-form, so they are not listed here.
const ENTRY_TYPE_CHOICES: [&str; 2] = ["task", "event"];
const PRIORITY_CHOICES: [&str; 3] = ["low", "medium", "high"];

async fn resolve_parent(
    state: &AppState,
    auth: &AuthAccount,
    query: &OnboardingQuery,
) -> Result<Parent, Response> {
    state
        .parent_service
        .resolve_scope(&auth.0, query.is_onboarding())
        .await
        .map_err(|err| domain_error_response("resolve parent", err))
}

/// Assemble the entry form page with its select options.
pub(crate) async fn form_page(
    state: &AppState,
    parent: &Parent,
    form: EntryFormData,
    errors: Vec<EntryFieldError>,
    entry: Option<Entry>,
) -> Result<EntryFormPage, Response> {
    let children = state
        .child_service
        .list_children(parent)
        .await
        .map_err(|err| domain_error_response("entry form page", err))?;
    let categories = state
        .category_service
        .list_categories()
        .await
        .map_err(|err| domain_error_response("entry form page", err))?;

    Ok(EntryFormPage {
        form,
        errors,
        children,
        categories,
        entry_types: ENTRY_TYPE_CHOICES.iter().map(|t| t.to_string()).collect(),
        priorities: PRIORITY_CHOICES.iter().map(|p| p.to_string()).collect(),
        entry,
    })
}

/// Pre-fill the form from a stored entry for the edit page.
fn form_from_entry(entry: &Entry) -> EntryFormData {
    EntryFormData {
        title: entry.title.clone(),
        child: Some(entry.child_id.clone()),
        category: Some(entry.category.clone()),
        entry_type: Some(entry.entry_type.as_str().to_string()),
        description: Some(entry.description.clone()),
        priority: Some(entry.priority.as_str().to_string()),
        due_date: entry.due_date.map(|dt| dt.format("%Y-%m-%d %H:%M").to_string()),
        start_time: entry.start_time.map(|dt| dt.format("%Y-%m-%d %H:%M").to_string()),
        end_time: entry.end_time.map(|dt| dt.format("%Y-%m-%d %H:%M").to_string()),
        event_date: entry.event_date.map(|d| d.format("%Y-%m-%d").to_string()),
        event_start_time: entry.event_start_time.map(|t| t.format("%H:%M").to_string()),
        event_end_time: entry.event_end_time.map(|t| t.format("%H:%M").to_string()),
        task_due_date: entry.task_due_date.map(|d| d.format("%Y-%m-%d").to_string()),
        task_due_time: entry.task_due_time.map(|t| t.format("%H:%M").to_string()),
        location: Some(entry.location.clone()),
    }
}

/// Blank entry form with the parent's children as select options.
pub async fn add_entry_page(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
) -> Response {
    info!("GET /add-entry/");

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    match form_page(&state, &parent, EntryFormData::default(), Vec::new(), None).await {
        Ok(page) => Json(page).into_response(),
        Err(response) => response,
    }
}

pub async fn create_entry(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Form(form): Form<EntryFormData>,
) -> Response {
    info!("POST /add-entry/ - title: {:?}", form.title);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    match state.entry_service.create_entry(&parent, &form).await {
        Ok(_) => redirect_with_notice("/dashboard/", "entry-added").into_response(),
        Err(DomainError::InvalidEntryForm(errors)) => {
            match form_page(&state, &parent, form, errors, None).await {
                Ok(page) => (StatusCode::BAD_REQUEST, Json(page)).into_response(),
                Err(response) => response,
            }
        }
        Err(err) => domain_error_response("create entry", err),
    }
}

/// One child's page: its entries partitioned and ordered, with counts.
pub async fn child_page(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Path(child_id): Path<String>,
) -> Response {
    info!("GET /child/{}/", child_id);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    let child = match state.child_service.get_child(&parent, &child_id).await {
        Ok(child) => child,
        Err(err) => return domain_error_response("child page", err),
    };

    match state.dashboard_service.child_page(child).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => domain_error_response("child page", err),
    }
}

/// Entry form pre-filled for editing.
pub async fn edit_entry_page(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Path(entry_id): Path<String>,
) -> Response {
    info!("GET /edit-entry/{}/", entry_id);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    let entry = match state.entry_service.get_entry(&parent, &entry_id).await {
        Ok(entry) => entry,
        Err(err) => return domain_error_response("edit entry page", err),
    };

    let form = form_from_entry(&entry);
    match form_page(&state, &parent, form, Vec::new(), Some(entry)).await {
        Ok(page) => Json(page).into_response(),
        Err(response) => response,
    }
}

pub async fn update_entry(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Path(entry_id): Path<String>,
    Form(form): Form<EntryFormData>,
) -> Response {
    info!("POST /edit-entry/{}/", entry_id);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    match state
        .entry_service
        .update_entry(&parent, &entry_id, &form)
        .await
    {
        Ok(_) => redirect_with_notice("/dashboard/", "entry-updated").into_response(),
        Err(DomainError::InvalidEntryForm(errors)) => {
            let entry = state.entry_service.get_entry(&parent, &entry_id).await.ok();
            match form_page(&state, &parent, form, errors, entry).await {
                Ok(page) => (StatusCode::BAD_REQUEST, Json(page)).into_response(),
                Err(response) => response,
            }
        }
        Err(err) => domain_error_response("update entry", err),
    }
}

pub async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Path(entry_id): Path<String>,
) -> Response {
    info!("POST /delete-entry/{}/", entry_id);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    match state.entry_service.delete_entry(&parent, &entry_id).await {
        Ok(()) => redirect_with_notice("/dashboard/", "entry-deleted").into_response(),
        Err(err) => domain_error_response("delete entry", err),
    }
}

/// AJAX deletion from dashboard cards; no page redirect.
pub async fn quick_delete_entry(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Path(entry_id): Path<String>,
) -> Response {
    info!("POST /quick-delete-entry/{}/", entry_id);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    match state.entry_service.delete_entry(&parent, &entry_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => domain_error_response("quick delete entry", err),
    }
}

/// Toggle completion of any entry.
pub async fn toggle_entry_completion(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(entry_id): Path<String>,
    body: Bytes,
) -> Response {
    info!("POST /toggle-completion/{}/", entry_id);
    toggle_completion(state, auth, entry_id, body, false).await
}

/// Toggle completion of a task; non-tasks are reported as missing.
pub async fn toggle_task_completion(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(task_id): Path<String>,
    body: Bytes,
) -> Response {
    info!("POST /tasks/{}/toggle-completion/", task_id);
    toggle_completion(state, auth, task_id, body, true).await
}

/// Shared toggle implementation. Every outcome is a structured status so
/// the submitting script never has to parse an error page.
async fn toggle_completion(
    state: AppState,
    auth: AuthAccount,
    entry_id: String,
    body: Bytes,
    require_task: bool,
) -> Response {
    // An empty body flips the flag; a JSON body may set it explicitly.
    let desired = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice::<ToggleCompletionRequest>(&body) {
            Ok(request) => request.completed,
            Err(e) => {
                warn!("Malformed toggle body for {}: {}", entry_id, e);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ToggleCompletionResponse::failure("Invalid request body")),
                )
                    .into_response();
            }
        }
    };

    let parent = match state.parent_service.resolve_scope(&auth.0, false).await {
        Ok(parent) => parent,
        Err(_) => {
            return (
                StatusCode::FORBIDDEN,
                Json(ToggleCompletionResponse::failure("Access denied")),
            )
                .into_response();
        }
    };

    match state
        .entry_service
        .toggle_completion(&parent, &entry_id, desired, require_task)
        .await
    {
        Ok(is_completed) => Json(ToggleCompletionResponse::ok(is_completed)).into_response(),
        Err(DomainError::AccessDenied) => (
            StatusCode::FORBIDDEN,
            Json(ToggleCompletionResponse::failure("Access denied")),
        )
            .into_response(),
        Err(DomainError::NotFound(what)) => (
            StatusCode::NOT_FOUND,
            Json(ToggleCompletionResponse::failure(format!("{what} not found"))),
        )
            .into_response(),
        Err(err) => {
            error!("toggle completion: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ToggleCompletionResponse::failure("Internal error")),
            )
                .into_response()
        }
    }
}
