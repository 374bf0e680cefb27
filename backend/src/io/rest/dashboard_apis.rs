use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Form;
use tracing::info;

use crate::domain::DomainError;
use crate::io::auth::AuthAccount;
use crate::io::rest::{domain_error_response, entry_apis, redirect_with_notice, OnboardingQuery};
use crate::AppState;
use shared::EntryFormData;

/// The aggregate view: children with counts plus every entry of the
/// parent, partitioned and ordered.
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
) -> Response {
    info!("GET /dashboard/");

    let parent = match state
        .parent_service
        .resolve_scope(&auth.0, query.is_onboarding())
        .await
    {
        Ok(parent) => parent,
        Err(err) => return domain_error_response("dashboard", err),
    };

    match state.dashboard_service.dashboard_page(&parent).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => domain_error_response("dashboard", err),
    }
}

/// Quick-add submission from the dashboard. A hidden `entry_type=note`
/// field routes the note form; everything else is a full entry.
pub async fn dashboard_quick_add(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Form(form): Form<EntryFormData>,
) -> Response {
    info!("POST /dashboard/ - title: {:?}", form.title);

    let parent = match state
        .parent_service
        .resolve_scope(&auth.0, query.is_onboarding())
        .await
    {
        Ok(parent) => parent,
        Err(err) => return domain_error_response("dashboard quick add", err),
    };

    let is_note = form.entry_type.as_deref() == Some("note");
    let result = if is_note {
        state.entry_service.create_note(&parent, &form).await
    } else {
        state.entry_service.create_entry(&parent, &form).await
    };

    match result {
        Ok(_) => {
            let notice = if is_note { "note-added" } else { "entry-added" };
            redirect_with_notice("/dashboard/", notice).into_response()
        }
        Err(DomainError::InvalidEntryForm(errors)) => {
            match entry_apis::form_page(&state, &parent, form, errors, None).await {
                Ok(page) => (StatusCode::BAD_REQUEST, Json(page)).into_response(),
                Err(response) => response,
            }
        }
        Err(err) => domain_error_response("dashboard quick add", err),
    }
}
