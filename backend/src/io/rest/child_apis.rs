use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Form;
use tracing::info;

use crate::domain::{ChildService, DomainError};
use crate::io::auth::AuthAccount;
use crate::io::rest::{domain_error_response, redirect_with_notice, OnboardingQuery};
use crate::AppState;
use shared::{
    Child, ChildFieldError, ChildFormData, ChildFormPage, OnboardingDecisionPage, Parent,
    COLOUR_PALETTE,
};

fn palette() -> Vec<String> {
    COLOUR_PALETTE.iter().map(|c| c.to_string()).collect()
}

fn form_page(form: ChildFormData, errors: Vec<ChildFieldError>, child: Option<Child>) -> ChildFormPage {
    ChildFormPage {
        form,
        errors,
        palette: palette(),
        suggested_colour: ChildService::random_palette_colour(),
        child,
    }
}

/// Pre-fill the form from a stored child for the edit page.
fn form_from_child(child: &Child) -> ChildFormData {
    ChildFormData {
        name: child.name.clone(),
        birth_date: child.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
        school: Some(child.school.clone()),
        year: Some(child.year.clone()),
        class_name: Some(child.class_name.clone()),
        colour: Some(child.colour.clone()),
    }
}

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

/// Blank child form.
pub async fn add_child_page(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
) -> Response {
    info!("GET /add-child/");

    if let Err(response) = resolve_parent(&state, &auth, &query).await {
        return response;
    }

    Json(form_page(ChildFormData::default(), Vec::new(), None)).into_response()
}

pub async fn create_child(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Form(form): Form<ChildFormData>,
) -> Response {
    info!("POST /add-child/ - name: {:?}", form.name);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    match state.child_service.create_child(&parent, &form).await {
        Ok(child) => {
            // The first child routes through the onboarding decision page.
            match state.child_service.count_children(&parent).await {
                Ok(1) => redirect_with_notice(
                    &format!("/onboarding-decision/{}/", child.id),
                    "child-created",
                )
                .into_response(),
                Ok(_) => redirect_with_notice("/dashboard/", "child-created").into_response(),
                Err(err) => domain_error_response("create child", err),
            }
        }
        Err(DomainError::InvalidChildForm(errors)) => (
            StatusCode::BAD_REQUEST,
            Json(form_page(form, errors, None)),
        )
            .into_response(),
        Err(err) => domain_error_response("create child", err),
    }
}

/// Child form pre-filled for editing.
pub async fn edit_child_page(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Path(child_id): Path<String>,
) -> Response {
    info!("GET /edit-child/{}/", child_id);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    match state.child_service.get_child(&parent, &child_id).await {
        Ok(child) => {
            let form = form_from_child(&child);
            Json(form_page(form, Vec::new(), Some(child))).into_response()
        }
        Err(err) => domain_error_response("edit child page", err),
    }
}

pub async fn update_child(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Path(child_id): Path<String>,
    Form(form): Form<ChildFormData>,
) -> Response {
    info!("POST /edit-child/{}/", child_id);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    match state
        .child_service
        .update_child(&parent, &child_id, &form)
        .await
    {
        Ok(_) => redirect_with_notice("/dashboard/", "child-updated").into_response(),
        Err(DomainError::InvalidChildForm(errors)) => {
            let child = state.child_service.get_child(&parent, &child_id).await.ok();
            (
                StatusCode::BAD_REQUEST,
                Json(form_page(form, errors, child)),
            )
                .into_response()
        }
        Err(err) => domain_error_response("update child", err),
    }
}

pub async fn delete_child(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Path(child_id): Path<String>,
) -> Response {
    info!("POST /delete-child/{}/", child_id);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    match state.child_service.delete_child(&parent, &child_id).await {
        Ok(()) => redirect_with_notice("/dashboard/", "child-deleted").into_response(),
        Err(err) => domain_error_response("delete child", err),
    }
}

/// Post-first-child prompt: add another child or continue to the dashboard.
pub async fn onboarding_decision(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(query): Query<OnboardingQuery>,
    Path(child_id): Path<String>,
) -> Response {
    info!("GET /onboarding-decision/{}/", child_id);

    let parent = match resolve_parent(&state, &auth, &query).await {
        Ok(parent) => parent,
        Err(response) => return response,
    };

    let child = match state.child_service.get_child(&parent, &child_id).await {
        Ok(child) => child,
        Err(err) => return domain_error_response("onboarding decision", err),
    };

    match state.child_service.count_children(&parent).await {
        Ok(count) => Json(OnboardingDecisionPage {
            child,
            children_count: count as usize,
        })
        .into_response(),
        Err(err) => domain_error_response("onboarding decision", err),
    }
}
