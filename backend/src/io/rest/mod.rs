//! # REST Interface Layer
//!
//! HTTP endpoints for the planner's pages and forms. This layer handles:
//! - Form and JSON deserialization
//! - Error translation from domain errors to HTTP responses
//! - Post-submit redirects with transient notices
//! - Request logging
//!
//! Handlers stay a pure translation layer: ownership rules, validation and
//! ordering all live in the domain services.

pub mod child_apis;
pub mod dashboard_apis;
pub mod entry_apis;
pub mod page_apis;
pub mod registration_apis;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::error;

use crate::domain::DomainError;

/// Query string shared by the page routes. The onboarding flag lets a
/// freshly authenticated account create its parent record on first touch.
#[derive(Debug, Default, Deserialize)]
pub struct OnboardingQuery {
    #[serde(default)]
    pub onboarding: Option<String>,
}

impl OnboardingQuery {
    pub fn is_onboarding(&self) -> bool {
        self.onboarding.as_deref() == Some("true")
    }
}

/// Redirect (303) carrying a transient notice for the next page render.
pub fn redirect_with_notice(path: &str, notice: &str) -> Redirect {
    Redirect::to(&format!("{path}?notice={notice}"))
}

/// Map non-validation domain errors onto HTTP responses. Validation
/// variants are handled per-form by the submitting handler.
pub(crate) fn domain_error_response(context: &str, err: DomainError) -> Response {
    match err {
        DomainError::AccessDenied => {
            redirect_with_notice("/dashboard/", "access-denied").into_response()
        }
        DomainError::NotFound(what) => {
            (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
        }
        DomainError::Internal(e) => {
            error!("{context}: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
        DomainError::InvalidChildForm(_)
        | DomainError::InvalidEntryForm(_)
        | DomainError::InvalidRegistration(_) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
    }
}
