use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::Form;
use tracing::{error, info};

use crate::domain::DomainError;
use crate::io::rest::domain_error_response;
use crate::AppState;
use shared::{RegistrationFormData, RegistrationResponse};

/// Register a new account and its parent record.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegistrationFormData>,
) -> impl IntoResponse {
    info!("POST /register/ - email: {}", form.email);

    match state.registration_service.register(&form).await {
        Ok((account, _parent)) => (
            StatusCode::CREATED,
            Json(RegistrationResponse {
                account,
                success_message: "Account created successfully".to_string(),
            }),
        )
            .into_response(),
        Err(DomainError::InvalidRegistration(errors)) => {
            error!("Registration rejected: {:?}", errors);
            (StatusCode::BAD_REQUEST, Json(errors)).into_response()
        }
        Err(err) => domain_error_response("register", err),
    }
}
