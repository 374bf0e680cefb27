use axum::response::{IntoResponse, Json, Redirect};
use tracing::info;

use crate::io::auth::AuthAccount;
use shared::LandingPage;

/// Entry point: signed-in visitors go to the dashboard, everyone else gets
/// the landing page model.
pub async fn home(auth: Option<AuthAccount>) -> impl IntoResponse {
    info!("GET /");

    match auth {
        Some(_) => Redirect::to("/dashboard/").into_response(),
        None => Json(LandingPage {
            authenticated: false,
        })
        .into_response(),
    }
}
