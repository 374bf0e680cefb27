//! Authenticated account identity.
//!
//! Session handling and credential checks live in the authentication layer
//! in front of this service; it forwards the verified account id in a
//! request header. Handlers take [`AuthAccount`] to require a signed-in
//! caller, or `Option<AuthAccount>` where anonymous access is allowed.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};

/// Header carrying the verified account id.
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// The verified account id of the requesting user.
#[derive(Debug, Clone)]
pub struct AuthAccount(pub String);

/// Rejection for unauthenticated requests: back to the landing page.
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/").into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthAccount
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACCOUNT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| AuthAccount(value.to_string()))
            .ok_or(AuthRedirect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AuthAccount, AuthRedirect> {
        let (mut parts, _) = request.into_parts();
        AuthAccount::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_header_yields_account_id() {
        let request = Request::builder()
            .header(ACCOUNT_ID_HEADER, "account::abc")
            .body(())
            .unwrap();

        let auth = extract(request).await;
        assert_eq!(auth.ok().map(|a| a.0), Some("account::abc".to_string()));
    }

    #[tokio::test]
    async fn test_missing_or_blank_header_is_rejected() {
        let request = Request::builder().body(()).unwrap();
        assert!(extract(request).await.is_err());

        let request = Request::builder()
            .header(ACCOUNT_ID_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(extract(request).await.is_err());
    }
}
