use shared::{ChildFieldError, EntryFieldError, RegistrationFieldError};

/// Error taxonomy for domain operations.
///
/// Validation variants carry the field-level errors the renderer places
/// inline; the remaining variants map to access-denied redirects, 404s and
/// generic 500s at the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("child form validation failed")]
    InvalidChildForm(Vec<ChildFieldError>),

    #[error("entry form validation failed")]
    InvalidEntryForm(Vec<EntryFieldError>),

    #[error("registration validation failed")]
    InvalidRegistration(Vec<RegistrationFieldError>),

    /// The record exists but belongs to another parent.
    #[error("access denied")]
    AccessDenied,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
