use chrono::Utc;
use shared::{Account, Parent, RegistrationFormData, RegistrationFieldError};
use tracing::info;

use crate::domain::errors::DomainError;
use crate::domain::forms;
use crate::storage::{AccountRepository, ParentRepository};

/// Handles new account registration.
///
/// Credential handling (passwords, sessions) lives with the upstream
/// authentication service; this service owns the identity columns and the
/// username derivation rules.
#[derive(Clone)]
pub struct RegistrationService {
    accounts: AccountRepository,
    parents: ParentRepository,
}

impl RegistrationService {
    pub fn new(accounts: AccountRepository, parents: ParentRepository) -> Self {
        Self { accounts, parents }
    }

    /// Register a new account and its parent record.
    ///
    /// The username falls back to the email local part when omitted, with a
    /// numeric suffix appended until it no longer collides.
    pub async fn register(
        &self,
        form: &RegistrationFormData,
    ) -> Result<(Account, Parent), DomainError> {
        let mut errors = Vec::new();

        let email = forms::clean(Some(form.email.as_str())).map(str::to_string);
        let email = match email {
            None => {
                errors.push(RegistrationFieldError::EmailRequired);
                None
            }
            Some(email) if !is_well_formed_email(&email) => {
                errors.push(RegistrationFieldError::EmailInvalid);
                None
            }
            Some(email) => {
                if self.accounts.email_exists(&email).await? {
                    errors.push(RegistrationFieldError::EmailTaken);
                    None
                } else {
                    Some(email)
                }
            }
        };

        let explicit_username = forms::clean(form.username.as_deref()).map(str::to_string);
        if let Some(ref username) = explicit_username {
            if self.accounts.username_exists(username).await? {
                errors.push(RegistrationFieldError::UsernameTaken);
            }
        }

        let email = match email {
            Some(email) if errors.is_empty() => email,
            _ => return Err(DomainError::InvalidRegistration(errors)),
        };
        let username = match explicit_username {
            Some(username) => username,
            None => self.derive_username(&email).await?,
        };

        let account = Account {
            id: Account::generate_id(),
            username,
            email,
            created_at: Utc::now(),
        };
        self.accounts.store_account(&account).await?;

        let parent = Parent {
            id: Parent::generate_id(),
            account_id: account.id.clone(),
        };
        self.parents.store_parent(&parent).await?;

        info!("Registered account {} as {}", account.id, account.username);

        Ok((account, parent))
    }

    /// Derive a username from the email local part, disambiguating
    /// collisions with a numeric suffix: `jdoe`, `jdoe1`, `jdoe2`, ...
    async fn derive_username(&self, email: &str) -> Result<String, DomainError> {
        let base = email.split('@').next().unwrap_or(email);

        let mut candidate = base.to_string();
        let mut counter = 1u32;
        while self.accounts.username_exists(&candidate).await? {
            candidate = format!("{base}{counter}");
            counter += 1;
        }
        Ok(candidate)
    }
}

/// Minimal shape check: one `@` with non-empty, whitespace-free sides.
fn is_well_formed_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
}
