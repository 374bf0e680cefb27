use shared::Parent;
use tracing::{info, warn};

use crate::domain::errors::DomainError;
use crate::storage::{AccountRepository, ParentRepository};

/// Resolves the requesting account's parent scope.
///
/// Every authenticated operation goes through here first; all child and
/// entry access is then restricted to the resolved parent's ownership
/// chain.
#[derive(Clone)]
pub struct ParentService {
    parents: ParentRepository,
    accounts: AccountRepository,
}

impl ParentService {
    pub fn new(parents: ParentRepository, accounts: AccountRepository) -> Self {
        Self { parents, accounts }
    }

    /// Look up the parent record for an account.
    ///
    /// With `allow_create` (the onboarding flows) a missing parent row is
    /// created on first touch; otherwise a missing row is an access error.
    pub async fn resolve_scope(
        &self,
        account_id: &str,
        allow_create: bool,
    ) -> Result<Parent, DomainError> {
        if let Some(parent) = self.parents.find_by_account(account_id).await? {
            return Ok(parent);
        }

        if !allow_create {
            warn!("No parent record for account {}", account_id);
            return Err(DomainError::AccessDenied);
        }

        // Onboarding: the account is authenticated but has no parent row
        // yet. Make sure the account actually exists before creating one.
        if self.accounts.get_account(account_id).await?.is_none() {
            warn!("Unknown account {} on onboarding path", account_id);
            return Err(DomainError::AccessDenied);
        }

        let parent = Parent {
            id: Parent::generate_id(),
            account_id: account_id.to_string(),
        };
        self.parents.store_parent(&parent).await?;
        info!("Created parent {} for account {}", parent.id, account_id);

        Ok(parent)
    }
}
