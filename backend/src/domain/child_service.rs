use chrono::{Local, NaiveDate, Utc};
use rand::seq::SliceRandom;
use shared::{Child, ChildFieldError, ChildFormData, Parent, COLOUR_PALETTE};
use tracing::{info, warn};

use crate::domain::errors::DomainError;
use crate::domain::forms;
use crate::storage::ChildRepository;

/// Validated child form values ready to persist.
struct CleanChildForm {
    name: String,
    birth_date: Option<NaiveDate>,
    school: String,
    year: String,
    class_name: String,
    colour: String,
}

/// Service for managing child profiles within a parent's scope.
#[derive(Clone)]
pub struct ChildService {
    children: ChildRepository,
}

impl ChildService {
    pub fn new(children: ChildRepository) -> Self {
        Self { children }
    }

    /// Pick a colour for profiles that did not choose one.
    pub fn random_palette_colour() -> String {
        COLOUR_PALETTE
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(COLOUR_PALETTE[0])
            .to_string()
    }

    pub async fn create_child(
        &self,
        parent: &Parent,
        form: &ChildFormData,
    ) -> Result<Child, DomainError> {
        let clean = validate_form(form)?;

        let now = Utc::now();
        let child = Child {
            id: Child::generate_id(),
            parent_id: parent.id.clone(),
            name: clean.name,
            birth_date: clean.birth_date,
            school: clean.school,
            year: clean.year,
            class_name: clean.class_name,
            colour: clean.colour,
            created_at: now,
            updated_at: now,
        };
        self.children.store_child(&child).await?;

        info!("Created child {} for parent {}", child.id, parent.id);

        Ok(child)
    }

    /// Fetch a child, enforcing the ownership chain. A record owned by
    /// another parent is an access error, not a lookup miss.
    pub async fn get_child(&self, parent: &Parent, child_id: &str) -> Result<Child, DomainError> {
        let child = self
            .children
            .get_child(child_id)
            .await?
            .ok_or(DomainError::NotFound("child"))?;

        if child.parent_id != parent.id {
            warn!(
                "Parent {} attempted access to child {} owned elsewhere",
                parent.id, child.id
            );
            return Err(DomainError::AccessDenied);
        }
        Ok(child)
    }

    pub async fn list_children(&self, parent: &Parent) -> Result<Vec<Child>, DomainError> {
        Ok(self.children.list_for_parent(&parent.id).await?)
    }

    pub async fn count_children(&self, parent: &Parent) -> Result<u32, DomainError> {
        Ok(self.children.count_for_parent(&parent.id).await?)
    }

    pub async fn update_child(
        &self,
        parent: &Parent,
        child_id: &str,
        form: &ChildFormData,
    ) -> Result<Child, DomainError> {
        let mut child = self.get_child(parent, child_id).await?;
        let clean = validate_form(form)?;

        child.name = clean.name;
        child.birth_date = clean.birth_date;
        child.school = clean.school;
        child.year = clean.year;
        child.class_name = clean.class_name;
        child.colour = clean.colour;
        child.updated_at = Utc::now();

        self.children.update_child(&child).await?;

        info!("Updated child {}", child.id);

        Ok(child)
    }

    /// Delete a child and, through the cascade, all of its entries.
    pub async fn delete_child(&self, parent: &Parent, child_id: &str) -> Result<(), DomainError> {
        let child = self.get_child(parent, child_id).await?;
        self.children.delete_child(&child.id).await?;

        info!("Deleted child {} and its entries", child.id);

        Ok(())
    }
}

fn validate_form(form: &ChildFormData) -> Result<CleanChildForm, DomainError> {
    let mut errors = Vec::new();

    let name = forms::clean_text(Some(form.name.as_str()));
    if name.is_empty() {
        errors.push(ChildFieldError::NameRequired);
    }

    let birth_date = match forms::clean(form.birth_date.as_deref()) {
        None => None,
        Some(raw) => match forms::parse_date(raw) {
            None => {
                errors.push(ChildFieldError::BirthDateInvalid);
                None
            }
            Some(date) => {
                if date > Local::now().date_naive() {
                    errors.push(ChildFieldError::BirthDateInFuture);
                }
                Some(date)
            }
        },
    };

    let colour = match forms::clean(form.colour.as_deref()) {
        None => ChildService::random_palette_colour(),
        Some(raw) => {
            if !shared::is_palette_colour(raw) {
                errors.push(ChildFieldError::ColourInvalid);
            }
            raw.to_string()
        }
    };

    if !errors.is_empty() {
        return Err(DomainError::InvalidChildForm(errors));
    }

    Ok(CleanChildForm {
        name,
        birth_date,
        school: forms::clean_text(form.school.as_deref()),
        year: forms::clean_text(form.year.as_deref()),
        class_name: forms::clean_text(form.class_name.as_deref()),
        colour,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AccountRepository, DbConnection, ParentRepository};
    use shared::Account;

    async fn setup_test() -> (ChildService, Parent) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");

        let account = Account {
            id: "account::test".to_string(),
            username: "test".to_string(),
            email: "test@example.com".to_string(),
            created_at: Utc::now(),
        };
        AccountRepository::new(db.clone())
            .store_account(&account)
            .await
            .expect("Failed to store account");

        let parent = Parent {
            id: "parent::test".to_string(),
            account_id: account.id.clone(),
        };
        ParentRepository::new(db.clone())
            .store_parent(&parent)
            .await
            .expect("Failed to store parent");

        (ChildService::new(ChildRepository::new(db)), parent)
    }

    fn form(name: &str) -> ChildFormData {
        ChildFormData {
            name: name.to_string(),
            ..ChildFormData::default()
        }
    }

    #[tokio::test]
    async fn test_create_child_trims_name() {
        let (service, parent) = setup_test().await;

        let child = service
            .create_child(&parent, &form("  Emma  "))
            .await
            .expect("Create should succeed");
        assert_eq!(child.name, "Emma");
        assert!(shared::is_palette_colour(&child.colour));
    }

    #[tokio::test]
    async fn test_empty_or_whitespace_name_fails_validation() {
        let (service, parent) = setup_test().await;

        for bad in ["", "   ", "\t"] {
            let result = service.create_child(&parent, &form(bad)).await;
            match result {
                Err(DomainError::InvalidChildForm(errors)) => {
                    assert!(errors.contains(&ChildFieldError::NameRequired));
                }
                other => panic!("Name {bad:?} should fail, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[tokio::test]
    async fn test_future_birth_date_fails_today_succeeds() {
        let (service, parent) = setup_test().await;

        let today = Local::now().date_naive();
        let tomorrow = today.succ_opt().expect("tomorrow exists");

        let mut future = form("Emma");
        future.birth_date = Some(tomorrow.format("%Y-%m-%d").to_string());
        let result = service.create_child(&parent, &future).await;
        match result {
            Err(DomainError::InvalidChildForm(errors)) => {
                assert!(errors.contains(&ChildFieldError::BirthDateInFuture));
            }
            other => panic!("Future birth date should fail, got {:?}", other.map(|_| ())),
        }

        let mut todays = form("Emma");
        todays.birth_date = Some(today.format("%Y-%m-%d").to_string());
        let child = service
            .create_child(&parent, &todays)
            .await
            .expect("Birth date of today should succeed");
        assert_eq!(child.birth_date, Some(today));
    }

    #[tokio::test]
    async fn test_unparseable_birth_date_fails() {
        let (service, parent) = setup_test().await;

        let mut bad = form("Emma");
        bad.birth_date = Some("31/12/2015".to_string());
        let result = service.create_child(&parent, &bad).await;
        assert!(matches!(result, Err(DomainError::InvalidChildForm(_))));
    }

    #[tokio::test]
    async fn test_colour_outside_palette_is_rejected() {
        let (service, parent) = setup_test().await;

        let mut bad = form("Emma");
        bad.colour = Some("#123456".to_string());
        let result = service.create_child(&parent, &bad).await;
        match result {
            Err(DomainError::InvalidChildForm(errors)) => {
                assert!(errors.contains(&ChildFieldError::ColourInvalid));
            }
            other => panic!("Off-palette colour should fail, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_update_child_replaces_fields() {
        let (service, parent) = setup_test().await;

        let child = service
            .create_child(&parent, &form("Emma"))
            .await
            .expect("Create should succeed");

        let mut updated_form = form("Emma Rose");
        updated_form.school = Some("Hilltop Primary".to_string());
        let updated = service
            .update_child(&parent, &child.id, &updated_form)
            .await
            .expect("Update should succeed");

        assert_eq!(updated.name, "Emma Rose");
        assert_eq!(updated.school, "Hilltop Primary");
        assert_eq!(updated.created_at, child.created_at);
    }

    #[tokio::test]
    async fn test_foreign_child_is_access_denied() {
        let (service, parent) = setup_test().await;
        let child = service
            .create_child(&parent, &form("Emma"))
            .await
            .expect("Create should succeed");

        let stranger = Parent {
            id: "parent::stranger".to_string(),
            account_id: "account::stranger".to_string(),
        };
        let result = service.get_child(&stranger, &child.id).await;
        assert!(matches!(result, Err(DomainError::AccessDenied)));
    }

    #[tokio::test]
    async fn test_missing_child_is_not_found() {
        let (service, parent) = setup_test().await;

        let result = service.get_child(&parent, "child::missing").await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_random_colour_comes_from_palette() {
        for _ in 0..50 {
            assert!(shared::is_palette_colour(&ChildService::random_palette_colour()));
        }
    }
}
