use shared::{Category, ENTRY_CATEGORIES};
use tracing::info;

use crate::domain::errors::DomainError;
use crate::storage::CategoryRepository;

/// Service for the category tree offered on entry forms.
#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryRepository,
}

impl CategoryService {
    pub fn new(categories: CategoryRepository) -> Self {
        Self { categories }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list_categories().await?)
    }

    /// Seed the tree with one root per built-in tag on first startup. The
    /// "none" placeholder stays a tag only and gets no tree node.
    pub async fn seed_defaults(&self) -> Result<(), DomainError> {
        if self.categories.count_categories().await? > 0 {
            return Ok(());
        }

        for slug in ENTRY_CATEGORIES.iter().filter(|s| **s != "none") {
            let mut name = slug.to_string();
            if let Some(first) = name.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            let category = Category {
                id: Category::generate_id(),
                name,
                parent_id: None,
            };
            self.categories.store_category(&category).await?;
        }

        info!("Seeded default category tree");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;

    async fn setup_test() -> CategoryService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        CategoryService::new(CategoryRepository::new(db))
    }

    #[tokio::test]
    async fn test_seed_creates_roots_once() {
        let service = setup_test().await;

        service.seed_defaults().await.expect("Seeding should succeed");
        let categories = service.list_categories().await.expect("List should succeed");
        assert_eq!(categories.len(), ENTRY_CATEGORIES.len() - 1);
        assert!(categories.iter().all(|c| c.parent_id.is_none()));
        assert!(categories.iter().any(|c| c.name == "Homework"));

        // Re-seeding is a no-op.
        service.seed_defaults().await.expect("Seeding should succeed");
        let again = service.list_categories().await.expect("List should succeed");
        assert_eq!(again.len(), categories.len());
    }
}
