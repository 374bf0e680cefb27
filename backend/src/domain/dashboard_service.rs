use std::collections::HashMap;

use shared::{Child, ChildPage, ChildSummary, DashboardPage, EntryCounts, EntryType, Parent};
use tracing::info;

use crate::domain::agenda;
use crate::domain::errors::DomainError;
use crate::storage::{ChildRepository, EntryRepository};

/// Assembles the dashboard and child page models: children with counts,
/// entries partitioned and ordered, aggregate counts recomputed per
/// request.
#[derive(Clone)]
pub struct DashboardService {
    children: ChildRepository,
    entries: EntryRepository,
}

impl DashboardService {
    pub fn new(children: ChildRepository, entries: EntryRepository) -> Self {
        Self { children, entries }
    }

    pub async fn dashboard_page(&self, parent: &Parent) -> Result<DashboardPage, DomainError> {
        let children = self.children.list_for_parent(&parent.id).await?;
        let entries = self.entries.list_for_parent(&parent.id).await?;

        info!(
            "Dashboard for parent {}: {} children, {} entries",
            parent.id,
            children.len(),
            entries.len()
        );

        let counts = EntryCounts::tally(&entries);

        let mut per_child: HashMap<String, EntryCounts> = HashMap::new();
        for entry in &entries {
            let child_counts = per_child.entry(entry.child_id.clone()).or_default();
            child_counts.total += 1;
            match entry.entry_type {
                EntryType::Note => child_counts.notes += 1,
                EntryType::Task => child_counts.tasks += 1,
                EntryType::Event => child_counts.events += 1,
            }
        }

        let show_onboarding = children.is_empty();
        let children = children
            .into_iter()
            .map(|child| {
                let counts = per_child.get(&child.id).copied().unwrap_or_default();
                ChildSummary { child, counts }
            })
            .collect();

        let agenda = agenda::partition(entries);

        Ok(DashboardPage {
            children,
            counts,
            tasks: agenda.tasks,
            events: agenda.events,
            notes: agenda.notes,
            show_onboarding,
        })
    }

    /// Page model for one child. Ownership is checked by the caller via
    /// `ChildService::get_child`.
    pub async fn child_page(&self, child: Child) -> Result<ChildPage, DomainError> {
        let entries = self.entries.list_for_child(&child.id).await?;

        let counts = EntryCounts::tally(&entries);
        let agenda = agenda::partition(entries);

        Ok(ChildPage {
            child,
            counts,
            tasks: agenda.tasks,
            events: agenda.events,
            notes: agenda.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::child_service::ChildService;
    use crate::domain::entry_service::EntryService;
    use crate::storage::{AccountRepository, DbConnection, ParentRepository};
    use chrono::Utc;
    use shared::{Account, ChildFormData, EntryFormData};

    struct Fixture {
        dashboard: DashboardService,
        children: ChildService,
        entries: EntryService,
        parent: Parent,
    }

    async fn setup_test() -> Fixture {
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
            account_id: account.id,
        };
        ParentRepository::new(db.clone())
            .store_parent(&parent)
            .await
            .expect("Failed to store parent");

        let child_repo = ChildRepository::new(db.clone());
        let entry_repo = EntryRepository::new(db.clone());

        Fixture {
            dashboard: DashboardService::new(child_repo.clone(), entry_repo.clone()),
            children: ChildService::new(child_repo),
            entries: EntryService::new(entry_repo, ChildRepository::new(db)),
            parent,
        }
    }

    async fn add_child(f: &Fixture, name: &str) -> Child {
        f.children
            .create_child(
                &f.parent,
                &ChildFormData {
                    name: name.to_string(),
                    ..ChildFormData::default()
                },
            )
            .await
            .expect("Failed to create child")
    }

    async fn add_entry(f: &Fixture, child_id: &str, entry_type: &str, title: &str) {
        f.entries
            .create_entry(
                &f.parent,
                &EntryFormData {
                    title: title.to_string(),
                    child: Some(child_id.to_string()),
                    entry_type: Some(entry_type.to_string()),
                    ..EntryFormData::default()
                },
            )
            .await
            .expect("Failed to create entry");
    }

    #[tokio::test]
    async fn test_empty_dashboard_flags_onboarding() {
        let f = setup_test().await;

        let page = f
            .dashboard
            .dashboard_page(&f.parent)
            .await
            .expect("Dashboard should build");

        assert!(page.show_onboarding);
        assert!(page.children.is_empty());
        assert_eq!(page.counts, EntryCounts::default());
    }

    #[tokio::test]
    async fn test_dashboard_aggregates_across_children() {
        let f = setup_test().await;

        let emma = add_child(&f, "Emma").await;
        let liam = add_child(&f, "Liam").await;

        add_entry(&f, &emma.id, "task", "Homework").await;
        add_entry(&f, &emma.id, "note", "Lunch ideas").await;
        add_entry(&f, &liam.id, "event", "Football").await;
        add_entry(&f, &liam.id, "task", "Reading").await;

        let page = f
            .dashboard
            .dashboard_page(&f.parent)
            .await
            .expect("Dashboard should build");

        assert!(!page.show_onboarding);
        assert_eq!(page.counts.total, 4);
        assert_eq!(page.counts.tasks, 2);
        assert_eq!(page.counts.notes, 1);
        assert_eq!(page.counts.events, 1);
        assert_eq!(page.tasks.len(), 2);
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.notes.len(), 1);

        // Children are listed by name with their own counts.
        assert_eq!(page.children.len(), 2);
        assert_eq!(page.children[0].child.name, "Emma");
        assert_eq!(page.children[0].counts.total, 2);
        assert_eq!(page.children[1].child.name, "Liam");
        assert_eq!(page.children[1].counts.tasks, 1);
    }

    #[tokio::test]
    async fn test_child_page_scopes_to_one_child() {
        let f = setup_test().await;

        let emma = add_child(&f, "Emma").await;
        let liam = add_child(&f, "Liam").await;

        add_entry(&f, &emma.id, "task", "Homework").await;
        add_entry(&f, &liam.id, "task", "Reading").await;

        let page = f
            .dashboard
            .child_page(emma.clone())
            .await
            .expect("Child page should build");

        assert_eq!(page.child.id, emma.id);
        assert_eq!(page.counts.total, 1);
        assert_eq!(page.tasks.len(), 1);
        assert_eq!(page.tasks[0].title, "Homework");
    }
}
