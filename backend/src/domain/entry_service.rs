use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use shared::{Entry, EntryFieldError, EntryFormData, EntryType, Parent, Priority};
use tracing::{info, warn};

use crate::domain::errors::DomainError;
use crate::domain::forms;
use crate::storage::{ChildRepository, EntryRepository};

/// Validated entry form values ready to persist.
struct CleanEntryForm {
    child_id: String,
    title: String,
    entry_type: EntryType,
    category: String,
    description: String,
    priority: Priority,
    due_date: Option<DateTime<Utc>>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    event_date: Option<NaiveDate>,
    event_start_time: Option<NaiveTime>,
    event_end_time: Option<NaiveTime>,
    task_due_date: Option<NaiveDate>,
    task_due_time: Option<NaiveTime>,
    location: String,
}

/// Service for entry CRUD and completion toggling within a parent's scope.
#[derive(Clone)]
pub struct EntryService {
    entries: EntryRepository,
    children: ChildRepository,
}

impl EntryService {
    pub fn new(entries: EntryRepository, children: ChildRepository) -> Self {
        Self { entries, children }
    }

    pub async fn create_entry(
        &self,
        parent: &Parent,
        form: &EntryFormData,
    ) -> Result<Entry, DomainError> {
        let clean = self.validate_form(parent, form, None).await?;
        self.store_new(clean).await
    }

    /// Create a note from the dashboard quick-form. The entry type is
    /// pinned regardless of what the form submitted.
    pub async fn create_note(
        &self,
        parent: &Parent,
        form: &EntryFormData,
    ) -> Result<Entry, DomainError> {
        let clean = self.validate_form(parent, form, Some(EntryType::Note)).await?;
        self.store_new(clean).await
    }

    async fn store_new(&self, clean: CleanEntryForm) -> Result<Entry, DomainError> {
        let now = Utc::now();
        let entry = Entry {
            id: Entry::generate_id(),
            child_id: clean.child_id,
            title: clean.title,
            entry_type: clean.entry_type,
            category: clean.category,
            description: clean.description,
            priority: clean.priority,
            due_date: clean.due_date,
            is_completed: false,
            start_time: clean.start_time,
            end_time: clean.end_time,
            event_date: clean.event_date,
            event_start_time: clean.event_start_time,
            event_end_time: clean.event_end_time,
            task_due_date: clean.task_due_date,
            task_due_time: clean.task_due_time,
            location: clean.location,
            created_at: now,
            updated_at: now,
        };
        self.entries.store_entry(&entry).await?;

        info!("Created {} {}", entry.entry_type, entry.id);

        Ok(entry)
    }

    /// Fetch an entry, enforcing the ownership chain through its child.
    pub async fn get_entry(&self, parent: &Parent, entry_id: &str) -> Result<Entry, DomainError> {
        let entry = self
            .entries
            .get_entry(entry_id)
            .await?
            .ok_or(DomainError::NotFound("entry"))?;

        let child = self
            .children
            .get_child(&entry.child_id)
            .await?
            .ok_or(DomainError::NotFound("child"))?;

        if child.parent_id != parent.id {
            warn!(
                "Parent {} attempted access to entry {} owned elsewhere",
                parent.id, entry.id
            );
            return Err(DomainError::AccessDenied);
        }
        Ok(entry)
    }

    pub async fn update_entry(
        &self,
        parent: &Parent,
        entry_id: &str,
        form: &EntryFormData,
    ) -> Result<Entry, DomainError> {
        let mut entry = self.get_entry(parent, entry_id).await?;
        let clean = self.validate_form(parent, form, None).await?;

        entry.child_id = clean.child_id;
        entry.title = clean.title;
        entry.entry_type = clean.entry_type;
        entry.category = clean.category;
        entry.description = clean.description;
        entry.priority = clean.priority;
        entry.due_date = clean.due_date;
        entry.start_time = clean.start_time;
        entry.end_time = clean.end_time;
        entry.event_date = clean.event_date;
        entry.event_start_time = clean.event_start_time;
        entry.event_end_time = clean.event_end_time;
        entry.task_due_date = clean.task_due_date;
        entry.task_due_time = clean.task_due_time;
        entry.location = clean.location;
        entry.updated_at = Utc::now();

        self.entries.update_entry(&entry).await?;

        info!("Updated entry {}", entry.id);

        Ok(entry)
    }

    pub async fn delete_entry(&self, parent: &Parent, entry_id: &str) -> Result<(), DomainError> {
        let entry = self.get_entry(parent, entry_id).await?;
        self.entries.delete_entry(&entry.id).await?;

        info!("Deleted entry {}", entry.id);

        Ok(())
    }

    /// Toggle (or explicitly set) an entry's completion flag.
    ///
    /// With `require_task` the operation only applies to task entries, as
    /// on the task-list endpoint. Returns the new flag value.
    pub async fn toggle_completion(
        &self,
        parent: &Parent,
        entry_id: &str,
        desired: Option<bool>,
        require_task: bool,
    ) -> Result<bool, DomainError> {
        let entry = self.get_entry(parent, entry_id).await?;

        if require_task && entry.entry_type != EntryType::Task {
            return Err(DomainError::NotFound("task"));
        }

        let new_flag = desired.unwrap_or(!entry.is_completed);
        self.entries
            .set_completion(&entry.id, new_flag, Utc::now())
            .await?;

        info!("Set completion of {} to {}", entry.id, new_flag);

        Ok(new_flag)
    }

    async fn validate_form(
        &self,
        parent: &Parent,
        form: &EntryFormData,
        pinned_type: Option<EntryType>,
    ) -> Result<CleanEntryForm, DomainError> {
        let mut errors = Vec::new();

        let entry_type = match pinned_type {
            Some(t) => Some(t),
            None => match forms::clean(form.entry_type.as_deref()) {
                Some(raw) => {
                    let parsed = EntryType::parse(raw);
                    if parsed.is_none() {
                        errors.push(EntryFieldError::TypeInvalid);
                    }
                    parsed
                }
                None => {
                    errors.push(EntryFieldError::TypeInvalid);
                    None
                }
            },
        };

        let child_id = match forms::clean(form.child.as_deref()) {
            None => {
                errors.push(EntryFieldError::ChildRequired);
                None
            }
            Some(raw) => match self.children.get_child(raw).await? {
                Some(child) if child.parent_id == parent.id => Some(child.id),
                // Unknown ids and other parents' children look the same to
                // the form: an invalid choice.
                _ => {
                    errors.push(EntryFieldError::ChildInvalid);
                    None
                }
            },
        };

        let title = forms::clean_text(Some(form.title.as_str()));
        if title.is_empty() {
            errors.push(EntryFieldError::TitleRequired);
        }

        let category = match forms::clean(form.category.as_deref()) {
            None => "none".to_string(),
            Some(raw) => {
                if !shared::is_valid_entry_category(raw) {
                    errors.push(EntryFieldError::CategoryInvalid);
                }
                raw.to_string()
            }
        };

        let priority = match forms::clean(form.priority.as_deref()) {
            None => Priority::default(),
            Some(raw) => match Priority::parse(raw) {
                Some(priority) => priority,
                None => {
                    errors.push(EntryFieldError::PriorityInvalid);
                    Priority::default()
                }
            },
        };

        let due_date = parse_optional(
            form.due_date.as_deref(),
            forms::parse_datetime,
            EntryFieldError::DueDateInvalid,
            &mut errors,
        );
        let start_time = parse_optional(
            form.start_time.as_deref(),
            forms::parse_datetime,
            EntryFieldError::StartTimeInvalid,
            &mut errors,
        );
        let end_time = parse_optional(
            form.end_time.as_deref(),
            forms::parse_datetime,
            EntryFieldError::EndTimeInvalid,
            &mut errors,
        );
        let event_date = parse_optional(
            form.event_date.as_deref(),
            forms::parse_date,
            EntryFieldError::EventDateInvalid,
            &mut errors,
        );
        let event_start_time = parse_optional(
            form.event_start_time.as_deref(),
            forms::parse_time,
            EntryFieldError::EventStartTimeInvalid,
            &mut errors,
        );
        let event_end_time = parse_optional(
            form.event_end_time.as_deref(),
            forms::parse_time,
            EntryFieldError::EventEndTimeInvalid,
            &mut errors,
        );
        let task_due_date = parse_optional(
            form.task_due_date.as_deref(),
            forms::parse_date,
            EntryFieldError::TaskDueDateInvalid,
            &mut errors,
        );
        let task_due_time = parse_optional(
            form.task_due_time.as_deref(),
            forms::parse_time,
            EntryFieldError::TaskDueTimeInvalid,
            &mut errors,
        );

        // Event windows must run forward. The legacy combined pair and the
        // split pair are checked independently.
        if entry_type == Some(EntryType::Event) {
            if let (Some(start), Some(end)) = (start_time, end_time) {
                if end <= start {
                    errors.push(EntryFieldError::EndBeforeStart);
                }
            }
            if let (Some(start), Some(end)) = (event_start_time, event_end_time) {
                if end <= start {
                    errors.push(EntryFieldError::EventEndBeforeStart);
                }
            }
        }

        match (entry_type, child_id) {
            (Some(entry_type), Some(child_id)) if errors.is_empty() => Ok(CleanEntryForm {
                child_id,
                title,
                entry_type,
                category,
                description: forms::clean_text(form.description.as_deref()),
                priority,
                due_date,
                start_time,
                end_time,
                event_date,
                event_start_time,
                event_end_time,
                task_due_date,
                task_due_time,
                location: forms::clean_text(form.location.as_deref()),
            }),
            _ => Err(DomainError::InvalidEntryForm(errors)),
        }
    }
}

fn parse_optional<T>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
    error: EntryFieldError,
    errors: &mut Vec<EntryFieldError>,
) -> Option<T> {
    let raw = forms::clean(raw)?;
    let parsed = parse(raw);
    if parsed.is_none() {
        errors.push(error);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AccountRepository, DbConnection, ParentRepository};
    use shared::{Account, Child, ChildFormData};

    struct Fixture {
        db: DbConnection,
        service: EntryService,
        children: crate::domain::child_service::ChildService,
        child_repo: ChildRepository,
        parent: Parent,
        child: Child,
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
            account_id: account.id.clone(),
        };
        ParentRepository::new(db.clone())
            .store_parent(&parent)
            .await
            .expect("Failed to store parent");

        let child_repo = ChildRepository::new(db.clone());
        let children = crate::domain::child_service::ChildService::new(child_repo.clone());
        let child = children
            .create_child(
                &parent,
                &ChildFormData {
                    name: "Emma".to_string(),
                    ..ChildFormData::default()
                },
            )
            .await
            .expect("Failed to create child");

        Fixture {
            service: EntryService::new(EntryRepository::new(db.clone()), child_repo.clone()),
            db,
            children,
            child_repo,
            parent,
            child,
        }
    }

    fn task_form(child_id: &str, title: &str) -> EntryFormData {
        EntryFormData {
            title: title.to_string(),
            child: Some(child_id.to_string()),
            entry_type: Some("task".to_string()),
            ..EntryFormData::default()
        }
    }

    fn event_form(child_id: &str, title: &str) -> EntryFormData {
        EntryFormData {
            title: title.to_string(),
            child: Some(child_id.to_string()),
            entry_type: Some("event".to_string()),
            ..EntryFormData::default()
        }
    }

    fn field_errors(result: Result<Entry, DomainError>) -> Vec<EntryFieldError> {
        match result {
            Err(DomainError::InvalidEntryForm(errors)) => errors,
            other => panic!("Expected entry form errors, got {:?}", other.map(|e| e.id)),
        }
    }

    #[tokio::test]
    async fn test_create_task_with_split_due_fields() {
        let f = setup_test().await;

        let mut form = task_form(&f.child.id, "Maths homework");
        form.task_due_date = Some("2025-03-10".to_string());
        form.task_due_time = Some("16:00".to_string());
        form.priority = Some("high".to_string());
        form.category = Some("homework".to_string());

        let entry = f
            .service
            .create_entry(&f.parent, &form)
            .await
            .expect("Create should succeed");

        assert_eq!(entry.entry_type, EntryType::Task);
        assert_eq!(entry.priority, Priority::High);
        assert_eq!(entry.category, "homework");
        assert!(!entry.is_completed);
        assert_eq!(
            entry.task_due_date,
            Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
        );
        assert_eq!(
            entry.task_due_time,
            Some(NaiveTime::from_hms_opt(16, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_missing_child_selection_is_required() {
        let f = setup_test().await;

        let mut form = task_form(&f.child.id, "Task");
        form.child = None;
        let errors = field_errors(f.service.create_entry(&f.parent, &form).await);
        assert!(errors.contains(&EntryFieldError::ChildRequired));

        form.child = Some(String::new());
        let errors = field_errors(f.service.create_entry(&f.parent, &form).await);
        assert!(errors.contains(&EntryFieldError::ChildRequired));
    }

    #[tokio::test]
    async fn test_foreign_child_is_an_invalid_choice() {
        let f = setup_test().await;

        // Another parent with their own child.
        let other_account = Account {
            id: "account::other".to_string(),
            username: "other".to_string(),
            email: "other@example.com".to_string(),
            created_at: Utc::now(),
        };
        let db_parent = Parent {
            id: "parent::other".to_string(),
            account_id: other_account.id.clone(),
        };
        AccountRepository::new(f.db.clone())
            .store_account(&other_account)
            .await
            .expect("Failed to store account");
        ParentRepository::new(f.db.clone())
            .store_parent(&db_parent)
            .await
            .expect("Failed to store parent");

        let foreign_child = f
            .children
            .create_child(
                &db_parent,
                &ChildFormData {
                    name: "Liam".to_string(),
                    ..ChildFormData::default()
                },
            )
            .await
            .expect("Failed to create foreign child");

        let form = task_form(&foreign_child.id, "Task");
        let errors = field_errors(f.service.create_entry(&f.parent, &form).await);
        assert!(errors.contains(&EntryFieldError::ChildInvalid));
    }

    #[tokio::test]
    async fn test_event_end_must_follow_start_on_split_pair() {
        let f = setup_test().await;

        let mut form = event_form(&f.child.id, "Party");
        form.event_date = Some("2025-06-01".to_string());
        form.event_start_time = Some("15:00".to_string());
        form.event_end_time = Some("14:00".to_string());
        let errors = field_errors(f.service.create_entry(&f.parent, &form).await);
        assert!(errors.contains(&EntryFieldError::EventEndBeforeStart));

        // Equal boundaries are rejected too.
        form.event_end_time = Some("15:00".to_string());
        let errors = field_errors(f.service.create_entry(&f.parent, &form).await);
        assert!(errors.contains(&EntryFieldError::EventEndBeforeStart));

        form.event_end_time = Some("17:30".to_string());
        f.service
            .create_entry(&f.parent, &form)
            .await
            .expect("Forward-running window should succeed");
    }

    #[tokio::test]
    async fn test_event_end_must_follow_start_on_legacy_pair() {
        let f = setup_test().await;

        let mut form = event_form(&f.child.id, "Recital");
        form.start_time = Some("2025-06-01 15:00".to_string());
        form.end_time = Some("2025-06-01 14:00".to_string());
        let errors = field_errors(f.service.create_entry(&f.parent, &form).await);
        assert!(errors.contains(&EntryFieldError::EndBeforeStart));

        form.end_time = Some("2025-06-01 16:00".to_string());
        f.service
            .create_entry(&f.parent, &form)
            .await
            .expect("Forward-running window should succeed");
    }

    #[tokio::test]
    async fn test_task_windows_are_not_checked() {
        let f = setup_test().await;

        // The end-after-start rule is an event rule only.
        let mut form = task_form(&f.child.id, "Task");
        form.start_time = Some("2025-06-01 15:00".to_string());
        form.end_time = Some("2025-06-01 14:00".to_string());
        f.service
            .create_entry(&f.parent, &form)
            .await
            .expect("Task with reversed window should still save");
    }

    #[tokio::test]
    async fn test_create_note_pins_entry_type() {
        let f = setup_test().await;

        let mut form = EntryFormData {
            title: "Packed lunch ideas".to_string(),
            child: Some(f.child.id.clone()),
            description: Some("Wraps, fruit, crackers".to_string()),
            ..EntryFormData::default()
        };
        // Even a contradictory submitted type is overridden.
        form.entry_type = Some("event".to_string());

        let note = f
            .service
            .create_note(&f.parent, &form)
            .await
            .expect("Note creation should succeed");
        assert_eq!(note.entry_type, EntryType::Note);
    }

    #[tokio::test]
    async fn test_toggle_flips_only_the_targeted_entry() {
        let f = setup_test().await;

        let first = f
            .service
            .create_entry(&f.parent, &task_form(&f.child.id, "First"))
            .await
            .expect("Create should succeed");
        let second = f
            .service
            .create_entry(&f.parent, &task_form(&f.child.id, "Second"))
            .await
            .expect("Create should succeed");

        let flag = f
            .service
            .toggle_completion(&f.parent, &first.id, None, true)
            .await
            .expect("Toggle should succeed");
        assert!(flag);

        let first_after = f.service.get_entry(&f.parent, &first.id).await.unwrap();
        let second_after = f.service.get_entry(&f.parent, &second.id).await.unwrap();
        assert!(first_after.is_completed);
        assert!(!second_after.is_completed);

        // Toggling again flips back.
        let flag = f
            .service
            .toggle_completion(&f.parent, &first.id, None, true)
            .await
            .expect("Toggle should succeed");
        assert!(!flag);
    }

    #[tokio::test]
    async fn test_toggle_with_explicit_desired_state() {
        let f = setup_test().await;

        let task = f
            .service
            .create_entry(&f.parent, &task_form(&f.child.id, "Task"))
            .await
            .expect("Create should succeed");

        let flag = f
            .service
            .toggle_completion(&f.parent, &task.id, Some(true), true)
            .await
            .expect("Set should succeed");
        assert!(flag);

        // Setting the same value again is idempotent.
        let flag = f
            .service
            .toggle_completion(&f.parent, &task.id, Some(true), true)
            .await
            .expect("Set should succeed");
        assert!(flag);
    }

    #[tokio::test]
    async fn test_task_endpoint_rejects_non_tasks() {
        let f = setup_test().await;

        let mut form = event_form(&f.child.id, "Event");
        form.event_date = Some("2025-06-01".to_string());
        let event = f
            .service
            .create_entry(&f.parent, &form)
            .await
            .expect("Create should succeed");

        let result = f
            .service
            .toggle_completion(&f.parent, &event.id, None, true)
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));

        // The generic endpoint accepts any entry type.
        f.service
            .toggle_completion(&f.parent, &event.id, None, false)
            .await
            .expect("Generic toggle should succeed");
    }

    #[tokio::test]
    async fn test_update_preserves_creation_and_completion() {
        let f = setup_test().await;

        let task = f
            .service
            .create_entry(&f.parent, &task_form(&f.child.id, "Task"))
            .await
            .expect("Create should succeed");
        f.service
            .toggle_completion(&f.parent, &task.id, Some(true), true)
            .await
            .expect("Set should succeed");

        let mut form = task_form(&f.child.id, "Task, renamed");
        form.task_due_date = Some("2025-04-01".to_string());
        let updated = f
            .service
            .update_entry(&f.parent, &task.id, &form)
            .await
            .expect("Update should succeed");

        assert_eq!(updated.title, "Task, renamed");
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.is_completed);
        assert!(updated.updated_at > task.updated_at);
    }

    #[tokio::test]
    async fn test_deleting_child_cascades_to_entries() {
        let f = setup_test().await;

        f.service
            .create_entry(&f.parent, &task_form(&f.child.id, "Task"))
            .await
            .expect("Create should succeed");
        f.service
            .create_note(
                &f.parent,
                &EntryFormData {
                    title: "Note".to_string(),
                    child: Some(f.child.id.clone()),
                    ..EntryFormData::default()
                },
            )
            .await
            .expect("Create should succeed");

        f.children
            .delete_child(&f.parent, &f.child.id)
            .await
            .expect("Delete should succeed");

        let remaining = f
            .child_repo
            .get_child(&f.child.id)
            .await
            .expect("Query should succeed");
        assert!(remaining.is_none());

        let entries = EntryRepository::new(f.db.clone())
            .list_for_child(&f.child.id)
            .await
            .expect("Query should succeed");
        assert!(entries.is_empty(), "Cascade should remove the child's entries");
    }
}
