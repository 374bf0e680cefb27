use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed colour palette for child profiles. The form layer falls back to a
/// random pick from this list when no colour is submitted.
pub const COLOUR_PALETTE: [&str; 10] = [
    "#FF6B6B", "#FF9F1C", "#FFD93D", "#6BCB77", "#2EC4B6", "#00BBF9", "#4D96FF", "#9B5DE5",
    "#F15BB5", "#F59E0B",
];

/// Returns true when `colour` is one of the palette entries.
pub fn is_palette_colour(colour: &str) -> bool {
    COLOUR_PALETTE.iter().any(|c| c.eq_ignore_ascii_case(colour))
}

/// Category tags an entry can carry. Stored as slugs on the entry row.
pub const ENTRY_CATEGORIES: [&str; 11] = [
    "none",
    "homework",
    "health",
    "school",
    "activities",
    "chores",
    "appointments",
    "reminders",
    "celebrations",
    "achievements",
    "other",
];

pub fn is_valid_entry_category(slug: &str) -> bool {
    ENTRY_CATEGORIES.contains(&slug)
}

/// An account record as forwarded by the authentication layer. Credentials
/// are owned upstream; this service only stores the identity columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn generate_id() -> String {
        format!("account::{}", uuid::Uuid::new_v4())
    }
}

/// The account-holder role. Owns children and, transitively, entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: String,
    pub account_id: String,
}

impl Parent {
    pub fn generate_id() -> String {
        format!("parent::{}", uuid::Uuid::new_v4())
    }
}

/// A child profile belonging to a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub school: String,
    pub year: String,
    pub class_name: String,
    /// Hex colour code from [`COLOUR_PALETTE`].
    pub colour: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Child {
    pub fn generate_id() -> String {
        format!("child::{}", uuid::Uuid::new_v4())
    }
}

/// A node in the user-visible category tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Parent category, None for roots.
    pub parent_id: Option<String>,
}

impl Category {
    pub fn generate_id() -> String {
        format!("category::{}", uuid::Uuid::new_v4())
    }
}

/// The three entry kinds the planner records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Note,
    Task,
    Event,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Note => "note",
            EntryType::Task => "task",
            EntryType::Event => "event",
        }
    }

    pub fn parse(value: &str) -> Option<EntryType> {
        match value {
            "note" => Some(EntryType::Note),
            "task" => Some(EntryType::Task),
            "event" => Some(EntryType::Event),
            _ => None,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Priority> {
        match value {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A note, task or event attached to a child.
///
/// Two generations of scheduling fields coexist: the legacy combined
/// date-times (`due_date`, `start_time`, `end_time`) and the newer split
/// date + time columns. The split fields win when set; the `*_for_sort`
/// accessors fold both generations into one view for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub child_id: String,
    pub title: String,
    pub entry_type: EntryType,
    /// Category slug from [`ENTRY_CATEGORIES`].
    pub category: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub event_date: Option<NaiveDate>,
    pub event_start_time: Option<NaiveTime>,
    pub event_end_time: Option<NaiveTime>,
    pub task_due_date: Option<NaiveDate>,
    pub task_due_time: Option<NaiveTime>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    pub fn generate_id() -> String {
        format!("entry::{}", uuid::Uuid::new_v4())
    }

    /// Due date used for task ordering: split field first, legacy fallback.
    pub fn due_date_for_sort(&self) -> Option<NaiveDate> {
        self.task_due_date
            .or_else(|| self.due_date.map(|dt| dt.date_naive()))
    }

    /// Due time used for task ordering.
    pub fn due_time_for_sort(&self) -> Option<NaiveTime> {
        self.task_due_time.or_else(|| self.due_date.map(|dt| dt.time()))
    }

    /// Calendar date used for event ordering.
    pub fn event_date_for_sort(&self) -> Option<NaiveDate> {
        self.event_date
            .or_else(|| self.start_time.map(|dt| dt.date_naive()))
    }

    /// Start time used for event ordering.
    pub fn event_start_for_sort(&self) -> Option<NaiveTime> {
        self.event_start_time
            .or_else(|| self.start_time.map(|dt| dt.time()))
    }
}

/// Aggregate entry counts for a dashboard or child page scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryCounts {
    pub total: usize,
    pub notes: usize,
    pub tasks: usize,
    pub events: usize,
}

impl EntryCounts {
    /// Count entries per kind in one pass.
    pub fn tally<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut counts = EntryCounts::default();
        for entry in entries {
            counts.total += 1;
            match entry.entry_type {
                EntryType::Note => counts.notes += 1,
                EntryType::Task => counts.tasks += 1,
                EntryType::Event => counts.events += 1,
            }
        }
        counts
    }
}

// ---------------------------------------------------------------------------
// Form payloads
//
// Fields arrive as raw strings from the submitted form; the domain layer
// coerces and validates them, mirroring how the browser sends empty inputs
// as empty strings rather than omitting them.
// ---------------------------------------------------------------------------

/// Registration form submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationFormData {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Child create/edit form submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub colour: Option<String>,
}

/// Entry create/edit form submission. Also the dashboard quick-add payload;
/// a hidden `entry_type=note` field routes submissions down the note path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFormData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub child: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub event_start_time: Option<String>,
    #[serde(default)]
    pub event_end_time: Option<String>,
    #[serde(default)]
    pub task_due_date: Option<String>,
    #[serde(default)]
    pub task_due_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

// ---------------------------------------------------------------------------
// Field-level validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationFieldError {
    EmailRequired,
    EmailInvalid,
    EmailTaken,
    UsernameTaken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildFieldError {
    NameRequired,
    BirthDateInvalid,
    BirthDateInFuture,
    ColourInvalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryFieldError {
    ChildRequired,
    ChildInvalid,
    TitleRequired,
    TypeInvalid,
    PriorityInvalid,
    CategoryInvalid,
    DueDateInvalid,
    StartTimeInvalid,
    EndTimeInvalid,
    /// Legacy combined pair: end not strictly after start.
    EndBeforeStart,
    EventDateInvalid,
    EventStartTimeInvalid,
    EventEndTimeInvalid,
    /// Split pair: end not strictly after start.
    EventEndBeforeStart,
    TaskDueDateInvalid,
    TaskDueTimeInvalid,
}

// ---------------------------------------------------------------------------
// Page models and responses
// ---------------------------------------------------------------------------

/// Landing page model for unauthenticated visitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingPage {
    pub authenticated: bool,
}

/// A child plus its per-child entry counts, as shown on dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSummary {
    pub child: Child,
    pub counts: EntryCounts,
}

/// The dashboard page model: every child of the parent, aggregate counts
/// and the parent's entries partitioned and ordered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardPage {
    pub children: Vec<ChildSummary>,
    pub counts: EntryCounts,
    pub tasks: Vec<Entry>,
    pub events: Vec<Entry>,
    pub notes: Vec<Entry>,
    /// True when the parent has no children yet and onboarding should run.
    pub show_onboarding: bool,
}

/// A single child's page: its entries partitioned and ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildPage {
    pub child: Child,
    pub counts: EntryCounts,
    pub tasks: Vec<Entry>,
    pub events: Vec<Entry>,
    pub notes: Vec<Entry>,
}

/// Child form page model, returned for GET and re-returned with errors on
/// failed POSTs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildFormPage {
    pub form: ChildFormData,
    pub errors: Vec<ChildFieldError>,
    pub palette: Vec<String>,
    /// Pre-selected colour for new profiles.
    pub suggested_colour: String,
    /// Set when editing an existing child.
    pub child: Option<Child>,
}

/// Entry form page model with the select options the renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFormPage {
    pub form: EntryFormData,
    pub errors: Vec<EntryFieldError>,
    pub children: Vec<Child>,
    pub categories: Vec<Category>,
    pub entry_types: Vec<String>,
    pub priorities: Vec<String>,
    /// Set when editing an existing entry.
    pub entry: Option<Entry>,
}

/// Post-first-child prompt model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingDecisionPage {
    pub child: Child,
    pub children_count: usize,
}

/// Response for the registration endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub account: Account,
    pub success_message: String,
}

/// Optional body for the completion-toggle endpoints. An empty body flips
/// the flag; an explicit `completed` value sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToggleCompletionRequest {
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Structured status for the completion-toggle endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleCompletionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToggleCompletionResponse {
    pub fn ok(is_completed: bool) -> Self {
        Self {
            success: true,
            is_completed: Some(is_completed),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            is_completed: None,
            error: Some(error.into()),
        }
    }
}
