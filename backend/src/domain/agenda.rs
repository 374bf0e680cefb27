//! Entry classification and display ordering.
//!
//! Entries partition into tasks, events and notes, each with its own
//! deterministic display order. Undated items sort after dated ones via a
//! far-future sentinel date; absent times likewise sort last within a day.

use std::cmp::Reverse;

use chrono::{NaiveDate, NaiveTime};
use shared::{Entry, EntryType};

/// A parent's (or child's) entries, partitioned and ordered for display.
#[derive(Debug, Clone, Default)]
pub struct Agenda {
    pub tasks: Vec<Entry>,
    pub events: Vec<Entry>,
    pub notes: Vec<Entry>,
}

/// Sentinel used so undated items sort after every real date.
const FAR_FUTURE: NaiveDate = NaiveDate::MAX;

/// Partition entries by type and order each group for display.
pub fn partition(entries: Vec<Entry>) -> Agenda {
    let mut agenda = Agenda::default();
    for entry in entries {
        match entry.entry_type {
            EntryType::Task => agenda.tasks.push(entry),
            EntryType::Event => agenda.events.push(entry),
            EntryType::Note => agenda.notes.push(entry),
        }
    }
    order_tasks(&mut agenda.tasks);
    order_events(&mut agenda.events);
    order_notes(&mut agenda.notes);
    agenda
}

/// Incomplete before complete; within each group ascending by due date
/// (sentinel for undated), then due time (absent last), then creation time.
pub fn order_tasks(tasks: &mut [Entry]) {
    tasks.sort_by_key(|e| {
        (
            e.is_completed,
            e.due_date_for_sort().unwrap_or(FAR_FUTURE),
            time_last(e.due_time_for_sort()),
            e.created_at,
        )
    });
}

/// Ascending by event date (sentinel for undated), then start time (absent
/// last), then creation time, so same-day events show newest-added last.
pub fn order_events(events: &mut [Entry]) {
    events.sort_by_key(|e| {
        (
            e.event_date_for_sort().unwrap_or(FAR_FUTURE),
            time_last(e.event_start_for_sort()),
            e.created_at,
        )
    });
}

/// Most recently edited first.
pub fn order_notes(notes: &mut [Entry]) {
    notes.sort_by_key(|e| Reverse(e.updated_at));
}

/// Key wrapper ordering `None` after every concrete time.
fn time_last(time: Option<NaiveTime>) -> (bool, Option<NaiveTime>) {
    (time.is_none(), time)
}
