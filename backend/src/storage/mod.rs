//! # Storage Layer
//!
//! SQLite persistence for the planner: connection bootstrap, schema setup
//! and one repository per table. Repositories map rows to the shared DTOs
//! and contain no business rules.

pub mod db;
pub mod repositories;

pub use db::DbConnection;
pub use repositories::{
    AccountRepository, CategoryRepository, ChildRepository, EntryRepository, ParentRepository,
};
