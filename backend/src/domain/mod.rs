//! # Domain Layer
//!
//! Business logic for the planner, independent of HTTP and storage
//! details:
//!
//! - **registration_service**: account creation and username derivation
//! - **parent_service**: ownership scope resolution and lazy onboarding
//! - **child_service**: child profile CRUD and form validation
//! - **entry_service**: entry CRUD, form validation, completion toggling
//! - **dashboard_service**: page model assembly with counts
//! - **category_service**: the category tree offered on entry forms
//! - **agenda**: pure entry classification and display ordering
//! - **forms**: form field coercion helpers
//! - **errors**: the domain error taxonomy

pub mod agenda;
pub mod category_service;
pub mod child_service;
pub mod dashboard_service;
pub mod entry_service;
pub mod errors;
pub mod forms;
pub mod parent_service;
pub mod registration_service;

pub use category_service::CategoryService;
pub use child_service::ChildService;
pub use dashboard_service::DashboardService;
pub use entry_service::EntryService;
pub use errors::DomainError;
pub use parent_service::ParentService;
pub use registration_service::RegistrationService;
