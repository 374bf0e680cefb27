//! # Family Planner Backend
//!
//! Web backend for the family planner: parents manage child profiles and
//! record notes, tasks and events per child. The service validates form
//! input, scopes every query to the authenticated parent and returns page
//! models to the external renderer.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers, identity extractor)
//!     |
//! Domain Layer (services, validation, ordering)
//!     |
//! Storage Layer (SQLite repositories)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::domain::{
    CategoryService, ChildService, DashboardService, EntryService, ParentService,
    RegistrationService,
};
use crate::io::rest;
use crate::storage::{
    AccountRepository, CategoryRepository, ChildRepository, DbConnection, EntryRepository,
    ParentRepository,
};

/// Main application state that holds all services.
#[derive(Clone)]
pub struct AppState {
    pub registration_service: RegistrationService,
    pub parent_service: ParentService,
    pub child_service: ChildService,
    pub entry_service: EntryService,
    pub dashboard_service: DashboardService,
    pub category_service: CategoryService,
}

/// Initialize the backend with all required services.
pub async fn initialize_backend(config: &ServerConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    let accounts = AccountRepository::new(db.clone());
    let parents = ParentRepository::new(db.clone());
    let children = ChildRepository::new(db.clone());
    let entries = EntryRepository::new(db.clone());
    let categories = CategoryRepository::new(db);

    info!("Setting up domain services");
    let category_service = CategoryService::new(categories);
    category_service.seed_defaults().await?;

    Ok(AppState {
        registration_service: RegistrationService::new(accounts.clone(), parents.clone()),
        parent_service: ParentService::new(parents, accounts),
        child_service: ChildService::new(children.clone()),
        entry_service: EntryService::new(entries.clone(), children.clone()),
        dashboard_service: DashboardService::new(children, entries),
        category_service,
    })
}

/// Create the axum router with all routes configured.
pub fn create_router(config: &ServerConfig, state: AppState) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let router = Router::new()
        .route("/", get(rest::page_apis::home))
        .route("/register/", post(rest::registration_apis::register))
        .route(
            "/dashboard/",
            get(rest::dashboard_apis::dashboard).post(rest::dashboard_apis::dashboard_quick_add),
        )
        .route(
            "/add-child/",
            get(rest::child_apis::add_child_page).post(rest::child_apis::create_child),
        )
        .route(
            "/edit-child/:child_id/",
            get(rest::child_apis::edit_child_page).post(rest::child_apis::update_child),
        )
        .route(
            "/delete-child/:child_id/",
            post(rest::child_apis::delete_child),
        )
        .route(
            "/onboarding-decision/:child_id/",
            get(rest::child_apis::onboarding_decision),
        )
        .route(
            "/add-entry/",
            get(rest::entry_apis::add_entry_page).post(rest::entry_apis::create_entry),
        )
        .route("/child/:child_id/", get(rest::entry_apis::child_page))
        .route(
            "/edit-entry/:entry_id/",
            get(rest::entry_apis::edit_entry_page).post(rest::entry_apis::update_entry),
        )
        .route(
            "/delete-entry/:entry_id/",
            post(rest::entry_apis::delete_entry),
        )
        .route(
            "/quick-delete-entry/:entry_id/",
            post(rest::entry_apis::quick_delete_entry),
        )
        .route(
            "/toggle-completion/:entry_id/",
            post(rest::entry_apis::toggle_entry_completion),
        )
        .route(
            "/tasks/:task_id/toggle-completion/",
            post(rest::entry_apis::toggle_task_completion),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(router)
}
