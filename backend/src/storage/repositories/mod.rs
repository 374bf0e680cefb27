pub mod account_repository;
pub mod category_repository;
pub mod child_repository;
pub mod entry_repository;
pub mod parent_repository;

pub use account_repository::AccountRepository;
pub use category_repository::CategoryRepository;
pub use child_repository::ChildRepository;
pub use entry_repository::EntryRepository;
pub use parent_repository::ParentRepository;
