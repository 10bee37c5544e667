//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async operations that
//! accept `&PgPool` as the first argument and return [`crate::DbError`].

pub mod build_output_repo;
pub mod project_file_repo;
pub mod project_repo;

pub use build_output_repo::BuildOutputRepo;
pub use project_file_repo::ProjectFileRepo;
pub use project_repo::ProjectRepo;
