//! Domain model structs and boundary schemas.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Validate` input schemas for inserts and patches
//! - Read-only projections returned to callers

pub mod build_output;
pub mod project;
pub mod project_file;
pub mod status;
