//! Shared primitives for the mobilepack persistence layer.
//!
//! Nothing in this crate touches the database: it holds the id and time
//! aliases, the error taxonomy, the `Patch<T>` presence wrapper used by
//! partial updates, and the field rules every schema is validated against.

pub mod error;
pub mod patch;
pub mod types;
pub mod validation;
