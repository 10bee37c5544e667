//! Closed enumerations backed by PostgreSQL enum types.
//!
//! The lowercase variant names are the wire strings, both in JSON and in
//! the database.

use serde::{Deserialize, Serialize};

/// Project lifecycle status (`project_status` enum type).
///
/// The expected progression is draft -> uploaded -> processing ->
/// packaged | failed. Only the value set is enforced here; deciding which
/// moves are legal belongs to the build orchestration.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Uploaded,
    Processing,
    Packaged,
    Failed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Draft,
        ProjectStatus::Uploaded,
        ProjectStatus::Processing,
        ProjectStatus::Packaged,
        ProjectStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Uploaded => "uploaded",
            ProjectStatus::Processing => "processing",
            ProjectStatus::Packaged => "packaged",
            ProjectStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of an uploaded asset (`file_type` enum type).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "file_type", rename_all = "lowercase")]
pub enum FileType {
    Html,
    Css,
    Javascript,
    Image,
    Font,
    #[default]
    Other,
}

impl FileType {
    pub const ALL: [FileType; 6] = [
        FileType::Html,
        FileType::Css,
        FileType::Javascript,
        FileType::Image,
        FileType::Font,
        FileType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Html => "html",
            FileType::Css => "css",
            FileType::Javascript => "javascript",
            FileType::Image => "image",
            FileType::Font => "font",
            FileType::Other => "other",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
