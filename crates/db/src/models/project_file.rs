//! Uploaded asset model and upload schemas.

use mobilepack_core::types::{DbId, JsonMap, Timestamp};
use mobilepack_core::validation::{MAX_FILENAME_LENGTH, MAX_FILE_PATH_LENGTH, MAX_MIME_TYPE_LENGTH};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::FileType;

/// A file row from the `project_files` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProjectFile {
    pub id: DbId,
    pub project_id: DbId,
    /// Name under which the asset was stored.
    pub filename: String,
    /// Name the user uploaded it as.
    pub original_filename: String,
    pub file_path: String,
    pub file_type: FileType,
    /// Size in bytes.
    pub file_size: i64,
    pub mime_type: String,
    /// Entry point of the web app, typically `index.html`.
    pub is_main_file: bool,
    pub uploaded_at: Timestamp,
    #[sqlx(json)]
    pub file_metadata: JsonMap,
}

/// Metadata the client sends alongside an uploaded asset.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct FileUpload {
    #[validate(length(max = (MAX_FILENAME_LENGTH as u64)))]
    pub original_filename: String,
    #[serde(default)]
    pub file_type: FileType,
    #[serde(default)]
    pub is_main_file: bool,
    #[serde(default)]
    pub file_metadata: JsonMap,
}

/// Facts about a stored asset, reported by whatever wrote the bytes.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
}

/// Insert shape for a `project_files` row.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NewProjectFile {
    pub project_id: DbId,
    #[validate(length(max = (MAX_FILENAME_LENGTH as u64)))]
    pub filename: String,
    #[validate(length(max = (MAX_FILENAME_LENGTH as u64)))]
    pub original_filename: String,
    #[validate(length(max = (MAX_FILE_PATH_LENGTH as u64)))]
    pub file_path: String,
    #[serde(default)]
    pub file_type: FileType,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub file_size: i64,
    #[validate(length(max = (MAX_MIME_TYPE_LENGTH as u64)))]
    pub mime_type: String,
    #[serde(default)]
    pub is_main_file: bool,
    #[serde(default)]
    pub file_metadata: JsonMap,
}

impl NewProjectFile {
    /// Combine client metadata with storage facts for one project.
    pub fn from_upload(project_id: DbId, upload: FileUpload, stored: StoredFile) -> Self {
        Self {
            project_id,
            filename: stored.filename,
            original_filename: upload.original_filename,
            file_path: stored.file_path,
            file_type: upload.file_type,
            file_size: stored.file_size,
            mime_type: stored.mime_type,
            is_main_file: upload.is_main_file,
            file_metadata: upload.file_metadata,
        }
    }
}
