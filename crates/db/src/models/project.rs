//! Project entity model, input schemas, and listing projection.

use mobilepack_core::patch::Patch;
use mobilepack_core::types::{to_iso8601, DbId, JsonMap, Timestamp};
use mobilepack_core::validation::{
    check_clearable_patch, check_not_null, check_package_name_patch, check_required_patch,
    validate_package_name, MAX_APP_NAME_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_PROJECT_NAME_LENGTH,
    MAX_PACKAGE_NAME_LENGTH, MAX_VERSION_NAME_LENGTH,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::models::status::ProjectStatus;

/// Version label given to new projects.
pub const DEFAULT_VERSION_NAME: &str = "1.0.0";

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    /// NOT NULL in the database; defaults to `''`.
    pub description: String,
    pub status: ProjectStatus,
    pub package_name: String,
    pub app_name: String,
    /// Build counter; starts at 1.
    pub version_code: i32,
    pub version_name: String,
    #[sqlx(json)]
    pub config: JsonMap,
    /// Set when the status first moves to `packaged`.
    pub packaged_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a new project.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ProjectCreate {
    #[validate(length(max = (MAX_PROJECT_NAME_LENGTH as u64)))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = (MAX_DESCRIPTION_LENGTH as u64)))]
    pub description: String,
    #[validate(
        length(max = (MAX_PACKAGE_NAME_LENGTH as u64)),
        custom(function = "validate_package_name")
    )]
    pub package_name: String,
    #[validate(length(max = (MAX_APP_NAME_LENGTH as u64)))]
    pub app_name: String,
    #[serde(default = "default_version_name")]
    #[validate(length(max = (MAX_VERSION_NAME_LENGTH as u64)))]
    pub version_name: String,
    #[serde(default)]
    pub config: JsonMap,
}

impl ProjectCreate {
    /// Build an input with the required fields and defaults for the rest.
    pub fn new(
        name: impl Into<String>,
        package_name: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            package_name: package_name.into(),
            app_name: app_name.into(),
            version_name: default_version_name(),
            config: JsonMap::new(),
        }
    }
}

fn default_version_name() -> String {
    DEFAULT_VERSION_NAME.to_string()
}

/// Input for patching an existing project.
///
/// Only fields present in the payload are applied. An explicit `null`
/// resets `description` to `""` and `config` to `{}`; on any other field
/// it fails validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "name_patch"))]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "description_patch"))]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "check_package_name_patch"))]
    pub package_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "app_name_patch"))]
    pub app_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "version_name_patch"))]
    pub version_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "status_patch"))]
    pub status: Patch<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub config: Patch<JsonMap>,
}

impl ProjectUpdate {
    /// True when the payload names no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_absent()
            && self.description.is_absent()
            && self.package_name.is_absent()
            && self.app_name.is_absent()
            && self.version_name.is_absent()
            && self.status.is_absent()
            && self.config.is_absent()
    }
}

fn name_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_required_patch(value, MAX_PROJECT_NAME_LENGTH)
}

fn description_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_clearable_patch(value, MAX_DESCRIPTION_LENGTH)
}

fn app_name_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_required_patch(value, MAX_APP_NAME_LENGTH)
}

fn version_name_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_required_patch(value, MAX_VERSION_NAME_LENGTH)
}

fn status_patch(value: &Patch<ProjectStatus>) -> Result<(), ValidationError> {
    check_not_null(value)
}

/// Listing projection of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: DbId,
    pub name: String,
    pub status: ProjectStatus,
    pub app_name: String,
    pub version_name: String,
    pub file_count: i64,
    /// ISO-8601.
    pub created_at: String,
    /// ISO-8601.
    pub updated_at: String,
}

impl ProjectSummary {
    pub fn from_project(project: &Project, file_count: i64) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            status: project.status,
            app_name: project.app_name.clone(),
            version_name: project.version_name.clone(),
            file_count,
            created_at: to_iso8601(&project.created_at),
            updated_at: to_iso8601(&project.updated_at),
        }
    }
}

/// A project row joined with its live file count.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectWithFileCount {
    #[sqlx(flatten)]
    pub project: Project,
    pub file_count: i64,
}

impl From<ProjectWithFileCount> for ProjectSummary {
    fn from(row: ProjectWithFileCount) -> Self {
        ProjectSummary::from_project(&row.project, row.file_count)
    }
}

/// Row counts removed by a cascading project delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CascadeDeleteReport {
    pub projects: u64,
    pub files: u64,
    pub builds: u64,
}

impl CascadeDeleteReport {
    pub fn total(&self) -> u64 {
        self.projects + self.files + self.builds
    }
}
