//! Build history model, build request, and status projection.

use mobilepack_core::types::{to_iso8601, DbId, JsonMap, Timestamp};
use mobilepack_core::validation::{MAX_BUILD_VERSION_LENGTH, MAX_FILE_PATH_LENGTH};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `build_outputs` table. Rows are never updated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BuildOutput {
    pub id: DbId,
    pub project_id: DbId,
    pub build_version: String,
    /// Location of the generated artifact; empty when nothing was produced.
    pub output_path: String,
    pub build_log: String,
    pub success: bool,
    pub error_message: String,
    /// Seconds.
    pub build_duration: Option<i32>,
    pub created_at: Timestamp,
    /// Snapshot of the configuration this attempt ran with.
    #[sqlx(json)]
    pub build_config: JsonMap,
}

/// Insert shape for one build attempt.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NewBuildOutput {
    pub project_id: DbId,
    #[validate(length(max = (MAX_BUILD_VERSION_LENGTH as u64)))]
    pub build_version: String,
    #[serde(default)]
    #[validate(length(max = (MAX_FILE_PATH_LENGTH as u64)))]
    pub output_path: String,
    #[serde(default)]
    pub build_log: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error_message: String,
    #[validate(range(min = 0))]
    pub build_duration: Option<i32>,
    #[serde(default)]
    pub build_config: JsonMap,
}

impl NewBuildOutput {
    pub fn succeeded(
        project_id: DbId,
        build_version: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            project_id,
            build_version: build_version.into(),
            output_path: output_path.into(),
            build_log: String::new(),
            success: true,
            error_message: String::new(),
            build_duration: None,
            build_config: JsonMap::new(),
        }
    }

    pub fn failed(
        project_id: DbId,
        build_version: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            project_id,
            build_version: build_version.into(),
            output_path: String::new(),
            build_log: String::new(),
            success: false,
            error_message: error_message.into(),
            build_duration: None,
            build_config: JsonMap::new(),
        }
    }
}

/// Input for triggering a build.
///
/// `increment_version` is carried for the build orchestration to act on;
/// nothing in this crate bumps `version_code` implicitly. See
/// [`crate::repositories::ProjectRepo::increment_version_code`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct BuildRequest {
    #[serde(default)]
    pub build_config: JsonMap,
    #[serde(default = "default_true")]
    pub increment_version: bool,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            build_config: JsonMap::new(),
            increment_version: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Status-polling projection of a build attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub id: DbId,
    pub project_id: DbId,
    pub build_version: String,
    pub success: bool,
    pub error_message: String,
    pub build_duration: Option<i32>,
    /// ISO-8601.
    pub created_at: String,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl From<&BuildOutput> for BuildStatus {
    fn from(build: &BuildOutput) -> Self {
        Self {
            id: build.id,
            project_id: build.project_id,
            build_version: build.build_version.clone(),
            success: build.success,
            error_message: build.error_message.clone(),
            build_duration: build.build_duration,
            created_at: to_iso8601(&build.created_at),
            output_path: Some(build.output_path.clone()).filter(|path| !path.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use mobilepack_core::error::CoreError;
    use mobilepack_core::validation::parse_validated;
    use serde_json::json;

    use super::*;

    fn row(success: bool, output_path: &str, error_message: &str) -> BuildOutput {
        BuildOutput {
            id: 11,
            project_id: 3,
            build_version: "1.0.0+1".to_string(),
            output_path: output_path.to_string(),
            build_log: "gradle ...".to_string(),
            success,
            error_message: error_message.to_string(),
            build_duration: Some(42),
            created_at: chrono::Utc::now(),
            build_config: JsonMap::new(),
        }
    }

    #[test]
    fn request_defaults_to_incrementing() {
        let request: BuildRequest = parse_validated(json!({})).unwrap();
        assert!(request.increment_version);
        assert!(request.build_config.is_empty());
        assert_eq!(request, BuildRequest::default());

        let request: BuildRequest =
            parse_validated(json!({ "increment_version": false, "build_config": { "minify": true } }))
                .unwrap();
        assert!(!request.increment_version);
        assert_eq!(request.build_config["minify"], true);
    }

    #[test]
    fn status_mirrors_failed_build() {
        let build = row(false, "", "compile failed");
        let status = BuildStatus::from(&build);
        assert!(!status.success);
        assert_eq!(status.error_message, "compile failed");
        assert_eq!(status.output_path, None);
        assert_eq!(status.build_duration, Some(42));
        assert_eq!(status.id, build.id);
        assert_eq!(status.project_id, build.project_id);
    }

    #[test]
    fn status_exposes_artifact_path_when_present() {
        let status = BuildStatus::from(&row(true, "/out/app.apk", ""));
        assert!(status.success);
        assert_eq!(status.output_path.as_deref(), Some("/out/app.apk"));
        assert!(chrono::DateTime::parse_from_rfc3339(&status.created_at).is_ok());
    }

    #[test]
    fn new_output_rejects_long_version_and_negative_duration() {
        let mut input = NewBuildOutput::failed(1, "v".repeat(MAX_BUILD_VERSION_LENGTH + 1), "x");
        let err: CoreError = input.validate().unwrap_err().into();
        assert_matches!(err, CoreError::Validation { ref field, .. } if field == "build_version");

        input.build_version = "1.0.0".to_string();
        input.build_duration = Some(-5);
        let err: CoreError = input.validate().unwrap_err().into();
        assert_matches!(err, CoreError::Validation { ref field, ref rule, .. }
            if field == "build_duration" && rule == "range");

        input.build_duration = None;
        assert!(input.validate().is_ok());
    }
}
