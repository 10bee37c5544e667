//! Repository for the `build_outputs` table.
//!
//! Rows are append-only; there is no update method.

use mobilepack_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;
use validator::Validate;

use crate::error::DbError;
use crate::models::build_output::{BuildOutput, NewBuildOutput};

const COLUMNS: &str = "id, project_id, build_version, output_path, build_log, success, \
    error_message, build_duration, created_at, build_config";

pub struct BuildOutputRepo;

impl BuildOutputRepo {
    /// Validate and record one build attempt.
    ///
    /// A `project_id` with no matching project fails with
    /// `CoreError::ReferentialIntegrity`.
    pub async fn create(pool: &PgPool, input: &NewBuildOutput) -> Result<BuildOutput, DbError> {
        input.validate()?;

        let query = format!(
            "INSERT INTO build_outputs
                (project_id, build_version, output_path, build_log, success,
                 error_message, build_duration, build_config)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let build = sqlx::query_as::<_, BuildOutput>(&query)
            .bind(input.project_id)
            .bind(&input.build_version)
            .bind(&input.output_path)
            .bind(&input.build_log)
            .bind(input.success)
            .bind(&input.error_message)
            .bind(input.build_duration)
            .bind(Json(&input.build_config))
            .fetch_one(pool)
            .await?;

        tracing::debug!(
            project_id = build.project_id,
            build_id = build.id,
            success = build.success,
            "Build output recorded"
        );
        Ok(build)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BuildOutput>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM build_outputs WHERE id = $1");
        let build = sqlx::query_as::<_, BuildOutput>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(build)
    }

    /// Build history for a project, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<BuildOutput>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM build_outputs
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        let builds = sqlx::query_as::<_, BuildOutput>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;
        Ok(builds)
    }

    /// Most recent build attempt for a project.
    pub async fn latest_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<BuildOutput>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM build_outputs
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        let build = sqlx::query_as::<_, BuildOutput>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await?;
        Ok(build)
    }

    pub async fn count_by_project(pool: &PgPool, project_id: DbId) -> Result<i64, DbError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM build_outputs WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
