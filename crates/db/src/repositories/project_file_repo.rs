//! Repository for the `project_files` table.

use mobilepack_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;
use validator::Validate;

use crate::error::DbError;
use crate::models::project_file::{NewProjectFile, ProjectFile};

const COLUMNS: &str = "id, project_id, filename, original_filename, file_path, file_type, \
    file_size, mime_type, is_main_file, uploaded_at, file_metadata";

/// Provides CRUD operations for uploaded project files.
pub struct ProjectFileRepo;

impl ProjectFileRepo {
    /// Validate and insert a file row.
    ///
    /// A `project_id` with no matching project fails with
    /// `CoreError::ReferentialIntegrity`; a second main file for the same
    /// project fails with `CoreError::Conflict`. Neither persists a row.
    pub async fn create(pool: &PgPool, input: &NewProjectFile) -> Result<ProjectFile, DbError> {
        input.validate()?;

        let query = format!(
            "INSERT INTO project_files
                (project_id, filename, original_filename, file_path, file_type,
                 file_size, mime_type, is_main_file, file_metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let file = sqlx::query_as::<_, ProjectFile>(&query)
            .bind(input.project_id)
            .bind(&input.filename)
            .bind(&input.original_filename)
            .bind(&input.file_path)
            .bind(input.file_type)
            .bind(input.file_size)
            .bind(&input.mime_type)
            .bind(input.is_main_file)
            .bind(Json(&input.file_metadata))
            .fetch_one(pool)
            .await?;

        tracing::debug!(
            project_id = file.project_id,
            file_id = file.id,
            file_type = %file.file_type,
            "Project file recorded"
        );
        Ok(file)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectFile>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM project_files WHERE id = $1");
        let file = sqlx::query_as::<_, ProjectFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(file)
    }

    /// List files for a project, main file first, then in upload order.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectFile>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_files
             WHERE project_id = $1
             ORDER BY is_main_file DESC, uploaded_at ASC, id ASC"
        );
        let files = sqlx::query_as::<_, ProjectFile>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;
        Ok(files)
    }

    pub async fn count_by_project(pool: &PgPool, project_id: DbId) -> Result<i64, DbError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM project_files WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// The project's entry file, if one is flagged.
    pub async fn find_main_file(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<ProjectFile>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_files WHERE project_id = $1 AND is_main_file"
        );
        let file = sqlx::query_as::<_, ProjectFile>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await?;
        Ok(file)
    }

    /// Make `file_id` the project's only main file.
    ///
    /// Clears the previous flag and sets the new one in one transaction.
    /// Concurrent moves within a project queue on the project row, so each
    /// one sees the flag the previous one left. Returns `None` if the file
    /// does not exist or belongs to another project.
    pub async fn set_main_file(
        pool: &PgPool,
        project_id: DbId,
        file_id: DbId,
    ) -> Result<Option<ProjectFile>, DbError> {
        let mut tx = pool.begin().await?;

        // NO KEY UPDATE leaves concurrent uploads (KEY SHARE) unblocked.
        let project: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM projects WHERE id = $1 FOR NO KEY UPDATE")
                .bind(project_id)
                .fetch_optional(&mut *tx)
                .await?;
        if project.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let owned: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM project_files WHERE id = $1 AND project_id = $2 FOR UPDATE",
        )
        .bind(file_id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            "UPDATE project_files SET is_main_file = false
             WHERE project_id = $1 AND is_main_file AND id <> $2",
        )
        .bind(project_id)
        .bind(file_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE project_files SET is_main_file = true WHERE id = $1 RETURNING {COLUMNS}"
        );
        let file = sqlx::query_as::<_, ProjectFile>(&query)
            .bind(file_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(project_id, file_id, "Main file changed");
        Ok(Some(file))
    }

    /// Permanently delete a file row. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM project_files WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
