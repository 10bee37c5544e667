//! Repository for the `projects` table.

use mobilepack_core::types::{DbId, JsonMap};
use sqlx::types::Json;
use sqlx::PgPool;
use validator::Validate;

use crate::error::DbError;
use crate::models::project::{
    CascadeDeleteReport, Project, ProjectCreate, ProjectSummary, ProjectUpdate,
    ProjectWithFileCount,
};
use crate::models::status::ProjectStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, status, package_name, app_name, version_code, \
    version_name, config, packaged_at, created_at, updated_at";

/// Live file count, correlated on the outer `projects` row.
const FILE_COUNT: &str =
    "(SELECT COUNT(*) FROM project_files f WHERE f.project_id = projects.id) AS file_count";

/// Stamps `packaged_at` the first time `$status` becomes `packaged`.
const PACKAGED_AT: &str = "CASE \
        WHEN {status} = 'packaged'::project_status AND status <> 'packaged'::project_status \
        THEN NOW() \
        ELSE packaged_at \
     END";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Validate and insert a new project, returning the created row.
    ///
    /// Status starts at `draft` and `version_code` at 1.
    pub async fn create(pool: &PgPool, input: &ProjectCreate) -> Result<Project, DbError> {
        input.validate()?;

        let query = format!(
            "INSERT INTO projects (name, description, package_name, app_name, version_name, config)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.package_name)
            .bind(&input.app_name)
            .bind(&input.version_name)
            .bind(Json(&input.config))
            .fetch_one(pool)
            .await?;

        tracing::debug!(project_id = project.id, package_name = %project.package_name, "Project created");
        Ok(project)
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(project)
    }

    /// Like [`ProjectRepo::find_by_id`], but a missing row is an error.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Project, DbError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| DbError::not_found("Project", id))
    }

    /// List all projects ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        let projects = sqlx::query_as::<_, Project>(&query)
            .fetch_all(pool)
            .await?;
        Ok(projects)
    }

    /// Apply the fields present in `input` and refresh `updated_at`.
    ///
    /// All columns change in one statement, so concurrent patches to
    /// different fields never overwrite each other. Returns `None` if no
    /// row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ProjectUpdate,
    ) -> Result<Option<Project>, DbError> {
        input.validate()?;

        let packaged_at = PACKAGED_AT.replace("{status}", "$7");
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                package_name = COALESCE($4, package_name),
                app_name = COALESCE($5, app_name),
                version_name = COALESCE($6, version_name),
                status = COALESCE($7, status),
                config = COALESCE($8, config),
                packaged_at = {packaged_at},
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.name.value())
            .bind(input.description.resolved(String::new))
            .bind(input.package_name.value())
            .bind(input.app_name.value())
            .bind(input.version_name.value())
            .bind(input.status.value().copied())
            .bind(input.config.resolved(JsonMap::new).map(Json))
            .fetch_optional(pool)
            .await?;

        if project.is_some() {
            tracing::debug!(project_id = id, "Project updated");
        }
        Ok(project)
    }

    /// Move a project to `status`, refreshing `updated_at`.
    ///
    /// No transition rules are applied here.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: ProjectStatus,
    ) -> Result<Option<Project>, DbError> {
        let packaged_at = PACKAGED_AT.replace("{status}", "$2");
        let query = format!(
            "UPDATE projects SET
                status = $2,
                packaged_at = {packaged_at},
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await?;

        if project.is_some() {
            tracing::debug!(project_id = id, %status, "Project status changed");
        }
        Ok(project)
    }

    /// Bump `version_code` by one, refreshing `updated_at`.
    ///
    /// Called by build orchestration when a [`crate::models::build_output::BuildRequest`]
    /// asks for it; never invoked implicitly.
    pub async fn increment_version_code(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Project>, DbError> {
        let query = format!(
            "UPDATE projects SET
                version_code = version_code + 1,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(project)
    }

    /// Listing projection for one project, with a live file count.
    pub async fn summary(pool: &PgPool, id: DbId) -> Result<Option<ProjectSummary>, DbError> {
        let query = format!("SELECT {COLUMNS}, {FILE_COUNT} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, ProjectWithFileCount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(ProjectSummary::from))
    }

    /// Listing projections for all projects, most recently created first.
    pub async fn list_summaries(pool: &PgPool) -> Result<Vec<ProjectSummary>, DbError> {
        let query = format!(
            "SELECT {COLUMNS}, {FILE_COUNT} FROM projects ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ProjectWithFileCount>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(ProjectSummary::from).collect())
    }

    /// Delete a project together with its files and builds.
    ///
    /// Runs in a single transaction: the project row is locked first so
    /// no child can be inserted mid-delete, then children go, then the
    /// parent. Returns `None` (and deletes nothing) if the project does
    /// not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<CascadeDeleteReport>, DbError> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let files = sqlx::query("DELETE FROM project_files WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let builds = sqlx::query("DELETE FROM build_outputs WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let projects = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        let report = CascadeDeleteReport {
            projects,
            files,
            builds,
        };
        tracing::info!(project_id = id, files, builds, "Project deleted");
        Ok(Some(report))
    }
}
