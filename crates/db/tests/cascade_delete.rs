//! Integration tests for the transactional project delete.
//!
//! - A project with N files and M builds removes exactly N + M + 1 rows
//! - Other projects' rows are untouched
//! - Deleting a missing project removes nothing

use mobilepack_core::types::{DbId, JsonMap};
use mobilepack_db::models::build_output::NewBuildOutput;
use mobilepack_db::models::project::ProjectCreate;
use mobilepack_db::models::project_file::NewProjectFile;
use mobilepack_db::models::status::FileType;
use mobilepack_db::repositories::{BuildOutputRepo, ProjectFileRepo, ProjectRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_file(project_id: DbId, name: &str) -> NewProjectFile {
    NewProjectFile {
        project_id,
        filename: format!("stored-{name}"),
        original_filename: name.to_string(),
        file_path: format!("/data/{project_id}/{name}"),
        file_type: FileType::Other,
        file_size: 128,
        mime_type: "application/octet-stream".to_string(),
        is_main_file: false,
        file_metadata: JsonMap::new(),
    }
}

async fn seed(pool: &PgPool, package: &str, files: usize, builds: usize) -> DbId {
    let project = ProjectRepo::create(pool, &ProjectCreate::new("Seed", package, "Seed App"))
        .await
        .unwrap();
    for i in 0..files {
        ProjectFileRepo::create(pool, &new_file(project.id, &format!("f{i}.js")))
            .await
            .unwrap();
    }
    for i in 0..builds {
        BuildOutputRepo::create(
            pool,
            &NewBuildOutput::succeeded(project.id, format!("1.0.{i}"), format!("/out/{i}.apk")),
        )
        .await
        .unwrap();
    }
    project.id
}

async fn total_rows(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM projects)
              + (SELECT COUNT(*) FROM project_files)
              + (SELECT COUNT(*) FROM build_outputs)",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    count
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_project_files_and_builds(pool: PgPool) {
    let id = seed(&pool, "com.example.cascade", 3, 2).await;
    let before = total_rows(&pool).await;

    let report = ProjectRepo::delete(&pool, id)
        .await
        .unwrap()
        .expect("project exists");

    assert_eq!(report.projects, 1);
    assert_eq!(report.files, 3);
    assert_eq!(report.builds, 2);
    assert_eq!(report.total(), 3 + 2 + 1);
    assert_eq!(before - total_rows(&pool).await, 6);

    assert!(ProjectRepo::find_by_id(&pool, id).await.unwrap().is_none());
    assert_eq!(ProjectFileRepo::count_by_project(&pool, id).await.unwrap(), 0);
    assert_eq!(BuildOutputRepo::count_by_project(&pool, id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_leaves_other_projects_alone(pool: PgPool) {
    let doomed = seed(&pool, "com.example.doomed", 2, 1).await;
    let kept = seed(&pool, "com.example.kept", 4, 3).await;

    ProjectRepo::delete(&pool, doomed).await.unwrap().unwrap();

    assert!(ProjectRepo::find_by_id(&pool, kept).await.unwrap().is_some());
    assert_eq!(ProjectFileRepo::count_by_project(&pool, kept).await.unwrap(), 4);
    assert_eq!(BuildOutputRepo::count_by_project(&pool, kept).await.unwrap(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_empty_project_removes_one_row(pool: PgPool) {
    let id = seed(&pool, "com.example.empty", 0, 0).await;

    let report = ProjectRepo::delete(&pool, id).await.unwrap().unwrap();
    assert_eq!(report.total(), 1);
    assert_eq!(total_rows(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_nonexistent_returns_none(pool: PgPool) {
    seed(&pool, "com.example.bystander", 1, 1).await;
    let before = total_rows(&pool).await;

    let result = ProjectRepo::delete(&pool, 999_999).await.unwrap();
    assert!(result.is_none(), "Deleting non-existent ID should return None");
    assert_eq!(total_rows(&pool).await, before);
}
