use projdesk_core::db::migrations::latest_version;
use projdesk_core::db::{open_db, open_db_in_memory};
use projdesk_core::{
    BodyDimensions, ProjectRepository, ProjectService, ProjectSnapshot, ProjectStatus,
    ProjectUpdate, ProjectValidationError, RepoError, ServiceError, SqliteProjectRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn create_starts_with_single_active_latest_version() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let project = repo
        .create_project(&ProjectSnapshot::new("  Shed   Plan ", Some("timber")))
        .unwrap();

    assert_eq!(project.name, "Shed Plan");
    assert_eq!(project.description.as_deref(), Some("timber"));
    assert_eq!(project.status, ProjectStatus::Active);
    assert_eq!(project.versions.len(), 1);
    let version = &project.versions[0];
    assert_eq!(version.number, 1);
    assert!(version.is_active && version.is_latest);
    assert_eq!(version.payload, project.snapshot());
    assert!(project.bodies.is_empty());
}

#[test]
fn blank_name_is_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let err = repo
        .create_project(&ProjectSnapshot::new("   ", None))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ProjectValidationError::EmptyName)
    ));
    assert!(repo.list_projects().unwrap().is_empty());
}

#[test]
fn update_appends_version_and_replaces_bodies() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let created = repo
        .create_project(&ProjectSnapshot::new("Racks", None))
        .unwrap();

    let updated = repo
        .update_project(
            created.id,
            &ProjectUpdate {
                snapshot: ProjectSnapshot::new("Racks v2", Some("bay 3")),
                bodies: Some(vec![
                    BodyDimensions::new(1.0, 2.0, 3.0),
                    BodyDimensions::new(4.0, 5.0, 6.0),
                ]),
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Racks v2");
    assert_eq!(updated.versions.len(), 2);
    assert_eq!(updated.versions.iter().filter(|v| v.is_active).count(), 1);
    let newest = updated.latest_version().unwrap();
    assert_eq!(newest.number, 2);
    assert!(newest.is_active);
    assert_eq!(
        updated.bodies.iter().map(|body| body.index).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert_eq!(updated.bodies[1].dimensions.volume(), 120.0);

    let fields_only = repo
        .update_project(
            created.id,
            &ProjectUpdate::fields(ProjectSnapshot::new("Racks v3", None)),
        )
        .unwrap();
    assert_eq!(fields_only.bodies.len(), 2);
    assert_eq!(fields_only.versions.len(), 3);
}

#[test]
fn invalid_body_dimensions_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let created = repo
        .create_project(&ProjectSnapshot::new("Flat", None))
        .unwrap();

    let err = repo
        .update_project(
            created.id,
            &ProjectUpdate {
                snapshot: created.snapshot(),
                bodies: Some(vec![BodyDimensions::new(1.0, -2.0, 1.0)]),
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(ProjectValidationError::Body(_))));

    let reloaded = repo.get_project(created.id).unwrap().unwrap();
    assert_eq!(reloaded.versions.len(), 1);
}

#[test]
fn restore_moves_active_flag_without_new_version() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let created = repo
        .create_project(&ProjectSnapshot::new("Original", Some("first")))
        .unwrap();
    let edited = repo
        .update_project(
            created.id,
            &ProjectUpdate::fields(ProjectSnapshot::new("Edited", Some("second"))),
        )
        .unwrap();
    let first_version = edited.versions[0].clone();

    let restored = repo.restore_version(created.id, first_version.id).unwrap();

    assert_eq!(restored.versions.len(), 2);
    assert_eq!(restored.name, first_version.payload.name);
    assert_eq!(restored.description, first_version.payload.description);
    let active: Vec<_> = restored.versions.iter().filter(|v| v.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, first_version.id);
    assert_eq!(restored.latest_version().unwrap().number, 2);
    assert!(!restored.versions[0].is_latest);
}

#[test]
fn restore_reports_missing_project_and_version() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let created = repo
        .create_project(&ProjectSnapshot::new("Lonely", None))
        .unwrap();

    let missing_version = Uuid::new_v4();
    assert!(matches!(
        repo.restore_version(created.id, missing_version),
        Err(RepoError::VersionNotFound { version_id, .. }) if version_id == missing_version
    ));

    let missing_project = Uuid::new_v4();
    assert!(matches!(
        repo.restore_version(missing_project, created.versions[0].id),
        Err(RepoError::NotFound(id)) if id == missing_project
    ));
}

#[test]
fn delete_cascades_and_second_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let created = repo
        .create_project(&ProjectSnapshot::new("Gone", None))
        .unwrap();

    repo.delete_project(created.id).unwrap();

    assert!(repo.get_project(created.id).unwrap().is_none());
    let versions: i64 = conn
        .query_row("SELECT COUNT(*) FROM project_versions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, 0);
    assert!(matches!(
        repo.delete_project(created.id),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn list_summarizes_counts() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let created = repo
        .create_project(&ProjectSnapshot::new("Counted", None))
        .unwrap();
    repo.update_project(
        created.id,
        &ProjectUpdate {
            snapshot: created.snapshot(),
            bodies: Some(vec![BodyDimensions::new(1.0, 1.0, 1.0)]),
        },
    )
    .unwrap();

    let summaries = repo.list_projects().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, created.id);
    assert_eq!(summaries[0].version_count, 2);
    assert_eq!(summaries[0].body_count, 1);
}

#[test]
fn archive_sets_status_through_service() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let created = service
        .create_project(&ProjectSnapshot::new("Old", None))
        .unwrap();

    let archived = service.archive_project(created.id).unwrap();
    assert_eq!(archived.status, ProjectStatus::Archived);
    assert_eq!(archived.versions.len(), 1);

    assert!(matches!(
        service.get_project(Uuid::new_v4()),
        Err(ServiceError::ProjectNotFound(_))
    ));
}

#[test]
fn repository_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteProjectRepository::try_new(&conn)
        .err()
        .expect("unmigrated connection must be rejected");
    match err {
        RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        } => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn projects_survive_reopen_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.db");

    let id = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteProjectRepository::try_new(&conn).unwrap();
        repo.create_project(&ProjectSnapshot::new("Durable", None))
            .unwrap()
            .id
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let loaded = repo.get_project(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Durable");
    assert_eq!(loaded.versions.len(), 1);
}
