//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the list/get/create/update/delete/restore backend operations.
//! - Maintain version flags and body ordering transactionally.
//!
//! # Invariants
//! - Create appends version 1 as active + latest.
//! - Update appends a new version that becomes active + latest.
//! - Restore only moves the active flag and rewrites project fields.
//! - Delete cascades to versions and bodies.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::body::{Body, BodyDimensions};
use crate::model::project::{
    Project, ProjectId, ProjectSnapshot, ProjectStatus, ProjectSummary, ProjectValidationError,
};
use crate::model::version::{Version, VersionId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProjectValidationError),
    Db(DbError),
    NotFound(ProjectId),
    VersionNotFound {
        project_id: ProjectId,
        version_id: VersionId,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "project not found: {id}"),
            Self::VersionNotFound {
                project_id,
                version_id,
            } => write!(f, "version {version_id} not found in project {project_id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted project data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Field changes submitted by the edit dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectUpdate {
    pub snapshot: ProjectSnapshot,
    /// Replaces the whole body list when set; positions follow slice order.
    pub bodies: Option<Vec<BodyDimensions>>,
}

impl ProjectUpdate {
    pub fn fields(snapshot: ProjectSnapshot) -> Self {
        Self {
            snapshot,
            bodies: None,
        }
    }
}

/// Backend interface for project operations.
pub trait ProjectRepository {
    fn list_projects(&self) -> RepoResult<Vec<ProjectSummary>>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn create_project(&self, snapshot: &ProjectSnapshot) -> RepoResult<Project>;
    fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> RepoResult<Project>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    fn restore_version(&self, project_id: ProjectId, version_id: VersionId)
        -> RepoResult<Project>;
    fn set_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<Project>;
}

impl<R: ProjectRepository + ?Sized> ProjectRepository for &R {
    fn list_projects(&self) -> RepoResult<Vec<ProjectSummary>> {
        (**self).list_projects()
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        (**self).get_project(id)
    }

    fn create_project(&self, snapshot: &ProjectSnapshot) -> RepoResult<Project> {
        (**self).create_project(snapshot)
    }

    fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> RepoResult<Project> {
        (**self).update_project(id, update)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        (**self).delete_project(id)
    }

    fn restore_version(
        &self,
        project_id: ProjectId,
        version_id: VersionId,
    ) -> RepoResult<Project> {
        (**self).restore_version(project_id, version_id)
    }

    fn set_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<Project> {
        (**self).set_status(id, status)
    }
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn load_required(&self, id: ProjectId) -> RepoResult<Project> {
        self.get_project(id)?.ok_or(RepoError::NotFound(id))
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn list_projects(&self) -> RepoResult<Vec<ProjectSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.id AS id,
                p.name AS name,
                p.status AS status,
                p.updated_at AS updated_at,
                (SELECT COUNT(*) FROM project_versions v WHERE v.project_id = p.id)
                    AS version_count,
                (SELECT COUNT(*) FROM project_bodies b WHERE b.project_id = p.id)
                    AS body_count
             FROM projects p
             ORDER BY p.updated_at DESC, p.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(ProjectSummary {
                id: parse_uuid(&row.get::<_, String>("id")?, "projects.id")?,
                name: row.get("name")?,
                status: parse_status(&row.get::<_, String>("status")?)?,
                updated_at: row.get("updated_at")?,
                version_count: row.get("version_count")?,
                body_count: row.get("body_count")?,
            });
        }
        Ok(summaries)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let head = self
            .conn
            .query_row(
                "SELECT id, name, description, status, created_at, updated_at
                 FROM projects
                 WHERE id = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("name")?,
                        row.get::<_, Option<String>>("description")?,
                        row.get::<_, String>("status")?,
                        row.get::<_, i64>("created_at")?,
                        row.get::<_, i64>("updated_at")?,
                    ))
                },
            )
            .optional()?;

        let Some((name, description, status, created_at, updated_at)) = head else {
            return Ok(None);
        };

        let project = Project {
            id,
            name,
            description,
            status: parse_status(&status)?,
            created_at,
            updated_at,
            versions: load_versions(self.conn, id)?,
            bodies: load_bodies(self.conn, id)?,
        };
        project.validate()?;
        Ok(Some(project))
    }

    fn create_project(&self, snapshot: &ProjectSnapshot) -> RepoResult<Project> {
        snapshot.validate()?;
        let id = Uuid::new_v4();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO projects (id, name, description, status)
             VALUES (?1, ?2, ?3, 'active');",
            params![
                id.to_string(),
                snapshot.name.as_str(),
                snapshot.description.as_deref()
            ],
        )?;
        append_active_version(&tx, id, snapshot)?;
        tx.commit()?;

        self.load_required(id)
    }

    fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> RepoResult<Project> {
        update.snapshot.validate()?;
        if let Some(bodies) = &update.bodies {
            for dimensions in bodies {
                dimensions.validate().map_err(ProjectValidationError::from)?;
            }
        }

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE projects
             SET name = ?1,
                 description = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![
                update.snapshot.name.as_str(),
                update.snapshot.description.as_deref(),
                id.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        append_active_version(&tx, id, &update.snapshot)?;
        if let Some(bodies) = &update.bodies {
            replace_bodies(&tx, id, bodies)?;
        }
        tx.commit()?;

        self.load_required(id)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn restore_version(
        &self,
        project_id: ProjectId,
        version_id: VersionId,
    ) -> RepoResult<Project> {
        let payload_text: Option<String> = self
            .conn
            .query_row(
                "SELECT payload
                 FROM project_versions
                 WHERE id = ?1 AND project_id = ?2;",
                params![version_id.to_string(), project_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload_text) = payload_text else {
            if self.get_project(project_id)?.is_none() {
                return Err(RepoError::NotFound(project_id));
            }
            return Err(RepoError::VersionNotFound {
                project_id,
                version_id,
            });
        };
        let payload = parse_payload(&payload_text)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE project_versions SET is_active = 0 WHERE project_id = ?1;",
            [project_id.to_string()],
        )?;
        tx.execute(
            "UPDATE project_versions SET is_active = 1 WHERE id = ?1;",
            [version_id.to_string()],
        )?;
        tx.execute(
            "UPDATE projects
             SET name = ?1,
                 description = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![
                payload.name.as_str(),
                payload.description.as_deref(),
                project_id.to_string()
            ],
        )?;
        tx.commit()?;

        self.load_required(project_id)
    }

    fn set_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<Project> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET status = ?1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![status.as_str(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        self.load_required(id)
    }
}

fn append_active_version(
    conn: &Connection,
    project_id: ProjectId,
    snapshot: &ProjectSnapshot,
) -> RepoResult<VersionId> {
    let payload = serde_json::to_string(snapshot)
        .map_err(|err| RepoError::InvalidData(format!("unserializable payload: {err}")))?;
    let next_number: u32 = conn.query_row(
        "SELECT COALESCE(MAX(number), 0) + 1
         FROM project_versions
         WHERE project_id = ?1;",
        [project_id.to_string()],
        |row| row.get(0),
    )?;

    conn.execute(
        "UPDATE project_versions SET is_active = 0 WHERE project_id = ?1;",
        [project_id.to_string()],
    )?;

    let version_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO project_versions (id, project_id, number, payload, is_active)
         VALUES (?1, ?2, ?3, ?4, 1);",
        params![
            version_id.to_string(),
            project_id.to_string(),
            next_number,
            payload
        ],
    )?;
    Ok(version_id)
}

fn replace_bodies(
    conn: &Connection,
    project_id: ProjectId,
    bodies: &[BodyDimensions],
) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM project_bodies WHERE project_id = ?1;",
        [project_id.to_string()],
    )?;
    for (position, dimensions) in bodies.iter().enumerate() {
        conn.execute(
            "INSERT INTO project_bodies (id, project_id, position, width, height, depth)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                Uuid::new_v4().to_string(),
                project_id.to_string(),
                position as i64,
                dimensions.width,
                dimensions.height,
                dimensions.depth
            ],
        )?;
    }
    Ok(())
}

fn load_versions(conn: &Connection, project_id: ProjectId) -> RepoResult<Vec<Version>> {
    let mut stmt = conn.prepare(
        "SELECT id, number, payload, is_active, created_at
         FROM project_versions
         WHERE project_id = ?1
         ORDER BY number ASC;",
    )?;
    let mut rows = stmt.query([project_id.to_string()])?;
    let mut versions = Vec::new();
    while let Some(row) = rows.next()? {
        versions.push(parse_version_row(row, project_id)?);
    }

    if let Some(newest) = versions.iter().map(|version| version.number).max() {
        for version in &mut versions {
            version.is_latest = version.number == newest;
        }
    }
    Ok(versions)
}

fn parse_version_row(row: &Row<'_>, project_id: ProjectId) -> RepoResult<Version> {
    let id = parse_uuid(&row.get::<_, String>("id")?, "project_versions.id")?;
    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in project_versions.is_active"
            )));
        }
    };

    Ok(Version {
        id,
        project_id,
        number: row.get("number")?,
        payload: parse_payload(&row.get::<_, String>("payload")?)?,
        created_at: row.get("created_at")?,
        is_active,
        is_latest: false,
    })
}

fn load_bodies(conn: &Connection, project_id: ProjectId) -> RepoResult<Vec<Body>> {
    let mut stmt = conn.prepare(
        "SELECT id, position, width, height, depth
         FROM project_bodies
         WHERE project_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([project_id.to_string()])?;
    let mut bodies = Vec::new();
    while let Some(row) = rows.next()? {
        bodies.push(Body {
            id: parse_uuid(&row.get::<_, String>("id")?, "project_bodies.id")?,
            project_id,
            index: row.get("position")?,
            dimensions: BodyDimensions::new(
                row.get("width")?,
                row.get("height")?,
                row.get("depth")?,
            ),
        });
    }
    Ok(bodies)
}

fn parse_payload(value: &str) -> RepoResult<ProjectSnapshot> {
    serde_json::from_str(value).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid payload in project_versions.payload: {err}"
        ))
    })
}

fn parse_status(value: &str) -> RepoResult<ProjectStatus> {
    ProjectStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{value}` in projects.status"))
    })
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
