//! SQLite-backed project repository.
//!
//! # Responsibility
//! - Provide the project storage contract over the `projects` and `chapters` tables.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Listing order is `seq DESC`, which matches front insertion.
//! - Chapter deletion follows the `ON DELETE CASCADE` foreign key, so the
//!   connection must come from `open_db`/`open_db_in_memory` (`foreign_keys=ON`).
//! - A chapter insert and its parent's count refresh commit together.
//! - Timestamps are stored as epoch milliseconds.
//! - Read paths reject invalid stored state instead of masking it.

use crate::model::chapter::{Chapter, ChapterStatus};
use crate::model::project::{Project, ProjectStatus, ProjectType};
use crate::repo::project_repo::{validate_chapter_write, ProjectRepository, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    type,
    status,
    created_at,
    updated_at,
    word_count,
    chapter_count,
    cover_color,
    last_edited_by
FROM projects";

const CHAPTER_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    title,
    content,
    position,
    status,
    word_count,
    created_at,
    updated_at
FROM chapters";

/// Project repository over a migrated SQLite connection.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn exists(&self, id: &str) -> RepoResult<bool> {
        project_exists(self.conn, id)
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn insert_front(&mut self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        if self.exists(&project.id)? {
            return Err(RepoError::Duplicate(project.id.clone()));
        }

        self.conn.execute(
            "INSERT INTO projects (
                id,
                title,
                description,
                type,
                status,
                created_at,
                updated_at,
                word_count,
                chapter_count,
                cover_color,
                last_edited_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                project.id.as_str(),
                project.title.as_str(),
                project.description.as_str(),
                project.kind.as_str(),
                project.status.as_str(),
                project.created_at.timestamp_millis(),
                project.updated_at.timestamp_millis(),
                count_to_db(project.word_count)?,
                i64::from(project.chapter_count),
                project.cover_color.as_str(),
                project.last_edited_by.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn replace(&mut self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        if update_project_row(self.conn, project)? == 0 {
            return Err(RepoError::NotFound(project.id.clone()));
        }
        Ok(())
    }

    fn get(&self, id: &str) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_project_row(row)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY seq DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn count(&self) -> RepoResult<usize> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))?;
        usize::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("invalid project count `{total}`")))
    }

    fn remove(&mut self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn insert_chapter(&mut self, chapter: &Chapter, parent: &Project) -> RepoResult<()> {
        validate_chapter_write(chapter, parent)?;

        let tx = self.conn.unchecked_transaction()?;
        if !project_exists(&tx, &parent.id)? {
            return Err(RepoError::NotFound(parent.id.clone()));
        }
        let taken = tx
            .query_row(
                "SELECT 1 FROM chapters WHERE id = ?1;",
                [chapter.id.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        if taken.is_some() {
            return Err(RepoError::Duplicate(chapter.id.clone()));
        }

        tx.execute(
            "INSERT INTO chapters (
                id,
                project_id,
                title,
                content,
                position,
                status,
                word_count,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                chapter.id.as_str(),
                chapter.project_id.as_str(),
                chapter.title.as_str(),
                chapter.content.as_str(),
                chapter.order,
                chapter.status.as_str(),
                count_to_db(chapter.word_count)?,
                chapter.created_at.timestamp_millis(),
                chapter.updated_at.timestamp_millis(),
            ],
        )?;
        update_project_row(&tx, parent)?;
        tx.commit()?;
        Ok(())
    }

    fn list_chapters(&self, project_id: &str) -> RepoResult<Vec<Chapter>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHAPTER_SELECT_SQL} WHERE project_id = ?1 ORDER BY position ASC, seq ASC;"
        ))?;
        let mut rows = stmt.query([project_id])?;
        let mut chapters = Vec::new();
        while let Some(row) = rows.next()? {
            chapters.push(parse_chapter_row(row)?);
        }
        Ok(chapters)
    }
}

fn project_exists(conn: &Connection, id: &str) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM projects WHERE id = ?1;", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Rewrites every mutable column of `project`; returns the changed row count.
fn update_project_row(conn: &Connection, project: &Project) -> RepoResult<usize> {
    let changed = conn.execute(
        "UPDATE projects
         SET
            title = ?1,
            description = ?2,
            type = ?3,
            status = ?4,
            created_at = ?5,
            updated_at = ?6,
            word_count = ?7,
            chapter_count = ?8,
            cover_color = ?9,
            last_edited_by = ?10
         WHERE id = ?11;",
        params![
            project.title.as_str(),
            project.description.as_str(),
            project.kind.as_str(),
            project.status.as_str(),
            project.created_at.timestamp_millis(),
            project.updated_at.timestamp_millis(),
            count_to_db(project.word_count)?,
            i64::from(project.chapter_count),
            project.cover_color.as_str(),
            project.last_edited_by.as_deref(),
            project.id.as_str(),
        ],
    )?;
    Ok(changed)
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id: String = row.get("id")?;

    let type_text: String = row.get("type")?;
    let kind = ProjectType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid project type `{type_text}` in projects.type"))
    })?;

    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid project status `{status_text}` in projects.status"
        ))
    })?;

    let word_count: i64 = row.get("word_count")?;
    let word_count = u64::try_from(word_count).map_err(|_| {
        RepoError::InvalidData(format!("negative word_count `{word_count}` for `{id}`"))
    })?;
    let chapter_count: i64 = row.get("chapter_count")?;
    let chapter_count = u32::try_from(chapter_count).map_err(|_| {
        RepoError::InvalidData(format!(
            "chapter_count `{chapter_count}` out of range for `{id}`"
        ))
    })?;

    let project = Project {
        title: row.get("title")?,
        description: row.get("description")?,
        kind,
        status,
        created_at: millis_to_datetime(row.get("created_at")?, "projects.created_at")?,
        updated_at: millis_to_datetime(row.get("updated_at")?, "projects.updated_at")?,
        word_count,
        chapter_count,
        cover_color: row.get("cover_color")?,
        last_edited_by: row.get("last_edited_by")?,
        id,
    };
    project.validate()?;
    Ok(project)
}

fn parse_chapter_row(row: &Row<'_>) -> RepoResult<Chapter> {
    let id: String = row.get("id")?;

    let status_text: String = row.get("status")?;
    let status = ChapterStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid chapter status `{status_text}` in chapters.status"
        ))
    })?;

    let word_count: i64 = row.get("word_count")?;
    let word_count = u64::try_from(word_count).map_err(|_| {
        RepoError::InvalidData(format!("negative word_count `{word_count}` for chapter `{id}`"))
    })?;

    let chapter = Chapter {
        project_id: row.get("project_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        order: row.get("position")?,
        status,
        word_count,
        created_at: millis_to_datetime(row.get("created_at")?, "chapters.created_at")?,
        updated_at: millis_to_datetime(row.get("updated_at")?, "chapters.updated_at")?,
        id,
    };
    chapter.validate()?;
    Ok(chapter)
}

fn millis_to_datetime(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

fn count_to_db(value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("word_count `{value}` exceeds storage range")))
}

#[cfg(test)]
mod tests {
    use super::SqliteProjectRepository;
    use crate::db::open_db_in_memory;
    use crate::model::chapter::{Chapter, ChapterStatus, CreateChapter};
    use crate::model::project::{CreateProject, Project, ProjectType};
    use crate::repo::project_repo::{ProjectRepository, RepoError};
    use chrono::{TimeZone, Utc};

    fn project(id: &str) -> Project {
        Project::new_draft(
            id.to_string(),
            CreateProject {
                title: format!("project {id}"),
                description: "body".to_string(),
                kind: ProjectType::Whitepaper,
            },
            "#F59E0B",
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(),
        )
    }

    #[test]
    fn corrupted_type_is_reported_as_invalid_data() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = SqliteProjectRepository::new(&conn);
        repo.insert_front(&project("1")).unwrap();

        conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
            .unwrap();
        conn.execute("UPDATE projects SET type = 'poem' WHERE id = '1';", [])
            .unwrap();

        let err = repo.get("1").unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.contains("poem")));
    }

    #[test]
    fn count_tracks_inserts_and_removals() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = SqliteProjectRepository::new(&conn);
        repo.insert_front(&project("1")).unwrap();
        repo.insert_front(&project("2")).unwrap();
        repo.remove("1").unwrap();
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.list().unwrap()[0].id, "2");
    }

    fn chapter(id: &str, parent: &Project, order: i64, content: &str) -> Chapter {
        Chapter::new(
            id.to_string(),
            parent.id.clone(),
            CreateChapter {
                title: format!("chapter {id}"),
                content: content.to_string(),
                order,
                status: ChapterStatus::NeedsEdit,
            },
            parent.created_at,
        )
    }

    #[test]
    fn chapter_insert_updates_parent_and_lists_in_position_order() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = SqliteProjectRepository::new(&conn);
        let mut parent = project("1");
        repo.insert_front(&parent).unwrap();

        for (id, order, content) in [("c1", 3, "one two"), ("c2", 1, "three")] {
            let chapter = chapter(id, &parent, order, content);
            parent.record_chapter(&chapter);
            repo.insert_chapter(&chapter, &parent).unwrap();
        }

        let chapters = repo.list_chapters("1").unwrap();
        let ids: Vec<_> = chapters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c2", "c1"]);
        assert_eq!(chapters[0].status, ChapterStatus::NeedsEdit);

        let stored = repo.get("1").unwrap().unwrap();
        assert_eq!(stored.chapter_count, 2);
        assert_eq!(stored.word_count, 3);
    }

    #[test]
    fn failed_chapter_insert_leaves_parent_untouched() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = SqliteProjectRepository::new(&conn);
        let mut parent = project("1");
        repo.insert_front(&parent).unwrap();
        let first = chapter("c1", &parent, 0, "words here");
        parent.record_chapter(&first);
        repo.insert_chapter(&first, &parent).unwrap();

        let mut changed = parent.clone();
        changed.record_chapter(&first);
        let err = repo.insert_chapter(&first, &changed).unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(id) if id == "c1"));
        assert_eq!(repo.get("1").unwrap().unwrap().chapter_count, 1);
    }

    #[test]
    fn removing_project_cascades_to_chapters() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = SqliteProjectRepository::new(&conn);
        let mut parent = project("1");
        repo.insert_front(&parent).unwrap();
        let first = chapter("c1", &parent, 0, "text");
        parent.record_chapter(&first);
        repo.insert_chapter(&first, &parent).unwrap();

        repo.remove("1").unwrap();
        let left: i64 = conn
            .query_row("SELECT COUNT(*) FROM chapters;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(left, 0);
    }
}
