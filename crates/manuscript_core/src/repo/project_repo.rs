//! Project repository contract and shared error type.
//!
//! # Invariants
//! - `list` returns the most recently inserted project first.
//! - `count` always equals `list().len()`.
//! - Writes take `&mut self`, so one mutation runs at a time per repository.
//! - Removing a project removes its chapters.

use crate::db::DbError;
use crate::model::chapter::{Chapter, ChapterValidationError};
use crate::model::project::{Project, ProjectId, ProjectValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project storage operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProjectValidationError),
    InvalidChapter(ChapterValidationError),
    Db(DbError),
    NotFound(ProjectId),
    Duplicate(ProjectId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidChapter(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "project not found: {id}"),
            Self::Duplicate(id) => write!(f, "id already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidChapter(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Duplicate(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ChapterValidationError> for RepoError {
    fn from(value: ChapterValidationError) -> Self {
        Self::InvalidChapter(value)
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

/// Storage contract for the project collection.
pub trait ProjectRepository {
    /// Stores a new project ahead of every existing one.
    fn insert_front(&mut self, project: &Project) -> RepoResult<()>;
    /// Overwrites the stored record with the same id.
    fn replace(&mut self, project: &Project) -> RepoResult<()>;
    fn get(&self, id: &str) -> RepoResult<Option<Project>>;
    fn list(&self) -> RepoResult<Vec<Project>>;
    fn count(&self) -> RepoResult<usize>;
    /// Removes a project and its chapters, failing with `NotFound` when absent.
    fn remove(&mut self, id: &str) -> RepoResult<()>;
    /// Stores `chapter` together with its parent's refreshed record in one write.
    ///
    /// # Errors
    /// - `NotFound` when the parent project does not exist.
    /// - `Duplicate` when the chapter id is already taken.
    /// - `InvalidData` when `parent.id` differs from `chapter.project_id`.
    fn insert_chapter(&mut self, chapter: &Chapter, parent: &Project) -> RepoResult<()>;
    /// Chapters of one project ordered by `order`, ties in insertion order.
    ///
    /// Unknown project ids yield an empty list.
    fn list_chapters(&self, project_id: &str) -> RepoResult<Vec<Chapter>>;
}

/// Checks the inputs shared by every `insert_chapter` implementation.
pub(crate) fn validate_chapter_write(chapter: &Chapter, parent: &Project) -> RepoResult<()> {
    chapter.validate()?;
    parent.validate()?;
    if chapter.project_id != parent.id {
        return Err(RepoError::InvalidData(format!(
            "chapter `{}` belongs to `{}`, not `{}`",
            chapter.id, chapter.project_id, parent.id
        )));
    }
    Ok(())
}
