//! In-memory project repository.
//!
//! # Responsibility
//! - Hold the canonical ordered project list for local development.
//!
//! # Invariants
//! - Index 0 is the most recently inserted project.
//! - Chapters are kept in insertion order and only under existing projects.
//! - Contents live only as long as the repository value.

use crate::model::chapter::Chapter;
use crate::model::project::Project;
use crate::repo::project_repo::{validate_chapter_write, ProjectRepository, RepoError, RepoResult};

/// `Vec`-backed repository with front insertion.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    projects: Vec<Project>,
    chapters: Vec<Chapter>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding `projects` in the given display order.
    ///
    /// # Errors
    /// - Returns `Validation` for an invalid record.
    /// - Returns `Duplicate` when two records share an id.
    pub fn with_projects(projects: Vec<Project>) -> RepoResult<Self> {
        let mut repo = Self::new();
        for project in projects.iter().rev() {
            repo.insert_front(project)?;
        }
        Ok(repo)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.projects.iter().position(|project| project.id == id)
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    fn insert_front(&mut self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        if self.position(&project.id).is_some() {
            return Err(RepoError::Duplicate(project.id.clone()));
        }
        self.projects.insert(0, project.clone());
        Ok(())
    }

    fn replace(&mut self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        let index = self
            .position(&project.id)
            .ok_or_else(|| RepoError::NotFound(project.id.clone()))?;
        self.projects[index] = project.clone();
        Ok(())
    }

    fn get(&self, id: &str) -> RepoResult<Option<Project>> {
        Ok(self.position(id).map(|index| self.projects[index].clone()))
    }

    fn list(&self) -> RepoResult<Vec<Project>> {
        Ok(self.projects.clone())
    }

    fn count(&self) -> RepoResult<usize> {
        Ok(self.projects.len())
    }

    fn remove(&mut self, id: &str) -> RepoResult<()> {
        let index = self
            .position(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
        self.projects.remove(index);
        self.chapters.retain(|chapter| chapter.project_id != id);
        Ok(())
    }

    fn insert_chapter(&mut self, chapter: &Chapter, parent: &Project) -> RepoResult<()> {
        validate_chapter_write(chapter, parent)?;
        let index = self
            .position(&parent.id)
            .ok_or_else(|| RepoError::NotFound(parent.id.clone()))?;
        if self.chapters.iter().any(|existing| existing.id == chapter.id) {
            return Err(RepoError::Duplicate(chapter.id.clone()));
        }
        self.chapters.push(chapter.clone());
        self.projects[index] = parent.clone();
        Ok(())
    }

    fn list_chapters(&self, project_id: &str) -> RepoResult<Vec<Chapter>> {
        let mut chapters: Vec<Chapter> = self
            .chapters
            .iter()
            .filter(|chapter| chapter.project_id == project_id)
            .cloned()
            .collect();
        chapters.sort_by_key(|chapter| chapter.order);
        Ok(chapters)
    }
}
