//! Project store use-case service.
//!
//! # Responsibility
//! - Provide the list/get/create/update/delete contract used by the dashboard.
//! - List and add chapters, keeping the parent's word and chapter counts current.
//! - Apply simulated latency, id assignment and cover color choice.
//! - Emit one structured log event per operation.
//!
//! # Invariants
//! - Latency runs before the repository call, never in the middle of it.
//! - The only store-level failure is `ProjectServiceError::NotFound`.
//! - `update` always moves `updated_at` strictly forward.

use crate::config::StoreConfig;
use crate::model::chapter::{Chapter, CreateChapter};
use crate::model::project::{CreateProject, Project, ProjectId, UpdateProject};
use crate::repo::project_repo::{ProjectRepository, RepoError};
use crate::service::strategy::{
    advance_timestamp, Clock, ColorPicker, IdGenerator, Latency, NoLatency, RandomColorPicker,
    SleepLatency, StoreOperation, SystemClock, TimestampIdGenerator,
};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for project store operations.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// Target project does not exist.
    NotFound(ProjectId),
    /// Storage-layer failure other than not-found.
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ProjectServiceError>;

/// Full listing plus its total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectList {
    /// Newest inserts first.
    pub items: Vec<Project>,
    pub total: usize,
}

/// Project store facade over a repository implementation.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    colors: Box<dyn ColorPicker>,
    latency: Box<dyn Latency>,
    editor_label: Option<String>,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service with wall-clock time, random colors and no latency.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            clock: Box::new(SystemClock),
            ids: Box::new(TimestampIdGenerator::new()),
            colors: Box::new(RandomColorPicker),
            latency: Box::new(NoLatency),
            editor_label: None,
        }
    }

    /// Creates a service with latency and attribution taken from `config`.
    pub fn from_config(repo: R, config: &StoreConfig) -> Self {
        let service = Self::new(repo).with_editor_label(config.editor_label.clone());
        if config.latency.enabled {
            service.with_latency(SleepLatency::new(config.latency.profile))
        } else {
            service
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_color_picker(mut self, colors: impl ColorPicker + 'static) -> Self {
        self.colors = Box::new(colors);
        self
    }

    pub fn with_latency(mut self, latency: impl Latency + 'static) -> Self {
        self.latency = Box::new(latency);
        self
    }

    /// Attributes newly created projects to `label` via `last_edited_by`.
    pub fn with_editor_label(mut self, label: Option<String>) -> Self {
        self.editor_label = label.filter(|value| !value.trim().is_empty());
        self
    }

    /// Lists every project, newest insert first.
    pub fn list(&self) -> ServiceResult<ProjectList> {
        let started_at = self.begin(StoreOperation::List);
        let items = self.repo.list()?;
        let total = items.len();
        info!(
            "event=project_list module=store status=ok total={total} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(ProjectList { items, total })
    }

    /// Gets one project by id.
    pub fn get(&self, id: &str) -> ServiceResult<Project> {
        let started_at = self.begin(StoreOperation::Get);
        let result = self
            .repo
            .get(id)
            .map_err(ProjectServiceError::from)
            .and_then(|found| found.ok_or_else(|| ProjectServiceError::NotFound(id.to_string())));
        log_outcome(StoreOperation::Get, id, started_at, &result);
        result
    }

    /// Creates a draft project and stores it ahead of all others.
    pub fn create(&mut self, input: CreateProject) -> ServiceResult<Project> {
        let started_at = self.begin(StoreOperation::Create);
        let now = self.clock.now();
        let id = self.ids.next_id(now);
        let mut project = Project::new_draft(id, input, self.colors.pick(), now);
        project.last_edited_by = self.editor_label.clone();

        let result = self
            .repo
            .insert_front(&project)
            .map(|()| project)
            .map_err(ProjectServiceError::from);
        let id = result.as_ref().map_or("-", |project| project.id.as_str());
        log_outcome(StoreOperation::Create, id, started_at, &result);
        result
    }

    /// Merges supplied fields over an existing project.
    pub fn update(&mut self, id: &str, patch: UpdateProject) -> ServiceResult<Project> {
        let started_at = self.begin(StoreOperation::Update);
        let result = self.apply_update(id, patch);
        log_outcome(StoreOperation::Update, id, started_at, &result);
        result
    }

    /// Removes one project.
    pub fn delete(&mut self, id: &str) -> ServiceResult<()> {
        let started_at = self.begin(StoreOperation::Delete);
        let result = self.repo.remove(id).map_err(ProjectServiceError::from);
        log_outcome(StoreOperation::Delete, id, started_at, &result);
        result
    }

    /// Lists the chapters of one project in reading order.
    pub fn list_chapters(&self, project_id: &str) -> ServiceResult<Vec<Chapter>> {
        let started_at = self.begin(StoreOperation::ListChapters);
        let result = self.load_chapters(project_id);
        log_outcome(StoreOperation::ListChapters, project_id, started_at, &result);
        result
    }

    /// Adds a chapter and folds its words into the parent's counts.
    pub fn create_chapter(
        &mut self,
        project_id: &str,
        input: CreateChapter,
    ) -> ServiceResult<Chapter> {
        let started_at = self.begin(StoreOperation::CreateChapter);
        let result = self.apply_create_chapter(project_id, input);
        log_outcome(StoreOperation::CreateChapter, project_id, started_at, &result);
        result
    }

    fn load_chapters(&self, project_id: &str) -> ServiceResult<Vec<Chapter>> {
        if self.repo.get(project_id)?.is_none() {
            return Err(ProjectServiceError::NotFound(project_id.to_string()));
        }
        Ok(self.repo.list_chapters(project_id)?)
    }

    fn apply_create_chapter(
        &mut self,
        project_id: &str,
        input: CreateChapter,
    ) -> ServiceResult<Chapter> {
        let mut project = self
            .repo
            .get(project_id)?
            .ok_or_else(|| ProjectServiceError::NotFound(project_id.to_string()))?;
        let now = self.clock.now();
        let chapter = Chapter::new(self.ids.next_id(now), project.id.clone(), input, now);
        project.record_chapter(&chapter);
        project.updated_at = advance_timestamp(project.updated_at, now);
        self.repo.insert_chapter(&chapter, &project)?;
        Ok(chapter)
    }

    fn apply_update(&mut self, id: &str, patch: UpdateProject) -> ServiceResult<Project> {
        let mut project = self
            .repo
            .get(id)?
            .ok_or_else(|| ProjectServiceError::NotFound(id.to_string()))?;
        project.apply(patch);
        project.updated_at = advance_timestamp(project.updated_at, self.clock.now());
        self.repo.replace(&project)?;
        Ok(project)
    }

    fn begin(&self, operation: StoreOperation) -> Instant {
        let started_at = Instant::now();
        self.latency.pause(operation);
        debug!(
            "event=project_{operation} module=store status=start latency_ms={}",
            started_at.elapsed().as_millis()
        );
        started_at
    }
}

fn log_outcome<T>(
    operation: StoreOperation,
    id: &str,
    started_at: Instant,
    result: &ServiceResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event=project_{operation} module=store status=ok project_id={id} duration_ms={duration_ms}"
        ),
        Err(ProjectServiceError::NotFound(_)) => warn!(
            "event=project_{operation} module=store status=error project_id={id} duration_ms={duration_ms} error_code=not_found"
        ),
        Err(ProjectServiceError::Repo(err)) => warn!(
            "event=project_{operation} module=store status=error project_id={id} duration_ms={duration_ms} error_code=repo_failed error={err}"
        ),
    }
}
