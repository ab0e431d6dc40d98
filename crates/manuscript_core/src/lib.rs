//! Core project store for the Manuscript dashboard.
//! This crate owns the project and chapter record invariants and the CRUD
//! contract the dashboard talks to during local development.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use api::{ApiRequest, ApiResponse, ProjectApi};
pub use config::{ConfigError, LatencyConfig, StoreConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::chapter::{
    count_words, Chapter, ChapterId, ChapterStatus, ChapterValidationError, CreateChapter,
};
pub use model::project::{
    CreateProject, Project, ProjectId, ProjectStatus, ProjectType, ProjectValidationError,
    UpdateProject,
};
pub use repo::memory_repo::InMemoryProjectRepository;
pub use repo::project_repo::{ProjectRepository, RepoError, RepoResult};
pub use repo::sqlite_repo::SqliteProjectRepository;
pub use seed::{demo_projects, seed_if_empty};
pub use service::project_service::{ProjectList, ProjectService, ProjectServiceError};
pub use service::strategy::{
    cover_color_at, Clock, ColorPicker, FixedClock, IdGenerator, Latency, LatencyProfile,
    NoLatency, RandomColorPicker, SequentialColorPicker, SleepLatency, StoreOperation,
    SystemClock, TimestampIdGenerator, COVER_PALETTE,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
