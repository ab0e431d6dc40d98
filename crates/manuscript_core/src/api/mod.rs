//! Transport-agnostic request surface for the dashboard.
//!
//! # Responsibility
//! - Map typed or raw (method, path, body) requests onto the project store.
//! - Render results as the JSON envelopes the dashboard client expects.
//!
//! # Invariants
//! - Never panics; every failure becomes an `{ "error": ... }` response.
//! - Not-found is always `404 { "error": "Project not found" }`, including
//!   chapter requests under an unknown project.

pub mod envelope;
pub mod router;

use crate::model::chapter::CreateChapter;
use crate::model::project::{CreateProject, UpdateProject};
use crate::repo::project_repo::{ProjectRepository, RepoError};
use crate::service::project_service::{ProjectService, ProjectServiceError};
use envelope::{
    DataEnvelope, HealthStatus, ListEnvelope, ListMeta, ServiceInfo, SuccessEnvelope,
    PROJECT_NOT_FOUND,
};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

/// Typed request understood by `ProjectApi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    Root,
    Health,
    ListProjects,
    GetProject { id: String },
    CreateProject(CreateProject),
    UpdateProject { id: String, patch: UpdateProject },
    DeleteProject { id: String },
    ListChapters { project_id: String },
    CreateChapter { project_id: String, input: CreateChapter },
}

impl ApiRequest {
    fn label(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Health => "health",
            Self::ListProjects => "list",
            Self::GetProject { .. } => "get",
            Self::CreateProject(_) => "create",
            Self::UpdateProject { .. } => "update",
            Self::DeleteProject { .. } => "delete",
            Self::ListChapters { .. } => "list_chapters",
            Self::CreateChapter { .. } => "create_chapter",
        }
    }
}

/// HTTP-style status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Serializes `payload` with the given status.
    pub fn json(status: u16, payload: &impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status, body },
            Err(err) => Self::error(500, format!("failed to encode response: {err}")),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            status,
            body: serde_json::json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error message for failure responses.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// Request facade over a project service.
pub struct ProjectApi<R: ProjectRepository> {
    service: ProjectService<R>,
    app_name: String,
}

impl<R: ProjectRepository> ProjectApi<R> {
    pub fn new(service: ProjectService<R>, app_name: impl Into<String>) -> Self {
        Self {
            service,
            app_name: app_name.into(),
        }
    }

    pub fn service(&self) -> &ProjectService<R> {
        &self.service
    }

    /// Routes and executes a raw request.
    pub fn handle(&mut self, method: &str, path: &str, body: Option<&str>) -> ApiResponse {
        let started_at = Instant::now();
        let response = match router::route(method, path, body) {
            Ok(request) => self.dispatch(request),
            Err(response) => response,
        };
        info!(
            "event=api_request module=api method={} path={} status={} duration_ms={}",
            method.trim().to_ascii_uppercase(),
            path,
            response.status,
            started_at.elapsed().as_millis()
        );
        response
    }

    /// Executes a typed request.
    pub fn dispatch(&mut self, request: ApiRequest) -> ApiResponse {
        let operation = request.label();
        let response = match request {
            ApiRequest::Root => ApiResponse::json(
                200,
                &ServiceInfo {
                    message: self.app_name.clone(),
                    version: crate::core_version().to_string(),
                },
            ),
            ApiRequest::Health => ApiResponse::json(
                200,
                &HealthStatus {
                    status: "ok".to_string(),
                    message: "API is running".to_string(),
                },
            ),
            ApiRequest::ListProjects => match self.service.list() {
                Ok(list) => ApiResponse::json(
                    200,
                    &ListEnvelope {
                        data: list.items,
                        meta: ListMeta { total: list.total },
                    },
                ),
                Err(err) => error_response(&err),
            },
            ApiRequest::GetProject { id } => match self.service.get(&id) {
                Ok(project) => ApiResponse::json(200, &DataEnvelope { data: project }),
                Err(err) => error_response(&err),
            },
            ApiRequest::CreateProject(input) => match self.service.create(input) {
                Ok(project) => ApiResponse::json(201, &DataEnvelope { data: project }),
                Err(err) => error_response(&err),
            },
            ApiRequest::UpdateProject { id, patch } => match self.service.update(&id, patch) {
                Ok(project) => ApiResponse::json(200, &DataEnvelope { data: project }),
                Err(err) => error_response(&err),
            },
            ApiRequest::DeleteProject { id } => match self.service.delete(&id) {
                Ok(()) => ApiResponse::json(200, &SuccessEnvelope { success: true }),
                Err(err) => error_response(&err),
            },
            ApiRequest::ListChapters { project_id } => {
                match self.service.list_chapters(&project_id) {
                    Ok(chapters) => ApiResponse::json(200, &DataEnvelope { data: chapters }),
                    Err(err) => error_response(&err),
                }
            }
            ApiRequest::CreateChapter { project_id, input } => {
                match self.service.create_chapter(&project_id, input) {
                    Ok(chapter) => ApiResponse::json(201, &DataEnvelope { data: chapter }),
                    Err(err) => error_response(&err),
                }
            }
        };
        debug!(
            "event=api_dispatch module=api operation={operation} status={}",
            response.status
        );
        response
    }
}

fn error_response(err: &ProjectServiceError) -> ApiResponse {
    match err {
        ProjectServiceError::NotFound(_) => ApiResponse::error(404, PROJECT_NOT_FOUND),
        ProjectServiceError::Repo(RepoError::Validation(inner)) => {
            ApiResponse::error(400, inner.to_string())
        }
        ProjectServiceError::Repo(RepoError::InvalidChapter(inner)) => {
            ApiResponse::error(400, inner.to_string())
        }
        ProjectServiceError::Repo(RepoError::Duplicate(_)) => {
            ApiResponse::error(409, err.to_string())
        }
        ProjectServiceError::Repo(_) => ApiResponse::error(500, err.to_string()),
    }
}
