//! Method/path routing onto typed requests.
//!
//! # Invariants
//! - Query strings and a single trailing slash are ignored.
//! - Routing failures are returned as ready-to-send responses.

use crate::api::envelope::{METHOD_NOT_ALLOWED, ROUTE_NOT_FOUND};
use crate::api::{ApiRequest, ApiResponse};
use crate::model::chapter::CreateChapter;
use crate::model::project::{CreateProject, UpdateProject};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static PROJECTS_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/api/v1/projects(?:/([^/]+)(/chapters)?)?/?$")
        .expect("valid projects path regex")
});

/// Parses a raw request into an `ApiRequest`.
pub fn route(method: &str, path: &str, body: Option<&str>) -> Result<ApiRequest, ApiResponse> {
    let method = method.trim().to_ascii_uppercase();
    let path = path.split(['?', '#']).next().unwrap_or_default();

    match path {
        "/" | "" => {
            return match method.as_str() {
                "GET" => Ok(ApiRequest::Root),
                _ => Err(method_not_allowed()),
            }
        }
        "/health" | "/health/" => {
            return match method.as_str() {
                "GET" => Ok(ApiRequest::Health),
                _ => Err(method_not_allowed()),
            }
        }
        _ => {}
    }

    let captures = PROJECTS_PATH_RE
        .captures(path)
        .ok_or_else(|| ApiResponse::error(404, ROUTE_NOT_FOUND))?;

    let id = captures.get(1).map(|m| m.as_str().to_string());
    let chapters = captures.get(2).is_some();

    match id {
        Some(project_id) if chapters => match method.as_str() {
            "GET" => Ok(ApiRequest::ListChapters { project_id }),
            "POST" => Ok(ApiRequest::CreateChapter {
                project_id,
                input: parse_body::<CreateChapter>(body)?,
            }),
            _ => Err(method_not_allowed()),
        },
        None => match method.as_str() {
            "GET" => Ok(ApiRequest::ListProjects),
            "POST" => Ok(ApiRequest::CreateProject(parse_body::<CreateProject>(body)?)),
            _ => Err(method_not_allowed()),
        },
        Some(id) => match method.as_str() {
            "GET" => Ok(ApiRequest::GetProject { id }),
            "PUT" | "PATCH" => Ok(ApiRequest::UpdateProject {
                id,
                patch: parse_body::<UpdateProject>(body)?,
            }),
            "DELETE" => Ok(ApiRequest::DeleteProject { id }),
            _ => Err(method_not_allowed()),
        },
    }
}

fn parse_body<T: DeserializeOwned>(body: Option<&str>) -> Result<T, ApiResponse> {
    let raw = body.map(str::trim).filter(|raw| !raw.is_empty()).ok_or_else(|| {
        ApiResponse::error(400, "request body is required")
    })?;
    serde_json::from_str(raw)
        .map_err(|err| ApiResponse::error(400, format!("invalid request body: {err}")))
}

fn method_not_allowed() -> ApiResponse {
    ApiResponse::error(405, METHOD_NOT_ALLOWED)
}

#[cfg(test)]
mod tests {
    use super::route;
    use crate::api::ApiRequest;
    use crate::model::project::{ProjectStatus, ProjectType};

    #[test]
    fn routes_collection_and_item_paths() {
        assert!(matches!(
            route("get", "/api/v1/projects?page=2", None),
            Ok(ApiRequest::ListProjects)
        ));
        assert!(matches!(
            route("DELETE", "/api/v1/projects/42/", None),
            Ok(ApiRequest::DeleteProject { id }) if id == "42"
        ));
    }

    #[test]
    fn parses_create_and_update_bodies() {
        let create = route(
            "POST",
            "/api/v1/projects",
            Some(r#"{"title":"Draft A","description":"x","type":"book"}"#),
        );
        assert!(matches!(
            create,
            Ok(ApiRequest::CreateProject(input)) if input.kind == ProjectType::Book
        ));

        let update = route("PUT", "/api/v1/projects/7", Some(r#"{"status":"archived"}"#));
        assert!(matches!(
            update,
            Ok(ApiRequest::UpdateProject { id, patch })
                if id == "7" && patch.status == Some(ProjectStatus::Archived) && patch.title.is_none()
        ));
    }

    #[test]
    fn rejects_unknown_enum_values_and_missing_fields() {
        let bad_type = route(
            "POST",
            "/api/v1/projects",
            Some(r#"{"title":"t","description":"d","type":"poem"}"#),
        )
        .unwrap_err();
        assert_eq!(bad_type.status, 400);

        let missing = route("POST", "/api/v1/projects", Some(r#"{"title":"t"}"#)).unwrap_err();
        assert_eq!(missing.status, 400);

        let no_body = route("PUT", "/api/v1/projects/1", None).unwrap_err();
        assert_eq!(no_body.status, 400);
    }

    #[test]
    fn unknown_paths_and_methods_are_distinguished() {
        assert_eq!(route("GET", "/api/v2/projects", None).unwrap_err().status, 404);
        assert_eq!(route("PATCH", "/api/v1/projects", None).unwrap_err().status, 405);
        assert_eq!(route("POST", "/health", None).unwrap_err().status, 405);
        assert_eq!(
            route("DELETE", "/api/v1/projects/1/chapters", None)
                .unwrap_err()
                .status,
            405
        );
        assert_eq!(
            route("GET", "/api/v1/projects/1/notes", None).unwrap_err().status,
            404
        );
    }

    #[test]
    fn routes_chapter_sub_resource() {
        assert!(matches!(
            route("GET", "/api/v1/projects/9/chapters/", None),
            Ok(ApiRequest::ListChapters { project_id }) if project_id == "9"
        ));

        let create = route(
            "POST",
            "/api/v1/projects/9/chapters",
            Some(r#"{"title":"Introduction","content":"Hello there","order":1}"#),
        );
        assert!(matches!(
            create,
            Ok(ApiRequest::CreateChapter { project_id, input })
                if project_id == "9" && input.order == 1 && input.content == "Hello there"
        ));

        let missing_title = route("POST", "/api/v1/projects/9/chapters", Some("{}")).unwrap_err();
        assert_eq!(missing_title.status, 400);
    }
}
