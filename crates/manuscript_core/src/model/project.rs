//! Project domain model.
//!
//! # Responsibility
//! - Define the canonical project record exchanged with the dashboard.
//! - Define create/update inputs and their merge semantics.
//!
//! # Invariants
//! - `id` is assigned once at creation and never rewritten.
//! - `updated_at` is never earlier than `created_at`.
//! - `kind` and `status` only hold enumerated values.

use crate::model::chapter::Chapter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque project identifier.
///
/// Derived from creation time in epoch milliseconds, but callers must treat it
/// as an opaque string.
pub type ProjectId = String;

/// Kind of authoring work a project represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Book,
    Article,
    Guide,
    Whitepaper,
    Other,
}

impl ProjectType {
    /// Stable lowercase label, shared by JSON and SQLite encodings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Article => "article",
            Self::Guide => "guide",
            Self::Whitepaper => "whitepaper",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "book" => Some(Self::Book),
            "article" => Some(Self::Article),
            "guide" => Some(Self::Guide),
            "whitepaper" => Some(Self::Whitepaper),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Editorial lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Initial state of every newly created project.
    #[default]
    Draft,
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Canonical project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    /// Serialized as `type` to match the dashboard schema.
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub status: ProjectStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub word_count: u64,
    pub chapter_count: u32,
    /// Display color used for the book-spine visualization.
    pub cover_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<String>,
}

/// Validation failures for project records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyTitle,
    UpdatedBeforeCreated {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({}) must not be earlier than created_at ({})",
                timestamp::format(updated_at),
                timestamp::format(created_at)
            ),
        }
    }
}

impl Error for ProjectValidationError {}

impl Project {
    /// Builds a fresh draft record from creation input.
    ///
    /// # Invariants
    /// - `status` starts as `Draft`.
    /// - Word and chapter counts start at zero.
    /// - `created_at == updated_at == now`.
    pub fn new_draft(
        id: ProjectId,
        input: CreateProject,
        cover_color: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            kind: input.kind,
            status: ProjectStatus::Draft,
            created_at: now,
            updated_at: now,
            word_count: 0,
            chapter_count: 0,
            cover_color: cover_color.into(),
            last_edited_by: None,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.title.trim().is_empty() {
            return Err(ProjectValidationError::EmptyTitle);
        }
        if self.updated_at < self.created_at {
            return Err(ProjectValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Applies a partial update in place.
    ///
    /// Only fields present in `patch` change. The caller owns `updated_at`.
    pub fn apply(&mut self, patch: UpdateProject) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    /// Folds a newly added chapter into the aggregate counts.
    ///
    /// The caller owns `updated_at`.
    pub fn record_chapter(&mut self, chapter: &Chapter) {
        self.chapter_count = self.chapter_count.saturating_add(1);
        self.word_count = self.word_count.saturating_add(chapter.word_count);
    }
}

/// Input for project creation. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
}

/// Partial update over the mutable project fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

/// ISO-8601 UTC timestamps with millisecond precision (`2024-11-15T10:00:00.000Z`).
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}
