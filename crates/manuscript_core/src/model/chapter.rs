//! Chapter domain model.
//!
//! # Responsibility
//! - Define the chapter record nested under a project.
//! - Derive chapter word counts from content.
//!
//! # Invariants
//! - Every chapter belongs to exactly one project via `project_id`.
//! - `word_count` always equals `count_words(content)`.

use crate::model::project::{timestamp, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque chapter identifier, issued by the same generator as project ids.
pub type ChapterId = String;

/// Editorial state of a single chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChapterStatus {
    #[default]
    Draft,
    NeedsResearch,
    NeedsEdit,
    Final,
}

impl ChapterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::NeedsResearch => "needs-research",
            Self::NeedsEdit => "needs-edit",
            Self::Final => "final",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "needs-research" => Some(Self::NeedsResearch),
            "needs-edit" => Some(Self::NeedsEdit),
            "final" => Some(Self::Final),
            _ => None,
        }
    }
}

/// Canonical chapter record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub project_id: ProjectId,
    pub title: String,
    pub content: String,
    /// Reading position; ties keep insertion order.
    pub order: i64,
    pub status: ChapterStatus,
    pub word_count: u64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Validation failures for chapter records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterValidationError {
    EmptyTitle,
    StaleWordCount { stored: u64, counted: u64 },
    UpdatedBeforeCreated,
}

impl Display for ChapterValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "chapter title must not be empty"),
            Self::StaleWordCount { stored, counted } => write!(
                f,
                "chapter word_count {stored} does not match content ({counted} words)"
            ),
            Self::UpdatedBeforeCreated => {
                write!(f, "chapter updated_at must not be earlier than created_at")
            }
        }
    }
}

impl Error for ChapterValidationError {}

impl Chapter {
    /// Builds a chapter under `project_id` with its word count derived from content.
    pub fn new(
        id: ChapterId,
        project_id: ProjectId,
        input: CreateChapter,
        now: DateTime<Utc>,
    ) -> Self {
        let word_count = count_words(&input.content);
        Self {
            id,
            project_id,
            title: input.title,
            content: input.content,
            order: input.order,
            status: input.status,
            word_count,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ChapterValidationError> {
        if self.title.trim().is_empty() {
            return Err(ChapterValidationError::EmptyTitle);
        }
        let counted = count_words(&self.content);
        if self.word_count != counted {
            return Err(ChapterValidationError::StaleWordCount {
                stored: self.word_count,
                counted,
            });
        }
        if self.updated_at < self.created_at {
            return Err(ChapterValidationError::UpdatedBeforeCreated);
        }
        Ok(())
    }
}

/// Input for chapter creation. Only `title` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChapter {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub status: ChapterStatus,
}

/// Whitespace-separated word count.
pub fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}
