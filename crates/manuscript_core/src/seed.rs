//! Sample projects for local dashboard development.

use crate::model::project::{Project, ProjectStatus, ProjectType};
use crate::repo::project_repo::{ProjectRepository, RepoResult};
use chrono::{DateTime, TimeZone, Utc};
use log::info;

/// `(year, month, day, hour, minute)` in UTC.
type SeedTime = (i32, u32, u32, u32, u32);

struct SeedRecord {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    kind: ProjectType,
    status: ProjectStatus,
    created_at: SeedTime,
    updated_at: SeedTime,
    word_count: u64,
    chapter_count: u32,
    cover_color: &'static str,
    last_edited_by: Option<&'static str>,
}

const DEMO_PROJECTS: &[SeedRecord] = &[
    SeedRecord {
        id: "1",
        title: "The Art of Non-Fiction Writing",
        description: "A comprehensive guide to crafting compelling non-fiction narratives",
        kind: ProjectType::Book,
        status: ProjectStatus::Active,
        created_at: (2024, 11, 15, 10, 0),
        updated_at: (2024, 12, 7, 15, 30),
        word_count: 45_230,
        chapter_count: 12,
        cover_color: "#8B5CF6",
        last_edited_by: Some("John Doe"),
    },
    SeedRecord {
        id: "2",
        title: "Building Better Teams",
        description: "Strategies for creating high-performing workplace cultures",
        kind: ProjectType::Book,
        status: ProjectStatus::Active,
        created_at: (2024, 10, 20, 14, 0),
        updated_at: (2024, 12, 5, 9, 15),
        word_count: 32_100,
        chapter_count: 8,
        cover_color: "#3B82F6",
        last_edited_by: Some("John Doe"),
    },
    SeedRecord {
        id: "3",
        title: "The Future of Work",
        description: "How remote and hybrid work is reshaping our professional lives",
        kind: ProjectType::Whitepaper,
        status: ProjectStatus::Draft,
        created_at: (2024, 12, 1, 8, 0),
        updated_at: (2024, 12, 1, 16, 45),
        word_count: 5_800,
        chapter_count: 3,
        cover_color: "#10B981",
        last_edited_by: None,
    },
];

/// Returns the demo projects in display order.
pub fn demo_projects() -> Vec<Project> {
    DEMO_PROJECTS
        .iter()
        .map(|record| Project {
            id: record.id.to_string(),
            title: record.title.to_string(),
            description: record.description.to_string(),
            kind: record.kind,
            status: record.status,
            created_at: seed_time(record.created_at),
            updated_at: seed_time(record.updated_at),
            word_count: record.word_count,
            chapter_count: record.chapter_count,
            cover_color: record.cover_color.to_string(),
            last_edited_by: record.last_edited_by.map(str::to_string),
        })
        .collect()
}

/// Loads the demo projects into `repo` when it holds no projects.
///
/// Returns the number of inserted records (0 when the store was not empty).
pub fn seed_if_empty(repo: &mut impl ProjectRepository) -> RepoResult<usize> {
    if repo.count()? > 0 {
        return Ok(0);
    }
    let projects = demo_projects();
    for project in projects.iter().rev() {
        repo.insert_front(project)?;
    }
    info!(
        "event=seed_demo module=store status=ok inserted={}",
        projects.len()
    );
    Ok(projects.len())
}

fn seed_time((year, month, day, hour, minute): SeedTime) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("seed timestamps are valid UTC instants")
}
