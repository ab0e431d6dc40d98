use chrono::{DateTime, Duration, TimeZone, Utc};
use manuscript_core::{
    ChapterStatus, Clock, CreateChapter, CreateProject, InMemoryProjectRepository, Latency,
    LatencyConfig, LatencyProfile, ProjectService, ProjectServiceError, ProjectStatus,
    ProjectType, SequentialColorPicker, StoreConfig, StoreOperation, UpdateProject,
    COVER_PALETTE,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

/// Clock that only moves when the test says so.
#[derive(Clone)]
struct ManualClock(Rc<Cell<DateTime<Utc>>>);

impl ManualClock {
    fn starting_at(at: DateTime<Utc>) -> Self {
        Self(Rc::new(Cell::new(at)))
    }

    fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 7, 9, 0, 0).unwrap()
}

fn service_with(clock: ManualClock) -> ProjectService<InMemoryProjectRepository> {
    ProjectService::new(InMemoryProjectRepository::new())
        .with_clock(clock)
        .with_color_picker(SequentialColorPicker::default())
}

fn input(title: &str, kind: ProjectType) -> CreateProject {
    CreateProject {
        title: title.to_string(),
        description: "x".to_string(),
        kind,
    }
}

#[test]
fn create_returns_draft_with_zero_counts_and_generated_id() {
    let mut service = service_with(ManualClock::starting_at(start()));

    let created = service.create(input("Draft A", ProjectType::Book)).unwrap();
    assert_eq!(created.title, "Draft A");
    assert_eq!(created.description, "x");
    assert_eq!(created.kind, ProjectType::Book);
    assert_eq!(created.status, ProjectStatus::Draft);
    assert_eq!(created.word_count, 0);
    assert_eq!(created.chapter_count, 0);
    assert!(!created.id.is_empty());
    assert_eq!(created.created_at, start());
    assert_eq!(created.updated_at, created.created_at);
    assert!(COVER_PALETTE.contains(&created.cover_color.as_str()));
}

#[test]
fn creates_get_unique_ids_and_newest_is_listed_first() {
    // Frozen clock forces every create into the same millisecond.
    let mut service = service_with(ManualClock::starting_at(start()));
    let mut seen = HashSet::new();

    for index in 0..20 {
        let created = service
            .create(input(&format!("project {index}"), ProjectType::Article))
            .unwrap();
        assert!(seen.insert(created.id.clone()), "duplicate id {}", created.id);

        let list = service.list().unwrap();
        assert_eq!(list.items[0].id, created.id);
        assert_eq!(list.total, index + 1);
    }
}

#[test]
fn list_total_matches_records_retrievable_by_id() {
    let mut service = service_with(ManualClock::starting_at(start()));
    let a = service.create(input("A", ProjectType::Book)).unwrap();
    service.create(input("B", ProjectType::Guide)).unwrap();
    service.create(input("C", ProjectType::Other)).unwrap();
    service.delete(&a.id).unwrap();

    let list = service.list().unwrap();
    assert_eq!(list.total, list.items.len());
    let retrievable = list
        .items
        .iter()
        .filter(|project| service.get(&project.id).is_ok())
        .count();
    assert_eq!(retrievable, list.total);
}

#[test]
fn get_missing_id_is_not_found() {
    let service = service_with(ManualClock::starting_at(start()));
    let err = service.get("nope").unwrap_err();
    assert!(matches!(err, ProjectServiceError::NotFound(id) if id == "nope"));
}

#[test]
fn update_changes_only_supplied_fields_and_advances_updated_at() {
    let clock = ManualClock::starting_at(start());
    let mut service = service_with(clock.clone());
    let created = service.create(input("Original", ProjectType::Book)).unwrap();

    clock.advance(Duration::minutes(5));
    let updated = service
        .update(
            &created.id,
            UpdateProject {
                status: Some(ProjectStatus::Active),
                ..UpdateProject::default()
            },
        )
        .unwrap();

    assert_eq!(updated.status, ProjectStatus::Active);
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.kind, created.kind);
    assert_eq!(updated.cover_color, created.cover_color);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_at, start() + Duration::minutes(5));
    assert_eq!(service.get(&created.id).unwrap(), updated);
}

#[test]
fn repeated_updates_within_one_millisecond_still_move_forward() {
    let mut service = service_with(ManualClock::starting_at(start()));
    let created = service.create(input("Same tick", ProjectType::Guide)).unwrap();

    let mut previous = created.updated_at;
    for title in ["one", "two", "three"] {
        let updated = service
            .update(
                &created.id,
                UpdateProject {
                    title: Some(title.to_string()),
                    ..UpdateProject::default()
                },
            )
            .unwrap();
        assert!(updated.updated_at > previous);
        previous = updated.updated_at;
    }
}

#[test]
fn update_nonexistent_id_is_not_found() {
    let mut service = service_with(ManualClock::starting_at(start()));
    let err = service
        .update(
            "zzz",
            UpdateProject {
                title: Some("ghost".to_string()),
                ..UpdateProject::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ProjectServiceError::NotFound(id) if id == "zzz"));
}

#[test]
fn delete_missing_id_leaves_collection_unchanged() {
    let mut service = service_with(ManualClock::starting_at(start()));
    service.create(input("Keep", ProjectType::Book)).unwrap();
    let before = service.list().unwrap();

    let err = service.delete("missing").unwrap_err();
    assert!(matches!(err, ProjectServiceError::NotFound(_)));
    assert_eq!(service.list().unwrap(), before);
}

#[test]
fn delete_right_after_create_makes_get_not_found() {
    let mut service = service_with(ManualClock::starting_at(start()));
    let created = service.create(input("Short lived", ProjectType::Whitepaper)).unwrap();

    service.delete(&created.id).unwrap();
    assert!(matches!(
        service.get(&created.id),
        Err(ProjectServiceError::NotFound(_))
    ));
    assert_eq!(service.list().unwrap().total, 0);
}

#[test]
fn separate_services_do_not_share_state() {
    let mut first = service_with(ManualClock::starting_at(start()));
    let second = service_with(ManualClock::starting_at(start()));

    first.create(input("Only here", ProjectType::Book)).unwrap();
    assert_eq!(first.list().unwrap().total, 1);
    assert_eq!(second.list().unwrap().total, 0);
}

fn chapter_input(title: &str, content: &str, order: i64) -> CreateChapter {
    CreateChapter {
        title: title.to_string(),
        content: content.to_string(),
        order,
        status: ChapterStatus::Draft,
    }
}

#[test]
fn creating_chapters_accumulates_project_counts() {
    let clock = ManualClock::starting_at(start());
    let mut service = service_with(clock.clone());
    let project = service.create(input("Counted", ProjectType::Book)).unwrap();

    clock.advance(Duration::minutes(1));
    let first = service
        .create_chapter(&project.id, chapter_input("One", "alpha beta gamma", 2))
        .unwrap();
    let second = service
        .create_chapter(&project.id, chapter_input("Two", "delta", 1))
        .unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.project_id, project.id);
    assert_eq!(first.word_count, 3);

    let stored = service.get(&project.id).unwrap();
    assert_eq!(stored.chapter_count, 2);
    assert_eq!(stored.word_count, 4);
    assert!(stored.updated_at > project.updated_at);
    assert_eq!(stored.created_at, project.created_at);

    let chapters = service.list_chapters(&project.id).unwrap();
    let ids: Vec<_> = chapters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);
}

#[test]
fn chapter_operations_on_missing_project_are_not_found() {
    let mut service = service_with(ManualClock::starting_at(start()));

    let err = service.list_chapters("zzz").unwrap_err();
    assert!(matches!(err, ProjectServiceError::NotFound(id) if id == "zzz"));

    let err = service
        .create_chapter("zzz", chapter_input("Orphan", "", 0))
        .unwrap_err();
    assert!(matches!(err, ProjectServiceError::NotFound(id) if id == "zzz"));
}

#[test]
fn deleting_project_drops_its_chapters() {
    let mut service = service_with(ManualClock::starting_at(start()));
    let project = service.create(input("Gone", ProjectType::Guide)).unwrap();
    service
        .create_chapter(&project.id, chapter_input("Only", "text", 0))
        .unwrap();

    service.delete(&project.id).unwrap();
    assert!(matches!(
        service.list_chapters(&project.id),
        Err(ProjectServiceError::NotFound(_))
    ));
}

/// Shared journal of latency pauses and clock reads, in call order.
#[derive(Clone, Default)]
struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    fn pauses(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry != "now")
            .collect()
    }
}

struct RecordingLatency(Journal);

impl Latency for RecordingLatency {
    fn pause(&self, operation: StoreOperation) {
        self.0.push(operation.to_string());
    }
}

struct JournalClock(Journal);

impl Clock for JournalClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.push("now");
        start()
    }
}

#[test]
fn every_operation_pauses_once_including_failures() {
    let journal = Journal::default();
    let mut service = ProjectService::new(InMemoryProjectRepository::new())
        .with_latency(RecordingLatency(journal.clone()));

    let created = service.create(input("Timed", ProjectType::Book)).unwrap();
    service.list().unwrap();
    service.get(&created.id).unwrap();
    service.update(&created.id, UpdateProject::default()).unwrap();
    service
        .create_chapter(&created.id, chapter_input("One", "x", 0))
        .unwrap();
    service.list_chapters(&created.id).unwrap();
    service.delete(&created.id).unwrap();
    assert!(service.get(&created.id).is_err());
    assert!(service.delete(&created.id).is_err());

    assert_eq!(
        journal.pauses(),
        [
            "create",
            "list",
            "get",
            "update",
            "create_chapter",
            "list_chapters",
            "delete",
            "get",
            "delete",
        ]
    );
}

#[test]
fn latency_runs_before_the_write_reads_the_clock() {
    let journal = Journal::default();
    let mut service = ProjectService::new(InMemoryProjectRepository::new())
        .with_clock(JournalClock(journal.clone()))
        .with_latency(RecordingLatency(journal.clone()));

    let created = service.create(input("Ordered", ProjectType::Article)).unwrap();
    service.update(&created.id, UpdateProject::default()).unwrap();

    assert_eq!(journal.entries(), ["create", "now", "update", "now"]);
}

#[test]
fn enabled_latency_from_config_delays_each_call() {
    let config = StoreConfig {
        latency: LatencyConfig {
            enabled: true,
            profile: LatencyProfile {
                list_ms: 20,
                get_ms: 20,
                create_ms: 20,
                update_ms: 20,
                delete_ms: 20,
            },
        },
        ..StoreConfig::default()
    };
    let mut service = ProjectService::from_config(InMemoryProjectRepository::new(), &config);

    let started_at = Instant::now();
    let created = service.create(input("Slow", ProjectType::Book)).unwrap();
    assert!(started_at.elapsed() >= std::time::Duration::from_millis(20));

    let started_at = Instant::now();
    assert!(service.get("missing").is_err());
    assert!(started_at.elapsed() >= std::time::Duration::from_millis(20));

    let started_at = Instant::now();
    service.get(&created.id).unwrap();
    assert!(started_at.elapsed() >= std::time::Duration::from_millis(20));
}
