//! Injectable collaborators for the project service.
//!
//! # Responsibility
//! - Abstract time, id assignment, cover color choice and simulated latency.
//! - Provide deterministic implementations for tests.
//!
//! # Invariants
//! - `TimestampIdGenerator` never issues the same id twice.
//! - `cover_color_at` is total: any index maps into the palette.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Fixed cover palette used for new projects.
pub const COVER_PALETTE: [&str; 6] = [
    "#8B5CF6", "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#EC4899",
];

/// Maps any index onto the cover palette.
pub fn cover_color_at(index: usize) -> &'static str {
    COVER_PALETTE[index % COVER_PALETTE.len()]
}

/// Store operation kinds, used for latency profiles and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    List,
    Get,
    Create,
    Update,
    Delete,
    ListChapters,
    CreateChapter,
}

impl StoreOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::ListChapters => "list_chapters",
            Self::CreateChapter => "create_chapter",
        }
    }
}

impl Display for StoreOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to milliseconds, the precision of the wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Assigns identifiers to new projects and chapters.
pub trait IdGenerator {
    fn next_id(&mut self, created_at: DateTime<Utc>) -> String;
}

/// Epoch-millisecond ids, bumped forward on collision.
#[derive(Debug, Clone, Default)]
pub struct TimestampIdGenerator {
    last_issued: Option<i64>,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&mut self, created_at: DateTime<Utc>) -> String {
        let candidate = created_at.timestamp_millis();
        let issued = match self.last_issued {
            Some(last) if candidate <= last => last + 1,
            _ => candidate,
        };
        self.last_issued = Some(issued);
        issued.to_string()
    }
}

/// Picks the cover color for a new project.
pub trait ColorPicker {
    fn pick(&mut self) -> &'static str;
}

/// Uniformly random palette entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomColorPicker;

impl ColorPicker for RandomColorPicker {
    fn pick(&mut self) -> &'static str {
        cover_color_at(rand::rng().random_range(0..COVER_PALETTE.len()))
    }
}

/// Walks the palette in order, starting at `next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialColorPicker {
    next: usize,
}

impl SequentialColorPicker {
    pub fn starting_at(index: usize) -> Self {
        Self { next: index }
    }
}

impl ColorPicker for SequentialColorPicker {
    fn pick(&mut self) -> &'static str {
        let color = cover_color_at(self.next);
        self.next = self.next.wrapping_add(1);
        color
    }
}

/// Simulated network latency applied before each operation.
pub trait Latency {
    fn pause(&self, operation: StoreOperation);
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

impl Latency for NoLatency {
    fn pause(&self, _operation: StoreOperation) {}
}

/// Per-operation delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyProfile {
    pub list_ms: u64,
    pub get_ms: u64,
    pub create_ms: u64,
    pub update_ms: u64,
    pub delete_ms: u64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            list_ms: 300,
            get_ms: 200,
            create_ms: 400,
            update_ms: 300,
            delete_ms: 300,
        }
    }
}

impl LatencyProfile {
    /// Chapter reads and writes share the list and create delays.
    pub fn delay_for(&self, operation: StoreOperation) -> Duration {
        let millis = match operation {
            StoreOperation::List | StoreOperation::ListChapters => self.list_ms,
            StoreOperation::Get => self.get_ms,
            StoreOperation::Create | StoreOperation::CreateChapter => self.create_ms,
            StoreOperation::Update => self.update_ms,
            StoreOperation::Delete => self.delete_ms,
        };
        Duration::from_millis(millis)
    }
}

/// Blocks the calling thread for the profile's delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepLatency {
    profile: LatencyProfile,
}

impl SleepLatency {
    pub fn new(profile: LatencyProfile) -> Self {
        Self { profile }
    }
}

impl Latency for SleepLatency {
    fn pause(&self, operation: StoreOperation) {
        let delay = self.profile.delay_for(operation);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Returns the next `updated_at` for a record last touched at `previous`.
///
/// Always strictly later than `previous`, even when the clock has stalled.
pub fn advance_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + ChronoDuration::milliseconds(1)
    }
}
