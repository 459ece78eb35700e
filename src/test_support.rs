//! Shared fixtures for unit tests.

use crate::review::domain::{CommentId, ReviewComment, ReviewId, ReviewUnit};
use crate::task::domain::{NewTask, Priority, Task};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::Mutex;

/// Clock that advances by a fixed step every time it is read.
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl SteppingClock {
    pub fn new(step: TimeDelta) -> Self {
        Self {
            now: Mutex::new(epoch()),
            step,
        }
    }

    pub fn frozen() -> Self {
        Self::new(TimeDelta::zero())
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let current = *now;
        *now = current + self.step;
        current
    }
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
        .single()
        .expect("valid fixed timestamp")
}

pub fn unit(number: u64) -> ReviewUnit {
    ReviewUnit::new(number).expect("non-zero review unit")
}

pub fn comment(id: u64, body: &str) -> ReviewComment {
    ReviewComment::new(CommentId::new(id), ReviewId::new(900), body)
        .with_location("src/lib.rs", Some(u32::try_from(id).unwrap_or(1)))
}

pub fn new_task(
    review_unit: ReviewUnit,
    comment_id: u64,
    task_index: u32,
    description: &str,
) -> NewTask {
    NewTask {
        review_unit,
        source_review_id: ReviewId::new(900),
        source_comment_id: CommentId::new(comment_id),
        task_index,
        description: description.to_owned(),
        origin_text: format!("origin of {description}"),
        priority: Priority::Medium,
        file_path: Some("src/lib.rs".to_owned()),
        line: Some(10),
    }
}

pub fn task(review_unit: ReviewUnit, comment_id: u64, task_index: u32, description: &str) -> Task {
    Task::new(
        new_task(review_unit, comment_id, task_index, description),
        &SteppingClock::frozen(),
    )
    .expect("valid task")
}

pub fn temp_documents() -> (tempfile::TempDir, crate::storage::DocumentStore) {
    let dir = tempfile::TempDir::new().expect("create temporary directory");
    let root = camino::Utf8Path::from_path(dir.path())
        .expect("temporary directory path is UTF-8")
        .to_owned();
    let documents = crate::storage::DocumentStore::open(&root).expect("open document store");
    (dir, documents)
}
