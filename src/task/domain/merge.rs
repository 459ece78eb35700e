//! Reconciliation of regenerated tasks with a persisted task list.

use super::{SimilarityThreshold, Task, TaskId, TaskKey, TextSimilarity};
use mockable::Clock;
use std::collections::{HashMap, HashSet};

/// Statistics describing what a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Tasks appended because no existing task matched.
    pub added: Vec<TaskId>,
    /// Existing tasks whose content was refreshed.
    pub refreshed: Vec<TaskId>,
    /// Existing tasks matched without any content change.
    pub unchanged: usize,
    /// Every existing task matched by a regenerated task, refreshed or not.
    pub matched: Vec<TaskId>,
    /// Existing tasks not matched by any regenerated task. They are kept.
    pub orphaned: Vec<TaskId>,
}

/// Merged task list plus the report describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged tasks: existing tasks in their original order, followed by
    /// appended tasks in input order.
    pub tasks: Vec<Task>,
    /// What the merge changed.
    pub report: MergeReport,
}

/// Merges regenerated tasks into an existing list without resetting
/// operator progress.
///
/// A regenerated task matches an existing task with the same
/// [`TaskKey`]. Synthetic tasks, which have no key, match an unclaimed
/// synthetic task from the same review unit and source review whose
/// description meets `threshold`, preferring identical text. On a match the
/// content fields are refreshed while status, implementation and
/// verification state, verification history, cancellation data, and the
/// creation timestamp are kept. Unmatched regenerated tasks are appended as
/// fresh `todo` tasks; unmatched existing tasks are kept and reported as
/// orphaned.
#[must_use]
pub fn merge_tasks(
    existing: Vec<Task>,
    regenerated: Vec<Task>,
    threshold: SimilarityThreshold,
    clock: &impl Clock,
) -> MergeOutcome {
    merge_tasks_excluding(existing, regenerated, threshold, clock, &HashSet::new())
}

/// Like [`merge_tasks`], but treats the tasks in `already_claimed` as taken.
///
/// A run that merges in several steps passes the tasks it has already added
/// or matched, so a later synthetic task can neither overwrite a task
/// appended earlier in the run nor claim an existing task twice. Claimed
/// tasks are never reported as orphaned.
#[must_use]
pub fn merge_tasks_excluding(
    existing: Vec<Task>,
    regenerated: Vec<Task>,
    threshold: SimilarityThreshold,
    clock: &impl Clock,
    already_claimed: &HashSet<TaskId>,
) -> MergeOutcome {
    let existing_len = existing.len();
    let mut merged = existing;
    let mut report = MergeReport::default();
    let mut key_positions: HashMap<TaskKey, usize> = merged
        .iter()
        .enumerate()
        .filter_map(|(position, task)| task.key().map(|key| (key, position)))
        .collect();
    let mut claimed: HashSet<TaskId> = already_claimed.clone();

    for incoming in regenerated {
        let position = match incoming.key() {
            Some(key) => key_positions.get(&key).copied(),
            None => find_synthetic_match(&merged, &incoming, threshold, &claimed),
        };

        if let Some(target) = position.and_then(|pos| merged.get_mut(pos)) {
            claimed.insert(target.id());
            if !report.matched.contains(&target.id()) {
                report.matched.push(target.id());
            }
            if target.refresh_content_from(&incoming, clock) {
                if !report.refreshed.contains(&target.id()) {
                    report.refreshed.push(target.id());
                }
            } else {
                report.unchanged = report.unchanged.saturating_add(1);
            }
            continue;
        }

        let mut fresh = incoming;
        fresh.restart_lifecycle();
        if let Some(key) = fresh.key() {
            key_positions.insert(key, merged.len());
        }
        claimed.insert(fresh.id());
        report.added.push(fresh.id());
        merged.push(fresh);
    }

    report.orphaned = merged
        .iter()
        .take(existing_len)
        .filter(|task| !claimed.contains(&task.id()))
        .map(Task::id)
        .collect();

    MergeOutcome {
        tasks: merged,
        report,
    }
}

fn find_synthetic_match(
    merged: &[Task],
    incoming: &Task,
    threshold: SimilarityThreshold,
    claimed: &HashSet<TaskId>,
) -> Option<usize> {
    let candidates = || {
        merged.iter().enumerate().filter(|(_, task)| {
            task.key().is_none()
                && !claimed.contains(&task.id())
                && task.review_unit() == incoming.review_unit()
                && task.source_review_id() == incoming.source_review_id()
        })
    };
    let similarity =
        |task: &Task| TextSimilarity::between(task.description(), incoming.description());

    candidates()
        .find(|(_, task)| similarity(task).is_identical())
        .or_else(|| candidates().find(|(_, task)| similarity(task).meets(threshold)))
        .map(|(position, _)| position)
}
