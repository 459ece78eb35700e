//! In-memory integration tests for batched task generation.

use std::sync::Arc;

use super::helpers::{Workspace, batching, review_comments, unit, workspace};
use reviewtask::{
    generation::{
        domain::{GenerationConfig, RunStatus},
        ports::{CheckpointStore, NoopObserver},
    },
    review::{adapters::InMemoryReviewCache, domain::ReviewUnit, services::ReviewSyncService},
    task::domain::{Task, TaskStatus},
};
use rstest::rstest;

fn comment_ids(tasks: &[Task]) -> Vec<u64> {
    tasks
        .iter()
        .map(|task| task.source_comment_id().value())
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn separate_invocations_resume_from_the_checkpoint(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    let comments = review_comments(7);

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let report = workspace
            .orchestrator(batching(3, 1))
            .run(unit, &comments, &NoopObserver)
            .await?;
        statuses.push(report.status);
    }

    eyre::ensure!(
        statuses
            == vec![
                RunStatus::MoreRemaining {
                    next_batch: 1,
                    remaining_comments: 4,
                },
                RunStatus::MoreRemaining {
                    next_batch: 2,
                    remaining_comments: 1,
                },
                RunStatus::Completed,
            ],
        "unexpected run statuses {statuses:?}"
    );
    let stored = workspace.lifecycle().load(unit).await?;
    eyre::ensure!(comment_ids(&stored) == vec![1, 2, 3, 4, 5, 6, 7]);
    eyre::ensure!(workspace.checkpoints.load(unit).await?.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn regeneration_keeps_operator_progress(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    let comments = review_comments(3);
    let orchestrator = workspace.orchestrator(batching(2, 0));
    orchestrator.run(unit, &comments, &NoopObserver).await?;
    let lifecycle = workspace.lifecycle();
    let tasks = lifecycle.load(unit).await?;
    let started = tasks
        .first()
        .map(Task::id)
        .ok_or_else(|| eyre::eyre!("no tasks generated"))?;
    let cancelled = tasks
        .get(1)
        .map(Task::id)
        .ok_or_else(|| eyre::eyre!("second task missing"))?;
    lifecycle.update_status(unit, started, TaskStatus::Doing).await?;
    lifecycle.cancel(unit, cancelled, "Handled upstream").await?;

    let rerun = orchestrator.run(unit, &comments, &NoopObserver).await?;

    eyre::ensure!(rerun.status == RunStatus::Completed);
    eyre::ensure!(rerun.tasks_added == 0);
    let stored = lifecycle.load(unit).await?;
    eyre::ensure!(stored.len() == 3);
    eyre::ensure!(lifecycle.find(unit, started).await?.status() == TaskStatus::Doing);
    let kept = lifecycle.find(unit, cancelled).await?;
    eyre::ensure!(kept.status() == TaskStatus::Cancel);
    eyre::ensure!(kept.cancel_reason() == Some("Handled upstream"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resolved_threads_are_cached_but_not_analyzed(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    let comments: Vec<_> = review_comments(4)
        .into_iter()
        .map(|comment| {
            let resolved = matches!(comment.id().value(), 2 | 4);
            comment.with_resolved(resolved)
        })
        .collect();
    workspace.host.set_comments(unit, comments)?;
    let cache = Arc::new(InMemoryReviewCache::new());
    let sync = ReviewSyncService::new(Arc::clone(&workspace.host), Arc::clone(&cache));

    let outcome = sync.refresh(unit, true).await?;
    let report = workspace
        .orchestrator(GenerationConfig {
            skip_resolved: true,
            ..batching(5, 0)
        })
        .run(unit, &outcome.pending, &NoopObserver)
        .await?;

    eyre::ensure!(outcome.fetched == 4);
    eyre::ensure!(outcome.skipped_resolved == 2);
    eyre::ensure!(report.tasks_added == 2);
    eyre::ensure!(comment_ids(&workspace.lifecycle().load(unit).await?) == vec![1, 3]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn near_duplicate_drafts_are_dropped_across_batches(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    workspace.analyzer.push_response(
        r#"[{"description": "Add a unit test for the empty input case", "source_comment_id": 1}]"#,
    );
    workspace.analyzer.push_response(
        r#"[{"description": "add a unit test for the EMPTY input case!", "source_comment_id": 2}]"#,
    );

    let report = workspace
        .orchestrator(batching(1, 0))
        .run(unit, &review_comments(2), &NoopObserver)
        .await?;

    eyre::ensure!(report.status == RunStatus::Completed);
    eyre::ensure!(report.duplicates_dropped == 1);
    eyre::ensure!(comment_ids(&workspace.lifecycle().load(unit).await?) == vec![1]);
    Ok(())
}
