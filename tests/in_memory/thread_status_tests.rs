//! In-memory integration tests for review thread status reconciliation.

use std::sync::Arc;

use super::helpers::{Workspace, batching, review_comments, unit, workspace};
use mockable::DefaultClock;
use reviewtask::{
    generation::ports::NoopObserver,
    review::{
        adapters::{InMemoryReviewCache, InMemoryReviewHost},
        domain::{CommentId, CommentProgress, ReviewUnit},
        services::{ReviewSyncService, ThreadStatusService},
    },
    task::{adapters::memory::InMemoryTaskStore, domain::TaskStatus},
};
use rstest::rstest;

type TestStatusService =
    ThreadStatusService<InMemoryReviewHost, InMemoryReviewCache, InMemoryTaskStore, DefaultClock>;

fn status_service(workspace: &Workspace, cache: &Arc<InMemoryReviewCache>) -> TestStatusService {
    ThreadStatusService::new(
        Arc::clone(&workspace.host),
        Arc::clone(cache),
        Arc::clone(&workspace.store),
        Arc::new(DefaultClock),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn report_tracks_progress_from_generation_to_completion(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    let comments = review_comments(3);
    workspace.host.set_comments(unit, comments)?;
    let cache = Arc::new(InMemoryReviewCache::new());
    let sync = ReviewSyncService::new(Arc::clone(&workspace.host), Arc::clone(&cache));
    let status = status_service(&workspace, &cache);

    let outcome = sync.refresh(unit, false).await?;
    let before = status.check(unit).await?;
    eyre::ensure!(before.summary().unanalyzed == 3);
    eyre::ensure!(!before.is_complete());

    let pending: Vec<_> = outcome.pending.into_iter().take(2).collect();
    workspace
        .orchestrator(batching(5, 0))
        .run(unit, &pending, &NoopObserver)
        .await?;
    let lifecycle = workspace.lifecycle();
    let first = lifecycle
        .load(unit)
        .await?
        .into_iter()
        .find(|task| task.source_comment_id() == CommentId::new(1))
        .ok_or_else(|| eyre::eyre!("task for comment 1 missing"))?;
    lifecycle.update_status(unit, first.id(), TaskStatus::Doing).await?;
    lifecycle.update_status(unit, first.id(), TaskStatus::Done).await?;

    let after = status.check(unit).await?;

    eyre::ensure!(after.progress_of(CommentId::new(1)) == Some(CommentProgress::Resolved));
    eyre::ensure!(after.progress_of(CommentId::new(2)) == Some(CommentProgress::InProgress));
    eyre::ensure!(after.progress_of(CommentId::new(3)) == Some(CommentProgress::Unanalyzed));
    eyre::ensure!(after.stale().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_removed_remotely_are_reported_stale(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    let comments = review_comments(3);
    workspace.host.set_comments(unit, comments.clone())?;
    let cache = Arc::new(InMemoryReviewCache::new());
    ReviewSyncService::new(Arc::clone(&workspace.host), Arc::clone(&cache))
        .refresh(unit, false)
        .await?;
    let remaining: Vec<_> = comments
        .into_iter()
        .filter(|comment| comment.id() != CommentId::new(2))
        .collect();
    workspace.host.set_comments(unit, remaining)?;

    let report = status_service(&workspace, &cache).check(unit).await?;

    eyre::ensure!(report.stale() == [CommentId::new(2)]);
    eyre::ensure!(report.progress_of(CommentId::new(2)).is_none());
    eyre::ensure!(report.summary().unanalyzed == 2);
    Ok(())
}
