//! In-memory integration tests for task lifecycle operations.

use std::sync::Arc;

use super::helpers::{Workspace, batching, review_comment, unit, workspace};
use reviewtask::{
    generation::ports::NoopObserver,
    review::domain::{CommentId, ReviewUnit},
    task::{
        domain::{Task, TaskDomainError, TaskStatus},
        ports::SideEffectOutcome,
        services::{RemoteNotification, ResolveThreadOnCompletion, TaskCancellationService},
    },
};
use rstest::rstest;

/// Generates one task per comment and returns them in store order.
async fn generate(
    workspace: &Workspace,
    unit: ReviewUnit,
    bodies: &[&str],
) -> Result<Vec<Task>, eyre::Report> {
    let comments: Vec<_> = bodies
        .iter()
        .zip(1_u64..)
        .map(|(body, id)| review_comment(id, body))
        .collect();
    workspace.host.set_comments(unit, comments.clone())?;
    workspace
        .orchestrator(batching(10, 0))
        .run(unit, &comments, &NoopObserver)
        .await?;
    Ok(workspace.lifecycle().load(unit).await?)
}

fn nth(tasks: &[Task], index: usize) -> Result<&Task, eyre::Report> {
    tasks
        .get(index)
        .ok_or_else(|| eyre::eyre!("expected a task at position {index}"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_moves_through_its_lifecycle(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    let tasks = generate(&workspace, unit, &["Validate the header length"]).await?;
    let id = nth(&tasks, 0)?.id();
    let lifecycle = workspace.lifecycle();

    for status in [
        TaskStatus::Doing,
        TaskStatus::Pending,
        TaskStatus::Doing,
        TaskStatus::Done,
        TaskStatus::Todo,
    ] {
        let updated = lifecycle.update_status(unit, id, status).await?;
        eyre::ensure!(updated.status() == status, "expected {status}");
    }

    let summary = lifecycle.summary(unit).await?;
    eyre::ensure!(summary.todo == 1 && summary.total() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn todo_task_cannot_skip_straight_to_done(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    let tasks = generate(&workspace, unit, &["Validate the header length"]).await?;
    let id = nth(&tasks, 0)?.id();

    let err = workspace
        .lifecycle()
        .update_status(unit, id, TaskStatus::Done)
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("todo -> done must be rejected"))?;

    eyre::ensure!(matches!(
        err,
        reviewtask::task::services::TaskLifecycleError::Domain(
            TaskDomainError::InvalidStatusTransition {
                from: TaskStatus::Todo,
                to: TaskStatus::Done,
                ..
            }
        )
    ));
    let stored = workspace.lifecycle().find(unit, id).await?;
    eyre::ensure!(stored.status() == TaskStatus::Todo);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_task_reply_is_posted_once(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    let tasks = generate(&workspace, unit, &["Drop the unused feature flag"]).await?;
    let id = nth(&tasks, 0)?.id();
    let cancellation =
        TaskCancellationService::new(workspace.lifecycle(), Arc::clone(&workspace.host));

    let first = cancellation.cancel(unit, id, "Flag is still used by CI").await?;
    let second = cancellation.cancel(unit, id, "Flag is still used by CI").await?;

    eyre::ensure!(first.notification == RemoteNotification::Posted);
    eyre::ensure!(second.notification == RemoteNotification::AlreadyPosted);
    let replies = workspace.host.posted_replies()?;
    eyre::ensure!(replies.len() == 1, "expected one reply, got {}", replies.len());
    let reply = replies
        .first()
        .ok_or_else(|| eyre::eyre!("missing reply"))?;
    eyre::ensure!(reply.comment_id == CommentId::new(1));
    eyre::ensure!(reply.body.contains("Flag is still used by CI"));
    eyre::ensure!(second.task.cancel_comment_posted());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_cancel_reply_is_delivered_on_retry(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    let tasks = generate(&workspace, unit, &["Split the giant match arm"]).await?;
    let id = nth(&tasks, 0)?.id();
    let cancellation =
        TaskCancellationService::new(workspace.lifecycle(), Arc::clone(&workspace.host));
    workspace.host.fail_replies(true)?;

    let outcome = cancellation.cancel(unit, id, "Out of scope").await?;

    eyre::ensure!(matches!(outcome.notification, RemoteNotification::Failed(_)));
    let stored = workspace.lifecycle().find(unit, id).await?;
    eyre::ensure!(stored.status() == TaskStatus::Cancel);
    eyre::ensure!(!stored.cancel_comment_posted());

    workspace.host.fail_replies(false)?;
    let retried = cancellation.retry_pending_notifications(unit).await?;

    eyre::ensure!(retried.len() == 1);
    eyre::ensure!(
        retried
            .iter()
            .all(|outcome| outcome.notification == RemoteNotification::Posted)
    );
    eyre::ensure!(workspace.lifecycle().find(unit, id).await?.cancel_comment_posted());
    eyre::ensure!(cancellation.retry_pending_notifications(unit).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn finishing_every_task_of_a_comment_resolves_its_thread(
    workspace: Workspace,
    unit: ReviewUnit,
) -> Result<(), eyre::Report> {
    workspace.analyzer.push_response(
        r#"[{"description": "Rename the helper", "source_comment_id": 1},
            {"description": "Update the call sites", "source_comment_id": 1}]"#,
    );
    let tasks = generate(&workspace, unit, &["Rename the helper and its callers"]).await?;
    eyre::ensure!(tasks.len() == 2, "expected two tasks for one comment");
    let (first, second) = (nth(&tasks, 0)?.id(), nth(&tasks, 1)?.id());
    let lifecycle = workspace.lifecycle();
    let hook = ResolveThreadOnCompletion::new(Arc::clone(&workspace.host));

    lifecycle.update_status(unit, first, TaskStatus::Doing).await?;
    let partial = lifecycle
        .update_status_with_hook(unit, first, TaskStatus::Done, &hook)
        .await?;
    eyre::ensure!(partial.side_effect == SideEffectOutcome::Skipped);
    eyre::ensure!(!workspace.host.is_thread_resolved(unit, CommentId::new(1))?);

    lifecycle.update_status(unit, second, TaskStatus::Doing).await?;
    let complete = lifecycle
        .update_status_with_hook(unit, second, TaskStatus::Done, &hook)
        .await?;

    eyre::ensure!(complete.side_effect == SideEffectOutcome::Applied);
    eyre::ensure!(workspace.host.is_thread_resolved(unit, CommentId::new(1))?);
    Ok(())
}
