//! Then steps for task status BDD scenarios.

use super::world::{TaskStatusWorld, run_async};
use reviewtask::task::{
    domain::{TaskDomainError, TaskStatus},
    services::TaskLifecycleError,
};
use rstest_bdd_macros::then;

fn last_error(world: &TaskStatusWorld) -> Result<&TaskLifecycleError, eyre::Report> {
    match world.last_update.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(task)) => Err(eyre::eyre!(
            "expected the update to fail, task is now {}",
            task.status()
        )),
        None => Err(eyre::eyre!("no update was attempted")),
    }
}

#[then("the update succeeds")]
fn update_succeeds(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    match world.last_update.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("update failed: {err}")),
        None => Err(eyre::eyre!("no update was attempted")),
    }
}

#[then(r#"task {position:usize} has status "{status}""#)]
fn task_has_status(
    world: &TaskStatusWorld,
    position: usize,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let id = world.task_id(position)?;
    let task = run_async(world.lifecycle().find(world.unit, id))?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then("the update fails with an invalid status transition")]
fn update_fails_invalid_transition(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    if !matches!(
        err,
        TaskLifecycleError::Domain(TaskDomainError::InvalidStatusTransition { .. })
    ) {
        return Err(eyre::eyre!(
            "expected invalid status transition, got {err:?}"
        ));
    }
    Ok(())
}

#[then("the update fails because cancellation needs a reason")]
fn update_fails_cancel_requires_reason(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    if !matches!(
        err,
        TaskLifecycleError::Domain(TaskDomainError::CancelRequiresReason(_))
    ) {
        return Err(eyre::eyre!("expected cancel-requires-reason, got {err:?}"));
    }
    Ok(())
}

#[then("the cancellation reply has not been posted")]
fn reply_not_posted(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let replies = world.host.posted_replies()?;
    if !replies.is_empty() {
        return Err(eyre::eyre!("expected no replies, found {}", replies.len()));
    }
    let id = world.task_id(1)?;
    if run_async(world.lifecycle().find(world.unit, id))?.cancel_comment_posted() {
        return Err(eyre::eyre!("task claims its reply was posted"));
    }
    Ok(())
}

#[then("the cancellation reply has been posted")]
fn reply_posted(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let replies = world.host.posted_replies()?;
    if replies.len() != 1 {
        return Err(eyre::eyre!("expected one reply, found {}", replies.len()));
    }
    let id = world.task_id(1)?;
    if !run_async(world.lifecycle().find(world.unit, id))?.cancel_comment_posted() {
        return Err(eyre::eyre!("task does not record the posted reply"));
    }
    Ok(())
}
