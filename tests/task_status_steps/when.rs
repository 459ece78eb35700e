//! When steps for task status BDD scenarios.

use super::world::{TaskStatusWorld, run_async};
use eyre::WrapErr;
use reviewtask::task::domain::TaskStatus;
use rstest_bdd_macros::when;

#[when(r#"task {position:usize} is moved to "{status}""#)]
fn move_task(
    world: &mut TaskStatusWorld,
    position: usize,
    status: String,
) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let id = world.task_id(position)?;
    world.last_update = Some(run_async(
        world.lifecycle().update_status(world.unit, id, target),
    ));
    Ok(())
}

#[when(r#"task {position:usize} is cancelled with reason "{reason}""#)]
fn cancel_task(
    world: &mut TaskStatusWorld,
    position: usize,
    reason: String,
) -> Result<(), eyre::Report> {
    let id = world.task_id(position)?;
    let outcome = run_async(world.cancellation().cancel(world.unit, id, &reason))
        .wrap_err("cancel task")?;
    world.last_update = Some(Ok(outcome.task));
    Ok(())
}

#[when("the review host accepts replies again")]
fn host_accepts_replies(world: &mut TaskStatusWorld) -> Result<(), eyre::Report> {
    world
        .host
        .fail_replies(false)
        .wrap_err("make the review host accept replies")?;
    Ok(())
}

#[when("pending cancellation replies are retried")]
fn retry_replies(world: &mut TaskStatusWorld) -> Result<(), eyre::Report> {
    run_async(world.cancellation().retry_pending_notifications(world.unit))
        .wrap_err("retry pending cancellation replies")?;
    Ok(())
}
