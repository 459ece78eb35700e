//! Then steps for batch generation BDD scenarios.

use super::world::{GenerationWorld, run_async};
use reviewtask::{
    generation::{domain::RunStatus, ports::CheckpointStore},
    task::domain::TaskStatus,
};
use rstest_bdd_macros::then;

#[then("the run stops with {remaining:usize} comments left from batch {next_batch:usize}")]
fn run_stops_early(
    world: &GenerationWorld,
    remaining: usize,
    next_batch: usize,
) -> Result<(), eyre::Report> {
    let expected = RunStatus::MoreRemaining {
        next_batch,
        remaining_comments: remaining,
    };
    let report = world.last_report()?;
    if report.status != expected {
        return Err(eyre::eyre!(
            "expected {expected:?}, found {:?}",
            report.status
        ));
    }
    Ok(())
}

#[then("the run completes after starting at batch {start:usize}")]
fn run_completes(world: &GenerationWorld, start: usize) -> Result<(), eyre::Report> {
    let report = world.last_report()?;
    if report.status != RunStatus::Completed {
        return Err(eyre::eyre!("expected completion, found {:?}", report.status));
    }
    if report.started_at_batch != start {
        return Err(eyre::eyre!(
            "expected start at batch {start}, found {}",
            report.started_at_batch
        ));
    }
    Ok(())
}

#[then("the run started at batch {start:usize}")]
fn run_started_at(world: &GenerationWorld, start: usize) -> Result<(), eyre::Report> {
    let report = world.last_report()?;
    if report.started_at_batch != start {
        return Err(eyre::eyre!(
            "expected start at batch {start}, found {}",
            report.started_at_batch
        ));
    }
    Ok(())
}

#[then("{count:usize} tasks are stored")]
fn tasks_stored(world: &GenerationWorld, count: usize) -> Result<(), eyre::Report> {
    let stored = run_async(world.lifecycle().load(world.unit))?;
    if stored.len() != count {
        return Err(eyre::eyre!(
            "expected {count} stored tasks, found {}",
            stored.len()
        ));
    }
    Ok(())
}

#[then("no checkpoint remains")]
fn no_checkpoint(world: &GenerationWorld) -> Result<(), eyre::Report> {
    if run_async(world.checkpoints.load(world.unit))?.is_some() {
        return Err(eyre::eyre!("checkpoint still present after completion"));
    }
    Ok(())
}

#[then(r#"the first task has status "{status}""#)]
fn first_task_status(world: &GenerationWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let stored = run_async(world.lifecycle().load(world.unit))?;
    let first = stored
        .first()
        .ok_or_else(|| eyre::eyre!("no task has been generated"))?;
    if first.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            first.status()
        ));
    }
    Ok(())
}
