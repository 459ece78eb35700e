//! When steps for batch generation BDD scenarios.

use super::world::{GenerationWorld, run_async};
use eyre::WrapErr;
use reviewtask::{
    generation::ports::NoopObserver,
    task::domain::{Task, TaskStatus},
};
use rstest_bdd_macros::when;

#[when("generation runs")]
fn generation_runs(world: &mut GenerationWorld) -> Result<(), eyre::Report> {
    let orchestrator = world.orchestrator()?;
    world.last_run = Some(run_async(orchestrator.run(
        world.unit,
        &world.comments,
        &NoopObserver,
    )));
    Ok(())
}

#[when(r#"the first task is moved to "{status}""#)]
fn move_first_task(world: &mut GenerationWorld, status: String) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let lifecycle = world.lifecycle();
    let first = run_async(lifecycle.load(world.unit))?
        .first()
        .map(Task::id)
        .ok_or_else(|| eyre::eyre!("no task has been generated"))?;
    run_async(lifecycle.update_status(world.unit, first, target))
        .wrap_err("update the first task")?;
    Ok(())
}

#[when(r#"a new comment "{body}" arrives"#)]
fn new_comment_arrives(world: &mut GenerationWorld, body: String) {
    world.push_comment(&body);
}
