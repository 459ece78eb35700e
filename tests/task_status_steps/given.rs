//! Given steps for task status BDD scenarios.

use std::sync::Arc;

use super::world::{TaskStatusWorld, run_async};
use eyre::WrapErr;
use mockable::DefaultClock;
use reviewtask::{
    generation::{
        adapters::{InMemoryCheckpointStore, ScriptedTaskAnalyzer},
        domain::{AnalysisOptions, GenerationConfig},
        ports::NoopObserver,
        services::GenerationOrchestrator,
    },
    review::domain::{CommentId, ReviewComment, ReviewId},
};
use rstest_bdd_macros::given;

#[given(r#"a review with comment {id:u64} "{body}""#)]
fn review_with_comment(
    world: &mut TaskStatusWorld,
    id: u64,
    body: String,
) -> Result<(), eyre::Report> {
    world.comments.push(
        ReviewComment::new(CommentId::new(id), ReviewId::new(5), body)
            .with_location("src/decoder.rs", Some(40)),
    );
    world
        .host
        .set_comments(world.unit, world.comments.clone())
        .wrap_err("publish comments on the review host")?;
    Ok(())
}

#[given("tasks have been generated for the review")]
fn tasks_generated(world: &mut TaskStatusWorld) -> Result<(), eyre::Report> {
    let orchestrator = GenerationOrchestrator::new(
        Arc::new(ScriptedTaskAnalyzer::echo()),
        world.lifecycle(),
        Arc::new(InMemoryCheckpointStore::new()),
        Arc::new(DefaultClock),
        GenerationConfig {
            max_timeout_secs: 0,
            ..GenerationConfig::default()
        },
        AnalysisOptions::default(),
    )
    .wrap_err("build generation orchestrator")?;
    run_async(orchestrator.run(world.unit, &world.comments, &NoopObserver))
        .wrap_err("generate tasks for the review")?;
    Ok(())
}

#[given("the review host rejects replies")]
fn host_rejects_replies(world: &mut TaskStatusWorld) -> Result<(), eyre::Report> {
    world
        .host
        .fail_replies(true)
        .wrap_err("make the review host reject replies")?;
    Ok(())
}
