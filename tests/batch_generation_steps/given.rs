//! Given steps for batch generation BDD scenarios.

use super::world::GenerationWorld;
use rstest_bdd_macros::given;

#[given("a review with {count:usize} comments")]
fn review_with_comments(world: &mut GenerationWorld, count: usize) -> Result<(), eyre::Report> {
    world.seed_comments(count)
}

#[given("generation uses batches of {batch_size:usize} with a limit of {max_batches:usize} batches")]
fn generation_batching(world: &mut GenerationWorld, batch_size: usize, max_batches: usize) {
    world.config.batch_size = batch_size;
    world.config.max_batches = max_batches;
}
