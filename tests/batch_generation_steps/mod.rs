//! Step definitions for batch generation BDD scenarios.

mod given;
mod then;
mod when;
pub mod world;
