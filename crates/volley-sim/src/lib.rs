//! Headless runner for Volley: an arcade physics world, input sources, and a
//! driver that steps the match loop against them.

pub mod driver;
pub mod script;
pub mod world;

pub use driver::{MatchRunner, MatchSummary};
pub use script::{InputSource, RandomInputs, ScriptedInputs};
pub use world::{ArcadeWorld, WorldSettings};
