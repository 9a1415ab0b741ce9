//! Block-scripted sprite runtime.
//!
//! A [`Stage`] owns every actor. Editors build scripts out of [`Block`]s,
//! `run_all` animates them, and the host drives time with `tick`. Actors whose
//! paths would cross trade scripts before the run starts; optionally, actors
//! that get close during a run trade what is left of theirs.

pub mod animation;
pub mod choreography;
pub mod config;
pub mod debug;
pub mod ecs;
pub mod error;
pub mod geometry;
pub mod interpreter;
pub mod mode;
pub mod orchestrator;
pub mod projector;
pub mod script;
pub mod spatial;
pub mod stage;

pub use config::{SpriteTemplate, StageConfig};
pub use ecs::components::{Message, MessageKind};
pub use ecs::ActorId;
pub use error::{StageError, StageResult};
pub use geometry::{Bounds, Pose};
pub use mode::ChoreographyMode;
pub use orchestrator::RunStart;
pub use script::{Block, BlockId, BlockKind, Param, Params};
pub use stage::{ActorView, Stage};
