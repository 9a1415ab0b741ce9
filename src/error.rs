use thiserror::Error;

use crate::ecs::ActorId;
use crate::script::BlockId;

/// Rejected editor or command calls. Script execution itself never fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StageError {
    #[error("no actor with id {0:?}")]
    UnknownActor(ActorId),
    #[error("no sprite template named '{0}'")]
    UnknownTemplate(String),
    #[error("actor {actor:?} has no block {block}")]
    UnknownBlock { actor: ActorId, block: BlockId },
    #[error("block {0} is not a repeat and cannot hold children")]
    NotARepeat(BlockId),
    #[error("index {index} out of range for script of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("a run is in progress")]
    RunInProgress,
}

pub type StageResult<T> = Result<T, StageError>;
