pub mod params;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use params::{Param, Params};

/// Message shown by a `Say` block with no text.
pub const DEFAULT_SAY_MESSAGE: &str = "Hello!";
/// Message shown by a `Think` block with no text.
pub const DEFAULT_THINK_MESSAGE: &str = "Hmm...";
/// Bubble duration when `seconds` is missing or not a number.
pub const DEFAULT_MESSAGE_SECONDS: f32 = 2.0;

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Stable block identity. Allocated from a process-wide counter, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
    pub fn fresh() -> Self {
        Self(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Block instruction kind. Unrecognised names survive as `Unknown` and run as no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Move,
    Turn,
    Goto,
    Repeat,
    Say,
    Think,
    Unknown(String),
}

impl BlockKind {
    pub fn label(&self) -> &str {
        match self {
            BlockKind::Move => "Move",
            BlockKind::Turn => "Turn",
            BlockKind::Goto => "Go to",
            BlockKind::Repeat => "Repeat",
            BlockKind::Say => "Say",
            BlockKind::Think => "Think",
            BlockKind::Unknown(tag) => tag,
        }
    }

    /// Parameters a freshly dropped palette block starts with.
    pub fn default_params(&self) -> Params {
        match self {
            BlockKind::Move => Params::new().with("steps", 0),
            BlockKind::Turn => Params::new().with("degrees", 0),
            BlockKind::Goto => Params::new().with("x", 0).with("y", 0),
            BlockKind::Repeat => Params::new().with("times", 0),
            BlockKind::Say => Params::new()
                .with("message", DEFAULT_SAY_MESSAGE)
                .with("seconds", DEFAULT_MESSAGE_SECONDS),
            BlockKind::Think => Params::new()
                .with("message", DEFAULT_THINK_MESSAGE)
                .with("seconds", DEFAULT_MESSAGE_SECONDS),
            BlockKind::Unknown(_) => Params::new(),
        }
    }
}

/// One node of a script tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub params: Params,
    /// Loop body. Only read for `Repeat`.
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(kind: BlockKind, params: Params) -> Self {
        Self {
            id: BlockId::fresh(),
            kind,
            params,
            children: Vec::new(),
        }
    }

    /// A block with the palette's default parameters.
    pub fn from_palette(kind: BlockKind) -> Self {
        let params = kind.default_params();
        Self::new(kind, params)
    }

    pub fn move_steps(steps: f32) -> Self {
        Self::new(BlockKind::Move, Params::new().with("steps", steps))
    }

    pub fn turn(degrees: f32) -> Self {
        Self::new(BlockKind::Turn, Params::new().with("degrees", degrees))
    }

    pub fn goto(x: f32, y: f32) -> Self {
        Self::new(BlockKind::Goto, Params::new().with("x", x).with("y", y))
    }

    pub fn repeat(times: u32, children: Vec<Block>) -> Self {
        let mut block = Self::new(BlockKind::Repeat, Params::new().with("times", times));
        block.children = children;
        block
    }

    pub fn say(message: &str, seconds: f32) -> Self {
        Self::new(
            BlockKind::Say,
            Params::new().with("message", message).with("seconds", seconds),
        )
    }

    pub fn think(message: &str, seconds: f32) -> Self {
        Self::new(
            BlockKind::Think,
            Params::new().with("message", message).with("seconds", seconds),
        )
    }

    /// Immediate sub-blocks; empty for anything but `Repeat`.
    pub fn children(&self) -> &[Block] {
        match self.kind {
            BlockKind::Repeat => &self.children,
            _ => &[],
        }
    }

    pub fn is_repeat(&self) -> bool {
        self.kind == BlockKind::Repeat
    }

    /// Iteration count of a `Repeat`; 0 when missing or malformed.
    pub fn times(&self) -> u32 {
        self.params.count("times")
    }
}

/// The top-level script split into its repeat count and replayed body.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    pub repeat_count: u32,
    pub body: Vec<Block>,
}

/// Split a top-level script list for execution.
///
/// The first top-level `Repeat` only contributes its `times` (default 1 when
/// there is no `Repeat`); every top-level non-`Repeat` block, including those
/// after it, forms the body that is replayed `repeat_count` times. Children of
/// top-level repeats are not part of the body. Nested repeats are untouched.
pub fn flatten(top: &[Block]) -> Flattened {
    let repeat_count = top.iter().find(|b| b.is_repeat()).map_or(1, Block::times);
    let body = top.iter().filter(|b| !b.is_repeat()).cloned().collect();
    Flattened { repeat_count, body }
}

/// Find a block anywhere in `blocks` by id.
pub fn find(blocks: &[Block], id: BlockId) -> Option<&Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find(&block.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut(blocks: &mut [Block], id: BlockId) -> Option<&mut Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find_mut(&mut block.children, id) {
            return Some(found);
        }
    }
    None
}

/// Detach a block (and its subtree) from anywhere in `blocks`.
pub fn remove(blocks: &mut Vec<Block>, id: BlockId) -> Option<Block> {
    if let Some(idx) = blocks.iter().position(|b| b.id == id) {
        return Some(blocks.remove(idx));
    }
    blocks.iter_mut().find_map(|b| remove(&mut b.children, id))
}
