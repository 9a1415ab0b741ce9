use glam::Vec2;

use crate::ecs::components::MessageKind;
use crate::geometry::{Bounds, Pose};
use crate::script::{
    flatten, Block, BlockKind, DEFAULT_MESSAGE_SECONDS, DEFAULT_SAY_MESSAGE, DEFAULT_THINK_MESSAGE,
};

/// A primitive effect produced by walking a script.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Animated position change. `to` is already clamped to the stage.
    Move { from: Vec2, to: Vec2 },
    /// Animated rotation change, in degrees, unclamped.
    Turn { from: f32, to: f32 },
    /// Show a bubble for `seconds`, then clear it.
    Speak {
        text: String,
        kind: MessageKind,
        seconds: f32,
    },
}

impl Effect {
    /// Pose once the effect has fully played out.
    pub fn end_pose(&self, pose: Pose) -> Pose {
        match self {
            Effect::Move { to, .. } => Pose {
                position: *to,
                ..pose
            },
            Effect::Turn { to, .. } => Pose {
                rotation: *to,
                ..pose
            },
            Effect::Speak { .. } => pose,
        }
    }
}

/// One level of the execution stack: a block list being replayed.
#[derive(Debug, Clone)]
struct Frame {
    blocks: Vec<Block>,
    index: usize,
    /// Passes left including the current one. Always >= 1 while on the stack.
    remaining: u32,
}

/// Resumable walk over one actor's script.
///
/// Each call to [`ScriptCursor::next_effect`] advances to the next block that
/// does something, descending into `Repeat` bodies, and returns its effect
/// computed from the pose the caller passes in. The caller folds the effect's
/// end pose back in before asking again, so the same cursor drives both the
/// animated run and the instant projection.
#[derive(Debug, Clone, Default)]
pub struct ScriptCursor {
    stack: Vec<Frame>,
}

impl ScriptCursor {
    /// Cursor over a top-level script list, with the top-level flatten rule applied.
    pub fn new(scripts: &[Block]) -> Self {
        let flat = flatten(scripts);
        let mut cursor = Self::default();
        cursor.push(flat.body, flat.repeat_count);
        cursor
    }

    /// Cursor that replays `blocks` as-is `times` times. Repeats inside are
    /// structured loops; no top-level flattening happens.
    pub fn with_body(blocks: Vec<Block>, times: u32) -> Self {
        let mut cursor = Self::default();
        cursor.push(blocks, times);
        cursor
    }

    pub fn is_finished(&self) -> bool {
        self.stack.is_empty()
    }

    fn push(&mut self, blocks: Vec<Block>, times: u32) {
        if times > 0 && has_effects(&blocks) {
            self.stack.push(Frame {
                blocks,
                index: 0,
                remaining: times,
            });
        }
    }

    /// Advance to the next effect, or `None` once the script is exhausted.
    pub fn next_effect(&mut self, pose: Pose, bounds: Bounds) -> Option<Effect> {
        loop {
            let frame = self.stack.last_mut()?;

            let Some(block) = frame.blocks.get(frame.index) else {
                frame.remaining -= 1;
                if frame.remaining == 0 {
                    self.stack.pop();
                } else {
                    frame.index = 0;
                }
                continue;
            };
            frame.index += 1;

            match &block.kind {
                BlockKind::Move => {
                    let steps = block.params.number_or_zero("steps");
                    return Some(Effect::Move {
                        from: pose.position,
                        to: pose.advanced(steps, bounds),
                    });
                }
                BlockKind::Turn => {
                    let degrees = block.params.number_or_zero("degrees");
                    return Some(Effect::Turn {
                        from: pose.rotation,
                        to: (pose.rotation + degrees).clamp(f32::MIN, f32::MAX),
                    });
                }
                BlockKind::Goto => {
                    let target = Vec2::new(
                        block.params.number_or_zero("x"),
                        block.params.number_or_zero("y"),
                    );
                    return Some(Effect::Move {
                        from: pose.position,
                        to: bounds.clamp(target),
                    });
                }
                BlockKind::Say | BlockKind::Think => {
                    let (kind, fallback) = if block.kind == BlockKind::Say {
                        (MessageKind::Say, DEFAULT_SAY_MESSAGE)
                    } else {
                        (MessageKind::Think, DEFAULT_THINK_MESSAGE)
                    };
                    return Some(Effect::Speak {
                        text: block.params.text_or("message", fallback),
                        kind,
                        seconds: block.params.seconds_or("seconds", DEFAULT_MESSAGE_SECONDS),
                    });
                }
                BlockKind::Repeat => {
                    let times = block.times();
                    let body = block.children().to_vec();
                    self.push(body, times);
                }
                BlockKind::Unknown(tag) => {
                    log::trace!("skipping unknown block kind '{tag}'");
                }
            }
        }
    }
}

/// Whether running `blocks` can ever yield an effect. Lets the cursor skip
/// loops whose bodies are empty or contain only unknown kinds.
fn has_effects(blocks: &[Block]) -> bool {
    blocks.iter().any(|b| match b.kind {
        BlockKind::Repeat => b.times() > 0 && has_effects(b.children()),
        BlockKind::Unknown(_) => false,
        _ => true,
    })
}
