use glam::Vec2;

use crate::script::Block;

/// Current top-left corner of the sprite in stage pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

/// Heading in degrees. Accumulates past 360; only display code wraps it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation(pub f32);

/// Where `reset_all` puts the sprite back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Home(pub Vec2);

/// Which bubble the sprite is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    None,
    Say,
    Think,
}

/// Speech or thought bubble. Transient: set by a Say/Think block, cleared after.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn new(text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == MessageKind::None && self.text.is_empty()
    }
}

/// Top-level script list authored for this sprite.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scripts(pub Vec<Block>);

/// Display metadata copied from the template the sprite was created from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteInfo {
    pub name: String,
    pub image: String,
    pub template: String,
}
