use std::time::Duration;

use glam::Vec2;

use crate::animation::{MOVE_DURATION, TURN_DURATION};
use crate::geometry::{Bounds, CROSSING_EPSILON};
use crate::mode::ChoreographyMode;

/// Default stage size in pixels.
pub const DEFAULT_STAGE_WIDTH: f32 = 1000.0;
pub const DEFAULT_STAGE_HEIGHT: f32 = 550.0;
/// Sprites are square; positions are their top-left corner.
pub const DEFAULT_SPRITE_SIZE: f32 = 100.0;
/// Running actors closer than this swap scripts (proximity mode).
pub const DEFAULT_PROXIMITY_RADIUS: f32 = 80.0;
/// Effects one actor may start within a single frame before yielding.
pub const DEFAULT_STEP_BUDGET: usize = 1024;

const SCRATCH_CAT_URL: &str = "https://en.scratch-wiki.info/w/images/ScratchCat3.0.svg";

/// A sprite the user can add to the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteTemplate {
    pub id: String,
    pub name: String,
    pub image: String,
    pub home: Vec2,
}

impl SpriteTemplate {
    pub fn new(id: &str, name: &str, image: &str, home: Vec2) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            image: image.to_owned(),
            home,
        }
    }
}

/// Built-in template catalogue.
pub fn default_templates() -> Vec<SpriteTemplate> {
    vec![
        SpriteTemplate::new("cat", "Cat", SCRATCH_CAT_URL, Vec2::ZERO),
        SpriteTemplate::new("dog", "Dog", "sprites/dog.svg", Vec2::new(200.0, 0.0)),
        SpriteTemplate::new("ball", "Ball", "sprites/ball.svg", Vec2::new(400.0, 0.0)),
    ]
}

/// Stage-wide settings. Everything has a sensible default; hosts override
/// individual fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    pub width: f32,
    pub height: f32,
    pub sprite_size: f32,
    pub move_duration: Duration,
    pub turn_duration: Duration,
    pub crossing_epsilon: f32,
    pub proximity_radius: f32,
    pub step_budget: usize,
    pub choreography: ChoreographyMode,
    pub templates: Vec<SpriteTemplate>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_STAGE_WIDTH,
            height: DEFAULT_STAGE_HEIGHT,
            sprite_size: DEFAULT_SPRITE_SIZE,
            move_duration: MOVE_DURATION,
            turn_duration: TURN_DURATION,
            crossing_epsilon: CROSSING_EPSILON,
            proximity_radius: DEFAULT_PROXIMITY_RADIUS,
            step_budget: DEFAULT_STEP_BUDGET,
            choreography: ChoreographyMode::default(),
            templates: default_templates(),
        }
    }
}

impl StageConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::for_stage(self.width, self.height, self.sprite_size)
    }

    pub fn template(&self, id: &str) -> Option<&SpriteTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn with_choreography(mut self, mode: ChoreographyMode) -> Self {
        self.choreography = mode;
        self
    }

    pub fn with_stage_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}
