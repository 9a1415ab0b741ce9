use glam::Vec2;

use crate::choreography::ProximityTracker;
use crate::config::StageConfig;
use crate::debug::timer::SystemTimers;
use crate::ecs::components::{Home, Message, Position, Rotation, Scripts, SpriteInfo};
use crate::ecs::ActorId;
use crate::error::{StageError, StageResult};
use crate::geometry::{Bounds, Pose};
use crate::mode::ChoreographyMode;
use crate::orchestrator::ActorRun;
use crate::script::{self, Block, BlockId, Params};

/// Read-only copy of one actor, as returned by [`Stage::actors`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActorView {
    pub id: ActorId,
    pub name: String,
    pub image: String,
    pub position: Vec2,
    /// Stored rotation in degrees, never wrapped.
    pub rotation: f32,
    pub message: Message,
    pub scripts: Vec<Block>,
}

impl ActorView {
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            rotation: self.rotation,
        }
    }

    /// Rotation wrapped into `[0, 360)` for display.
    pub fn display_rotation(&self) -> f32 {
        self.rotation.rem_euclid(360.0)
    }
}

/// Cross-actor script writes. Only [`Stage::apply_swap_batch`] consumes these.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SwapCmd {
    /// Install a new top-level script list (outcome of the run-start plan).
    Assign { actor: ActorId, scripts: Vec<Block> },
    /// Exchange two running actors' scripts and in-flight cursors.
    Exchange { a: ActorId, b: ActorId },
}

/// Actor registry plus run state. The single owner of every actor's data.
pub struct Stage {
    pub(crate) world: hecs::World,
    /// Creation order; the world's iteration order is not stable.
    pub(crate) order: Vec<ActorId>,
    selected: Option<ActorId>,
    pub(crate) config: StageConfig,
    pub(crate) running: bool,
    pub(crate) animating: bool,
    pub(crate) runs: Vec<ActorRun>,
    pub(crate) proximity: ProximityTracker,
    pub(crate) timers: SystemTimers,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(StageConfig::default())
    }
}

impl Stage {
    pub fn new(config: StageConfig) -> Self {
        let proximity = ProximityTracker::new(config.proximity_radius);
        Self {
            world: hecs::World::new(),
            order: Vec::new(),
            selected: None,
            config,
            running: false,
            animating: false,
            runs: Vec::new(),
            proximity,
            timers: SystemTimers::new(),
        }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.config.bounds()
    }

    pub fn timers(&self) -> &SystemTimers {
        &self.timers
    }

    /// Takes effect at the next `run_all`; a run in flight keeps its plan.
    pub fn set_choreography(&mut self, mode: ChoreographyMode) {
        log::debug!("choreography mode -> {mode}");
        self.config.choreography = mode;
    }

    // -----------------------------------------------------------------------
    // Actors
    // -----------------------------------------------------------------------

    /// Create an actor from a template at the template's home position and
    /// select it.
    pub fn add_actor(&mut self, template_id: &str) -> StageResult<ActorId> {
        let template = self
            .config
            .template(template_id)
            .ok_or_else(|| StageError::UnknownTemplate(template_id.to_owned()))?
            .clone();

        let home = self.bounds().clamp(template.home);
        let id = self.world.spawn((
            Position(home),
            Rotation(0.0),
            Home(home),
            Message::default(),
            Scripts::default(),
            SpriteInfo {
                name: template.name,
                image: template.image,
                template: template.id,
            },
        ));
        self.order.push(id);
        self.selected = Some(id);
        log::debug!("added actor {id:?} from template '{template_id}'");
        Ok(id)
    }

    /// Destroy an actor. If it was selected, selection moves to the first
    /// remaining actor.
    pub fn remove_actor(&mut self, id: ActorId) -> StageResult<()> {
        self.world.despawn(id).map_err(|_| StageError::UnknownActor(id))?;
        self.order.retain(|&a| a != id);
        self.runs.retain(|run| run.actor != id);
        if self.selected == Some(id) {
            self.selected = self.order.first().copied();
        }
        log::debug!("removed actor {id:?}");
        Ok(())
    }

    pub fn select_actor(&mut self, id: ActorId) -> StageResult<()> {
        if !self.world.contains(id) {
            return Err(StageError::UnknownActor(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Move an actor by hand. Position only; the target is clamped.
    pub fn drag_actor(&mut self, id: ActorId, position: Vec2) -> StageResult<Vec2> {
        let clamped = self.bounds().clamp(position);
        let mut pos = self
            .world
            .get::<&mut Position>(id)
            .map_err(|_| StageError::UnknownActor(id))?;
        pos.0 = clamped;
        Ok(clamped)
    }

    /// Change the stage size. Resting actors are pulled back inside; running
    /// ones are clamped on their next animation tick.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.width = width;
        self.config.height = height;
        let bounds = self.bounds();
        for (_, pos) in self.world.query_mut::<&mut Position>() {
            pos.0 = bounds.clamp(pos.0);
        }
        log::debug!("stage resized to {width}x{height}");
    }

    /// Put every actor back at its home with rotation 0 and no bubble.
    pub fn reset_all(&mut self) -> StageResult<()> {
        if self.running {
            return Err(StageError::RunInProgress);
        }
        let bounds = self.bounds();
        for (_, (pos, rot, msg, home)) in self
            .world
            .query_mut::<(&mut Position, &mut Rotation, &mut Message, &Home)>()
        {
            pos.0 = bounds.clamp(home.0);
            rot.0 = 0.0;
            *msg = Message::default();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Script editing
    // -----------------------------------------------------------------------

    fn scripts_mut(&mut self, actor: ActorId) -> StageResult<hecs::RefMut<'_, Scripts>> {
        self.world
            .get::<&mut Scripts>(actor)
            .map_err(|_| StageError::UnknownActor(actor))
    }

    pub fn append_block(&mut self, actor: ActorId, block: Block) -> StageResult<BlockId> {
        let id = block.id;
        self.scripts_mut(actor)?.0.push(block);
        Ok(id)
    }

    /// Insert at `index` in the top-level list; `index == len` appends.
    pub fn insert_block(&mut self, actor: ActorId, index: usize, block: Block) -> StageResult<BlockId> {
        let id = block.id;
        let mut scripts = self.scripts_mut(actor)?;
        let len = scripts.0.len();
        if index > len {
            return Err(StageError::IndexOutOfRange { index, len });
        }
        scripts.0.insert(index, block);
        Ok(id)
    }

    /// Append `block` to the body of the `Repeat` identified by `parent`.
    pub fn append_child(&mut self, actor: ActorId, parent: BlockId, block: Block) -> StageResult<BlockId> {
        let id = block.id;
        let mut scripts = self.scripts_mut(actor)?;
        let target = script::find_mut(&mut scripts.0, parent)
            .ok_or(StageError::UnknownBlock { actor, block: parent })?;
        if !target.is_repeat() {
            return Err(StageError::NotARepeat(parent));
        }
        target.children.push(block);
        Ok(id)
    }

    /// Remove a block from anywhere in the actor's script tree.
    pub fn remove_block(&mut self, actor: ActorId, id: BlockId) -> StageResult<Block> {
        let mut scripts = self.scripts_mut(actor)?;
        let removed = script::remove(&mut scripts.0, id);
        removed.ok_or(StageError::UnknownBlock { actor, block: id })
    }

    /// Move the top-level block at `from` so it ends up at `to`.
    pub fn reorder_blocks(&mut self, actor: ActorId, from: usize, to: usize) -> StageResult<()> {
        let mut scripts = self.scripts_mut(actor)?;
        let len = scripts.0.len();
        if from >= len {
            return Err(StageError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(StageError::IndexOutOfRange { index: to, len });
        }
        let block = scripts.0.remove(from);
        scripts.0.insert(to, block);
        Ok(())
    }

    /// Merge `partial` into a block's parameters; keys not in `partial` stay.
    pub fn update_params(&mut self, actor: ActorId, id: BlockId, partial: Params) -> StageResult<()> {
        let mut scripts = self.scripts_mut(actor)?;
        let block = script::find_mut(&mut scripts.0, id).ok_or(StageError::UnknownBlock { actor, block: id })?;
        block.params.merge(partial);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// All actors in creation order.
    pub fn actors(&self) -> Vec<ActorView> {
        self.order.iter().filter_map(|&id| self.actor(id).ok()).collect()
    }

    pub fn actor(&self, id: ActorId) -> StageResult<ActorView> {
        let mut query = self
            .world
            .query_one::<(&Position, &Rotation, &Message, &Scripts, &SpriteInfo)>(id)
            .map_err(|_| StageError::UnknownActor(id))?;
        let (pos, rot, msg, scripts, info) = query.get().ok_or(StageError::UnknownActor(id))?;
        Ok(ActorView {
            id,
            name: info.name.clone(),
            image: info.image.clone(),
            position: pos.0,
            rotation: rot.0,
            message: msg.clone(),
            scripts: scripts.0.clone(),
        })
    }

    pub fn selected(&self) -> Option<ActorId> {
        self.selected
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub(crate) fn pose_of(&self, id: ActorId) -> Option<Pose> {
        let pos = self.world.get::<&Position>(id).ok()?.0;
        let rot = self.world.get::<&Rotation>(id).ok()?.0;
        Some(Pose {
            position: pos,
            rotation: rot,
        })
    }

    // -----------------------------------------------------------------------
    // Cross-actor writes
    // -----------------------------------------------------------------------

    /// Apply a batch of script swaps. Every cross-actor script write goes
    /// through here, between per-actor animation steps. Returns the number of
    /// commands applied.
    pub(crate) fn apply_swap_batch(&mut self, batch: Vec<SwapCmd>) -> usize {
        let mut applied = 0;
        for cmd in batch {
            match cmd {
                SwapCmd::Assign { actor, scripts } => {
                    if let Ok(mut current) = self.world.get::<&mut Scripts>(actor) {
                        current.0 = scripts;
                        applied += 1;
                    }
                }
                SwapCmd::Exchange { a, b } => {
                    let scripts_a = self.world.get::<&Scripts>(a).map(|s| s.0.clone());
                    let scripts_b = self.world.get::<&Scripts>(b).map(|s| s.0.clone());
                    let (Ok(scripts_a), Ok(scripts_b)) = (scripts_a, scripts_b) else {
                        continue;
                    };
                    if let Ok(mut s) = self.world.get::<&mut Scripts>(a) {
                        s.0 = scripts_b;
                    }
                    if let Ok(mut s) = self.world.get::<&mut Scripts>(b) {
                        s.0 = scripts_a;
                    }

                    let ia = self.runs.iter().position(|r| r.actor == a);
                    let ib = self.runs.iter().position(|r| r.actor == b);
                    if let (Some(ia), Some(ib)) = (ia, ib) {
                        let cursor_a = std::mem::take(&mut self.runs[ia].cursor);
                        let cursor_b = std::mem::replace(&mut self.runs[ib].cursor, cursor_a);
                        self.runs[ia].cursor = cursor_b;
                    }
                    log::debug!("proximity swap {a:?} <-> {b:?}");
                    applied += 1;
                }
            }
        }
        applied
    }
}
