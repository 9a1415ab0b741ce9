use std::time::Duration;

use instant::Instant;

use crate::animation::{Progress, Tween, Wait};
use crate::choreography::{resolve, SwapPlan};
use crate::debug::timer::SystemPhase;
use crate::ecs::components::{Message, Position, Rotation, Scripts};
use crate::ecs::ActorId;
use crate::geometry::{Bounds, Pose, Segment};
use crate::interpreter::{Effect, ScriptCursor};
use crate::projector::project;
use crate::script::Block;
use crate::stage::{Stage, SwapCmd};

/// Outcome of [`Stage::run_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStart {
    /// A run began with `actors` scripted actors and `swaps` crossing swaps.
    Started { actors: usize, swaps: usize },
    /// A run was already in progress; the request was ignored.
    AlreadyRunning,
    /// No actor has a script; nothing was started.
    NothingToRun,
}

/// The one effect an actor is currently suspended on.
#[derive(Debug, Clone)]
enum Active {
    Tween(Tween),
    Speak(Wait),
}

/// Per-actor run state: where the script is and what is playing.
#[derive(Debug, Clone)]
pub(crate) struct ActorRun {
    pub actor: ActorId,
    /// Pose once the active effect completes; the interpreter reads from here.
    pub pose: Pose,
    pub cursor: ScriptCursor,
    active: Option<Active>,
}

impl ActorRun {
    fn new(actor: ActorId, pose: Pose, cursor: ScriptCursor) -> Self {
        Self {
            actor,
            pose,
            cursor,
            active: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.active.is_none() && self.cursor.is_finished()
    }
}

/// Timing knobs the step loop needs, copied out of the config once per tick.
#[derive(Debug, Clone, Copy)]
struct StepParams {
    bounds: Bounds,
    move_duration: Duration,
    turn_duration: Duration,
    budget: usize,
}

/// An actor that takes part in a run, captured before anything moves.
struct Participant {
    actor: ActorId,
    pose: Pose,
    scripts: Vec<Block>,
}

impl Stage {
    /// Start animating every actor's script.
    ///
    /// Projects each scripted actor's end pose, swaps the scripts of actors
    /// whose paths would cross (when predictive choreography is on) and
    /// launches one run per actor. Does nothing while a run is in progress.
    pub fn run_all(&mut self, now: Instant) -> RunStart {
        if self.running {
            log::debug!("run_all ignored: a run is already in progress");
            return RunStart::AlreadyRunning;
        }

        self.timers.begin();
        let bounds = self.bounds();
        let participants: Vec<Participant> = self
            .order
            .iter()
            .filter_map(|&actor| {
                let scripts = self.world.get::<&Scripts>(actor).ok()?.0.clone();
                if scripts.is_empty() {
                    return None;
                }
                let pose = self.pose_of(actor)?;
                Some(Participant { actor, pose, scripts })
            })
            .collect();

        if participants.is_empty() {
            log::debug!("run_all: no scripted actors");
            return RunStart::NothingToRun;
        }

        let mut destinations: Vec<Pose> = participants
            .iter()
            .map(|p| project(&p.scripts, p.pose, bounds))
            .collect();

        let plan = if self.config.choreography.predictive() {
            let paths: Vec<Segment> = participants
                .iter()
                .zip(&destinations)
                .map(|(p, dest)| Segment::new(p.pose.position, dest.position))
                .collect();
            resolve(&paths, self.config.crossing_epsilon)
        } else {
            SwapPlan::default()
        };

        let mut scripts: Vec<Vec<Block>> = participants.iter().map(|p| p.scripts.clone()).collect();
        plan.apply(&mut scripts);
        plan.apply(&mut destinations);

        let batch: Vec<SwapCmd> = participants
            .iter()
            .zip(&scripts)
            .enumerate()
            .filter(|(idx, _)| plan.involves(*idx))
            .map(|(_, (p, s))| SwapCmd::Assign {
                actor: p.actor,
                scripts: s.clone(),
            })
            .collect();
        self.apply_swap_batch(batch);

        self.runs.clear();
        self.proximity.reset();
        for (idx, (p, s)) in participants.iter().zip(&scripts).enumerate() {
            let mut run = ActorRun::new(p.actor, p.pose, ScriptCursor::new(s));
            if plan.involves(idx) {
                // Walk straight to the swapped destination, keeping our own heading.
                let target = Pose {
                    position: destinations[idx].position,
                    rotation: p.pose.rotation,
                };
                log::debug!(
                    "actor {:?} hands off to ({:.1}, {:.1})",
                    p.actor,
                    target.position.x,
                    target.position.y
                );
                run.active = Some(Active::Tween(Tween::new(p.pose, target, self.config.move_duration)));
                run.pose = target;
            }
            self.runs.push(run);
        }

        self.running = true;
        self.animating = true;
        self.timers.end(SystemPhase::Choreography);

        let swaps = plan.pairs.len();
        log::info!("run started: {} actors, {} crossing swaps", participants.len(), swaps);
        self.tick(now);

        RunStart::Started {
            actors: participants.len(),
            swaps,
        }
    }

    /// Advance every in-flight run to `now`. Returns whether a run is still
    /// in progress afterwards.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }

        self.timers.begin();
        let params = StepParams {
            bounds: self.bounds(),
            move_duration: self.config.move_duration,
            turn_duration: self.config.turn_duration,
            budget: self.config.step_budget.max(1),
        };
        for run in &mut self.runs {
            step_run(&mut self.world, run, now, params);
        }
        self.timers.end(SystemPhase::Step);

        if self.animating && self.config.choreography.proximity() {
            self.timers.begin();
            self.proximity_pass();
            self.timers.end(SystemPhase::Proximity);
        }

        if self.runs.iter().all(ActorRun::is_finished) {
            self.runs.clear();
            self.proximity.reset();
            self.running = false;
            self.animating = false;
            log::info!("run finished");
        }
        self.running
    }

    /// Swap scripts between running actors that came close this frame.
    fn proximity_pass(&mut self) {
        let live: Vec<(ActorId, glam::Vec2)> = self
            .runs
            .iter()
            .filter(|run| !run.is_finished())
            .filter_map(|run| {
                let pos = self.world.get::<&Position>(run.actor).ok()?.0;
                Some((run.actor, pos))
            })
            .collect();

        let pairs = self.proximity.update(live);
        if pairs.is_empty() {
            return;
        }
        let batch = pairs
            .into_iter()
            .map(|(a, b)| SwapCmd::Exchange { a, b })
            .collect();
        self.apply_swap_batch(batch);
    }
}

/// Drive one actor as far as it can go at `now`: finish what is playing,
/// then start effects until one has to wait for a later frame.
fn step_run(world: &mut hecs::World, run: &mut ActorRun, now: Instant, params: StepParams) {
    let mut started = 0;
    loop {
        if let Some(active) = run.active.as_mut() {
            match step_active(world, run.actor, active, now, params.bounds) {
                Progress::Pending => return,
                Progress::Done => run.active = None,
            }
        }

        if started >= params.budget {
            log::trace!("actor {:?} hit the step budget; yielding", run.actor);
            return;
        }

        let Some(effect) = run.cursor.next_effect(run.pose, params.bounds) else {
            return;
        };
        started += 1;
        log::trace!("actor {:?}: {:?}", run.actor, effect);

        let from = run.pose;
        run.pose = effect.end_pose(from);
        run.active = Some(match effect {
            Effect::Move { .. } => Active::Tween(Tween::new(from, run.pose, params.move_duration)),
            Effect::Turn { .. } => Active::Tween(Tween::new(from, run.pose, params.turn_duration)),
            Effect::Speak { text, kind, seconds } => {
                if let Ok(mut msg) = world.get::<&mut Message>(run.actor) {
                    *msg = Message::new(text, kind);
                }
                Active::Speak(Wait::from_seconds(seconds))
            }
        });
    }
}

fn step_active(
    world: &mut hecs::World,
    actor: ActorId,
    active: &mut Active,
    now: Instant,
    bounds: Bounds,
) -> Progress {
    match active {
        Active::Tween(tween) => tween.step(now, bounds, |pose| {
            if let Ok(mut pos) = world.get::<&mut Position>(actor) {
                pos.0 = pose.position;
            }
            if let Ok(mut rot) = world.get::<&mut Rotation>(actor) {
                rot.0 = pose.rotation;
            }
        }),
        Active::Speak(wait) => {
            let progress = wait.step(now);
            if progress == Progress::Done {
                if let Ok(mut msg) = world.get::<&mut Message>(actor) {
                    *msg = Message::default();
                }
            }
            progress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;
    use crate::mode::ChoreographyMode;
    use approx::assert_relative_eq;
    use glam::Vec2;

    fn ms(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    fn stage(mode: ChoreographyMode) -> Stage {
        Stage::new(StageConfig::default().with_choreography(mode))
    }

    #[test]
    fn empty_stage_has_nothing_to_run() {
        let mut stage = stage(ChoreographyMode::Predictive);
        stage.add_actor("cat").unwrap();
        assert_eq!(stage.run_all(Instant::now()), RunStart::NothingToRun);
        assert!(!stage.is_running());
        assert!(!stage.is_animating());
    }

    #[test]
    fn single_move_plays_over_half_a_second() {
        let mut stage = stage(ChoreographyMode::Off);
        let cat = stage.add_actor("cat").unwrap();
        stage.append_block(cat, Block::move_steps(100.0)).unwrap();

        let t0 = Instant::now();
        assert_eq!(stage.run_all(t0), RunStart::Started { actors: 1, swaps: 0 });
        assert!(stage.is_running());

        stage.tick(ms(t0, 250));
        assert_relative_eq!(stage.actor(cat).unwrap().position.x, 50.0, epsilon = 1e-2);

        assert!(!stage.tick(ms(t0, 500)));
        assert_eq!(stage.actor(cat).unwrap().position, Vec2::new(100.0, 0.0));
        assert!(!stage.is_animating());
    }

    #[test]
    fn second_run_is_ignored() {
        let mut stage = stage(ChoreographyMode::Off);
        let cat = stage.add_actor("cat").unwrap();
        stage.append_block(cat, Block::turn(90.0)).unwrap();
        let t0 = Instant::now();
        stage.run_all(t0);
        assert_eq!(stage.run_all(ms(t0, 10)), RunStart::AlreadyRunning);
        assert_eq!(stage.runs.len(), 1);
    }

    #[test]
    fn zero_length_chain_finishes_in_one_frame() {
        let mut stage = stage(ChoreographyMode::Off);
        let cat = stage.add_actor("cat").unwrap();
        stage.append_block(cat, Block::repeat(50, vec![])).unwrap();
        stage.append_block(cat, Block::turn(0.0)).unwrap();
        stage.append_block(cat, Block::say("", 0.0)).unwrap();

        let t0 = Instant::now();
        stage.run_all(t0);
        assert!(!stage.is_running());
    }

    #[test]
    fn step_budget_spreads_work_across_frames() {
        let mut config = StageConfig::default().with_choreography(ChoreographyMode::Off);
        config.step_budget = 4;
        let mut stage = Stage::new(config);
        let cat = stage.add_actor("cat").unwrap();
        stage.append_block(cat, Block::repeat(10, vec![])).unwrap();
        stage.append_block(cat, Block::turn(0.0)).unwrap();

        let t0 = Instant::now();
        stage.run_all(t0);
        assert!(stage.is_running());
        stage.tick(t0);
        assert!(stage.is_running());
        assert!(!stage.tick(t0));
    }

    #[test]
    fn crossing_actors_trade_scripts_and_hand_off() {
        let mut stage = stage(ChoreographyMode::Predictive);
        let a = stage.add_actor("cat").unwrap();
        let b = stage.add_actor("dog").unwrap();
        stage.drag_actor(a, Vec2::new(0.0, 0.0)).unwrap();
        stage.drag_actor(b, Vec2::new(200.0, 0.0)).unwrap();
        let to_right = Block::goto(200.0, 200.0);
        let to_left = Block::goto(0.0, 200.0);
        stage.append_block(a, to_right.clone()).unwrap();
        stage.append_block(b, to_left.clone()).unwrap();

        let t0 = Instant::now();
        assert_eq!(stage.run_all(t0), RunStart::Started { actors: 2, swaps: 1 });
        assert_eq!(stage.actor(a).unwrap().scripts, vec![to_left]);
        assert_eq!(stage.actor(b).unwrap().scripts, vec![to_right]);

        // Handoff walk takes one move duration.
        stage.tick(ms(t0, 250));
        let halfway_a = stage.actor(a).unwrap().position;
        assert_relative_eq!(halfway_a.x, 0.0, epsilon = 1e-2);
        assert_relative_eq!(halfway_a.y, 100.0, epsilon = 1e-2);
        let halfway_b = stage.actor(b).unwrap().position;
        assert_relative_eq!(halfway_b.x, 200.0, epsilon = 1e-2);
        assert_relative_eq!(halfway_b.y, 100.0, epsilon = 1e-2);
        assert!(stage.is_animating());

        // Then lands each actor on the other's destination.
        stage.tick(ms(t0, 500));
        assert_eq!(stage.actor(a).unwrap().position, Vec2::new(0.0, 200.0));
        assert_eq!(stage.actor(b).unwrap().position, Vec2::new(200.0, 200.0));

        // The swapped goto is then a no-op move.
        stage.tick(ms(t0, 501));
        assert!(!stage.is_running());
    }

    #[test]
    fn turn_plays_over_three_tenths_of_a_second() {
        let mut stage = stage(ChoreographyMode::Off);
        let cat = stage.add_actor("cat").unwrap();
        stage.append_block(cat, Block::turn(90.0)).unwrap();
        let start = stage.actor(cat).unwrap().position;

        let t0 = Instant::now();
        stage.run_all(t0);
        stage.tick(ms(t0, 150));
        assert_relative_eq!(stage.actor(cat).unwrap().rotation, 45.0, epsilon = 1e-2);
        assert!(stage.is_running());

        assert!(!stage.tick(ms(t0, 300)));
        assert_eq!(stage.actor(cat).unwrap().rotation, 90.0);
        assert_eq!(stage.actor(cat).unwrap().position, start);
    }

    #[test]
    fn mode_change_applies_to_the_next_run() {
        let mut stage = stage(ChoreographyMode::Off);
        let a = stage.add_actor("cat").unwrap();
        let b = stage.add_actor("dog").unwrap();
        let place = |stage: &mut Stage| {
            stage.drag_actor(a, Vec2::new(0.0, 0.0)).unwrap();
            stage.drag_actor(b, Vec2::new(200.0, 0.0)).unwrap();
        };
        place(&mut stage);
        stage.append_block(a, Block::goto(200.0, 200.0)).unwrap();
        stage.append_block(b, Block::goto(0.0, 200.0)).unwrap();

        let t0 = Instant::now();
        assert_eq!(stage.run_all(t0), RunStart::Started { actors: 2, swaps: 0 });
        // A run in flight keeps the plan it started with.
        stage.set_choreography(ChoreographyMode::Predictive);
        stage.tick(ms(t0, 250));
        assert_relative_eq!(stage.actor(a).unwrap().position.x, 100.0, epsilon = 1e-2);
        assert!(!stage.tick(ms(t0, 500)));
        assert_eq!(stage.actor(a).unwrap().position, Vec2::new(200.0, 200.0));

        place(&mut stage);
        let t1 = ms(t0, 1000);
        assert_eq!(stage.run_all(t1), RunStart::Started { actors: 2, swaps: 1 });
    }

    #[test]
    fn speech_bubble_is_transient() {
        let mut stage = stage(ChoreographyMode::Off);
        let cat = stage.add_actor("cat").unwrap();
        stage.append_block(cat, Block::say("Hi", 1.0)).unwrap();

        assert!(stage.actor(cat).unwrap().message.is_empty());
        let t0 = Instant::now();
        stage.run_all(t0);
        assert_eq!(stage.actor(cat).unwrap().message.text, "Hi");
        stage.tick(ms(t0, 999));
        assert_eq!(stage.actor(cat).unwrap().message.text, "Hi");
        stage.tick(ms(t0, 1000));
        assert!(stage.actor(cat).unwrap().message.is_empty());
        assert!(!stage.is_running());
    }
}
