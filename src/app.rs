use std::time::Duration;

use clap::Parser;
use glam::Vec2;
use instant::Instant;

use spritechoreo::{Block, ChoreographyMode, RunStart, Stage, StageConfig};

/// How often to log tick statistics (seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;
/// Give up on a run that has not finished after this long.
const MAX_RUN_SECONDS: f64 = 600.0;
/// Blocks per randomly scripted extra actor.
const EXTRA_SCRIPT_LEN: usize = 6;

#[derive(Parser, Debug)]
#[command(name = "spritechoreo")]
#[command(about = "Headless sprite stage: runs scripted actors and logs the choreography")]
struct Args {
    /// Frames per second to drive the stage at
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Choreography mode: off, predictive, proximity or combined
    #[arg(long, default_value_t = ChoreographyMode::Predictive)]
    mode: ChoreographyMode,

    /// Reset positions and run again under this mode after the first run
    #[arg(long)]
    then: Option<ChoreographyMode>,

    /// Randomly scripted actors to add next to the two crossing cats
    #[arg(long, default_value_t = 0)]
    extra: usize,

    /// Seed for the random scripts (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Stage width in pixels
    #[arg(long, default_value_t = 1000.0)]
    width: f32,

    /// Stage height in pixels
    #[arg(long, default_value_t = 550.0)]
    height: f32,
}

// ---------------------------------------------------------------------------
// Tick cost
// ---------------------------------------------------------------------------

/// Time spent inside `Stage::tick`, summarised once per log window.
struct TickCost {
    window_start: Instant,
    ticks: u32,
    spent: Duration,
    worst: Duration,
}

impl TickCost {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            ticks: 0,
            spent: Duration::ZERO,
            worst: Duration::ZERO,
        }
    }

    /// Returns true when the window closed and a line was logged.
    fn record(&mut self, now: Instant, cost: Duration) -> bool {
        self.ticks += 1;
        self.spent += cost;
        self.worst = self.worst.max(cost);

        let window = now.duration_since(self.window_start).as_secs_f64();
        if window < STATS_LOG_INTERVAL {
            return false;
        }
        log::info!(
            "{:.0} ticks/s | tick cost avg {:.3}ms, worst {:.3}ms",
            f64::from(self.ticks) / window,
            self.spent.as_secs_f64() * 1000.0 / f64::from(self.ticks),
            self.worst.as_secs_f64() * 1000.0,
        );
        *self = Self::new(now);
        true
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct App {
    stage: Stage,
    rng: fastrand::Rng,
    frame_time: Duration,
}

impl App {
    fn new(args: &Args) -> Self {
        let config = StageConfig::default()
            .with_choreography(args.mode)
            .with_stage_size(args.width, args.height);
        let rng = match args.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            stage: Stage::new(config),
            rng,
            frame_time: Duration::from_secs_f64(1.0 / f64::from(args.fps.max(1))),
        }
    }

    /// Two cats on opposite corners, each heading for the other's corner.
    fn populate_crossing_pair(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let max = self.stage.bounds().max;
        let left = self.stage.add_actor("cat")?;
        let right = self.stage.add_actor("cat")?;
        self.stage.drag_actor(left, Vec2::ZERO)?;
        self.stage.drag_actor(right, Vec2::new(max.x, 0.0))?;

        self.stage.append_block(left, Block::say("Over there!", 0.5))?;
        self.stage.append_block(left, Block::goto(max.x, max.y))?;
        self.stage.append_block(right, Block::turn(180.0))?;
        self.stage.append_block(right, Block::goto(0.0, max.y))?;
        self.stage.append_block(right, Block::think("Hmm...", 0.5))?;
        Ok(())
    }

    fn populate_extras(&mut self, count: usize) -> Result<(), Box<dyn std::error::Error>> {
        let templates: Vec<String> = self.stage.config().templates.iter().map(|t| t.id.clone()).collect();
        if templates.is_empty() {
            return Ok(());
        }
        let max = self.stage.bounds().max;
        for _ in 0..count {
            let template = &templates[self.rng.usize(..templates.len())];
            let actor = self.stage.add_actor(template)?;
            let start = Vec2::new(self.rng.f32() * max.x, self.rng.f32() * max.y);
            self.stage.drag_actor(actor, start)?;
            for block in random_script(&mut self.rng, max) {
                self.stage.append_block(actor, block)?;
            }
        }
        Ok(())
    }

    /// Drive the stage in real time until the run finishes.
    fn run_to_completion(&mut self) {
        let started = Instant::now();
        match self.stage.run_all(started) {
            RunStart::Started { actors, swaps } => {
                log::info!("running {actors} actors ({swaps} crossing swaps)");
            }
            RunStart::AlreadyRunning | RunStart::NothingToRun => return,
        }

        let mut cost = TickCost::new(started);
        while self.stage.is_running() {
            std::thread::sleep(self.frame_time);
            let now = Instant::now();
            self.stage.tick(now);
            if cost.record(now, now.elapsed()) {
                log::info!("{}", self.stage.timers().summary());
            }

            if now.duration_since(started).as_secs_f64() > MAX_RUN_SECONDS {
                log::warn!("run still going after {MAX_RUN_SECONDS}s; stopping the host loop");
                break;
            }
        }
    }

    fn log_poses(&self) {
        for actor in self.stage.actors() {
            log::info!(
                "{} {:?}: ({:.1}, {:.1}) facing {:.0} deg",
                actor.name,
                actor.id,
                actor.position.x,
                actor.position.y,
                actor.display_rotation(),
            );
        }
    }
}

fn random_script(rng: &mut fastrand::Rng, max: Vec2) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(EXTRA_SCRIPT_LEN + 1);
    if rng.bool() {
        blocks.push(Block::repeat(rng.u32(1..=3), Vec::new()));
    }
    for _ in 0..EXTRA_SCRIPT_LEN {
        let block = match rng.u8(0..4) {
            0 => Block::move_steps(rng.f32() * 200.0),
            1 => Block::turn(rng.f32() * 360.0 - 180.0),
            2 => Block::goto(rng.f32() * max.x, rng.f32() * max.y),
            _ => Block::say("!", 0.25),
        };
        blocks.push(block);
    }
    blocks
}

/// Headless entry point: build the stage, run it, report where everyone ended up.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    log::info!(
        "stage {}x{} | mode {} | {} fps | {} extra actors",
        args.width,
        args.height,
        args.mode,
        args.fps,
        args.extra
    );

    let mut app = App::new(&args);
    app.populate_crossing_pair()?;
    app.populate_extras(args.extra)?;

    app.run_to_completion();
    app.log_poses();

    if let Some(mode) = args.then {
        if !app.stage.is_running() {
            app.stage.reset_all()?;
            app.stage.set_choreography(mode);
            log::info!("replaying under mode {mode}");
            app.run_to_completion();
            app.log_poses();
        }
    }

    if app.stage.is_running() {
        return Err(format!("run did not finish within {MAX_RUN_SECONDS}s").into());
    }
    Ok(())
}
