//! Arcane Rooms - headless driver
//!
//! Runs one seeded run in idle mode through the fixed-step accumulator and
//! prints the final snapshot as JSON.
//!
//! Usage: `arcane-rooms [--seed N] [--config path.json] [--frames N]`

use arcane_rooms::consts::*;
use arcane_rooms::sim::{GameState, SimPhase, TickInput, tick};
use arcane_rooms::{SimConfig, SimEvent, Snapshot};

/// Simulated display refresh (deliberately not a multiple of the sim rate)
const FRAME_DT: f32 = 1.0 / 50.0;
const DEFAULT_FRAMES: u32 = 50 * 60 * 10;

/// Game instance holding the run and the fixed-step accumulator
struct Game {
    state: GameState,
    accumulator: f32,
    input: TickInput,
    events: Vec<SimEvent>,
}

impl Game {
    fn new(seed: u64, config: SimConfig) -> Self {
        Self {
            state: GameState::with_config(seed, config),
            accumulator: 0.0,
            input: TickInput {
                idle_mode: true,
                ..Default::default()
            },
            events: Vec::new(),
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.pause = false;
            self.input.cast = false;
            self.input.select_slot = None;
        }

        for event in self.state.drain_events() {
            log::debug!("[{}] {:?}", event.cue(), event);
            self.events.push(event);
        }
    }

    fn finished(&self) -> bool {
        matches!(self.state.phase, SimPhase::Over | SimPhase::Victory)
    }
}

struct Args {
    seed: u64,
    config: Option<String>,
    frames: u32,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        seed: 0x5eed,
        config: None,
        frames: DEFAULT_FRAMES,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value = || iter.next().ok_or_else(|| format!("missing value for {flag}"));
        match flag.as_str() {
            "--seed" => {
                let raw = value()?;
                args.seed = raw.parse().map_err(|_| format!("invalid seed: {raw}"))?;
            }
            "--config" => args.config = Some(value()?),
            "--frames" => {
                let raw = value()?;
                args.frames = raw.parse().map_err(|_| format!("invalid frame count: {raw}"))?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn main() {
    env_logger::init();
    log::info!("Arcane Rooms (headless) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            log::error!("{err}");
            eprintln!("usage: arcane-rooms [--seed N] [--config path.json] [--frames N]");
            std::process::exit(2);
        }
    };

    let config = match &args.config {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("Failed to load {path}: {err}");
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };

    let mut game = Game::new(args.seed, config);
    log::info!("Game initialized with seed: {}", args.seed);

    let mut frames = 0;
    while frames < args.frames && !game.finished() {
        game.update(FRAME_DT);
        frames += 1;
    }

    let state = &game.state;
    log::info!(
        "Run ended after {} ticks: {:?} in room {} ({} kills, {} events)",
        state.time_ticks,
        state.phase,
        state.room,
        state.stats.kills,
        game.events.len()
    );
    println!("{}", Snapshot::capture(state).to_json());
}
