//! Cue CLI
//!
//! Headless shot playback and inspection, archive packing, and a free-running
//! friction stepper for single balls.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nalgebra::{Vector2, Vector3};
use tracing_subscriber::EnvFilter;

use cue_archive::ShotArchive;
use cue_core::engine::{derive_regime, sample, BallMotionState, BallRegime, CueConfig, FrictionStepper, Table};
use cue_core::playback::{Clock, ManualClock, SystemClock, TickOutcome};
use cue_core::session::{Game, GameSession, RecordedSolver, SessionStatus};

/// Hard stop for headless playback, in frames.
const MAX_HEADLESS_FRAMES: u64 = 10_000_000;

#[derive(Parser)]
#[command(name = "cue")]
#[command(about = "Replay solved billiards shots", long_about = None)]
#[command(version = cue_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play every shot of a shot file and print where the balls end up
    Play {
        /// Shot file (.json or .cuearchive)
        #[arg(long)]
        shots: PathBuf,

        /// Playback speed factor
        #[arg(long)]
        speed: Option<f64>,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Config file (.yaml, .yml or .json); only its playback section
        /// applies, the table comes from the shot file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pace frames against the wall clock instead of simulated time
        #[arg(long, default_value = "false")]
        realtime: bool,
    },

    /// Print every ball's state at a time within one shot
    Inspect {
        #[arg(long)]
        shots: PathBuf,

        /// Zero-based shot index
        #[arg(long, default_value = "0")]
        shot: usize,

        /// Seconds into the shot
        #[arg(long)]
        time: f64,
    },

    /// Run the friction stepper on a single ball
    Step {
        #[arg(long, default_value = "0.5")]
        x: f64,
        #[arg(long, default_value = "0.5")]
        y: f64,
        #[arg(long, default_value = "0.0")]
        vx: f64,
        #[arg(long, default_value = "1.0")]
        vy: f64,
        #[arg(long, default_value = "0.0")]
        wx: f64,
        #[arg(long, default_value = "0.0")]
        wy: f64,
        #[arg(long, default_value = "0.0")]
        wz: f64,
        /// Step length (s)
        #[arg(long, default_value = "0.1")]
        dt: f64,
        /// Maximum number of steps
        #[arg(long, default_value = "100")]
        steps: usize,
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Pack a JSON shot file into a compressed archive
    Archive {
        #[arg(long)]
        shots: PathBuf,

        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { shots, speed, fps, config, realtime } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(speed) = speed {
                cfg.playback.speed_factor = speed;
            }
            if let Some(fps) = fps {
                cfg.playback.frames_per_second = fps;
            }
            cfg.validate().context("invalid playback settings")?;
            cfg.playback.auto_play = true;

            let shot_file = load_shots(&shots)?;
            let played = if realtime {
                play(&shot_file, &cfg, SystemClock::new(), |interval| {
                    thread::sleep(Duration::from_secs_f64(interval))
                })?
            } else {
                let clock = ManualClock::new();
                let handle = clock.clone();
                play(&shot_file, &cfg, clock, move |interval| handle.advance(interval))?
            };

            println!("Played {} shots in {} frames", played.shots, played.frames);
            for ball in played.table.balls() {
                println!("{:>4}  {}", ball.number.to_string(), describe(&ball.state));
            }
        }

        Commands::Inspect { shots, shot, time } => {
            let shot_file = load_shots(&shots)?;
            inspect(&shot_file, shot, time)?;
        }

        Commands::Step { x, y, vx, vy, wx, wy, wz, dt, steps, config } => {
            let cfg = load_config(config.as_deref())?;
            if !dt.is_finite() || dt <= 0.0 {
                bail!("--dt must be positive, got {}", dt);
            }
            let start = derive_regime(
                &BallMotionState {
                    position: Vector2::new(x, y),
                    velocity: Vector3::new(vx, vy, 0.0),
                    spin: Vector3::new(wx, wy, wz),
                    regime: BallRegime::Sliding,
                },
                cfg.table.ball_radius,
            );
            let stepper = FrictionStepper::new(cfg.table.friction());
            for (i, state) in stepper.run(&start, dt, steps).iter().enumerate() {
                println!("{:>5} t={:>8.3}  {}", i, i as f64 * dt, describe(state));
            }
        }

        Commands::Archive { shots, out } => {
            let shot_file = load_shots(&shots)?;
            cue_archive::save_to_path(&out, &shot_file)
                .with_context(|| format!("failed to write archive {}", out.display()))?;
            println!("Packed {} shots ({:.2}s of play) into {}", shot_file.shots.len(), shot_file.duration(), out.display());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CueConfig> {
    match path {
        Some(path) => CueConfig::load(path).with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CueConfig::default()),
    }
}

fn load_shots(path: &Path) -> Result<ShotArchive> {
    let archive = cue_archive::load_any(path).with_context(|| format!("failed to load shots from {}", path.display()))?;
    tracing::info!(
        "{}: {} balls, {} shots, created {}",
        path.display(),
        archive.initial_balls.len(),
        archive.shots.len(),
        archive.created_at_rfc3339().unwrap_or_else(|| "unknown".into())
    );
    Ok(archive)
}

struct Played {
    shots: usize,
    frames: u64,
    table: Table,
}

/// Drive a session over every shot in the file until it runs out, on the
/// table the shots were solved for. `wait` is called between frames with the
/// frame interval.
fn play<C: Clock>(shot_file: &ShotArchive, cfg: &CueConfig, clock: C, mut wait: impl FnMut(f64)) -> Result<Played> {
    let table = shot_file.to_table();
    let solver = RecordedSolver::new(shot_file.shots.iter().cloned());
    let game = Game::new(table, solver.decider());
    let mut session = GameSession::play_games(vec![game], solver, cfg, clock)?;

    let interval = cfg.playback.frame_interval();
    let mut frames = 0u64;
    while !(session.is_finished() && session.scheduler().is_idle()) {
        if session.tick() == TickOutcome::Completed {
            tracing::info!("shot {} of {} done", session.shots_played(), shot_file.shots.len());
        }
        frames += 1;
        if frames >= MAX_HEADLESS_FRAMES {
            bail!("playback did not finish within {} frames", MAX_HEADLESS_FRAMES);
        }
        wait(interval);
    }

    if session.status() != SessionStatus::Finished {
        bail!("session stopped early");
    }
    if session.shots_played() < shot_file.shots.len() {
        tracing::warn!("only {} of {} shots were played", session.shots_played(), shot_file.shots.len());
    }

    Ok(Played { shots: session.shots_played(), frames, table: session.table().clone() })
}

fn inspect(shot_file: &ShotArchive, index: usize, time: f64) -> Result<()> {
    let Some(record) = shot_file.shots.get(index) else {
        bail!("shot {} out of range ({} shots)", index, shot_file.shots.len());
    };

    // Balls start where the previous shots left them.
    let mut table = shot_file.to_table();
    for earlier in &shot_file.shots[..index] {
        table.snap_to_end(earlier);
    }

    let friction = table.friction();
    println!("Shot {} at t={:.3}s (duration {:.3}s)", index, time, record.duration);
    for ball in table.balls() {
        let state = sample(&ball.state, record.events(ball.number), time, record.duration, &friction);
        println!("{:>4}  {}", ball.number.to_string(), describe(&state));
    }
    Ok(())
}

fn describe(state: &BallMotionState) -> String {
    format!(
        "{:<13} pos=({:.4}, {:.4}) v=({:.4}, {:.4}) w=({:.3}, {:.3}, {:.3})",
        state.regime.to_string(),
        state.position.x,
        state.position.y,
        state.velocity.x,
        state.velocity.y,
        state.spin.x,
        state.spin.y,
        state.spin.z
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cue_core::engine::{BallNumber, BallPlacement, BallTimeline, MotionEvent, TableConfig};
    use cue_core::{ShotParams, ShotRecord};

    fn wide_table_archive() -> ShotArchive {
        let config = TableConfig { width: 1.27, length: 2.54, ball_radius: 0.03, ..Default::default() };
        let table = Table::from_positions(
            config,
            &[BallPlacement::new(BallNumber::CUE, Vector2::new(0.6, 0.5), BallRegime::Stationary)],
        );
        let shot = ShotRecord::new(
            ShotParams::new(1.0, 0.0, 0.0, 11.0, 270.0),
            0.5,
            vec![BallTimeline::new(
                BallNumber::CUE,
                vec![
                    MotionEvent::new(0.0, Vector2::new(0.6, 0.5), BallRegime::Rolling),
                    MotionEvent::new(0.4, Vector2::new(0.6, 0.9), BallRegime::Stationary),
                ],
            )],
        );
        ShotArchive::new(&table, vec![shot])
    }

    #[test]
    fn test_play_uses_archived_table() {
        let shot_file = wide_table_archive();
        let mut cfg = CueConfig::default();
        cfg.playback.auto_play = true;
        assert_ne!(cfg.table, shot_file.table);

        let clock = ManualClock::new();
        let handle = clock.clone();
        let played = play(&shot_file, &cfg, clock, move |interval| handle.advance(interval)).unwrap();

        assert_eq!(played.shots, 1);
        assert_eq!(*played.table.config(), shot_file.table);
        let cue = played.table.ball(BallNumber::CUE).unwrap();
        assert_eq!(cue.radius, 0.03);
        assert_eq!(cue.state.position, Vector2::new(0.6, 0.9));
    }
}
