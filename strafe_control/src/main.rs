//! # Strafe Control
//!
//! Runs the arm joints and swerve drive against simulated hardware.
//!
//! Startup homes the arm rotation, then optionally runs one arm routine
//! while every swerve module is commanded straight ahead at
//! `--drive-speed`. Without `--realtime` the loop runs as fast as
//! possible; with it, ticks are paced at the configured cycle time and
//! Ctrl-C stops the loop.

use clap::{Parser, ValueEnum};
use heapless::Vec;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strafe_common::config::{LogLevel, load_robot_config};
use strafe_common::consts::MAX_MODULES;
use strafe_common::robot::config::RobotConfig;
use strafe_common::robot::types::ModuleState;
use strafe_control::cycle::{CycleRunner, Periodic};
use strafe_control::hw::{Sinks, Telemetry};
use strafe_control::routine::{Routine, RoutineStatus};
use strafe_control::sim::SimRobot;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Strafe Control — swerve drive and arm control loop
#[derive(Parser, Debug)]
#[command(name = "strafe_control")]
#[command(version)]
#[command(about = "Closed-loop swerve and arm control against simulated hardware")]
struct Args {
    /// Path to the robot configuration TOML. Built-in defaults when omitted.
    config: Option<PathBuf>,

    /// Number of ticks to run (0 = until Ctrl-C).
    #[arg(long, default_value_t = 500)]
    ticks: u64,

    /// Pace ticks at the configured cycle time.
    #[arg(long)]
    realtime: bool,

    /// Arm routine to run once the rotation joint is homed.
    #[arg(long, value_enum, default_value_t = RoutineKind::None)]
    routine: RoutineKind,

    /// Straight-ahead wheel speed [m/s].
    #[arg(long, default_value_t = 1.0)]
    drive_speed: f64,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RoutineKind {
    ScoreMid,
    ScoreLow,
    Substation,
    Stow,
    None,
}

impl RoutineKind {
    fn build(self) -> Option<Routine> {
        match self {
            Self::ScoreMid => Some(Routine::score_mid()),
            Self::ScoreLow => Some(Routine::score_low()),
            Self::Substation => Some(Routine::substation()),
            Self::Stow => Some(Routine::stow()),
            Self::None => None,
        }
    }
}

fn main() {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_robot_config(path),
        None => Ok(RobotConfig::default()),
    };
    let level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("Strafe Control v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, &config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Strafe Control shutdown complete");
}

fn run(args: &Args, config: &RobotConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config OK: service={}, cycle_time={}µs, modules={}",
        config.shared.service_name,
        config.cycle_time_us,
        config.drive.modules.len(),
    );
    if !args.drive_speed.is_finite() {
        return Err(format!("--drive-speed must be finite, got {}", args.drive_speed).into());
    }

    let sinks = Sinks::tracing();
    let sim = SimRobot::from_config(config, sinks.clone())?;
    let mut runner = CycleRunner::new(config.cycle_time_us, args.realtime)?;
    let mut session = Session::new(sim, args.routine.build(), args.drive_speed, sinks.telemetry);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let max_ticks = (args.ticks > 0).then_some(args.ticks);
    info!(
        ticks = ?max_ticks,
        realtime = args.realtime,
        routine = ?args.routine,
        "entering control loop"
    );
    let executed = runner.run(&mut session, max_ticks, &running);

    session.sim.robot.stop();
    session.report(executed);

    let stats = runner.stats();
    info!(
        "Cycle stats: count={}, avg={}ns, min={}ns, max={}ns, overruns={}, max_latency={}ns",
        stats.cycle_count,
        stats.avg_cycle_ns(),
        if stats.cycle_count == 0 { 0 } else { stats.min_cycle_ns },
        stats.max_cycle_ns,
        stats.overruns,
        stats.max_latency_ns,
    );
    Ok(())
}

// ─── Session ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Homing,
    Routine,
    Idle,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Self::Homing => "homing",
            Self::Routine => "routine",
            Self::Idle => "idle",
        }
    }
}

/// Command layer plus simulated robot, ticked as one unit.
struct Session {
    sim: SimRobot,
    routine: Option<Routine>,
    phase: Phase,
    drive_states: Vec<ModuleState, MAX_MODULES>,
    telemetry: Arc<dyn Telemetry>,
}

impl Session {
    fn new(
        sim: SimRobot,
        routine: Option<Routine>,
        drive_speed: f64,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        let drive_states = (0..sim.robot.drive.len())
            .map(|_| ModuleState::new(drive_speed, 0.0))
            .collect();
        telemetry.put_string("Robot Phase", Phase::Homing.label());
        Self {
            sim,
            routine,
            phase: Phase::Homing,
            drive_states,
            telemetry,
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.telemetry.put_string("Robot Phase", phase.label());
    }

    fn report(&self, executed: u64) {
        let robot = &self.sim.robot;
        info!(
            ticks = executed,
            phase = ?self.phase,
            rotation_rad = robot.rotation.measured(),
            extension_m = robot.extension.measured(),
            heading_rad = robot.drive.heading(),
            "session finished"
        );
        for (module, position) in robot.drive.modules().iter().zip(robot.drive.positions()) {
            info!(
                module = module.name(),
                distance_m = position.distance_m,
                angle_rad = position.angle_rad,
                "module odometry"
            );
        }
        if let Some(routine) = &self.routine {
            info!(routine = routine.name(), status = ?routine.status(), "routine result");
        }
    }
}

impl Periodic for Session {
    fn name(&self) -> &str {
        "session"
    }

    fn tick(&mut self) {
        let next = match self.phase {
            Phase::Homing => {
                let rotation = &mut self.sim.robot.rotation;
                if rotation.zero_rotation() {
                    info!(rotation_rad = rotation.measured(), "arm rotation homed");
                    Some(if self.routine.is_some() {
                        Phase::Routine
                    } else {
                        Phase::Idle
                    })
                } else {
                    None
                }
            }
            Phase::Routine => self.routine.as_mut().and_then(|routine| {
                let status = routine.poll(&mut self.sim.robot);
                if let RoutineStatus::TimedOut { step } = status {
                    warn!(routine = routine.name(), step, "routine abandoned");
                }
                status.is_finished().then_some(Phase::Idle)
            }),
            Phase::Idle => None,
        };
        if let Some(phase) = next {
            self.enter(phase);
        }

        if let Err(e) = self.sim.robot.drive.set_desired_states(&self.drive_states) {
            warn!("drive command rejected: {e}");
        }
        self.sim.tick();
    }
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        configured.as_directive().parse().unwrap_or(Level::INFO)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
