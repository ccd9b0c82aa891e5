//! Trace prism scenes from the command line
use clap::{Parser, ValueEnum};
use indicatif::ProgressBar;
use log::{info, LevelFilter};
use prism_sim::{
    beam::{BeamSegment, Emitter, EmitterConfig, Simulator, SimulatorConfig},
    error::{SimError, SimResult},
    materials::PrismMaterial,
    objects::{Axis, HittableList, HittableListConfig, Rect, Slab, Sphere},
    transrot::Rotate,
    utils::{gen_random, SerdeVector},
    Point, Vec3,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs, io::Write, path::PathBuf};

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "prism-sim")]
#[command(about = "Trace dispersive light beams through a prism scene")]
struct Args {
    /// Optional scene file; a built-in demo scene runs without one
    config: Option<PathBuf>,

    /// Number of frames to trace
    #[arg(short, long, default_value = "120")]
    ticks: usize,

    /// Where to write the traced segments, stdout if absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Set the logging level
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

/// Spins the whole scene a fixed step per tick
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpinConfig {
    pole: SerdeVector,
    degrees_per_tick: f64,
}

/// Top-level run config
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RunConfig {
    scene: HittableListConfig,
    emitter: EmitterConfig,
    simulator: SimulatorConfig,
    spin: Option<SpinConfig>,
}

/// A fully assembled run
struct Run {
    scene: HittableList,
    emitter: Emitter,
    simulator: Simulator,
    spin: Option<(Vec3, f64)>,
}
impl Run {
    fn from_config(config: RunConfig) -> SimResult<Self> {
        let spin = match config.spin {
            Some(spin) => {
                let pole: Vec3 = spin.pole.into();
                if pole.norm() == 0.0 {
                    return Err(SimError::config("spin pole must be non-zero"));
                }
                if !spin.degrees_per_tick.is_finite() {
                    return Err(SimError::config(format!(
                        "spin step must be finite, got {}",
                        spin.degrees_per_tick
                    )));
                }
                Some((pole, spin.degrees_per_tick))
            }
            None => None,
        };
        Ok(Self {
            scene: HittableList::from_config(config.scene)?,
            emitter: Emitter::from_config(config.emitter)?,
            simulator: Simulator::from_config(config.simulator)?,
            spin,
        })
    }

    /// A spinning glass block, a mirror wall behind it and a scatter of
    /// glass marbles
    fn demo() -> SimResult<Self> {
        let mut scene = HittableList::default();
        scene.add(Box::new(Slab::new(
            Point::new(-1.0, -1.5, -1.0),
            Point::new(1.0, 1.5, 1.0),
            Some(PrismMaterial::glass()),
        )));
        scene.add(Box::new(Rect::new(
            Axis::Z,
            -8.0,
            8.0,
            -8.0,
            8.0,
            6.0,
            Some(PrismMaterial::new(1.0, 0.0, 1.0)?),
        )));
        for _ in 0..6 {
            let center = gen_random(3, Some(-4.0), Some(4.0));
            scene.add(Box::new(Sphere::new(
                center,
                0.4,
                Some(PrismMaterial::glass()),
            )));
        }
        Ok(Self {
            scene,
            emitter: Emitter::new(Point::new(0.0, 0.0, -6.0), Vec3::new(0.0, 0.0, 1.0), 1.0)?,
            simulator: Simulator::rainbow(),
            spin: Some((Vec3::new(0.0, 1.0, 0.0), 3.0)),
        })
    }

    /// The scene as it stands at a given tick
    fn scene_at(&self, tick: usize) -> Rotate {
        let (pole, step) = self.spin.unwrap_or((Vec3::new(0.0, 1.0, 0.0), 0.0));
        Rotate::new(Box::new(self.scene.clone()), pole, step * tick as f64)
    }

    /// Trace every tick in parallel
    fn trace(&self, ticks: usize) -> Vec<(usize, Vec<BeamSegment>)> {
        let bar = ProgressBar::new(ticks as u64);
        let frames = (0..ticks)
            .into_par_iter()
            .map(|tick| {
                let frame = self.simulator.simulate(&self.emitter, &self.scene_at(tick));
                bar.inc(1);
                (tick, frame.segments())
            })
            .collect::<Vec<_>>();
        bar.finish();
        frames
    }
}

fn write_segments<W: Write>(out: &mut W, frames: &[(usize, Vec<BeamSegment>)]) -> SimResult<()> {
    writeln!(out, "tick\tr\tg\tb\tdensity\tx0\ty0\tz0\tx1\ty1\tz1")?;
    for (tick, segments) in frames {
        for s in segments {
            writeln!(
                out,
                "{}\t{:.3}\t{:.3}\t{:.3}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}",
                tick,
                s.color[0],
                s.color[1],
                s.color[2],
                s.density,
                s.start[0],
                s.start[1],
                s.start[2],
                s.end[0],
                s.end[1],
                s.end[2],
            )?;
        }
    }
    Ok(())
}

fn main() -> SimResult<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let run = match &args.config {
        Some(path) => {
            info!("loading run config from {}", path.display());
            let raw = fs::read_to_string(path)?;
            Run::from_config(serde_yaml::from_str(&raw)?)?
        }
        None => {
            info!("no config given, running the built-in demo scene");
            Run::demo()?
        }
    };

    info!("tracing {} ticks", args.ticks);
    let frames = run.trace(args.ticks);

    let total: usize = frames.iter().map(|(_, segments)| segments.len()).sum();
    match &args.output {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            write_segments(&mut file, &frames)?;
            info!("wrote {total} segments to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_segments(&mut stdout.lock(), &frames)?;
        }
    }
    Ok(())
}
