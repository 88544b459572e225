// SPDX-License-Identifier: MIT OR Apache-2.0
//! `trackreplay` - headless track log player
//!
//! Loads static and dynamic track logs, reports their contents and plays
//! them back at a fixed tick, printing every applied sample.

mod log_format;
mod printer;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use log_format::{write_log, SectionLogParser};
use printer::PrintTarget;
use std::path::{Path, PathBuf};
use trackreplay_timeline::settings::SETTINGS_FILE_NAME;
use trackreplay_timeline::source::read_log;
use trackreplay_timeline::{
    Batch, BatchKind, FsReader, NumericFormat, ReplaySettings, SkeletonSetup, Timeline,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file, defaults to `trackreplay.ron` in the working directory
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the batches, objects and tracks of one or more logs
    Info {
        /// Log holding the static scene
        #[arg(long = "static")]
        static_log: Option<PathBuf>,
        /// Log files, each loaded as a dynamic batch
        logs: Vec<PathBuf>,
    },
    /// Play logs back and print every applied sample
    Play {
        /// Log holding the static scene
        #[arg(long = "static")]
        static_log: Option<PathBuf>,
        /// Logs holding moving objects
        #[arg(long = "dynamic")]
        dynamic_logs: Vec<PathBuf>,
        /// Speed multiplier, overrides the settings file
        #[arg(long)]
        speed: Option<f32>,
        /// Seek here before playing
        #[arg(long)]
        from: Option<f32>,
        /// Play from the end towards the start
        #[arg(long)]
        reverse: bool,
    },
    /// Decode a log and write it back out with another number format
    Reencode {
        /// Input log
        log: PathBuf,
        /// Number format such as `F3` or `R`, defaults to the recording format
        #[arg(long)]
        format: Option<NumericFormat>,
        /// Output file, stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write a settings file with default values
    InitSettings,
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("trackreplay_cli=info,trackreplay_timeline=info")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings_path = cli
        .settings
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
    let load_settings = || {
        ReplaySettings::load_or_default(&settings_path)
            .with_context(|| format!("loading settings from {}", settings_path.display()))
    };

    match cli.command {
        Command::Info { static_log, logs } => {
            info(static_log.as_deref(), &logs, &load_settings()?)
        }
        Command::Play {
            static_log,
            dynamic_logs,
            speed,
            from,
            reverse,
        } => play(
            static_log.as_deref(),
            &dynamic_logs,
            speed,
            from,
            reverse,
            &load_settings()?,
        ),
        Command::Reencode {
            log,
            format,
            output,
        } => {
            let format = match format {
                Some(format) => format,
                None => load_settings()?.recording.data_format,
            };
            reencode(&log, format, output.as_deref())
        }
        Command::InitSettings => {
            ReplaySettings::default().save(&settings_path)?;
            Ok(())
        }
    }
}

fn load(
    timeline: &mut Timeline,
    kind: BatchKind,
    path: &Path,
    printer: &mut PrintTarget,
) -> anyhow::Result<()> {
    timeline
        .load_file(kind, path, &FsReader, &SectionLogParser, printer)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(())
}

fn info(
    static_log: Option<&Path>,
    logs: &[PathBuf],
    settings: &ReplaySettings,
) -> anyhow::Result<()> {
    if static_log.is_none() && logs.is_empty() {
        bail!("no logs given, pass --static or one or more log files");
    }

    let mut timeline = Timeline::with_settings(&settings.playback);
    let mut printer = PrintTarget::new();
    if let Some(path) = static_log {
        load(&mut timeline, BatchKind::Static, path, &mut printer)?;
    }
    for path in logs {
        load(&mut timeline, BatchKind::Dynamic, path, &mut printer)?;
    }

    let registry = timeline.registry();
    if let Some(batch) = registry.static_batch() {
        print_batch(batch);
    }
    for batch in registry.dynamic_batches() {
        print_batch(batch);
    }
    println!(
        "{} objects, range [{:.3}, {:.3}], {:.3}s",
        registry.object_count(),
        timeline.start_time(),
        timeline.end_time(),
        timeline.duration()
    );
    Ok(())
}

fn print_batch(batch: &Batch) {
    println!("{} batch, {} objects", batch.name, batch.object_count());
    for object in batch.objects() {
        println!("  {}", object.name);
        for track in object.tracks() {
            println!(
                "    {:<9} {:>6} samples  [{:.3}, {:.3}]",
                track.kind(),
                track.sample_count(),
                track.first_timestamp(),
                track.last_timestamp()
            );
            if let Some(setup) = track.setup() {
                for root in setup.roots() {
                    print_bone(setup, root, 3);
                }
            }
        }
    }
}

fn print_bone(setup: &SkeletonSetup, bone: usize, depth: usize) {
    println!("{:indent$}{}", "", setup.bones[bone].name, indent = depth * 2);
    for child in setup.children(bone) {
        print_bone(setup, child, depth + 1);
    }
}

fn play(
    static_log: Option<&Path>,
    dynamic_logs: &[PathBuf],
    speed: Option<f32>,
    from: Option<f32>,
    reverse: bool,
    settings: &ReplaySettings,
) -> anyhow::Result<()> {
    if static_log.is_none() && dynamic_logs.is_empty() {
        bail!("nothing to play, pass --static or --dynamic");
    }

    let tick = settings.playback.tick_interval;
    if !tick.is_finite() || tick <= 0.0 {
        bail!("tick interval must be positive, got {tick}");
    }

    let mut timeline = Timeline::with_settings(&settings.playback);
    if let Some(speed) = speed {
        timeline.set_speed(speed);
    }
    if !timeline.speed().is_finite() || timeline.speed() <= 0.0 {
        bail!("speed must be positive, got {}", timeline.speed());
    }

    let mut printer = PrintTarget::new();
    if let Some(path) = static_log {
        load(&mut timeline, BatchKind::Static, path, &mut printer)?;
    }
    for path in dynamic_logs {
        load(&mut timeline, BatchKind::Dynamic, path, &mut printer)?;
    }
    printer.drain();

    let start = match (from, reverse) {
        (Some(time), _) => time,
        (None, true) => timeline.end_time(),
        (None, false) => timeline.start_time(),
    };
    timeline.seek_to(start, &mut printer)?;
    print_frame(timeline.current_time(), &mut printer);

    if reverse {
        timeline.reverse();
    } else {
        timeline.play();
    }

    let frames = run_playback(&mut timeline, tick, &mut printer)?;
    tracing::info!(
        "Played {frames} frames, stopped at {:.3}",
        timeline.current_time()
    );
    Ok(())
}

/// Tick until the timeline pauses at a bound
///
/// Fails when a tick leaves the time unchanged, which happens once the step
/// is below the float resolution at the current time.
fn run_playback(
    timeline: &mut Timeline,
    tick: f32,
    printer: &mut PrintTarget,
) -> anyhow::Result<usize> {
    let mut frames = 0usize;
    while timeline.is_playing() {
        let before = timeline.current_time();
        timeline.tick(tick, printer);
        print_frame(timeline.current_time(), printer);
        frames += 1;
        if timeline.is_playing() && timeline.current_time() == before {
            bail!("tick of {tick}s makes no progress at time {before}");
        }
    }
    Ok(frames)
}

fn print_frame(time: f32, printer: &mut PrintTarget) {
    println!("t={time:.3}");
    for line in printer.drain() {
        println!("{line}");
    }
}

fn reencode(path: &Path, format: NumericFormat, output: Option<&Path>) -> anyhow::Result<()> {
    let parsed = read_log(&FsReader, &SectionLogParser, path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut timeline = Timeline::new();
    timeline.load_dynamic(&parsed, &mut ())?;
    let codecs = timeline.codecs();

    let mut objects = Vec::new();
    for object in timeline.registry().objects() {
        let mut tracks = IndexMap::new();
        for track in object.tracks() {
            let block = codecs.encode(track, format).with_context(|| {
                format!("encoding {} track of '{}'", track.kind(), object.name)
            })?;
            tracks.insert(track.kind().name().to_string(), block);
        }
        objects.push((object.name.clone(), tracks));
    }
    let rendered = write_log(&objects)?;

    match output {
        Some(out) => {
            std::fs::write(out, rendered)
                .with_context(|| format!("writing {}", out.display()))?;
            tracing::info!("Wrote {} objects to {}", objects.len(), out.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackreplay_timeline::{CodecRegistry, RecordedObject};

    fn timeline_with_rotation(block: &str) -> Timeline {
        let track = CodecRegistry::default().decode("Rotation", block).unwrap();
        let object = RecordedObject::new("Ball").with_track(track).unwrap();
        let mut timeline = Timeline::new();
        timeline.add_dynamic_batch(vec![object], &mut ());
        timeline
    }

    #[test]
    fn test_playback_runs_to_end() {
        let mut timeline = timeline_with_rotation("0~0,0,0,1\n1~0,0,0,1\n");
        timeline.play();

        let frames = run_playback(&mut timeline, 0.25, &mut PrintTarget::new()).unwrap();
        assert_eq!(frames, 4);
        assert_eq!(timeline.current_time(), 1.0);
        assert!(!timeline.is_playing());
    }

    #[test]
    fn test_stalled_playback_is_reported() {
        let mut timeline = timeline_with_rotation("10000000~0,0,0,1\n10001000~0,0,0,1\n");
        timeline.play();

        let result = run_playback(&mut timeline, 1.0 / 30.0, &mut PrintTarget::new());
        assert!(result.is_err());
        assert_eq!(timeline.current_time(), 10_000_000.0);
    }
}
