//! folio3d - interactive 3D portfolio scenes
//!
//! Main executable: windowed by default, `--headless` for scripted runs.

use anyhow::Result;
use folio3d::config::{SceneConfig, Variant};
use folio3d::headless::{self, HeadlessConfig};
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting folio3d v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let config = match cli.config.as_deref() {
        Some(path) => SceneConfig::load_from_path(path),
        None => SceneConfig::load(),
    };

    if cli.headless {
        let (width, height) = cli
            .resolution
            .unwrap_or((config.window.width, config.window.height));
        let summary = headless::run(HeadlessConfig {
            scene: config,
            variant: cli.variant,
            frames: cli.frames,
            width,
            height,
            scripted_input: cli.scripted_input,
            trace: cli.trace,
            exit_when_script_finished: cli.exit_when_script_finished,
        })?;
        info!(?summary, "headless summary");
        return Ok(());
    }

    if cli.scripted_input.is_some() || cli.trace.is_some() {
        tracing::warn!("--script and --trace only apply with --headless");
    }
    folio3d::app::run(config, cli.variant, cli.resolution)
}

struct CliOptions {
    variant: Variant,
    config: Option<PathBuf>,
    headless: bool,
    frames: u64,
    scripted_input: Option<PathBuf>,
    trace: Option<PathBuf>,
    exit_when_script_finished: bool,
    resolution: Option<(u32, u32)>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            variant: Variant::default(),
            config: None,
            headless: false,
            frames: 600,
            scripted_input: None,
            trace: None,
            exit_when_script_finished: false,
            resolution: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => opts.headless = true,
                "--exit-when-script-finished" => opts.exit_when_script_finished = true,
                "--variant" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<Variant>() {
                            Ok(variant) => opts.variant = variant,
                            Err(err) => tracing::error!(%err, "--variant ignored"),
                        }
                    } else {
                        tracing::error!("--variant requires menu, room or pulse");
                    }
                }
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--frames" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<u64>() {
                            Ok(value) => opts.frames = value,
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--frames must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--frames requires an integer");
                    }
                }
                "--script" => {
                    if let Some(path) = args.next() {
                        opts.scripted_input = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--script requires a file path");
                    }
                }
                "--trace" => {
                    if let Some(path) = args.next() {
                        opts.trace = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--trace requires a file path");
                    }
                }
                "--resolution" => {
                    if let Some(raw) = args.next() {
                        match raw.split_once('x').map(|(w, h)| (w.parse::<u32>(), h.parse::<u32>())) {
                            Some((Ok(width), Ok(height))) if width > 0 && height > 0 => {
                                opts.resolution = Some((width, height));
                            }
                            _ => tracing::error!(value = %raw, "--resolution must look like 1280x720"),
                        }
                    } else {
                        tracing::error!("--resolution requires WIDTHxHEIGHT");
                    }
                }
                other => tracing::warn!(arg = other, "unknown argument ignored"),
            }
        }

        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_headless_room_run() {
        let opts = parse(&[
            "--variant",
            "room",
            "--headless",
            "--frames",
            "120",
            "--resolution",
            "800x600",
            "--trace",
            "out/trace.jsonl",
        ]);
        assert_eq!(opts.variant, Variant::Room);
        assert!(opts.headless);
        assert_eq!(opts.frames, 120);
        assert_eq!(opts.resolution, Some((800, 600)));
        assert_eq!(opts.trace, Some(PathBuf::from("out/trace.jsonl")));
    }

    #[test]
    fn bad_values_keep_defaults() {
        let opts = parse(&["--variant", "desk", "--frames", "many", "--resolution", "0x10"]);
        assert_eq!(opts.variant, Variant::Menu);
        assert_eq!(opts.frames, 600);
        assert_eq!(opts.resolution, None);
    }
}
