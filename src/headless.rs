use crate::config::{SceneConfig, Variant};
use crate::controller::{ControllerEvent, SceneController};
use crate::frame;
use crate::notify::LogNotifier;
use crate::scripted_input::{ScriptAction, ScriptedInputPlayer};
use anyhow::{Context, Result};
use folio3d_core::FrameIndex;
use folio3d_render::{NullRenderer, SceneRenderer};
use folio3d_scene::assets::FsAssets;
use folio3d_testkit::{EventRecord, EventSink, JsonlSink, MemorySink};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

/// Simulated frame length for headless runs.
pub const HEADLESS_DT: f32 = 1.0 / 60.0;

pub struct HeadlessConfig {
    pub scene: SceneConfig,
    pub variant: Variant,
    pub frames: u64,
    pub width: u32,
    pub height: u32,
    pub scripted_input: Option<PathBuf>,
    pub trace: Option<PathBuf>,
    pub exit_when_script_finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSummary {
    pub frames: u64,
    pub events: usize,
    pub phase: &'static str,
    pub physics_steps: u64,
}

pub fn run(cfg: HeadlessConfig) -> Result<HeadlessSummary> {
    let mut assets = FsAssets::new(cfg.scene.assets.root.clone());
    let controller = SceneController::new(cfg.variant, &cfg.scene, &mut assets, Box::new(LogNotifier));

    let script = match cfg.scripted_input.as_deref() {
        Some(path) => Some(
            ScriptedInputPlayer::from_path(path)
                .with_context(|| format!("Failed to load scripted input {}", path.display()))?,
        ),
        None => None,
    };

    let mut sink: Box<dyn EventSink> = match cfg.trace.as_deref() {
        Some(path) => Box::new(JsonlSink::create(path, cfg.variant.as_str())?),
        None => Box::new(MemorySink::new()),
    };

    let options = RunOptions {
        frames: cfg.frames,
        viewport: (cfg.width, cfg.height),
        exit_when_script_finished: cfg.exit_when_script_finished,
    };
    run_with(controller, script, options, sink.as_mut())
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub frames: u64,
    pub viewport: (u32, u32),
    pub exit_when_script_finished: bool,
}

/// Drive `controller` for up to `options.frames` frames, replaying `script`
/// and recording every controller event into `sink`.
pub fn run_with(
    mut controller: SceneController,
    mut script: Option<ScriptedInputPlayer>,
    options: RunOptions,
    sink: &mut dyn EventSink,
) -> Result<HeadlessSummary> {
    let mut renderer = NullRenderer::default();
    controller.resize(options.viewport);
    renderer.resize(options.viewport);

    let mut frame = FrameIndex::ZERO;
    let mut recorded = 0;
    while frame.0 < options.frames {
        if let Some(player) = script.as_mut() {
            if options.exit_when_script_finished && player.finished() {
                info!(frame = frame.0, "script finished");
                break;
            }
            for action in player.advance(HEADLESS_DT) {
                match action {
                    ScriptAction::Pointer(event) => controller.pointer(event),
                    ScriptAction::Cancel => controller.cancel_chains(),
                    ScriptAction::Resize(width, height) => {
                        controller.resize((width, height));
                        renderer.resize((width, height));
                    }
                }
            }
        }

        let now = frame.0 as f64 * f64::from(HEADLESS_DT);
        frame::run_frame(&mut controller, &mut renderer, now, HEADLESS_DT)?;

        for event in controller.drain_events() {
            sink.record(&to_record(frame, &event)?)?;
            recorded += 1;
        }
        frame = frame.advance(1);
    }

    let summary = HeadlessSummary {
        frames: frame.0,
        events: recorded,
        phase: controller.phase_label(),
        physics_steps: controller.physics_steps(),
    };
    sink.record(&EventRecord::new(
        frame,
        "summary",
        json!({
            "variant": controller.variant().as_str(),
            "phase": summary.phase,
            "events": summary.events,
            "physics_steps": summary.physics_steps,
        }),
    ))?;
    sink.flush()?;

    info!(
        frames = summary.frames,
        events = summary.events,
        phase = summary.phase,
        "headless run complete"
    );
    Ok(summary)
}

/// Split a controller event into the trace's `kind` and payload.
fn to_record(frame: FrameIndex, event: &ControllerEvent) -> Result<EventRecord> {
    let mut value = serde_json::to_value(event).context("Failed to serialize controller event")?;
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or("event")
        .to_string();
    if let Value::Object(map) = &mut value {
        map.remove("kind");
    }
    Ok(EventRecord::new(frame, kind, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_split_kind_from_payload() {
        let record = to_record(
            FrameIndex(3),
            &ControllerEvent::ChainTriggered {
                chain: "menu",
                reverse: false,
            },
        )
        .unwrap();
        assert_eq!(record.frame, FrameIndex(3));
        assert_eq!(record.kind, "chain_triggered");
        assert_eq!(record.payload, json!({ "chain": "menu", "reverse": false }));
    }
}
