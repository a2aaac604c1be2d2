use folio3d_input::PointerEvent;
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
struct ScriptedInputFile {
    steps: Vec<ScriptedStep>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ScriptedStep {
    /// Seconds to stay on this step before the next one fires.
    duration: f32,
    #[serde(default)]
    pointer: Option<PointerEvent>,
    #[serde(default)]
    cancel: bool,
    #[serde(default)]
    resize: Option<(u32, u32)>,
}

/// What a step asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptAction {
    Pointer(PointerEvent),
    Cancel,
    Resize(u32, u32),
}

/// Replays a JSON list of timed pointer steps. Each step's actions fire once,
/// on the frame the step becomes current.
pub struct ScriptedInputPlayer {
    steps: Vec<ScriptedStep>,
    index: usize,
    time_in_step: f32,
    started: bool,
}

impl ScriptedInputPlayer {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let file: ScriptedInputFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("scripted input file contains no steps");
        }
        Ok(Self {
            steps: file.steps,
            index: 0,
            time_in_step: 0.0,
            started: false,
        })
    }

    /// Whether every step has fired and run its duration.
    pub fn finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    /// Advance by `dt` seconds, returning actions of steps that became current.
    pub fn advance(&mut self, dt: f32) -> Vec<ScriptAction> {
        let mut actions = Vec::new();
        if !self.started {
            self.started = true;
            self.collect(&mut actions);
        }

        self.time_in_step += dt;
        while self.index < self.steps.len() && self.time_in_step >= self.steps[self.index].duration
        {
            self.time_in_step -= self.steps[self.index].duration;
            self.index += 1;
            self.collect(&mut actions);
        }
        actions
    }

    fn collect(&self, actions: &mut Vec<ScriptAction>) {
        let Some(step) = self.steps.get(self.index) else {
            return;
        };
        if let Some((width, height)) = step.resize {
            actions.push(ScriptAction::Resize(width, height));
        }
        if let Some(pointer) = step.pointer {
            actions.push(ScriptAction::Pointer(pointer));
        }
        if step.cancel {
            actions.push(ScriptAction::Cancel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "steps": [
            { "duration": 0.5, "pointer": { "kind": "move", "x": 10.0, "y": 20.0 } },
            { "duration": 0.25, "pointer": { "kind": "click", "x": 10.0, "y": 20.0 } },
            { "duration": 0.0, "cancel": true, "resize": [800, 600] }
        ]
    }"#;

    #[test]
    fn first_step_fires_immediately_then_on_duration() {
        let mut player = ScriptedInputPlayer::from_json(SCRIPT).unwrap();
        assert_eq!(
            player.advance(0.25),
            vec![ScriptAction::Pointer(PointerEvent::Move { x: 10.0, y: 20.0 })]
        );
        assert!(player.advance(0.125).is_empty());
        assert_eq!(
            player.advance(0.125),
            vec![ScriptAction::Pointer(PointerEvent::Click { x: 10.0, y: 20.0 })]
        );
        assert!(!player.finished());
    }

    #[test]
    fn a_long_frame_fires_every_step_it_crosses_in_order() {
        let mut player = ScriptedInputPlayer::from_json(SCRIPT).unwrap();
        let actions = player.advance(2.0);
        assert_eq!(
            actions,
            vec![
                ScriptAction::Pointer(PointerEvent::Move { x: 10.0, y: 20.0 }),
                ScriptAction::Pointer(PointerEvent::Click { x: 10.0, y: 20.0 }),
                ScriptAction::Resize(800, 600),
                ScriptAction::Cancel,
            ]
        );
        assert!(player.finished());
        assert!(player.advance(1.0).is_empty());
    }

    #[test]
    fn empty_script_is_rejected() {
        assert!(ScriptedInputPlayer::from_json(r#"{ "steps": [] }"#).is_err());
    }
}
