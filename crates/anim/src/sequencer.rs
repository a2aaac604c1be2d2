//! Ordered stage chains with an explicit state machine.

use thiserror::Error;

use crate::tween::{PropertyStore, Tween, TweenValue};

/// A group of tweens that start together; the stage ends when the longest
/// of them ends.
#[derive(Debug, Clone)]
pub struct Stage<K> {
    /// Name reported in [`ChainEvent`]s so callers can attach completion actions.
    pub label: &'static str,
    /// Tweens run in parallel within the stage.
    pub tweens: Vec<Tween<K>>,
}

impl<K> Stage<K> {
    /// Empty stage.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            tweens: Vec::new(),
        }
    }

    /// Builder: add a tween.
    pub fn tween(mut self, tween: Tween<K>) -> Self {
        self.tweens.push(tween);
        self
    }

    /// Stage length: the longest tween.
    pub fn duration(&self) -> f32 {
        self.tweens.iter().map(|t| t.duration).fold(0.0, f32::max)
    }
}

/// Which chain is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Opening chain.
    Forward,
    /// Closing chain.
    Reverse,
}

/// Lifecycle of a [`Sequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainState {
    /// Nothing running; a trigger starts the forward chain.
    #[default]
    Idle,
    /// A chain is running; triggers are rejected.
    InFlight(Direction),
    /// The forward chain finished; a trigger starts the reverse chain if any.
    Open,
}

/// Progress notifications, emitted strictly in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEvent {
    /// A stage captured its start values and began.
    StageStarted {
        /// Chain the stage belongs to.
        direction: Direction,
        /// Position in the chain.
        index: usize,
        /// Stage label.
        label: &'static str,
    },
    /// Every tween of the stage reached its end value.
    StageCompleted {
        /// Chain the stage belongs to.
        direction: Direction,
        /// Position in the chain.
        index: usize,
        /// Stage label.
        label: &'static str,
    },
    /// The last stage of the chain completed.
    ChainCompleted {
        /// Chain that finished.
        direction: Direction,
    },
}

/// Why a trigger was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TriggerError {
    /// A chain is still running.
    #[error("chain `{0}` is already running")]
    Busy(&'static str),
    /// The chain is open and has nothing to close it with.
    #[error("chain `{0}` is open and has no reverse stages")]
    AlreadyOpen(&'static str),
}

#[derive(Debug)]
struct Cursor {
    direction: Direction,
    index: usize,
    elapsed: f32,
    starts: Option<Vec<Option<TweenValue>>>,
}

/// Runs a forward chain, and optionally a reverse chain, one stage at a time.
#[derive(Debug)]
pub struct Sequencer<K> {
    name: &'static str,
    forward: Vec<Stage<K>>,
    reverse: Vec<Stage<K>>,
    state: ChainState,
    cursor: Option<Cursor>,
}

impl<K> Sequencer<K> {
    /// Sequencer with a forward chain only; once open it stays open.
    pub fn new(name: &'static str, forward: Vec<Stage<K>>) -> Self {
        Self {
            name,
            forward,
            reverse: Vec::new(),
            state: ChainState::Idle,
            cursor: None,
        }
    }

    /// Builder: add a reverse chain, making the sequencer re-closable.
    pub fn with_reverse(mut self, reverse: Vec<Stage<K>>) -> Self {
        self.reverse = reverse;
        self
    }

    /// Name used in logs and errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current state.
    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Whether a chain is running.
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, ChainState::InFlight(_))
    }

    /// Whether the forward chain has completed and not been reversed.
    pub fn is_open(&self) -> bool {
        self.state == ChainState::Open
    }

    /// Start the forward chain (from `Idle`) or the reverse chain (from `Open`).
    ///
    /// Stages begin on the next [`Sequencer::advance`].
    pub fn trigger(&mut self) -> Result<Direction, TriggerError> {
        let direction = match self.state {
            ChainState::InFlight(_) => return Err(TriggerError::Busy(self.name)),
            ChainState::Open if self.reverse.is_empty() => {
                return Err(TriggerError::AlreadyOpen(self.name))
            }
            ChainState::Open => Direction::Reverse,
            ChainState::Idle => Direction::Forward,
        };
        tracing::debug!(chain = self.name, ?direction, "chain triggered");
        self.state = ChainState::InFlight(direction);
        self.cursor = Some(Cursor {
            direction,
            index: 0,
            elapsed: 0.0,
            starts: None,
        });
        Ok(direction)
    }

    /// Stop the running chain where it is. Properties keep their current
    /// values and the state returns to `Idle`. Returns whether anything was
    /// running.
    pub fn cancel(&mut self) -> bool {
        if self.cursor.take().is_some() {
            tracing::debug!(chain = self.name, "chain cancelled");
            self.state = ChainState::Idle;
            true
        } else {
            false
        }
    }

    /// Advance the running chain by `dt` seconds, writing through `store`.
    ///
    /// Time left over after a stage completes carries into the next stage,
    /// which starts only after the completion event has been emitted.
    pub fn advance<S: PropertyStore<K>>(&mut self, dt: f32, store: &mut S) -> Vec<ChainEvent> {
        let mut events = Vec::new();
        let mut remaining = dt.max(0.0);

        while let Some(cursor) = self.cursor.as_mut() {
            let direction = cursor.direction;
            let stages = match direction {
                Direction::Forward => &self.forward,
                Direction::Reverse => &self.reverse,
            };

            let Some(stage) = stages.get(cursor.index) else {
                self.cursor = None;
                self.state = match direction {
                    Direction::Forward => ChainState::Open,
                    Direction::Reverse => ChainState::Idle,
                };
                tracing::debug!(chain = self.name, ?direction, "chain completed");
                events.push(ChainEvent::ChainCompleted { direction });
                break;
            };

            let starts = cursor.starts.get_or_insert_with(|| {
                events.push(ChainEvent::StageStarted {
                    direction,
                    index: cursor.index,
                    label: stage.label,
                });
                stage
                    .tweens
                    .iter()
                    .map(|tween| store.read(&tween.target, tween.property))
                    .collect()
            });

            cursor.elapsed += remaining;
            let duration = stage.duration();
            let finished = cursor.elapsed >= duration;

            for (tween, start) in stage.tweens.iter().zip(starts.iter()) {
                // Tweens whose target vanished are skipped rather than failing the chain.
                let Some(start) = start else { continue };
                let value = if finished {
                    tween.end
                } else {
                    tween.sample(*start, cursor.elapsed)
                };
                store.write(&tween.target, tween.property, value);
            }

            if !finished {
                break;
            }

            events.push(ChainEvent::StageCompleted {
                direction,
                index: cursor.index,
                label: stage.label,
            });
            remaining = cursor.elapsed - duration;
            cursor.index += 1;
            cursor.elapsed = 0.0;
            cursor.starts = None;
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Easing, Property};
    use glam::Vec3;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Store(HashMap<(u32, Property), TweenValue>);

    impl PropertyStore<u32> for Store {
        fn read(&self, target: &u32, property: Property) -> Option<TweenValue> {
            self.0.get(&(*target, property)).copied()
        }

        fn write(&mut self, target: &u32, property: Property, value: TweenValue) {
            if let Some(slot) = self.0.get_mut(&(*target, property)) {
                *slot = value;
            }
        }
    }

    fn store() -> Store {
        let mut store = Store::default();
        store.0.insert((1, Property::Scale), Vec3::ONE.into());
        store.0.insert((1, Property::Position), Vec3::ZERO.into());
        store.0.insert((2, Property::Opacity), 0.0.into());
        store
    }

    fn menu_chain() -> Sequencer<u32> {
        Sequencer::new(
            "menu",
            vec![
                Stage::new("shrink").tween(Tween::new(1, Property::Scale, Vec3::splat(0.5), 0.5)),
                Stage::new("slide")
                    .tween(Tween::new(1, Property::Position, Vec3::new(-2.0, 0.0, 0.0), 1.0)),
                Stage::new("reveal").tween(Tween::new(2, Property::Opacity, 1.0, 0.25)),
            ],
        )
        .with_reverse(vec![
            Stage::new("close").tween(Tween::new(1, Property::Position, Vec3::ZERO, 0.5)),
        ])
    }

    #[test]
    fn advance_without_trigger_does_nothing() {
        let mut chain = menu_chain();
        let mut store = store();
        assert!(chain.advance(1.0, &mut store).is_empty());
        assert_eq!(chain.state(), ChainState::Idle);
    }

    #[test]
    fn stages_run_in_order_and_open() {
        let mut chain = menu_chain();
        let mut store = store();
        assert_eq!(chain.trigger(), Ok(Direction::Forward));

        let events = chain.advance(0.25, &mut store);
        assert_eq!(
            events,
            vec![ChainEvent::StageStarted { direction: Direction::Forward, index: 0, label: "shrink" }]
        );
        assert_eq!(store.read(&1, Property::Scale), Some(Vec3::splat(0.75).into()));
        // The slide has not started: position untouched.
        assert_eq!(store.read(&1, Property::Position), Some(Vec3::ZERO.into()));

        let events = chain.advance(0.5, &mut store);
        assert_eq!(
            events,
            vec![
                ChainEvent::StageCompleted { direction: Direction::Forward, index: 0, label: "shrink" },
                ChainEvent::StageStarted { direction: Direction::Forward, index: 1, label: "slide" },
            ]
        );
        assert_eq!(store.read(&1, Property::Scale), Some(Vec3::splat(0.5).into()));

        let events = chain.advance(5.0, &mut store);
        assert_eq!(events.last(), Some(&ChainEvent::ChainCompleted { direction: Direction::Forward }));
        assert_eq!(chain.state(), ChainState::Open);
        assert_eq!(store.read(&2, Property::Opacity), Some(1.0.into()));
    }

    #[test]
    fn reentrant_trigger_is_rejected() {
        let mut chain = menu_chain();
        let mut store = store();
        chain.trigger().expect("idle chain starts");
        chain.advance(0.1, &mut store);
        assert_eq!(chain.trigger(), Err(TriggerError::Busy("menu")));
        assert!(chain.is_in_flight());
    }

    #[test]
    fn open_chain_reverses_back_to_idle() {
        let mut chain = menu_chain();
        let mut store = store();
        chain.trigger().expect("forward");
        chain.advance(10.0, &mut store);
        assert!(chain.is_open());

        assert_eq!(chain.trigger(), Ok(Direction::Reverse));
        chain.advance(10.0, &mut store);
        assert_eq!(chain.state(), ChainState::Idle);
        assert_eq!(store.read(&1, Property::Position), Some(Vec3::ZERO.into()));
    }

    #[test]
    fn forward_only_chain_stays_open() {
        let mut chain = Sequencer::new(
            "room",
            vec![Stage::new("approach").tween(Tween::new(1, Property::Scale, Vec3::ZERO, 0.1))],
        );
        let mut store = store();
        chain.trigger().expect("forward");
        chain.advance(1.0, &mut store);
        assert_eq!(chain.trigger(), Err(TriggerError::AlreadyOpen("room")));
    }

    #[test]
    fn cancel_leaves_values_in_place() {
        let mut chain = menu_chain();
        let mut store = store();
        chain.trigger().expect("forward");
        chain.advance(0.25, &mut store);
        assert!(chain.cancel());
        assert_eq!(chain.state(), ChainState::Idle);
        assert!(chain.advance(1.0, &mut store).is_empty());
        assert_eq!(store.read(&1, Property::Scale), Some(Vec3::splat(0.75).into()));
        assert!(!chain.cancel());
    }

    #[test]
    fn restart_after_cancel_tweens_from_current_value() {
        let mut chain = menu_chain();
        let mut store = store();
        chain.trigger().expect("forward");
        chain.advance(0.25, &mut store);
        chain.cancel();
        chain.trigger().expect("restart");
        chain.advance(0.25, &mut store);
        // Halfway from 0.75 to 0.5.
        assert_eq!(store.read(&1, Property::Scale), Some(Vec3::splat(0.625).into()));
    }

    #[test]
    fn empty_chain_completes_on_first_advance() {
        let mut chain: Sequencer<u32> = Sequencer::new("empty", Vec::new());
        let mut store = store();
        chain.trigger().expect("forward");
        let events = chain.advance(0.0, &mut store);
        assert_eq!(events, vec![ChainEvent::ChainCompleted { direction: Direction::Forward }]);
        assert!(chain.is_open());
    }

    #[test]
    fn missing_targets_are_skipped() {
        let mut chain = Sequencer::new(
            "ghost",
            vec![Stage::new("fade").tween(Tween::new(99, Property::Opacity, 1.0, 0.5))],
        );
        let mut store = store();
        chain.trigger().expect("forward");
        let events = chain.advance(1.0, &mut store);
        assert_eq!(events.last(), Some(&ChainEvent::ChainCompleted { direction: Direction::Forward }));
    }

    #[test]
    fn eased_stage_still_lands_on_target() {
        let mut chain = Sequencer::new(
            "grow",
            vec![Stage::new("grow").tween(
                Tween::new(1, Property::Scale, Vec3::new(1.0, 1.0, 0.8), 0.6)
                    .with_easing(Easing::ElasticOut),
            )],
        );
        let mut store = store();
        store.0.insert((1, Property::Scale), Vec3::ZERO.into());
        chain.trigger().expect("forward");
        for _ in 0..7 {
            chain.advance(0.1, &mut store);
        }
        assert_eq!(store.read(&1, Property::Scale), Some(Vec3::new(1.0, 1.0, 0.8).into()));
    }

    proptest! {
        #[test]
        fn stage_k_plus_one_never_starts_before_k_completes(
            durations in proptest::collection::vec(0.0f32..1.0, 1..6),
            steps in proptest::collection::vec(0.0f32..0.3, 1..80),
        ) {
            let stages: Vec<Stage<u32>> = durations
                .iter()
                .map(|d| Stage::new("s").tween(Tween::new(1, Property::Scale, Vec3::splat(*d), *d)))
                .collect();
            let count = stages.len();
            let mut chain = Sequencer::new("prop", stages);
            let mut store = store();
            chain.trigger().expect("forward");

            let mut started = Vec::new();
            let mut completed = Vec::new();
            for dt in steps {
                for event in chain.advance(dt, &mut store) {
                    match event {
                        ChainEvent::StageStarted { index, .. } => {
                            prop_assert_eq!(index, started.len());
                            prop_assert_eq!(completed.len(), index);
                            started.push(index);
                        }
                        ChainEvent::StageCompleted { index, .. } => {
                            prop_assert_eq!(index + 1, started.len());
                            completed.push(index);
                        }
                        ChainEvent::ChainCompleted { .. } => {
                            prop_assert_eq!(completed.len(), count);
                        }
                    }
                }
            }
        }
    }
}
