#![warn(missing_docs)]
//! Property tweening and ordered stage chains.
//!
//! A [`Sequencer`] owns a forward chain of [`Stage`]s and, optionally, a
//! reverse chain. Each stage runs one or more [`Tween`]s in parallel; the next
//! stage starts only once every tween of the current one has finished. The
//! sequencer never touches scene data directly: it reads and writes through a
//! [`PropertyStore`], so the same chain can drive scene objects or the camera.

mod easing;
mod sequencer;
mod tween;

pub use easing::Easing;
pub use sequencer::{ChainEvent, ChainState, Direction, Sequencer, Stage, TriggerError};
pub use tween::{Property, PropertyStore, Tween, TweenValue};
