//! Single-property tweens and the store they read from and write to.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Easing;

/// Animatable property of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// World/parent-space translation.
    Position,
    /// Euler rotation in radians.
    Rotation,
    /// Per-axis scale.
    Scale,
    /// Material opacity in `[0, 1]`.
    Opacity,
}

/// Value carried by a property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TweenValue {
    /// Vector-valued property (position, rotation, scale).
    Vec3(Vec3),
    /// Scalar property (opacity).
    Scalar(f32),
}

impl TweenValue {
    /// Interpolate toward `end` by `t`. Mismatched kinds snap to `end`.
    pub fn lerp(self, end: TweenValue, t: f32) -> TweenValue {
        match (self, end) {
            (TweenValue::Vec3(a), TweenValue::Vec3(b)) => TweenValue::Vec3(a.lerp(b, t)),
            (TweenValue::Scalar(a), TweenValue::Scalar(b)) => TweenValue::Scalar(a + (b - a) * t),
            (_, end) => end,
        }
    }
}

impl From<Vec3> for TweenValue {
    fn from(value: Vec3) -> Self {
        TweenValue::Vec3(value)
    }
}

impl From<f32> for TweenValue {
    fn from(value: f32) -> Self {
        TweenValue::Scalar(value)
    }
}

/// Read/write access to animatable properties keyed by target `K`.
pub trait PropertyStore<K> {
    /// Current value, or `None` if the target does not exist.
    fn read(&self, target: &K, property: Property) -> Option<TweenValue>;

    /// Overwrite a value. Writes to missing targets are ignored.
    fn write(&mut self, target: &K, property: Property, value: TweenValue);
}

/// Description of one property animation: from the value at stage start to
/// `end` over `duration` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween<K> {
    /// What to animate.
    pub target: K,
    /// Which property.
    pub property: Property,
    /// Final value, written exactly when the tween completes.
    pub end: TweenValue,
    /// Length in seconds.
    pub duration: f32,
    /// Curve applied to linear progress.
    pub easing: Easing,
}

impl<K> Tween<K> {
    /// Linear tween of `property` on `target`.
    pub fn new(target: K, property: Property, end: impl Into<TweenValue>, duration: f32) -> Self {
        Self {
            target,
            property,
            end: end.into(),
            duration: duration.max(0.0),
            easing: Easing::Linear,
        }
    }

    /// Builder: set the easing curve.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Value at `elapsed` seconds given the captured `start`.
    pub fn sample(&self, start: TweenValue, elapsed: f32) -> TweenValue {
        if self.duration <= 0.0 || elapsed >= self.duration {
            return self.end;
        }
        start.lerp(self.end, self.easing.apply(elapsed / self.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_hits_end_exactly() {
        let tween = Tween::new(0u8, Property::Scale, Vec3::ONE, 0.7).with_easing(Easing::BackOut);
        let start = TweenValue::Vec3(Vec3::ZERO);
        assert_eq!(tween.sample(start, 0.7), TweenValue::Vec3(Vec3::ONE));
        assert_eq!(tween.sample(start, 9.0), TweenValue::Vec3(Vec3::ONE));
    }

    #[test]
    fn sample_midpoint_linear() {
        let tween = Tween::new(0u8, Property::Opacity, 1.0, 2.0);
        assert_eq!(tween.sample(TweenValue::Scalar(0.0), 1.0), TweenValue::Scalar(0.5));
    }

    #[test]
    fn zero_duration_is_immediate() {
        let tween = Tween::new(0u8, Property::Opacity, 0.25, 0.0);
        assert_eq!(tween.sample(TweenValue::Scalar(1.0), 0.0), TweenValue::Scalar(0.25));
    }

    #[test]
    fn mismatched_kinds_snap_to_end() {
        let value = TweenValue::Scalar(1.0).lerp(TweenValue::Vec3(Vec3::X), 0.1);
        assert_eq!(value, TweenValue::Vec3(Vec3::X));
    }
}
