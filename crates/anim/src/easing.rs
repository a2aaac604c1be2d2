//! Easing curves mapping linear progress in `[0, 1]` to eased progress.

use serde::{Deserialize, Serialize};

/// Named easing curve. Every curve maps 0 to 0 and 1 to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,
    /// Accelerate from rest.
    QuadIn,
    /// Decelerate to rest.
    QuadOut,
    /// Accelerate then decelerate.
    QuadInOut,
    /// Stronger deceleration.
    CubicOut,
    /// Stronger accelerate/decelerate.
    CubicInOut,
    /// Overshoot slightly, then settle.
    BackOut,
    /// Spring past the target and oscillate into place.
    ElasticOut,
}

impl Easing {
    /// Apply the curve to `t`, clamped to `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
            Easing::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let c4 = std::f32::consts::TAU / 3.0;
                2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 8] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::BackOut,
        Easing::ElasticOut,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{easing:?} at 1");
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::QuadIn.apply(-3.0), 0.0);
        assert_eq!(Easing::QuadIn.apply(4.0), 1.0);
    }

    #[test]
    fn back_out_overshoots() {
        assert!((50..100).any(|i| Easing::BackOut.apply(i as f32 / 100.0) > 1.0));
    }

    #[test]
    fn in_out_curves_are_symmetric_at_midpoint() {
        assert!((Easing::QuadInOut.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }
}
