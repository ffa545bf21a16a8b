//! Easing functions for tween interpolation.
//!
//! Includes the cubic "Power2" family used by every choreographed motion in
//! the scene (ship fly-bys, drones, camera jitter, wormhole pulses).

/// Easing function variants for animation curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-in (slow start, fast end).
    QuadraticIn,
    /// Quadratic ease-out (fast start, slow end).
    QuadraticOut,
    /// Square root ease-out (fast start, gradual slow).
    SqrtOut,
    /// Cubic ease-in: `t³`.
    Power2In,
    /// Cubic ease-out: `1 - (1-t)³`.
    Power2Out,
    /// Cubic ease-in for the first half, cubic ease-out for the second.
    Power2InOut,
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First control value.
        c1: f32,
        /// Second control value.
        c2: f32,
    },
}

impl EasingFunction {
    /// Default easing for tweens that do not name one: ease-out, like the
    /// classic tween libraries.
    pub const DEFAULT: EasingFunction = EasingFunction::Power2Out;

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0].
    #[inline]
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::QuadraticIn => t * t,
            EasingFunction::QuadraticOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            EasingFunction::SqrtOut => t.sqrt(),
            EasingFunction::Power2In => t * t * t,
            EasingFunction::Power2Out => {
                let omt = 1.0 - t;
                1.0 - omt * omt * omt
            }
            EasingFunction::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let omt = 2.0 * (1.0 - t);
                    1.0 - omt * omt * omt / 2.0
                }
            }
            EasingFunction::CubicHermite { c1, c2 } => {
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
        }
    }
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingFunction; 8] = [
        EasingFunction::Linear,
        EasingFunction::QuadraticIn,
        EasingFunction::QuadraticOut,
        EasingFunction::SqrtOut,
        EasingFunction::Power2In,
        EasingFunction::Power2Out,
        EasingFunction::Power2InOut,
        EasingFunction::CubicHermite { c1: 0.33, c2: 1.0 },
    ];

    #[test]
    fn test_endpoints_are_fixed() {
        for ease in ALL {
            assert!(ease.evaluate(0.0).abs() < 1e-6, "{ease:?} at 0");
            assert!((ease.evaluate(1.0) - 1.0).abs() < 1e-6, "{ease:?} at 1");
        }
    }

    #[test]
    fn test_input_clamping() {
        for ease in ALL {
            assert!(ease.evaluate(-0.5).abs() < 1e-6);
            assert!((ease.evaluate(1.5) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_power2_in_out_is_symmetric() {
        let ease = EasingFunction::Power2InOut;
        assert!((ease.evaluate(0.5) - 0.5).abs() < 1e-6);
        let a = ease.evaluate(0.2);
        let b = ease.evaluate(0.8);
        assert!((a + b - 1.0).abs() < 1e-6);
        assert!((a - 0.032).abs() < 1e-6);
    }

    #[test]
    fn test_power2_in_and_out_mirror() {
        let t = 0.3;
        let i = EasingFunction::Power2In.evaluate(t);
        let o = EasingFunction::Power2Out.evaluate(1.0 - t);
        assert!((i + o - 1.0).abs() < 1e-6);
        assert!((i - 0.027).abs() < 1e-6);
    }

    #[test]
    fn test_quadratic_out() {
        let quad_out = EasingFunction::QuadraticOut;
        assert_eq!(quad_out.evaluate(0.5), 0.75);
    }

    #[test]
    fn test_sqrt_out() {
        assert!((EasingFunction::SqrtOut.evaluate(0.25) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_default_is_power2_out() {
        assert_eq!(EasingFunction::default(), EasingFunction::Power2Out);
    }
}
