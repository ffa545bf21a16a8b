//! Small shared helpers: easing curves, frame timing, seeded randomness.

/// Easing curves for tweens.
pub mod easing;
/// Frame delta and FPS tracking.
pub mod frame_timing;
/// Seedable random helpers.
pub mod random;

/// Per-frame increments in the scene are tuned for this refresh rate; a
/// frame of `dt` seconds advances them by `dt * REFERENCE_FPS` steps.
pub const REFERENCE_FPS: f32 = 60.0;

/// Number of reference frames covered by `dt` seconds.
#[inline]
#[must_use]
pub fn frames(dt: f32) -> f32 {
    dt * REFERENCE_FPS
}

/// Convert a packed `0xRRGGBB` color into linear-ish RGB floats in `[0, 1]`.
#[must_use]
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_unpacks_channels() {
        assert_eq!(rgb(0xff_00_00), [1.0, 0.0, 0.0]);
        assert_eq!(rgb(0x00_ff_00), [0.0, 1.0, 0.0]);
        let grey = rgb(0x80_80_80);
        assert!((grey[2] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn one_reference_frame() {
        assert!((frames(1.0 / 60.0) - 1.0).abs() < 1e-5);
    }
}
