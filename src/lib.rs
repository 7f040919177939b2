//! Pegfall - procedural level generator for a peg-clearing physics game
//!
//! Core modules:
//! - `level`: Level generation (patterns, sections, assembly, color balance, thresholds)
//! - `settings`: Generator configuration (canvas size, peg radius, margins)
//!
//! Physics, rendering and input live in the game client. They only consume
//! the peg list and per-color thresholds produced here.

pub mod level;
pub mod settings;

pub use level::{Generator, LevelLayout, Peg, PatternKind, Section};
pub use settings::GeneratorSettings;

use glam::Vec2;
use rand::Rng;

/// Generator configuration constants
pub mod consts {
    /// Maximum number of peg colors any level can use
    pub const MAX_COLORS: usize = 8;

    /// Default canvas dimensions
    pub const DEFAULT_CANVAS_WIDTH: f32 = 600.0;
    pub const DEFAULT_CANVAS_HEIGHT: f32 = 650.0;
    pub const DEFAULT_PEG_RADIUS: f32 = 10.0;

    /// Margins carved out of the canvas before pegs are placed
    pub const SIDE_MARGIN: f32 = 50.0;
    /// Room for the ball launcher at the top
    pub const LAUNCHER_MARGIN: f32 = 120.0;
    /// Room for the catch bucket at the bottom
    pub const BUCKET_MARGIN: f32 = 80.0;

    /// Largest playable extent on either axis, in peg radii
    pub const MAX_PLAYABLE_PEG_RADII: f32 = 240.0;

    /// Smallest spacing any pattern will lay pegs out with (pixels)
    pub const MIN_PATTERN_SPACING: f32 = 4.0;
    /// Smallest radius any radial pattern will use (pixels)
    pub const MIN_PATTERN_RADIUS: f32 = 1.0;
}

/// Rotate `point` about `center` by `angle` radians
#[inline]
pub fn rotate_about(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    center + Vec2::from_angle(angle).rotate(point - center)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Uniform sample from `[lo, hi)`, or `lo` when the range is empty
#[inline]
pub fn random_between(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_about_quarter_turn() {
        let p = rotate_about(Vec2::new(2.0, 1.0), Vec2::new(1.0, 1.0), FRAC_PI_2);
        assert!((p - Vec2::new(1.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_random_between_empty_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(random_between(&mut rng, 5.0, 5.0), 5.0);
        assert_eq!(random_between(&mut rng, 5.0, 1.0), 5.0);
        let v = random_between(&mut rng, 1.0, 2.0);
        assert!((1.0..2.0).contains(&v));
    }
}
