//! Per-color completion thresholds

use rand::Rng;

use super::peg::available_colors;
use crate::consts::MAX_COLORS;
use crate::random_between;

pub const MIN_THRESHOLD: f32 = 0.20;
pub const MAX_THRESHOLD: f32 = 0.85;
/// Highest base threshold any level reaches
pub const BASE_THRESHOLD_CAP: f32 = 0.80;
/// Value left in slots past the level's available colors
pub const UNUSED_THRESHOLD: f32 = 0.0;

/// Pre-jitter threshold shared by all colors of a level
///
/// Four bands of five levels each ramp 0.25 -> 0.40 -> 0.55 -> 0.70, then
/// the curve creeps toward 0.80.
pub fn base_threshold(level: u32) -> f32 {
    let level = level.max(1);
    let ramp = |start: u32, from: f32, to: f32| from + (to - from) * (level - start) as f32 / 4.0;

    let base = match level {
        1..=5 => ramp(1, 0.25, 0.40),
        6..=10 => ramp(6, 0.40, 0.55),
        11..=15 => ramp(11, 0.55, 0.70),
        _ => 0.70 + 0.02 * (level - 16) as f32,
    };
    base.min(BASE_THRESHOLD_CAP)
}

/// Fraction of each color's pegs that must be hit to clear a level
///
/// Above level 3 the first color is a little stricter, the last available
/// color a little looser, and every color gets up to ±0.03 of jitter.
pub fn color_thresholds(level: u32, rng: &mut impl Rng) -> [f32; MAX_COLORS] {
    let colors = available_colors(level);
    let base = base_threshold(level);
    let mut thresholds = [UNUSED_THRESHOLD; MAX_COLORS];

    for (color, slot) in thresholds.iter_mut().enumerate().take(colors) {
        let mut value = base;
        if level > 3 {
            if color == 0 {
                value += 0.05;
            }
            if color == colors - 1 {
                value -= 0.03;
            }
            value += random_between(rng, -0.03, 0.03);
        }
        *slot = value.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
    }

    thresholds
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_band_endpoints() {
        let close = |a: f32, b: f32| (a - b).abs() < 1e-5;
        assert!(close(base_threshold(1), 0.25));
        assert!(close(base_threshold(5), 0.40));
        assert!(close(base_threshold(6), 0.40));
        assert!(close(base_threshold(10), 0.55));
        assert!(close(base_threshold(11), 0.55));
        assert!(close(base_threshold(15), 0.70));
        assert!(close(base_threshold(16), 0.70));
        assert!(close(base_threshold(100), 0.80));
    }

    #[test]
    fn test_base_is_non_decreasing() {
        for level in 1..60 {
            assert!(base_threshold(level + 1) >= base_threshold(level) - 1e-6);
        }
    }

    #[test]
    fn test_level_one_has_no_jitter() {
        let mut rng = Pcg32::seed_from_u64(1);
        let t = color_thresholds(1, &mut rng);
        for &v in &t[..4] {
            assert!((v - 0.25).abs() < 1e-6);
        }
        for &v in &t[4..] {
            assert_eq!(v, UNUSED_THRESHOLD);
        }
    }

    #[test]
    fn test_thresholds_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(2);
        for level in 1..40 {
            let colors = available_colors(level);
            let t = color_thresholds(level, &mut rng);
            for &v in &t[..colors] {
                assert!((MIN_THRESHOLD..=MAX_THRESHOLD).contains(&v));
            }
        }
    }

    #[test]
    fn test_first_color_is_stricter_than_last() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let t = color_thresholds(12, &mut rng);
            // +0.05 vs -0.03 outweighs the ±0.03 jitter on each
            assert!(t[0] > t[7]);
        }
    }
}
