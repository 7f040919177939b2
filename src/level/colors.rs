//! Color balancing
//!
//! Runs after assembly, always in this order:
//! 1. clamp provisional colors into the level palette
//! 2. spatial gradient recolor (levels above 3)
//! 3. per-color minimum enforcement so every color can reach its threshold
//!
//! Each stage takes the peg list by value and returns a new one.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::peg::{Peg, color_counts};
use crate::random_between;

/// Level whose cyan pegs (color 5) get special protection
const CYAN_LEVEL: u32 = 3;
const CYAN: usize = 5;
/// Extra pegs required of the protected color
const CYAN_BONUS: usize = 2;
/// Side of a checkerboard blend cell (pixels)
const BLEND_CELL: f32 = 50.0;

/// Spatial functions mapping a peg position to a color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gradient {
    Horizontal,
    Vertical,
    Radial,
    Stripes,
    Noise,
    Spiral,
    Pattern,
}

impl Gradient {
    pub const ALL: [Gradient; 7] = [
        Gradient::Horizontal,
        Gradient::Vertical,
        Gradient::Radial,
        Gradient::Stripes,
        Gradient::Noise,
        Gradient::Spiral,
        Gradient::Pattern,
    ];

    /// Normalized value in `[0, 1)` for a position
    fn value(&self, pos: Vec2, canvas: Vec2, level: u32) -> f32 {
        let center = canvas * 0.5;
        let v = match self {
            Gradient::Horizontal => pos.x / canvas.x,
            Gradient::Vertical => pos.y / canvas.y,
            Gradient::Radial => pos.distance(center) / center.length(),
            Gradient::Stripes => {
                let period = [40.0, 60.0, 80.0][(level % 3) as usize];
                (pos.x / period).floor() * 0.37
            }
            Gradient::Noise => cell_hash((pos / 30.0).floor(), level),
            Gradient::Spiral => {
                let d = pos - center;
                let angle = d.y.atan2(d.x) / TAU + 0.5;
                angle + d.length() / center.length()
            }
            Gradient::Pattern => {
                let salt = level.wrapping_mul(31).wrapping_add(17);
                cell_hash((pos / BLEND_CELL).floor() + Vec2::splat(7.0), salt)
            }
        };
        v.rem_euclid(1.0)
    }

    /// Color index for a position
    pub fn color_at(&self, pos: Vec2, canvas: Vec2, colors: usize, level: u32) -> usize {
        let colors = colors.max(1);
        let v = self.value(pos, canvas, level);
        ((v * colors as f32) as usize).min(colors - 1)
    }
}

/// Deterministic hash of an integer cell to `[0, 1)`
fn cell_hash(cell: Vec2, salt: u32) -> f32 {
    let x = cell.x as i32 as u32;
    let y = cell.y as i32 as u32;
    let h = x
        .wrapping_mul(374_761_393)
        .wrapping_add(y.wrapping_mul(668_265_263))
        .wrapping_add(salt.wrapping_mul(2_654_435_761));
    let h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    let h = h ^ (h >> 16);
    (h % 10_000) as f32 / 10_000.0
}

/// How two gradients are combined per peg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Alternate 50px cells between the two gradients
    Checkerboard,
    /// Inner region uses the first gradient, outer region the second
    Distance,
    /// Each peg picks a gradient at random
    Random,
}

impl Blend {
    pub fn for_level(level: u32) -> Self {
        match level % 3 {
            0 => Blend::Checkerboard,
            1 => Blend::Distance,
            _ => Blend::Random,
        }
    }

    /// Whether the peg at `pos` takes the first of the two blended gradients
    pub fn picks_first(&self, pos: Vec2, canvas: Vec2, ratio: f32, rng: &mut impl Rng) -> bool {
        match self {
            Blend::Checkerboard => {
                let cell = (pos / BLEND_CELL).floor();
                (cell.x + cell.y).rem_euclid(2.0) < 1.0
            }
            Blend::Distance => {
                let center = canvas * 0.5;
                pos.distance(center) / center.length() < ratio
            }
            Blend::Random => rng.random::<f32>() < ratio,
        }
    }
}

/// Clamp stage: out-of-palette pegs go to the least-populated color
pub fn clamp_colors(pegs: Vec<Peg>, colors: usize) -> Vec<Peg> {
    let colors = colors.max(1);
    let mut counts = color_counts(&pegs, colors);
    let mut clamped = 0;

    let pegs = pegs
        .into_iter()
        .map(|peg| {
            if peg.color < colors {
                return peg;
            }
            let target = least_populated(&counts);
            counts[target] += 1;
            clamped += 1;
            peg.with_color(target)
        })
        .collect();

    if clamped > 0 {
        log::warn!("Clamped {} pegs into a {}-color palette", clamped, colors);
    }
    pegs
}

fn least_populated(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .min_by_key(|&(_, &n)| n)
        .map_or(0, |(i, _)| i)
}

/// Gradient stage: recolor every peg from a spatial function
///
/// Levels above 6 blend two gradients 40% of the time.
pub fn apply_gradient(pegs: Vec<Peg>, canvas: Vec2, colors: usize, level: u32, rng: &mut impl Rng) -> Vec<Peg> {
    let first = Gradient::ALL[rng.random_range(0..Gradient::ALL.len())];

    if level > 6 && rng.random_bool(0.4) {
        let second = Gradient::ALL[rng.random_range(0..Gradient::ALL.len())];
        let blend = Blend::for_level(level);
        let ratio = random_between(rng, 0.3, 0.7);
        log::debug!("Blending {:?} and {:?} ({:?}, ratio {:.2})", first, second, blend, ratio);

        pegs.into_iter()
            .map(|peg| {
                let gradient = if blend.picks_first(peg.pos, canvas, ratio, rng) {
                    first
                } else {
                    second
                };
                peg.with_color(gradient.color_at(peg.pos, canvas, colors, level))
            })
            .collect()
    } else {
        log::debug!("Recoloring with {:?} gradient", first);
        pegs.into_iter()
            .map(|peg| peg.with_color(first.color_at(peg.pos, canvas, colors, level)))
            .collect()
    }
}

/// Pegs each available color must have at a level
pub fn minimum_per_color(level: u32) -> usize {
    // floor(5 - level / 10) without float rounding at multiples of ten
    let tenths = level.max(1).div_ceil(10) as usize;
    5usize.saturating_sub(tenths).max(3)
}

/// Required count for one color, including the protected cyan bonus
pub fn required_for_color(color: usize, level: u32) -> usize {
    let min = minimum_per_color(level);
    if level == CYAN_LEVEL && color == CYAN {
        min + CYAN_BONUS
    } else {
        min
    }
}

/// Minimum stage: recolor pegs from over-represented colors until every
/// available color meets its minimum
///
/// Donors are colors holding more than `minimum + 2`; failing that, any
/// color above its own minimum; failing that, any other color. On level 3
/// color 5 is handled first and never donates.
// TODO: drop the level-3 cyan rule once the general pass is shown to cover it
pub fn enforce_minimum_per_color(pegs: Vec<Peg>, colors: usize, level: u32, rng: &mut impl Rng) -> Vec<Peg> {
    let colors = colors.max(1);
    let mut assigned: Vec<usize> = pegs.iter().map(|p| p.color % colors).collect();
    let mut counts = vec![0usize; colors];
    for &c in &assigned {
        counts[c] += 1;
    }

    let protected = (level == CYAN_LEVEL && CYAN < colors).then_some(CYAN);
    let mut order: Vec<usize> = (0..colors).collect();
    if let Some(cyan) = protected {
        order.retain(|&c| c != cyan);
        order.insert(0, cyan);
    }

    let min = minimum_per_color(level);
    for color in order {
        let required = required_for_color(color, level);
        while counts[color] < required {
            let eligible = |d: usize| d != color && Some(d) != protected && counts[d] > 0;
            let donor = best_donor(&counts, |d| eligible(d) && counts[d] > min + 2)
                .or_else(|| best_donor(&counts, |d| eligible(d) && counts[d] > required_for_color(d, level)))
                .or_else(|| best_donor(&counts, eligible));
            let Some(donor) = donor else {
                log::warn!("No donor left for color {} on level {}", color, level);
                break;
            };

            let candidates: Vec<usize> = (0..assigned.len()).filter(|&i| assigned[i] == donor).collect();
            let pick = candidates[rng.random_range(0..candidates.len())];
            assigned[pick] = color;
            counts[donor] -= 1;
            counts[color] += 1;
            log::debug!("Recolored peg {} from {} to {}", pick, donor, color);
        }
    }

    pegs.into_iter()
        .zip(assigned)
        .map(|(peg, color)| peg.with_color(color % colors))
        .collect()
}

/// Most populated color passing `filter`
fn best_donor(counts: &[usize], filter: impl Fn(usize) -> bool) -> Option<usize> {
    (0..counts.len())
        .filter(|&d| filter(d))
        .max_by_key(|&d| counts[d])
}

/// Full balancing pipeline
pub fn balance_colors(pegs: Vec<Peg>, canvas: Vec2, colors: usize, level: u32, rng: &mut impl Rng) -> Vec<Peg> {
    let pegs = clamp_colors(pegs, colors);
    let pegs = if level > 3 {
        apply_gradient(pegs, canvas, colors, level, rng)
    } else {
        pegs
    };
    enforce_minimum_per_color(pegs, colors, level, rng)
}
