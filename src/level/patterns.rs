//! Peg placement patterns
//!
//! Each pattern is a free function from placement parameters to a list of
//! pegs with provisional colors in `[0, colors)`. Patterns anchored at a
//! point take a [`Radial`]; patterns spanning a box take a [`Rect`].
//! Randomness only comes from the `rng` argument.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, is_clear_of, remove_overlaps};
use super::peg::Peg;
use crate::consts::{MIN_PATTERN_RADIUS, MIN_PATTERN_SPACING};
use crate::polar_to_cartesian;

/// Angular step between consecutive spiral samples (radians)
pub const SPIRAL_ANGLE_STEP: f32 = 0.5;
/// Pegs scattered around each cluster center
pub const PEGS_PER_CLUSTER: usize = 15;
/// Chance a cluster peg takes its cluster's primary color
pub const CLUSTER_PRIMARY_CHANCE: f64 = 0.7;
/// Corridor width of a tunnel, in spacings
pub const TUNNEL_GAP_SPACINGS: f32 = 3.0;
/// Rejection-sampling budget per requested random peg
pub const RANDOM_ATTEMPTS_PER_PEG: usize = 10;

/// The pattern catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    Grid,
    Checkerboard,
    Diamond,
    Spiral,
    Tunnel,
    Wave,
    Vortex,
    Concentric,
    Zigzag,
    Hourglass,
    Maze,
    Random,
    Clustered,
}

impl PatternKind {
    pub const ALL: [PatternKind; 13] = [
        PatternKind::Grid,
        PatternKind::Checkerboard,
        PatternKind::Diamond,
        PatternKind::Spiral,
        PatternKind::Tunnel,
        PatternKind::Wave,
        PatternKind::Vortex,
        PatternKind::Concentric,
        PatternKind::Zigzag,
        PatternKind::Hourglass,
        PatternKind::Maze,
        PatternKind::Random,
        PatternKind::Clustered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Grid => "grid",
            PatternKind::Checkerboard => "checkerboard",
            PatternKind::Diamond => "diamond",
            PatternKind::Spiral => "spiral",
            PatternKind::Tunnel => "tunnel",
            PatternKind::Wave => "wave",
            PatternKind::Vortex => "vortex",
            PatternKind::Concentric => "concentric",
            PatternKind::Zigzag => "zigzag",
            PatternKind::Hourglass => "hourglass",
            PatternKind::Maze => "maze",
            PatternKind::Random => "random",
            PatternKind::Clustered => "clustered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.iter().copied().find(|kind| kind.as_str() == s)
    }

    /// Fixed difficulty rating on a 1-10 scale
    pub fn difficulty(&self) -> u32 {
        match self {
            PatternKind::Grid => 1,
            PatternKind::Checkerboard => 2,
            PatternKind::Diamond => 3,
            PatternKind::Tunnel => 3,
            PatternKind::Wave => 4,
            PatternKind::Random => 4,
            PatternKind::Concentric => 5,
            PatternKind::Zigzag => 5,
            PatternKind::Spiral => 6,
            PatternKind::Hourglass => 6,
            PatternKind::Clustered => 7,
            PatternKind::Vortex => 8,
            PatternKind::Maze => 9,
        }
    }
}

/// Placement anchored at a center point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radial {
    pub center: Vec2,
    pub radius: f32,
    pub spacing: f32,
}

impl Radial {
    pub fn new(center: Vec2, radius: f32, spacing: f32) -> Self {
        Self {
            center,
            radius: radius.max(MIN_PATTERN_RADIUS),
            spacing: safe_spacing(spacing),
        }
    }

    /// Lattice steps that fit inside the radius (at least one)
    fn steps(&self) -> i32 {
        ((self.radius / self.spacing).floor() as i32).max(1)
    }
}

/// Floor spacing so lattice loops always terminate
#[inline]
pub fn safe_spacing(spacing: f32) -> f32 {
    if spacing.is_finite() {
        spacing.max(MIN_PATTERN_SPACING)
    } else {
        MIN_PATTERN_SPACING
    }
}

#[inline]
fn random_color(rng: &mut impl Rng, colors: usize) -> usize {
    rng.random_range(0..colors.max(1))
}

/// Lattice points counted along one side of a box (at least one)
#[inline]
fn lattice_count(extent: f32, spacing: f32) -> usize {
    (extent.max(0.0) / spacing).floor() as usize + 1
}

/// Lattice from the top-left corner of `rect`; each point kept with probability `density`
pub fn grid(rect: &Rect, spacing: f32, density: f32, colors: usize, rng: &mut impl Rng) -> Vec<Peg> {
    lattice(rect, spacing, density, colors, rng, |_, _| true)
}

/// Grid restricted to cells where `row + col` is even
pub fn checkerboard(rect: &Rect, spacing: f32, density: f32, colors: usize, rng: &mut impl Rng) -> Vec<Peg> {
    lattice(rect, spacing, density, colors, rng, |row, col| (row + col) % 2 == 0)
}

fn lattice(
    rect: &Rect,
    spacing: f32,
    density: f32,
    colors: usize,
    rng: &mut impl Rng,
    keep: impl Fn(usize, usize) -> bool,
) -> Vec<Peg> {
    let spacing = safe_spacing(spacing);
    let cols = lattice_count(rect.width(), spacing);
    let rows = lattice_count(rect.height(), spacing);
    let mut pegs = Vec::with_capacity(cols.saturating_mul(rows));

    for row in 0..rows {
        for col in 0..cols {
            if !keep(row, col) || rng.random::<f32>() >= density {
                continue;
            }
            let pos = rect.min + Vec2::new(col as f32, row as f32) * spacing;
            pegs.push(Peg::new(pos, random_color(rng, colors)));
        }
    }
    pegs
}

/// Rhombus of lattice points; row width shrinks linearly away from the center row
pub fn diamond(params: &Radial, colors: usize, rng: &mut impl Rng) -> Vec<Peg> {
    let steps = params.steps();
    let mut pegs = Vec::new();

    for row in -steps..=steps {
        let half = steps - row.abs();
        for col in -half..=half {
            let pos = params.center + Vec2::new(col as f32, row as f32) * params.spacing;
            pegs.push(Peg::new(pos, random_color(rng, colors)));
        }
    }
    pegs
}

/// Archimedean spiral sampled at fixed angular steps
pub fn spiral(params: &Radial, turns: f32, colors: usize, rng: &mut impl Rng) -> Vec<Peg> {
    spiral_arm(params, turns, 0.0)
        .into_iter()
        .map(|pos| Peg::new(pos, random_color(rng, colors)))
        .collect()
}

/// Interleaved spiral arms; each arm gets its own color
pub fn vortex(params: &Radial, turns: f32, arms: usize, colors: usize) -> Vec<Peg> {
    let arms = arms.max(1);
    let colors = colors.max(1);
    let mut pegs = Vec::new();

    for arm in 0..arms {
        let offset = arm as f32 * TAU / arms as f32;
        pegs.extend(
            spiral_arm(params, turns, offset)
                .into_iter()
                .map(|pos| Peg::new(pos, arm % colors)),
        );
    }
    pegs
}

fn spiral_arm(params: &Radial, turns: f32, phase: f32) -> Vec<Vec2> {
    let total_angle = turns.max(0.25) * TAU;
    // distance = growth * angle reaches the radius after all turns
    let growth = params.radius / total_angle;
    let samples = (total_angle / SPIRAL_ANGLE_STEP).floor() as usize;

    (1..=samples)
        .filter_map(|i| {
            let angle = i as f32 * SPIRAL_ANGLE_STEP;
            let distance = growth * angle;
            (distance >= params.spacing * 0.5)
                .then(|| params.center + polar_to_cartesian(distance, angle + phase))
        })
        .collect()
}

/// Two parallel peg lines forming a corridor through the center
pub fn tunnel(params: &Radial, horizontal: bool, colors: usize, rng: &mut impl Rng) -> Vec<Peg> {
    let steps = params.steps();
    let half_gap = params.spacing * TUNNEL_GAP_SPACINGS * 0.5;
    let mut pegs = Vec::new();

    for side in [-1.0, 1.0] {
        for i in -steps..=steps {
            let along = i as f32 * params.spacing;
            let offset = if horizontal {
                Vec2::new(along, side * half_gap)
            } else {
                Vec2::new(side * half_gap, along)
            };
            pegs.push(Peg::new(params.center + offset, random_color(rng, colors)));
        }
    }
    pegs
}

/// One peg per column on a sine wave, thickened by a peg above and below
pub fn wave(rect: &Rect, spacing: f32, waves: f32, colors: usize, rng: &mut impl Rng) -> Vec<Peg> {
    let spacing = safe_spacing(spacing);
    let cols = lattice_count(rect.width(), spacing);
    let amplitude = rect.height() * 0.3;
    let mid_y = rect.center().y;
    let mut pegs = Vec::with_capacity(cols * 3);

    for col in 0..cols {
        let t = col as f32 / cols as f32;
        let x = rect.min.x + col as f32 * spacing;
        let y = mid_y + amplitude * (t * waves * TAU).sin();
        for dy in [0.0, -spacing, spacing] {
            pegs.push(Peg::new(Vec2::new(x, y + dy), random_color(rng, colors)));
        }
    }
    pegs
}

/// Rings of pegs; ring `i` gets color `i % colors`
pub fn concentric(params: &Radial, colors: usize) -> Vec<Peg> {
    let colors = colors.max(1);
    let rings = params.steps() as usize;
    let mut pegs = vec![Peg::new(params.center, 0)];

    for ring in 1..=rings {
        let r = ring as f32 * params.spacing;
        let count = ((TAU * r / params.spacing).floor() as usize).max(1);
        for i in 0..count {
            let angle = i as f32 * TAU / count as f32;
            pegs.push(Peg::new(
                params.center + polar_to_cartesian(r, angle),
                ring % colors,
            ));
        }
    }
    pegs
}

/// Vertical peg lines; odd columns are shifted by half a step
pub fn zigzag(rect: &Rect, spacing: f32, colors: usize) -> Vec<Peg> {
    let spacing = safe_spacing(spacing);
    let colors = colors.max(1);
    let cols = lattice_count(rect.width(), spacing);
    let mut pegs = Vec::new();

    for col in 0..cols {
        let offset = if col % 2 == 1 { spacing * 0.5 } else { 0.0 };
        let rows = lattice_count(rect.height() - offset, spacing);
        for row in 0..rows {
            let pos = rect.min + Vec2::new(col as f32 * spacing, offset + row as f32 * spacing);
            pegs.push(Peg::new(pos, (col + row) % colors));
        }
    }
    pegs
}

/// Rows pinched at the vertical center and widening toward top and bottom
pub fn hourglass(params: &Radial, colors: usize) -> Vec<Peg> {
    let colors = colors.max(1) as i32;
    let steps = params.steps();
    let mut pegs = Vec::new();

    for row in -steps..=steps {
        let half = row.abs().clamp(1, steps);
        for col in -half..=half {
            let pos = params.center + Vec2::new(col as f32, row as f32) * params.spacing;
            let color = (row.abs() + col.abs()) % colors;
            pegs.push(Peg::new(pos, color as usize));
        }
    }
    pegs
}

/// Wall cells of a random maze on the spacing lattice
///
/// Every other row and column seeds a wall cell which is then extended one
/// cell down or right at random.
pub fn maze(rect: &Rect, spacing: f32, colors: usize, rng: &mut impl Rng) -> Vec<Peg> {
    let spacing = safe_spacing(spacing);
    let colors = colors.max(1);
    let cols = lattice_count(rect.width(), spacing);
    let rows = lattice_count(rect.height(), spacing);
    let mut walls = vec![false; cols * rows];

    for row in (0..rows).step_by(2) {
        for col in (0..cols).step_by(2) {
            walls[row * cols + col] = true;
            let (r, c) = if rng.random_bool(0.5) { (row + 1, col) } else { (row, col + 1) };
            if r < rows && c < cols {
                walls[r * cols + c] = true;
            }
        }
    }

    let mut pegs = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            if walls[row * cols + col] {
                let pos = rect.min + Vec2::new(col as f32, row as f32) * spacing;
                pegs.push(Peg::new(pos, (row + col) % colors));
            }
        }
    }
    pegs
}

/// Rejection-sampled points at least `min_distance` apart
///
/// `count` is capped by what `rect` can hold at that distance. Gives up after
/// `count * 10` attempts and returns what it has.
pub fn random(rect: &Rect, count: usize, min_distance: f32, colors: usize, rng: &mut impl Rng) -> Vec<Peg> {
    let count = count.min(rect.capacity(min_distance.max(MIN_PATTERN_RADIUS)));
    let mut pegs: Vec<Peg> = Vec::with_capacity(count);
    let max_attempts = count.saturating_mul(RANDOM_ATTEMPTS_PER_PEG);
    let mut attempts = 0;

    while pegs.len() < count && attempts < max_attempts {
        attempts += 1;
        let pos = rect.random_point(rng);
        if is_clear_of(pos, &pegs, min_distance) {
            pegs.push(Peg::new(pos, random_color(rng, colors)));
        }
    }

    if pegs.len() < count {
        log::debug!("random pattern placed {}/{} pegs", pegs.len(), count);
    }
    pegs
}

/// Pegs gathered around random cluster centers, mostly in each cluster's color
pub fn clustered(rect: &Rect, clusters: usize, spacing: f32, colors: usize, rng: &mut impl Rng) -> Vec<Peg> {
    let spacing = safe_spacing(spacing);
    let cluster_radius = (rect.width().min(rect.height()) * 0.25).max(spacing);
    let mut pegs = Vec::with_capacity(clusters * PEGS_PER_CLUSTER);

    for _ in 0..clusters {
        let center = rect.random_point(rng);
        let primary = random_color(rng, colors);

        for _ in 0..PEGS_PER_CLUSTER {
            let angle = rng.random::<f32>() * TAU;
            // Density falls off away from the center
            let distance = cluster_radius * (1.0 - rng.random::<f32>().sqrt());
            let color = if rng.random_bool(CLUSTER_PRIMARY_CHANCE) {
                primary
            } else {
                random_color(rng, colors)
            };
            pegs.push(Peg::new(center + polar_to_cartesian(distance, angle), color));
        }
    }

    remove_overlaps(pegs, spacing * 0.8)
}
