//! Canvas partitioning and per-section pattern placement
//!
//! The playable area is split into sections (simple split, jittered grid,
//! columns or organic subdivision). Each section scopes one pattern; higher
//! levels may rotate sections or add overlapping ones.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use super::geometry::Rect;
use super::patterns::{self, PatternKind, Radial};
use super::peg::{Peg, Section};
use crate::random_between;

/// Maximum section tilt (radians, either direction)
pub const MAX_SECTION_ROTATION: f32 = 15.0 * PI / 180.0;
/// Fixed gap left between halves during organic subdivision
pub const ORGANIC_GAP: f32 = 20.0;
/// Fraction of the smaller section side used as pattern radius
pub const SECTION_RADIUS_FRACTION: f32 = 0.45;

/// How a multi-section layout is partitioned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    JitteredGrid,
    Columns,
    Organic,
}

/// Split `area` into `count` sections
///
/// Sections may be tilted on levels above 5 when they are small relative to
/// the area.
pub fn divide_canvas_into_sections(area: &Rect, count: usize, level: u32, rng: &mut impl Rng) -> Vec<Section> {
    let rects = match count {
        0 | 1 => vec![*area],
        2 => split_in_two(area, rng),
        _ => {
            let partition = match rng.random_range(0..3) {
                0 => Partition::JitteredGrid,
                1 => Partition::Columns,
                _ => Partition::Organic,
            };
            log::debug!("Partitioning {} sections as {:?}", count, partition);
            match partition {
                Partition::JitteredGrid => jittered_grid(area, count, rng),
                Partition::Columns => columns(area, count, rng),
                Partition::Organic => organic(area, count, rng),
            }
        }
    };

    rects
        .into_iter()
        .map(|rect| Section {
            rect,
            rotation: random_rotation(area, &rect, level, rng),
        })
        .collect()
}

fn random_rotation(area: &Rect, rect: &Rect, level: u32, rng: &mut impl Rng) -> Option<f32> {
    let small = rect.width() < area.width() * 0.6 && rect.height() < area.height() * 0.6;
    if level > 5 && small && rng.random_bool(0.3) {
        Some(random_between(rng, -MAX_SECTION_ROTATION, MAX_SECTION_ROTATION))
    } else {
        None
    }
}

/// Halve the area vertically or horizontally with a jittered split and a 30-50px gap
fn split_in_two(area: &Rect, rng: &mut impl Rng) -> Vec<Rect> {
    let split = 0.5 + random_between(rng, -0.1, 0.1);
    let half_gap = random_between(rng, 30.0, 50.0) * 0.5;

    if rng.random_bool(0.5) {
        let x = area.min.x + area.width() * split;
        vec![
            Rect::from_corners(area.min, Vec2::new(x - half_gap, area.max.y)),
            Rect::from_corners(Vec2::new(x + half_gap, area.min.y), area.max),
        ]
    } else {
        let y = area.min.y + area.height() * split;
        vec![
            Rect::from_corners(area.min, Vec2::new(area.max.x, y - half_gap)),
            Rect::from_corners(Vec2::new(area.min.x, y + half_gap), area.max),
        ]
    }
}

fn jittered_grid(area: &Rect, count: usize, rng: &mut impl Rng) -> Vec<Rect> {
    let rows = (count as f32).sqrt().ceil() as usize;
    let cols = count.div_ceil(rows);
    let cell = Vec2::new(area.width() / cols as f32, area.height() / rows as f32);
    let shrunk = cell * 0.9;

    (0..count)
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            let jitter = Vec2::new(
                random_between(rng, 0.0, cell.x - shrunk.x),
                random_between(rng, 0.0, cell.y - shrunk.y),
            );
            let origin = area.min + Vec2::new(col as f32, row as f32) * cell + jitter;
            Rect::new(origin, shrunk.x, shrunk.y)
        })
        .collect()
}

fn columns(area: &Rect, count: usize, rng: &mut impl Rng) -> Vec<Rect> {
    let gap = 10.0_f32.min(area.width() / (count as f32 * 4.0));
    let usable = area.width() - gap * (count - 1) as f32;
    let weights: Vec<f32> = (0..count).map(|_| random_between(rng, 0.6, 1.4)).collect();
    let total: f32 = weights.iter().sum();

    let mut x = area.min.x;
    weights
        .iter()
        .map(|w| {
            let width = usable * w / total;
            let rect = Rect::new(Vec2::new(x, area.min.y), width, area.height());
            x += width + gap;
            rect
        })
        .collect()
}

/// Repeatedly split the largest section along its longer axis
fn organic(area: &Rect, count: usize, rng: &mut impl Rng) -> Vec<Rect> {
    let mut rects = vec![*area];

    while rects.len() < count {
        let Some((largest, _)) = rects
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.area().total_cmp(&b.1.area()))
        else {
            break;
        };
        let rect = rects.swap_remove(largest);
        let at = random_between(rng, 0.3, 0.7);
        let half_gap = ORGANIC_GAP * 0.5;

        if rect.width() >= rect.height() {
            let x = rect.min.x + rect.width() * at;
            rects.push(Rect::from_corners(rect.min, Vec2::new(x - half_gap, rect.max.y)));
            rects.push(Rect::from_corners(Vec2::new(x + half_gap, rect.min.y), rect.max));
        } else {
            let y = rect.min.y + rect.height() * at;
            rects.push(Rect::from_corners(rect.min, Vec2::new(rect.max.x, y - half_gap)));
            rects.push(Rect::from_corners(Vec2::new(rect.min.x, y + half_gap), rect.max));
        }
    }

    // Trim the smallest if we ever overshoot
    rects.sort_by(|a, b| b.area().total_cmp(&a.area()));
    rects.truncate(count);
    rects
}

/// Base partition plus up to three freely placed sections that may overlap it
pub fn create_overlapping_sections(area: &Rect, count: usize, level: u32, rng: &mut impl Rng) -> Vec<Section> {
    let mut sections = divide_canvas_into_sections(area, count, level, rng);
    let extra = (level as usize / 4).min(3);

    for _ in 0..extra {
        let width = area.width() * random_between(rng, 0.3, 0.7);
        let height = area.height() * random_between(rng, 0.3, 0.7);
        let origin = Vec2::new(
            random_between(rng, area.min.x, area.max.x - width),
            random_between(rng, area.min.y, area.max.y - height),
        );
        let rect = Rect::new(origin, width, height);
        sections.push(Section {
            rect,
            rotation: random_rotation(area, &rect, level, rng),
        });
    }

    log::debug!("{} sections ({} overlapping) for level {}", sections.len(), extra, level);
    sections
}

/// Spiral turns for a level
fn spiral_turns(level: u32) -> f32 {
    (2.0 + level as f32 / 5.0).min(5.0)
}

/// Render one pattern into a section, adapting parameters to the pattern's shape
pub fn generate_pattern_in_section(
    kind: PatternKind,
    section: &Section,
    spacing: f32,
    level: u32,
    colors: usize,
    rng: &mut impl Rng,
) -> Vec<Peg> {
    let spacing = patterns::safe_spacing(spacing);
    let rect = &section.rect;
    let radius = rect.width().min(rect.height()) * SECTION_RADIUS_FRACTION;
    let radial = Radial::new(section.center(), radius, spacing);

    let pegs = match kind {
        PatternKind::Grid => patterns::grid(&fitted_lattice(rect, spacing), spacing, 1.0, colors, rng),
        PatternKind::Checkerboard => {
            patterns::checkerboard(&fitted_lattice(rect, spacing), spacing, 1.0, colors, rng)
        }
        PatternKind::Diamond => patterns::diamond(&radial, colors, rng),
        PatternKind::Concentric => patterns::concentric(&radial, colors),
        PatternKind::Hourglass => patterns::hourglass(&radial, colors),
        PatternKind::Spiral => patterns::spiral(&radial, spiral_turns(level), colors, rng),
        PatternKind::Vortex => patterns::vortex(&radial, spiral_turns(level), 3, colors),
        PatternKind::Wave => {
            let waves = 1.0 + (level / 4).min(3) as f32;
            patterns::wave(rect, spacing, waves, colors, rng)
        }
        PatternKind::Tunnel => patterns::tunnel(&radial, rng.random_bool(0.5), colors, rng),
        PatternKind::Zigzag => patterns::zigzag(rect, spacing, colors),
        PatternKind::Maze => patterns::maze(rect, spacing, colors, rng),
        PatternKind::Random => {
            let count = ((rect.area() / (spacing * spacing)) * 0.35).round().max(1.0) as usize;
            patterns::random(rect, count, spacing, colors, rng)
        }
        PatternKind::Clustered => {
            let clusters = (2 + level as usize / 5).min(5);
            patterns::clustered(rect, clusters, spacing, colors, rng)
        }
    };

    log::debug!("{} placed {} pegs", kind.as_str(), pegs.len());
    section.apply_rotation(pegs)
}

/// Largest spacing-aligned box that fits in `rect`, centered in it
fn fitted_lattice(rect: &Rect, spacing: f32) -> Rect {
    let cols = (rect.width() / spacing).floor().max(0.0);
    let rows = (rect.height() / spacing).floor().max(0.0);
    let size = Vec2::new(cols, rows) * spacing;
    let origin = rect.center() - size * 0.5;
    Rect::new(origin, size.x, size.y)
}
