//! Level data types
//!
//! Everything the game client consumes from the generator lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::MAX_COLORS;
use crate::rotate_about;

/// A single colored peg
///
/// Pegs are plain values: recoloring yields a new peg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    /// Palette index; always below the level's available color count once returned
    pub color: usize,
}

impl Peg {
    pub fn new(pos: Vec2, color: usize) -> Self {
        Self { pos, color }
    }

    /// Same position, different color
    #[inline]
    pub fn with_color(self, color: usize) -> Self {
        Self { color, ..self }
    }

    /// Same color, different position
    #[inline]
    pub fn with_pos(self, pos: Vec2) -> Self {
        Self { pos, ..self }
    }
}

/// A sub-region of the playable area scoping one pattern instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub rect: Rect,
    /// Rotation about the section center (radians), applied after placement
    pub rotation: Option<f32>,
}

impl Section {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            rotation: None,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Rotate generated pegs about the section center when the section is rotated
    pub fn apply_rotation(&self, pegs: Vec<Peg>) -> Vec<Peg> {
        match self.rotation {
            Some(angle) if angle != 0.0 => {
                let center = self.center();
                pegs.into_iter()
                    .map(|p| p.with_pos(rotate_about(p.pos, center, angle)))
                    .collect()
            }
            _ => pegs,
        }
    }
}

/// Number of distinct peg colors unlocked at a level (4, 6 or 8)
pub fn available_colors(level: u32) -> usize {
    match level {
        0..=2 => 4,
        3..=10 => 6,
        _ => MAX_COLORS,
    }
}

/// Nominal peg count a level should reach
pub fn minimum_peg_count(level: u32) -> usize {
    let steps = level.max(1) as usize - 1;
    steps.saturating_mul(5).saturating_add(35).min(120)
}

/// Everything derived from the level number for one generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelContext {
    pub level: u32,
    pub available_colors: usize,
    pub min_pegs: usize,
    /// Nominal distance between neighbouring pegs
    pub spacing: f32,
    /// Smallest spacing any top-up pass may shrink to
    pub spacing_floor: f32,
    /// Scalar biasing pattern choice toward harder layouts
    pub difficulty_factor: f32,
}

impl LevelContext {
    pub fn new(level: u32, peg_radius: f32) -> Self {
        let level = level.max(1);
        let spacing_floor = peg_radius * 3.0;
        let spacing = (peg_radius * 4.5 - peg_radius * 0.08 * (level - 1) as f32).max(spacing_floor);

        Self {
            level,
            available_colors: available_colors(level),
            min_pegs: minimum_peg_count(level),
            spacing,
            spacing_floor,
            difficulty_factor: level as f32 / 2.0,
        }
    }
}

/// A generated level as handed to the game client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    pub level: u32,
    pub available_colors: usize,
    pub pegs: Vec<Peg>,
    /// Fraction of each color's pegs that must be hit; entries past
    /// `available_colors` are unused
    pub thresholds: [f32; MAX_COLORS],
}

impl LevelLayout {
    /// Peg count per available color
    pub fn color_counts(&self) -> Vec<usize> {
        color_counts(&self.pegs, self.available_colors)
    }
}

/// Count pegs per color index (out-of-range colors are ignored)
pub fn color_counts(pegs: &[Peg], colors: usize) -> Vec<usize> {
    let mut counts = vec![0; colors];
    for peg in pegs {
        if let Some(c) = counts.get_mut(peg.color) {
            *c += 1;
        }
    }
    counts
}
