//! Generator settings
//!
//! Fixed for the lifetime of a generator. Persisted as JSON so the game
//! client and the preview CLI can share one canvas description.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::level::geometry::Rect;

/// Canvas description and peg size used by the level generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Physical peg radius (pixels)
    pub peg_radius: f32,
    /// Canvas width (pixels)
    pub canvas_width: f32,
    /// Canvas height (pixels)
    pub canvas_height: f32,

    // === Margins ===
    /// Left and right margin
    pub side_margin: f32,
    /// Top margin reserved for the launcher
    pub launcher_margin: f32,
    /// Bottom margin reserved for the bucket
    pub bucket_margin: f32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            peg_radius: DEFAULT_PEG_RADIUS,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,

            side_margin: SIDE_MARGIN,
            launcher_margin: LAUNCHER_MARGIN,
            bucket_margin: BUCKET_MARGIN,
        }
    }
}

impl GeneratorSettings {
    /// Settings for a canvas with default margins
    pub fn new(peg_radius: f32, canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            peg_radius,
            canvas_width,
            canvas_height,
            ..Self::default()
        }
    }

    /// Clamp degenerate or oversized values so every loop bound derived from them is sane
    pub fn sanitized(&self) -> Self {
        let peg_radius = finite_or(self.peg_radius, DEFAULT_PEG_RADIUS).max(1.0);
        let side_margin = finite_or(self.side_margin, SIDE_MARGIN).max(0.0);
        let launcher_margin = finite_or(self.launcher_margin, LAUNCHER_MARGIN).max(0.0);
        let bucket_margin = finite_or(self.bucket_margin, BUCKET_MARGIN).max(0.0);

        // Leave at least a few pegs' worth of playable room after the edge inset,
        // and never so much that pattern lattices blow up
        let min_playable = peg_radius * 12.0;
        let max_playable = peg_radius * MAX_PLAYABLE_PEG_RADII;
        let clamp_extent = |canvas: f32, margins: f32| {
            let canvas = if canvas.is_nan() { 0.0 } else { canvas };
            canvas.clamp(margins + min_playable, margins + max_playable)
        };
        let canvas_width = clamp_extent(self.canvas_width, side_margin * 2.0);
        let canvas_height = clamp_extent(self.canvas_height, launcher_margin + bucket_margin);

        Self {
            peg_radius,
            canvas_width,
            canvas_height,
            side_margin,
            launcher_margin,
            bucket_margin,
        }
    }

    /// Canvas minus launcher, bucket and side margins
    pub fn playable_area(&self) -> Rect {
        Rect::from_corners(
            glam::Vec2::new(self.side_margin, self.launcher_margin),
            glam::Vec2::new(
                self.canvas_width - self.side_margin,
                self.canvas_height - self.bucket_margin,
            ),
        )
    }

    /// Region every final peg must lie in (playable area inset by two peg radii)
    pub fn clearance_area(&self) -> Rect {
        self.playable_area().inset(self.peg_radius * 2.0)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Self>(&json) {
                Ok(settings) => {
                    log::info!("Loaded generator settings from {}", path.display());
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Ignoring malformed settings {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read settings {}: {}", path.display(), e),
        }

        log::info!("Using default generator settings");
        Self::default()
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Generator settings saved to {}", path.display());
        Ok(())
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}
