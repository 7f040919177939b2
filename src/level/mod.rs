//! Level generation module
//!
//! Everything that decides where pegs go and what color they are:
//! - Pattern catalog and difficulty-weighted selection
//! - Canvas partitioning into (possibly rotated, overlapping) sections
//! - Per-level assembly with noise, filler and challenge clusters
//! - Color balancing and completion thresholds
//!
//! No physics or rendering dependencies. Each `Generator` owns its RNG, so
//! separate generators never share state.

pub mod assembler;
pub mod colors;
pub mod geometry;
pub mod patterns;
pub mod peg;
pub mod sections;
pub mod selector;
pub mod thresholds;

pub use assembler::{
    ChallengeKind, Generator, LevelStrategy, apply_noise, challenge_cluster, ensure_minimum_pegs,
};
pub use colors::{
    Blend, Gradient, apply_gradient, balance_colors, clamp_colors, enforce_minimum_per_color,
    minimum_per_color,
};
pub use geometry::{Rect, filter_edges, remove_overlaps};
pub use patterns::{PatternKind, Radial};
pub use peg::{LevelContext, LevelLayout, Peg, Section, available_colors, minimum_peg_count};
pub use sections::{
    create_overlapping_sections, divide_canvas_into_sections, generate_pattern_in_section,
};
pub use selector::{select_patterns_by_difficulty, select_random_patterns_for_level};
pub use thresholds::{base_threshold, color_thresholds};
