//! Level assembly
//!
//! `Generator::generate_level` picks a strategy from the level number,
//! renders patterns into sections, layers noise, filler and challenge pegs,
//! filters for spacing and edge clearance, tops up to the level minimum and
//! finally balances colors.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::colors::balance_colors;
use super::geometry::{Rect, filter_edges, is_clear_of, remove_overlaps};
use super::patterns::{self, PatternKind};
use super::peg::{LevelContext, LevelLayout, Peg, Section, available_colors, minimum_peg_count};
use super::sections::{create_overlapping_sections, divide_canvas_into_sections, generate_pattern_in_section};
use super::selector::{select_patterns_by_difficulty, select_random_patterns_for_level};
use super::thresholds::color_thresholds;
use crate::consts::MAX_COLORS;
use crate::settings::GeneratorSettings;
use crate::{polar_to_cartesian, random_between};

/// Rows in the opening level's grid
pub const FIRST_LEVEL_ROWS: usize = 6;
/// Density of the opening level's grid
pub const FIRST_LEVEL_DENSITY: f32 = 0.8;
/// Patterns eligible for the two-section second level
pub const SIMPLE_PATTERNS: [PatternKind; 3] =
    [PatternKind::Grid, PatternKind::Checkerboard, PatternKind::Diamond];
/// Overlap filter distance as a fraction of the level spacing
pub const OVERLAP_FACTOR: f32 = 0.8;
/// Filler pegs keep this many spacings from everything else
pub const FILLER_SPACING_FACTOR: f32 = 1.2;
/// Rejection-sampling budget per missing filler peg
pub const FILLER_ATTEMPTS_PER_PEG: usize = 20;

/// How a level's layout is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStrategy {
    /// Level 1: one centered grid
    SingleGrid,
    /// Level 2: two sections of simple patterns
    SimpleSplit,
    /// Level 3: two or three sections of moderate patterns
    Mixed,
    /// Level 4+: full procedural composition
    Procedural,
}

impl LevelStrategy {
    pub fn for_level(level: u32) -> Self {
        match level {
            0 | 1 => LevelStrategy::SingleGrid,
            2 => LevelStrategy::SimpleSplit,
            3 => LevelStrategy::Mixed,
            _ => LevelStrategy::Procedural,
        }
    }
}

/// Dense formation dropped somewhere on levels above 5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    Radial,
    Line,
    Square,
    Spiral,
}

impl ChallengeKind {
    pub fn for_level(level: u32) -> Self {
        match level % 4 {
            0 => ChallengeKind::Radial,
            1 => ChallengeKind::Line,
            2 => ChallengeKind::Square,
            _ => ChallengeKind::Spiral,
        }
    }
}

/// Procedural level generator
///
/// Owns its own RNG; give each thread its own generator. Not `Clone`, since a
/// copy would replay the same random stream.
#[derive(Debug)]
pub struct Generator {
    settings: GeneratorSettings,
    rng: Pcg32,
}

impl Generator {
    /// Generator for a canvas with default margins, seeded from OS entropy
    pub fn new(peg_radius: f32, canvas_width: f32, canvas_height: f32) -> Self {
        Self::from_settings(GeneratorSettings::new(peg_radius, canvas_width, canvas_height))
    }

    pub fn from_settings(settings: GeneratorSettings) -> Self {
        Self {
            settings: settings.sanitized(),
            rng: Pcg32::from_os_rng(),
        }
    }

    /// Seeded generator (previews and tests)
    pub fn with_seed(settings: GeneratorSettings, seed: u64) -> Self {
        Self {
            settings: settings.sanitized(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Distance no two returned pegs are ever closer than
    pub fn min_separation(&self) -> f32 {
        self.settings.peg_radius * 3.0 * OVERLAP_FACTOR
    }

    pub fn available_colors(&self, level: u32) -> usize {
        available_colors(level)
    }

    pub fn minimum_peg_count(&self, level: u32) -> usize {
        minimum_peg_count(level)
    }

    /// Per-color hit fractions; slots past the level's colors are unused
    pub fn color_thresholds(&mut self, level: u32) -> [f32; MAX_COLORS] {
        color_thresholds(level, &mut self.rng)
    }

    /// Pegs plus thresholds for one level
    pub fn generate_layout(&mut self, level: u32) -> LevelLayout {
        let level = level.max(1);
        let pegs = self.generate_level(level);
        LevelLayout {
            level,
            available_colors: available_colors(level),
            pegs,
            thresholds: self.color_thresholds(level),
        }
    }

    /// Generate the final, color-balanced peg list for a level
    pub fn generate_level(&mut self, level: u32) -> Vec<Peg> {
        let ctx = LevelContext::new(level, self.settings.peg_radius);
        let area = self.settings.playable_area();
        let clearance = self.settings.clearance_area();
        let canvas = Vec2::new(self.settings.canvas_width, self.settings.canvas_height);
        let rng = &mut self.rng;

        let strategy = LevelStrategy::for_level(ctx.level);
        let raw = match strategy {
            LevelStrategy::SingleGrid => first_level(&ctx, &clearance, rng),
            LevelStrategy::SimpleSplit => second_level(&ctx, &area, rng),
            LevelStrategy::Mixed => third_level(&ctx, &area, rng),
            LevelStrategy::Procedural => procedural_level(&ctx, &area, &clearance, rng),
        };
        let raw_count = raw.len();

        let pegs = remove_overlaps(raw, ctx.spacing * OVERLAP_FACTOR);
        let pegs = filter_edges(pegs, &clearance);
        let pegs = ensure_minimum_pegs(pegs, &ctx, &clearance, rng);
        let pegs = balance_colors(pegs, canvas, ctx.available_colors, ctx.level, rng);

        log::info!(
            "Level {}: {:?}, {} pegs ({} raw, min {}), {} colors, spacing {:.1}",
            ctx.level,
            strategy,
            pegs.len(),
            raw_count,
            ctx.min_pegs,
            ctx.available_colors,
            ctx.spacing
        );
        pegs
    }
}

/// One grid, six rows, centered horizontally near the top
fn first_level(ctx: &LevelContext, clearance: &Rect, rng: &mut impl Rng) -> Vec<Peg> {
    let spacing = ctx.spacing;
    let width = (clearance.width() / spacing).floor() * spacing;
    let origin = Vec2::new(clearance.center().x - width * 0.5, clearance.min.y + spacing * 0.5);
    // Half a spacing of slack keeps the row count exact under rounding
    let height = (FIRST_LEVEL_ROWS - 1) as f32 * spacing + spacing * 0.5;
    let rect = Rect::new(origin, width, height);

    patterns::grid(&rect, spacing, FIRST_LEVEL_DENSITY, ctx.available_colors, rng)
}

/// Two sections filled with distinct simple patterns
fn second_level(ctx: &LevelContext, area: &Rect, rng: &mut impl Rng) -> Vec<Peg> {
    let sections = divide_canvas_into_sections(area, 2, ctx.level, rng);
    let mut kinds: Vec<PatternKind> = select_patterns_by_difficulty(ctx.difficulty_factor)
        .into_iter()
        .filter(|kind| SIMPLE_PATTERNS.contains(kind))
        .collect();
    kinds.shuffle(rng);
    if kinds.len() < 2 {
        log::debug!("Too few simple patterns, falling back to random");
        kinds = vec![PatternKind::Random; 2];
    }

    render_sections(ctx, &sections, &kinds, false, rng)
}

/// Two or three sections of moderately difficult patterns
fn third_level(ctx: &LevelContext, area: &Rect, rng: &mut impl Rng) -> Vec<Peg> {
    let count = rng.random_range(2..=3);
    let mut kinds: Vec<PatternKind> = PatternKind::ALL
        .iter()
        .copied()
        .filter(|kind| (2..=6).contains(&kind.difficulty()))
        .collect();
    if kinds.len() < count {
        kinds = PatternKind::ALL.to_vec();
    }
    kinds.shuffle(rng);
    kinds.truncate(count);

    let sections = divide_canvas_into_sections(area, count, ctx.level, rng);
    render_sections(ctx, &sections, &kinds, false, rng)
}

/// Full composition: sections, weighted patterns, noise, filler and a challenge cluster
fn procedural_level(ctx: &LevelContext, area: &Rect, clearance: &Rect, rng: &mut impl Rng) -> Vec<Peg> {
    let level = ctx.level;
    let count = (1 + level as usize / 2).min(4);
    let sections = if level > 7 {
        create_overlapping_sections(area, count, level, rng)
    } else {
        divide_canvas_into_sections(area, count, level, rng)
    };

    let mut available = select_patterns_by_difficulty(ctx.difficulty_factor);
    if available.is_empty() {
        available = PatternKind::ALL.to_vec();
    }
    let kinds = select_random_patterns_for_level(&available, sections.len(), level, rng);
    log::debug!(
        "Level {} patterns: {:?}",
        level,
        kinds.iter().map(PatternKind::as_str).collect::<Vec<_>>()
    );

    let pattern_pegs = render_sections(ctx, &sections, &kinds, true, rng);

    let random_count = (level as usize / 2).saturating_mul(5).saturating_add(10);
    let scattered = patterns::random(clearance, random_count, ctx.spacing * 1.5, ctx.available_colors, rng);

    // The challenge formation wins any overlap with what was laid down before it
    let mut pegs = if level > 5 {
        challenge_cluster(ctx, clearance, rng)
    } else {
        Vec::new()
    };
    pegs.extend(pattern_pegs);
    pegs.extend(scattered);
    pegs
}

fn render_sections(
    ctx: &LevelContext,
    sections: &[Section],
    kinds: &[PatternKind],
    noisy: bool,
    rng: &mut impl Rng,
) -> Vec<Peg> {
    let mut pegs = Vec::new();
    for (section, &kind) in sections.iter().zip(kinds) {
        let placed =
            generate_pattern_in_section(kind, section, ctx.spacing, ctx.level, ctx.available_colors, rng);
        if noisy {
            pegs.extend(apply_noise(placed, ctx, rng));
        } else {
            pegs.extend(placed);
        }
    }
    pegs
}

/// Randomly drop pegs and jitter the survivors, harder with each level
pub fn apply_noise(pegs: Vec<Peg>, ctx: &LevelContext, rng: &mut impl Rng) -> Vec<Peg> {
    if ctx.level <= 2 {
        return pegs;
    }
    let level = ctx.level as f32;
    let drop_chance = (0.05 + 0.01 * level).min(0.3);
    let jitter = ctx.spacing * (0.05 + 0.02 * level).min(0.3);

    let mut kept = Vec::with_capacity(pegs.len());
    for peg in pegs {
        if rng.random_bool(drop_chance as f64) {
            continue;
        }
        let offset = Vec2::new(
            random_between(rng, -jitter, jitter),
            random_between(rng, -jitter, jitter),
        );
        kept.push(peg.with_pos(peg.pos + offset));
    }
    kept
}

/// Small dense formation whose shape cycles with the level
pub fn challenge_cluster(ctx: &LevelContext, clearance: &Rect, rng: &mut impl Rng) -> Vec<Peg> {
    let spacing = ctx.spacing;
    let center = clearance.inset(spacing * 2.0).random_point(rng);
    let growth = (ctx.level / 10).min(2) as usize;
    let kind = ChallengeKind::for_level(ctx.level);

    let positions: Vec<Vec2> = match kind {
        ChallengeKind::Radial => {
            let mut points = vec![center];
            for ring in 1..=1 + growth {
                let r = ring as f32 * spacing * 0.9;
                let n = 6 * ring;
                points.extend((0..n).map(|i| center + polar_to_cartesian(r, i as f32 * TAU / n as f32)));
            }
            points
        }
        ChallengeKind::Line => {
            let n = 5 + growth * 2;
            let dir = Vec2::from_angle(rng.random::<f32>() * TAU);
            let mid = (n - 1) as f32 * 0.5;
            (0..n)
                .map(|i| center + dir * (i as f32 - mid) * spacing * 0.85)
                .collect()
        }
        ChallengeKind::Square => {
            let side = 3 + growth;
            let step = spacing * 0.85;
            let offset = (side - 1) as f32 * step * 0.5;
            (0..side * side)
                .map(|i| {
                    let (row, col) = (i / side, i % side);
                    center + Vec2::new(col as f32 * step - offset, row as f32 * step - offset)
                })
                .collect()
        }
        ChallengeKind::Spiral => {
            let arms = 3;
            let per_arm = 4 + growth * 2;
            (0..arms)
                .flat_map(|arm| {
                    (1..=per_arm).map(move |i| {
                        let angle = arm as f32 * TAU / arms as f32 + i as f32 * 0.5;
                        center + polar_to_cartesian(i as f32 * spacing * 0.9, angle)
                    })
                })
                .collect()
        }
    };

    log::debug!("Challenge cluster {:?} with {} pegs at {:?}", kind, positions.len(), center);
    positions
        .into_iter()
        .map(|pos| Peg::new(pos, rng.random_range(0..ctx.available_colors)))
        .collect()
}

/// Top up a level to its minimum peg count
///
/// Filler pegs are rejection-sampled inside the clearance area. When a round
/// still falls short the spacing shrinks by 10%, never below the level's
/// spacing floor, and the last round at the floor is final.
pub fn ensure_minimum_pegs(pegs: Vec<Peg>, ctx: &LevelContext, clearance: &Rect, rng: &mut impl Rng) -> Vec<Peg> {
    let mut pegs = pegs;
    if pegs.len() >= ctx.min_pegs {
        return pegs;
    }

    let floor = ctx.spacing_floor;
    let mut spacing = ctx.spacing.max(floor);
    loop {
        let needed = ctx.min_pegs.saturating_sub(pegs.len());
        // The round at the floor packs at the floor itself
        let filler_spacing = if spacing <= floor {
            spacing
        } else {
            spacing * FILLER_SPACING_FACTOR
        };
        let mut placed = 0;

        for _ in 0..needed.saturating_mul(FILLER_ATTEMPTS_PER_PEG) {
            if placed == needed {
                break;
            }
            let pos = clearance.random_point(rng);
            if is_clear_of(pos, &pegs, filler_spacing) {
                pegs.push(Peg::new(pos, rng.random_range(0..ctx.available_colors)));
                placed += 1;
            }
        }

        pegs = remove_overlaps(pegs, spacing * OVERLAP_FACTOR);
        pegs = filter_edges(pegs, clearance);
        log::debug!(
            "Filler round at spacing {:.1}: placed {}/{}, now {}",
            spacing,
            placed,
            needed,
            pegs.len()
        );

        if pegs.len() >= ctx.min_pegs || spacing <= floor {
            break;
        }
        spacing = (spacing * 0.9).max(floor);
    }

    if pegs.len() < ctx.min_pegs {
        log::warn!(
            "Level {} short of minimum: {}/{} pegs",
            ctx.level,
            pegs.len(),
            ctx.min_pegs
        );
    }
    pegs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_PLAYABLE_PEG_RADII;
    use crate::level::geometry::min_pairwise_distance;
    use crate::level::colors::required_for_color;
    use crate::level::peg::color_counts;
    use proptest::prelude::{ProptestConfig, any};
    use proptest::{prop_assert, proptest};

    fn generator(seed: u64) -> Generator {
        Generator::with_seed(GeneratorSettings::new(10.0, 600.0, 650.0), seed)
    }

    fn assert_geometry_invariants(generator: &Generator, level: u32, pegs: &[Peg]) {
        let colors = available_colors(level);
        let clearance = generator.settings().clearance_area();

        assert!(pegs.iter().all(|p| p.color < colors), "color out of range on level {level}");
        assert!(pegs.iter().all(|p| clearance.contains(p.pos)), "peg too close to edge on level {level}");
        assert!(
            min_pairwise_distance(pegs) >= generator.min_separation() - 1e-3,
            "pegs overlap on level {level}"
        );
    }

    fn assert_level_invariants(generator: &Generator, level: u32, pegs: &[Peg]) {
        assert_geometry_invariants(generator, level, pegs);
        let colors = available_colors(level);
        let counts = color_counts(pegs, colors);
        for (color, &n) in counts.iter().enumerate() {
            assert!(n >= required_for_color(color, level), "color {color} has {n} pegs on level {level}");
        }
    }

    #[test]
    fn test_first_level_scenario() {
        let mut generator = generator(1);
        let pegs = generator.generate_level(1);
        assert!(pegs.len() >= minimum_peg_count(1));

        // Grid rows starting below the launcher, inside the side margins
        for p in &pegs {
            assert!(p.pos.x >= 50.0 + 20.0 && p.pos.x <= 600.0 - 50.0 - 20.0);
            assert!(p.pos.y >= 140.0 && p.pos.y <= 650.0 - 20.0);
        }
        let rows: std::collections::BTreeSet<i32> = pegs.iter().map(|p| p.pos.y.round() as i32).collect();
        assert!(rows.len() <= FIRST_LEVEL_ROWS);
        assert_level_invariants(&generator, 1, &pegs);
    }

    #[test]
    fn test_sample_levels_reach_population() {
        for seed in 0..4 {
            let mut generator = generator(seed);
            for level in [1, 2, 3, 5, 10, 20] {
                let pegs = generator.generate_level(level);
                let min = minimum_peg_count(level) as f32;
                assert!(
                    pegs.len() as f32 >= min * 0.85,
                    "level {level} produced {} pegs (min {min})",
                    pegs.len()
                );
                assert_level_invariants(&generator, level, &pegs);
            }
        }
    }

    #[test]
    fn test_level_zero_is_level_one() {
        let mut generator = generator(5);
        let layout = generator.generate_layout(0);
        assert_eq!(layout.level, 1);
        assert_eq!(layout.available_colors, 4);
    }

    #[test]
    fn test_layout_thresholds_match_colors() {
        let mut generator = generator(6);
        let layout = generator.generate_layout(12);
        assert_eq!(layout.available_colors, 8);
        assert_eq!(layout.color_counts().iter().sum::<usize>(), layout.pegs.len());
        assert!(layout.thresholds.iter().all(|t| (0.2..=0.85).contains(t)));
    }

    #[test]
    fn test_noise_skipped_on_early_levels() {
        let mut rng = Pcg32::seed_from_u64(7);
        let ctx = LevelContext::new(2, 10.0);
        let pegs: Vec<Peg> = (0..10).map(|i| Peg::new(Vec2::new(i as f32 * 50.0, 0.0), 0)).collect();
        assert_eq!(apply_noise(pegs.clone(), &ctx, &mut rng), pegs);
    }

    #[test]
    fn test_noise_jitter_is_bounded() {
        let mut rng = Pcg32::seed_from_u64(8);
        let ctx = LevelContext::new(10, 10.0);
        let pegs: Vec<Peg> = (0..200).map(|i| Peg::new(Vec2::new(i as f32 * 50.0, 0.0), 0)).collect();
        let noisy = apply_noise(pegs, &ctx, &mut rng);
        assert!(noisy.len() < 200);
        assert!(noisy.len() > 100);
        let max_jitter = ctx.spacing * 0.25;
        for p in &noisy {
            let col = (p.pos.x / 50.0).round();
            assert!((p.pos.x - col * 50.0).abs() <= max_jitter);
            assert!(p.pos.y.abs() <= max_jitter);
        }
    }

    #[test]
    fn test_challenge_cluster_shapes() {
        let mut rng = Pcg32::seed_from_u64(9);
        let clearance = GeneratorSettings::default().clearance_area();
        let sizes: Vec<usize> = [8, 9, 10, 11]
            .iter()
            .map(|&level| challenge_cluster(&LevelContext::new(level, 10.0), &clearance, &mut rng).len())
            .collect();
        // radial 1 + 6, line 5, square 4x4, spiral 3 arms of 6
        assert_eq!(sizes, vec![7, 5, 16, 18]);
    }

    #[test]
    fn test_ensure_minimum_tops_up_empty_level() {
        let mut rng = Pcg32::seed_from_u64(10);
        let clearance = GeneratorSettings::default().clearance_area();
        let ctx = LevelContext::new(6, 10.0);
        let pegs = ensure_minimum_pegs(Vec::new(), &ctx, &clearance, &mut rng);
        assert!(pegs.len() >= ctx.min_pegs);
        assert!(pegs.iter().all(|p| clearance.contains(p.pos)));
        assert!(min_pairwise_distance(&pegs) >= ctx.spacing_floor * OVERLAP_FACTOR - 1e-3);
    }

    #[test]
    fn test_ensure_minimum_terminates_when_impossible() {
        let mut rng = Pcg32::seed_from_u64(11);
        let tiny = Rect::new(Vec2::new(0.0, 0.0), 40.0, 40.0);
        let ctx = LevelContext::new(20, 10.0);
        let pegs = ensure_minimum_pegs(Vec::new(), &ctx, &tiny, &mut rng);
        assert!(!pegs.is_empty());
        assert!(pegs.len() < ctx.min_pegs);
    }

    #[test]
    fn test_filler_packs_at_floor_spacing() {
        let mut rng = Pcg32::seed_from_u64(13);
        let cramped = Rect::new(Vec2::new(100.0, 100.0), 300.0, 300.0);
        let ctx = LevelContext::new(40, 10.0);
        assert_eq!(ctx.spacing, ctx.spacing_floor);

        let pegs = ensure_minimum_pegs(Vec::new(), &ctx, &cramped, &mut rng);
        let closest = min_pairwise_distance(&pegs);
        assert!(closest >= ctx.spacing_floor - 1e-3);
        assert!(closest < ctx.spacing_floor * FILLER_SPACING_FACTOR);
    }

    #[test]
    fn test_extreme_levels_are_bounded() {
        let mut generator = generator(14);
        for level in [1_000, 100_000, u32::MAX] {
            let pegs = generator.generate_level(level);
            assert!(!pegs.is_empty());
            assert_level_invariants(&generator, level, &pegs);
            let layout = generator.generate_layout(level);
            assert_eq!(layout.available_colors, 8);
        }
    }

    #[test]
    fn test_huge_canvas_is_capped() {
        let mut generator = Generator::with_seed(GeneratorSettings::new(10.0, 1.0e7, 1.0e7), 15);
        let area = generator.settings().playable_area();
        assert!(area.width() <= 10.0 * MAX_PLAYABLE_PEG_RADII);
        assert!(area.height() <= 10.0 * MAX_PLAYABLE_PEG_RADII);
        for level in [1, 9] {
            let pegs = generator.generate_level(level);
            assert_geometry_invariants(&generator, level, &pegs);
        }
    }

    #[test]
    fn test_small_canvas_degrades_gracefully() {
        let mut generator = Generator::with_seed(GeneratorSettings::new(10.0, 250.0, 330.0), 12);
        for level in [1, 4, 12] {
            let pegs = generator.generate_level(level);
            assert_geometry_invariants(&generator, level, &pegs);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn generated_levels_hold_invariants(level in 1u32..30, seed in any::<u64>()) {
            let mut generator = generator(seed);
            let pegs = generator.generate_level(level);
            assert_level_invariants(&generator, level, &pegs);
        }

        #[test]
        fn thresholds_stay_in_bounds(level in 1u32..60, seed in any::<u64>()) {
            let mut generator = generator(seed);
            let colors = generator.available_colors(level);
            let thresholds = generator.color_thresholds(level);
            prop_assert!(thresholds[..colors].iter().all(|t| (0.2..=0.85).contains(t)));
        }
    }
}
