//! Difficulty-weighted pattern selection

use rand::Rng;

use super::patterns::PatternKind;

/// Catalog patterns whose rating is at most `difficulty_factor + 2`
pub fn select_patterns_by_difficulty(difficulty_factor: f32) -> Vec<PatternKind> {
    PatternKind::ALL
        .iter()
        .copied()
        .filter(|kind| kind.difficulty() as f32 <= difficulty_factor + 2.0)
        .collect()
}

/// Sampling weight of a pattern at a level
///
/// Early levels favor simple patterns, later levels favor complex ones.
pub fn pattern_weight(kind: PatternKind, level: u32) -> usize {
    let difficulty = kind.difficulty().min(10) as usize;
    if level <= 5 {
        (10 - difficulty).max(1)
    } else {
        difficulty.max(1)
    }
}

fn weighted_pool(available: &[PatternKind], level: u32) -> Vec<PatternKind> {
    available
        .iter()
        .flat_map(|&kind| std::iter::repeat_n(kind, pattern_weight(kind, level)))
        .collect()
}

/// Draw `count` patterns by weighted sampling without replacement
///
/// A chosen pattern leaves the pool entirely. Once every distinct pattern
/// has been used the pool is rebuilt, so repeats only appear when `count`
/// exceeds the number of available patterns.
pub fn select_random_patterns_for_level(
    available: &[PatternKind],
    count: usize,
    level: u32,
    rng: &mut impl Rng,
) -> Vec<PatternKind> {
    let mut selected = Vec::with_capacity(count);
    if available.is_empty() {
        log::warn!("No patterns available for level {}", level);
        return selected;
    }

    let mut pool = weighted_pool(available, level);
    while selected.len() < count {
        if pool.is_empty() {
            log::debug!("Pattern pool exhausted at level {}, allowing repeats", level);
            pool = weighted_pool(available, level);
        }
        let chosen = pool[rng.random_range(0..pool.len())];
        pool.retain(|&kind| kind != chosen);
        selected.push(chosen);
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    #[test]
    fn test_difficulty_filter() {
        let easy = select_patterns_by_difficulty(0.0);
        assert!(easy.contains(&PatternKind::Grid));
        assert!(easy.contains(&PatternKind::Checkerboard));
        assert!(!easy.contains(&PatternKind::Diamond));

        let all = select_patterns_by_difficulty(10.0);
        assert_eq!(all.len(), PatternKind::ALL.len());
    }

    #[test]
    fn test_weights_flip_after_level_five() {
        assert_eq!(pattern_weight(PatternKind::Grid, 1), 9);
        assert_eq!(pattern_weight(PatternKind::Maze, 1), 1);
        assert_eq!(pattern_weight(PatternKind::Grid, 6), 1);
        assert_eq!(pattern_weight(PatternKind::Maze, 6), 9);
    }

    #[test]
    fn test_selection_is_distinct_when_possible() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let picks = select_random_patterns_for_level(&PatternKind::ALL, 4, 8, &mut rng);
            assert_eq!(picks.len(), 4);
            let unique: HashSet<_> = picks.iter().collect();
            assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn test_selection_tolerates_small_pool() {
        let mut rng = Pcg32::seed_from_u64(3);
        let available = [PatternKind::Grid, PatternKind::Wave];
        let picks = select_random_patterns_for_level(&available, 5, 2, &mut rng);
        assert_eq!(picks.len(), 5);
        assert!(picks.iter().all(|k| available.contains(k)));
        // The first two draws exhaust the pool before any repeat
        assert_ne!(picks[0], picks[1]);
    }

    #[test]
    fn test_selection_with_empty_pool() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(select_random_patterns_for_level(&[], 3, 4, &mut rng).is_empty());
    }

    #[test]
    fn test_early_levels_prefer_simple_patterns() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut grid_first = 0;
        let mut maze_first = 0;
        for _ in 0..500 {
            match select_random_patterns_for_level(&PatternKind::ALL, 1, 2, &mut rng)[0] {
                PatternKind::Grid => grid_first += 1,
                PatternKind::Maze => maze_first += 1,
                _ => {}
            }
        }
        assert!(grid_first > maze_first * 3);
    }
}
