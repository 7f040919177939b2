//! Geometry helpers for peg placement
//!
//! Axis-aligned rectangles, spacing checks, overlap removal and edge
//! clearance. All distances are in canvas pixels.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::peg::Peg;
use crate::random_between;

/// An axis-aligned rectangle given by its min/max corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, width: f32, height: f32) -> Self {
        Self {
            min: origin,
            max: origin + Vec2::new(width.max(0.0), height.max(0.0)),
        }
    }

    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shrink by `amount` on every side (collapses to the center if too small)
    pub fn inset(&self, amount: f32) -> Self {
        let half = Vec2::new(self.width(), self.height()) * 0.5;
        let d = Vec2::splat(amount).min(half);
        Self {
            min: self.min + d,
            max: self.max - d,
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Upper bound on how many points at least `spacing` apart fit inside
    pub fn capacity(&self, spacing: f32) -> usize {
        let spacing = spacing.max(f32::EPSILON);
        let per_row = self.width() / spacing + 1.0;
        let per_col = self.height() / spacing + 1.0;
        // Hexagonal packing beats a square lattice by 2/sqrt(3)
        (per_row * per_col * 1.155).ceil() as usize
    }

    /// Uniformly random point inside the rectangle
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            random_between(rng, self.min.x, self.max.x),
            random_between(rng, self.min.y, self.max.y),
        )
    }
}

/// True if `p` is at least `min_distance` from every peg in `pegs`
pub fn is_clear_of(p: Vec2, pegs: &[Peg], min_distance: f32) -> bool {
    let min_sq = min_distance * min_distance;
    pegs.iter().all(|peg| peg.pos.distance_squared(p) >= min_sq)
}

/// Drop pegs closer than `min_distance` to an earlier peg (first one wins)
pub fn remove_overlaps(pegs: Vec<Peg>, min_distance: f32) -> Vec<Peg> {
    let mut kept: Vec<Peg> = Vec::with_capacity(pegs.len());
    for peg in pegs {
        if is_clear_of(peg.pos, &kept, min_distance) {
            kept.push(peg);
        }
    }
    kept
}

/// Keep only pegs inside `area` (the playable area already inset for clearance)
pub fn filter_edges(pegs: Vec<Peg>, area: &Rect) -> Vec<Peg> {
    pegs.into_iter().filter(|peg| area.contains(peg.pos)).collect()
}

/// Smallest pairwise distance in a peg set (infinite for fewer than two pegs)
pub fn min_pairwise_distance(pegs: &[Peg]) -> f32 {
    let mut best = f32::INFINITY;
    for (i, a) in pegs.iter().enumerate() {
        for b in &pegs[i + 1..] {
            best = best.min(a.pos.distance(b.pos));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peg(x: f32, y: f32) -> Peg {
        Peg::new(Vec2::new(x, y), 0)
    }

    #[test]
    fn test_rect_inset_and_contains() {
        let r = Rect::new(Vec2::new(10.0, 20.0), 100.0, 50.0);
        assert_eq!(r.center(), Vec2::new(60.0, 45.0));

        let inner = r.inset(5.0);
        assert!(inner.contains(Vec2::new(15.0, 25.0)));
        assert!(!inner.contains(Vec2::new(14.9, 25.0)));
        assert!(inner.contains(Vec2::new(105.0, 65.0)));
    }

    #[test]
    fn test_inset_collapses_instead_of_inverting() {
        let r = Rect::new(Vec2::ZERO, 10.0, 100.0).inset(20.0);
        assert_eq!(r.width(), 0.0);
        assert!(r.height() > 0.0);
    }

    #[test]
    fn test_remove_overlaps_keeps_first() {
        let pegs = vec![peg(0.0, 0.0), peg(5.0, 0.0), peg(20.0, 0.0), peg(21.0, 0.0)];
        let kept = remove_overlaps(pegs, 10.0);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].pos, Vec2::new(0.0, 0.0));
        assert_eq!(kept[1].pos, Vec2::new(20.0, 0.0));
        assert!(min_pairwise_distance(&kept) >= 10.0);
    }

    #[test]
    fn test_filter_edges() {
        let area = Rect::new(Vec2::new(20.0, 20.0), 60.0, 60.0);
        let pegs = vec![peg(10.0, 50.0), peg(50.0, 50.0), peg(80.0, 80.0), peg(50.0, 81.0)];
        let kept = filter_edges(pegs, &area);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_min_pairwise_distance_small_sets() {
        assert!(min_pairwise_distance(&[]).is_infinite());
        assert!(min_pairwise_distance(&[peg(1.0, 1.0)]).is_infinite());
        assert!((min_pairwise_distance(&[peg(0.0, 0.0), peg(3.0, 4.0)]) - 5.0).abs() < 1e-6);
    }
}
