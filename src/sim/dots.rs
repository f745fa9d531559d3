//! Dot field placement and blink-set selection
//!
//! Dots are rejection-sampled with a minimum spacing. Placement never fails:
//! a dot that cannot find a clear spot within the attempt budget keeps its
//! last candidate.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Point;
use crate::consts::*;

/// The dots shown on the play area, in index order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DotField {
    pub points: Vec<Point>,
    /// Dots that exhausted the attempt budget and kept their last candidate
    pub capped_placements: usize,
}

impl DotField {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Smallest pairwise distance in the field (infinite for fewer than two dots)
    pub fn min_spacing(&self) -> f32 {
        let mut min = f32::INFINITY;
        for (i, a) in self.points.iter().enumerate() {
            for b in &self.points[i + 1..] {
                min = min.min(a.distance(*b));
            }
        }
        min
    }
}

/// Distance from `candidate` to its closest placed neighbour
fn nearest_distance(placed: &[Point], candidate: Point) -> f32 {
    placed
        .iter()
        .map(|p| p.distance(candidate))
        .fold(f32::INFINITY, f32::min)
}

/// Draw candidates until one clears `placed` or the budget runs out
///
/// Returns the accepted point and whether it met the spacing. When the
/// budget runs out the final candidate is kept as is.
fn place_dot(rng: &mut impl Rng, placed: &[Point]) -> (Point, bool) {
    let margin = DOT_SIZE / 2.0;
    let mut candidate = Point::ZERO;
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        candidate = Point::new(
            rng.random_range(margin..CANVAS_WIDTH - margin),
            rng.random_range(margin..CANVAS_HEIGHT - margin),
        );
        if nearest_distance(placed, candidate) >= MIN_DOT_DISTANCE {
            return (candidate, true);
        }
    }
    (candidate, false)
}

/// Scatter `TOTAL_DOTS` dots over the canvas
pub fn generate_dot_field(rng: &mut impl Rng) -> DotField {
    let mut points: Vec<Point> = Vec::with_capacity(TOTAL_DOTS);
    let mut capped_placements = 0;

    for _ in 0..TOTAL_DOTS {
        let (point, spaced) = place_dot(rng, &points);
        if !spaced {
            capped_placements += 1;
        }
        points.push(point);
    }

    if capped_placements > 0 {
        log::debug!("Dot field: {capped_placements} dots placed under minimum spacing");
    }

    DotField {
        points,
        capped_placements,
    }
}

/// Ordered dot indices to memorize; array order is the reveal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkSet(Vec<usize>);

impl BlinkSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot revealed at a given step of the sequence
    pub fn get(&self, step: usize) -> Option<usize> {
        self.0.get(step).copied()
    }

    pub fn contains(&self, dot: usize) -> bool {
        self.0.contains(&dot)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

/// Draw `count` distinct dot indices, uniformly, in reveal order
///
/// `count` is clamped to the field size.
pub fn choose_blink_set(rng: &mut impl Rng, count: usize) -> BlinkSet {
    let count = count.min(TOTAL_DOTS);
    BlinkSet(rand::seq::index::sample(rng, TOTAL_DOTS, count).into_vec())
}
