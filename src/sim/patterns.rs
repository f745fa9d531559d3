//! Procedural puzzle generation
//!
//! Two puzzle families:
//! - Rotation checks on square boolean grids (180° symmetry at generation,
//!   90° clockwise rotation as the transform)
//! - Line-pattern arithmetic on a fixed 3x3 lattice (edge union / difference)
//!
//! Every generator is total: sizes and difficulties are clamped, and the
//! only input with side effects is the RNG.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Point;
use crate::consts::*;

/// A square boolean matrix, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// All-empty grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    /// Build from nested rows; returns `None` if the rows are not square
    pub fn from_rows(rows: &[Vec<bool>]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self {
            size,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.size + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.cells[row * self.size + col] = value;
    }

    /// Partner of a cell under 180° rotation
    #[inline]
    pub fn mirror(&self, row: usize, col: usize) -> (usize, usize) {
        (self.size - 1 - row, self.size - 1 - col)
    }

    pub fn rows(&self) -> Vec<Vec<bool>> {
        if self.size == 0 {
            return Vec::new();
        }
        self.cells.chunks(self.size).map(<[bool]>::to_vec).collect()
    }
}

/// True if the grid is unchanged by a 180° rotation
pub fn is_grid_rotationally_symmetric(grid: &Grid) -> bool {
    let n = grid.size();
    (0..n).all(|r| {
        (0..n).all(|c| {
            let (mr, mc) = grid.mirror(r, c);
            grid.get(r, c) == grid.get(mr, mc)
        })
    })
}

/// Rotate 90° clockwise: `rotated[c][n-1-r] = grid[r][c]`
pub fn rotate_grid90(grid: &Grid) -> Grid {
    let n = grid.size();
    let mut rotated = Grid::new(n);
    for r in 0..n {
        for c in 0..n {
            rotated.set(c, n - 1 - r, grid.get(r, c));
        }
    }
    rotated
}

/// Symmetry intended when a grid pattern was generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymmetryKind {
    Rotational,
    NonRotational,
}

/// A grid plus the symmetry it was generated to have
///
/// `kind` records intent; after tampering (see [`generate_tricky_pattern`])
/// it is the label, not a measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPattern {
    pub grid: Grid,
    pub kind: SymmetryKind,
}

/// Fill chance for the free half of a rotational grid
const ROTATIONAL_FILL: f64 = 0.4;
/// Fill chance for every cell of a non-rotational grid
const NON_ROTATIONAL_FILL: f64 = 0.35;

/// Generate a grid that does (or does not) have 180° rotational symmetry
///
/// `size` is clamped to `MIN_GRID_SIZE..=MAX_GRID_SIZE`.
pub fn generate_grid_pattern(rng: &mut impl Rng, size: usize, kind: SymmetryKind) -> GridPattern {
    let n = size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
    let mut grid = Grid::new(n);

    match kind {
        SymmetryKind::Rotational => {
            let center = n / 2;
            for r in 0..n {
                for c in 0..n {
                    // Upper half plus the left part of the centre row
                    let free = r < center || (r == center && c <= center);
                    if free && rng.random_bool(ROTATIONAL_FILL) {
                        let (mr, mc) = grid.mirror(r, c);
                        grid.set(r, c, true);
                        grid.set(mr, mc, true);
                    }
                }
            }
        }
        SymmetryKind::NonRotational => {
            for r in 0..n {
                for c in 0..n {
                    grid.set(r, c, rng.random_bool(NON_ROTATIONAL_FILL));
                }
            }
            if is_grid_rotationally_symmetric(&grid) {
                // (0, n-1) and (n-1, 0) are mirror partners
                let corner = grid.get(n - 1, 0);
                grid.set(0, n - 1, !corner);
            }
        }
    }

    GridPattern { grid, kind }
}

/// Rotational pattern with one mirrored pair forced apart, labelled non-rotational
pub fn generate_tricky_pattern(rng: &mut impl Rng, size: usize) -> GridPattern {
    let mut pattern = generate_grid_pattern(rng, size, SymmetryKind::Rotational);
    let grid = &mut pattern.grid;
    let n = grid.size();

    // Row-major indices below n²/2 never include the centre cell and their
    // mirrors always lie above it.
    let index = rng.random_range(0..n * n / 2);
    let (r, c) = (index / n, index % n);
    let (mr, mc) = grid.mirror(r, c);
    let partner = grid.get(mr, mc);
    grid.set(r, c, !partner);

    pattern.kind = SymmetryKind::NonRotational;
    pattern
}

/// An undirected segment between two lattice dots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: u8,
    pub to: u8,
}

impl Edge {
    pub const fn new(from: u8, to: u8) -> Self {
        Self { from, to }
    }

    /// Endpoints in ascending order
    pub fn canonical(&self) -> (u8, u8) {
        (self.from.min(self.to), self.from.max(self.to))
    }

    /// Same segment regardless of direction
    pub fn same_segment(&self, other: &Edge) -> bool {
        self.canonical() == other.canonical()
    }

    /// Random edge with two distinct lattice endpoints
    pub fn random(rng: &mut impl Rng) -> Self {
        let dots = LINE_GRID_DOTS as u8;
        let from = rng.random_range(0..dots);
        let mut to = rng.random_range(0..dots - 1);
        if to >= from {
            to += 1;
        }
        Self { from, to }
    }
}

/// How elaborate a line-pattern template is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineComplexity {
    Simple,
    Complex,
}

/// Straight rows, columns and diagonals
const SIMPLE_TEMPLATES: [&[u8]; 8] = [
    &[0, 4, 8],
    &[2, 4, 6],
    &[0, 3, 6],
    &[1, 4, 7],
    &[2, 5, 8],
    &[0, 1, 2],
    &[3, 4, 5],
    &[6, 7, 8],
];

/// Crosses, corners, triangle and diamond
const COMPLEX_TEMPLATES: [&[u8]; 6] = [
    &[1, 4, 7, 3, 4, 5],
    &[0, 4, 8, 2, 4, 6],
    &[0, 1, 2, 2, 5, 8],
    &[6, 3, 0, 0, 1, 2],
    &[0, 2, 6, 0],
    &[1, 3, 5, 7, 1],
];

/// Turn a vertex walk into consecutive edges
fn walk_edges(walk: &[u8]) -> Vec<Edge> {
    walk.windows(2).map(|w| Edge::new(w[0], w[1])).collect()
}

/// Fixed 3x3 lattice positions
pub fn line_lattice() -> Vec<Point> {
    (0..LINE_GRID_DOTS)
        .map(|i| {
            let (row, col) = ((i / 3) as f32, (i % 3) as f32);
            Point::new(
                col * LINE_DOT_SPACING + LINE_DOT_OFFSET,
                row * LINE_DOT_SPACING + LINE_DOT_OFFSET,
            )
        })
        .collect()
}

/// Segments drawn over the 3x3 lattice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePattern {
    pub dots: Vec<Point>,
    pub edges: Vec<Edge>,
}

impl LinePattern {
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        Self {
            dots: line_lattice(),
            edges,
        }
    }

    /// Whether any edge matches `edge` as an undirected segment
    pub fn has_segment(&self, edge: &Edge) -> bool {
        self.edges.iter().any(|e| e.same_segment(edge))
    }
}

/// Pick one template of the requested complexity
///
/// `difficulty` is accepted for API symmetry with the other generators;
/// template choice depends only on `complexity`.
pub fn generate_line_pattern(
    rng: &mut impl Rng,
    _difficulty: u32,
    complexity: LineComplexity,
) -> LinePattern {
    let templates: &[&[u8]] = match complexity {
        LineComplexity::Simple => &SIMPLE_TEMPLATES,
        LineComplexity::Complex => &COMPLEX_TEMPLATES,
    };
    let walk = templates[rng.random_range(0..templates.len())];
    LinePattern::from_edges(walk_edges(walk))
}

/// Arithmetic applied to two line patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Add,
    Subtract,
}

impl Operation {
    pub fn symbol(&self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
        }
    }
}

/// `pattern_a <op> pattern_b = result`, with ground truth
///
/// `is_correct` is the answer key; `result` is only perturbed on a best-effort
/// basis when the key is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternCompletion {
    pub pattern_a: LinePattern,
    pub pattern_b: LinePattern,
    pub result: LinePattern,
    pub operation: Operation,
    pub is_correct: bool,
}

/// Union of both edge lists, keeping the first occurrence of each segment
pub fn union_edges(a: &[Edge], b: &[Edge]) -> Vec<Edge> {
    let mut out: Vec<Edge> = Vec::with_capacity(a.len() + b.len());
    for edge in a.iter().chain(b) {
        if !out.iter().any(|e| e.same_segment(edge)) {
            out.push(*edge);
        }
    }
    out
}

/// Edges of `a` whose segment does not appear in `b`
pub fn subtract_edges(a: &[Edge], b: &[Edge]) -> Vec<Edge> {
    a.iter()
        .filter(|edge| !b.iter().any(|e| e.same_segment(edge)))
        .copied()
        .collect()
}

const ADD_CORRECT_CHANCE: f64 = 0.7;
const SUBTRACT_CORRECT_CHANCE: f64 = 0.6;

/// Build an add or subtract equation, right 70% / 60% of the time
pub fn generate_pattern_completion(rng: &mut impl Rng, difficulty: u32) -> PatternCompletion {
    let difficulty = difficulty.clamp(1, MAX_DIFFICULTY);
    let operation = if rng.random_bool(0.5) {
        Operation::Add
    } else {
        Operation::Subtract
    };

    match operation {
        Operation::Add => {
            let pattern_a = generate_line_pattern(rng, difficulty, LineComplexity::Simple);
            let pattern_b = generate_line_pattern(rng, difficulty, LineComplexity::Simple);
            let mut edges = union_edges(&pattern_a.edges, &pattern_b.edges);

            let is_correct = rng.random_bool(ADD_CORRECT_CHANCE);
            if !is_correct {
                if rng.random_bool(0.5) && edges.len() > 1 {
                    edges.pop();
                } else {
                    edges.push(Edge::random(rng));
                }
            }

            PatternCompletion {
                pattern_a,
                pattern_b,
                result: LinePattern::from_edges(edges),
                operation,
                is_correct,
            }
        }
        Operation::Subtract => {
            let complexity = if difficulty > 3 {
                LineComplexity::Complex
            } else {
                LineComplexity::Simple
            };
            let pattern_a = generate_line_pattern(rng, difficulty, complexity);
            let pattern_b = generate_line_pattern(rng, difficulty, LineComplexity::Simple);
            let mut edges = subtract_edges(&pattern_a.edges, &pattern_b.edges);

            let is_correct = rng.random_bool(SUBTRACT_CORRECT_CHANCE);
            if !is_correct {
                edges.push(Edge::random(rng));
            }

            PatternCompletion {
                pattern_a,
                pattern_b,
                result: LinePattern::from_edges(edges),
                operation,
                is_correct,
            }
        }
    }
}

/// Kind of judgment a challenge asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeKind {
    RotationCheck,
    PatternArithmetic,
}

impl ChallengeKind {
    /// Rotation checks for the first three levels, arithmetic afterwards
    pub fn for_level(level: u32) -> Self {
        if level <= 3 {
            ChallengeKind::RotationCheck
        } else {
            ChallengeKind::PatternArithmetic
        }
    }

    /// Question put to the player
    pub fn prompt(&self) -> &'static str {
        match self {
            ChallengeKind::RotationCheck => "Are these patterns rotated but identical?",
            ChallengeKind::PatternArithmetic => "Is this pattern equation correct?",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            ChallengeKind::RotationCheck => "rotation",
            ChallengeKind::PatternArithmetic => "arithmetic",
        }
    }
}

/// Patterns shown alongside a challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChallengePatterns {
    /// Original grid and the (possibly rotated) candidate
    Grids([GridPattern; 2]),
    /// A, B and the claimed result
    Lines([LinePattern; 3]),
}

/// One yes/no judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternChallenge {
    pub id: String,
    pub kind: ChallengeKind,
    pub patterns: ChallengePatterns,
    pub completion: Option<PatternCompletion>,
    /// The single source of truth for scoring
    pub correct_answer: bool,
    pub difficulty: u32,
}

/// Rotation grids grow from 4x4 to 7x7 with difficulty
pub fn rotation_grid_size(difficulty: u32) -> usize {
    4 + (difficulty.clamp(1, MAX_DIFFICULTY) / 2) as usize
}

/// Generate a challenge of the given kind for a level
pub fn generate_pattern_challenge(
    rng: &mut impl Rng,
    level: u32,
    kind: ChallengeKind,
) -> PatternChallenge {
    let difficulty = level.clamp(1, MAX_DIFFICULTY);
    let id = format!("{}-{:016x}", kind.id_prefix(), rng.random::<u64>());

    match kind {
        ChallengeKind::PatternArithmetic => {
            let completion = generate_pattern_completion(rng, difficulty);
            PatternChallenge {
                id,
                kind,
                patterns: ChallengePatterns::Lines([
                    completion.pattern_a.clone(),
                    completion.pattern_b.clone(),
                    completion.result.clone(),
                ]),
                correct_answer: completion.is_correct,
                completion: Some(completion),
                difficulty,
            }
        }
        ChallengeKind::RotationCheck => {
            let symmetry = if rng.random_bool(0.5) {
                SymmetryKind::Rotational
            } else {
                SymmetryKind::NonRotational
            };
            let original = generate_grid_pattern(rng, rotation_grid_size(difficulty), symmetry);

            // The candidate is built from the original, never mutated in place
            let candidate = if rng.random_bool(0.5) {
                GridPattern {
                    grid: rotate_grid90(&original.grid),
                    kind: original.kind,
                }
            } else {
                original.clone()
            };

            // Literal cell-wise equality after the optional rotation
            let correct_answer = original.grid == candidate.grid;

            PatternChallenge {
                id,
                kind,
                patterns: ChallengePatterns::Grids([original, candidate]),
                completion: None,
                correct_answer,
                difficulty,
            }
        }
    }
}

/// Generate a level's full challenge list
pub fn generate_level_challenges(
    rng: &mut impl Rng,
    level: u32,
    count: usize,
) -> Vec<PatternChallenge> {
    let kind = ChallengeKind::for_level(level);
    (0..count)
        .map(|_| generate_pattern_challenge(rng, level, kind))
        .collect()
}
