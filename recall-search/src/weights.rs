//! The learned positional weight matrix.

use recall_othello::{Location, EDGE_LENGTH};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Positional value of each square, indexed `[row][col]`.
///
/// The evaluator only reads it; the learner produces new matrices after each game.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights([[f64; EDGE_LENGTH]; EDGE_LENGTH]);

/// A classic hand-tuned table: corners are valuable, the squares next to them are dangerous.
const DEFAULT_WEIGHTS: [[f64; EDGE_LENGTH]; EDGE_LENGTH] = [
    [100.0, -20.0, 10.0, 5.0, 5.0, 10.0, -20.0, 100.0],
    [-20.0, -50.0, -2.0, -2.0, -2.0, -2.0, -50.0, -20.0],
    [10.0, -2.0, -1.0, -1.0, -1.0, -1.0, -2.0, 10.0],
    [5.0, -2.0, -1.0, -1.0, -1.0, -1.0, -2.0, 5.0],
    [5.0, -2.0, -1.0, -1.0, -1.0, -1.0, -2.0, 5.0],
    [10.0, -2.0, -1.0, -1.0, -1.0, -1.0, -2.0, 10.0],
    [-20.0, -50.0, -2.0, -2.0, -2.0, -2.0, -50.0, -20.0],
    [100.0, -20.0, 10.0, 5.0, 5.0, 10.0, -20.0, 100.0],
];

impl Default for Weights {
    fn default() -> Self {
        Self(DEFAULT_WEIGHTS)
    }
}

impl From<[[f64; EDGE_LENGTH]; EDGE_LENGTH]> for Weights {
    fn from(rows: [[f64; EDGE_LENGTH]; EDGE_LENGTH]) -> Self {
        Self(rows)
    }
}

impl Weights {
    /// A matrix with every square set to `value`.
    pub fn uniform(value: f64) -> Self {
        Self([[value; EDGE_LENGTH]; EDGE_LENGTH])
    }

    /// The weight of the square at `loc`.
    #[inline]
    pub fn at(&self, loc: Location) -> f64 {
        let (row, col) = loc.to_coords();
        self.0[row][col]
    }

    /// Mutable access to the weight of the square at `loc`.
    #[inline]
    pub fn at_mut(&mut self, loc: Location) -> &mut f64 {
        let (row, col) = loc.to_coords();
        &mut self.0[row][col]
    }

    /// Clamp every square into `[-|limit|, |limit|]`. A NaN limit clamps nothing.
    pub fn clamp(&mut self, limit: f64) {
        if limit.is_nan() {
            return;
        }

        let limit = limit.abs();
        for weight in self.0.iter_mut().flatten() {
            *weight = weight.clamp(-limit, limit);
        }
    }
}

impl Index<(usize, usize)> for Weights {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.0[row][col]
    }
}

impl IndexMut<(usize, usize)> for Weights {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.0[row][col]
    }
}
