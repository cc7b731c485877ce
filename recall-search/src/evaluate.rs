//! Static position evaluation.
//!
//! Scores are layered so each tier outweighs everything beneath it: a finished
//! board is scored exactly, corners come next, and mobility plus learned
//! positional weights only break ties between otherwise similar positions.

use crate::Weights;
use recall_othello::{Board, Color, LocationList};
use serde::{Deserialize, Serialize};

/// Tunable constants for [`evaluate`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalParams {
    /// Multiplier on the final disk difference of a full board.
    pub endgame_scale: f64,
    /// Bonus per corner held, penalty per corner held by the opponent.
    pub corner_bonus: f64,
    /// Multiplier on the difference in legal move counts.
    pub mobility_weight: f64,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            endgame_scale: 10_000.0,
            corner_bonus: 2_000.0,
            mobility_weight: 50.0,
        }
    }
}

/// Score `board` for `color`; higher is better.
pub fn evaluate(board: Board, color: Color, weights: &Weights, params: &EvalParams) -> f64 {
    if board.count_empty() == 0 {
        return f64::from(board.score_absolute_difference(color)) * params.endgame_scale;
    }

    let my_corners = board.corners(color).count_occupied();
    let their_corners = board.corners(!color).count_occupied();
    let corners =
        f64::from(i32::from(my_corners) - i32::from(their_corners)) * params.corner_bonus;

    let my_mobility = board.legal_moves(color).len() as f64;
    let their_mobility = board.legal_moves(!color).len() as f64;
    let mobility = (my_mobility - their_mobility) * params.mobility_weight;

    corners + mobility + positional(board, color, weights)
}

/// Sum of weights under `color`'s disks minus the sum under the opponent's.
fn positional(board: Board, color: Color, weights: &Weights) -> f64 {
    let occupied = LocationList::from(board.occupied_mask());

    occupied
        .map(|loc| {
            if board.cell(loc).color() == Some(color) {
                weights.at(loc)
            } else {
                -weights.at(loc)
            }
        })
        .sum()
}
