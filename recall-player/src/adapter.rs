//! Post-game nudges to the positional weight matrix.

use recall_othello::{Color, Ply};
use recall_search::Weights;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterParams {
    /// Added to every square the winner played.
    pub winner_delta: f64,
    /// Subtracted from every square the loser played.
    pub loser_delta: f64,
    /// Every weight stays within `[-clamp, clamp]`.
    pub clamp: f64,
}

impl Default for AdapterParams {
    fn default() -> Self {
        Self {
            winner_delta: 0.5,
            loser_delta: 0.25,
            clamp: 600.0,
        }
    }
}

/// Adjust `weights` by every move of a finished game. A draw leaves them unchanged.
pub fn adapt_weights(
    weights: &Weights,
    history: &[Ply],
    winner: Option<Color>,
    params: &AdapterParams,
) -> Weights {
    let mut adapted = *weights;
    let winner = match winner {
        Some(winner) => winner,
        None => return adapted,
    };

    for ply in history {
        let weight = adapted.at_mut(ply.location);
        if ply.color == winner {
            *weight += params.winner_delta;
        } else {
            *weight -= params.loser_delta;
        }
    }

    adapted.clamp(params.clamp);
    adapted
}
