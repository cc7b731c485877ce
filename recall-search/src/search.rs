//! Minimax search with alpha-beta pruning.
//!
//! Scores are always from the root player's perspective: the root player
//! maximizes and the opponent minimizes. Finished positions score the true
//! disk difference times [`SearchConfig::terminal_scale`], which dwarfs any
//! heuristic evaluation, so a forced win is never traded for a nice-looking
//! position.

use crate::evaluate::{evaluate, EvalParams};
use crate::Weights;
use arrayvec::ArrayVec;
use rand::seq::SliceRandom;
use rand::Rng;
use recall_othello::{bitboard::CORNERS, Board, Color, Location, LocationList};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which seat the searching player occupies. Only affects the midgame depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Primary,
    /// A lower-stakes seat, such as the second player in self-play.
    Secondary,
}

/// Depth schedule and scoring constants for [`choose_move`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// At or below this many empties, search to the end of the game.
    pub exact_solve_empties: u8,
    /// At or below this many empties, search `midgame_depth` plies.
    pub midgame_empties: u8,
    pub midgame_depth: u8,
    /// Depth for everything earlier.
    pub default_depth: u8,
    /// Depth for everything earlier when playing as [`Role::Secondary`].
    pub secondary_depth: u8,
    /// The root risk filter only applies to searches shallower than this.
    pub risk_filter_below_depth: u8,
    /// Multiplier on the disk difference of a finished game.
    pub terminal_scale: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exact_solve_empties: 12,
            midgame_empties: 16,
            midgame_depth: 6,
            default_depth: 4,
            secondary_depth: 3,
            risk_filter_below_depth: 10,
            terminal_scale: 100_000.0,
        }
    }
}

/// The result of a root search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchOutcome {
    pub location: Location,
    pub score: f64,
    pub depth: u8,
    /// How many root moves were searched after risk filtering.
    pub candidates: usize,
    /// Nodes visited below the root.
    pub nodes: u64,
}

/// Pick the search depth for a position with `empties` empty squares.
pub fn search_depth(empties: u8, role: Role, config: &SearchConfig) -> u8 {
    if empties <= config.exact_solve_empties {
        empties
    } else if empties <= config.midgame_empties {
        config.midgame_depth
    } else {
        match role {
            Role::Primary => config.default_depth,
            Role::Secondary => config.secondary_depth,
        }
    }
}

/// Whether `loc` touches an empty corner, handing the opponent a shot at it.
/// Taking a corner is never risky.
pub fn is_risky(board: Board, loc: Location) -> bool {
    LocationList::from(CORNERS & board.empty_mask()).any(|corner| loc.distance(corner) == 1)
}

/// The root moves worth searching: everything, unless the search is shallow
/// and there are safe alternatives to moves next to empty corners.
pub fn root_candidates(
    board: Board,
    color: Color,
    depth: u8,
    config: &SearchConfig,
) -> ArrayVec<[Location; 64]> {
    let legal: ArrayVec<[Location; 64]> = board.legal_moves(color).collect();

    if depth >= config.risk_filter_below_depth {
        return legal;
    }

    let safe: ArrayVec<[Location; 64]> = legal
        .iter()
        .copied()
        .filter(|&loc| !is_risky(board, loc))
        .collect();

    if safe.is_empty() {
        legal
    } else {
        safe
    }
}

/// Alpha-beta search state for one root decision.
pub struct Searcher<'a> {
    root: Color,
    weights: &'a Weights,
    params: &'a EvalParams,
    config: &'a SearchConfig,
    nodes: u64,
}

impl<'a> Searcher<'a> {
    pub fn new(
        root: Color,
        weights: &'a Weights,
        params: &'a EvalParams,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            root,
            weights,
            params,
            config,
            nodes: 0,
        }
    }

    /// Nodes visited so far.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Score `board` with `to_move` to play, searching `depth` more plies.
    pub fn alpha_beta(
        &mut self,
        board: Board,
        to_move: Color,
        depth: u8,
        mut alpha: f64,
        mut beta: f64,
    ) -> f64 {
        self.nodes += 1;

        let moves = board.legal_moves(to_move);
        if moves.is_empty() && !board.has_moves(!to_move) {
            // Both players pass: game ends
            let difference = f64::from(board.score_absolute_difference(self.root));
            return difference * self.config.terminal_scale;
        }

        if depth == 0 {
            return evaluate(board, self.root, self.weights, self.params);
        }

        if moves.is_empty() {
            // I pass, but my opponent may have moves. The pass still costs a ply.
            return self.alpha_beta(board, !to_move, depth - 1, alpha, beta);
        }

        let ordered = self.order_moves(moves);

        if to_move == self.root {
            let mut best = f64::NEG_INFINITY;
            for mv in ordered {
                let next = board.apply_move_unchecked(to_move, mv);
                let score = self.alpha_beta(next, !to_move, depth - 1, alpha, beta);
                best = best.max(score);
                alpha = alpha.max(best);

                // Fail high: the opponent already has a better line elsewhere.
                if alpha >= beta {
                    break;
                }
            }
            best
        } else {
            let mut best = f64::INFINITY;
            for mv in ordered {
                let next = board.apply_move_unchecked(to_move, mv);
                let score = self.alpha_beta(next, !to_move, depth - 1, alpha, beta);
                best = best.min(score);
                beta = beta.min(best);

                // Fail low: the root player already has a better line elsewhere.
                if alpha >= beta {
                    break;
                }
            }
            best
        }
    }

    /// Visit squares with the highest learned weight first.
    fn order_moves(&self, moves: LocationList) -> ArrayVec<[Location; 64]> {
        let mut ordered: ArrayVec<[Location; 64]> = moves.collect();
        ordered.sort_unstable_by(|a, b| self.weights.at(*b).total_cmp(&self.weights.at(*a)));
        ordered
    }
}

/// Search every candidate root move with a full window, so equal scores are truly equal.
pub fn score_candidates(
    board: Board,
    color: Color,
    candidates: &[Location],
    depth: u8,
    searcher: &mut Searcher<'_>,
) -> Vec<(Location, f64)> {
    candidates
        .iter()
        .map(|&mv| {
            let next = board.apply_move_unchecked(color, mv);
            let score = searcher.alpha_beta(
                next,
                !color,
                depth.saturating_sub(1),
                f64::NEG_INFINITY,
                f64::INFINITY,
            );
            (mv, score)
        })
        .collect()
}

/// Choose uniformly among the moves tied for the best score.
pub fn pick_best<R: Rng + ?Sized>(
    scored: &[(Location, f64)],
    rng: &mut R,
) -> Option<(Location, f64)> {
    let best = scored
        .iter()
        .map(|&(_, score)| score)
        .fold(f64::NEG_INFINITY, f64::max);

    let tied: Vec<(Location, f64)> = scored
        .iter()
        .copied()
        .filter(|&(_, score)| score == best)
        .collect();

    tied.choose(rng).copied()
}

/// Choose a move for `color`. Returns None only when `color` has no legal move.
pub fn choose_move<R: Rng + ?Sized>(
    board: Board,
    color: Color,
    weights: &Weights,
    params: &EvalParams,
    config: &SearchConfig,
    role: Role,
    rng: &mut R,
) -> Option<SearchOutcome> {
    if !board.has_moves(color) {
        return None;
    }

    let depth = search_depth(board.count_empty(), role, config);
    let candidates = root_candidates(board, color, depth, config);

    let mut searcher = Searcher::new(color, weights, params, config);
    let scored = score_candidates(board, color, &candidates, depth, &mut searcher);
    let (location, score) = pick_best(&scored, rng)?;

    let outcome = SearchOutcome {
        location,
        score,
        depth,
        candidates: candidates.len(),
        nodes: searcher.nodes(),
    };
    debug!(
        %color,
        %location,
        score,
        depth,
        candidates = outcome.candidates,
        nodes = outcome.nodes,
        "searched root"
    );

    Some(outcome)
}
