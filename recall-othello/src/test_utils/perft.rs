//! Leaf counts of the game tree, for validating move generation.
//! Known counts from the start position: http://www.aartbik.com/MISC/reversi.html

use crate::{Action, Game};

/// Count the positions exactly `depth` plies after the start of a game.
pub fn run_perft(depth: u8) -> u64 {
    perft(Game::default(), depth)
}

/// Count the positions `depth` plies below `game`. A forced pass uses up a
/// ply, and a finished game is a single leaf however much depth remains.
pub fn perft(game: Game, depth: u8) -> u64 {
    if depth == 0 || game.is_finished() {
        return 1;
    }

    let moves = game.board.legal_moves(game.active);
    if moves.is_empty() {
        return game
            .apply(Action::Pass)
            .map_or(0, |next| perft(next, depth - 1));
    }

    moves
        .filter_map(|mv| game.apply(mv.into()).ok())
        .map(|next| perft(next, depth - 1))
        .sum()
}
