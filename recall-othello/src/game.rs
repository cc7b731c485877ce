//! Implements game-level Othello logic.
//!
//! For correctness, this higher-level interface is preferred, but search code
//! may use [`Board`] directly and track the side to move itself.

use crate::board::{Board, Color, IllegalMoveError, Score};
use crate::Location;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An action in an Othello game: pass or select a location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Play(Location),
    Pass,
}

impl From<Location> for Action {
    fn from(mv: Location) -> Self {
        Self::Play(mv)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Play(loc) => write!(f, "{}", loc),
            Action::Pass => f.write_str("PASS"),
        }
    }
}

/// One placed disk in a game record: the board before the move, the move, and who made it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ply {
    pub board: Board,
    pub location: Location,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
pub enum GameError {
    #[display(fmt = "{}", source)]
    IllegalMove { source: IllegalMoveError },
    #[display(fmt = "{} cannot pass while holding legal moves", color)]
    IllegalPass { color: Color },
    #[display(fmt = "the game is already over")]
    Finished,
}

impl From<IllegalMoveError> for GameError {
    fn from(source: IllegalMoveError) -> Self {
        GameError::IllegalMove { source }
    }
}

/// The complete state of an Othello game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Game {
    pub board: Board,
    pub active: Color,
    pub just_passed: bool,
}

impl Default for Game {
    /// Gets the starting position with black to move.
    fn default() -> Self {
        Self::new(Board::new(), Color::default())
    }
}

impl Game {
    /// Start from an arbitrary position with `active` to move.
    pub fn new(board: Board, active: Color) -> Self {
        Self {
            board,
            active,
            just_passed: false,
        }
    }

    /// Whether neither player can move.
    pub fn is_finished(self) -> bool {
        self.board.is_finished()
    }

    /// The winner of a finished game, or None for a draw or unfinished game.
    pub fn winner(self) -> Option<Color> {
        if self.is_finished() {
            self.board.score().winner()
        } else {
            None
        }
    }

    /// Disk counts for both colors.
    pub fn score(self) -> Score {
        self.board.score()
    }

    /// Make an action as the active player.
    /// Passing is only allowed when the active player has no legal moves.
    pub fn apply(self, action: Action) -> Result<Self, GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }

        match action {
            Action::Pass => {
                if self.board.has_moves(self.active) {
                    return Err(GameError::IllegalPass { color: self.active });
                }

                Ok(Self {
                    board: self.board,
                    active: !self.active,
                    just_passed: true,
                })
            }
            Action::Play(loc) => Ok(Self {
                board: self.board.apply_move(self.active, loc)?,
                active: !self.active,
                just_passed: false,
            }),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        write!(f, "{} to move ({})", self.active, self.score())?;
        if self.just_passed {
            f.write_str("\n(Last move was a pass)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternates_turns() {
        let game = Game::default();
        let loc: Location = "D3".parse().unwrap();
        let next = game.apply(loc.into()).unwrap();
        assert_eq!(next.active, Color::White);
        assert!(!next.just_passed);
        assert_eq!(next.score(), Score { black: 4, white: 1 });
    }

    #[test]
    fn cannot_pass_with_moves() {
        assert_eq!(
            Game::default().apply(Action::Pass),
            Err(GameError::IllegalPass {
                color: Color::Black
            })
        );
    }

    #[test]
    fn must_pass_without_moves() {
        // White has a single disk it cannot move from; black can capture it.
        let board: Board = "
            X O - - - - - -
            - - - - - - - -
            - - - - - - - -
            - - - - - - - -
            - - - - - - - -
            - - - - - - - -
            - - - - - - - -
            - - - - - - - -"
            .parse()
            .unwrap();
        let game = Game::new(board, Color::White);
        assert!(!board.has_moves(Color::White));

        let passed = game.apply(Action::Pass).unwrap();
        assert_eq!(passed.active, Color::Black);
        assert!(passed.just_passed);
        assert_eq!(passed.board, board);

        let done = passed.apply("C1".parse::<Location>().unwrap().into()).unwrap();
        assert!(done.is_finished());
        assert_eq!(done.winner(), Some(Color::Black));
        assert_eq!(done.apply(Action::Pass), Err(GameError::Finished));
    }

    #[test]
    fn illegal_play_is_reported() {
        let err = Game::default()
            .apply(Action::Play("A1".parse().unwrap()))
            .unwrap_err();
        assert!(matches!(err, GameError::IllegalMove { .. }));
    }
}
