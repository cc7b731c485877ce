//! The [`Board`] value type and the rules of play.
//!
//! A [`Board`] stores one [`Bitboard`] per color. Boards are small `Copy`
//! values: every operation that changes the position returns a new board and
//! leaves its input alone, so a game history is just a list of boards.

use crate::bitboard::{self, Bitboard, BLACK_START, CORNERS, WHITE_START};
use crate::{utils, Location, LocationList, NUM_SPACES};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two players in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Color {
    Black,
    White,
}

impl Default for Color {
    /// Gets the starting player (black).
    fn default() -> Self {
        Self::Black
    }
}

impl std::ops::Not for Color {
    type Output = Self;

    /// Gets the other player.
    fn not(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl Color {
    /// The single-character symbol used in board notation.
    pub fn symbol(self) -> char {
        match self {
            Color::Black => 'X',
            Color::White => 'O',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
#[display(fmt = "invalid color")]
pub struct ParseColorError;

/// Parse a color from its name ("black", "white") or symbol ("X", "O").
impl std::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" | "b" | "x" => Ok(Color::Black),
            "white" | "w" | "o" => Ok(Color::White),
            _ => Err(ParseColorError),
        }
    }
}

/// The contents of a single square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl From<Color> for Cell {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Cell::Black,
            Color::White => Cell::White,
        }
    }
}

impl Cell {
    /// The color occupying this cell, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Color::Black),
            Cell::White => Some(Color::White),
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::Black => 'X',
            Cell::White => 'O',
        }
    }
}

/// Disk counts for both colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub black: u8,
    pub white: u8,
}

impl Score {
    /// The number of disks `color` holds.
    pub fn of(self, color: Color) -> u8 {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    /// `color`'s disks minus its opponent's.
    pub fn difference(self, color: Color) -> i32 {
        i32::from(self.of(color)) - i32::from(self.of(!color))
    }

    /// The color with more disks, or None for a draw.
    pub fn winner(self) -> Option<Color> {
        match self.black.cmp(&self.white) {
            std::cmp::Ordering::Greater => Some(Color::Black),
            std::cmp::Ordering::Less => Some(Color::White),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.black, self.white)
    }
}

/// Raised when a move is not among the mover's legal moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
#[display(fmt = "{} cannot play {}", color, location)]
pub struct IllegalMoveError {
    pub color: Color,
    pub location: Location,
}

/// A complete Othello position: which squares each color holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Board {
    black: Bitboard,
    white: Bitboard,
}

impl Default for Board {
    /// Gets the standard starting position.
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting position.
    pub const fn new() -> Self {
        Self {
            black: BLACK_START,
            white: WHITE_START,
        }
    }

    /// A board with no disks on it.
    pub fn empty() -> Self {
        Self {
            black: Bitboard::default(),
            white: Bitboard::default(),
        }
    }

    /// Build a board from per-color bitboards. Returns None if they overlap.
    pub fn from_bitboards(black: Bitboard, white: Bitboard) -> Option<Self> {
        if (black & white).is_empty() {
            Some(Self { black, white })
        } else {
            None
        }
    }

    /// The squares held by `color`.
    #[inline]
    pub fn bitboard(self, color: Color) -> Bitboard {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    /// Split into (mover, opponent) bitboards.
    #[inline]
    fn split(self, color: Color) -> (Bitboard, Bitboard) {
        match color {
            Color::Black => (self.black, self.white),
            Color::White => (self.white, self.black),
        }
    }

    #[inline]
    fn join(color: Color, active: Bitboard, opponent: Bitboard) -> Self {
        match color {
            Color::Black => Self {
                black: active,
                white: opponent,
            },
            Color::White => Self {
                black: opponent,
                white: active,
            },
        }
    }

    /// Get a mask indicating where the occupied spaces are.
    #[inline]
    pub fn occupied_mask(self) -> Bitboard {
        self.black | self.white
    }

    /// Get a mask indicating where the empty spaces are.
    #[inline]
    pub fn empty_mask(self) -> Bitboard {
        !self.occupied_mask()
    }

    /// The number of empty squares remaining.
    #[inline]
    pub fn count_empty(self) -> u8 {
        self.occupied_mask().count_empty()
    }

    /// What occupies `loc`.
    pub fn cell(self, loc: Location) -> Cell {
        let mask: Bitboard = loc.into();
        if !(self.black & mask).is_empty() {
            Cell::Black
        } else if !(self.white & mask).is_empty() {
            Cell::White
        } else {
            Cell::Empty
        }
    }

    /// A copy of this board with `loc` set to `cell`, without applying any rules.
    /// Useful for building positions.
    pub fn with_cell(self, loc: Location, cell: Cell) -> Self {
        let mask: Bitboard = loc.into();
        let black = self.black & !mask;
        let white = self.white & !mask;
        match cell {
            Cell::Empty => Self { black, white },
            Cell::Black => Self {
                black: black | mask,
                white,
            },
            Cell::White => Self {
                black,
                white: white | mask,
            },
        }
    }

    /// Iterate over every square's contents in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        self.black
            .into_iter()
            .zip(self.white)
            .map(|bits| match bits {
                (true, _) => Cell::Black,
                (_, true) => Cell::White,
                _ => Cell::Empty,
            })
    }

    /// The legal moves for `color`, in row-major order.
    #[inline]
    pub fn legal_moves(self, color: Color) -> LocationList {
        let (active, opponent) = self.split(color);
        bitboard::get_move_mask(active, opponent).into()
    }

    /// Whether `color` has at least one legal move.
    #[inline]
    pub fn has_moves(self, color: Color) -> bool {
        !self.legal_moves(color).is_empty()
    }

    /// Whether `loc` is a legal move for `color`.
    #[inline]
    pub fn is_legal(self, color: Color, loc: Location) -> bool {
        self.legal_moves(color).contains(loc)
    }

    /// Place a disk for `color` at `loc` and flip every captured run.
    /// Fails without touching anything if the move isn't legal.
    pub fn apply_move(self, color: Color, loc: Location) -> Result<Self, IllegalMoveError> {
        if !self.is_legal(color, loc) {
            return Err(IllegalMoveError {
                color,
                location: loc,
            });
        }

        Ok(self.apply_move_unchecked(color, loc))
    }

    /// Like [`Board::apply_move`], without the legality check.
    /// Results in inconsistent state if `loc` is not a legal move for `color`.
    #[inline]
    pub fn apply_move_unchecked(self, color: Color, loc: Location) -> Self {
        let (active, opponent) = self.split(color);
        let (active, opponent) = bitboard::apply_move(active, opponent, loc.into());
        Self::join(color, active, opponent)
    }

    /// Disk counts for both colors.
    #[inline]
    pub fn score(self) -> Score {
        Score {
            black: self.black.count_occupied(),
            white: self.white.count_occupied(),
        }
    }

    /// Score a board from `color`'s perspective as: # my pieces - # opponent pieces.
    #[inline]
    pub fn score_absolute_difference(self, color: Color) -> i8 {
        let (active, opponent) = self.split(color);
        bitboard::score_absolute_difference(active, opponent)
    }

    /// The game is over exactly when neither color can move.
    pub fn is_finished(self) -> bool {
        !self.has_moves(Color::Black) && !self.has_moves(Color::White)
    }

    /// The corners held by `color`.
    pub fn corners(self, color: Color) -> Bitboard {
        self.bitboard(color) & CORNERS
    }

    /// A stable, 64-character encoding of the board contents, row-major:
    /// `X` for black, `O` for white, `-` for empty.
    /// Does not depend on whose turn it is.
    pub fn fingerprint(self) -> String {
        self.cells().map(Cell::symbol).collect()
    }
}

impl From<Board> for String {
    fn from(board: Board) -> Self {
        board.fingerprint()
    }
}

impl TryFrom<String> for Board {
    type Error = ParseBoardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
pub enum ParseBoardError {
    #[display(fmt = "expected 64 squares, found {}", found)]
    WrongLength { found: usize },
    #[display(fmt = "unrecognized square symbol '{}'", found)]
    InvalidSymbol { found: char },
}

/// Parse a board from 64 square symbols in row-major order.
/// `X`/`B` are black, `O`/`W` are white, and `-`/`.` are empty; whitespace is ignored.
impl std::str::FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if symbols.len() != NUM_SPACES {
            return Err(ParseBoardError::WrongLength {
                found: symbols.len(),
            });
        }

        let mut black = 0u64;
        let mut white = 0u64;
        for (position, symbol) in symbols.into_iter().enumerate() {
            let bit = 1u64 << (NUM_SPACES - 1 - position);
            match symbol.to_ascii_uppercase() {
                'X' | 'B' => black |= bit,
                'O' | 'W' => white |= bit,
                '-' | '.' => {}
                found => return Err(ParseBoardError::InvalidSymbol { found }),
            }
        }

        Ok(Self {
            black: black.into(),
            white: white.into(),
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::format_grid(
            self.cells().map(|cell| match cell {
                Cell::Empty => '.',
                other => other.symbol(),
            }),
            f,
        )
    }
}
