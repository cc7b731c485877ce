//! Mask-level move generation.
//!
//! Nothing here checks its inputs: every function assumes the `active` and
//! `opponent` masks are disjoint, which [`Board`](crate::Board) guarantees.
//!
//! Bit 63 is A1 and bit 0 is H8, so reading bits from the top down walks the
//! board row by row.

use crate::{utils, NUM_SPACES};
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign};
use derive_more::{From, Into, Not};
use std::fmt::{self, Display, Formatter};

/// One bit per square. A newtype so masks never mix with plain integers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(From, Into, Not, BitAnd, BitOr, BitXor, BitAndAssign, BitOrAssign, BitXorAssign)]
pub struct Bitboard(u64);

/// Black's disks at the opening: D5 and E4.
pub const BLACK_START: Bitboard = Bitboard(0x0000_0008_1000_0000);

/// White's disks at the opening: D4 and E5.
pub const WHITE_START: Bitboard = Bitboard(0x0000_0010_0800_0000);

/// The four corner squares.
pub const CORNERS: Bitboard = Bitboard(0x8100_0000_0000_0081);

// Masks clearing the leftmost and rightmost columns after a horizontal shift wraps.
const NOT_LEFT_COLUMN: u64 = 0x7f7f_7f7f_7f7f_7f7f;
const NOT_RIGHT_COLUMN: u64 = 0xfefe_fefe_fefe_fefe;

/// A direction a capturing line can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];
}

impl Display for Bitboard {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let marks = self.into_iter().map(|set| if set { '#' } else { '.' });
        utils::format_grid(marks, f)
    }
}

impl Bitboard {
    /// Set bits.
    #[inline]
    pub fn count_occupied(self) -> u8 {
        self.0.count_ones() as u8
    }

    /// Clear bits.
    #[inline]
    pub fn count_empty(self) -> u8 {
        NUM_SPACES as u8 - self.count_occupied()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self(0)
    }

    /// Move every bit one square in `direction`, dropping bits that leave the board.
    #[inline]
    pub fn shift(self, direction: Direction) -> Self {
        let bits = self.0;
        Self(match direction {
            Direction::North => bits << 8,
            Direction::South => bits >> 8,
            Direction::East => (bits >> 1) & NOT_LEFT_COLUMN,
            Direction::West => (bits << 1) & NOT_RIGHT_COLUMN,
            Direction::NorthEast => (bits << 7) & NOT_LEFT_COLUMN,
            Direction::NorthWest => (bits << 9) & NOT_RIGHT_COLUMN,
            Direction::SouthEast => (bits >> 9) & NOT_LEFT_COLUMN,
            Direction::SouthWest => (bits >> 7) & NOT_RIGHT_COLUMN,
        })
    }
}

/// Disk count of `active` minus disk count of `opponent`.
#[inline]
pub fn score_absolute_difference(active: Bitboard, opponent: Bitboard) -> i8 {
    active.count_occupied() as i8 - opponent.count_occupied() as i8
}

/// Every empty square where `active` would capture at least one disk.
#[inline]
pub fn get_move_mask(active: Bitboard, opponent: Bitboard) -> Bitboard {
    let empties = !(active | opponent);
    let mut moves = Bitboard(0);

    for direction in Direction::ALL {
        // Smear our pieces across contiguous opponent runs. A run is at most six long.
        let mut run = active.shift(direction) & opponent;
        for _ in 0..5 {
            run |= run.shift(direction) & opponent;
        }

        // One more step past a run lands on a capturing square if it's empty.
        moves |= run.shift(direction) & empties;
    }

    moves
}

/// Compute the mask of opponent pieces flipped when the active player places
/// a piece at the one-hot `move_mask`.
#[inline]
pub fn get_flip_mask(active: Bitboard, opponent: Bitboard, move_mask: Bitboard) -> Bitboard {
    let mut flips = Bitboard(0);

    for direction in Direction::ALL {
        let mut captured = Bitboard(0);
        let mut cursor = move_mask.shift(direction);

        while !(cursor & opponent).is_empty() {
            captured |= cursor;
            cursor = cursor.shift(direction);
        }

        // The run only flips if it is closed off by one of our own pieces.
        if !(cursor & active).is_empty() {
            flips |= captured;
        }
    }

    flips
}

/// Place a disk at the one-hot `move_mask` and flip what it captures.
/// Returns the `(active, opponent)` masks afterwards. The move must be legal.
#[inline]
pub fn apply_move(
    active: Bitboard,
    opponent: Bitboard,
    move_mask: Bitboard,
) -> (Bitboard, Bitboard) {
    let flips = get_flip_mask(active, opponent, move_mask);
    (active | flips | move_mask, opponent & !flips)
}

/// The bits of a [`Bitboard`] as booleans, A1 first.
#[derive(Debug, Clone, Copy)]
pub struct Squares {
    bits: u64,
    cursor: u64,
}

impl Iterator for Squares {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.cursor == 0 {
            return None;
        }

        let set = self.bits & self.cursor != 0;
        self.cursor >>= 1;
        Some(set)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.cursor == 0 {
            0
        } else {
            self.cursor.trailing_zeros() as usize + 1
        };
        (left, Some(left))
    }
}

impl ExactSizeIterator for Squares {}

impl IntoIterator for Bitboard {
    type Item = bool;
    type IntoIter = Squares;

    fn into_iter(self) -> Squares {
        Squares {
            bits: self.0,
            cursor: 1 << (NUM_SPACES - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_moves() {
        let moves = get_move_mask(BLACK_START, WHITE_START);
        // D3, C4, F5, E6
        assert_eq!(moves, Bitboard(0x0000_1020_0408_0000));
        assert_eq!(moves.count_occupied(), 4);
    }

    #[test]
    fn shifts_do_not_wrap() {
        let right_column = Bitboard(0x0101_0101_0101_0101);
        assert!(right_column.shift(Direction::East).is_empty());
        assert!(right_column.shift(Direction::NorthEast).is_empty());
        assert!(right_column.shift(Direction::SouthEast).is_empty());

        let left_column = Bitboard(0x8080_8080_8080_8080);
        assert!(left_column.shift(Direction::West).is_empty());
        assert!(left_column.shift(Direction::NorthWest).is_empty());
        assert!(left_column.shift(Direction::SouthWest).is_empty());
    }

    #[test]
    fn apply_opening_move() {
        // Black plays D3 (row 2, col 3), flipping D4.
        let d3 = Bitboard(1 << 44);
        let (black, white) = apply_move(BLACK_START, WHITE_START, d3);
        assert_eq!(black.count_occupied(), 4);
        assert_eq!(white.count_occupied(), 1);
        assert!((black & white).is_empty());
    }

    #[test]
    fn squares_run_from_a1_to_h8() {
        let corners: Vec<bool> = CORNERS.into_iter().collect();
        assert_eq!(corners.len(), NUM_SPACES);
        assert_eq!(CORNERS.into_iter().len(), NUM_SPACES);

        let set: Vec<usize> = (0..NUM_SPACES).filter(|&i| corners[i]).collect();
        assert_eq!(set, vec![0, 7, 56, 63]);
    }
}
