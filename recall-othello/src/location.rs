//! Code for working with [`Location`]s on the Othello board.

use crate::bitboard::Bitboard;
use crate::EDGE_LENGTH;
use derive_more::{Display, Error, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter, Write};

/// A location on the Othello board.
#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Into, Serialize, Deserialize,
)]
#[serde(into = "Coords", try_from = "Coords")]
pub struct Location(Bitboard);

/// A list of locations on the Othello board, which can be iterated to retrieve them.
/// Iteration is in row-major order, starting from the upper-left corner.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, From, Into)]
pub struct LocationList(Bitboard);

/// The serialized form of a [`Location`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub row: u8,
    pub col: u8,
}

impl Location {
    /// Convert from a one-hot [`Bitboard`] without checking this invariant.
    /// Results in inconsistent state if `bitboard` has more than one location set.
    #[inline]
    pub fn from_onehot_unchecked(bitboard: Bitboard) -> Self {
        Self(bitboard)
    }

    /// Convert from a bit index: 0 for the bottom right, 63 for the top left.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        Self(Bitboard::from(1 << index))
    }

    /// Convert into a bit index: 0 for the bottom right, 63 for the top left.
    #[inline]
    pub fn to_index(self) -> u8 {
        let bitboard: u64 = self.0.into();
        bitboard.trailing_zeros() as u8
    }

    /// Convert from row and column coordinates.
    /// Returns None if the coordinates are off the board.
    pub fn from_coords(row: usize, col: usize) -> Option<Self> {
        if row >= EDGE_LENGTH || col >= EDGE_LENGTH {
            return None;
        }

        let index = (EDGE_LENGTH - 1 - col) + ((EDGE_LENGTH - 1 - row) * EDGE_LENGTH);
        Some(Self::from_index(index as u8))
    }

    /// Get the row and column coordinates.
    pub fn to_coords(self) -> (usize, usize) {
        let index = self.to_index() as usize;
        let row = EDGE_LENGTH - 1 - index / EDGE_LENGTH;
        let col = EDGE_LENGTH - 1 - index % EDGE_LENGTH;
        (row, col)
    }

    /// Get the row-major position of this location, from 0 (A1) to 63 (H8).
    #[inline]
    pub fn to_position(self) -> usize {
        let (row, col) = self.to_coords();
        row * EDGE_LENGTH + col
    }

    /// Chebyshev (king-move) distance between two locations.
    pub fn distance(self, other: Location) -> usize {
        let (row, col) = self.to_coords();
        let (other_row, other_col) = other.to_coords();
        row.abs_diff(other_row).max(col.abs_diff(other_col))
    }
}

/// Column letter then 1-based row: `(2, 3)` is "D3".
impl fmt::Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (row, col) = self.to_coords();
        f.write_char(char::from(b'A' + col as u8))?;
        write!(f, "{}", row + 1)
    }
}

impl From<Location> for Coords {
    fn from(loc: Location) -> Self {
        let (row, col) = loc.to_coords();
        Self {
            row: row as u8,
            col: col as u8,
        }
    }
}

impl TryFrom<Coords> for Location {
    type Error = ParseLocationError;

    fn try_from(coords: Coords) -> Result<Self, Self::Error> {
        Self::from_coords(coords.row as usize, coords.col as usize).ok_or(ParseLocationError)
    }
}

impl LocationList {
    pub fn contains(self, loc: Location) -> bool {
        !(self.0 & loc.0).is_empty()
    }

    pub fn is_empty(self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
#[display(fmt = "invalid location")]
pub struct ParseLocationError;

/// Parse notation such as "D3" or "d3".
impl std::str::FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (file, rank) = match *s.trim().as_bytes() {
            [file, rank] => (file, rank),
            _ => return Err(ParseLocationError),
        };

        let col = file
            .to_ascii_uppercase()
            .checked_sub(b'A')
            .ok_or(ParseLocationError)?;
        let row = rank.checked_sub(b'1').ok_or(ParseLocationError)?;
        Self::from_coords(usize::from(row), usize::from(col)).ok_or(ParseLocationError)
    }
}

impl ExactSizeIterator for LocationList {}

impl Iterator for LocationList {
    type Item = Location;

    fn next(&mut self) -> Option<Location> {
        let bits: u64 = self.0.into();
        if bits == 0 {
            return None;
        }

        // The highest set bit is the first square in row-major order.
        let first = 1u64 << (63 - bits.leading_zeros());
        self.0 = Bitboard::from(bits & !first);
        Some(Location::from_onehot_unchecked(Bitboard::from(first)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_occupied() as usize;
        (len, Some(len))
    }
}

impl fmt::Display for LocationList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        for (i, loc) in (*self).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", loc)?;
        }
        f.write_char(']')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> Location {
        text.parse().unwrap()
    }

    #[test]
    fn index_and_coords_agree() {
        for index in 0..64u8 {
            let loc = Location::from_index(index);
            assert_eq!(loc.to_index(), index);
            assert_eq!(loc.to_position(), 63 - usize::from(index));

            let (row, col) = loc.to_coords();
            assert_eq!(Location::from_coords(row, col), Some(loc));
        }

        assert_eq!(Location::from_coords(0, 0), Some(Location::from_index(63)));
        assert_eq!(Location::from_coords(7, 7), Some(Location::from_index(0)));
        assert_eq!(Location::from_coords(8, 0), None);
        assert_eq!(Location::from_coords(0, 8), None);
    }

    #[test]
    fn notation() {
        for &(text, row, col) in &[("A1", 0, 0), ("h8", 7, 7), ("D3", 2, 3), ("f5", 4, 5)] {
            let loc = at(text);
            assert_eq!(loc.to_coords(), (row, col));
            assert_eq!(loc.to_string(), text.to_ascii_uppercase());
        }

        for bad in &["", "A", "A0", "A9", "I5", "AA", "A12", "11", " "] {
            assert_eq!(bad.parse::<Location>(), Err(ParseLocationError), "{:?}", bad);
        }
    }

    #[test]
    fn list_iterates_row_major() {
        let bits = Bitboard::from(at("H8")) | Bitboard::from(at("A1")) | Bitboard::from(at("D4"));
        let list = LocationList::from(bits);

        assert_eq!(list.len(), 3);
        assert!(list.contains(at("D4")));
        assert!(!list.contains(at("D5")));
        assert_eq!(list.to_string(), "[A1, D4, H8]");
        assert_eq!(LocationList::default().to_string(), "[]");
    }

    #[test]
    fn distance_is_chebyshev() {
        let a1 = at("A1");
        assert_eq!(a1.distance(a1), 0);
        assert_eq!(a1.distance(at("B2")), 1);
        assert_eq!(a1.distance(at("A2")), 1);
        assert_eq!(a1.distance(at("C2")), 2);
        assert_eq!(at("H8").distance(a1), 7);
    }

    #[test]
    fn serializes_as_coords() {
        let loc = at("D3");
        let json = serde_json::to_string(&loc).unwrap();
        assert_eq!(json, r#"{"row":2,"col":3}"#);
        assert_eq!(serde_json::from_str::<Location>(&json).unwrap(), loc);
        assert!(serde_json::from_str::<Location>(r#"{"row":8,"col":0}"#).is_err());
    }
}
