//! Rules of Othello for the Recall agent.
//!
//! The crate is layered:
//!
//!  - [`bitboard`] works on raw disk masks. It is fast and checks nothing.
//!  - [`Board`] is a copyable position whose move application validates legality.
//!    The evaluator and search only ever see this type.
//!  - [`Game`] adds the side to move and pass handling, and rejects illegal actions.

pub mod bitboard;
pub mod test_utils;

mod board;
mod game;
mod location;
mod utils;

pub use board::*;
pub use game::*;
pub use location::*;

/// Squares per row and per column.
pub const EDGE_LENGTH: usize = 8;

/// Squares on the whole board.
pub const NUM_SPACES: usize = EDGE_LENGTH * EDGE_LENGTH;
