//! Position evaluation and move search for the Recall Othello agent.
//!
//! Nothing here performs I/O: the caller passes in the weights and
//! configuration it wants searched with, and gets a [`SearchOutcome`] back.

pub mod evaluate;
pub mod search;
mod weights;

pub use evaluate::{evaluate, EvalParams};
pub use search::{choose_move, search_depth, Role, SearchConfig, SearchOutcome};
pub use weights::Weights;
