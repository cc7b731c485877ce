//! `recall-player` is the learning half of the Recall Othello agent.
//!
//! It remembers winning moves, nudges the evaluator's positional weights after
//! every game, and keeps both in a [`KnowledgeSnapshot`] that a
//! [`KnowledgeStore`] persists. Choosing and learning are pure:
//! [`compute_move`] only reads a snapshot and [`apply_outcome`] returns a new
//! one. Only stores touch the outside world.

pub mod connectors;
pub mod store;

mod adapter;
mod agent;
mod knowledge;
mod memory;
mod selfplay;
mod shared;

pub use adapter::{adapt_weights, AdapterParams};
pub use agent::{compute_move, decide, AgentConfig, Decision, MoveSource};
pub use knowledge::{
    apply_outcome, migrate, parse_snapshot, validate_import, KnowledgeSnapshot,
    DEFAULT_MEMORY_CAPACITY, SCHEMA_VERSION,
};
pub use memory::{LearningMemory, MemoryConfig, MemoryEntry};
pub use selfplay::{play_against, play_game, GameRecord};
pub use shared::SharedKnowledge;
pub use store::{JsonFileStore, KnowledgeStore, MemoryStore, StoreError};
