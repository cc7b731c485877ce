//! Move selection: remembered moves first, search otherwise.

use crate::adapter::AdapterParams;
use crate::knowledge::KnowledgeSnapshot;
use crate::memory::MemoryConfig;
use rand::Rng;
use recall_othello::{Board, Color, Location};
use recall_search::{choose_move, EvalParams, Role, SearchConfig};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Every tunable of the agent, loadable from one JSON document.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub search: SearchConfig,
    pub eval: EvalParams,
    pub memory: MemoryConfig,
    pub adapter: AdapterParams,
    /// How many times an external provider is asked before a random move is played.
    pub provider_attempts: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            eval: EvalParams::default(),
            memory: MemoryConfig::default(),
            adapter: AdapterParams::default(),
            provider_attempts: 3,
        }
    }
}

/// Where a chosen move came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveSource {
    Memory,
    Search { score: f64, depth: u8, nodes: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    pub location: Location,
    pub source: MoveSource,
}

/// Decide on a move for `color`, or None if `color` must pass.
pub fn decide<R: Rng + ?Sized>(
    board: Board,
    color: Color,
    snapshot: &KnowledgeSnapshot,
    config: &AgentConfig,
    role: Role,
    rng: &mut R,
) -> Option<Decision> {
    let legal = board.legal_moves(color);
    if legal.is_empty() {
        return None;
    }

    if let Some(location) =
        snapshot
            .memory
            .lookup(board, legal, snapshot.total_games, &config.memory)
    {
        trace!(%color, %location, "playing remembered move");
        return Some(Decision {
            location,
            source: MoveSource::Memory,
        });
    }

    let outcome = choose_move(
        board,
        color,
        &snapshot.weights,
        &config.eval,
        &config.search,
        role,
        rng,
    )?;

    Some(Decision {
        location: outcome.location,
        source: MoveSource::Search {
            score: outcome.score,
            depth: outcome.depth,
            nodes: outcome.nodes,
        },
    })
}

/// The move the agent plays for `color`, as the primary player.
pub fn compute_move<R: Rng + ?Sized>(
    board: Board,
    color: Color,
    snapshot: &KnowledgeSnapshot,
    config: &AgentConfig,
    rng: &mut R,
) -> Option<Location> {
    decide(board, color, snapshot, config, Role::Primary, rng).map(|decision| decision.location)
}
