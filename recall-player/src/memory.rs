//! Exact-position memory of moves that won games.
//!
//! Entries are keyed by [`Board::fingerprint`], which ignores the side to
//! move: two identical boards reached with different colors to play share
//! one entry.

use chrono::{DateTime, Utc};
use recall_othello::{Board, Color, Location, LocationList, Ply};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::btree_map::{self, BTreeMap};

/// A remembered move for one position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntry {
    pub location: Location,
    /// How many winning games have played this move from this position.
    pub confidence: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Below this many recorded games, any remembered move is trusted.
    pub trust_threshold: u64,
    /// Plies at the start of a game that are never remembered.
    pub opening_skip: usize,
    /// Plies at the end of a game that are never remembered.
    pub endgame_skip: usize,
    /// How far past capacity the memory may grow before it is pruned.
    pub prune_margin_percent: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            trust_threshold: 50,
            opening_skip: 15,
            endgame_skip: 8,
            prune_margin_percent: 10,
        }
    }
}

/// Map from board fingerprint to the move that won from it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearningMemory {
    entries: BTreeMap<String, MemoryEntry>,
}

impl LearningMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, fingerprint: &str) -> Option<&MemoryEntry> {
        self.entries.get(fingerprint)
    }

    /// Insert or replace the entry for `fingerprint`.
    pub fn insert(&mut self, fingerprint: String, entry: MemoryEntry) -> Option<MemoryEntry> {
        self.entries.insert(fingerprint, entry)
    }

    /// Entries in fingerprint order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, MemoryEntry> {
        self.entries.iter()
    }

    /// The remembered move for `board`, if it is legal and trusted.
    ///
    /// Early in training every memory is trusted; afterwards only entries
    /// with positive confidence are.
    pub fn lookup(
        &self,
        board: Board,
        legal: LocationList,
        total_games: u64,
        config: &MemoryConfig,
    ) -> Option<Location> {
        let entry = self.entries.get(&board.fingerprint())?;

        if !legal.contains(entry.location) {
            return None;
        }

        if total_games < config.trust_threshold || entry.confidence > 0 {
            Some(entry.location)
        } else {
            None
        }
    }

    /// Remember the winner's moves from the middle of a finished game.
    /// Returns the number of entries created or strengthened.
    ///
    /// Losing moves are never penalized, and a draw teaches nothing.
    pub fn reinforce(
        &mut self,
        history: &[Ply],
        winner: Option<Color>,
        now: DateTime<Utc>,
        config: &MemoryConfig,
    ) -> usize {
        let winner = match winner {
            Some(winner) => winner,
            None => return 0,
        };

        let end = history.len().saturating_sub(config.endgame_skip);
        if config.opening_skip >= end {
            return 0;
        }

        let mut touched = 0;
        for ply in history[config.opening_skip..end]
            .iter()
            .filter(|ply| ply.color == winner)
        {
            match self.entries.entry(ply.board.fingerprint()) {
                btree_map::Entry::Occupied(mut occupied)
                    if occupied.get().location == ply.location =>
                {
                    let entry = occupied.get_mut();
                    entry.confidence = entry.confidence.saturating_add(1);
                    entry.updated_at = now;
                }
                btree_map::Entry::Occupied(mut occupied) => {
                    occupied.insert(MemoryEntry {
                        location: ply.location,
                        confidence: 1,
                        updated_at: now,
                    });
                }
                btree_map::Entry::Vacant(vacant) => {
                    vacant.insert(MemoryEntry {
                        location: ply.location,
                        confidence: 1,
                        updated_at: now,
                    });
                }
            }
            touched += 1;
        }

        touched
    }

    /// Entries from most to least valuable: highest confidence first, then
    /// most recently updated, then by fingerprint.
    pub fn ranked(&self) -> Vec<(&str, &MemoryEntry)> {
        let mut ranked: Vec<(&str, &MemoryEntry)> = self
            .entries
            .iter()
            .map(|(fingerprint, entry)| (fingerprint.as_str(), entry))
            .collect();
        ranked.sort_by(|a, b| rank(a, b));
        ranked
    }

    /// Once the memory has grown past `capacity` plus the margin, keep only
    /// the `capacity` best entries. Returns the number evicted.
    pub fn prune_if_needed(&mut self, capacity: usize, config: &MemoryConfig) -> usize {
        let margin = capacity.saturating_mul(config.prune_margin_percent) / 100;
        let threshold = capacity.saturating_add(margin);
        if self.entries.len() <= threshold {
            return 0;
        }

        let keep: BTreeMap<String, MemoryEntry> = self
            .ranked()
            .into_iter()
            .take(capacity)
            .map(|(fingerprint, entry)| (fingerprint.to_owned(), *entry))
            .collect();

        let evicted = self.entries.len() - keep.len();
        self.entries = keep;
        evicted
    }
}

fn rank(a: &(&str, &MemoryEntry), b: &(&str, &MemoryEntry)) -> Ordering {
    b.1.confidence
        .cmp(&a.1.confidence)
        .then_with(|| b.1.updated_at.cmp(&a.1.updated_at))
        .then_with(|| a.0.cmp(b.0))
}

impl FromIterator<(String, MemoryEntry)> for LearningMemory {
    fn from_iter<I: IntoIterator<Item = (String, MemoryEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
