//! The persisted knowledge snapshot and its schema migration.

use crate::adapter::adapt_weights;
use crate::memory::{LearningMemory, MemoryEntry};
use crate::store::StoreError;
use crate::AgentConfig;
use chrono::{DateTime, TimeZone, Utc};
use recall_othello::{Board, Color, Location, Ply};
use recall_search::Weights;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Version written into every saved snapshot. Documents without a version are version 0.
pub const SCHEMA_VERSION: u32 = 1;

/// Memory capacity for a fresh snapshot.
pub const DEFAULT_MEMORY_CAPACITY: usize = 5000;

/// Everything the agent has learned, saved and loaded as a whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSnapshot {
    pub version: u32,
    pub memory: LearningMemory,
    pub weights: Weights,
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    /// Total memory reinforcements over all games.
    pub experience: u64,
    pub memory_capacity: usize,
}

impl Default for KnowledgeSnapshot {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            memory: LearningMemory::new(),
            weights: Weights::default(),
            total_games: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            experience: 0,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

/// Learn from a finished game, returning the updated snapshot.
///
/// `agent` is the color whose results count as wins and losses.
pub fn apply_outcome(
    snapshot: &KnowledgeSnapshot,
    history: &[Ply],
    winner: Option<Color>,
    agent: Color,
    config: &AgentConfig,
    now: DateTime<Utc>,
) -> KnowledgeSnapshot {
    let mut next = snapshot.clone();
    next.version = SCHEMA_VERSION;
    next.weights = adapt_weights(&snapshot.weights, history, winner, &config.adapter);
    let reinforced = next.memory.reinforce(history, winner, now, &config.memory);

    next.total_games += 1;
    next.experience += reinforced as u64;
    match winner {
        Some(color) if color == agent => next.wins += 1,
        Some(_) => next.losses += 1,
        None => next.draws += 1,
    }

    debug!(
        plies = history.len(),
        ?winner,
        reinforced,
        total_games = next.total_games,
        "applied game outcome"
    );
    next
}

/// Parse a stored document, repairing whatever it can.
pub fn parse_snapshot(document: &str) -> Result<KnowledgeSnapshot, StoreError> {
    let value: Value =
        serde_json::from_str(document).map_err(|err| StoreError::CorruptedSnapshot {
            reason: err.to_string(),
        })?;
    migrate(value)
}

/// Bring a document of any schema version up to [`SCHEMA_VERSION`].
///
/// Every absent or malformed field is replaced by its default with a warning,
/// and malformed memory entries are dropped. Only a document that is not a
/// JSON object is rejected.
pub fn migrate(document: Value) -> Result<KnowledgeSnapshot, StoreError> {
    let mut object = match document {
        Value::Object(object) => object,
        other => {
            return Err(StoreError::CorruptedSnapshot {
                reason: format!("expected an object, found {}", kind(&other)),
            })
        }
    };

    let version = match object.remove("version") {
        None => 0,
        Some(value) => match value.as_u64() {
            Some(version) => version,
            None => {
                warn!(field = "version", "malformed snapshot field, treating as version 0");
                0
            }
        },
    };
    if version > u64::from(SCHEMA_VERSION) {
        warn!(version, "snapshot is newer than this build understands");
    } else if version < u64::from(SCHEMA_VERSION) {
        info!(from = version, to = SCHEMA_VERSION, "migrating snapshot");
    }

    let defaults = KnowledgeSnapshot::default();
    let snapshot = KnowledgeSnapshot {
        version: SCHEMA_VERSION,
        memory: take_memory(&mut object),
        weights: take_field(&mut object, "weights").unwrap_or(defaults.weights),
        total_games: take_field(&mut object, "totalGames").unwrap_or(defaults.total_games),
        wins: take_field(&mut object, "wins").unwrap_or(defaults.wins),
        losses: take_field(&mut object, "losses").unwrap_or(defaults.losses),
        draws: take_field(&mut object, "draws").unwrap_or(defaults.draws),
        experience: take_field(&mut object, "experience").unwrap_or(defaults.experience),
        memory_capacity: take_field(&mut object, "memoryCapacity")
            .unwrap_or(defaults.memory_capacity),
    };

    for key in object.keys() {
        debug!(field = %key, "ignoring unknown snapshot field");
    }

    Ok(snapshot)
}

/// Check that an imported document has the fields an import cannot do without.
pub fn validate_import(document: &Value) -> Result<(), StoreError> {
    let invalid = |reason: &str| StoreError::InvalidImport {
        reason: reason.to_owned(),
    };

    let object = document
        .as_object()
        .ok_or_else(|| invalid("document is not an object"))?;

    if !object.get("totalGames").map_or(false, Value::is_number) {
        return Err(invalid("totalGames must be a number"));
    }

    let rows = object
        .get("weights")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("weights must be an 8x8 matrix"))?;
    let square = rows.len() == recall_othello::EDGE_LENGTH
        && rows.iter().all(|row| {
            row.as_array().map_or(false, |cells| {
                cells.len() == recall_othello::EDGE_LENGTH && cells.iter().all(Value::is_number)
            })
        });
    if !square {
        return Err(invalid("weights must be an 8x8 matrix"));
    }

    if !object.get("memory").map_or(false, Value::is_object) {
        return Err(invalid("memory must be an object"));
    }

    Ok(())
}

fn take_field<T: DeserializeOwned>(object: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = match object.remove(key) {
        Some(value) => value,
        None => {
            warn!(field = key, "snapshot field missing, using default");
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(field = key, %err, "malformed snapshot field, using default");
            None
        }
    }
}

fn take_memory(object: &mut Map<String, Value>) -> LearningMemory {
    let entries = match object.remove("memory") {
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            warn!(field = "memory", found = kind(&other), "malformed snapshot field, using default");
            return LearningMemory::new();
        }
        None => {
            warn!(field = "memory", "snapshot field missing, using default");
            return LearningMemory::new();
        }
    };

    let total = entries.len();
    let memory: LearningMemory = entries
        .into_iter()
        .filter_map(|(fingerprint, value)| {
            if fingerprint.parse::<Board>().is_err() {
                return None;
            }
            parse_entry(value).map(|entry| (fingerprint, entry))
        })
        .collect();

    if memory.len() < total {
        warn!(
            dropped = total - memory.len(),
            "discarded malformed memory entries"
        );
    }
    memory
}

/// The shape of a memory entry before timestamps were stored as RFC 3339.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEntry {
    location: Location,
    confidence: u32,
    /// Milliseconds since the Unix epoch.
    updated_at: i64,
}

fn parse_entry(value: Value) -> Option<MemoryEntry> {
    if let Ok(entry) = serde_json::from_value::<MemoryEntry>(value.clone()) {
        return Some(entry);
    }

    let legacy: LegacyEntry = serde_json::from_value(value).ok()?;
    let updated_at = Utc.timestamp_millis_opt(legacy.updated_at).single()?;
    Some(MemoryEntry {
        location: legacy.location,
        confidence: legacy.confidence,
        updated_at,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
