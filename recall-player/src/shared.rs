//! A knowledge store shared by concurrently finishing games.

use crate::agent::AgentConfig;
use crate::knowledge::{apply_outcome, KnowledgeSnapshot};
use crate::selfplay::GameRecord;
use crate::store::{KnowledgeStore, StoreError};
use chrono::Utc;
use recall_othello::Color;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Serializes every load-learn-save cycle on one store, so no game's update is lost.
pub struct SharedKnowledge<S> {
    store: Mutex<S>,
}

impl<S: KnowledgeStore> SharedKnowledge<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// The currently stored snapshot.
    pub fn snapshot(&self) -> Result<KnowledgeSnapshot, StoreError> {
        self.lock().load()
    }

    /// Learn from `record` and persist the result, returning the new snapshot.
    ///
    /// A failed save is reported and leaves the stored snapshot as it was.
    pub fn record_game(
        &self,
        record: &GameRecord,
        agent: Color,
        config: &AgentConfig,
    ) -> Result<KnowledgeSnapshot, StoreError> {
        let mut store = self.lock();
        let snapshot = store.load().map_err(|err| {
            warn!(%err, "could not load knowledge to record a game");
            err
        })?;
        let mut updated = apply_outcome(
            &snapshot,
            &record.history,
            record.winner,
            agent,
            config,
            Utc::now(),
        );

        if let Err(err) = store.save(&mut updated, &config.memory) {
            warn!(%err, "could not persist game outcome");
            return Err(err);
        }
        Ok(updated)
    }

    pub fn into_inner(self) -> S {
        self.store
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        // Stores only change through whole-document writes.
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
