use super::{MoveProvider, ProviderError};
use crate::agent::{decide, AgentConfig};
use crate::knowledge::KnowledgeSnapshot;
use async_trait::async_trait;
use rand::rngs::StdRng;
use recall_othello::{Board, Color, Location, LocationList};
use recall_search::Role;

/// The agent itself, offered as a provider so it can face any other provider.
pub struct AgentProvider {
    snapshot: KnowledgeSnapshot,
    config: AgentConfig,
    role: Role,
    rng: StdRng,
}

impl AgentProvider {
    pub fn new(snapshot: KnowledgeSnapshot, config: AgentConfig, role: Role, rng: StdRng) -> Self {
        Self {
            snapshot,
            config,
            role,
            rng,
        }
    }
}

#[async_trait]
impl MoveProvider for AgentProvider {
    async fn suggest(
        &mut self,
        board: Board,
        color: Color,
        _legal: LocationList,
    ) -> Result<Location, ProviderError> {
        decide(
            board,
            color,
            &self.snapshot,
            &self.config,
            self.role,
            &mut self.rng,
        )
        .map(|decision| decision.location)
        .ok_or(ProviderError::NoMove)
    }
}
