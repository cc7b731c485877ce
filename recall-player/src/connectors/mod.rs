//! Connectors let the agent play against move sources it does not control.

mod agent;
mod provider;
mod stdio;

pub use agent::AgentProvider;
pub use provider::{request_move, MoveProvider, ProviderError};
pub use stdio::StdioProvider;
