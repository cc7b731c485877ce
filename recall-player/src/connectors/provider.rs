use async_trait::async_trait;
use derive_more::{Display, Error};
use rand::seq::IteratorRandom;
use rand::Rng;
use recall_othello::{Board, Color, Location, LocationList};
use std::io;
use tracing::warn;

/// Something outside the agent that can suggest moves: another engine, a
/// remote service, a person at a terminal.
///
/// Providers are offered the exact set of legal moves, but nothing forces
/// them to pick one of them. Use [`request_move`] rather than calling
/// [`MoveProvider::suggest`] directly.
#[async_trait]
pub trait MoveProvider {
    async fn suggest(
        &mut self,
        board: Board,
        color: Color,
        legal: LocationList,
    ) -> Result<Location, ProviderError>;
}

#[derive(Debug, Display, Error)]
pub enum ProviderError {
    #[display(fmt = "provider I/O failed: {}", source)]
    Io { source: io::Error },
    #[display(fmt = "provider closed the connection")]
    Disconnected,
    #[display(fmt = "could not parse provider reply {:?}", reply)]
    Unparseable { reply: String },
    #[display(fmt = "provider has no move to offer")]
    NoMove,
}

impl From<io::Error> for ProviderError {
    fn from(source: io::Error) -> Self {
        ProviderError::Io { source }
    }
}

/// Ask `provider` for a move up to `max_attempts` times, falling back to a
/// uniformly random legal move. Returns None only if `color` must pass.
pub async fn request_move<P, R>(
    provider: &mut P,
    board: Board,
    color: Color,
    max_attempts: usize,
    rng: &mut R,
) -> Option<Location>
where
    P: MoveProvider + ?Sized,
    R: Rng + ?Sized,
{
    let legal = board.legal_moves(color);
    if legal.is_empty() {
        return None;
    }

    for attempt in 1..=max_attempts {
        match provider.suggest(board, color, legal).await {
            Ok(location) if legal.contains(location) => return Some(location),
            Ok(location) => warn!(attempt, %location, "provider suggested an illegal move"),
            Err(err) => warn!(attempt, %err, "provider failed to suggest a move"),
        }
    }

    let fallback = legal.choose(rng)?;
    warn!(%color, %fallback, "falling back to a random legal move");
    Some(fallback)
}
