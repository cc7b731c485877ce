//! Playing whole games, against itself or against a [`MoveProvider`].

use crate::agent::{decide, AgentConfig};
use crate::connectors::{request_move, MoveProvider};
use crate::knowledge::KnowledgeSnapshot;
use rand::Rng;
use recall_othello::{Action, Color, Game, GameError, Ply, Score, NUM_SPACES};
use recall_search::Role;
use tracing::debug;

/// A finished game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameRecord {
    /// One entry per disk placed; passes are not recorded.
    pub history: Vec<Ply>,
    pub winner: Option<Color>,
    pub score: Score,
}

struct Recorder {
    game: Game,
    history: Vec<Ply>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            game: Game::default(),
            history: Vec::with_capacity(NUM_SPACES),
        }
    }

    fn apply(&mut self, action: Action) -> Result<(), GameError> {
        let next = self.game.apply(action)?;
        if let Action::Play(location) = action {
            self.history.push(Ply {
                board: self.game.board,
                location,
                color: self.game.active,
            });
        }
        self.game = next;
        Ok(())
    }

    fn finish(self) -> GameRecord {
        let record = GameRecord {
            winner: self.game.winner(),
            score: self.game.score(),
            history: self.history,
        };
        debug!(
            plies = record.history.len(),
            winner = ?record.winner,
            score = %record.score,
            "game finished"
        );
        record
    }
}

/// Play the agent against itself. Black plays as [`Role::Primary`], white as
/// [`Role::Secondary`]. The snapshot is only read.
pub fn play_game<R: Rng + ?Sized>(
    snapshot: &KnowledgeSnapshot,
    config: &AgentConfig,
    rng: &mut R,
) -> Result<GameRecord, GameError> {
    let mut recorder = Recorder::new();

    while !recorder.game.is_finished() {
        let color = recorder.game.active;
        let role = match color {
            Color::Black => Role::Primary,
            Color::White => Role::Secondary,
        };

        let action = match decide(recorder.game.board, color, snapshot, config, role, rng) {
            Some(decision) => Action::Play(decision.location),
            None => Action::Pass,
        };
        recorder.apply(action)?;
    }

    Ok(recorder.finish())
}

/// Play the agent as `agent` against `provider`.
pub async fn play_against<P, R>(
    provider: &mut P,
    agent: Color,
    snapshot: &KnowledgeSnapshot,
    config: &AgentConfig,
    rng: &mut R,
) -> Result<GameRecord, GameError>
where
    P: MoveProvider + ?Sized,
    R: Rng + ?Sized,
{
    let mut recorder = Recorder::new();

    while !recorder.game.is_finished() {
        let board = recorder.game.board;
        let color = recorder.game.active;

        let location = if color == agent {
            decide(board, color, snapshot, config, Role::Primary, rng)
                .map(|decision| decision.location)
        } else {
            request_move(provider, board, color, config.provider_attempts, rng).await
        };

        recorder.apply(location.map_or(Action::Pass, Action::Play))?;
    }

    Ok(recorder.finish())
}
