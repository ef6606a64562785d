//! Game session - the single owner of all client-side game state
//!
//! Network messages, keystrokes and display ticks all arrive through
//! [`GameSession::handle`] and are processed one at a time to completion.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::render::Collaborators;
use crate::util::rate_limit::{LogThrottle, DROPPED_MESSAGE_LOG_LIMIT};
use crate::ws::protocol::ClientMsg;

use super::clock::SimulationClock;
use super::dispatch;
use super::effects::EffectPool;
use super::input::{InputMatcher, KeyInput, MatchState};
use super::status::{apply_changes, StatusController};
use super::vitals::GameVitals;
use super::words::{Stage, WordStore};
use super::{InputEvent, NetworkEvent, SessionEvent};

/// Outbound channel to the authority is gone
#[derive(Debug, Error)]
#[error("outbound channel closed")]
pub struct ChannelError;

/// Result of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    pub fn banner(self) -> &'static str {
        match self {
            Outcome::Won => "GAME OVER: YOU WIN",
            Outcome::Lost => "GAME OVER: YOU LOSE",
        }
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Connected, waiting for the authority to start
    Lobby,
    /// Words falling, input live
    Playing,
    /// Game over was received
    Over(Outcome),
    /// Channel to the authority failed
    Disconnected,
}

/// Counters for things that went wrong without stopping the session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    pub dropped_messages: u64,
    pub duplicate_spawns: u64,
    pub evicted_fragments: u64,
    pub ticks: u64,
}

pub struct GameSession {
    pub(super) player_id: String,
    pub(super) is_host: bool,
    pub(super) phase: Phase,
    pub(super) words: WordStore,
    pub(super) effects: EffectPool,
    pub(super) input: MatchState,
    pub(super) vitals: GameVitals,
    pub(super) status: StatusController,
    pub(super) clock: SimulationClock,
    pub(super) collab: Collaborators,
    pub(super) outbound: mpsc::UnboundedSender<ClientMsg>,
    pub(super) dropped_messages: u64,
    pub(super) drop_log: LogThrottle,
}

impl GameSession {
    pub fn new(
        config: &Config,
        collab: Collaborators,
        outbound: mpsc::UnboundedSender<ClientMsg>,
    ) -> Self {
        let seed = config.rng_seed.unwrap_or_else(rand::random);
        Self {
            player_id: config.player_id.clone(),
            is_host: config.is_host,
            phase: Phase::Lobby,
            words: WordStore::new(),
            effects: EffectPool::new(
                config.max_effect_fragments,
                ChaCha8Rng::seed_from_u64(seed),
            ),
            input: MatchState::new(),
            vitals: GameVitals::default(),
            status: StatusController::new(ChaCha8Rng::seed_from_u64(seed.wrapping_add(1))),
            clock: SimulationClock::new(),
            collab,
            outbound,
            dropped_messages: 0,
            drop_log: LogThrottle::new(DROPPED_MESSAGE_LOG_LIMIT),
        }
    }

    /// Process one event to completion. Ignored once the session is finished.
    pub fn handle(&mut self, event: SessionEvent) {
        if self.is_finished() {
            debug!(phase = ?self.phase, "Session finished, event ignored");
            return;
        }

        match event {
            SessionEvent::Network(NetworkEvent::Message {
                payload,
                received_at,
            }) => dispatch::dispatch_text(self, &payload, received_at),
            SessionEvent::Network(NetworkEvent::Closed { reason }) => self.disconnect(&reason),
            SessionEvent::Input(InputEvent::Key(key)) => self.handle_key(key),
            SessionEvent::Input(InputEvent::StartRequested) => self.request_start(),
            SessionEvent::Tick { now } => self.tick(now),
        }
    }

    fn handle_key(&mut self, key: KeyInput) {
        if self.phase != Phase::Playing {
            debug!(?key, "Game not running, key ignored");
            return;
        }
        let submission = InputMatcher::handle_key(
            key,
            &mut self.input,
            &mut self.words,
            self.collab.surface.as_mut(),
            self.collab.hud.as_mut(),
        );
        if let Some(msg) = submission {
            self.send(msg);
        }
    }

    fn request_start(&mut self) {
        if !self.is_host {
            warn!("Only the host can start the game");
            return;
        }
        if self.phase != Phase::Lobby {
            debug!(phase = ?self.phase, "Start requested outside the lobby");
            return;
        }
        info!("Requesting game start");
        self.send(ClientMsg::StartGame);
    }

    fn tick(&mut self, now: u64) {
        self.clock.tick(
            now,
            &mut self.words,
            &mut self.effects,
            &mut self.status,
            self.collab.surface.as_mut(),
        );
    }

    /// Queue a message for the authority
    pub(super) fn send(&mut self, msg: ClientMsg) {
        if let Err(e) = self.try_send(msg) {
            self.disconnect(&e.to_string());
        }
    }

    fn try_send(&self, msg: ClientMsg) -> Result<(), ChannelError> {
        self.outbound.send(msg).map_err(|_| ChannelError)
    }

    /// Enter the running state. No-op when already running.
    pub(super) fn start_game(&mut self) {
        if self.phase != Phase::Lobby {
            debug!(phase = ?self.phase, "Game already started");
            return;
        }
        info!(player_id = %self.player_id, "Game started");
        self.phase = Phase::Playing;
        self.collab.hud.set_start_enabled(false);
        self.collab.hud.set_input_preview("");
        self.vitals.publish(self.collab.hud.as_mut());
        self.collab.audio.play_background_loop();
    }

    /// Present the outcome and reset to an empty scene. Terminal.
    pub(super) fn finish(&mut self, outcome: Outcome) {
        info!(?outcome, "Game over");
        self.collab.audio.stop_background_loop();
        self.collab.hud.show_outcome(outcome.banner());
        self.reset();
        self.phase = Phase::Over(outcome);
    }

    /// Channel to the authority failed. Terminal.
    pub(super) fn disconnect(&mut self, reason: &str) {
        warn!(reason, "Connection lost");
        self.collab.audio.stop_background_loop();
        self.collab
            .hud
            .notify(&format!("CONNECTION LOST: {}", reason));
        self.phase = Phase::Disconnected;
    }

    fn reset(&mut self) {
        let mut stage = Stage {
            surface: self.collab.surface.as_mut(),
            audio: self.collab.audio.as_mut(),
            effects: &mut self.effects,
        };
        let removed = self.words.remove_all(false, &mut stage);
        self.effects.clear(self.collab.surface.as_mut());
        apply_changes(&self.status.cancel_all(), self.collab.surface.as_mut());
        self.input.clear();
        self.vitals = GameVitals::default();
        debug!(removed, "Session reset");
    }

    /// Borrow the scene collaborators for a word removal
    pub(super) fn stage(&mut self) -> (&mut WordStore, Stage<'_>) {
        (
            &mut self.words,
            Stage {
                surface: self.collab.surface.as_mut(),
                audio: self.collab.audio.as_mut(),
                effects: &mut self.effects,
            },
        )
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Game over or disconnected
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Over(_) | Phase::Disconnected)
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn words(&self) -> &WordStore {
        &self.words
    }

    pub fn effects(&self) -> &EffectPool {
        &self.effects
    }

    pub fn vitals(&self) -> &GameVitals {
        &self.vitals
    }

    pub fn status(&self) -> &StatusController {
        &self.status
    }

    pub fn current_input(&self) -> &str {
        self.input.current_input()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            dropped_messages: self.dropped_messages,
            duplicate_spawns: self.words.duplicate_spawns(),
            evicted_fragments: self.effects.evicted(),
            ticks: self.clock.ticks(),
        }
    }
}
