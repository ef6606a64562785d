//! Session loop - funnels network, keyboard and frame events into the session

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::game::{Diagnostics, GameSession, InputEvent, NetworkEvent, Phase, SessionEvent};
use crate::util::time::{frame_interval, Timer};

/// Inbound network events buffered ahead of the loop
pub const NETWORK_CHANNEL_CAPACITY: usize = 256;

/// Keystrokes buffered ahead of the loop
pub const INPUT_CHANNEL_CAPACITY: usize = 64;

/// How the session loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub phase: Phase,
    pub diagnostics: Diagnostics,
}

/// Owns the session and drives it from its three event sources
pub struct Runner {
    session: GameSession,
    network_rx: mpsc::Receiver<NetworkEvent>,
    input_rx: mpsc::Receiver<InputEvent>,
    frame: Duration,
    timer: Timer,
}

impl Runner {
    /// `timer` must be the clock the transport stamps messages with
    pub fn new(
        session: GameSession,
        network_rx: mpsc::Receiver<NetworkEvent>,
        input_rx: mpsc::Receiver<InputEvent>,
        frame_rate: u32,
        timer: Timer,
    ) -> Self {
        Self {
            session,
            network_rx,
            input_rx,
            frame: frame_interval(frame_rate),
            timer,
        }
    }

    /// Run until game over or disconnect
    pub async fn run(mut self) -> RunSummary {
        info!(player_id = %self.session.player_id(), "Session loop started");

        let mut frames = interval(self.frame);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut input_open = true;

        loop {
            let event = tokio::select! {
                event = self.network_rx.recv() => match event {
                    Some(event) => SessionEvent::Network(event),
                    None => SessionEvent::Network(NetworkEvent::Closed {
                        reason: "transport stopped".to_string(),
                    }),
                },
                event = self.input_rx.recv(), if input_open => match event {
                    Some(event) => SessionEvent::Input(event),
                    None => {
                        debug!("Input source closed");
                        input_open = false;
                        continue;
                    }
                },
                _ = frames.tick() => SessionEvent::Tick {
                    now: self.timer.elapsed_ms(),
                },
            };

            self.session.handle(event);

            if self.session.is_finished() {
                break;
            }
        }

        let summary = RunSummary {
            phase: self.session.phase(),
            diagnostics: self.session.diagnostics(),
        };
        info!(
            phase = ?summary.phase,
            ticks = summary.diagnostics.ticks,
            dropped = summary.diagnostics.dropped_messages,
            "Session loop ended"
        );
        summary
    }
}
