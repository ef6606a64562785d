//! Protocol dispatcher - applies authority messages to the session

use tracing::{debug, info, warn};

use crate::render::Side;
use crate::ws::protocol::{
    self, GameInfo, GameStatus, ServerMsg, WordData, DEFAULT_BLIND_MS, DEFAULT_SHAKE_MS,
};

use super::input::InputMatcher;
use super::session::{GameSession, Outcome};
use super::status::{apply_changes, EffectKind};

/// Score label shown where a local word was cleared
const CLEAR_LABEL: &str = "+10";

/// Longest payload excerpt logged for a dropped message
const PAYLOAD_LOG_CHARS: usize = 120;

/// Decode one text frame and apply it. Undecodable frames are dropped.
pub fn dispatch_text(session: &mut GameSession, payload: &str, received_at: u64) {
    match protocol::decode(payload) {
        Ok(msg) => dispatch(session, msg, received_at),
        Err(e) => {
            session.dropped_messages += 1;
            if session.drop_log.allow() {
                let excerpt: String = payload.chars().take(PAYLOAD_LOG_CHARS).collect();
                warn!(
                    error = %e,
                    payload = %excerpt,
                    dropped = session.dropped_messages,
                    "Dropping inbound message"
                );
            }
        }
    }
}

/// Apply one decoded message. `received_at` is session time in ms.
pub fn dispatch(session: &mut GameSession, msg: ServerMsg, received_at: u64) {
    match msg {
        ServerMsg::GameState { game } => on_game_state(session, &game),
        ServerMsg::PlayerJoined { player } => {
            info!(player_id = %player.id, name = %player.name, "Player joined");
            session
                .collab
                .hud
                .set_lobby_status(&format!("Player {} joined! Ready to start.", player.name));
            enable_start(session);
        }
        ServerMsg::StatusChange { status } => match status {
            GameStatus::Playing => session.start_game(),
            other => debug!(status = ?other, "Status change"),
        },
        ServerMsg::WordSpawn { target_pid, word } => {
            if target_pid != session.player_id {
                debug!(word_id = %word.id, target_pid = %target_pid, "Spawn for opponent");
                return;
            }
            if !session.is_running() {
                debug!(word_id = %word.id, "Spawn before game start, ignored");
                return;
            }
            on_word_spawn(session, &word);
        }
        ServerMsg::WordCleared {
            player_id,
            word_id,
            new_power,
            triggered_power,
            combo,
        } => {
            let local = player_id == session.player_id;
            if local {
                if let Some(word) = session.words.get(&word_id) {
                    let origin = word.position;
                    session.effects.spawn_floating_label(
                        session.collab.surface.as_mut(),
                        CLEAR_LABEL,
                        origin,
                    );
                }
            }

            let (words, mut stage) = session.stage();
            words.remove(&word_id, true, &mut stage);

            let hud = session.collab.hud.as_mut();
            let side = if local { Side::Local } else { Side::Opponent };
            if let Some(power) = new_power {
                session.vitals.set_power(side, power, hud);
            }
            if local {
                if let Some(combo) = combo {
                    session.vitals.set_combo(combo, hud);
                }
                if let Some(power) = triggered_power {
                    hud.notify(&format!("POWER ACTIVATED: {}!", power.to_uppercase()));
                }
            }
        }
        ServerMsg::WordExpired { word_id, .. } => {
            let (words, mut stage) = session.stage();
            if words.remove(&word_id, false, &mut stage).is_some() {
                debug!(word_id = %word_id, "Word expired");
            }
        }
        ServerMsg::HealthUpdate {
            player_id,
            new_health,
            combo,
        } => {
            let hud = session.collab.hud.as_mut();
            let local = player_id == session.player_id;
            let side = if local { Side::Local } else { Side::Opponent };
            if let Some(health) = new_health {
                session.vitals.set_health(side, health, hud);
            }
            if local {
                if let Some(combo) = combo {
                    session.vitals.set_combo(combo, hud);
                }
            }
        }
        ServerMsg::EffectShake {
            target_pid,
            duration,
        } => {
            if target_pid == session.player_id {
                let duration = duration.unwrap_or(DEFAULT_SHAKE_MS);
                trigger_effect(session, EffectKind::Shake, received_at, duration);
                session.collab.hud.notify("INCOMING ATTACK: SHAKE!");
            }
        }
        ServerMsg::EffectBlind {
            target_pid,
            duration,
        } => {
            if target_pid == session.player_id {
                let duration = duration.unwrap_or(DEFAULT_BLIND_MS);
                trigger_effect(session, EffectKind::Blindness, received_at, duration);
                session.collab.hud.notify("INCOMING ATTACK: BLINDNESS!");
            }
        }
        ServerMsg::EffectClearScreen { target_pid } => {
            if target_pid == session.player_id {
                let (words, mut stage) = session.stage();
                let cleared = words.remove_all(true, &mut stage);
                info!(cleared, "Screen cleared");
                session.collab.hud.notify("SCREEN CLEARED!");
            }
        }
        ServerMsg::GameOver { loser } => {
            let outcome = if loser == session.player_id {
                Outcome::Lost
            } else {
                Outcome::Won
            };
            session.finish(outcome);
        }
    }
}

fn on_game_state(session: &mut GameSession, game: &GameInfo) {
    let count = game.players.len();
    let mut status = format!("Lobby: {} Player(s) connected.", count);

    if game.status == GameStatus::Playing {
        session.collab.hud.set_lobby_status(&status);
        session.start_game();
        return;
    }

    let ready = count >= 2 || game.is_practice();
    if ready {
        status.push_str(" Ready to start.");
    }
    session.collab.hud.set_lobby_status(&status);
    if ready {
        enable_start(session);
    }
}

fn enable_start(session: &mut GameSession) {
    if session.is_host {
        session.collab.hud.set_start_enabled(true);
    }
}

fn on_word_spawn(session: &mut GameSession, data: &WordData) {
    let id = session.words.spawn(data, session.collab.surface.as_mut());
    InputMatcher::highlight_new_word(
        &id,
        &session.input,
        &mut session.words,
        session.collab.surface.as_mut(),
    );
}

fn trigger_effect(session: &mut GameSession, kind: EffectKind, now: u64, duration: u64) {
    let changes = session.status.trigger(kind, now, duration);
    apply_changes(&changes, session.collab.surface.as_mut());
}
