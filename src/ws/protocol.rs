//! WebSocket protocol message definitions
//! These are the wire types exchanged with the game authority

use std::collections::HashMap;
use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Default seconds a word takes to cross the screen
pub const DEFAULT_WORD_DURATION_SECS: f32 = 10.0;

/// Default spawn height when the authority omits `y`
pub const DEFAULT_SPAWN_Y: f32 = 10.0;

/// Default shake duration when the authority omits it
pub const DEFAULT_SHAKE_MS: u64 = 3000;

/// Default blindness duration when the authority omits it
pub const DEFAULT_BLIND_MS: u64 = 5000;

/// Word identifier assigned by the authority.
/// Accepted as a JSON string or number, always held as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WordId(String);

impl WordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Signed(n) => Self(n.to_string()),
        })
    }
}

/// Number field as sent by the authority. Anything that is not a number
/// decodes as absent, so one odd field never costs the whole message.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Other(#[allow(dead_code)] IgnoredAny),
}

/// Integer value; fractions are rounded
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Int(n)) => Some(n),
        Some(RawNumber::Float(f)) if f.is_finite() => Some(f.round() as i64),
        _ => None,
    })
}

/// Millisecond duration, clamped to zero
fn lenient_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Int(n)) => Some(n.max(0) as u64),
        Some(RawNumber::Float(f)) if f.is_finite() => Some(f.max(0.0).round() as u64),
        _ => None,
    })
}

/// Messages sent from client to authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Host asks the authority to start the game
    StartGame,

    /// Local input matched a live word exactly
    SubmitWord {
        /// Uppercase text of the matched word
        word: String,
    },
}

/// Messages sent from authority to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Full lobby/game snapshot, sent on connect
    GameState { game: GameInfo },

    /// Another player entered the lobby
    PlayerJoined { player: PlayerInfo },

    /// Game status transition (lobby -> playing -> finished)
    StatusChange { status: GameStatus },

    /// New word for `target_pid`
    WordSpawn { target_pid: String, word: WordData },

    /// A word was typed successfully by `player_id`
    WordCleared {
        player_id: String,
        word_id: WordId,
        #[serde(default, deserialize_with = "lenient_int")]
        new_power: Option<i64>,
        #[serde(default)]
        triggered_power: Option<String>,
        #[serde(default, deserialize_with = "lenient_int")]
        combo: Option<i64>,
    },

    /// A word reached the boundary
    WordExpired {
        #[serde(default)]
        target_pid: Option<String>,
        word_id: WordId,
    },

    /// Health changed for `player_id`
    HealthUpdate {
        player_id: String,
        #[serde(default, deserialize_with = "lenient_int")]
        new_health: Option<i64>,
        #[serde(default, deserialize_with = "lenient_int")]
        combo: Option<i64>,
    },

    /// Shake attack
    EffectShake {
        target_pid: String,
        /// Milliseconds
        #[serde(default, deserialize_with = "lenient_millis")]
        duration: Option<u64>,
    },

    /// Blindness attack
    EffectBlind {
        target_pid: String,
        /// Milliseconds
        #[serde(default, deserialize_with = "lenient_millis")]
        duration: Option<u64>,
    },

    /// Every word of `target_pid` is wiped
    EffectClearScreen { target_pid: String },

    /// Terminal message
    GameOver { loser: String },
}

/// Lobby status as reported by the authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Lobby,
    Playing,
    Finished,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

/// Game snapshot carried by `game_state`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(default)]
    pub status: GameStatus,
    /// "practice" for solo games
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub host_id: Option<String>,
    #[serde(default)]
    pub players: HashMap<String, PlayerInfo>,
}

impl GameInfo {
    pub fn is_practice(&self) -> bool {
        self.mode.as_deref() == Some("practice")
    }
}

/// Player entry in the lobby
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub health: Option<i64>,
    #[serde(default)]
    pub power: Option<i64>,
    #[serde(default)]
    pub combo: Option<i64>,
}

/// Word payload of `word_spawn`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordData {
    pub id: WordId,
    pub text: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub vx: Option<f32>,
    /// Explicit fall speed in units per tick
    #[serde(default)]
    pub vy: Option<f32>,
    /// Seconds to cross the screen
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub is_special: bool,
}

impl WordData {
    /// Fall speed in units per tick. Without an explicit `vy` the word
    /// crosses 15 units in `duration` seconds at the nominal 60 ticks/s.
    pub fn fall_speed(&self) -> f32 {
        if let Some(vy) = self.vy {
            return vy;
        }
        let duration = self
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(DEFAULT_WORD_DURATION_SECS);
        15.0 / (duration * 60.0)
    }
}

/// Protocol decode errors
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed or unknown message: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Decode one inbound text frame
pub fn decode(text: &str) -> Result<ServerMsg, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode one outbound message
pub fn encode(msg: &ClientMsg) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_id_accepts_numbers_and_strings() {
        let numeric: WordId = serde_json::from_str("1").unwrap();
        let text: WordId = serde_json::from_str("\"ab12cd34\"").unwrap();
        assert_eq!(numeric.as_str(), "1");
        assert_eq!(text.as_str(), "ab12cd34");
    }

    #[test]
    fn test_decode_word_spawn_defaults() {
        let msg = decode(
            r#"{"type":"word_spawn","target_pid":"p1","word":{"id":1,"text":"ROCKET","x":0}}"#,
        )
        .unwrap();
        let ServerMsg::WordSpawn { target_pid, word } = msg else {
            panic!("expected word_spawn");
        };
        assert_eq!(target_pid, "p1");
        assert_eq!(word.text, "ROCKET");
        assert!(word.y.is_none());
        assert!(!word.is_special);
        assert!((word.fall_speed() - 0.025).abs() < 1e-6);
    }

    #[test]
    fn test_fall_speed_explicit_and_degenerate() {
        let mut word: WordData =
            serde_json::from_str(r#"{"id":"w","text":"BOSS","x":1.5,"vy":0}"#).unwrap();
        assert_eq!(word.fall_speed(), 0.0);

        word.vy = None;
        word.duration = Some(5.0);
        assert!((word.fall_speed() - 0.05).abs() < 1e-6);

        word.duration = Some(0.0);
        assert!((word.fall_speed() - 0.025).abs() < 1e-6);
    }

    #[test]
    fn test_decode_authority_messages() {
        let cleared = decode(
            r#"{"type":"word_cleared","player_id":"p1","word_id":"w1","new_power":20,"triggered_power":null,"combo":2}"#,
        )
        .unwrap();
        assert!(matches!(
            cleared,
            ServerMsg::WordCleared { combo: Some(2), new_power: Some(20), .. }
        ));

        let health =
            decode(r#"{"type":"health_update","player_id":"p2","new_health":90}"#).unwrap();
        assert!(matches!(
            health,
            ServerMsg::HealthUpdate { combo: None, new_health: Some(90), .. }
        ));

        let state = decode(
            r#"{"type":"game_state","game":{"code":"ABCD","status":"lobby","mode":"practice","host_id":"p1","players":{"p1":{"name":"Host","id":"p1","health":100,"power":0,"words_cleared":0,"combo":0,"is_ready":true}}}}"#,
        )
        .unwrap();
        let ServerMsg::GameState { game } = state else {
            panic!("expected game_state");
        };
        assert!(game.is_practice());
        assert_eq!(game.players.len(), 1);
        assert_eq!(game.players["p1"].name, "Host");
    }

    #[test]
    fn test_lenient_numbers() {
        let cleared = decode(
            r#"{"type":"word_cleared","player_id":"p1","word_id":7,"new_power":12.5,"combo":"x"}"#,
        )
        .unwrap();
        assert!(matches!(
            cleared,
            ServerMsg::WordCleared { new_power: Some(13), combo: None, .. }
        ));

        let cleared = decode(r#"{"type":"word_cleared","player_id":"p1","word_id":"w1"}"#).unwrap();
        assert!(matches!(
            cleared,
            ServerMsg::WordCleared { new_power: None, combo: None, .. }
        ));

        let health = decode(
            r#"{"type":"health_update","player_id":"p1","new_health":1e30,"combo":null}"#,
        )
        .unwrap();
        assert!(matches!(
            health,
            ServerMsg::HealthUpdate { new_health: Some(i64::MAX), combo: None, .. }
        ));
    }

    #[test]
    fn test_lenient_durations() {
        let duration = |json: &str| match decode(json).unwrap() {
            ServerMsg::EffectShake { duration, .. } | ServerMsg::EffectBlind { duration, .. } => {
                duration
            }
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(
            duration(r#"{"type":"effect_shake","target_pid":"p1","duration":3000.0}"#),
            Some(3000)
        );
        assert_eq!(
            duration(r#"{"type":"effect_blind","target_pid":"p1","duration":-50}"#),
            Some(0)
        );
        assert_eq!(
            duration(r#"{"type":"effect_blind","target_pid":"p1","duration":-2.5}"#),
            Some(0)
        );
        assert_eq!(
            duration(r#"{"type":"effect_shake","target_pid":"p1","duration":"long"}"#),
            None
        );
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let msg = decode(r#"{"type":"status_change","status":"paused"}"#).unwrap();
        assert!(matches!(msg, ServerMsg::StatusChange { status: GameStatus::Unknown }));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not json").is_err());
        assert!(decode(r#"{"type":"teleport"}"#).is_err());
        assert!(decode(r#"{"word_id":"w1"}"#).is_err());
        assert!(decode(r#"{"type":"word_expired"}"#).is_err());
    }

    #[test]
    fn test_encode_client_messages() {
        assert_eq!(encode(&ClientMsg::StartGame).unwrap(), r#"{"type":"start_game"}"#);
        assert_eq!(
            encode(&ClientMsg::SubmitWord { word: "ROCKET".into() }).unwrap(),
            r#"{"type":"submit_word","word":"ROCKET"}"#
        );
    }
}
