//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;

use crate::util::time::NOMINAL_FPS;

/// Default authority address (the reference server listens on 5001)
pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:5001";

/// Default cap on live effect fragments
pub const DEFAULT_MAX_EFFECT_FRAGMENTS: usize = 2000;

/// Client configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Authority base URL (ws:// or wss://)
    pub server_url: String,
    /// Lobby code of the game to join
    pub game_code: String,
    /// Local player identifier issued by the authority
    pub player_id: String,
    /// Whether the local player may start the game
    pub is_host: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Simulation ticks per second
    pub frame_rate: u32,
    /// Upper bound on concurrently live effect fragments
    pub max_effect_fragments: usize,
    /// Fixed seed for effect randomness (random when unset)
    pub rng_seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server_url: env::var("SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
            game_code: env::var("GAME_CODE")
                .map_err(|_| ConfigError::Missing("GAME_CODE"))?
                .to_uppercase(),
            player_id: env::var("PLAYER_ID").map_err(|_| ConfigError::Missing("PLAYER_ID"))?,
            is_host: parse_bool(env::var("IS_HOST").ok().as_deref()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            frame_rate: parse_var("FRAME_RATE")?.unwrap_or(NOMINAL_FPS),
            max_effect_fragments: parse_var("MAX_EFFECT_FRAGMENTS")?
                .unwrap_or(DEFAULT_MAX_EFFECT_FRAGMENTS),
            rng_seed: parse_var("RNG_SEED")?,
        })
    }

    /// Configuration for a given player with every tunable at its default
    pub fn for_player(game_code: &str, player_id: &str) -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            game_code: game_code.to_uppercase(),
            player_id: player_id.to_string(),
            is_host: false,
            log_level: "info".to_string(),
            frame_rate: NOMINAL_FPS,
            max_effect_fragments: DEFAULT_MAX_EFFECT_FRAGMENTS,
            rng_seed: None,
        }
    }

    /// WebSocket endpoint of this player's game channel
    pub fn ws_url(&self) -> String {
        format!(
            "{}/ws/game/{}/{}",
            self.server_url.trim_end_matches('/'),
            self.game_code,
            self.player_id
        )
    }
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url() {
        let mut config = Config::for_player("abcd", "p1x2y3z4");
        config.server_url = "wss://duel.example/".to_string();
        assert_eq!(config.ws_url(), "wss://duel.example/ws/game/ABCD/p1x2y3z4");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some("true")));
        assert!(parse_bool(Some(" YES ")));
        assert!(parse_bool(Some("1")));
        assert!(!parse_bool(Some("no")));
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_defaults() {
        let config = Config::for_player("ABCD", "p1");
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.max_effect_fragments, DEFAULT_MAX_EFFECT_FRAGMENTS);
        assert!(config.rng_seed.is_none());
    }
}
