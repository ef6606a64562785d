//! Typing Duel client engine
//!
//! Mirrors the authority's game state for the local player: falling words,
//! typed-input matching, visual effects and disruptive status effects.
//! Rendering, HUD and audio are driven through the traits in [`render`].

pub mod app;
pub mod config;
pub mod game;
pub mod render;
pub mod util;
pub mod ws;
