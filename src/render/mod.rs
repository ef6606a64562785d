//! Interfaces of the external collaborators the engine drives:
//! the renderable surface, the HUD and the audio trigger.
//!
//! The engine calls these synchronously and never waits on their effects.

pub mod log;
#[cfg(test)]
pub mod testing;

pub use log::{LogAudio, LogHud, LogSurface};

/// Opaque handle to something attached to the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// Which side of the duel a HUD value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Opponent,
}

/// Text color of a regular word
pub const WORD_COLOR: &str = "rgba(0,255,0,1)";
/// Text color of a special word
pub const SPECIAL_WORD_COLOR: &str = "#ffd700";
/// Color of a word the local player just submitted
pub const MATCHED_WORD_COLOR: &str = "#ffff00";
/// Color of score labels
pub const LABEL_COLOR: &str = "rgba(255,255,0,1)";
/// Color of explosion fragments
pub const EXPLOSION_COLOR: &str = "#00ff00";

/// 3D scene the words and effects live in
pub trait RenderSurface: Send {
    /// Build a text visual with the first `highlight_len` characters highlighted
    fn create_visual(&mut self, text: &str, color: &str, highlight_len: usize) -> RenderHandle;

    /// Build a single explosion fragment
    fn create_fragment(&mut self, color: &str) -> RenderHandle;

    fn attach(&mut self, handle: RenderHandle);

    fn detach(&mut self, handle: RenderHandle);

    fn move_to(&mut self, handle: RenderHandle, x: f32, y: f32, z: f32);

    fn set_appearance(&mut self, handle: RenderHandle, opacity: f32, scale: f32);

    /// Displace the whole viewport, in pixels
    fn set_viewport_offset(&mut self, dx: f32, dy: f32);

    /// Cover the viewport with an opaque layer carrying `label`
    fn show_overlay(&mut self, label: &str);

    fn hide_overlay(&mut self);
}

/// On-screen HUD
pub trait HudSink: Send {
    fn set_health(&mut self, side: Side, value: i64);

    fn set_power(&mut self, side: Side, value: i64);

    fn set_combo(&mut self, value: i64);

    fn set_input_preview(&mut self, input: &str);

    /// Transient banner
    fn notify(&mut self, message: &str);

    fn set_lobby_status(&mut self, status: &str);

    fn set_start_enabled(&mut self, enabled: bool);

    /// Terminal win/lose screen
    fn show_outcome(&mut self, message: &str);
}

/// Sound effects and music
pub trait AudioTrigger: Send {
    fn play_explosion(&mut self);

    fn play_background_loop(&mut self);

    fn stop_background_loop(&mut self);
}

/// Bundle of every collaborator a session talks to
pub struct Collaborators {
    pub surface: Box<dyn RenderSurface>,
    pub hud: Box<dyn HudSink>,
    pub audio: Box<dyn AudioTrigger>,
}

impl Collaborators {
    pub fn new(
        surface: impl RenderSurface + 'static,
        hud: impl HudSink + 'static,
        audio: impl AudioTrigger + 'static,
    ) -> Self {
        Self {
            surface: Box::new(surface),
            hud: Box::new(hud),
            audio: Box::new(audio),
        }
    }

    /// Log-backed collaborators for headless runs
    pub fn logging() -> Self {
        Self::new(LogSurface::default(), LogHud::default(), LogAudio::default())
    }
}
