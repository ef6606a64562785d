//! Client game simulation modules

pub mod clock;
pub mod dispatch;
pub mod effects;
pub mod input;
pub mod session;
pub mod status;
pub mod vitals;
pub mod words;

pub use input::KeyInput;
pub use session::{Diagnostics, GameSession, Outcome, Phase};

/// Position or velocity on the play plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Something arriving from the transport
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    /// Raw text frame
    Message { payload: String, received_at: u64 },
    /// Channel is gone
    Closed { reason: String },
}

/// Something the local player did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyInput),
    /// Host asked the authority to start the game
    StartRequested,
}

/// Every source the session reacts to, funnelled into one stream
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Network(NetworkEvent),
    Input(InputEvent),
    /// Display frame at session time `now` (ms)
    Tick { now: u64 },
}
