//! Headless collaborators that report through `tracing`

use tracing::{debug, info, trace};

use super::{AudioTrigger, HudSink, RenderHandle, RenderSurface, Side};

/// Render surface that only hands out handles and logs scene changes
#[derive(Debug, Default)]
pub struct LogSurface {
    next_handle: u64,
    attached: usize,
}

impl LogSurface {
    fn allocate(&mut self) -> RenderHandle {
        self.next_handle += 1;
        RenderHandle(self.next_handle)
    }
}

impl RenderSurface for LogSurface {
    fn create_visual(&mut self, text: &str, color: &str, highlight_len: usize) -> RenderHandle {
        let handle = self.allocate();
        trace!(handle = handle.0, text, color, highlight_len, "Created text visual");
        handle
    }

    fn create_fragment(&mut self, _color: &str) -> RenderHandle {
        self.allocate()
    }

    fn attach(&mut self, handle: RenderHandle) {
        self.attached += 1;
        trace!(handle = handle.0, attached = self.attached, "Attached");
    }

    fn detach(&mut self, handle: RenderHandle) {
        self.attached = self.attached.saturating_sub(1);
        trace!(handle = handle.0, attached = self.attached, "Detached");
    }

    fn move_to(&mut self, _handle: RenderHandle, _x: f32, _y: f32, _z: f32) {}

    fn set_appearance(&mut self, _handle: RenderHandle, _opacity: f32, _scale: f32) {}

    fn set_viewport_offset(&mut self, dx: f32, dy: f32) {
        trace!(dx, dy, "Viewport offset");
    }

    fn show_overlay(&mut self, label: &str) {
        info!(label, "Overlay shown");
    }

    fn hide_overlay(&mut self) {
        info!("Overlay hidden");
    }
}

/// HUD that prints every display string to the log
#[derive(Debug, Default)]
pub struct LogHud;

impl HudSink for LogHud {
    fn set_health(&mut self, side: Side, value: i64) {
        match side {
            Side::Local => info!("HEALTH: {}%", value),
            Side::Opponent => info!("OPPONENT: {}%", value),
        }
    }

    fn set_power(&mut self, side: Side, value: i64) {
        match side {
            Side::Local => info!("POWER: {}%", value),
            Side::Opponent => info!("OPPONENT POWER: {}%", value),
        }
    }

    fn set_combo(&mut self, value: i64) {
        info!("COMBO: {}", value);
    }

    fn set_input_preview(&mut self, input: &str) {
        if input.is_empty() {
            info!("INPUT: >_");
        } else {
            info!("INPUT: > {}", input);
        }
    }

    fn notify(&mut self, message: &str) {
        info!("{}", message);
    }

    fn set_lobby_status(&mut self, status: &str) {
        info!("{}", status);
    }

    fn set_start_enabled(&mut self, enabled: bool) {
        if enabled {
            info!("Start available: type /start");
        }
    }

    fn show_outcome(&mut self, message: &str) {
        info!("{}", message);
    }
}

/// Audio trigger that logs cues
#[derive(Debug, Default)]
pub struct LogAudio {
    looping: bool,
}

impl AudioTrigger for LogAudio {
    fn play_explosion(&mut self) {
        debug!("Explosion sound");
    }

    fn play_background_loop(&mut self) {
        if !self.looping {
            self.looping = true;
            debug!("Background music started");
        }
    }

    fn stop_background_loop(&mut self) {
        if self.looping {
            self.looping = false;
            debug!("Background music stopped");
        }
    }
}
