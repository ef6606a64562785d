//! Simulation clock - one advance per presented frame
//!
//! Every step is a fixed per-tick delta, so a skipped or late frame only
//! delays motion; nothing accumulates against wall time except the effect
//! timers, which compare against the frame's timestamp.

use crate::render::RenderSurface;

use super::effects::EffectPool;
use super::status::{apply_changes, StatusController};
use super::words::WordStore;

/// What one tick did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub words_moved: usize,
    pub fragments_released: usize,
}

/// Advances words, effects and status timers
#[derive(Debug, Default)]
pub struct SimulationClock {
    ticks: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(
        &mut self,
        now: u64,
        words: &mut WordStore,
        effects: &mut EffectPool,
        status: &mut StatusController,
        surface: &mut dyn RenderSurface,
    ) -> TickReport {
        self.ticks += 1;

        let mut words_moved = 0;
        for word in words.iter_mut() {
            word.advance();
            surface.move_to(word.handle(), word.position.x, word.position.y, 0.0);
            words_moved += 1;
        }

        let fragments_released = effects.update(surface);
        apply_changes(&status.poll(now), surface);

        TickReport {
            words_moved,
            fragments_released,
        }
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
