//! Effect/status controller - timed disruptive effects (shake, blindness)
//!
//! Timers live in a registry polled by the simulation tick. Each kind has
//! at most one timer; a retrigger replaces it under a new generation, so a
//! superseded effect can never end (or keep running) on its old schedule.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::render::RenderSurface;

/// Max viewport displacement per axis while shaking, in pixels
pub const SHAKE_JITTER_RADIUS: f32 = 25.0;

/// Label of the blindness overlay
pub const BLIND_LABEL: &str = "SYSTEM MALFUNCTION";

/// Disruptive effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Shake,
    Blindness,
}

/// An armed disruptive effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectTimer {
    pub kind: EffectKind,
    /// Session milliseconds at trigger
    pub started_at: u64,
    /// Milliseconds
    pub duration: u64,
    /// Trigger that armed this timer
    pub generation: u64,
}

impl EffectTimer {
    pub fn ends_at(&self) -> u64 {
        self.started_at.saturating_add(self.duration)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.ends_at()
    }
}

/// Viewport changes requested by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusChange {
    /// Shake jitter for this tick
    ViewportOffset { dx: f32, dy: f32 },
    /// Shake over, offset back to exactly zero
    ViewportRestored,
    BlindShown,
    BlindLifted,
}

/// Registry of the active disruptive effects
pub struct StatusController {
    shake: Option<EffectTimer>,
    blind: Option<EffectTimer>,
    next_generation: u64,
    rng: ChaCha8Rng,
}

impl StatusController {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            shake: None,
            blind: None,
            next_generation: 0,
            rng,
        }
    }

    fn slot(&mut self, kind: EffectKind) -> &mut Option<EffectTimer> {
        match kind {
            EffectKind::Shake => &mut self.shake,
            EffectKind::Blindness => &mut self.blind,
        }
    }

    /// Arm `kind` for `duration` ms from `now`, replacing any running timer
    /// of the same kind
    pub fn trigger(&mut self, kind: EffectKind, now: u64, duration: u64) -> Vec<StatusChange> {
        self.next_generation += 1;
        let timer = EffectTimer {
            kind,
            started_at: now,
            duration,
            generation: self.next_generation,
        };

        let previous = self.slot(kind).replace(timer);
        if let Some(previous) = previous {
            debug!(
                ?kind,
                superseded = previous.generation,
                generation = timer.generation,
                "Effect retriggered"
            );
        }
        info!(?kind, duration, generation = timer.generation, "Effect started");

        match (kind, previous) {
            (EffectKind::Blindness, None) => vec![StatusChange::BlindShown],
            _ => Vec::new(),
        }
    }

    /// Advance to `now`: jitter an active shake, end expired effects
    pub fn poll(&mut self, now: u64) -> Vec<StatusChange> {
        let mut changes = Vec::new();

        if let Some(timer) = self.shake {
            if timer.is_expired(now) {
                self.shake = None;
                debug!(generation = timer.generation, "Shake ended");
                changes.push(StatusChange::ViewportRestored);
            } else {
                let dx = self.rng.gen_range(-SHAKE_JITTER_RADIUS..=SHAKE_JITTER_RADIUS);
                let dy = self.rng.gen_range(-SHAKE_JITTER_RADIUS..=SHAKE_JITTER_RADIUS);
                changes.push(StatusChange::ViewportOffset { dx, dy });
            }
        }

        if let Some(timer) = self.blind {
            if timer.is_expired(now) {
                self.blind = None;
                debug!(generation = timer.generation, "Blindness ended");
                changes.push(StatusChange::BlindLifted);
            }
        }

        changes
    }

    /// Drop every timer, undoing whatever is still visible
    pub fn cancel_all(&mut self) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        if self.shake.take().is_some() {
            changes.push(StatusChange::ViewportRestored);
        }
        if self.blind.take().is_some() {
            changes.push(StatusChange::BlindLifted);
        }
        changes
    }

    pub fn active(&self, kind: EffectKind) -> Option<&EffectTimer> {
        match kind {
            EffectKind::Shake => self.shake.as_ref(),
            EffectKind::Blindness => self.blind.as_ref(),
        }
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.active(kind).is_some()
    }
}

/// Carry requested viewport changes out on the render surface
pub fn apply_changes(changes: &[StatusChange], surface: &mut dyn RenderSurface) {
    for change in changes {
        match *change {
            StatusChange::ViewportOffset { dx, dy } => surface.set_viewport_offset(dx, dy),
            StatusChange::ViewportRestored => surface.set_viewport_offset(0.0, 0.0),
            StatusChange::BlindShown => surface.show_overlay(BLIND_LABEL),
            StatusChange::BlindLifted => surface.hide_overlay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn controller() -> StatusController {
        StatusController::new(ChaCha8Rng::seed_from_u64(42))
    }

    fn offsets(changes: &[StatusChange]) -> usize {
        changes
            .iter()
            .filter(|c| matches!(c, StatusChange::ViewportOffset { .. }))
            .count()
    }

    #[test]
    fn test_shake_jitters_then_restores() {
        let mut status = controller();
        assert!(status.trigger(EffectKind::Shake, 1_000, 300).is_empty());

        for now in [1_000, 1_100, 1_299] {
            let changes = status.poll(now);
            assert_eq!(changes.len(), 1);
            let StatusChange::ViewportOffset { dx, dy } = changes[0] else {
                panic!("expected jitter");
            };
            assert!(dx.abs() <= SHAKE_JITTER_RADIUS);
            assert!(dy.abs() <= SHAKE_JITTER_RADIUS);
        }

        assert_eq!(status.poll(1_300), vec![StatusChange::ViewportRestored]);
        assert!(status.poll(1_400).is_empty());
        assert!(!status.is_active(EffectKind::Shake));
    }

    #[test]
    fn test_shorter_retrigger_supersedes_longer_shake() {
        let mut status = controller();
        status.trigger(EffectKind::Shake, 0, 2_000);
        status.poll(50);
        status.trigger(EffectKind::Shake, 100, 500);

        let timer = status.active(EffectKind::Shake).unwrap();
        assert_eq!(timer.ends_at(), 600);
        assert_eq!(timer.generation, 2);

        // exactly one jitter per tick, never two competing loops
        assert_eq!(offsets(&status.poll(599)), 1);
        assert_eq!(status.poll(600), vec![StatusChange::ViewportRestored]);
        for now in (700..=2_100).step_by(100) {
            assert!(status.poll(now).is_empty());
        }
    }

    #[test]
    fn test_longer_retrigger_extends_shake() {
        let mut status = controller();
        status.trigger(EffectKind::Shake, 0, 500);
        status.trigger(EffectKind::Shake, 400, 1_000);
        assert_eq!(offsets(&status.poll(600)), 1);
        assert_eq!(offsets(&status.poll(1_399)), 1);
        assert_eq!(status.poll(1_400), vec![StatusChange::ViewportRestored]);
    }

    #[test]
    fn test_blindness_shown_once_and_lifted_once() {
        let mut status = controller();
        assert_eq!(status.trigger(EffectKind::Blindness, 0, 5_000), vec![StatusChange::BlindShown]);
        // retrigger while covered keeps the single overlay
        assert!(status.trigger(EffectKind::Blindness, 1_000, 1_000).is_empty());

        assert!(status.poll(1_999).is_empty());
        assert_eq!(status.poll(2_000), vec![StatusChange::BlindLifted]);
        assert!(status.poll(5_000).is_empty());
    }

    #[test]
    fn test_independent_kinds() {
        let mut status = controller();
        status.trigger(EffectKind::Shake, 0, 1_000);
        status.trigger(EffectKind::Blindness, 0, 500);

        let changes = status.poll(500);
        assert_eq!(offsets(&changes), 1);
        assert!(changes.contains(&StatusChange::BlindLifted));
        assert!(status.is_active(EffectKind::Shake));
    }

    #[test]
    fn test_cancel_all() {
        let mut status = controller();
        status.trigger(EffectKind::Shake, 0, 1_000);
        status.trigger(EffectKind::Blindness, 0, 1_000);
        assert_eq!(
            status.cancel_all(),
            vec![StatusChange::ViewportRestored, StatusChange::BlindLifted]
        );
        assert!(status.cancel_all().is_empty());
        assert!(status.poll(10).is_empty());
    }

    #[test]
    fn test_zero_duration_ends_on_next_poll() {
        let mut status = controller();
        status.trigger(EffectKind::Shake, 10, 0);
        assert_eq!(status.poll(10), vec![StatusChange::ViewportRestored]);
    }
}
