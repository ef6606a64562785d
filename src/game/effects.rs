//! Visual effect pool - explosion bursts and floating score labels

use std::collections::VecDeque;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::render::{RenderHandle, RenderSurface, EXPLOSION_COLOR, LABEL_COLOR};

use super::Vec2;

/// Fragments per explosion
pub const BURST_FRAGMENTS: usize = 15;
/// Life lost by a burst fragment each tick
pub const BURST_DECAY: f32 = 0.03;
/// Per-tick scale multiplier of a burst fragment
pub const BURST_SHRINK: f32 = 0.95;
/// Initial scale of a burst fragment
pub const BURST_SCALE: f32 = 0.2;
/// Width of the per-axis velocity range of a burst fragment
pub const BURST_SPREAD: f32 = 0.3;
/// Life lost by a floating label each tick
pub const LABEL_DECAY: f32 = 0.02;
/// Units a floating label rises each tick
pub const LABEL_RISE: f32 = 0.05;

/// How a fragment moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Explosion fragment drifting with its own velocity and shrinking
    Burst { velocity: [f32; 3] },
    /// Score label rising at a constant rate
    Label,
}

/// A single live effect fragment
#[derive(Debug, Clone)]
pub struct Fragment {
    pub position: [f32; 3],
    pub motion: Motion,
    /// 1.0 at spawn, dead at or below 0
    pub life: f32,
    pub scale: f32,
    pub handle: RenderHandle,
}

impl Fragment {
    /// Advance one tick, returns false once dead
    fn update(&mut self) -> bool {
        match self.motion {
            Motion::Burst { velocity } => {
                for (axis, v) in self.position.iter_mut().zip(velocity) {
                    *axis += v;
                }
                self.life -= BURST_DECAY;
                self.scale *= BURST_SHRINK;
            }
            Motion::Label => {
                self.position[1] += LABEL_RISE;
                self.life -= LABEL_DECAY;
            }
        }
        self.life > 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }
}

/// Owns every live effect fragment. Growth is capped: once `max_fragments`
/// is exceeded the oldest fragments are released first.
pub struct EffectPool {
    fragments: VecDeque<Fragment>,
    max_fragments: usize,
    rng: ChaCha8Rng,
    evicted: u64,
}

impl EffectPool {
    pub fn new(max_fragments: usize, rng: ChaCha8Rng) -> Self {
        Self {
            fragments: VecDeque::new(),
            max_fragments: max_fragments.max(1),
            rng,
            evicted: 0,
        }
    }

    /// Spawn an explosion of `count` fragments at `origin`
    pub fn spawn_burst(&mut self, surface: &mut dyn RenderSurface, origin: Vec2, count: usize) {
        for _ in 0..count {
            let velocity = [
                (self.rng.gen::<f32>() - 0.5) * BURST_SPREAD,
                (self.rng.gen::<f32>() - 0.5) * BURST_SPREAD,
                (self.rng.gen::<f32>() - 0.5) * BURST_SPREAD,
            ];
            let handle = surface.create_fragment(EXPLOSION_COLOR);
            self.push(
                surface,
                Fragment {
                    position: [origin.x, origin.y, 0.0],
                    motion: Motion::Burst { velocity },
                    life: 1.0,
                    scale: BURST_SCALE,
                    handle,
                },
            );
        }
    }

    /// Spawn a rising, fading label at `origin`
    pub fn spawn_floating_label(&mut self, surface: &mut dyn RenderSurface, text: &str, origin: Vec2) {
        let handle = surface.create_visual(text, LABEL_COLOR, 0);
        self.push(
            surface,
            Fragment {
                position: [origin.x, origin.y, 0.0],
                motion: Motion::Label,
                life: 1.0,
                scale: 1.0,
                handle,
            },
        );
    }

    fn push(&mut self, surface: &mut dyn RenderSurface, fragment: Fragment) {
        surface.move_to(
            fragment.handle,
            fragment.position[0],
            fragment.position[1],
            fragment.position[2],
        );
        surface.set_appearance(fragment.handle, fragment.life, fragment.scale);
        surface.attach(fragment.handle);
        self.fragments.push_back(fragment);

        while self.fragments.len() > self.max_fragments {
            if let Some(oldest) = self.fragments.pop_front() {
                surface.detach(oldest.handle);
                self.evicted += 1;
            }
        }
    }

    /// Advance every fragment one tick and release the dead ones.
    /// Returns how many were released.
    pub fn update(&mut self, surface: &mut dyn RenderSurface) -> usize {
        let before = self.fragments.len();
        self.fragments.retain_mut(|fragment| {
            let alive = fragment.update();
            if alive {
                surface.move_to(
                    fragment.handle,
                    fragment.position[0],
                    fragment.position[1],
                    fragment.position[2],
                );
                surface.set_appearance(fragment.handle, fragment.life, fragment.scale);
            } else {
                surface.detach(fragment.handle);
            }
            alive
        });
        before - self.fragments.len()
    }

    /// Release every fragment immediately
    pub fn clear(&mut self, surface: &mut dyn RenderSurface) {
        let released = self.fragments.len();
        for fragment in self.fragments.drain(..) {
            surface.detach(fragment.handle);
        }
        if released > 0 {
            debug!(released, "Effect pool cleared");
        }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    /// Fragments dropped early because the pool was full
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
