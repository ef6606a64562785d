//! Word entity store - mirror of the authority's live words for the local player

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::render::{
    AudioTrigger, RenderHandle, RenderSurface, MATCHED_WORD_COLOR, SPECIAL_WORD_COLOR, WORD_COLOR,
};
use crate::ws::protocol::{WordData, WordId, DEFAULT_SPAWN_Y};

use super::effects::{EffectPool, BURST_FRAGMENTS};
use super::Vec2;

/// Scene-side collaborators touched when words come and go
pub struct Stage<'a> {
    pub surface: &'a mut dyn RenderSurface,
    pub audio: &'a mut dyn AudioTrigger,
    pub effects: &'a mut EffectPool,
}

/// A falling word the player has to type
#[derive(Debug, Clone)]
pub struct WordEntity {
    pub id: WordId,
    /// Uppercase literal
    pub text: String,
    pub position: Vec2,
    /// `x` is added each tick, `y` is the fall speed subtracted each tick
    pub velocity: Vec2,
    pub is_special: bool,
    /// Leading characters matching the current input
    pub highlight_len: usize,
    /// Submitted locally, waiting for the authority to clear it
    pub matched: bool,
    handle: RenderHandle,
}

impl WordEntity {
    fn color(&self) -> &'static str {
        if self.matched {
            MATCHED_WORD_COLOR
        } else if self.is_special {
            SPECIAL_WORD_COLOR
        } else {
            WORD_COLOR
        }
    }

    pub fn handle(&self) -> RenderHandle {
        self.handle
    }

    /// Move one tick along the velocity
    pub fn advance(&mut self) {
        self.position.x += self.velocity.x;
        self.position.y -= self.velocity.y;
    }

    /// Rebuild the visual so it reflects highlight and match state
    pub fn redraw(&mut self, surface: &mut dyn RenderSurface) {
        let handle = surface.create_visual(&self.text, self.color(), self.highlight_len);
        surface.move_to(handle, self.position.x, self.position.y, 0.0);
        surface.detach(self.handle);
        surface.attach(handle);
        self.handle = handle;
    }
}

/// Exclusive owner of the live word entities
#[derive(Debug, Default)]
pub struct WordStore {
    words: HashMap<WordId, WordEntity>,
    duplicate_spawns: u64,
}

impl WordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entity described by `data` and attach its visual.
    /// A live entity with the same id is replaced.
    pub fn spawn(&mut self, data: &WordData, surface: &mut dyn RenderSurface) -> WordId {
        let mut word = WordEntity {
            id: data.id.clone(),
            text: data.text.to_uppercase(),
            position: Vec2::new(data.x, data.y.unwrap_or(DEFAULT_SPAWN_Y)),
            velocity: Vec2::new(data.vx.unwrap_or(0.0), data.fall_speed()),
            is_special: data.is_special,
            highlight_len: 0,
            matched: false,
            handle: RenderHandle(0),
        };
        word.handle = surface.create_visual(&word.text, word.color(), 0);
        surface.move_to(word.handle, word.position.x, word.position.y, 0.0);
        surface.attach(word.handle);

        debug!(word_id = %word.id, text = %word.text, vy = word.velocity.y, "Word spawned");

        if let Some(previous) = self.words.insert(word.id.clone(), word) {
            self.duplicate_spawns += 1;
            surface.detach(previous.handle);
            warn!(
                word_id = %previous.id,
                duplicates = self.duplicate_spawns,
                "Duplicate word spawn, replacing live entity"
            );
        }
        data.id.clone()
    }

    /// Remove a word. Unknown ids are ignored. With `explode` a burst and
    /// the explosion sound play at the word's last position.
    pub fn remove(&mut self, id: &WordId, explode: bool, stage: &mut Stage<'_>) -> Option<WordEntity> {
        let word = self.words.remove(id)?;
        if explode {
            stage
                .effects
                .spawn_burst(stage.surface, word.position, BURST_FRAGMENTS);
            stage.audio.play_explosion();
        }
        stage.surface.detach(word.handle);
        debug!(word_id = %id, explode, "Word removed");
        Some(word)
    }

    /// Remove every word, returns how many were removed
    pub fn remove_all(&mut self, explode: bool, stage: &mut Stage<'_>) -> usize {
        let mut removed = 0;
        for id in self.ids() {
            if self.remove(&id, explode, stage).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn get(&self, id: &WordId) -> Option<&WordEntity> {
        self.words.get(id)
    }

    pub fn get_mut(&mut self, id: &WordId) -> Option<&mut WordEntity> {
        self.words.get_mut(id)
    }

    pub fn for_each(&self, mut f: impl FnMut(&WordEntity)) {
        self.words.values().for_each(|w| f(w));
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordEntity> {
        self.words.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WordEntity> {
        self.words.values_mut()
    }

    pub fn ids(&self) -> Vec<WordId> {
        self.words.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Spawns that replaced a live entity with the same id
    pub fn duplicate_spawns(&self) -> u64 {
        self.duplicate_spawns
    }
}
