//! Recording collaborators for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::{AudioTrigger, Collaborators, HudSink, RenderHandle, RenderSurface, Side};

#[derive(Debug, Clone)]
pub struct Visual {
    pub text: Option<String>,
    pub color: String,
    pub highlight_len: usize,
    pub position: (f32, f32, f32),
    pub opacity: f32,
    pub scale: f32,
}

/// Everything the engine told its collaborators, folded into current state
#[derive(Debug, Default)]
pub struct Recorded {
    next_handle: u64,
    pub visuals: HashMap<RenderHandle, Visual>,
    pub attached: HashSet<RenderHandle>,
    pub fragments_created: usize,
    pub viewport_offset: (f32, f32),
    pub viewport_moves: usize,
    pub overlay: Option<String>,
    pub overlay_shows: usize,
    pub overlay_hides: usize,

    pub local_health: Option<i64>,
    pub opponent_health: Option<i64>,
    pub local_power: Option<i64>,
    pub opponent_power: Option<i64>,
    pub combo: Option<i64>,
    pub input_preview: Option<String>,
    pub notifications: Vec<String>,
    pub lobby_status: Option<String>,
    pub start_enabled: bool,
    pub outcome: Option<String>,

    pub explosions: usize,
    pub music_playing: bool,
}

impl Recorded {
    /// Texts of attached text visuals, sorted
    pub fn attached_texts(&self) -> Vec<String> {
        let mut texts: Vec<String> = self
            .attached
            .iter()
            .filter_map(|h| self.visuals.get(h).and_then(|v| v.text.clone()))
            .collect();
        texts.sort();
        texts
    }

    /// Attached text visual showing `text`
    pub fn visual_for(&self, text: &str) -> Option<&Visual> {
        self.attached
            .iter()
            .filter_map(|h| self.visuals.get(h))
            .find(|v| v.text.as_deref() == Some(text))
    }

    pub fn attached_fragments(&self) -> usize {
        self.attached
            .iter()
            .filter(|h| self.visuals.get(h).is_some_and(|v| v.text.is_none()))
            .count()
    }
}

/// Cloneable recorder implementing every collaborator trait
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Recorded>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(self.clone(), self.clone(), self.clone())
    }

    pub fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.0.lock()
    }

    fn create(&self, text: Option<&str>, color: &str, highlight_len: usize) -> RenderHandle {
        let mut rec = self.0.lock();
        rec.next_handle += 1;
        let handle = RenderHandle(rec.next_handle);
        rec.visuals.insert(
            handle,
            Visual {
                text: text.map(str::to_string),
                color: color.to_string(),
                highlight_len,
                position: (0.0, 0.0, 0.0),
                opacity: 1.0,
                scale: 1.0,
            },
        );
        handle
    }
}

impl RenderSurface for Recorder {
    fn create_visual(&mut self, text: &str, color: &str, highlight_len: usize) -> RenderHandle {
        self.create(Some(text), color, highlight_len)
    }

    fn create_fragment(&mut self, color: &str) -> RenderHandle {
        self.0.lock().fragments_created += 1;
        self.create(None, color, 0)
    }

    fn attach(&mut self, handle: RenderHandle) {
        self.0.lock().attached.insert(handle);
    }

    fn detach(&mut self, handle: RenderHandle) {
        self.0.lock().attached.remove(&handle);
    }

    fn move_to(&mut self, handle: RenderHandle, x: f32, y: f32, z: f32) {
        if let Some(visual) = self.0.lock().visuals.get_mut(&handle) {
            visual.position = (x, y, z);
        }
    }

    fn set_appearance(&mut self, handle: RenderHandle, opacity: f32, scale: f32) {
        if let Some(visual) = self.0.lock().visuals.get_mut(&handle) {
            visual.opacity = opacity;
            visual.scale = scale;
        }
    }

    fn set_viewport_offset(&mut self, dx: f32, dy: f32) {
        let mut rec = self.0.lock();
        rec.viewport_offset = (dx, dy);
        rec.viewport_moves += 1;
    }

    fn show_overlay(&mut self, label: &str) {
        let mut rec = self.0.lock();
        rec.overlay = Some(label.to_string());
        rec.overlay_shows += 1;
    }

    fn hide_overlay(&mut self) {
        let mut rec = self.0.lock();
        rec.overlay = None;
        rec.overlay_hides += 1;
    }
}

impl HudSink for Recorder {
    fn set_health(&mut self, side: Side, value: i64) {
        let mut rec = self.0.lock();
        match side {
            Side::Local => rec.local_health = Some(value),
            Side::Opponent => rec.opponent_health = Some(value),
        }
    }

    fn set_power(&mut self, side: Side, value: i64) {
        let mut rec = self.0.lock();
        match side {
            Side::Local => rec.local_power = Some(value),
            Side::Opponent => rec.opponent_power = Some(value),
        }
    }

    fn set_combo(&mut self, value: i64) {
        self.0.lock().combo = Some(value);
    }

    fn set_input_preview(&mut self, input: &str) {
        self.0.lock().input_preview = Some(input.to_string());
    }

    fn notify(&mut self, message: &str) {
        self.0.lock().notifications.push(message.to_string());
    }

    fn set_lobby_status(&mut self, status: &str) {
        self.0.lock().lobby_status = Some(status.to_string());
    }

    fn set_start_enabled(&mut self, enabled: bool) {
        self.0.lock().start_enabled = enabled;
    }

    fn show_outcome(&mut self, message: &str) {
        self.0.lock().outcome = Some(message.to_string());
    }
}

impl AudioTrigger for Recorder {
    fn play_explosion(&mut self) {
        self.0.lock().explosions += 1;
    }

    fn play_background_loop(&mut self) {
        self.0.lock().music_playing = true;
    }

    fn stop_background_loop(&mut self) {
        self.0.lock().music_playing = false;
    }
}
