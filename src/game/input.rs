//! Input matcher - keystrokes against the live words

use tracing::{debug, info};

use crate::render::{HudSink, RenderSurface};
use crate::ws::protocol::{ClientMsg, WordId};

use super::words::{WordEntity, WordStore};

/// A keystroke as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Backspace,
    Char(char),
}

/// Typed-so-far buffer. Holds only uppercase A-Z.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    current_input: String,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    /// Apply one keystroke, returns true if the buffer changed
    pub fn apply(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Backspace => self.current_input.pop().is_some(),
            KeyInput::Char(c) if c.is_ascii_alphabetic() => {
                self.current_input.push(c.to_ascii_uppercase());
                true
            }
            KeyInput::Char(_) => false,
        }
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
    }
}

/// Highlight length of `text` for the current input
pub fn highlight_len(text: &str, input: &str) -> usize {
    if !input.is_empty() && text.starts_with(input) {
        input.len()
    } else {
        0
    }
}

/// Result of a highlight pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HighlightOutcome {
    /// Words whose highlight or match state changed
    pub changed: Vec<WordId>,
    /// Word whose text equals the input (lowest id when several do)
    pub exact: Option<WordId>,
}

/// Recompute every word's highlight against `input`. Clears stale match
/// marks. Pure with respect to rendering.
pub fn recompute_highlights<'a>(
    words: impl IntoIterator<Item = &'a mut WordEntity>,
    input: &str,
) -> HighlightOutcome {
    let mut outcome = HighlightOutcome::default();
    for word in words {
        let len = highlight_len(&word.text, input);
        if len != word.highlight_len || word.matched {
            word.highlight_len = len;
            word.matched = false;
            outcome.changed.push(word.id.clone());
        }
        if !input.is_empty() && word.text == input {
            let lower = match &outcome.exact {
                Some(current) => word.id < *current,
                None => true,
            };
            if lower {
                outcome.exact = Some(word.id.clone());
            }
        }
    }
    outcome
}

/// Drives the match state machine
pub struct InputMatcher;

impl InputMatcher {
    /// Process one keystroke. Returns the submission to send when the
    /// input now equals a live word. The word itself stays until the
    /// authority clears it.
    pub fn handle_key(
        key: KeyInput,
        state: &mut MatchState,
        words: &mut WordStore,
        surface: &mut dyn RenderSurface,
        hud: &mut dyn HudSink,
    ) -> Option<ClientMsg> {
        state.apply(key);
        hud.set_input_preview(state.current_input());

        let outcome = recompute_highlights(words.iter_mut(), state.current_input());
        for id in &outcome.changed {
            if let Some(word) = words.get_mut(id) {
                word.redraw(surface);
            }
        }

        let exact = outcome.exact?;
        let submitted = state.current_input().to_string();
        state.clear();
        hud.set_input_preview("");

        if let Some(word) = words.get_mut(&exact) {
            word.matched = true;
            word.redraw(surface);
        }

        info!(word = %submitted, word_id = %exact, "Exact match, submitting");
        Some(ClientMsg::SubmitWord { word: submitted })
    }

    /// Sync a freshly spawned word with input typed before it arrived
    pub fn highlight_new_word(
        id: &WordId,
        state: &MatchState,
        words: &mut WordStore,
        surface: &mut dyn RenderSurface,
    ) {
        let Some(word) = words.get_mut(id) else {
            return;
        };
        let len = highlight_len(&word.text, state.current_input());
        if len != word.highlight_len {
            debug!(word_id = %id, len, "Highlighting new word");
            word.highlight_len = len;
            word.redraw(surface);
        }
    }
}
