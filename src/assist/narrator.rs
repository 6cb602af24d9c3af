//! Hover narration
//!
//! Stopped ⇄ Listening. While listening, one delegated hover listener
//! resolves a label for the hovered element and speaks it. Starting
//! acquires a `NarrationSession`; dropping the session is the only release
//! path (listener removed, deferred label dropped, speech cancelled).
//!
//! A label arriving inside the throttle window is not lost: the latest one
//! is held and spoken on the first frame after the window closes.

use super::label::{is_narratable, resolve_label, MAX_LABEL_CHARS};
use crate::platform::{
    AccessibleTree, FrameHandle, FrameScheduler, HoverEvent, HoverKind, ListenerId,
    PointerEvents, SpeechEngine, Utterance,
};
use crate::ui::Language;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Minimum gap between two utterances (ms)
pub const DEFAULT_THROTTLE_MS: f64 = 250.0;

#[derive(Debug, Clone)]
pub struct NarratorConfig {
    pub throttle_ms: f64,
    pub max_label_chars: usize,
    pub language: Language,
    /// Pointer leaving a target cancels speech and forgets the last text
    pub cancel_on_leave: bool,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            throttle_ms: DEFAULT_THROTTLE_MS,
            max_label_chars: MAX_LABEL_CHARS,
            language: Language::default(),
            cancel_on_leave: false,
        }
    }
}

impl NarratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_throttle_ms(mut self, ms: f64) -> Self {
        self.throttle_ms = ms.max(0.0);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_cancel_on_leave(mut self, on: bool) -> Self {
        self.cancel_on_leave = on;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarratorState {
    Stopped,
    Listening,
}

/// Per-session narration bookkeeping
struct Narration {
    config: NarratorConfig,
    tree: Rc<dyn AccessibleTree>,
    speech: Rc<dyn SpeechEngine>,
    frames: Rc<dyn FrameScheduler>,
    this: Weak<RefCell<Narration>>,
    last_spoken: Option<String>,
    last_spoken_at: Option<f64>,
    /// Latest label held back by the throttle; spoken once the window ends
    pending: Option<String>,
    pending_frame: Option<FrameHandle>,
}

impl Narration {
    fn on_hover(&mut self, event: &HoverEvent<'_>) {
        match event.kind {
            HoverKind::Enter => self.on_enter(event),
            HoverKind::Leave => {
                if self.config.cancel_on_leave {
                    self.clear_pending();
                    self.speech.cancel();
                    self.last_spoken = None;
                }
            }
        }
    }

    fn on_enter(&mut self, event: &HoverEvent<'_>) {
        if !is_narratable(event.target) {
            return;
        }
        let Some(text) = resolve_label(event.target, &*self.tree, self.config.max_label_chars)
        else {
            return;
        };
        if self.last_spoken.as_deref() == Some(text.as_str()) {
            // back on what was just read: anything deferred is stale
            log::debug!("narrator: '{}' already spoken, skipping", text);
            self.clear_pending();
            return;
        }
        if self.within_window(event.timestamp_ms) {
            log::debug!("narrator: throttled '{}', deferring", text);
            self.pending = Some(text);
            self.schedule_flush();
            return;
        }
        self.clear_pending();
        self.speak(text, event.timestamp_ms);
    }

    fn within_window(&self, now_ms: f64) -> bool {
        self.last_spoken_at
            .is_some_and(|at| now_ms - at < self.config.throttle_ms)
    }

    fn speak(&mut self, text: String, at_ms: f64) {
        // last request wins: never queue behind an older utterance
        self.speech.cancel();
        self.speech.speak(&Utterance {
            text: text.clone(),
            lang: self.config.language.speech_tag().to_string(),
        });
        self.last_spoken = Some(text);
        self.last_spoken_at = Some(at_ms);
    }

    fn schedule_flush(&mut self) {
        if self.pending_frame.is_some() {
            return;
        }
        let this = self.this.clone();
        let handle = self.frames.request_frame(Box::new(move |frame_ms: f64| {
            if let Some(narration) = this.upgrade() {
                narration.borrow_mut().on_frame(frame_ms);
            }
        }));
        self.pending_frame = Some(handle);
    }

    fn on_frame(&mut self, frame_ms: f64) {
        self.pending_frame = None;
        if self.pending.is_none() {
            return;
        }
        if self.within_window(frame_ms) {
            self.schedule_flush();
            return;
        }
        if let Some(text) = self.pending.take() {
            if self.last_spoken.as_deref() != Some(text.as_str()) {
                self.speak(text, frame_ms);
            }
        }
    }

    fn clear_pending(&mut self) {
        self.pending = None;
        if let Some(handle) = self.pending_frame.take() {
            self.frames.cancel_frame(handle);
        }
    }
}

/// Live listener, deferred label and speech ownership. Dropping it
/// releases all three.
pub struct NarrationSession {
    pointer: Rc<dyn PointerEvents>,
    speech: Rc<dyn SpeechEngine>,
    listener: ListenerId,
    narration: Rc<RefCell<Narration>>,
}

impl Drop for NarrationSession {
    fn drop(&mut self) {
        self.pointer.remove_listener(self.listener);
        if let Ok(mut narration) = self.narration.try_borrow_mut() {
            narration.clear_pending();
        }
        self.speech.cancel();
    }
}

pub struct HoverNarrator {
    config: NarratorConfig,
    pointer: Rc<dyn PointerEvents>,
    tree: Rc<dyn AccessibleTree>,
    speech: Option<Rc<dyn SpeechEngine>>,
    frames: Rc<dyn FrameScheduler>,
    session: Option<NarrationSession>,
}

impl HoverNarrator {
    pub fn new(
        config: NarratorConfig,
        pointer: Rc<dyn PointerEvents>,
        tree: Rc<dyn AccessibleTree>,
        speech: Option<Rc<dyn SpeechEngine>>,
        frames: Rc<dyn FrameScheduler>,
    ) -> Self {
        Self {
            config,
            pointer,
            tree,
            speech,
            frames,
            session: None,
        }
    }

    pub fn state(&self) -> NarratorState {
        if self.session.is_some() {
            NarratorState::Listening
        } else {
            NarratorState::Stopped
        }
    }

    pub fn is_speech_available(&self) -> bool {
        self.speech.is_some()
    }

    /// Stopped → Listening. Idempotent; a silent no-op without speech synthesis.
    pub fn start(&mut self) {
        if self.session.is_some() {
            return;
        }
        let Some(speech) = self.speech.clone() else {
            log::info!("narrator: speech synthesis unavailable, hover reading disabled");
            return;
        };

        let narration = Rc::new_cyclic(|this| {
            RefCell::new(Narration {
                config: self.config.clone(),
                tree: Rc::clone(&self.tree),
                speech: Rc::clone(&speech),
                frames: Rc::clone(&self.frames),
                this: this.clone(),
                last_spoken: None,
                last_spoken_at: None,
                pending: None,
                pending_frame: None,
            })
        });
        let hovered = Rc::clone(&narration);
        let listener = self.pointer.add_hover_listener(Box::new(move |event: &HoverEvent<'_>| {
            hovered.borrow_mut().on_hover(event);
        }));
        self.session = Some(NarrationSession {
            pointer: Rc::clone(&self.pointer),
            speech,
            listener,
            narration,
        });
        log::info!("narrator: listening");
    }

    /// Listening → Stopped. Removes the listener and cancels in-flight speech.
    pub fn stop(&mut self) {
        if self.session.take().is_some() {
            log::info!("narrator: stopped");
        }
    }

    /// Cut the current utterance without leaving the Listening state
    pub fn silence(&self) {
        if let Some(speech) = &self.speech {
            speech.cancel();
        }
    }

    pub fn set_language(&mut self, language: Language) {
        self.config.language = language;
    }
}

impl Drop for HoverNarrator {
    fn drop(&mut self) {
        self.stop();
    }
}
