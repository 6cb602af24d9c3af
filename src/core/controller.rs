//! Menu controller
//!
//! Owns the single live `PreferenceSnapshot`. Every edit goes through
//! `commit`: reflect + persist, reconcile the narrator and auto-scroller
//! against the new flags, then broadcast. Subscribers therefore always see
//! behaviours already matching the snapshot they receive.

use super::notify::{PreferenceBus, SubscriptionId};
use super::reflector::DomReflector;
use crate::assist::{
    HoverNarrator, NarratorConfig, NarratorState, ProximityAutoScroller, ScrollerConfig,
    ScrollerState,
};
use crate::config::{PreferenceSnapshot, PreferenceUpdate};
use crate::platform::Capabilities;
use crate::storage::PreferenceStore;
use crate::ui::{step_font_size, Language};
use std::rc::Rc;

/// Behaviour tunables handed to the controller at construction
#[derive(Debug, Clone, Default)]
pub struct MenuOptions {
    pub narrator: NarratorConfig,
    pub scroller: ScrollerConfig,
}

impl MenuOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.narrator.language = language;
        self
    }

    pub fn with_narrator(mut self, narrator: NarratorConfig) -> Self {
        self.narrator = narrator;
        self
    }

    pub fn with_scroller(mut self, scroller: ScrollerConfig) -> Self {
        self.scroller = scroller;
        self
    }
}

pub struct MenuController {
    snapshot: PreferenceSnapshot,
    reflector: DomReflector,
    bus: Rc<PreferenceBus>,
    narrator: HoverNarrator,
    scroller: ProximityAutoScroller,
}

impl MenuController {
    /// Load the stored record, apply it once and start whatever it enables
    pub fn new(caps: Capabilities, store: Box<dyn PreferenceStore>, options: MenuOptions) -> Self {
        let initial = store.load();
        let bus = Rc::new(PreferenceBus::new());
        let reflector = DomReflector::new(Rc::clone(&caps.surface), store);
        let narrator = HoverNarrator::new(
            options.narrator,
            Rc::clone(&caps.pointer),
            Rc::clone(&caps.tree),
            caps.speech.clone(),
            Rc::clone(&caps.frames),
        );
        let scroller =
            ProximityAutoScroller::new(options.scroller, caps.pointer, caps.frames, caps.viewport);

        let mut controller = Self {
            snapshot: initial,
            reflector,
            bus,
            narrator,
            scroller,
        };
        controller.commit(initial);
        controller
    }

    pub fn snapshot(&self) -> PreferenceSnapshot {
        self.snapshot
    }

    /// Merge `changes` into the current snapshot. All side effects have
    /// happened by the time this returns.
    pub fn update(&mut self, changes: &PreferenceUpdate) -> PreferenceSnapshot {
        let next = self.snapshot.merged(changes);
        log::debug!("menu: update {:?}", changes);
        self.commit(next);
        next
    }

    /// Back to the defaults, through the same path as `update`
    pub fn reset(&mut self) -> PreferenceSnapshot {
        log::info!("menu: reset to defaults");
        let defaults = PreferenceSnapshot::default();
        self.commit(defaults);
        defaults
    }

    pub fn zoom_in(&mut self) -> PreferenceSnapshot {
        let next = step_font_size(self.snapshot.font_size.get(), 1);
        self.update(&PreferenceUpdate::new().font_size(next))
    }

    pub fn zoom_out(&mut self) -> PreferenceSnapshot {
        let next = step_font_size(self.snapshot.font_size.get(), -1);
        self.update(&PreferenceUpdate::new().font_size(next))
    }

    /// Cut the current utterance; hover reading stays enabled
    pub fn stop_speech(&self) {
        self.narrator.silence();
    }

    /// Narration language. A listening narrator is restarted so the next
    /// utterance uses it.
    pub fn set_language(&mut self, language: Language) {
        self.narrator.set_language(language);
        if self.narrator.state() == NarratorState::Listening {
            self.narrator.stop();
            self.narrator.start();
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&PreferenceSnapshot) + 'static) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn narrator_state(&self) -> NarratorState {
        self.narrator.state()
    }

    pub fn scroller_state(&self) -> ScrollerState {
        self.scroller.state()
    }

    pub fn is_speech_available(&self) -> bool {
        self.narrator.is_speech_available()
    }

    /// Stop both behaviours. The snapshot and document are left as they are.
    pub fn shutdown(&mut self) {
        self.narrator.stop();
        self.scroller.stop();
    }

    fn commit(&mut self, next: PreferenceSnapshot) {
        self.snapshot = next;
        self.reflector.apply(&self.snapshot);
        self.reconcile();
        self.bus.publish(&self.snapshot);
    }

    fn reconcile(&mut self) {
        if self.snapshot.hover_speak {
            self.narrator.start();
        } else {
            self.narrator.stop();
        }
        if self.snapshot.auto_scroll {
            self.scroller.start();
        } else {
            self.scroller.stop();
        }
    }
}

impl Drop for MenuController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
