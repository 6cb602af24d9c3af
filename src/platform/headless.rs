//! In-memory host
//!
//! Records every write and call instead of touching a browser. Backs the
//! `a11y-prefs` tool and the test suite; frames and pointer events only
//! happen when the caller drives them.

use super::{
    AccessibleElement, AccessibleTree, Capabilities, DocumentSurface, FrameCallback,
    FrameHandle, FrameScheduler, HoverEvent, HoverKind, HoverListener, ListenerId, MoveListener,
    PointerEvents, PointerMove, SpeechEngine, StylePriority, Utterance, Viewport,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

/// Observable document state written by the reflector
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentState {
    pub root_attributes: BTreeMap<String, String>,
    pub body_classes: BTreeSet<String>,
    pub root_styles: BTreeMap<String, (String, StylePriority)>,
}

/// Element with accessible-name metadata
#[derive(Clone, Debug, Default)]
pub struct HeadlessElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    hidden_text: Vec<String>,
    label: Option<Rc<HeadlessElement>>,
}

impl HeadlessElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Descendant text the user cannot see (`display:none`, `<script>`...)
    pub fn hidden_text(mut self, text: &str) -> Self {
        self.hidden_text.push(text.to_string());
        self
    }

    /// Every descendant text node, hidden ones included (`textContent`)
    pub fn all_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .text
            .iter()
            .chain(self.hidden_text.iter())
            .map(String::as_str)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Nest this element inside a `<label>`
    pub fn inside_label(mut self, label: HeadlessElement) -> Self {
        self.label = Some(Rc::new(label));
        self
    }
}

impl AccessibleElement for HeadlessElement {
    fn tag_name(&self) -> String {
        self.tag.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn rendered_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn enclosing_label(&self) -> Option<Box<dyn AccessibleElement>> {
        self.label
            .as_ref()
            .map(|label| Box::new((**label).clone()) as Box<dyn AccessibleElement>)
    }
}

#[derive(Default)]
pub struct HeadlessDocument {
    state: RefCell<DocumentState>,
    elements: RefCell<Vec<HeadlessElement>>,
}

impl HeadlessDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element for id and `label[for]` lookups
    pub fn add_element(&self, element: HeadlessElement) {
        self.elements.borrow_mut().push(element);
    }

    pub fn state(&self) -> DocumentState {
        self.state.borrow().clone()
    }

    pub fn root_attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().root_attributes.get(name).cloned()
    }

    pub fn has_body_class(&self, class: &str) -> bool {
        self.state.borrow().body_classes.contains(class)
    }

    pub fn root_style(&self, property: &str) -> Option<String> {
        self.state
            .borrow()
            .root_styles
            .get(property)
            .map(|(value, _)| value.clone())
    }

    pub fn root_style_priority(&self, property: &str) -> Option<StylePriority> {
        self.state
            .borrow()
            .root_styles
            .get(property)
            .map(|(_, priority)| *priority)
    }

    fn find(&self, pred: impl Fn(&HeadlessElement) -> bool) -> Option<Box<dyn AccessibleElement>> {
        self.elements
            .borrow()
            .iter()
            .find(|el| pred(el))
            .map(|el| Box::new(el.clone()) as Box<dyn AccessibleElement>)
    }
}

impl DocumentSurface for HeadlessDocument {
    fn set_root_attribute(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .root_attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_root_attribute(&self, name: &str) {
        self.state.borrow_mut().root_attributes.remove(name);
    }

    fn toggle_body_class(&self, class: &str, on: bool) {
        let mut state = self.state.borrow_mut();
        if on {
            state.body_classes.insert(class.to_string());
        } else {
            state.body_classes.remove(class);
        }
    }

    fn set_root_style(&self, property: &str, value: &str, priority: StylePriority) {
        self.state
            .borrow_mut()
            .root_styles
            .insert(property.to_string(), (value.to_string(), priority));
    }
}

impl AccessibleTree for HeadlessDocument {
    fn element_by_id(&self, id: &str) -> Option<Box<dyn AccessibleElement>> {
        self.find(|el| el.attributes.get("id").map(String::as_str) == Some(id))
    }

    fn label_for(&self, id: &str) -> Option<Box<dyn AccessibleElement>> {
        self.find(|el| el.tag == "label" && el.attributes.get("for").map(String::as_str) == Some(id))
    }
}

enum ListenerSlot {
    Hover(Rc<RefCell<HoverListener>>),
    Move(Rc<RefCell<MoveListener>>),
}

/// Pointer event source driven by the caller
#[derive(Default)]
pub struct HeadlessPointer {
    listeners: RefCell<BTreeMap<ListenerId, ListenerSlot>>,
    next_id: Cell<u64>,
}

impl HeadlessPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn hover(&self, target: &dyn AccessibleElement, timestamp_ms: f64) {
        self.dispatch_hover(HoverKind::Enter, target, timestamp_ms);
    }

    pub fn leave(&self, target: &dyn AccessibleElement, timestamp_ms: f64) {
        self.dispatch_hover(HoverKind::Leave, target, timestamp_ms);
    }

    pub fn move_to(&self, client_y: f64) {
        let targets: Vec<_> = self
            .listeners
            .borrow()
            .values()
            .filter_map(|slot| match slot {
                ListenerSlot::Move(l) => Some(Rc::clone(l)),
                ListenerSlot::Hover(_) => None,
            })
            .collect();
        for listener in targets {
            (&mut *listener.borrow_mut())(PointerMove { client_y });
        }
    }

    fn dispatch_hover(&self, kind: HoverKind, target: &dyn AccessibleElement, timestamp_ms: f64) {
        let event = HoverEvent {
            kind,
            target,
            timestamp_ms,
        };
        let targets: Vec<_> = self
            .listeners
            .borrow()
            .values()
            .filter_map(|slot| match slot {
                ListenerSlot::Hover(l) => Some(Rc::clone(l)),
                ListenerSlot::Move(_) => None,
            })
            .collect();
        for listener in targets {
            (&mut *listener.borrow_mut())(&event);
        }
    }

    fn insert(&self, slot: ListenerSlot) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, slot);
        id
    }
}

impl PointerEvents for HeadlessPointer {
    fn add_hover_listener(&self, listener: HoverListener) -> ListenerId {
        self.insert(ListenerSlot::Hover(Rc::new(RefCell::new(listener))))
    }

    fn add_move_listener(&self, listener: MoveListener) -> ListenerId {
        self.insert(ListenerSlot::Move(Rc::new(RefCell::new(listener))))
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(&id);
    }
}

/// Speech engine that records instead of speaking. Like the browser engine,
/// `speak` while busy queues behind the current utterance.
#[derive(Default)]
pub struct RecordingSpeech {
    spoken: RefCell<Vec<Utterance>>,
    current: RefCell<Option<Utterance>>,
    queue: RefCell<VecDeque<Utterance>>,
    cancels: Cell<usize>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every utterance ever passed to `speak`
    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.borrow().clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken.borrow().iter().map(|u| u.text.clone()).collect()
    }

    pub fn current(&self) -> Option<Utterance> {
        self.current.borrow().clone()
    }

    /// Speaking plus queued utterances
    pub fn pending_count(&self) -> usize {
        usize::from(self.current.borrow().is_some()) + self.queue.borrow().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.get()
    }

    /// Current utterance ran to completion
    pub fn finish_current(&self) {
        let next = self.queue.borrow_mut().pop_front();
        *self.current.borrow_mut() = next;
    }
}

impl SpeechEngine for RecordingSpeech {
    fn speak(&self, utterance: &Utterance) {
        self.spoken.borrow_mut().push(utterance.clone());
        let mut current = self.current.borrow_mut();
        if current.is_some() {
            self.queue.borrow_mut().push_back(utterance.clone());
        } else {
            *current = Some(utterance.clone());
        }
    }

    fn cancel(&self) {
        self.cancels.set(self.cancels.get() + 1);
        *self.current.borrow_mut() = None;
        self.queue.borrow_mut().clear();
    }
}

/// Frame scheduler stepped by `run_frame`, with its own millisecond clock
#[derive(Default)]
pub struct ManualFrames {
    pending: RefCell<BTreeMap<FrameHandle, FrameCallback>>,
    next_handle: Cell<u64>,
    now_ms: Cell<f64>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    /// Run every callback scheduled before this call at the current frame
    /// time; returns how many ran
    pub fn run_frame(&self) -> usize {
        let now = self.now_ms.get();
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let count = due.len();
        for callback in due.into_values() {
            callback(now);
        }
        count
    }

    /// Move the clock forward (never back) to `ms`, then run a frame
    pub fn run_frame_at(&self, ms: f64) -> usize {
        self.now_ms.set(self.now_ms.get().max(ms));
        self.run_frame()
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.pending.borrow_mut().insert(handle, callback);
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.pending.borrow_mut().remove(&handle);
    }
}

/// Scrollable viewport; position never goes above the top
pub struct HeadlessViewport {
    height: Cell<f64>,
    scroll_y: Cell<f64>,
}

impl HeadlessViewport {
    pub fn new(height: f64) -> Self {
        Self {
            height: Cell::new(height),
            scroll_y: Cell::new(0.0),
        }
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    pub fn set_scroll_y(&self, y: f64) {
        self.scroll_y.set(y.max(0.0));
    }

    pub fn set_height(&self, height: f64) {
        self.height.set(height);
    }
}

impl Viewport for HeadlessViewport {
    fn height(&self) -> f64 {
        self.height.get()
    }

    fn scroll_by(&self, dy: f64) {
        self.set_scroll_y(self.scroll_y.get() + dy);
    }
}

/// Bundle of headless capabilities sharing one document
pub struct HeadlessHost {
    pub document: Rc<HeadlessDocument>,
    pub pointer: Rc<HeadlessPointer>,
    pub speech: Rc<RecordingSpeech>,
    pub frames: Rc<ManualFrames>,
    pub viewport: Rc<HeadlessViewport>,
    speech_available: bool,
}

impl HeadlessHost {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            document: Rc::new(HeadlessDocument::new()),
            pointer: Rc::new(HeadlessPointer::new()),
            speech: Rc::new(RecordingSpeech::new()),
            frames: Rc::new(ManualFrames::new()),
            viewport: Rc::new(HeadlessViewport::new(viewport_height)),
            speech_available: true,
        }
    }

    /// Host whose capability check finds no speech synthesis
    pub fn without_speech(mut self) -> Self {
        self.speech_available = false;
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        let speech: Option<Rc<dyn SpeechEngine>> = if self.speech_available {
            Some(self.speech.clone())
        } else {
            None
        };
        Capabilities {
            surface: self.document.clone(),
            tree: self.document.clone(),
            pointer: self.pointer.clone(),
            speech,
            frames: self.frames.clone(),
            viewport: self.viewport.clone(),
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(800.0)
    }
}
