//! Host capabilities
//!
//! The engine never touches the browser directly. Each host singleton it
//! needs (document, pointer events, speech synthesis, frame scheduling,
//! viewport) sits behind one of the small traits below so a recording
//! double can stand in for it.

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::rc::Rc;

/// Priority of an inline style write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StylePriority {
    Normal,
    /// `!important`, beats competing stylesheet rules
    Important,
}

/// Write side of the live document (root element and body)
pub trait DocumentSurface {
    fn set_root_attribute(&self, name: &str, value: &str);
    fn remove_root_attribute(&self, name: &str);
    fn toggle_body_class(&self, class: &str, on: bool);
    fn set_root_style(&self, property: &str, value: &str, priority: StylePriority);
}

/// Accessible-name metadata of one element
pub trait AccessibleElement {
    /// Lowercase tag name
    fn tag_name(&self) -> String;
    fn attribute(&self, name: &str) -> Option<String>;
    /// Text as rendered (`innerText`): descendants hidden from the user,
    /// script and style bodies are left out
    fn rendered_text(&self) -> Option<String>;
    /// Nearest `<label>` ancestor
    fn enclosing_label(&self) -> Option<Box<dyn AccessibleElement>>;
}

/// Document-wide lookups used by label resolution
pub trait AccessibleTree {
    fn element_by_id(&self, id: &str) -> Option<Box<dyn AccessibleElement>>;
    /// `<label for="id">` pointing at the given id
    fn label_for(&self, id: &str) -> Option<Box<dyn AccessibleElement>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverKind {
    Enter,
    Leave,
}

/// Delegated pointer-over / pointer-out notification
pub struct HoverEvent<'a> {
    pub kind: HoverKind,
    pub target: &'a dyn AccessibleElement,
    /// Event time in milliseconds (host clock)
    pub timestamp_ms: f64,
}

/// Pointer position update in viewport coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerMove {
    pub client_y: f64,
}

pub type HoverListener = Box<dyn FnMut(&HoverEvent<'_>)>;
pub type MoveListener = Box<dyn FnMut(PointerMove)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Document-level pointer listener registry
pub trait PointerEvents {
    fn add_hover_listener(&self, listener: HoverListener) -> ListenerId;
    fn add_move_listener(&self, listener: MoveListener) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
}

/// One request to speak a string
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    /// BCP-47 tag, e.g. "es-ES"
    pub lang: String,
}

/// Text-to-speech engine. Shared process-wide; at most one utterance in flight.
pub trait SpeechEngine {
    fn speak(&self, utterance: &Utterance);
    /// Drop the current and any queued utterance
    fn cancel(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// Receives the frame time in milliseconds, on the same clock as
/// `HoverEvent::timestamp_ms`
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Animation-frame scheduling primitive
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;
    /// No-op for handles that already fired
    fn cancel_frame(&self, handle: FrameHandle);
}

pub trait Viewport {
    /// Inner height in CSS pixels
    fn height(&self) -> f64;
    fn scroll_by(&self, dy: f64);
}

/// Everything the engine needs from its host
#[derive(Clone)]
pub struct Capabilities {
    pub surface: Rc<dyn DocumentSurface>,
    pub tree: Rc<dyn AccessibleTree>,
    pub pointer: Rc<dyn PointerEvents>,
    /// `None` when the host has no speech synthesis
    pub speech: Option<Rc<dyn SpeechEngine>>,
    pub frames: Rc<dyn FrameScheduler>,
    pub viewport: Rc<dyn Viewport>,
}
