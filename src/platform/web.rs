//! Browser host (wasm32)
//!
//! `web-sys` implementations of the capability traits plus the
//! `AccessibilityMenu` export that the page's menu markup drives.

use super::{
    AccessibleElement, AccessibleTree, Capabilities, DocumentSurface, FrameCallback, FrameHandle,
    FrameScheduler, HoverEvent, HoverKind, HoverListener, ListenerId, MoveListener, PointerEvents,
    PointerMove, SpeechEngine, StylePriority, Utterance, Viewport,
};
use crate::config::{PreferenceSnapshot, PreferenceUpdate};
use crate::core::notify::PREFS_CHANGED_EVENT;
use crate::core::{MenuController, MenuOptions};
use crate::storage::{JsonPreferenceStore, KeyValueStorage, StorageError, StorageResult};
use crate::ui::Language;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, HtmlElement, MouseEvent, SpeechSynthesis,
    SpeechSynthesisUtterance, Window,
};

fn js_err(e: JsValue) -> String {
    format!("{:?}", e)
}

// --- Document ---

pub struct WebElement(Element);

impl AccessibleElement for WebElement {
    fn tag_name(&self) -> String {
        self.0.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn rendered_text(&self) -> Option<String> {
        match self.0.dyn_ref::<HtmlElement>() {
            Some(html) => Some(html.inner_text()),
            None => self.0.text_content(),
        }
    }

    fn enclosing_label(&self) -> Option<Box<dyn AccessibleElement>> {
        let label = self.0.closest("label").ok().flatten()?;
        Some(Box::new(WebElement(label)))
    }
}

pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }
}

impl DocumentSurface for WebDocument {
    fn set_root_attribute(&self, name: &str, value: &str) {
        if let Some(root) = self.root() {
            if let Err(e) = root.set_attribute(name, value) {
                log::warn!("set {} failed: {}", name, js_err(e));
            }
        }
    }

    fn remove_root_attribute(&self, name: &str) {
        if let Some(root) = self.root() {
            if let Err(e) = root.remove_attribute(name) {
                log::warn!("remove {} failed: {}", name, js_err(e));
            }
        }
    }

    fn toggle_body_class(&self, class: &str, on: bool) {
        let Some(body) = self.document.body() else {
            return;
        };
        if let Err(e) = body.class_list().toggle_with_force(class, on) {
            log::warn!("toggle .{} failed: {}", class, js_err(e));
        }
    }

    fn set_root_style(&self, property: &str, value: &str, priority: StylePriority) {
        let Some(root) = self.root().and_then(|r| r.dyn_into::<HtmlElement>().ok()) else {
            return;
        };
        let style = root.style();
        let result = match priority {
            StylePriority::Normal => style.set_property(property, value),
            StylePriority::Important => {
                style.set_property_with_priority(property, value, "important")
            }
        };
        if let Err(e) = result {
            log::warn!("style {} failed: {}", property, js_err(e));
        }
    }
}

impl AccessibleTree for WebDocument {
    fn element_by_id(&self, id: &str) -> Option<Box<dyn AccessibleElement>> {
        let element = self.document.get_element_by_id(id)?;
        Some(Box::new(WebElement(element)))
    }

    fn label_for(&self, id: &str) -> Option<Box<dyn AccessibleElement>> {
        let labels = self.document.get_elements_by_tag_name("label");
        (0..labels.length())
            .filter_map(|i| labels.item(i))
            .find(|label| label.get_attribute("for").as_deref() == Some(id))
            .map(|label| Box::new(WebElement(label)) as Box<dyn AccessibleElement>)
    }
}

// --- Pointer ---

type DomListener = Closure<dyn FnMut(MouseEvent)>;

/// Document-level mouse listeners. One `ListenerId` may own several DOM
/// registrations (hover = mouseover + mouseout).
pub struct WebPointer {
    document: Document,
    listeners: RefCell<BTreeMap<ListenerId, Vec<(&'static str, DomListener)>>>,
    next_id: Cell<u64>,
}

impl WebPointer {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(0),
        }
    }

    fn register(&self, registrations: Vec<(&'static str, DomListener)>) -> ListenerId {
        for (event_type, closure) in &registrations {
            if let Err(e) = self
                .document
                .add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
            {
                log::warn!("addEventListener({}) failed: {}", event_type, js_err(e));
            }
        }
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, registrations);
        id
    }
}

impl PointerEvents for WebPointer {
    fn add_hover_listener(&self, listener: HoverListener) -> ListenerId {
        let shared = Rc::new(RefCell::new(listener));
        let registrations = [("mouseover", HoverKind::Enter), ("mouseout", HoverKind::Leave)]
            .into_iter()
            .map(|(event_type, kind)| {
                let shared = Rc::clone(&shared);
                let closure = DomListener::new(move |event: MouseEvent| {
                    let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok())
                    else {
                        return;
                    };
                    let element = WebElement(target);
                    let hover = HoverEvent {
                        kind,
                        target: &element,
                        timestamp_ms: event.time_stamp(),
                    };
                    (&mut *shared.borrow_mut())(&hover);
                });
                (event_type, closure)
            })
            .collect();
        self.register(registrations)
    }

    fn add_move_listener(&self, mut listener: MoveListener) -> ListenerId {
        let closure = DomListener::new(move |event: MouseEvent| {
            listener(PointerMove {
                client_y: f64::from(event.client_y()),
            });
        });
        self.register(vec![("mousemove", closure)])
    }

    fn remove_listener(&self, id: ListenerId) {
        let Some(registrations) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };
        for (event_type, closure) in registrations {
            let _ = self
                .document
                .remove_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref());
        }
    }
}

// --- Speech ---

pub struct WebSpeech {
    synth: SpeechSynthesis,
}

impl WebSpeech {
    /// `None` when the browser has no `speechSynthesis`
    pub fn detect(window: &Window) -> Option<Self> {
        let target: &JsValue = window.as_ref();
        let present =
            js_sys::Reflect::has(target, &JsValue::from_str("speechSynthesis")).unwrap_or(false);
        if !present {
            return None;
        }
        window.speech_synthesis().ok().map(|synth| Self { synth })
    }
}

impl SpeechEngine for WebSpeech {
    fn speak(&self, utterance: &Utterance) {
        match SpeechSynthesisUtterance::new_with_text(&utterance.text) {
            Ok(u) => {
                u.set_lang(&utterance.lang);
                self.synth.speak(&u);
            }
            Err(e) => log::warn!("utterance rejected: {}", js_err(e)),
        }
    }

    fn cancel(&self) {
        self.synth.cancel();
    }
}

// --- Frames ---

struct RafState {
    window: Window,
    pending: RefCell<BTreeMap<u64, FrameCallback>>,
    next_handle: Cell<u64>,
    raf_id: Cell<Option<i32>>,
    tick: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl RafState {
    fn run(&self, frame_ms: f64) {
        self.raf_id.set(None);
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        for callback in due.into_values() {
            callback(frame_ms);
        }
    }

    fn ensure_scheduled(&self) {
        if self.raf_id.get().is_some() {
            return;
        }
        let tick = self.tick.borrow();
        let Some(tick) = tick.as_ref() else {
            return;
        };
        match self.window.request_animation_frame(tick.as_ref().unchecked_ref()) {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(e) => log::warn!("requestAnimationFrame failed: {}", js_err(e)),
        }
    }
}

impl Drop for RafState {
    fn drop(&mut self) {
        if let Some(id) = self.raf_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

/// `requestAnimationFrame` multiplexer: one browser callback per frame
/// runs every callback requested since the previous frame.
pub struct RafScheduler {
    state: Rc<RafState>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        let state = Rc::new(RafState {
            window,
            pending: RefCell::new(BTreeMap::new()),
            next_handle: Cell::new(0),
            raf_id: Cell::new(None),
            tick: RefCell::new(None),
        });
        let weak = Rc::downgrade(&state);
        let tick = Closure::<dyn FnMut(f64)>::new(move |ts: f64| {
            if let Some(state) = weak.upgrade() {
                state.run(ts);
            }
        });
        *state.tick.borrow_mut() = Some(tick);
        Self { state }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = self.state.next_handle.get();
        self.state.next_handle.set(handle + 1);
        self.state.pending.borrow_mut().insert(handle, callback);
        self.state.ensure_scheduled();
        FrameHandle(handle)
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let now_empty = {
            let mut pending = self.state.pending.borrow_mut();
            pending.remove(&handle.0);
            pending.is_empty()
        };
        if now_empty {
            if let Some(id) = self.state.raf_id.take() {
                let _ = self.state.window.cancel_animation_frame(id);
            }
        }
    }
}

// --- Viewport / storage ---

pub struct WebViewport {
    window: Window,
}

impl WebViewport {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Viewport for WebViewport {
    fn height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_by(&self, dy: f64) {
        self.window.scroll_by_with_x_and_y(0.0, dy);
    }
}

/// `window.localStorage`; private browsing may leave it missing or throwing
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn new(window: &Window) -> Self {
        let inner = match window.local_storage() {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("localStorage unavailable: {}", js_err(e));
                None
            }
        };
        Self { inner }
    }

    fn storage(&self) -> StorageResult<&web_sys::Storage> {
        self.inner
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("localStorage missing".to_string()))
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(js_err(e)))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(js_err(e)))
    }
}

/// Capabilities backed by the live page
pub fn capabilities(window: &Window) -> Result<Capabilities, JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;
    let page = Rc::new(WebDocument::new(document.clone()));
    let speech: Option<Rc<dyn SpeechEngine>> = match WebSpeech::detect(window) {
        Some(speech) => Some(Rc::new(speech)),
        None => None,
    };
    Ok(Capabilities {
        surface: page.clone(),
        tree: page,
        pointer: Rc::new(WebPointer::new(document)),
        speech,
        frames: Rc::new(RafScheduler::new(window.clone())),
        viewport: Rc::new(WebViewport::new(window.clone())),
    })
}

fn dispatch_prefs_changed(window: &Window, prefs: &PreferenceSnapshot) {
    let detail = match prefs.to_json() {
        Ok(json) => js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL),
        Err(e) => {
            log::warn!("snapshot encode failed: {}", e);
            return;
        }
    };
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    match CustomEvent::new_with_event_init_dict(PREFS_CHANGED_EVENT, &init) {
        Ok(event) => {
            let _ = window.dispatch_event(&event);
        }
        Err(e) => log::warn!("{} not dispatched: {}", PREFS_CHANGED_EVENT, js_err(e)),
    }
}

/// Dispatch from a microtask so page handlers run after the controller call
/// that produced `prefs` has returned and may call back into the menu.
fn queue_prefs_changed(window: &Window, prefs: PreferenceSnapshot) {
    let target = window.clone();
    let task = Closure::once_into_js(move || dispatch_prefs_changed(&target, &prefs));
    window.queue_microtask(task.unchecked_ref());
}

// --- JS surface ---

/// Menu controller bound to the current page
#[wasm_bindgen]
pub struct AccessibilityMenu {
    controller: MenuController,
}

#[wasm_bindgen]
impl AccessibilityMenu {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<AccessibilityMenu, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let caps = capabilities(&window)?;
        let storage = LocalStorage::new(&window);
        let language = Language::from_storage(&storage);
        let controller = MenuController::new(
            caps,
            Box::new(JsonPreferenceStore::new(storage)),
            MenuOptions::new().with_language(language),
        );

        queue_prefs_changed(&window, controller.snapshot());
        let target = window.clone();
        controller.subscribe(move |prefs| queue_prefs_changed(&target, *prefs));
        Ok(Self { controller })
    }

    /// Apply a partial change (camelCase JSON object); returns the new snapshot
    pub fn update(&mut self, changes: &str) -> Result<String, JsValue> {
        let changes =
            PreferenceUpdate::from_json(changes).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.controller.update(&changes);
        self.snapshot_json()
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        self.controller.reset();
        self.snapshot_json()
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> Result<String, JsValue> {
        self.controller.zoom_in();
        self.snapshot_json()
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> Result<String, JsValue> {
        self.controller.zoom_out();
        self.snapshot_json()
    }

    #[wasm_bindgen(js_name = stopSpeech)]
    pub fn stop_speech(&self) {
        self.controller.stop_speech();
    }

    #[wasm_bindgen(js_name = setLanguage)]
    pub fn set_language(&mut self, code: &str) {
        self.controller.set_language(Language::from_code(code));
    }

    #[wasm_bindgen(js_name = speechAvailable)]
    pub fn speech_available(&self) -> bool {
        self.controller.is_speech_available()
    }

    #[wasm_bindgen(js_name = snapshot)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.controller
            .snapshot()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Stop narration and auto-scroll (menu unmount)
    pub fn shutdown(&mut self) {
        self.controller.shutdown();
    }
}
