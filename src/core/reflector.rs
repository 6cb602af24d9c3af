//! Applies a preference snapshot to the live document
//!
//! Every write is reapplied on every call (the caller does not diff), so
//! replaying the latest snapshot after a burst of edits always converges.

use crate::config::{FontType, PreferenceSnapshot};
use crate::platform::{DocumentSurface, StylePriority};
use crate::storage::PreferenceStore;
use std::rc::Rc;

pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const CLASS_UNDERLINE_LINKS: &str = "a11y-underline-links";
pub const CLASS_LARGE_TARGETS: &str = "a11y-large-targets";
pub const CLASS_PAUSED: &str = "a11y-paused";
pub const CLASS_ENHANCED_FOCUS: &str = "a11y-enhanced-focus";
pub const PROP_LETTER_SPACING: &str = "--ls";
pub const PROP_LINE_HEIGHT: &str = "--lh";
pub const PROP_FONT_SIZE: &str = "font-size";

/// Body class for a font override, `None` for the default face
pub fn font_class(font: FontType) -> Option<&'static str> {
    match font {
        FontType::Default => None,
        FontType::Dyslexic => Some("font-dyslexic"),
        FontType::Sans => Some("font-sans"),
        FontType::Serif => Some("font-serif"),
    }
}

pub struct DomReflector {
    surface: Rc<dyn DocumentSurface>,
    store: Box<dyn PreferenceStore>,
}

impl DomReflector {
    pub fn new(surface: Rc<dyn DocumentSurface>, store: Box<dyn PreferenceStore>) -> Self {
        Self { surface, store }
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        &*self.store
    }

    /// Reflect and persist `snapshot`. A failed save is logged by the store
    /// and never undoes the document writes.
    pub fn apply(&self, snapshot: &PreferenceSnapshot) {
        self.reflect(snapshot);
        self.store.save(snapshot);
    }

    /// Document writes only (theme, classes, custom properties, font size)
    pub fn reflect(&self, snapshot: &PreferenceSnapshot) {
        let surface = &*self.surface;

        match snapshot.theme.marker() {
            Some(marker) => surface.set_root_attribute(THEME_ATTRIBUTE, marker),
            None => surface.remove_root_attribute(THEME_ATTRIBUTE),
        }

        surface.toggle_body_class(CLASS_UNDERLINE_LINKS, snapshot.underline_links);
        surface.toggle_body_class(CLASS_LARGE_TARGETS, snapshot.large_targets);
        surface.toggle_body_class(CLASS_PAUSED, snapshot.pause_animations);
        surface.toggle_body_class(CLASS_ENHANCED_FOCUS, snapshot.enhanced_focus);

        let active_font = font_class(snapshot.font_type);
        for font in FontType::ALL {
            if let Some(class) = font_class(font) {
                surface.toggle_body_class(class, Some(class) == active_font);
            }
        }

        surface.set_root_style(
            PROP_LETTER_SPACING,
            &format!("{}em", snapshot.letter_spacing.get()),
            StylePriority::Normal,
        );
        surface.set_root_style(
            PROP_LINE_HEIGHT,
            &format!("{}", snapshot.line_height.get()),
            StylePriority::Normal,
        );
        // FontScale is clamped on construction; the write must beat page stylesheets
        surface.set_root_style(
            PROP_FONT_SIZE,
            &format!("{}%", snapshot.font_size.percent()),
            StylePriority::Important,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PreferenceUpdate, Theme};
    use crate::platform::headless::HeadlessDocument;
    use crate::storage::{JsonPreferenceStore, MemoryStorage, PREFS_STORAGE_KEY};
    use pretty_assertions::assert_eq;

    fn reflector(doc: &Rc<HeadlessDocument>) -> (DomReflector, MemoryStorage) {
        let storage = MemoryStorage::new();
        let reflector =
            DomReflector::new(doc.clone(), Box::new(JsonPreferenceStore::new(storage.clone())));
        (reflector, storage)
    }

    #[test]
    fn test_defaults_clear_markers() {
        let doc = Rc::new(HeadlessDocument::new());
        let (reflector, _) = reflector(&doc);
        reflector.apply(&PreferenceSnapshot::default());

        assert_eq!(doc.root_attribute(THEME_ATTRIBUTE), None);
        assert!(doc.state().body_classes.is_empty());
        assert_eq!(doc.root_style(PROP_LETTER_SPACING).as_deref(), Some("0em"));
        assert_eq!(doc.root_style(PROP_LINE_HEIGHT).as_deref(), Some("1"));
        assert_eq!(doc.root_style(PROP_FONT_SIZE).as_deref(), Some("100%"));
        assert_eq!(
            doc.root_style_priority(PROP_FONT_SIZE),
            Some(StylePriority::Important)
        );
    }

    #[test]
    fn test_full_snapshot_reflected() {
        let doc = Rc::new(HeadlessDocument::new());
        let (reflector, _) = reflector(&doc);
        let prefs = PreferenceSnapshot::default().merged(
            &PreferenceUpdate::new()
                .theme(Theme::Sepia)
                .font_type(FontType::Serif)
                .font_size(1.25)
                .letter_spacing(0.1)
                .line_height(1.5)
                .underline_links(true)
                .pause_animations(true),
        );
        reflector.apply(&prefs);

        assert_eq!(doc.root_attribute(THEME_ATTRIBUTE).as_deref(), Some("sepia"));
        assert!(doc.has_body_class(CLASS_UNDERLINE_LINKS));
        assert!(doc.has_body_class(CLASS_PAUSED));
        assert!(!doc.has_body_class(CLASS_LARGE_TARGETS));
        assert!(doc.has_body_class("font-serif"));
        assert_eq!(doc.root_style(PROP_LETTER_SPACING).as_deref(), Some("0.1em"));
        assert_eq!(doc.root_style(PROP_LINE_HEIGHT).as_deref(), Some("1.5"));
        assert_eq!(doc.root_style(PROP_FONT_SIZE).as_deref(), Some("125%"));
    }

    #[test]
    fn test_font_classes_exclusive() {
        let doc = Rc::new(HeadlessDocument::new());
        let (reflector, _) = reflector(&doc);
        for font in FontType::ALL {
            let prefs = PreferenceSnapshot {
                font_type: font,
                ..Default::default()
            };
            reflector.apply(&prefs);
            let active: Vec<_> = doc
                .state()
                .body_classes
                .into_iter()
                .filter(|c| c.starts_with("font-"))
                .collect();
            assert_eq!(active.len(), usize::from(font != FontType::Default));
        }
    }

    #[test]
    fn test_apply_is_idempotent() {
        let doc = Rc::new(HeadlessDocument::new());
        let (reflector, _) = reflector(&doc);
        let prefs = PreferenceSnapshot {
            theme: Theme::Dark,
            enhanced_focus: true,
            ..Default::default()
        };
        reflector.apply(&prefs);
        let once = doc.state();
        reflector.apply(&prefs);
        assert_eq!(doc.state(), once);
    }

    #[test]
    fn test_apply_persists() {
        let doc = Rc::new(HeadlessDocument::new());
        let (reflector, storage) = reflector(&doc);
        let prefs = PreferenceSnapshot {
            theme: Theme::Hc,
            ..Default::default()
        };
        reflector.apply(&prefs);

        assert_eq!(reflector.store().load(), prefs);
        assert!(storage.raw(PREFS_STORAGE_KEY).is_some());
    }

    #[test]
    fn test_reflect_leaves_storage_alone() {
        let doc = Rc::new(HeadlessDocument::new());
        let (reflector, storage) = reflector(&doc);
        reflector.reflect(&PreferenceSnapshot {
            theme: Theme::Dark,
            ..Default::default()
        });
        assert_eq!(doc.root_attribute(THEME_ATTRIBUTE).as_deref(), Some("dark"));
        assert_eq!(storage.raw(PREFS_STORAGE_KEY), None);
    }
}
