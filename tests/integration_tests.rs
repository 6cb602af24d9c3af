//! Integration tests - menu controller against the headless host

use a11y_assist::config::{FontType, Theme};
use a11y_assist::core::reflector::{PROP_FONT_SIZE, THEME_ATTRIBUTE};
use a11y_assist::platform::headless::{HeadlessElement, HeadlessHost};
use a11y_assist::storage::{FileStorage, JsonPreferenceStore, MemoryStorage, PREFS_STORAGE_KEY};
use a11y_assist::{MenuController, MenuOptions, PreferenceSnapshot, PreferenceUpdate};
use pretty_assertions::assert_eq;

fn menu(host: &HeadlessHost, storage: &MemoryStorage) -> MenuController {
    MenuController::new(
        host.capabilities(),
        Box::new(JsonPreferenceStore::new(storage.clone())),
        MenuOptions::default(),
    )
}

#[test]
fn test_stored_empty_record_gives_defaults() {
    let host = HeadlessHost::default();
    let storage = MemoryStorage::new().with_item(PREFS_STORAGE_KEY, "{}");
    let menu = menu(&host, &storage);
    assert_eq!(menu.snapshot(), PreferenceSnapshot::default());
    assert_eq!(host.document.root_attribute(THEME_ATTRIBUTE), None);
    assert_eq!(host.document.root_style(PROP_FONT_SIZE).as_deref(), Some("100%"));
}

#[test]
fn test_corrupt_record_gives_defaults() {
    let host = HeadlessHost::default();
    let storage = MemoryStorage::new().with_item(PREFS_STORAGE_KEY, "{\"theme\":");
    assert_eq!(menu(&host, &storage).snapshot(), PreferenceSnapshot::default());
}

#[test]
fn test_small_font_size_clamped() {
    let host = HeadlessHost::default();
    let mut menu = menu(&host, &MemoryStorage::new());
    menu.update(&PreferenceUpdate::new().font_size(0.5));
    assert_eq!(menu.snapshot().font_size.get(), 0.75);
    assert_eq!(host.document.root_style(PROP_FONT_SIZE).as_deref(), Some("75%"));

    menu.update(&PreferenceUpdate::new().font_size(10.0));
    assert_eq!(host.document.root_style(PROP_FONT_SIZE).as_deref(), Some("200%"));
    menu.update(&PreferenceUpdate::new().font_size(-5.0));
    assert_eq!(host.document.root_style(PROP_FONT_SIZE).as_deref(), Some("75%"));
}

#[test]
fn test_theme_toggling_leaves_one_active() {
    let host = HeadlessHost::default();
    let mut menu = menu(&host, &MemoryStorage::new());
    for theme in [Theme::Dark, Theme::Hc, Theme::Sepia, Theme::Default, Theme::Hc] {
        menu.update(&PreferenceUpdate::new().theme(theme));
        assert_eq!(
            host.document.root_attribute(THEME_ATTRIBUTE).as_deref(),
            theme.marker()
        );
        assert!(host.document.state().root_attributes.len() <= 1);
    }
}

#[test]
fn test_font_switch_replaces_class() {
    let host = HeadlessHost::default();
    let mut menu = menu(&host, &MemoryStorage::new());
    menu.update(&PreferenceUpdate::new().font_type(FontType::Dyslexic));
    menu.update(&PreferenceUpdate::new().font_type(FontType::Sans));
    assert!(host.document.has_body_class("font-sans"));
    assert!(!host.document.has_body_class("font-dyslexic"));
}

#[test]
fn test_hover_submit_spoken_once() {
    let host = HeadlessHost::default();
    let mut menu = menu(&host, &MemoryStorage::new());
    menu.update(&PreferenceUpdate::new().hover_speak(true));

    let submit = HeadlessElement::new("button").attr("aria-label", "Submit");
    host.pointer.hover(&submit, 1000.0);
    host.pointer.hover(&submit, 1100.0);

    assert_eq!(host.speech.spoken_texts(), vec!["Submit"]);
}

#[test]
fn test_disabling_hover_speak_silences() {
    let host = HeadlessHost::default();
    let mut menu = menu(&host, &MemoryStorage::new());
    menu.update(&PreferenceUpdate::new().hover_speak(true));
    host.pointer.hover(&HeadlessElement::new("p").text("A long paragraph"), 0.0);
    assert_eq!(host.speech.pending_count(), 1);

    menu.update(&PreferenceUpdate::new().hover_speak(false));
    assert_eq!(host.speech.pending_count(), 0);
    host.pointer.hover(&HeadlessElement::new("button").text("Again"), 5000.0);
    assert_eq!(host.speech.spoken().len(), 1);
}

#[test]
fn test_disabling_auto_scroll_clears_frames() {
    let host = HeadlessHost::new(800.0);
    host.viewport.set_scroll_y(1000.0);
    let mut menu = menu(&host, &MemoryStorage::new());
    menu.update(&PreferenceUpdate::new().auto_scroll(true));

    host.pointer.move_to(10.0);
    host.frames.run_frame();
    let expected = 1000.0 - 10.0 * 140.0 / 150.0;
    assert!((host.viewport.scroll_y() - expected).abs() < 1e-9);

    menu.update(&PreferenceUpdate::new().auto_scroll(false));
    assert_eq!(host.frames.scheduled_count(), 0);
}

#[test]
fn test_preferences_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let host = HeadlessHost::default();
    {
        let mut menu = MenuController::new(
            host.capabilities(),
            Box::new(JsonPreferenceStore::new(FileStorage::new(dir.path()))),
            MenuOptions::default(),
        );
        menu.update(
            &PreferenceUpdate::new()
                .theme(Theme::Sepia)
                .line_height(1.6)
                .auto_scroll(true),
        );
    }
    assert_eq!(host.frames.scheduled_count(), 0);

    let host = HeadlessHost::default();
    let menu = MenuController::new(
        host.capabilities(),
        Box::new(JsonPreferenceStore::new(FileStorage::new(dir.path()))),
        MenuOptions::default(),
    );
    let prefs = menu.snapshot();
    assert_eq!(prefs.theme, Theme::Sepia);
    assert_eq!(prefs.line_height.get(), 1.6);
    assert!(prefs.auto_scroll);
    assert_eq!(host.frames.scheduled_count(), 1);
}

#[test]
fn test_no_speech_host_keeps_working() {
    let host = HeadlessHost::default().without_speech();
    let mut menu = menu(&host, &MemoryStorage::new());
    menu.update(&PreferenceUpdate::new().hover_speak(true).underline_links(true));
    assert!(!menu.is_speech_available());
    assert!(menu.snapshot().hover_speak);
    assert!(host.document.has_body_class("a11y-underline-links"));
    assert_eq!(host.pointer.listener_count(), 0);
}
