pub mod assist;
pub mod config;
pub mod core;
pub mod platform;
pub mod storage;
pub mod ui;

pub use assist::{HoverNarrator, NarratorConfig, ProximityAutoScroller, ScrollerConfig};
pub use config::{FontType, PreferenceSnapshot, PreferenceUpdate, Theme};
pub use self::core::{DomReflector, MenuController, MenuOptions, PreferenceBus};
pub use storage::{FileStorage, JsonPreferenceStore, MemoryStorage, PreferenceStore, StorageError};
