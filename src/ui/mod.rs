pub mod labels;

pub use labels::{labels, MenuLabels};

use crate::config::{FONT_SCALE_MAX, FONT_SCALE_MIN};
use crate::storage::{KeyValueStorage, LANG_STORAGE_KEY};

// --- Menu control presets (zoom buttons, sliders) ---

/// Text-size button step
pub const FONT_SIZE_STEP: f64 = 0.1;

/// Range input description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderRange {
    /// Nearest step within range
    pub fn snap(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        let steps = ((value - self.min) / self.step).round();
        round_to(self.min + steps * self.step, 2).clamp(self.min, self.max)
    }
}

pub const LETTER_SPACING_SLIDER: SliderRange = SliderRange {
    min: 0.0,
    max: 0.5,
    step: 0.05,
};

pub const LINE_HEIGHT_SLIDER: SliderRange = SliderRange {
    min: 1.0,
    max: 2.0,
    step: 0.1,
};

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Next font size after pressing a zoom button (`direction` = +1 / -1).
/// Rounded to one decimal so repeated presses don't drift.
pub fn step_font_size(current: f64, direction: i8) -> f64 {
    let next = round_to(current + f64::from(direction.signum()) * FONT_SIZE_STEP, 1);
    next.clamp(FONT_SCALE_MIN, FONT_SCALE_MAX)
}

/// "110%" style readout of a font multiplier
pub fn format_percent(multiplier: f64) -> String {
    format!("{:.0}%", multiplier * 100.0)
}

/// Interface language of the menu and narrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    /// "en" selects English, anything else Spanish
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("en") {
            Language::En
        } else {
            Language::Es
        }
    }

    /// Read the `lang` key; unavailable storage means Spanish
    pub fn from_storage(storage: &dyn KeyValueStorage) -> Self {
        match storage.get_item(LANG_STORAGE_KEY) {
            Ok(Some(code)) => Self::from_code(&code),
            _ => Language::Es,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    /// BCP-47 tag for speech synthesis
    pub fn speech_tag(self) -> &'static str {
        match self {
            Language::Es => "es-ES",
            Language::En => "en-US",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_step_font_size() {
        assert_eq!(step_font_size(1.0, 1), 1.1);
        assert_eq!(step_font_size(1.1, 1), 1.2);
        assert_eq!(step_font_size(2.0, 1), 2.0);
        assert_eq!(step_font_size(0.8, -1), 0.75);
        assert_eq!(step_font_size(0.75, -1), 0.75);
    }

    #[test]
    fn test_slider_snap() {
        assert_eq!(LETTER_SPACING_SLIDER.snap(0.13), 0.15);
        assert_eq!(LETTER_SPACING_SLIDER.snap(0.9), 0.5);
        assert_eq!(LINE_HEIGHT_SLIDER.snap(1.44), 1.4);
        assert_eq!(LINE_HEIGHT_SLIDER.snap(0.0), 1.0);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1.0), "100%");
        assert_eq!(format_percent(1.25), "125%");
    }

    #[test]
    fn test_language_from_storage() {
        assert_eq!(Language::from_storage(&MemoryStorage::new()), Language::Es);
        let storage = MemoryStorage::new().with_item(LANG_STORAGE_KEY, "en");
        assert_eq!(Language::from_storage(&storage), Language::En);
        assert_eq!(Language::En.speech_tag(), "en-US");
    }
}
