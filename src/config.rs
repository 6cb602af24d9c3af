//! Accessibility preference record (JSON)
//!
//! `PreferenceSnapshot` is the only persisted entity. Numeric fields are
//! newtypes that clamp on construction, so an out-of-range value can never
//! reach storage or the document.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// Lower bound of the font size multiplier
pub const FONT_SCALE_MIN: f64 = 0.75;
/// Upper bound of the font size multiplier
pub const FONT_SCALE_MAX: f64 = 2.0;
pub const LETTER_SPACING_MIN: f64 = 0.0;
pub const LETTER_SPACING_MAX: f64 = 0.5;
pub const LINE_HEIGHT_MIN: f64 = 1.0;
pub const LINE_HEIGHT_MAX: f64 = 2.0;

/// Visual theme. Exactly one is active at a time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    /// High contrast
    Hc,
    Sepia,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Default, Theme::Dark, Theme::Hc, Theme::Sepia];

    /// Value of the root `data-theme` marker, `None` for the default theme
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Theme::Default => None,
            Theme::Dark => Some("dark"),
            Theme::Hc => Some("hc"),
            Theme::Sepia => Some("sepia"),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.marker().unwrap_or("default")
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Typeface family override
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FontType {
    #[default]
    Default,
    Dyslexic,
    Sans,
    Serif,
}

impl FontType {
    pub const ALL: [FontType; 4] = [
        FontType::Default,
        FontType::Dyslexic,
        FontType::Sans,
        FontType::Serif,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FontType::Default => "default",
            FontType::Dyslexic => "dyslexic",
            FontType::Sans => "sans",
            FontType::Serif => "serif",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Font size multiplier, always within [0.75, 2.0]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, PartialOrd)]
#[serde(from = "f64", into = "f64")]
pub struct FontScale(f64);

impl FontScale {
    pub fn new(value: f64) -> Self {
        Self(clamp_or(value, FONT_SCALE_MIN, FONT_SCALE_MAX, 1.0))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Root font-size percentage, rounded to hundredths of a percent
    pub fn percent(self) -> f64 {
        (self.0 * 10_000.0).round() / 100.0
    }
}

impl Default for FontScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<f64> for FontScale {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<FontScale> for f64 {
    fn from(value: FontScale) -> Self {
        value.0
    }
}

/// Letter-spacing delta in em, always within [0, 0.5]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[serde(from = "f64", into = "f64")]
pub struct LetterSpacing(f64);

impl LetterSpacing {
    pub fn new(value: f64) -> Self {
        Self(clamp_or(value, LETTER_SPACING_MIN, LETTER_SPACING_MAX, 0.0))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for LetterSpacing {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<LetterSpacing> for f64 {
    fn from(value: LetterSpacing) -> Self {
        value.0
    }
}

/// Line-height multiplier, always within [1.0, 2.0]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, PartialOrd)]
#[serde(from = "f64", into = "f64")]
pub struct LineHeight(f64);

impl LineHeight {
    pub fn new(value: f64) -> Self {
        Self(clamp_or(value, LINE_HEIGHT_MIN, LINE_HEIGHT_MAX, 1.0))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for LineHeight {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<f64> for LineHeight {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<LineHeight> for f64 {
    fn from(value: LineHeight) -> Self {
        value.0
    }
}

/// Field-level fallback: a value of the wrong type becomes the field default
/// instead of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Complete set of accessibility settings at one point in time
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferenceSnapshot {
    #[serde(deserialize_with = "lenient")]
    pub theme: Theme,
    #[serde(deserialize_with = "lenient")]
    pub font_type: FontType,
    #[serde(deserialize_with = "lenient")]
    pub font_size: FontScale,
    #[serde(deserialize_with = "lenient")]
    pub letter_spacing: LetterSpacing,
    #[serde(deserialize_with = "lenient")]
    pub line_height: LineHeight,
    #[serde(deserialize_with = "lenient")]
    pub underline_links: bool,
    #[serde(deserialize_with = "lenient")]
    pub large_targets: bool,
    #[serde(deserialize_with = "lenient")]
    pub hover_speak: bool,
    /// Read by alert banners through the change notification, not by this crate
    #[serde(deserialize_with = "lenient")]
    pub visual_alerts: bool,
    #[serde(deserialize_with = "lenient")]
    pub pause_animations: bool,
    #[serde(deserialize_with = "lenient")]
    pub enhanced_focus: bool,
    #[serde(deserialize_with = "lenient")]
    pub auto_scroll: bool,
}

impl PreferenceSnapshot {
    /// Parse a stored record. Corrupt input yields the defaults.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("stored preferences unreadable, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Merge a partial change set, producing the next snapshot
    pub fn merged(&self, changes: &PreferenceUpdate) -> Self {
        let mut next = *self;
        if let Some(theme) = changes.theme {
            next.theme = theme;
        }
        if let Some(font_type) = changes.font_type {
            next.font_type = font_type;
        }
        if let Some(v) = changes.font_size {
            next.font_size = FontScale::new(v);
        }
        if let Some(v) = changes.letter_spacing {
            next.letter_spacing = LetterSpacing::new(v);
        }
        if let Some(v) = changes.line_height {
            next.line_height = LineHeight::new(v);
        }
        if let Some(v) = changes.underline_links {
            next.underline_links = v;
        }
        if let Some(v) = changes.large_targets {
            next.large_targets = v;
        }
        if let Some(v) = changes.hover_speak {
            next.hover_speak = v;
        }
        if let Some(v) = changes.visual_alerts {
            next.visual_alerts = v;
        }
        if let Some(v) = changes.pause_animations {
            next.pause_animations = v;
        }
        if let Some(v) = changes.enhanced_focus {
            next.enhanced_focus = v;
        }
        if let Some(v) = changes.auto_scroll {
            next.auto_scroll = v;
        }
        next
    }
}

/// Partial change set for `MenuController::update`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferenceUpdate {
    pub theme: Option<Theme>,
    pub font_type: Option<FontType>,
    pub font_size: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub line_height: Option<f64>,
    pub underline_links: Option<bool>,
    pub large_targets: Option<bool>,
    pub hover_speak: Option<bool>,
    pub visual_alerts: Option<bool>,
    pub pause_animations: Option<bool>,
    pub enhanced_focus: Option<bool>,
    pub auto_scroll: Option<bool>,
}

impl PreferenceUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a camelCase JSON object of changed fields
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn font_type(mut self, font_type: FontType) -> Self {
        self.font_type = Some(font_type);
        self
    }

    pub fn font_size(mut self, value: f64) -> Self {
        self.font_size = Some(value);
        self
    }

    pub fn letter_spacing(mut self, value: f64) -> Self {
        self.letter_spacing = Some(value);
        self
    }

    pub fn line_height(mut self, value: f64) -> Self {
        self.line_height = Some(value);
        self
    }

    pub fn underline_links(mut self, on: bool) -> Self {
        self.underline_links = Some(on);
        self
    }

    pub fn large_targets(mut self, on: bool) -> Self {
        self.large_targets = Some(on);
        self
    }

    pub fn hover_speak(mut self, on: bool) -> Self {
        self.hover_speak = Some(on);
        self
    }

    pub fn visual_alerts(mut self, on: bool) -> Self {
        self.visual_alerts = Some(on);
        self
    }

    pub fn pause_animations(mut self, on: bool) -> Self {
        self.pause_animations = Some(on);
        self
    }

    pub fn enhanced_focus(mut self, on: bool) -> Self {
        self.enhanced_focus = Some(on);
        self
    }

    pub fn auto_scroll(mut self, on: bool) -> Self {
        self.auto_scroll = Some(on);
        self
    }

    /// Apply one `key=value` pair using the stored (camelCase) field names
    pub fn set_field(mut self, key: &str, value: &str) -> Result<Self, String> {
        fn flag(key: &str, value: &str) -> Result<bool, String> {
            match value {
                "true" | "on" | "1" => Ok(true),
                "false" | "off" | "0" => Ok(false),
                _ => Err(format!("{}: expected a boolean, got '{}'", key, value)),
            }
        }
        fn number(key: &str, value: &str) -> Result<f64, String> {
            value
                .parse::<f64>()
                .map_err(|_| format!("{}: expected a number, got '{}'", key, value))
        }

        match key {
            "theme" => {
                self.theme =
                    Some(Theme::parse(value).ok_or_else(|| format!("unknown theme '{}'", value))?)
            }
            "fontType" => {
                self.font_type = Some(
                    FontType::parse(value).ok_or_else(|| format!("unknown font type '{}'", value))?,
                )
            }
            "fontSize" => self.font_size = Some(number(key, value)?),
            "letterSpacing" => self.letter_spacing = Some(number(key, value)?),
            "lineHeight" => self.line_height = Some(number(key, value)?),
            "underlineLinks" => self.underline_links = Some(flag(key, value)?),
            "largeTargets" => self.large_targets = Some(flag(key, value)?),
            "hoverSpeak" => self.hover_speak = Some(flag(key, value)?),
            "visualAlerts" => self.visual_alerts = Some(flag(key, value)?),
            "pauseAnimations" => self.pause_animations = Some(flag(key, value)?),
            "enhancedFocus" => self.enhanced_focus = Some(flag(key, value)?),
            "autoScroll" => self.auto_scroll = Some(flag(key, value)?),
            _ => return Err(format!("unknown preference '{}'", key)),
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let prefs = PreferenceSnapshot::default();
        assert_eq!(prefs.theme, Theme::Default);
        assert_eq!(prefs.font_type, FontType::Default);
        assert_eq!(prefs.font_size.get(), 1.0);
        assert_eq!(prefs.letter_spacing.get(), 0.0);
        assert_eq!(prefs.line_height.get(), 1.0);
        assert!(!prefs.hover_speak);
        assert!(!prefs.auto_scroll);
    }

    #[test]
    fn test_empty_object_loads_defaults() {
        assert_eq!(PreferenceSnapshot::from_json("{}"), PreferenceSnapshot::default());
    }

    #[test]
    fn test_corrupt_record_loads_defaults() {
        assert_eq!(
            PreferenceSnapshot::from_json("{not json"),
            PreferenceSnapshot::default()
        );
        assert_eq!(PreferenceSnapshot::from_json("[]"), PreferenceSnapshot::default());
    }

    #[test]
    fn test_backward_compat_missing_field() {
        // older record from the side-panel menu: only theme was stored
        let prefs = PreferenceSnapshot::from_json(r#"{"theme": "hc"}"#);
        assert_eq!(prefs.theme, Theme::Hc);
        assert_eq!(prefs.font_size.get(), 1.0);
        assert!(!prefs.auto_scroll);
    }

    #[test]
    fn test_bad_field_falls_back_alone() {
        let prefs = PreferenceSnapshot::from_json(
            r#"{"theme": "neon", "fontSize": "big", "hoverSpeak": true, "extra": 3}"#,
        );
        assert_eq!(prefs.theme, Theme::Default);
        assert_eq!(prefs.font_size.get(), 1.0);
        assert!(prefs.hover_speak);
    }

    #[test]
    fn test_stored_values_are_clamped() {
        let prefs = PreferenceSnapshot::from_json(
            r#"{"fontSize": 9.0, "letterSpacing": -1, "lineHeight": 0.2}"#,
        );
        assert_eq!(prefs.font_size.get(), FONT_SCALE_MAX);
        assert_eq!(prefs.letter_spacing.get(), 0.0);
        assert_eq!(prefs.line_height.get(), 1.0);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = PreferenceSnapshot::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "theme",
            "fontType",
            "fontSize",
            "letterSpacing",
            "lineHeight",
            "underlineLinks",
            "largeTargets",
            "hoverSpeak",
            "visualAlerts",
            "pauseAnimations",
            "enhancedFocus",
            "autoScroll",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 12);
        assert_eq!(obj["theme"], "default");
        assert_eq!(obj["fontSize"], 1.0);
    }

    #[test]
    fn test_font_scale_clamp() {
        assert_eq!(FontScale::new(0.5).get(), 0.75);
        assert_eq!(FontScale::new(10.0).get(), 2.0);
        assert_eq!(FontScale::new(-5.0).get(), 0.75);
        assert_eq!(FontScale::new(f64::NAN).get(), 1.0);
        assert_eq!(FontScale::new(1.1).percent(), 110.0);
    }

    #[test]
    fn test_merge_touches_only_named_fields() {
        let base = PreferenceSnapshot {
            theme: Theme::Sepia,
            underline_links: true,
            ..Default::default()
        };
        let next = base.merged(&PreferenceUpdate::new().font_size(1.2).auto_scroll(true));
        assert_eq!(next.theme, Theme::Sepia);
        assert!(next.underline_links);
        assert_eq!(next.font_size.get(), 1.2);
        assert!(next.auto_scroll);
    }

    #[test]
    fn test_update_from_json() {
        let update = PreferenceUpdate::from_json(r#"{"theme":"dark","fontSize":1.5}"#).unwrap();
        assert_eq!(update.theme, Some(Theme::Dark));
        assert_eq!(update.font_size, Some(1.5));
        assert_eq!(update.hover_speak, None);
    }

    #[test]
    fn test_set_field() {
        let update = PreferenceUpdate::new()
            .set_field("theme", "sepia")
            .and_then(|u| u.set_field("hoverSpeak", "on"))
            .unwrap();
        assert_eq!(update.theme, Some(Theme::Sepia));
        assert_eq!(update.hover_speak, Some(true));

        assert!(PreferenceUpdate::new().set_field("fontSize", "huge").is_err());
        assert!(PreferenceUpdate::new().set_field("colour", "red").is_err());
    }
}
