//! Menu strings (es / en)

use super::Language;
use crate::config::{FontType, Theme};

pub struct MenuLabels {
    pub open: &'static str,
    pub title: &'static str,
    pub close: &'static str,
    pub theme_legend: &'static str,
    pub theme_default: &'static str,
    pub theme_dark: &'static str,
    pub theme_hc: &'static str,
    pub theme_sepia: &'static str,
    pub underline: &'static str,
    pub targets: &'static str,
    pub hover_speak: &'static str,
    pub stop_voice: &'static str,
    pub spacing_legend: &'static str,
    pub letter: &'static str,
    pub line: &'static str,
    pub font_legend: &'static str,
    pub font_default: &'static str,
    pub font_dyslexic: &'static str,
    pub font_sans: &'static str,
    pub font_serif: &'static str,
    pub auditory: &'static str,
    pub auditory_text: &'static str,
    pub reset: &'static str,
    pub zoom: &'static str,
    pub zoom_in: &'static str,
    pub zoom_out: &'static str,
    pub visual_alerts: &'static str,
    pub pause_animations: &'static str,
    pub enhanced_focus: &'static str,
    pub auto_scroll: &'static str,
}

pub const ES: MenuLabels = MenuLabels {
    open: "Abrir menú de accesibilidad",
    title: "Accesibilidad",
    close: "Cerrar",
    theme_legend: "Apariencia",
    theme_default: "Claro",
    theme_dark: "Oscuro",
    theme_hc: "Alto Contraste",
    theme_sepia: "Sepia",
    underline: "Subrayar enlaces",
    targets: "Botones grandes",
    hover_speak: "Lectura al pasar cursor",
    stop_voice: "Detener voz",
    spacing_legend: "Legibilidad",
    letter: "Espaciado",
    line: "Interlineado",
    font_legend: "Tipografía",
    font_default: "Original",
    font_dyslexic: "Dislexia",
    font_sans: "Sans Serif",
    font_serif: "Serif",
    auditory: "Ayudas Auditivas",
    auditory_text: "Este sitio es compatible con lectores de pantalla. No hay reproducción automática.",
    reset: "Restablecer todo",
    zoom: "Tamaño de texto",
    zoom_in: "Aumentar",
    zoom_out: "Disminuir",
    visual_alerts: "Alertas visuales",
    pause_animations: "Pausar animaciones",
    enhanced_focus: "Foco visible mejorado",
    auto_scroll: "Auto-desplazamiento",
};

pub const EN: MenuLabels = MenuLabels {
    open: "Open accessibility menu",
    title: "Accessibility",
    close: "Close",
    theme_legend: "Appearance",
    theme_default: "Light",
    theme_dark: "Dark",
    theme_hc: "High Contrast",
    theme_sepia: "Sepia",
    underline: "Underline links",
    targets: "Large buttons",
    hover_speak: "Speak on hover",
    stop_voice: "Stop voice",
    spacing_legend: "Readability",
    letter: "Spacing",
    line: "Line height",
    font_legend: "Typography",
    font_default: "Default",
    font_dyslexic: "Dyslexia",
    font_sans: "Sans Serif",
    font_serif: "Serif",
    auditory: "Auditory Help",
    auditory_text: "This site supports screen readers. No auto-play media.",
    reset: "Reset all",
    zoom: "Text size",
    zoom_in: "Increase",
    zoom_out: "Decrease",
    visual_alerts: "Visual alerts",
    pause_animations: "Pause animations",
    enhanced_focus: "Enhanced focus",
    auto_scroll: "Auto-scroll",
};

pub fn labels(language: Language) -> &'static MenuLabels {
    match language {
        Language::Es => &ES,
        Language::En => &EN,
    }
}

impl MenuLabels {
    pub fn theme(&self, theme: Theme) -> &'static str {
        match theme {
            Theme::Default => self.theme_default,
            Theme::Dark => self.theme_dark,
            Theme::Hc => self.theme_hc,
            Theme::Sepia => self.theme_sepia,
        }
    }

    pub fn font(&self, font: FontType) -> &'static str {
        match font {
            FontType::Default => self.font_default,
            FontType::Dyslexic => self.font_dyslexic,
            FontType::Sans => self.font_sans,
            FontType::Serif => self.font_serif,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_by_language() {
        assert_eq!(labels(Language::Es).title, "Accesibilidad");
        assert_eq!(labels(Language::En).theme(Theme::Hc), "High Contrast");
        assert_eq!(labels(Language::Es).font(FontType::Dyslexic), "Dislexia");
    }
}
