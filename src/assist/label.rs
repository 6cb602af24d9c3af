//! Accessible label resolution
//!
//! Precedence: `aria-label` → `aria-labelledby` → image `alt` → associated
//! form `<label>` → the element's own text.

use crate::platform::{AccessibleElement, AccessibleTree};

/// Default upper bound on a spoken label, in characters
pub const MAX_LABEL_CHARS: usize = 120;

const INTERACTIVE_TAGS: &[&str] = &[
    "button", "a", "input", "select", "textarea", "summary", "option",
];

const TEXT_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "li", "label", "td", "th", "legend",
    "figcaption", "img",
];

const WIDGET_ROLES: &[&str] = &[
    "button", "link", "checkbox", "radio", "switch", "menuitem", "tab", "option",
];

/// Elements a `<label>` can be associated with
const LABELABLE_TAGS: &[&str] = &[
    "input", "select", "textarea", "button", "meter", "output", "progress",
];

/// Collapse runs of whitespace and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters (not bytes)
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| normalize_whitespace(&t)).filter(|t| !t.is_empty())
}

/// Whether hovering this element should be narrated.
/// Large containers (div, section, main...) are skipped unless explicitly labelled.
pub fn is_narratable(element: &dyn AccessibleElement) -> bool {
    let tag = element.tag_name();
    if INTERACTIVE_TAGS.contains(&tag.as_str()) || TEXT_TAGS.contains(&tag.as_str()) {
        return true;
    }
    if let Some(role) = element.attribute("role") {
        if WIDGET_ROLES.contains(&role.trim()) {
            return true;
        }
    }
    non_empty(element.attribute("aria-label")).is_some()
}

fn labelled_by(element: &dyn AccessibleElement, tree: &dyn AccessibleTree) -> Option<String> {
    let ids = element.attribute("aria-labelledby")?;
    let parts: Vec<String> = ids
        .split_whitespace()
        .filter_map(|id| tree.element_by_id(id))
        .filter_map(|el| non_empty(el.rendered_text()))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn form_label(element: &dyn AccessibleElement, tree: &dyn AccessibleTree) -> Option<String> {
    if !LABELABLE_TAGS.contains(&element.tag_name().as_str()) {
        return None;
    }
    let by_for = element
        .attribute("id")
        .filter(|id| !id.is_empty())
        .and_then(|id| tree.label_for(&id))
        .and_then(|label| non_empty(label.rendered_text()));
    by_for.or_else(|| {
        element
            .enclosing_label()
            .and_then(|label| non_empty(label.rendered_text()))
    })
}

/// Speakable label for `element`, `None` when nothing usable is found
pub fn resolve_label(
    element: &dyn AccessibleElement,
    tree: &dyn AccessibleTree,
    max_chars: usize,
) -> Option<String> {
    let label = non_empty(element.attribute("aria-label"))
        .or_else(|| labelled_by(element, tree))
        .or_else(|| non_empty(element.attribute("alt")))
        .or_else(|| form_label(element, tree))
        .or_else(|| non_empty(element.rendered_text()))?;
    Some(truncate_chars(&label, max_chars))
}
