//! Assistive behaviours driven by the preference flags

pub mod label;
pub mod narrator;
pub mod scroller;

pub use label::resolve_label;
pub use narrator::{HoverNarrator, NarrationSession, NarratorConfig, NarratorState};
pub use scroller::{
    scroll_velocity, ProximityAutoScroller, ScrollSession, ScrollerConfig, ScrollerState,
};
