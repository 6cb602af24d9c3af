//! Preference-changed notification
//!
//! Other UI regions (alert banners keyed on `visual_alerts`, for one) react
//! to preference changes here without depending on the menu.

use crate::config::PreferenceSnapshot;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Page-level event carrying the snapshot as its detail (web host)
pub const PREFS_CHANGED_EVENT: &str = "a11y-prefs-changed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

pub type PreferenceListener = Rc<dyn Fn(&PreferenceSnapshot)>;

#[derive(Default)]
pub struct PreferenceBus {
    listeners: RefCell<Vec<(SubscriptionId, PreferenceListener)>>,
    next_id: Cell<u64>,
}

impl PreferenceBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&PreferenceSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver the full snapshot to every subscriber, in subscription order
    pub fn publish(&self, snapshot: &PreferenceSnapshot) {
        // listeners may (un)subscribe while being notified
        let listeners: Vec<PreferenceListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_unsubscribe() {
        let bus = PreferenceBus::new();
        let seen = Rc::new(Cell::new(0));
        let id = {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |prefs| {
                if prefs.visual_alerts {
                    seen.set(seen.get() + 1);
                }
            })
        };

        let alerts = PreferenceSnapshot {
            visual_alerts: true,
            ..Default::default()
        };
        bus.publish(&alerts);
        assert_eq!(seen.get(), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&alerts);
        assert_eq!(seen.get(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
