//! Preference engine core: snapshot reflection, change notification and
//! the menu controller that ties them to the assistive behaviours.

pub mod controller;
pub mod notify;
pub mod reflector;

pub use controller::{MenuController, MenuOptions};
pub use notify::{PreferenceBus, SubscriptionId};
pub use reflector::DomReflector;
