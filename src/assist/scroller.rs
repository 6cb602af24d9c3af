//! Pointer-proximity auto-scroll
//!
//! Idle ⇄ Active. While active a frame loop runs unconditionally and scrolls
//! by the velocity derived from the last pointer position. The loop and the
//! pointer listener belong to a `ScrollSession`; dropping it cancels both.

use crate::platform::{
    FrameHandle, FrameScheduler, ListenerId, PointerEvents, PointerMove, Viewport,
};
use std::cell::Cell;
use std::rc::Rc;

/// Hot zone height at each viewport edge (px)
pub const DEFAULT_ZONE_HEIGHT: f64 = 150.0;
/// Hard ceiling on scroll speed (px per frame)
pub const MAX_SCROLL_SPEED: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollerConfig {
    zone_height: f64,
    max_speed: f64,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            zone_height: DEFAULT_ZONE_HEIGHT,
            max_speed: MAX_SCROLL_SPEED,
        }
    }
}

impl ScrollerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-positive or non-finite heights keep the default zone
    pub fn with_zone_height(mut self, px: f64) -> Self {
        if px.is_finite() && px > 0.0 {
            self.zone_height = px;
        }
        self
    }

    /// Clamped to [0, MAX_SCROLL_SPEED]
    pub fn with_max_speed(mut self, px_per_frame: f64) -> Self {
        self.max_speed = if px_per_frame.is_nan() {
            MAX_SCROLL_SPEED
        } else {
            px_per_frame.clamp(0.0, MAX_SCROLL_SPEED)
        };
        self
    }

    pub fn zone_height(&self) -> f64 {
        self.zone_height
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }
}

/// Scroll velocity for a pointer at `client_y` in a viewport of `viewport_height`.
/// Negative scrolls up. Zero outside both hot zones.
pub fn scroll_velocity(client_y: f64, viewport_height: f64, config: &ScrollerConfig) -> f64 {
    let zone = config.zone_height;
    let max = config.max_speed;
    let velocity = if client_y < zone {
        -max * (zone - client_y) / zone
    } else if client_y > viewport_height - zone {
        max * (client_y - (viewport_height - zone)) / zone
    } else {
        0.0
    };
    velocity.clamp(-max, max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollerState {
    Idle,
    Active,
}

/// Frame loop shared between the session and its scheduled callback
struct ScrollLoop {
    frames: Rc<dyn FrameScheduler>,
    viewport: Rc<dyn Viewport>,
    velocity: Cell<f64>,
    pending: Cell<Option<FrameHandle>>,
    active: Cell<bool>,
}

impl ScrollLoop {
    fn schedule(this: &Rc<Self>) {
        let next = Rc::clone(this);
        let handle = this
            .frames
            .request_frame(Box::new(move |_frame_ms: f64| ScrollLoop::tick(&next)));
        this.pending.set(Some(handle));
    }

    fn tick(this: &Rc<Self>) {
        this.pending.set(None);
        if !this.active.get() {
            return;
        }
        let velocity = this.velocity.get();
        if velocity != 0.0 {
            this.viewport.scroll_by(velocity);
        }
        Self::schedule(this);
    }

    fn halt(&self) {
        self.active.set(false);
        self.velocity.set(0.0);
        if let Some(handle) = self.pending.take() {
            self.frames.cancel_frame(handle);
        }
    }
}

/// Running pointer listener + frame loop. Dropping it releases both.
pub struct ScrollSession {
    pointer: Rc<dyn PointerEvents>,
    listener: ListenerId,
    scroll_loop: Rc<ScrollLoop>,
}

impl ScrollSession {
    pub fn velocity(&self) -> f64 {
        self.scroll_loop.velocity.get()
    }
}

impl Drop for ScrollSession {
    fn drop(&mut self) {
        self.pointer.remove_listener(self.listener);
        self.scroll_loop.halt();
    }
}

pub struct ProximityAutoScroller {
    config: ScrollerConfig,
    pointer: Rc<dyn PointerEvents>,
    frames: Rc<dyn FrameScheduler>,
    viewport: Rc<dyn Viewport>,
    session: Option<ScrollSession>,
}

impl ProximityAutoScroller {
    pub fn new(
        config: ScrollerConfig,
        pointer: Rc<dyn PointerEvents>,
        frames: Rc<dyn FrameScheduler>,
        viewport: Rc<dyn Viewport>,
    ) -> Self {
        Self {
            config,
            pointer,
            frames,
            viewport,
            session: None,
        }
    }

    pub fn state(&self) -> ScrollerState {
        if self.session.is_some() {
            ScrollerState::Active
        } else {
            ScrollerState::Idle
        }
    }

    /// Current velocity, zero while idle
    pub fn velocity(&self) -> f64 {
        self.session.as_ref().map_or(0.0, ScrollSession::velocity)
    }

    /// Idle → Active. Idempotent.
    pub fn start(&mut self) {
        if self.session.is_some() {
            return;
        }
        let scroll_loop = Rc::new(ScrollLoop {
            frames: Rc::clone(&self.frames),
            viewport: Rc::clone(&self.viewport),
            velocity: Cell::new(0.0),
            pending: Cell::new(None),
            active: Cell::new(true),
        });

        let config = self.config;
        let tracked = Rc::clone(&scroll_loop);
        let listener = self
            .pointer
            .add_move_listener(Box::new(move |event: PointerMove| {
                let height = tracked.viewport.height();
                tracked
                    .velocity
                    .set(scroll_velocity(event.client_y, height, &config));
            }));
        ScrollLoop::schedule(&scroll_loop);

        self.session = Some(ScrollSession {
            pointer: Rc::clone(&self.pointer),
            listener,
            scroll_loop,
        });
        log::info!("auto-scroll: active");
    }

    /// Active → Idle. Removes the listener and cancels the scheduled frame.
    pub fn stop(&mut self) {
        if self.session.take().is_some() {
            log::info!("auto-scroll: idle");
        }
    }
}

impl Drop for ProximityAutoScroller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessHost;

    fn scroller(host: &HeadlessHost) -> ProximityAutoScroller {
        let caps = host.capabilities();
        ProximityAutoScroller::new(ScrollerConfig::default(), caps.pointer, caps.frames, caps.viewport)
    }

    #[test]
    fn test_velocity_zones() {
        let cfg = ScrollerConfig::default();
        let top = scroll_velocity(10.0, 800.0, &cfg);
        assert!((top - (-10.0 * 140.0 / 150.0)).abs() < 1e-9);
        assert_eq!(scroll_velocity(400.0, 800.0, &cfg), 0.0);
        assert_eq!(scroll_velocity(150.0, 800.0, &cfg), 0.0);
        assert!((scroll_velocity(725.0, 800.0, &cfg) - 5.0).abs() < 1e-9);
        assert_eq!(scroll_velocity(0.0, 800.0, &cfg), -10.0);
        assert_eq!(scroll_velocity(800.0, 800.0, &cfg), 10.0);
    }

    #[test]
    fn test_velocity_is_bounded() {
        let cfg = ScrollerConfig::default();
        assert_eq!(scroll_velocity(-300.0, 800.0, &cfg), -MAX_SCROLL_SPEED);
        assert_eq!(scroll_velocity(5000.0, 800.0, &cfg), MAX_SCROLL_SPEED);
        assert_eq!(ScrollerConfig::new().with_max_speed(50.0).max_speed(), MAX_SCROLL_SPEED);
        assert_eq!(ScrollerConfig::new().with_max_speed(-1.0).max_speed(), 0.0);
    }

    #[test]
    fn test_unusable_zone_heights_keep_default() {
        for px in [f64::INFINITY, f64::NAN, 0.0, -20.0] {
            let cfg = ScrollerConfig::new().with_zone_height(px);
            assert_eq!(cfg.zone_height(), DEFAULT_ZONE_HEIGHT);
            let v = scroll_velocity(790.0, 800.0, &cfg);
            assert!(v.is_finite());
        }
        assert_eq!(ScrollerConfig::new().with_zone_height(80.0).zone_height(), 80.0);
    }

    #[test]
    fn test_loop_scrolls_every_frame() {
        let host = HeadlessHost::new(800.0);
        host.viewport.set_scroll_y(500.0);
        let mut scroller = scroller(&host);
        scroller.start();
        assert_eq!(host.frames.scheduled_count(), 1);

        // loop keeps running with zero velocity
        host.frames.run_frame();
        assert_eq!(host.viewport.scroll_y(), 500.0);
        assert_eq!(host.frames.scheduled_count(), 1);

        host.pointer.move_to(0.0);
        host.frames.run_frame();
        host.frames.run_frame();
        assert_eq!(host.viewport.scroll_y(), 480.0);

        host.pointer.move_to(400.0);
        host.frames.run_frame();
        assert_eq!(host.viewport.scroll_y(), 480.0);
    }

    #[test]
    fn test_stop_cancels_frame_and_listener() {
        let host = HeadlessHost::new(800.0);
        let mut scroller = scroller(&host);
        scroller.start();
        scroller.start();
        assert_eq!(host.pointer.listener_count(), 1);
        assert_eq!(host.frames.scheduled_count(), 1);

        host.pointer.move_to(790.0);
        scroller.stop();
        assert_eq!(scroller.state(), ScrollerState::Idle);
        assert_eq!(scroller.velocity(), 0.0);
        assert_eq!(host.frames.scheduled_count(), 0);
        assert_eq!(host.pointer.listener_count(), 0);
        assert_eq!(host.frames.run_frame(), 0);
        assert_eq!(host.viewport.scroll_y(), 0.0);
    }

    #[test]
    fn test_drop_releases_session() {
        let host = HeadlessHost::new(800.0);
        {
            let mut scroller = scroller(&host);
            scroller.start();
        }
        assert_eq!(host.frames.scheduled_count(), 0);
        assert_eq!(host.pointer.listener_count(), 0);
    }
}
