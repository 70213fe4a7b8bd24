//! Process-wide frame ticker.
//!
//! The ticker is shared by every animated component. The first subscriber
//! installs the host's frame hook through a [`FrameSource`]; the last one to
//! leave removes it again. The host calls [`Ticker::pump`] from that hook.

use super::scope::Scope;
use super::signal::{Signal, SubscriptionId};
use super::timers::TimerQueue;
use crate::anim::Ease;
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

/// One delivered frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Host time in seconds.
    pub time: f64,
    /// Seconds since the previous frame, zero for the first.
    pub delta: f64,
}

/// The host's global frame hook.
pub trait FrameSource {
    fn install(&self);
    fn uninstall(&self);
}

/// Smooth-scroll collaborator pumped once per frame.
pub trait SmoothScroll {
    /// Advance the scroll physics to `time_ms`.
    fn raf(&self, time_ms: f64);

    fn scroll_to(&self, position: f64, duration: f64, ease: Ease);
}

struct Shared {
    frames: Signal<Frame>,
    source: Box<dyn FrameSource>,
    installed: Cell<bool>,
    last: Cell<Option<f64>>,
    timers: TimerQueue,
}

impl Shared {
    fn release(&self, id: SubscriptionId) {
        if self.frames.unsubscribe(id) && self.frames.subscriber_count() == 0 {
            self.installed.set(false);
            self.last.set(None);
            tracing::debug!("last ticker subscriber left; removing frame hook");
            self.source.uninstall();
        }
    }
}

/// Shared frame ticker. Clones refer to the same ticker.
#[derive(Clone)]
pub struct Ticker {
    shared: Rc<Shared>,
}

impl Ticker {
    pub fn new(source: impl FrameSource + 'static) -> Self {
        Self {
            shared: Rc::new(Shared {
                frames: Signal::new(),
                source: Box::new(source),
                installed: Cell::new(false),
                last: Cell::new(None),
                timers: TimerQueue::new(),
            }),
        }
    }

    /// Timers advanced by this ticker's frames.
    pub fn timers(&self) -> &TimerQueue {
        &self.shared.timers
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Frame) + 'static,
    {
        let id = self.shared.frames.subscribe(callback);
        if !self.shared.installed.replace(true) {
            tracing::debug!("first ticker subscriber; installing frame hook");
            self.shared.source.install();
        }
        id
    }

    /// Subscribe for the lifetime of `scope`.
    pub fn subscribe_in<F>(&self, scope: &mut Scope, callback: F) -> SubscriptionId
    where
        F: FnMut(&Frame) + 'static,
    {
        let id = self.subscribe(callback);
        let shared: Weak<Shared> = Rc::downgrade(&self.shared);
        scope.register(move || {
            if let Some(shared) = shared.upgrade() {
                shared.release(id);
            }
        });
        id
    }

    /// Subscribe a callback that only wants the frame delta.
    pub fn subscribe_delta<F>(&self, scope: &mut Scope, mut callback: F) -> SubscriptionId
    where
        F: FnMut(f64) + 'static,
    {
        self.subscribe_in(scope, move |frame| callback(frame.delta))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.shared.release(id);
    }

    /// Drive `scroll` from this ticker while `scope` is mounted.
    pub fn attach_smooth_scroll(
        &self,
        scope: &mut Scope,
        scroll: Rc<dyn SmoothScroll>,
    ) -> SubscriptionId {
        self.subscribe_in(scope, move |frame| scroll.raf(frame.time * 1000.0))
    }

    /// Deliver one frame at host time `time` seconds, then fire timers that
    /// came due.
    pub fn pump(&self, time: f64) {
        let delta = match self.shared.last.replace(Some(time)) {
            Some(last) => (time - last).max(0.0),
            None => 0.0,
        };
        self.shared.frames.emit(&Frame { time, delta });
        self.shared.timers.advance(delta);
    }

    pub fn is_installed(&self) -> bool {
        self.shared.installed.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.frames.subscriber_count()
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("installed", &self.shared.installed.get())
            .field("subscribers", &self.shared.frames.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Lifecycle;
    use std::cell::RefCell;

    #[derive(Clone, Default)]
    struct Hook {
        installs: Rc<Cell<usize>>,
        uninstalls: Rc<Cell<usize>>,
    }

    impl FrameSource for Hook {
        fn install(&self) {
            self.installs.set(self.installs.get() + 1);
        }

        fn uninstall(&self) {
            self.uninstalls.set(self.uninstalls.get() + 1);
        }
    }

    struct Idle;

    impl Lifecycle for Idle {
        fn activate(&self, _: &mut Scope) {}
    }

    fn mounted(label: &str) -> Scope {
        let mut scope = Scope::new(label);
        scope.mount(&Idle);
        scope
    }

    #[test]
    fn hook_follows_first_and_last_subscriber() {
        let hook = Hook::default();
        let ticker = Ticker::new(hook.clone());
        let mut a = mounted("a");
        let mut b = mounted("b");

        ticker.subscribe_in(&mut a, |_| {});
        ticker.subscribe_in(&mut b, |_| {});
        assert_eq!(hook.installs.get(), 1);

        a.unmount();
        assert_eq!(hook.uninstalls.get(), 0);
        assert!(ticker.is_installed());

        b.unmount();
        assert_eq!(hook.uninstalls.get(), 1);
        assert!(!ticker.is_installed());
    }

    #[test]
    fn pump_reports_deltas() {
        let ticker = Ticker::new(Hook::default());
        let mut scope = mounted("deltas");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        ticker.subscribe_delta(&mut scope, move |dt| log.borrow_mut().push(dt));

        ticker.pump(1.0);
        ticker.pump(1.5);
        assert_eq!(*seen.borrow(), vec![0.0, 0.5]);
    }

    #[test]
    fn pump_advances_timers() {
        let ticker = Ticker::new(Hook::default());
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        ticker.timers().schedule(0.1, move || flag.set(true));

        ticker.pump(0.0);
        assert!(!fired.get());
        ticker.pump(0.2);
        assert!(fired.get());
    }

    struct Lenis {
        frames: RefCell<Vec<f64>>,
    }

    impl SmoothScroll for Lenis {
        fn raf(&self, time_ms: f64) {
            self.frames.borrow_mut().push(time_ms);
        }

        fn scroll_to(&self, _: f64, _: f64, _: Ease) {}
    }

    #[test]
    fn smooth_scroll_pumped_in_milliseconds() {
        let ticker = Ticker::new(Hook::default());
        let lenis = Rc::new(Lenis {
            frames: RefCell::new(Vec::new()),
        });
        let mut scope = mounted("layout");
        ticker.attach_smooth_scroll(&mut scope, lenis.clone());

        ticker.pump(0.25);
        scope.unmount();
        ticker.pump(0.5);
        assert_eq!(*lenis.frames.borrow(), vec![250.0]);
        assert_eq!(ticker.subscriber_count(), 0);
    }
}
