//! Header bar that slides away while scrolling down and comes back on the
//! way up.

use super::direction::{Direction, DirectionTracker};
use crate::anim::{
    AnimationTimeline, Host, Playback, Property, Props, TargetId, TimelineHandle, TweenStep,
};
use crate::config::NavConfig;
use crate::lifecycle::{Lifecycle, Scope, Signal};
use crate::menu::NavMenu;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Visible state of the bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavState {
    /// Near the top of the page the bar has no background.
    pub transparent: bool,
    pub shown: bool,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            transparent: true,
            shown: false,
        }
    }
}

#[derive(Default)]
struct VisibilityState {
    tracker: DirectionTracker,
    nav: NavState,
    slide: Option<TimelineHandle>,
}

struct NavInner {
    host: Rc<dyn Host>,
    target: TargetId,
    scroll: Signal<f64>,
    config: NavConfig,
    menu: Option<NavMenu>,
    initial_scroll: Cell<f64>,
    state: RefCell<VisibilityState>,
}

/// Drives the header's vertical offset from the raw scroll offset.
#[derive(Clone)]
pub struct NavVisibility {
    inner: Rc<NavInner>,
}

impl NavVisibility {
    pub fn new(host: Rc<dyn Host>, target: TargetId, scroll: Signal<f64>, config: NavConfig) -> Self {
        Self::build(host, target, scroll, config, None)
    }

    /// Hiding the bar also closes `menu`.
    pub fn with_menu(
        host: Rc<dyn Host>,
        target: TargetId,
        scroll: Signal<f64>,
        config: NavConfig,
        menu: NavMenu,
    ) -> Self {
        Self::build(host, target, scroll, config, Some(menu))
    }

    fn build(
        host: Rc<dyn Host>,
        target: TargetId,
        scroll: Signal<f64>,
        config: NavConfig,
        menu: Option<NavMenu>,
    ) -> Self {
        Self {
            inner: Rc::new(NavInner {
                host,
                target,
                scroll,
                config,
                menu,
                initial_scroll: Cell::new(0.0),
                state: RefCell::new(VisibilityState::default()),
            }),
        }
    }

    /// Scroll offset the page is at when the bar mounts.
    pub fn starting_at(self, scroll: f64) -> Self {
        self.inner.initial_scroll.set(scroll);
        self
    }

    pub fn state(&self) -> NavState {
        self.inner.state.borrow().nav
    }

    pub fn on_scroll(&self, scroll: f64) -> NavState {
        self.inner.on_scroll(scroll)
    }
}

impl NavInner {
    fn on_scroll(&self, scroll: f64) -> NavState {
        if !self.host.is_attached(self.target) {
            return self.state.borrow().nav;
        }

        let (before, after) = {
            let mut state = self.state.borrow_mut();
            let before = state.nav;
            if scroll < self.config.reveal_threshold {
                state.tracker.reset(scroll);
                state.nav = NavState {
                    transparent: true,
                    shown: true,
                };
            } else {
                state.nav.transparent = false;
                match state.tracker.classify(scroll) {
                    Direction::Forward => state.nav.shown = false,
                    Direction::Reverse => state.nav.shown = true,
                    Direction::Still => {}
                }
            }
            (before, state.nav)
        };

        if before.shown != after.shown {
            tracing::trace!(shown = after.shown, scroll, "nav visibility changed");
            self.slide(after.shown);
            if !after.shown {
                if let Some(menu) = &self.menu {
                    menu.close_all();
                }
            }
        }
        after
    }

    fn slide(&self, shown: bool) {
        let y = if shown { 0.0 } else { self.config.hidden_offset };
        let mut step = TweenStep::new(
            vec![self.target],
            Props::new().with(Property::Y, y),
            self.config.slide_duration,
        );
        step.ease = self.config.slide_ease;
        let previous = self.state.borrow_mut().slide.take();
        if let Some(handle) = previous {
            self.host.cancel(handle);
        }
        let handle = self.host.play(
            AnimationTimeline::labeled("nav-slide").then(step),
            Playback::Once,
            None,
        );
        self.state.borrow_mut().slide = Some(handle);
    }

    fn teardown(&self) {
        let slide = self.state.borrow_mut().slide.take();
        if let Some(handle) = slide {
            self.host.cancel(handle);
        }
    }
}

impl Lifecycle for NavVisibility {
    fn activate(&self, scope: &mut Scope) {
        let inner = &self.inner;
        inner.host.set(
            &[inner.target],
            &Props::new().with(Property::Y, inner.config.hidden_offset),
        );
        {
            let mut state = inner.state.borrow_mut();
            state.nav = NavState::default();
            state.tracker.reset(inner.initial_scroll.get());
        }

        let weak = Rc::downgrade(inner);
        inner.scroll.subscribe_in(scope, move |scroll| {
            if let Some(inner) = weak.upgrade() {
                inner.on_scroll(*scroll);
            }
        });

        let owned = Rc::clone(inner);
        scope.register(move || owned.teardown());

        let initial = inner.initial_scroll.get();
        if initial < inner.config.reveal_threshold {
            inner.on_scroll(initial);
        } else {
            // Mid-page mount: show the bar until the first scroll says otherwise.
            let mut state = inner.state.borrow_mut();
            state.nav.transparent = false;
            state.nav.shown = true;
            drop(state);
            inner.slide(true);
        }
    }
}

impl fmt::Debug for NavVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavVisibility")
            .field("target", &self.inner.target)
            .field("state", &self.state())
            .finish()
    }
}
