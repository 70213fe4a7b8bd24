//! Process-wide light/dark flag and the overlay that masks its changes.

use super::scope::{Lifecycle, Scope};
use super::signal::{Signal, SubscriptionId};
use super::timers::{TimerId, TimerQueue};
use crate::anim::{
    AnimationTimeline, Host, Playback, Property, Props, TargetId, TimelineHandle, TweenStep,
};
use crate::config::ThemeConfig;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

/// Shared theme flag. Clones observe and write the same flag.
///
/// Writes are a single toggle or set on the UI thread; subscribers hear
/// about every actual change and nothing else.
#[derive(Clone, Debug)]
pub struct Theme {
    mode: Rc<Cell<ThemeMode>>,
    changes: Signal<ThemeMode>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

impl Theme {
    pub fn new(mode: ThemeMode) -> Self {
        Self {
            mode: Rc::new(Cell::new(mode)),
            changes: Signal::new(),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode.get()
    }

    /// Flip the flag and return the new mode.
    pub fn toggle(&self) -> ThemeMode {
        let next = self.mode().toggled();
        self.set(next);
        next
    }

    /// Returns `false` if `mode` was already current.
    pub fn set(&self, mode: ThemeMode) -> bool {
        if self.mode.replace(mode) == mode {
            return false;
        }
        tracing::debug!(%mode, "theme changed");
        self.changes.emit(&mode);
        true
    }

    /// Listen for changes while `scope` is mounted.
    pub fn on_change<F>(&self, scope: &mut Scope, handler: F) -> SubscriptionId
    where
        F: FnMut(&ThemeMode) + 'static,
    {
        self.changes.subscribe_in(scope, handler)
    }

    pub fn listener_count(&self) -> usize {
        self.changes.subscriber_count()
    }
}

const OVERLAY_ROLE: &str = "theme-overlay";
const OVERLAY_Z: f64 = 9999.0;

#[derive(Default)]
struct OverlayState {
    overlay: Option<TargetId>,
    fade: Option<TimelineHandle>,
    hold: Option<TimerId>,
}

struct OverlayInner {
    host: Rc<dyn Host>,
    timers: TimerQueue,
    theme: Theme,
    config: ThemeConfig,
    state: RefCell<OverlayState>,
}

/// Full-screen overlay faded in whenever the theme changes and faded out
/// once the change has held for a moment.
#[derive(Clone)]
pub struct ThemeOverlay {
    inner: Rc<OverlayInner>,
}

impl ThemeOverlay {
    pub fn new(host: Rc<dyn Host>, timers: TimerQueue, theme: Theme, config: ThemeConfig) -> Self {
        Self {
            inner: Rc::new(OverlayInner {
                host,
                timers,
                theme,
                config,
                state: RefCell::new(OverlayState::default()),
            }),
        }
    }

    pub fn overlay(&self) -> Option<TargetId> {
        self.inner.state.borrow().overlay
    }

    pub fn is_showing(&self) -> bool {
        self.overlay().is_some()
    }
}

impl OverlayInner {
    fn fade(&self, target: TargetId, opacity: f64) -> AnimationTimeline {
        let mut step = TweenStep::new(
            vec![target],
            Props::new().with(Property::Opacity, opacity),
            self.config.overlay_fade,
        );
        step.ease = self.config.overlay_ease;
        AnimationTimeline::labeled("theme-overlay").then(step)
    }

    fn theme_changed(self: &Rc<Self>) {
        let (previous_fade, previous_hold, existing) = {
            let mut state = self.state.borrow_mut();
            (state.fade.take(), state.hold.take(), state.overlay)
        };
        if let Some(handle) = previous_fade {
            self.host.cancel(handle);
        }
        if let Some(id) = previous_hold {
            self.timers.cancel(id);
        }

        let target = match existing {
            Some(target) => target,
            None => {
                let target = self.host.spawn(OVERLAY_ROLE);
                self.host.set(
                    &[target],
                    &Props::new()
                        .with(Property::Opacity, 0.0)
                        .with(Property::ZIndex, OVERLAY_Z),
                );
                target
            }
        };

        let fade_in = self.host.play(self.fade(target, 1.0), Playback::Once, None);
        let weak = Rc::downgrade(self);
        let hold = self.timers.schedule(self.config.overlay_hold, move || {
            if let Some(inner) = weak.upgrade() {
                inner.fade_out();
            }
        });

        let mut state = self.state.borrow_mut();
        state.overlay = Some(target);
        state.fade = Some(fade_in);
        state.hold = Some(hold);
    }

    fn fade_out(self: &Rc<Self>) {
        let (target, previous) = {
            let mut state = self.state.borrow_mut();
            state.hold = None;
            (state.overlay, state.fade.take())
        };
        let Some(target) = target else {
            return;
        };
        if let Some(handle) = previous {
            self.host.cancel(handle);
        }

        let weak: Weak<Self> = Rc::downgrade(self);
        let handle = self.host.play(
            self.fade(target, 0.0),
            Playback::Once,
            Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.finish(target);
                }
            })),
        );
        self.state.borrow_mut().fade = Some(handle);
    }

    fn finish(&self, target: TargetId) {
        let mut state = self.state.borrow_mut();
        if state.overlay != Some(target) {
            return;
        }
        state.overlay = None;
        state.fade = None;
        drop(state);
        self.host.remove(target);
    }

    fn teardown(&self) {
        let state = std::mem::take(&mut *self.state.borrow_mut());
        if let Some(handle) = state.fade {
            self.host.cancel(handle);
        }
        if let Some(id) = state.hold {
            self.timers.cancel(id);
        }
        if let Some(target) = state.overlay {
            self.host.remove(target);
        }
    }
}

impl Lifecycle for ThemeOverlay {
    fn activate(&self, scope: &mut Scope) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.theme.on_change(scope, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.theme_changed();
            }
        });

        let inner = Rc::clone(&self.inner);
        scope.register(move || inner.teardown());
    }
}

impl fmt::Debug for ThemeOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeOverlay")
            .field("overlay", &self.overlay())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{HeadlessEngine, Stage};

    #[test]
    fn toggle_flips_and_notifies_once() {
        let theme = Theme::new(ThemeMode::Light);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut scope = Scope::new("listener");
        struct Nothing;
        impl Lifecycle for Nothing {
            fn activate(&self, _: &mut Scope) {}
        }
        scope.mount(&Nothing);
        let log = Rc::clone(&seen);
        theme.on_change(&mut scope, move |m| log.borrow_mut().push(*m));

        assert_eq!(theme.toggle(), ThemeMode::Dark);
        assert!(!theme.set(ThemeMode::Dark));
        assert_eq!(*seen.borrow(), vec![ThemeMode::Dark]);

        scope.unmount();
        assert_eq!(theme.listener_count(), 0);
    }

    fn overlay_fixture() -> (Rc<HeadlessEngine>, TimerQueue, Theme, ThemeOverlay) {
        let engine = Rc::new(HeadlessEngine::new());
        let timers = TimerQueue::new();
        let theme = Theme::default();
        let overlay = ThemeOverlay::new(
            engine.clone(),
            timers.clone(),
            theme.clone(),
            ThemeConfig::default(),
        );
        (engine, timers, theme, overlay)
    }

    #[test]
    fn overlay_only_appears_on_change() {
        let (engine, _timers, theme, overlay) = overlay_fixture();
        let mut scope = Scope::new("theme");
        scope.mount(&overlay);
        assert!(!overlay.is_showing());

        theme.toggle();
        let target = overlay.overlay().unwrap();
        assert_eq!(engine.number(target, Property::ZIndex), Some(OVERLAY_Z));
        engine.settle(2.0);
        assert_eq!(engine.number(target, Property::Opacity), Some(1.0));
    }

    #[test]
    fn overlay_fades_out_after_hold_and_is_removed_once() {
        let (engine, timers, theme, overlay) = overlay_fixture();
        let mut scope = Scope::new("theme");
        scope.mount(&overlay);

        theme.toggle();
        let target = overlay.overlay().unwrap();
        timers.advance(0.2);
        engine.settle(2.0);

        assert!(!overlay.is_showing());
        assert_eq!(engine.removals_of(target), 1);
        assert!(!engine.is_attached(target));

        scope.unmount();
        assert_eq!(engine.removals_of(target), 1);
        assert_eq!(engine.detached_writes(), 0);
    }

    #[test]
    fn rapid_changes_restart_the_hold() {
        let (_engine, timers, theme, overlay) = overlay_fixture();
        let mut scope = Scope::new("theme");
        scope.mount(&overlay);

        theme.toggle();
        timers.advance(0.15);
        theme.toggle();
        assert_eq!(timers.pending_count(), 1);
        timers.advance(0.15);
        assert_eq!(timers.pending_count(), 1);
    }

    #[test]
    fn unmount_mid_fade_cleans_up() {
        let (engine, timers, theme, overlay) = overlay_fixture();
        let mut scope = Scope::new("theme");
        scope.mount(&overlay);

        theme.toggle();
        let target = overlay.overlay().unwrap();
        engine.advance(0.1);
        scope.unmount();

        assert_eq!(timers.pending_count(), 0);
        assert_eq!(engine.active_timelines(), 0);
        assert_eq!(engine.removals_of(target), 1);
        engine.advance(1.0);
        assert_eq!(engine.detached_writes(), 0);
    }
}
