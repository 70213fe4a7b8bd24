//! Per-character colour reveal driven by scroll.
//!
//! Scrolling forward paints characters up to and including the progress
//! index with the accent colour; each painted character settles to its
//! final colour a moment later. Scrolling back resets every character at or
//! past the progress index, cancelling its pending settle.
//!
//! Every character carries an epoch bumped on reset. Settle timers and
//! settle tweens remember the epoch they were scheduled under, so a
//! completion that arrives after its character was reset is dropped.

use super::binding::{ScrollBinding, ScrollUpdate, UpdateOutcome};
use super::region::{ElementBox, TriggerParseError};
use crate::anim::{
    AnimationTimeline, Ease, Host, Playback, Property, Props, Rgba, TargetId, TimelineHandle,
    TweenStep,
};
use crate::config::TextRevealConfig;
use crate::lifecycle::{Lifecycle, Scope, Signal, TimerId, TimerQueue};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Colour a character currently shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharShade {
    Initial,
    Accent,
    Settling,
    Settled,
}

struct Char {
    target: TargetId,
    shade: CharShade,
    epoch: u64,
    timer: Option<TimerId>,
    tween: Option<TimelineHandle>,
}

#[derive(Default)]
struct RevealState {
    container: Option<TargetId>,
    chars: Vec<Char>,
}

struct RevealInner {
    host: Rc<dyn Host>,
    timers: TimerQueue,
    scroll: Signal<f64>,
    text: String,
    layout: ElementBox,
    viewport_height: f64,
    initial_scroll: Cell<f64>,
    config: TextRevealConfig,
    binding: RefCell<Option<ScrollBinding>>,
    state: RefCell<RevealState>,
}

/// Scroll-driven colour reveal over the characters of a text block.
#[derive(Clone)]
pub struct TextReveal {
    inner: Rc<RevealInner>,
}

impl TextReveal {
    /// Fails if the configured region cannot be parsed.
    pub fn new(
        host: Rc<dyn Host>,
        timers: TimerQueue,
        scroll: Signal<f64>,
        text: impl Into<String>,
        layout: ElementBox,
        viewport_height: f64,
        config: TextRevealConfig,
    ) -> Result<Self, TriggerParseError> {
        config.region()?;
        Ok(Self {
            inner: Rc::new(RevealInner {
                host,
                timers,
                scroll,
                text: text.into(),
                layout,
                viewport_height,
                initial_scroll: Cell::new(0.0),
                config,
                binding: RefCell::new(None),
                state: RefCell::new(RevealState::default()),
            }),
        })
    }

    /// Scroll offset to read on mount.
    pub fn starting_at(self, scroll: f64) -> Self {
        self.inner.initial_scroll.set(scroll);
        self
    }

    pub fn chars(&self) -> Vec<TargetId> {
        self.inner.state.borrow().chars.iter().map(|c| c.target).collect()
    }

    pub fn shades(&self) -> Vec<CharShade> {
        self.inner.state.borrow().chars.iter().map(|c| c.shade).collect()
    }

    pub fn pending_settles(&self) -> usize {
        self.inner
            .state
            .borrow()
            .chars
            .iter()
            .filter(|c| c.timer.is_some())
            .count()
    }

    /// Feed normalized progress directly, bypassing the scroll signal.
    pub fn update(&self, progress: f64) -> UpdateOutcome {
        self.inner.update(progress)
    }
}

impl RevealInner {
    fn update(&self, progress: f64) -> UpdateOutcome {
        let mut binding = self.binding.borrow_mut();
        match binding.as_mut() {
            Some(binding) => binding.update(progress),
            None => UpdateOutcome::Inactive,
        }
    }

    fn scroll_to(&self, scroll: f64) -> UpdateOutcome {
        let mut binding = self.binding.borrow_mut();
        match binding.as_mut() {
            Some(binding) => binding.scroll_to(scroll),
            None => UpdateOutcome::Inactive,
        }
    }

    fn paint(&self, target: TargetId, colour: Rgba) {
        self.host
            .set(&[target], &Props::new().with(Property::Color, colour));
    }

    fn apply(self: &Rc<Self>, update: &ScrollUpdate) {
        let total = self.state.borrow().chars.len();
        let reached = (update.progress * total as f64).floor() as usize;
        let reverse = update.direction.is_reverse();

        for index in 0..total {
            if reverse && index >= reached {
                self.reset(index);
                continue;
            }
            let (target, shade, has_timer) = {
                let state = self.state.borrow();
                let c = &state.chars[index];
                (c.target, c.shade, c.timer.is_some())
            };
            if matches!(shade, CharShade::Settling | CharShade::Settled) {
                continue;
            }
            if index <= reached {
                if shade != CharShade::Accent {
                    self.paint(target, self.config.accent);
                    self.state.borrow_mut().chars[index].shade = CharShade::Accent;
                }
                if !has_timer {
                    self.schedule_settle(index);
                }
            } else if shade != CharShade::Initial {
                self.paint(target, self.config.initial);
                self.state.borrow_mut().chars[index].shade = CharShade::Initial;
            }
        }
    }

    fn reset(&self, index: usize) {
        let (target, timer, tween, repaint) = {
            let mut state = self.state.borrow_mut();
            let c = &mut state.chars[index];
            c.epoch += 1;
            let repaint = c.shade != CharShade::Initial;
            c.shade = CharShade::Initial;
            (c.target, c.timer.take(), c.tween.take(), repaint)
        };
        if let Some(id) = timer {
            self.timers.cancel(id);
        }
        if let Some(handle) = tween {
            self.host.cancel(handle);
        }
        if repaint {
            self.paint(target, self.config.initial);
        }
    }

    fn schedule_settle(self: &Rc<Self>, index: usize) {
        let epoch = self.state.borrow().chars[index].epoch;
        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.timers.schedule(self.config.settle_delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.settle(index, epoch);
            }
        });
        self.state.borrow_mut().chars[index].timer = Some(id);
    }

    fn settle(self: &Rc<Self>, index: usize, epoch: u64) {
        let target = {
            let mut state = self.state.borrow_mut();
            let Some(c) = state.chars.get_mut(index) else {
                return;
            };
            if c.epoch != epoch {
                tracing::trace!(index, "stale settle timer dropped");
                return;
            }
            c.timer = None;
            if c.shade != CharShade::Accent {
                return;
            }
            c.shade = CharShade::Settling;
            c.target
        };

        let mut step = TweenStep::new(
            vec![target],
            Props::new().with(Property::Color, self.config.settled),
            self.config.settle_duration,
        );
        step.ease = Ease::None;
        let weak: Weak<Self> = Rc::downgrade(self);
        let handle = self.host.play(
            AnimationTimeline::labeled("char-settle").then(step),
            Playback::Once,
            Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.settled(index, epoch);
                }
            })),
        );

        let mut state = self.state.borrow_mut();
        let c = &mut state.chars[index];
        if c.epoch == epoch {
            c.tween = Some(handle);
        }
    }

    fn settled(&self, index: usize, epoch: u64) {
        let mut state = self.state.borrow_mut();
        if let Some(c) = state.chars.get_mut(index) {
            if c.epoch == epoch {
                c.shade = CharShade::Settled;
                c.tween = None;
            }
        }
    }

    fn build(self: &Rc<Self>) {
        let container = self.host.spawn("text");
        let chars: Vec<Char> = self
            .text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|_| Char {
                target: self.host.spawn("char"),
                shade: CharShade::Initial,
                epoch: 0,
                timer: None,
                tween: None,
            })
            .collect();
        let targets: Vec<TargetId> = chars.iter().map(|c| c.target).collect();
        self.host.set(
            &targets,
            &Props::new().with(Property::Color, self.config.initial),
        );
        *self.state.borrow_mut() = RevealState {
            container: Some(container),
            chars,
        };

        let weak: Weak<Self> = Rc::downgrade(self);
        let mut binding = ScrollBinding::new(Rc::clone(&self.host), container, move |update| {
            if let Some(inner) = weak.upgrade() {
                inner.apply(update);
            }
        })
        .seeded(0.0);
        if let Ok(region) = self.config.region() {
            binding = binding.with_region(region.resolve(self.layout, self.viewport_height));
        }
        *self.binding.borrow_mut() = Some(binding);
    }

    fn teardown(&self) {
        if let Some(binding) = self.binding.borrow_mut().as_mut() {
            binding.deactivate();
        }
        let state = std::mem::take(&mut *self.state.borrow_mut());
        for c in &state.chars {
            if let Some(id) = c.timer {
                self.timers.cancel(id);
            }
            if let Some(handle) = c.tween {
                self.host.cancel(handle);
            }
        }
        for c in &state.chars {
            self.host.remove(c.target);
        }
        if let Some(container) = state.container {
            self.host.remove(container);
        }
    }
}

impl Lifecycle for TextReveal {
    fn activate(&self, scope: &mut Scope) {
        self.inner.build();
        self.inner.scroll_to(self.inner.initial_scroll.get());

        let weak = Rc::downgrade(&self.inner);
        self.inner.scroll.subscribe_in(scope, move |&scroll| {
            if let Some(inner) = weak.upgrade() {
                inner.scroll_to(scroll);
            }
        });

        let inner = Rc::clone(&self.inner);
        scope.register(move || inner.teardown());
    }
}

impl fmt::Debug for TextReveal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextReveal")
            .field("text", &self.inner.text)
            .field("shades", &self.shades())
            .finish()
    }
}
