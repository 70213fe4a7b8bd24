//! Page title that assembles letter by letter, then follows the scroll.
//!
//! Each letter enters from a random distance above or below its slot. When
//! a letter's entrance completes it chains into a scrubbed drift bound to
//! the title's scroll region. Completions carry the mount generation, so an
//! entrance that finishes after unmount never starts a drift.

use super::binding::{ScrollBinding, UpdateOutcome};
use super::region::{ElementBox, ResolvedRegion, TriggerParseError};
use crate::anim::{
    AnimationTimeline, Ease, Host, Playback, Property, Props, TargetId, TimelineHandle, TweenStep,
};
use crate::config::TitleConfig;
use crate::lifecycle::{Lifecycle, Scope, Signal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

struct Letter {
    target: TargetId,
    offset: f64,
    entry: Option<TimelineHandle>,
    drift: Option<TimelineHandle>,
}

#[derive(Default)]
struct TitleState {
    container: Option<TargetId>,
    letters: Vec<Letter>,
    scale: Option<TimelineHandle>,
    mounted: bool,
}

struct TitleInner {
    host: Rc<dyn Host>,
    scroll: Signal<f64>,
    text: String,
    layout: ElementBox,
    viewport_height: f64,
    initial_scroll: Cell<f64>,
    last_scroll: Cell<f64>,
    config: TitleConfig,
    rng: RefCell<StdRng>,
    generation: Cell<u64>,
    drift_region: Cell<Option<ResolvedRegion>>,
    scale_binding: RefCell<Option<ScrollBinding>>,
    drifts: RefCell<Vec<ScrollBinding>>,
    state: RefCell<TitleState>,
}

/// Uppercased page title with a staggered entrance, per-letter scroll drift
/// and a container scale-up.
#[derive(Clone)]
pub struct TitleReveal {
    inner: Rc<TitleInner>,
}

impl TitleReveal {
    /// Fails if a configured region cannot be parsed.
    pub fn new(
        host: Rc<dyn Host>,
        scroll: Signal<f64>,
        title: impl AsRef<str>,
        layout: ElementBox,
        viewport_height: f64,
        config: TitleConfig,
    ) -> Result<Self, TriggerParseError> {
        config.drift_region()?;
        config.scale_region()?;
        Ok(Self {
            inner: Rc::new(TitleInner {
                host,
                scroll,
                text: title.as_ref().to_uppercase(),
                layout,
                viewport_height,
                initial_scroll: Cell::new(0.0),
                last_scroll: Cell::new(0.0),
                config,
                rng: RefCell::new(StdRng::from_entropy()),
                generation: Cell::new(0),
                drift_region: Cell::new(None),
                scale_binding: RefCell::new(None),
                drifts: RefCell::new(Vec::new()),
                state: RefCell::new(TitleState::default()),
            }),
        })
    }

    /// Draw entrance distances from a fixed seed.
    pub fn seeded(self, seed: u64) -> Self {
        *self.inner.rng.borrow_mut() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn starting_at(self, scroll: f64) -> Self {
        self.inner.initial_scroll.set(scroll);
        self
    }

    pub fn text(&self) -> &str {
        &self.inner.text
    }

    pub fn container(&self) -> Option<TargetId> {
        self.inner.state.borrow().container
    }

    /// One element per non-whitespace character.
    pub fn letters(&self) -> Vec<TargetId> {
        self.inner.state.borrow().letters.iter().map(|l| l.target).collect()
    }

    pub fn entry_offsets(&self) -> Vec<f64> {
        self.inner.state.borrow().letters.iter().map(|l| l.offset).collect()
    }

    /// Letters whose entrance finished and now follow the scroll.
    pub fn drifting(&self) -> usize {
        self.inner.drifts.borrow().len()
    }

    pub fn scroll_to(&self, scroll: f64) -> UpdateOutcome {
        self.inner.scroll_to(scroll)
    }
}

fn entry_offset(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    let (lo, hi) = (min.min(max), min.max(max));
    let distance = if lo < hi { rng.gen_range(lo..=hi) } else { lo };
    if rng.gen_bool(0.5) {
        distance
    } else {
        -distance
    }
}

impl TitleInner {
    fn scroll_to(&self, scroll: f64) -> UpdateOutcome {
        self.last_scroll.set(scroll);
        for drift in self.drifts.borrow_mut().iter_mut() {
            drift.scroll_to(scroll);
        }
        match self.scale_binding.borrow_mut().as_mut() {
            Some(binding) => binding.scroll_to(scroll),
            None => UpdateOutcome::Inactive,
        }
    }

    fn build(&self) -> TargetId {
        let container = self.host.spawn("title");
        let letters: Vec<Letter> = {
            let mut rng = self.rng.borrow_mut();
            self.text
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .map(|_| Letter {
                    target: self.host.spawn("title-letter"),
                    offset: entry_offset(&mut rng, self.config.min_offset, self.config.max_offset),
                    entry: None,
                    drift: None,
                })
                .collect()
        };
        *self.state.borrow_mut() = TitleState {
            container: Some(container),
            letters,
            scale: None,
            mounted: true,
        };
        container
    }

    fn enter(self: &Rc<Self>) {
        let generation = self.generation.get();
        // Whitespace keeps its place in the stagger.
        let delays: Vec<f64> = self
            .text
            .chars()
            .enumerate()
            .filter(|(_, ch)| !ch.is_whitespace())
            .map(|(i, _)| i as f64 * self.config.letter_stagger)
            .collect();
        let letters: Vec<(TargetId, f64)> = self
            .state
            .borrow()
            .letters
            .iter()
            .map(|l| (l.target, l.offset))
            .collect();

        for (slot, ((target, offset), delay)) in letters.into_iter().zip(delays).enumerate() {
            let mut step = TweenStep::new(
                vec![target],
                Props::new().with(Property::Y, 0.0),
                self.config.letter_duration,
            );
            step.from = Some(Props::new().with(Property::Y, offset));
            step.ease = self.config.letter_ease;
            step.offset = delay;

            let weak: Weak<Self> = Rc::downgrade(self);
            let handle = self.host.play(
                AnimationTimeline::labeled("title-letter-enter").then(step),
                Playback::Once,
                Some(Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.drift_in(slot, generation);
                    }
                })),
            );
            if let Some(letter) = self.state.borrow_mut().letters.get_mut(slot) {
                letter.entry = Some(handle);
            }
        }
    }

    /// Hand a settled letter over to the scroll.
    fn drift_in(&self, slot: usize, generation: u64) {
        let target = {
            let mut state = self.state.borrow_mut();
            if !state.mounted || self.generation.get() != generation {
                tracing::trace!(slot, generation, "stale title entrance dropped");
                return;
            }
            let Some(letter) = state.letters.get_mut(slot) else {
                return;
            };
            letter.entry = None;
            letter.target
        };
        let Some(region) = self.drift_region.get() else {
            return;
        };

        let mut step = TweenStep::new(
            vec![target],
            Props::new().with(Property::YPercent, self.config.drift),
            1.0,
        );
        step.from = Some(Props::new().with(Property::YPercent, 0.0));
        step.ease = Ease::None;
        let handle = self.host.play(
            AnimationTimeline::labeled("title-letter-drift").then(step),
            Playback::Scrubbed,
            None,
        );
        if let Some(letter) = self.state.borrow_mut().letters.get_mut(slot) {
            letter.drift = Some(handle);
        }

        let host = Rc::clone(&self.host);
        let mut binding = ScrollBinding::new(Rc::clone(&self.host), target, move |update| {
            host.seek(handle, update.progress);
        })
        .with_region(region);
        binding.scroll_to(self.last_scroll.get());
        self.drifts.borrow_mut().push(binding);
        tracing::trace!(slot, "title letter drifting");
    }

    fn teardown(&self) {
        self.generation.set(self.generation.get() + 1);
        if let Some(binding) = self.scale_binding.borrow_mut().as_mut() {
            binding.deactivate();
        }
        let drifts = std::mem::take(&mut *self.drifts.borrow_mut());
        for mut drift in drifts {
            drift.deactivate();
        }

        let state = std::mem::take(&mut *self.state.borrow_mut());
        for letter in &state.letters {
            for handle in [letter.entry, letter.drift].into_iter().flatten() {
                self.host.cancel(handle);
            }
            self.host.remove(letter.target);
        }
        if let Some(handle) = state.scale {
            self.host.cancel(handle);
        }
        if let Some(container) = state.container {
            self.host.remove(container);
        }
        tracing::debug!(title = %self.text, "title unmounted");
    }
}

impl Lifecycle for TitleReveal {
    fn activate(&self, scope: &mut Scope) {
        let inner = &self.inner;
        let (drift, scale) = match (inner.config.drift_region(), inner.config.scale_region()) {
            (Ok(drift), Ok(scale)) => (
                drift.resolve(inner.layout, inner.viewport_height),
                scale.resolve(inner.layout, inner.viewport_height),
            ),
            (Err(error), _) | (_, Err(error)) => {
                tracing::warn!(%error, "title regions rejected after construction");
                return;
            }
        };
        inner.drift_region.set(Some(drift));
        let container = inner.build();

        let mut step = TweenStep::new(
            vec![container],
            Props::new().with(Property::Scale, inner.config.scale),
            1.0,
        );
        step.from = Some(Props::new().with(Property::Scale, 1.0));
        step.ease = inner.config.scale_ease;
        let handle = inner.host.play(
            AnimationTimeline::labeled("title-scale").then(step),
            Playback::Scrubbed,
            None,
        );
        inner.state.borrow_mut().scale = Some(handle);

        let host = Rc::clone(&inner.host);
        *inner.scale_binding.borrow_mut() = Some(
            ScrollBinding::new(Rc::clone(&inner.host), container, move |update| {
                host.seek(handle, update.progress);
            })
            .with_region(scale),
        );

        inner.enter();
        inner.scroll_to(inner.initial_scroll.get());
        tracing::debug!(title = %inner.text, "title mounted");

        let weak = Rc::downgrade(inner);
        inner.scroll.subscribe_in(scope, move |&scroll| {
            if let Some(inner) = weak.upgrade() {
                inner.scroll_to(scroll);
            }
        });

        let owned = Rc::clone(inner);
        scope.register(move || owned.teardown());
    }
}

impl fmt::Debug for TitleReveal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TitleReveal")
            .field("text", &self.inner.text)
            .field("drifting", &self.drifting())
            .finish()
    }
}
