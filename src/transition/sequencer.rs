//! Page transition sequencer.
//!
//! A click on an internal link covers the page with staggered blocks, pushes
//! the route once the cover has finished, and reveals the new page once its
//! content has mounted. Each phase is entered from the completion of the
//! previous one, never from a timer.
//!
//! Completions capture the run's generation. Unmounting bumps it, so a
//! completion that arrives after teardown finds a different generation and
//! does nothing.

use super::block::{BlockBase, TransitionBlock};
use super::intent::{internal_path, LinkClick, NavigationIntent, Router};
use super::phase::TransitionPhase;
use crate::anim::{
    AnimationTimeline, Ease, Host, Origin, Playback, Property, Props, TargetId, TimelineHandle,
    TweenStep,
};
use crate::config::TransitionConfig;
use crate::core::{Guard, Phase, PhaseChange, PhaseHistory, DEFAULT_HISTORY_LIMIT};
use crate::lifecycle::{Lifecycle, Scope, Signal, SubscriptionId};
use chrono::Utc;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

const BLOCK_ROLE: &str = "transition-block";

/// Why a click did not start a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A transition is already running.
    InFlight,
    /// The link points at the current page.
    SamePath,
    /// Not an internal link; the browser handles it.
    External,
    /// The sequencer is not mounted.
    Unmounted,
}

/// Result of [`TransitionSequencer::click`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Started(NavigationIntent),
    Ignored(IgnoreReason),
}

impl ClickOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

#[derive(Default)]
struct SequencerState {
    phase: TransitionPhase,
    history: PhaseHistory<TransitionPhase>,
    blocks: Vec<TransitionBlock>,
    running: Option<TimelineHandle>,
    pending: Option<NavigationIntent>,
    generation: u64,
    sequence: u64,
    mounted: bool,
}

struct SequencerInner {
    host: Rc<dyn Host>,
    router: Rc<dyn Router>,
    config: TransitionConfig,
    accept: Guard<TransitionPhase>,
    changes: Signal<TransitionPhase>,
    state: RefCell<SequencerState>,
}

/// Drives the cover, navigate and reveal sequence of page transitions.
#[derive(Clone)]
pub struct TransitionSequencer {
    inner: Rc<SequencerInner>,
}

impl TransitionSequencer {
    /// Sequencer accepting clicks only while idle. See
    /// [`SequencerBuilder`](crate::builder::SequencerBuilder) for a
    /// validated construction path.
    pub fn new(host: Rc<dyn Host>, router: Rc<dyn Router>, config: TransitionConfig) -> Self {
        Self::with_guard(host, router, config, Guard::always())
    }

    /// Like [`new`](Self::new), with an extra guard a phase must also pass
    /// before a click is accepted.
    pub fn with_guard(
        host: Rc<dyn Host>,
        router: Rc<dyn Router>,
        config: TransitionConfig,
        guard: Guard<TransitionPhase>,
    ) -> Self {
        let accept = Guard::new(|phase: &TransitionPhase| phase.is_resting()).and(guard);
        Self {
            inner: Rc::new(SequencerInner {
                host,
                router,
                config,
                accept,
                changes: Signal::new(),
                state: RefCell::new(SequencerState {
                    history: PhaseHistory::bounded(DEFAULT_HISTORY_LIMIT),
                    ..SequencerState::default()
                }),
            }),
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.inner.state.borrow().phase
    }

    pub fn history(&self) -> PhaseHistory<TransitionPhase> {
        self.inner.state.borrow().history.clone()
    }

    pub fn blocks(&self) -> Vec<TransitionBlock> {
        self.inner.state.borrow().blocks.clone()
    }

    pub fn pending(&self) -> Option<NavigationIntent> {
        self.inner.state.borrow().pending.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.state.borrow().mounted
    }

    /// Every phase entered, as it happens.
    pub fn on_phase<F>(&self, scope: &mut Scope, handler: F) -> SubscriptionId
    where
        F: FnMut(&TransitionPhase) + 'static,
    {
        self.inner.changes.subscribe_in(scope, handler)
    }

    /// Handle a click on a link.
    ///
    /// Internal links always get their default prevented while mounted, even
    /// when the click is then ignored, so the browser never navigates behind
    /// the sequencer's back.
    pub fn click(&self, click: &mut LinkClick) -> ClickOutcome {
        self.inner.click(click)
    }

    /// The new page's content is in place; reveal it.
    ///
    /// Only meaningful while `Navigating`; returns `false` otherwise.
    pub fn content_mounted(&self) -> bool {
        let navigating = self.phase() == TransitionPhase::Navigating;
        if navigating {
            self.inner.reveal();
        } else {
            tracing::trace!(phase = %self.phase(), "content mounted outside navigation");
        }
        navigating
    }
}

impl SequencerInner {
    fn click(self: &Rc<Self>, click: &mut LinkClick) -> ClickOutcome {
        if !self.state.borrow().mounted {
            return ClickOutcome::Ignored(IgnoreReason::Unmounted);
        }
        let Some(path) = internal_path(&click.href) else {
            return ClickOutcome::Ignored(IgnoreReason::External);
        };
        click.prevent_default();

        let phase = self.state.borrow().phase;
        if !self.accept.check(&phase) {
            tracing::trace!(%phase, %path, "click ignored while a transition is in flight");
            return ClickOutcome::Ignored(IgnoreReason::InFlight);
        }
        let current = self.router.current_path();
        if internal_path(&current).unwrap_or(current) == path {
            tracing::trace!(%path, "click ignored for the current page");
            return ClickOutcome::Ignored(IgnoreReason::SamePath);
        }

        let intent = NavigationIntent {
            path,
            origin: click.clone(),
        };
        {
            let mut state = self.state.borrow_mut();
            state.sequence += 1;
            state.pending = Some(intent.clone());
        }
        self.enter(TransitionPhase::Covering);
        self.cover();
        ClickOutcome::Started(intent)
    }

    /// Record `next` and announce it. Illegal edges are refused.
    fn enter(&self, next: TransitionPhase) -> bool {
        {
            let mut state = self.state.borrow_mut();
            let from = state.phase;
            if !from.can_enter(next) {
                tracing::warn!(%from, to = %next, "refusing illegal phase change");
                return false;
            }
            let change = PhaseChange {
                from,
                to: next,
                timestamp: Utc::now(),
                sequence: state.sequence,
            };
            state.history.push(change);
            state.phase = next;
        }
        tracing::debug!(phase = %next, "transition phase changed");
        self.changes.emit(&next);
        true
    }

    fn block_targets(&self) -> Vec<TargetId> {
        self.state.borrow().blocks.iter().map(|b| b.target).collect()
    }

    fn sweep(
        &self,
        targets: Vec<TargetId>,
        scale_x: f64,
        duration: f64,
        stagger: f64,
        ease: Ease,
    ) -> AnimationTimeline {
        let mut step = TweenStep::new(
            targets,
            Props::new().with(Property::ScaleX, scale_x),
            duration,
        );
        step.stagger = stagger;
        step.ease = ease;
        AnimationTimeline::labeled(if scale_x > 0.0 { "cover" } else { "reveal" }).then(step)
    }

    fn play_phase(self: &Rc<Self>, timeline: AnimationTimeline, done: fn(&SequencerInner, u64)) {
        let generation = self.state.borrow().generation;
        let weak = Rc::downgrade(self);
        let handle = self.host.play(
            timeline,
            Playback::Once,
            Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    done(&inner, generation);
                }
            })),
        );
        let previous = self.state.borrow_mut().running.replace(handle);
        if let Some(previous) = previous {
            self.host.cancel(previous);
        }
    }

    fn cover(self: &Rc<Self>) {
        let targets = self.block_targets();
        self.host.set(
            &targets,
            &Props::new()
                .with(Property::ScaleX, 0.0)
                .with(Property::TransformOrigin, Origin::Left),
        );
        let timeline = self.sweep(
            targets,
            1.0,
            self.config.cover_duration,
            self.config.cover_stagger,
            self.config.cover_ease,
        );
        self.play_phase(timeline, Self::cover_done);
    }

    fn cover_done(&self, generation: u64) {
        let intent = {
            let mut state = self.state.borrow_mut();
            if state.generation != generation || state.phase != TransitionPhase::Covering {
                tracing::trace!(generation, "stale cover completion dropped");
                return;
            }
            state.running = None;
            for block in &mut state.blocks {
                block.base = BlockBase::Expanded;
            }
            state.pending.take()
        };
        if !self.enter(TransitionPhase::Navigating) {
            return;
        }
        if let Some(intent) = intent {
            tracing::debug!(path = %intent.path, "navigating");
            self.router.push(&intent.path);
        }
    }

    fn reveal(self: &Rc<Self>) {
        if !self.enter(TransitionPhase::Revealing) {
            return;
        }
        let targets = self.block_targets();
        self.host.set(
            &targets,
            &Props::new()
                .with(Property::ScaleX, 1.0)
                .with(Property::TransformOrigin, Origin::Right),
        );
        let timeline = self.sweep(
            targets,
            0.0,
            self.config.reveal_duration,
            self.config.reveal_stagger,
            self.config.reveal_ease,
        );
        self.play_phase(timeline, Self::reveal_done);
    }

    fn reveal_done(&self, generation: u64) {
        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation || state.phase != TransitionPhase::Revealing {
                tracing::trace!(generation, "stale reveal completion dropped");
                return;
            }
            state.running = None;
            for block in &mut state.blocks {
                block.base = BlockBase::Collapsed;
            }
        }
        self.enter(TransitionPhase::Idle);
    }

    fn mount(self: &Rc<Self>) {
        let targets: Vec<TargetId> = (0..self.config.blocks)
            .map(|_| self.host.spawn(BLOCK_ROLE))
            .collect();
        self.host.set(
            &targets,
            &Props::new()
                .with(Property::ScaleX, 0.0)
                .with(Property::TransformOrigin, Origin::Left),
        );
        {
            let mut state = self.state.borrow_mut();
            state.blocks = targets
                .iter()
                .enumerate()
                .map(|(i, &target)| TransitionBlock::new(i, target, self.config.cover_stagger))
                .collect();
            state.phase = TransitionPhase::Idle;
            state.mounted = true;
        }
        tracing::debug!(blocks = targets.len(), "transition sequencer mounted");

        if self.config.reveal_on_mount {
            self.state.borrow_mut().sequence += 1;
            self.reveal();
        }
    }

    fn teardown(&self) {
        let (running, blocks) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.mounted = false;
            state.pending = None;
            state.phase = TransitionPhase::Idle;
            (state.running.take(), std::mem::take(&mut state.blocks))
        };
        if let Some(handle) = running {
            self.host.cancel(handle);
        }
        for block in &blocks {
            self.host.remove(block.target);
        }
        tracing::debug!(blocks = blocks.len(), "transition sequencer unmounted");
    }
}

impl Lifecycle for TransitionSequencer {
    fn activate(&self, scope: &mut Scope) {
        self.inner.mount();
        let inner = Rc::clone(&self.inner);
        scope.register(move || inner.teardown());
    }
}

impl fmt::Debug for TransitionSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("TransitionSequencer")
            .field("phase", &state.phase)
            .field("blocks", &state.blocks.len())
            .field("mounted", &state.mounted)
            .finish()
    }
}
