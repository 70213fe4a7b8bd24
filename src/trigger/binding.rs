//! Scroll-linked progress bindings.

use super::direction::{Direction, DirectionTracker};
use super::region::ResolvedRegion;
use crate::anim::{Host, TargetId};
use std::fmt;
use std::rc::Rc;

/// What an update did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The handler ran.
    Applied(Direction),
    /// Same progress as the last applied update; nothing ran.
    Unchanged,
    /// The target has left the tree; nothing ran.
    Detached,
    /// The binding was deactivated; nothing ran.
    Inactive,
}

/// One progress update handed to a binding's handler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollUpdate {
    pub progress: f64,
    pub direction: Direction,
}

type Handler = Box<dyn FnMut(&ScrollUpdate)>;

/// Binds scroll progress through a region to a handler.
///
/// The binding owns its direction state, so it can be driven in tests with
/// bare progress values. Updates may arrive at any rate: progress is clamped
/// to [0,1] and an update equal to the last applied one is skipped.
pub struct ScrollBinding {
    host: Rc<dyn Host>,
    target: TargetId,
    tracker: DirectionTracker,
    region: Option<ResolvedRegion>,
    handler: Handler,
    active: bool,
    applied: Option<f64>,
}

impl ScrollBinding {
    pub fn new<F>(host: Rc<dyn Host>, target: TargetId, handler: F) -> Self
    where
        F: FnMut(&ScrollUpdate) + 'static,
    {
        Self {
            host,
            target,
            tracker: DirectionTracker::default(),
            region: None,
            handler: Box::new(handler),
            active: true,
            applied: None,
        }
    }

    /// Map raw scroll offsets through `region`.
    pub fn with_region(mut self, region: ResolvedRegion) -> Self {
        self.region = Some(region);
        self
    }

    /// Treat `progress` as already applied, so the first update only runs
    /// the handler once progress moves away from it.
    pub fn seeded(mut self, progress: f64) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        self.tracker.reset(progress);
        self.applied = Some(progress);
        self
    }

    /// Replace the region after a layout change.
    pub fn relayout(&mut self, region: ResolvedRegion) {
        self.region = Some(region);
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn last_progress(&self) -> f64 {
        self.tracker.last()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Feed normalized progress.
    pub fn update(&mut self, progress: f64) -> UpdateOutcome {
        if !self.active {
            return UpdateOutcome::Inactive;
        }
        if !self.host.is_attached(self.target) {
            tracing::trace!(element = %self.target, "scroll update for detached element skipped");
            return UpdateOutcome::Detached;
        }
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        if self.applied == Some(progress) {
            return UpdateOutcome::Unchanged;
        }

        let direction = self.tracker.classify(progress);
        self.applied = Some(progress);
        (self.handler)(&ScrollUpdate {
            progress,
            direction,
        });
        UpdateOutcome::Applied(direction)
    }

    /// Feed a raw scroll offset. Without a region the offset is taken as
    /// progress.
    pub fn scroll_to(&mut self, scroll: f64) -> UpdateOutcome {
        let progress = match self.region {
            Some(region) => region.progress(scroll),
            None => scroll,
        };
        self.update(progress)
    }
}

impl fmt::Debug for ScrollBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollBinding")
            .field("target", &self.target)
            .field("tracker", &self.tracker)
            .field("region", &self.region)
            .field("active", &self.active)
            .finish()
    }
}
