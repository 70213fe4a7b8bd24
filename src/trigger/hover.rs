//! Pointer enter/leave bindings.

use super::binding::UpdateOutcome;
use super::direction::Direction;
use crate::anim::{
    AnimationTimeline, Ease, Host, Playback, Props, TargetId, TimelineHandle, TweenStep,
};
use std::fmt;
use std::rc::Rc;

/// Tweens a target to one look while the pointer is over it and back to
/// another when it leaves.
pub struct HoverBinding {
    host: Rc<dyn Host>,
    target: TargetId,
    hovered_props: Props,
    resting_props: Props,
    duration: f64,
    ease: Ease,
    hovered: bool,
    running: Option<TimelineHandle>,
    active: bool,
}

impl HoverBinding {
    pub fn new(host: Rc<dyn Host>, target: TargetId, hovered: Props, resting: Props) -> Self {
        Self {
            host,
            target,
            hovered_props: hovered,
            resting_props: resting,
            duration: 0.15,
            ease: Ease::Power1Out,
            hovered: false,
            running: None,
            active: true,
        }
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn pointer_enter(&mut self) -> UpdateOutcome {
        self.drive(true)
    }

    pub fn pointer_leave(&mut self) -> UpdateOutcome {
        self.drive(false)
    }

    fn drive(&mut self, hovered: bool) -> UpdateOutcome {
        if !self.active {
            return UpdateOutcome::Inactive;
        }
        if !self.host.is_attached(self.target) {
            return UpdateOutcome::Detached;
        }
        if self.hovered == hovered {
            return UpdateOutcome::Unchanged;
        }
        self.hovered = hovered;
        if let Some(handle) = self.running.take() {
            self.host.cancel(handle);
        }

        let to = if hovered {
            &self.hovered_props
        } else {
            &self.resting_props
        };
        let mut step = TweenStep::new(vec![self.target], to.clone(), self.duration);
        step.ease = self.ease;
        let timeline = AnimationTimeline::labeled("hover").then(step);
        self.running = Some(self.host.play(timeline, Playback::Once, None));

        UpdateOutcome::Applied(if hovered {
            Direction::Forward
        } else {
            Direction::Reverse
        })
    }

    /// Stop the running tween and ignore further pointer events.
    pub fn cancel(&mut self) {
        self.active = false;
        if let Some(handle) = self.running.take() {
            self.host.cancel(handle);
        }
    }
}

impl fmt::Debug for HoverBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoverBinding")
            .field("target", &self.target)
            .field("hovered", &self.hovered)
            .field("active", &self.active)
            .finish()
    }
}
