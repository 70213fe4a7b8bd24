//! Timelines: ordered, optionally staggered property changes.

use super::ease::Ease;
use super::engine::TargetId;
use super::props::Props;
use serde::{Deserialize, Serialize};

/// One step of a timeline.
///
/// The step animates every target from `from` (or whatever the target shows
/// when the timeline starts) to `to`. Target `i` starts at
/// `offset + i * stagger` seconds into the timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TweenStep {
    pub targets: Vec<TargetId>,
    pub from: Option<Props>,
    pub to: Props,
    pub duration: f64,
    pub ease: Ease,
    pub stagger: f64,
    pub offset: f64,
}

impl TweenStep {
    pub fn new(targets: Vec<TargetId>, to: Props, duration: f64) -> Self {
        Self {
            targets,
            from: None,
            to,
            duration,
            ease: Ease::None,
            stagger: 0.0,
            offset: 0.0,
        }
    }

    /// Start time of the `index`-th target within the timeline.
    pub fn start_of(&self, index: usize) -> f64 {
        self.offset + index as f64 * self.stagger
    }

    /// Time at which the last target of this step finishes.
    pub fn end(&self) -> f64 {
        let last = self.targets.len().saturating_sub(1);
        self.start_of(last) + self.duration
    }

    /// Eased progress of the `index`-th target at timeline time `position`.
    /// `None` before the target has started.
    pub fn progress_of(&self, index: usize, position: f64) -> Option<f64> {
        let start = self.start_of(index);
        if position < start {
            return None;
        }
        let raw = if self.duration <= 0.0 {
            1.0
        } else {
            (position - start) / self.duration
        };
        Some(self.ease.apply(raw))
    }
}

/// Ordered sequence of steps played as one unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationTimeline {
    steps: Vec<TweenStep>,
    label: Option<String>,
}

impl AnimationTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            label: Some(label.into()),
        }
    }

    /// Append a step after the current end; the step's own offset becomes a
    /// delay relative to that end.
    pub fn then(mut self, mut step: TweenStep) -> Self {
        step.offset += self.total_duration();
        self.steps.push(step);
        self
    }

    /// Append a step at its own offset.
    pub fn push(&mut self, step: TweenStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[TweenStep] {
        &self.steps
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Latest finish time across all steps and targets.
    pub fn total_duration(&self) -> f64 {
        self.steps.iter().map(TweenStep::end).fold(0.0, f64::max)
    }

    pub fn targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.steps.iter().flat_map(|s| s.targets.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::props::Property;

    fn ids(n: u64) -> Vec<TargetId> {
        (0..n).map(TargetId::from_raw).collect()
    }

    #[test]
    fn stagger_offsets_each_target() {
        let mut step = TweenStep::new(ids(20), Props::new().with(Property::ScaleX, 1.0), 0.6);
        step.stagger = 0.02;

        assert_eq!(step.start_of(0), 0.0);
        assert!((step.start_of(10) - 0.2).abs() < 1e-12);
        assert!((step.end() - (19.0 * 0.02 + 0.6)).abs() < 1e-12);
    }

    #[test]
    fn progress_is_none_before_start() {
        let mut step = TweenStep::new(ids(3), Props::new().with(Property::Opacity, 1.0), 1.0);
        step.stagger = 0.5;
        assert_eq!(step.progress_of(2, 0.9), None);
        assert_eq!(step.progress_of(2, 1.5), Some(0.5));
        assert_eq!(step.progress_of(0, 10.0), Some(1.0));
    }

    #[test]
    fn zero_duration_jumps_to_end() {
        let step = TweenStep::new(ids(1), Props::new().with(Property::Y, 4.0), 0.0);
        assert_eq!(step.progress_of(0, 0.0), Some(1.0));
    }

    #[test]
    fn then_chains_after_previous_step() {
        let timeline = AnimationTimeline::new()
            .then(TweenStep::new(ids(1), Props::new().with(Property::Y, 0.0), 1.8))
            .then(TweenStep::new(ids(1), Props::new().with(Property::YPercent, -30.0), 1.0));

        assert_eq!(timeline.steps()[1].offset, 1.8);
        assert!((timeline.total_duration() - 2.8).abs() < 1e-12);
    }

    #[test]
    fn empty_timeline_has_zero_duration() {
        assert_eq!(AnimationTimeline::new().total_duration(), 0.0);
    }
}
