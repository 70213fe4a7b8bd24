//! Builder for multi-step timelines.

use crate::anim::{AnimationTimeline, TweenStep};
use crate::builder::error::BuildError;
use crate::builder::tween::TweenBuilder;

/// Builder for an [`AnimationTimeline`].
///
/// Steps added through [`TimelineBuilder::step`] start when the timeline
/// built so far ends, unless the tween builder pinned an absolute time with
/// `.at(..)`.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    label: Option<String>,
    steps: Vec<TweenStep>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name shown in engine journals and logs.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a step using a builder.
    /// Returns an error if the builder fails validation.
    pub fn step(mut self, builder: TweenBuilder) -> Result<Self, BuildError> {
        let chained = builder.explicit_offset().is_none();
        let mut step = builder.build()?;
        if chained {
            step.offset = self.end();
        }
        self.steps.push(step);
        Ok(self)
    }

    /// Add a pre-built step at its own offset.
    pub fn add_step(mut self, step: TweenStep) -> Self {
        self.steps.push(step);
        self
    }

    fn end(&self) -> f64 {
        self.steps.iter().map(TweenStep::end).fold(0.0, f64::max)
    }

    /// Build the timeline.
    pub fn build(self) -> Result<AnimationTimeline, BuildError> {
        if self.steps.is_empty() {
            return Err(BuildError::NoSteps);
        }
        let mut timeline = match self.label {
            Some(label) => AnimationTimeline::labeled(label),
            None => AnimationTimeline::new(),
        };
        for step in self.steps {
            timeline.push(step);
        }
        Ok(timeline)
    }
}
