//! Builder for single tween steps.

use crate::anim::{Ease, Property, Props, TargetId, TweenStep, Value};
use crate::builder::error::BuildError;

/// Builder for a [`TweenStep`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use stagehand::anim::{Ease, Property, TargetId};
/// use stagehand::builder::TweenBuilder;
///
/// let blocks: Vec<TargetId> = (1..=20).map(TargetId::from_raw).collect();
/// let cover = TweenBuilder::new()
///     .targets(blocks)
///     .to(Property::ScaleX, 1.0)
///     .duration(0.6)
///     .stagger(0.02)
///     .ease(Ease::Power2Out)
///     .build()
///     .unwrap();
///
/// assert!((cover.end() - (0.6 + 19.0 * 0.02)).abs() < 1e-9);
/// ```
#[derive(Debug, Default)]
pub struct TweenBuilder {
    targets: Vec<TargetId>,
    from: Option<Props>,
    to: Props,
    duration: f64,
    ease: Ease,
    stagger: f64,
    offset: Option<f64>,
}

impl TweenBuilder {
    pub fn new() -> Self {
        Self {
            duration: 0.5,
            ..Self::default()
        }
    }

    /// Set the animated targets (required).
    pub fn targets(mut self, targets: impl IntoIterator<Item = TargetId>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    pub fn target(mut self, target: TargetId) -> Self {
        self.targets.push(target);
        self
    }

    /// Add an explicit start value. Without one the target's current value
    /// is used when the step starts.
    pub fn from(mut self, property: Property, value: impl Into<Value>) -> Self {
        self.from
            .get_or_insert_with(Props::new)
            .insert(property, value.into());
        self
    }

    /// Add an end value (at least one required).
    pub fn to(mut self, property: Property, value: impl Into<Value>) -> Self {
        self.to.insert(property, value.into());
        self
    }

    pub fn to_props(mut self, props: &Props) -> Self {
        self.to.merge(props);
        self
    }

    pub fn from_props(mut self, props: &Props) -> Self {
        self.from.get_or_insert_with(Props::new).merge(props);
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn stagger(mut self, seconds: f64) -> Self {
        self.stagger = seconds;
        self
    }

    /// Start at an absolute time within the timeline instead of after the
    /// previous step.
    pub fn at(mut self, seconds: f64) -> Self {
        self.offset = Some(seconds);
        self
    }

    pub(crate) fn explicit_offset(&self) -> Option<f64> {
        self.offset
    }

    /// Build the step.
    pub fn build(self) -> Result<TweenStep, BuildError> {
        if self.targets.is_empty() {
            return Err(BuildError::MissingTargets);
        }
        if self.to.is_empty() {
            return Err(BuildError::EmptyTarget);
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(BuildError::InvalidDuration(self.duration));
        }
        if !self.stagger.is_finite() || self.stagger < 0.0 {
            return Err(BuildError::InvalidStagger(self.stagger));
        }

        Ok(TweenStep {
            targets: self.targets,
            from: self.from,
            to: self.to,
            duration: self.duration,
            ease: self.ease,
            stagger: self.stagger,
            offset: self.offset.unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> TargetId {
        TargetId::from_raw(7)
    }

    #[test]
    fn builder_requires_targets() {
        let result = TweenBuilder::new().to(Property::Opacity, 1.0).build();
        assert_eq!(result, Err(BuildError::MissingTargets));
    }

    #[test]
    fn builder_requires_end_values() {
        let result = TweenBuilder::new().target(target()).build();
        assert_eq!(result, Err(BuildError::EmptyTarget));
    }

    #[test]
    fn builder_rejects_bad_timing() {
        let base = || TweenBuilder::new().target(target()).to(Property::Y, 0.0);

        assert!(matches!(
            base().duration(-1.0).build(),
            Err(BuildError::InvalidDuration(_))
        ));
        assert!(matches!(
            base().duration(f64::NAN).build(),
            Err(BuildError::InvalidDuration(_))
        ));
        assert!(matches!(
            base().stagger(-0.1).build(),
            Err(BuildError::InvalidStagger(_))
        ));
    }

    #[test]
    fn from_values_are_collected() {
        let step = TweenBuilder::new()
            .target(target())
            .from(Property::Y, -20.0)
            .from(Property::Opacity, 0.0)
            .to(Property::Y, 0.0)
            .to(Property::Opacity, 1.0)
            .duration(0.4)
            .ease(Ease::Power3Out)
            .build()
            .unwrap();

        let from = step.from.unwrap();
        assert_eq!(from.number(Property::Y), Some(-20.0));
        assert_eq!(from.number(Property::Opacity), Some(0.0));
        assert_eq!(step.ease, Ease::Power3Out);
    }

    #[test]
    fn default_duration_is_half_a_second() {
        let step = TweenBuilder::new()
            .target(target())
            .to(Property::Scale, 2.5)
            .build()
            .unwrap();
        assert_eq!(step.duration, 0.5);
        assert_eq!(step.offset, 0.0);
    }
}
