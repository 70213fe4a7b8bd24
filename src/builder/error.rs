//! Build errors for timelines, tweens and sequencers.

use thiserror::Error;

/// Errors that can occur when building timelines and sequenced components.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Tween has no targets. Call .targets(..) or .target(..)")]
    MissingTargets,

    #[error("Tween animates nothing. Call .to(props) with at least one property")]
    EmptyTarget,

    #[error("Duration must be finite and non-negative, got {0}")]
    InvalidDuration(f64),

    #[error("Stagger must be finite and non-negative, got {0}")]
    InvalidStagger(f64),

    #[error("Timeline has no steps. Add at least one step")]
    NoSteps,

    #[error("Transition needs at least one block")]
    NoBlocks,

    #[error("Menu needs at least one item")]
    NoItems,

    #[error("No host set. Call .host(..) before .build()")]
    MissingHost,

    #[error("No router set. Call .router(..) before .build()")]
    MissingRouter,
}
