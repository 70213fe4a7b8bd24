//! Builder API for timelines and sequenced components.
//!
//! Fluent builders validate their input at `build()` time and report the
//! first problem as a [`BuildError`].

pub mod error;
pub mod macros;
pub mod sequencer;
pub mod timeline;
pub mod tween;

pub use error::BuildError;
pub use sequencer::{ContextMenuBuilder, SequencerBuilder};
pub use timeline::TimelineBuilder;
pub use tween::TweenBuilder;
