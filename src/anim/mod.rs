//! Animation vocabulary and the engine seam.
//!
//! - `Ease`, `Property`, `Value`, `Props`, `Rgba`: what gets animated and how
//! - `TweenStep`, `AnimationTimeline`: ordered, staggered property changes
//! - `AnimationEngine`, `Stage`: the collaborators that render them
//! - `HeadlessEngine`: in-memory implementation of both

mod ease;
mod engine;
mod headless;
mod props;
mod timeline;

pub use ease::{Ease, EaseParseError};
pub use engine::{AnimationEngine, Completion, Host, Playback, Stage, TargetId, TimelineHandle};
pub use headless::{EngineEvent, HeadlessEngine, FRAME};
pub use props::{ColorParseError, Origin, Property, Props, Rgba, Value};
pub use timeline::{AnimationTimeline, TweenStep};
