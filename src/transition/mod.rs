//! Full-page transitions: cover, navigate, reveal.

mod block;
mod intent;
mod phase;
mod sequencer;

pub use block::{BlockBase, TransitionBlock};
pub use intent::{internal_path, LinkClick, MemoryRouter, NavigationIntent, Router};
pub use phase::TransitionPhase;
pub use sequencer::{ClickOutcome, IgnoreReason, TransitionSequencer};
