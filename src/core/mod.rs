//! Pure core of the orchestration layer.
//!
//! - `Phase`: the phases a sequenced component moves through
//! - `Guard`: predicates that gate input
//! - `PhaseHistory`: record of phase changes, optionally bounded
//!
//! Nothing in this module touches the animation engine or the host.

mod guard;
mod history;
mod phase;

pub use guard::Guard;
pub use history::{PhaseChange, PhaseHistory, DEFAULT_HISTORY_LIMIT};
pub use phase::Phase;
