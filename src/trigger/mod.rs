//! Trigger bindings: visual properties driven by scroll position and
//! pointer input.
//!
//! - `ScrollRegion`, `TriggerPoint`: where a binding starts and ends
//! - `ScrollBinding`: progress through a region handed to a handler
//! - `ToggleBinding`: timeline actions on region crossings
//! - `HoverBinding`, `TextReveal`, `NavVisibility`, `Parallax`,
//!   `Showcase`, `TitleReveal`: the concrete effects

mod binding;
mod direction;
mod hover;
mod nav;
mod parallax;
mod region;
mod showcase;
mod text;
mod title;
mod toggle;

pub use binding::{ScrollBinding, ScrollUpdate, UpdateOutcome};
pub use direction::{Direction, DirectionTracker};
pub use hover::HoverBinding;
pub use nav::{NavState, NavVisibility};
pub use parallax::Parallax;
pub use region::{
    Anchor, ElementBox, Position, ResolvedRegion, ScrollRegion, TriggerParseError, TriggerPoint,
};
pub use showcase::{panel_index, Showcase, TitleSlot};
pub use text::{CharShade, TextReveal};
pub use title::TitleReveal;
pub use toggle::{Crossing, ToggleAction, ToggleActions, ToggleBinding, ToggleParseError};
