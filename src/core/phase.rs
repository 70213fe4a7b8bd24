//! Phase trait for orchestration state machines.
//!
//! Every sequenced component (page transitions, context menus) moves through
//! a small closed set of phases. Phases are plain values: inspecting them has
//! no side effects.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Trait for the phases of a sequenced component.
///
/// # Required Traits
///
/// - `Clone`: phases are copied into history records
/// - `PartialEq`: phases are compared by guards and transition tables
/// - `Debug`: phases show up in trace output
/// - `Serialize` + `DeserializeOwned`: histories can be dumped for inspection
///
/// # Example
///
/// ```rust
/// use stagehand::core::Phase;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Door {
///     Closed,
///     Opening,
///     Open,
/// }
///
/// impl Phase for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Opening => "Opening",
///             Self::Open => "Open",
///         }
///     }
///
///     fn is_resting(&self) -> bool {
///         !matches!(self, Self::Opening)
///     }
/// }
///
/// assert!(Door::Closed.is_resting());
/// assert!(!Door::Opening.is_resting());
/// ```
pub trait Phase: Clone + PartialEq + Debug + Serialize + DeserializeOwned {
    /// Name used in logs and history dumps.
    fn name(&self) -> &str;

    /// Whether the component accepts new input in this phase.
    ///
    /// Non-resting phases belong to an animation in flight; input that would
    /// start another sequence is dropped while one is running.
    ///
    /// Default implementation returns `false`.
    fn is_resting(&self) -> bool {
        false
    }
}
