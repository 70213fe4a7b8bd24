//! Mount/unmount controller and the process-wide state components share.
//!
//! - [`Scope`]: one component's mounted lifetime and its cancel closures
//! - [`Signal`]: multicast event source
//! - [`Ticker`]: shared frame hook, installed by the first subscriber
//! - [`TimerQueue`]: deferred callbacks with never-reused ids
//! - [`Theme`], [`ThemeOverlay`]: light/dark flag and its change overlay

mod scope;
mod signal;
mod theme;
mod ticker;
mod timers;

pub use scope::{Lifecycle, RegistrationId, Scope, ScopeId};
pub use signal::{Signal, SubscriptionId, WeakSignal};
pub use theme::{Theme, ThemeMode, ThemeOverlay};
pub use ticker::{Frame, FrameSource, SmoothScroll, Ticker};
pub use timers::{TimerId, TimerQueue};
