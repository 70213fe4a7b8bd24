//! Menus: the right-click context menu and the navigation bar's dropdowns.

mod context;
mod nav;

pub use context::{ContextMenu, MenuAction, MenuPhase};
pub use nav::{NavClick, NavItem, NavMenu, Pill};
