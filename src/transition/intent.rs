//! Link clicks, navigation intents and the router seam.

use crate::lifecycle::Signal;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// Click on an anchor, as seen by the sequencer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkClick {
    pub href: String,
    default_prevented: bool,
}

impl LinkClick {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            default_prevented: false,
        }
    }

    /// Stop the browser from following the link itself.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A route change waiting for the cover animation to finish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntent {
    /// Normalised target path.
    pub path: String,
    /// The click that produced the intent.
    pub origin: LinkClick,
}

/// Path part of an internal link, without query or fragment.
///
/// Returns `None` for anything not rooted at `/`, including
/// protocol-relative `//host/...` links.
///
/// ```
/// use stagehand::transition::internal_path;
///
/// assert_eq!(internal_path("/work?tab=2#top").as_deref(), Some("/work"));
/// assert_eq!(internal_path("https://example.com/work"), None);
/// assert_eq!(internal_path("//cdn.example.com/a.png"), None);
/// ```
pub fn internal_path(href: &str) -> Option<String> {
    let href = href.trim();
    if !href.starts_with('/') || href.starts_with("//") {
        return None;
    }
    let end = href.find(['?', '#']).unwrap_or(href.len());
    Some(href[..end].to_string())
}

/// Routing collaborator.
pub trait Router {
    fn current_path(&self) -> String;

    /// Navigate to `path`.
    fn push(&self, path: &str);
}

/// Router that only remembers where it has been.
///
/// Every push is announced on [`MemoryRouter::changes`], which is what a
/// navigation menu listens to for closing itself.
pub struct MemoryRouter {
    visited: RefCell<Vec<String>>,
    changes: Signal<String>,
}

impl MemoryRouter {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            visited: RefCell::new(vec![start.into()]),
            changes: Signal::new(),
        }
    }

    /// Paths pushed since creation, oldest first.
    pub fn pushes(&self) -> Vec<String> {
        self.visited.borrow().iter().skip(1).cloned().collect()
    }

    pub fn changes(&self) -> Signal<String> {
        self.changes.clone()
    }
}

impl Router for MemoryRouter {
    fn current_path(&self) -> String {
        self.visited.borrow().last().cloned().unwrap_or_default()
    }

    fn push(&self, path: &str) {
        self.visited.borrow_mut().push(path.to_string());
        self.changes.emit(&path.to_string());
    }
}

impl fmt::Debug for MemoryRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRouter")
            .field("current", &self.current_path())
            .finish()
    }
}
