//! Navigation menu: hover pill, dropdowns and their closing rules.

use crate::config::NavConfig;
use crate::lifecycle::{Lifecycle, Scope, Signal, TimerId, TimerQueue};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Entry of the navigation bar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavItem {
    /// Navigates straight to `path`.
    Simple { title: String, path: String },
    /// Opens a dropdown listing `subitems`.
    Expandable { title: String, subitems: Vec<String> },
}

impl NavItem {
    pub fn simple(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Simple {
            title: title.into(),
            path: path.into(),
        }
    }

    pub fn expandable<I, S>(title: impl Into<String>, subitems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Expandable {
            title: title.into(),
            subitems: subitems.into_iter().map(Into::into).collect(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Simple { title, .. } | Self::Expandable { title, .. } => title,
        }
    }
}

/// Position of the floating highlight behind the hovered item, relative to
/// the item container.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pill {
    pub left: f64,
    pub width: f64,
}

/// Result of clicking a navigation item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavClick {
    /// Simple item: everything closed, follow the path.
    Navigate(String),
    /// Expandable item: dropdown opened or closed.
    Toggled { open: bool },
    /// No item with that title.
    Unknown,
}

#[derive(Default)]
struct MenuState {
    hovered: Option<String>,
    dropdown: Option<Vec<String>>,
    pill: Option<Pill>,
    pill_timer: Option<TimerId>,
}

struct MenuInner {
    items: Vec<NavItem>,
    timers: TimerQueue,
    routes: Signal<String>,
    pill_hide_delay: f64,
    state: RefCell<MenuState>,
}

/// Hover and dropdown state of the navigation bar. Clones share state.
#[derive(Clone)]
pub struct NavMenu {
    inner: Rc<MenuInner>,
}

impl NavMenu {
    /// `routes` carries every route change; each one closes the menu.
    pub fn new(
        items: Vec<NavItem>,
        timers: TimerQueue,
        routes: Signal<String>,
        config: &NavConfig,
    ) -> Self {
        Self {
            inner: Rc::new(MenuInner {
                items,
                timers,
                routes,
                pill_hide_delay: config.pill_hide_delay,
                state: RefCell::new(MenuState::default()),
            }),
        }
    }

    pub fn items(&self) -> &[NavItem] {
        &self.inner.items
    }

    pub fn hovered(&self) -> Option<String> {
        self.inner.state.borrow().hovered.clone()
    }

    pub fn dropdown(&self) -> Option<Vec<String>> {
        self.inner.state.borrow().dropdown.clone()
    }

    pub fn pill(&self) -> Option<Pill> {
        self.inner.state.borrow().pill
    }

    pub fn is_open(&self) -> bool {
        let state = self.inner.state.borrow();
        state.hovered.is_some() || state.dropdown.is_some() || state.pill.is_some()
    }

    /// Pointer entered the item `title`, laid out at `item_left` with
    /// `item_width` inside a container starting at `container_left`.
    pub fn hover(&self, title: &str, item_left: f64, item_width: f64, container_left: f64) {
        let Some(item) = self.find(title) else {
            return;
        };
        let dropdown = match item {
            NavItem::Expandable { subitems, .. } => Some(subitems.clone()),
            NavItem::Simple { .. } => None,
        };
        let mut state = self.inner.state.borrow_mut();
        state.hovered = Some(title.to_string());
        state.pill = Some(Pill {
            left: item_left - container_left,
            width: item_width,
        });
        state.dropdown = dropdown;
    }

    /// Pointer left an item: hide the pill shortly after, unless another
    /// item is hovered by then.
    pub fn item_leave(&self) {
        let weak: Weak<MenuInner> = Rc::downgrade(&self.inner);
        let id = self.inner.timers.schedule(self.inner.pill_hide_delay, move || {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.borrow_mut();
                state.pill_timer = None;
                if state.hovered.is_none() {
                    state.pill = None;
                }
            }
        });
        let previous = self.inner.state.borrow_mut().pill_timer.replace(id);
        if let Some(previous) = previous {
            self.inner.timers.cancel(previous);
        }
    }

    pub fn nav_leave(&self) {
        self.close_all();
    }

    pub fn outside_click(&self) {
        self.close_all();
    }

    pub fn route_changed(&self) {
        self.close_all();
    }

    pub fn click(&self, title: &str) -> NavClick {
        match self.find(title) {
            None => NavClick::Unknown,
            Some(NavItem::Simple { path, .. }) => {
                let path = path.clone();
                self.close_all();
                NavClick::Navigate(path)
            }
            Some(NavItem::Expandable { subitems, .. }) => {
                let already_open = self.hovered().as_deref() == Some(title);
                if already_open {
                    self.close_all();
                    NavClick::Toggled { open: false }
                } else {
                    let subitems = subitems.clone();
                    let mut state = self.inner.state.borrow_mut();
                    state.hovered = Some(title.to_string());
                    state.dropdown = Some(subitems);
                    state.pill.get_or_insert_with(Pill::default);
                    NavClick::Toggled { open: true }
                }
            }
        }
    }

    /// Clear the hovered item, dropdown and pill.
    pub fn close_all(&self) {
        let timer = {
            let mut state = self.inner.state.borrow_mut();
            let timer = state.pill_timer.take();
            *state = MenuState::default();
            timer
        };
        if let Some(id) = timer {
            self.inner.timers.cancel(id);
        }
    }

    fn find(&self, title: &str) -> Option<&NavItem> {
        self.inner.items.iter().find(|item| item.title() == title)
    }
}

impl Lifecycle for NavMenu {
    fn activate(&self, scope: &mut Scope) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.routes.subscribe_in(scope, move |_| {
            if let Some(inner) = weak.upgrade() {
                NavMenu { inner }.route_changed();
            }
        });

        let menu = self.clone();
        scope.register(move || menu.close_all());
    }
}

impl fmt::Debug for NavMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavMenu")
            .field("items", &self.inner.items)
            .field("hovered", &self.hovered())
            .finish()
    }
}
