//! Right-click context menu with staggered entrance and exit.

use crate::anim::{
    AnimationTimeline, Host, Playback, Property, Props, Rgba, TargetId, TimelineHandle, TweenStep,
};
use crate::config::MenuConfig;
use crate::core::{PhaseChange, PhaseHistory, DEFAULT_HISTORY_LIMIT};
use crate::lifecycle::{Lifecycle, Scope, Signal, SubscriptionId, Theme, ThemeMode};
use crate::phase_enum;
use crate::trigger::{HoverBinding, UpdateOutcome};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

const MENU_Z: f64 = 9999.0;

phase_enum! {
    /// Visibility of the context menu.
    pub enum MenuPhase {
        Hidden,
        Entering,
        Open,
        Exiting,
    }
    resting: [Hidden, Open]
}

impl MenuPhase {
    /// Whether the menu element exists.
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// What a menu item does when selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuAction {
    Refresh,
    ToggleTheme,
    Close,
}

impl MenuAction {
    /// Item label under `theme`. The theme item names the mode it switches to.
    pub fn label(self, theme: ThemeMode) -> &'static str {
        match self {
            Self::Refresh => "Refresh",
            Self::ToggleTheme if theme.is_dark() => "Light Mode",
            Self::ToggleTheme => "Dark Mode",
            Self::Close => "Close",
        }
    }

    pub fn defaults() -> Vec<MenuAction> {
        vec![Self::Refresh, Self::ToggleTheme, Self::Close]
    }
}

struct Item {
    action: MenuAction,
    target: TargetId,
    icon: TargetId,
    label: String,
    hover: HoverBinding,
}

#[derive(Default)]
struct MenuState {
    phase: MenuPhase,
    history: PhaseHistory<MenuPhase>,
    menu: Option<TargetId>,
    items: Vec<Item>,
    position: (f64, f64),
    running: Option<TimelineHandle>,
    generation: u64,
    sequence: u64,
    mounted: bool,
}

impl Default for MenuPhase {
    fn default() -> Self {
        Self::Hidden
    }
}

struct ContextInner {
    host: Rc<dyn Host>,
    theme: Theme,
    actions: Vec<MenuAction>,
    config: MenuConfig,
    selected: Signal<MenuAction>,
    state: RefCell<MenuState>,
}

/// Context menu opened at the pointer and dismissed by the next click.
#[derive(Clone)]
pub struct ContextMenu {
    inner: Rc<ContextInner>,
}

impl ContextMenu {
    /// Menu with the default Refresh, theme toggle and Close items.
    pub fn new(host: Rc<dyn Host>, theme: Theme, config: MenuConfig) -> Self {
        Self::with_actions(host, theme, config, MenuAction::defaults())
    }

    /// Menu with a custom item list. Use
    /// [`ContextMenuBuilder`](crate::builder::ContextMenuBuilder) to reject an
    /// empty list up front.
    pub fn with_actions(
        host: Rc<dyn Host>,
        theme: Theme,
        config: MenuConfig,
        actions: Vec<MenuAction>,
    ) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                host,
                theme,
                actions,
                config,
                selected: Signal::new(),
                state: RefCell::new(MenuState {
                    history: PhaseHistory::bounded(DEFAULT_HISTORY_LIMIT),
                    ..MenuState::default()
                }),
            }),
        }
    }

    pub fn phase(&self) -> MenuPhase {
        self.inner.state.borrow().phase
    }

    pub fn history(&self) -> PhaseHistory<MenuPhase> {
        self.inner.state.borrow().history.clone()
    }

    /// The menu element while it exists.
    pub fn element(&self) -> Option<TargetId> {
        self.inner.state.borrow().menu
    }

    pub fn position(&self) -> (f64, f64) {
        self.inner.state.borrow().position
    }

    pub fn items(&self) -> Vec<(MenuAction, TargetId)> {
        self.inner
            .state
            .borrow()
            .items
            .iter()
            .map(|item| (item.action, item.target))
            .collect()
    }

    pub fn icons(&self) -> Vec<TargetId> {
        self.inner.state.borrow().items.iter().map(|i| i.icon).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .items
            .iter()
            .map(|item| item.label.clone())
            .collect()
    }

    /// Listen for selected items while `scope` is mounted.
    pub fn on_select<F>(&self, scope: &mut Scope, handler: F) -> SubscriptionId
    where
        F: FnMut(&MenuAction) + 'static,
    {
        self.inner.selected.subscribe_in(scope, handler)
    }

    /// Show the menu at the pointer, or move it there and replay the
    /// entrance if it is already showing.
    pub fn open_at(&self, x: f64, y: f64) {
        self.inner.open_at(x, y);
    }

    /// A click anywhere in the document dismisses the menu.
    pub fn document_click(&self) -> bool {
        self.inner.dismiss()
    }

    /// Run the item's action. The click then bubbles up and dismisses the
    /// menu like any other document click.
    pub fn select(&self, action: MenuAction) -> bool {
        let present = self
            .inner
            .state
            .borrow()
            .items
            .iter()
            .any(|item| item.action == action);
        if !present || !self.phase().is_visible() {
            return false;
        }
        tracing::debug!(?action, "menu item selected");
        if action == MenuAction::ToggleTheme {
            self.inner.theme.toggle();
        }
        self.inner.selected.emit(&action);
        self.inner.dismiss();
        true
    }

    pub fn pointer_enter(&self, action: MenuAction) -> UpdateOutcome {
        self.inner.hover(action, true)
    }

    pub fn pointer_leave(&self, action: MenuAction) -> UpdateOutcome {
        self.inner.hover(action, false)
    }
}

impl ContextInner {
    fn enter(&self, next: MenuPhase) {
        let from = {
            let mut state = self.state.borrow_mut();
            let from = state.phase;
            let change = PhaseChange {
                from,
                to: next,
                timestamp: Utc::now(),
                sequence: state.sequence,
            };
            state.history.push(change);
            state.phase = next;
            from
        };
        tracing::debug!(%from, to = %next, "context menu phase changed");
    }

    fn open_at(self: &Rc<Self>, x: f64, y: f64) {
        let (mounted, existing) = {
            let state = self.state.borrow();
            (state.mounted, state.menu)
        };
        if !mounted {
            tracing::trace!("context menu opened while unmounted");
            return;
        }

        let menu = match existing {
            Some(menu) => menu,
            None => self.spawn(),
        };
        self.host.set(
            &[menu],
            &Props::new()
                .with(Property::X, x)
                .with(Property::Y, y)
                .with(Property::ZIndex, MENU_Z),
        );
        {
            let mut state = self.state.borrow_mut();
            state.position = (x, y);
            state.sequence += 1;
        }
        self.enter(MenuPhase::Entering);
        self.play_entrance();
    }

    fn spawn(&self) -> TargetId {
        let menu = self.host.spawn("context-menu");
        let mode = self.theme.mode();
        let items: Vec<Item> = self
            .actions
            .iter()
            .map(|&action| {
                let target = self.host.spawn("menu-item");
                let icon = self.host.spawn("menu-icon");
                let hover = HoverBinding::new(
                    Rc::clone(&self.host),
                    target,
                    Props::new().with(Property::BackgroundColor, self.config.hover_background),
                    Props::new().with(Property::BackgroundColor, Rgba::TRANSPARENT),
                )
                .duration(self.config.hover_duration);
                Item {
                    action,
                    target,
                    icon,
                    label: action.label(mode).to_string(),
                    hover,
                }
            })
            .collect();
        let mut state = self.state.borrow_mut();
        state.menu = Some(menu);
        state.items = items;
        menu
    }

    fn targets(&self) -> (Vec<TargetId>, Vec<TargetId>) {
        let state = self.state.borrow();
        (
            state.items.iter().map(|i| i.target).collect(),
            state.items.iter().map(|i| i.icon).collect(),
        )
    }

    fn play_entrance(self: &Rc<Self>) {
        let (items, icons) = self.targets();
        let c = &self.config;

        let mut slide = TweenStep::new(
            items,
            Props::new().with(Property::Y, 0.0).with(Property::Opacity, 1.0),
            c.enter_duration,
        );
        slide.from = Some(
            Props::new()
                .with(Property::Y, c.enter_from_y)
                .with(Property::Opacity, 0.0),
        );
        slide.stagger = c.enter_stagger;
        slide.ease = c.enter_ease;

        let mut spin = TweenStep::new(
            icons,
            Props::new().with(Property::Rotate, 0.0),
            c.enter_duration,
        );
        spin.from = Some(Props::new().with(Property::Rotate, c.icon_from_rotate));
        spin.ease = c.enter_ease;

        let mut timeline = AnimationTimeline::labeled("menu-enter");
        timeline.push(slide);
        timeline.push(spin);
        self.play(timeline, Self::entrance_done);
    }

    fn entrance_done(&self, generation: u64) {
        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation || state.phase != MenuPhase::Entering {
                return;
            }
            state.running = None;
        }
        self.enter(MenuPhase::Open);
    }

    fn dismiss(self: &Rc<Self>) -> bool {
        let phase = self.state.borrow().phase;
        if !matches!(phase, MenuPhase::Entering | MenuPhase::Open) {
            tracing::trace!(%phase, "document click ignored by context menu");
            return false;
        }
        self.enter(MenuPhase::Exiting);

        let (items, _) = self.targets();
        let c = &self.config;
        let mut fade = TweenStep::new(
            items,
            Props::new()
                .with(Property::Y, c.exit_to_y)
                .with(Property::Opacity, 0.0),
            c.exit_duration,
        );
        fade.stagger = c.exit_stagger;
        fade.ease = c.exit_ease;
        self.play(
            AnimationTimeline::labeled("menu-exit").then(fade),
            Self::exit_done,
        );
        true
    }

    fn exit_done(&self, generation: u64) {
        let removed = {
            let mut state = self.state.borrow_mut();
            if state.generation != generation || state.phase != MenuPhase::Exiting {
                return;
            }
            state.running = None;
            Self::detach(&mut state)
        };
        self.remove(removed);
        self.enter(MenuPhase::Hidden);
    }

    /// Start `timeline`, replacing whatever was running. `done` runs on
    /// completion unless another timeline started in the meantime.
    fn play(self: &Rc<Self>, timeline: AnimationTimeline, done: fn(&ContextInner, u64)) {
        let (previous, generation) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            (state.running.take(), state.generation)
        };
        if let Some(handle) = previous {
            self.host.cancel(handle);
        }
        let weak = Rc::downgrade(self);
        let handle = self.host.play(
            timeline,
            Playback::Once,
            Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    done(&inner, generation);
                }
            })),
        );
        self.state.borrow_mut().running = Some(handle);
    }

    fn hover(&self, action: MenuAction, hovered: bool) -> UpdateOutcome {
        let mut state = self.state.borrow_mut();
        let Some(item) = state.items.iter_mut().find(|i| i.action == action) else {
            return UpdateOutcome::Inactive;
        };
        if hovered {
            item.hover.pointer_enter()
        } else {
            item.hover.pointer_leave()
        }
    }

    fn relabel(&self, mode: ThemeMode) {
        let mut state = self.state.borrow_mut();
        for item in &mut state.items {
            item.label = item.action.label(mode).to_string();
        }
    }

    /// Take every element out of `state`, stopping their hover tweens.
    fn detach(state: &mut MenuState) -> Vec<TargetId> {
        let mut removed = Vec::new();
        for mut item in state.items.drain(..) {
            item.hover.cancel();
            removed.push(item.icon);
            removed.push(item.target);
        }
        removed.extend(state.menu.take());
        removed
    }

    fn remove(&self, targets: Vec<TargetId>) {
        for target in targets {
            self.host.remove(target);
        }
    }

    fn teardown(&self) {
        let (running, removed) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.mounted = false;
            state.phase = MenuPhase::Hidden;
            (state.running.take(), Self::detach(&mut state))
        };
        if let Some(handle) = running {
            self.host.cancel(handle);
        }
        self.remove(removed);
    }
}

impl Lifecycle for ContextMenu {
    fn activate(&self, scope: &mut Scope) {
        self.inner.state.borrow_mut().mounted = true;

        let weak = Rc::downgrade(&self.inner);
        self.inner.theme.on_change(scope, move |&mode| {
            if let Some(inner) = weak.upgrade() {
                inner.relabel(mode);
            }
        });

        let inner = Rc::clone(&self.inner);
        scope.register(move || inner.teardown());
    }
}

impl fmt::Debug for ContextMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ContextMenu")
            .field("phase", &state.phase)
            .field("menu", &state.menu)
            .field("position", &state.position)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{HeadlessEngine, Stage};

    fn mounted() -> (Rc<HeadlessEngine>, Theme, ContextMenu, Scope) {
        let engine = Rc::new(HeadlessEngine::new());
        let theme = Theme::default();
        let menu = ContextMenu::new(engine.clone(), theme.clone(), MenuConfig::default());
        let mut scope = Scope::new("menu");
        scope.mount(&menu);
        (engine, theme, menu, scope)
    }

    #[test]
    fn open_shows_items_from_their_start_state() {
        let (engine, _theme, menu, _scope) = mounted();
        menu.open_at(120.0, 240.0);
        assert_eq!(menu.phase(), MenuPhase::Entering);

        let element = menu.element().unwrap();
        assert_eq!(engine.number(element, Property::X), Some(120.0));
        assert_eq!(engine.number(element, Property::Y), Some(240.0));
        let (first, second) = (menu.items()[0].1, menu.items()[1].1);
        assert_eq!(engine.number(first, Property::Opacity), Some(0.0));
        assert_eq!(engine.number(second, Property::Y), Some(-20.0));
        assert_eq!(engine.number(menu.icons()[0], Property::Rotate), Some(-90.0));

        engine.settle(5.0);
        assert_eq!(menu.phase(), MenuPhase::Open);
        assert_eq!(engine.number(first, Property::Opacity), Some(1.0));
        assert_eq!(engine.number(menu.icons()[2], Property::Rotate), Some(0.0));
    }

    #[test]
    fn document_click_exits_and_removes_once() {
        let (engine, _theme, menu, mut scope) = mounted();
        menu.open_at(10.0, 10.0);
        engine.settle(5.0);
        let element = menu.element().unwrap();

        assert!(menu.document_click());
        assert_eq!(menu.phase(), MenuPhase::Exiting);
        assert!(!menu.document_click());
        engine.settle(5.0);

        assert_eq!(menu.phase(), MenuPhase::Hidden);
        assert_eq!(menu.element(), None);
        assert_eq!(engine.removals_of(element), 1);
        scope.unmount();
        assert_eq!(engine.removals_of(element), 1);
    }

    #[test]
    fn reopen_while_visible_repositions() {
        let (engine, _theme, menu, _scope) = mounted();
        menu.open_at(10.0, 10.0);
        engine.advance(0.1);
        let element = menu.element().unwrap();
        menu.open_at(300.0, 50.0);

        assert_eq!(menu.element(), Some(element));
        assert_eq!(engine.attached_with_role("context-menu").len(), 1);
        assert_eq!(engine.number(element, Property::X), Some(300.0));
        assert_eq!(menu.phase(), MenuPhase::Entering);
        engine.settle(5.0);
        assert_eq!(menu.phase(), MenuPhase::Open);
    }

    #[test]
    fn reopen_during_exit_keeps_the_element() {
        let (engine, _theme, menu, _scope) = mounted();
        menu.open_at(10.0, 10.0);
        engine.settle(5.0);
        menu.document_click();
        engine.advance(0.1);
        let element = menu.element().unwrap();
        menu.open_at(20.0, 20.0);
        engine.settle(5.0);

        assert_eq!(menu.phase(), MenuPhase::Open);
        assert_eq!(engine.removals_of(element), 0);
    }

    #[test]
    fn theme_item_toggles_and_relabels() {
        let (engine, theme, menu, _scope) = mounted();
        menu.open_at(0.0, 0.0);
        assert_eq!(menu.labels()[1], "Dark Mode");

        assert!(menu.select(MenuAction::ToggleTheme));
        assert_eq!(theme.mode(), ThemeMode::Dark);
        assert_eq!(menu.labels()[1], "Light Mode");
        assert_eq!(menu.phase(), MenuPhase::Exiting);
        engine.settle(5.0);
        assert_eq!(menu.phase(), MenuPhase::Hidden);
    }

    #[test]
    fn hover_tints_the_item() {
        let (engine, _theme, menu, _scope) = mounted();
        menu.open_at(0.0, 0.0);
        let target = menu.items()[0].1;
        menu.pointer_enter(MenuAction::Refresh);
        engine.settle(5.0);
        assert_eq!(
            engine.value(target, Property::BackgroundColor),
            Some(MenuConfig::default().hover_background.into())
        );
        menu.pointer_leave(MenuAction::Refresh);
        engine.settle(5.0);
        assert_eq!(
            engine.value(target, Property::BackgroundColor),
            Some(Rgba::TRANSPARENT.into())
        );
    }

    #[test]
    fn unmount_mid_entrance_removes_everything() {
        let (engine, _theme, menu, mut scope) = mounted();
        menu.open_at(0.0, 0.0);
        let element = menu.element().unwrap();
        let items = menu.items();
        engine.advance(0.1);
        scope.unmount();

        assert_eq!(engine.active_timelines(), 0);
        assert_eq!(engine.removals_of(element), 1);
        for (_, target) in items {
            assert_eq!(engine.removals_of(target), 1);
        }
        engine.settle(5.0);
        assert_eq!(engine.detached_writes(), 0);
        menu.open_at(5.0, 5.0);
        assert_eq!(menu.element(), None);
    }
}
