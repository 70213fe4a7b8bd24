//! Pinned work showcase.
//!
//! One section carries three scroll-driven pieces. The background fades in
//! while the section arrives. Once the section reaches the top it stays
//! pinned for `panels + pause` viewport heights, and a scrubbed timeline
//! slides each image panel up over the previous one. The title list follows
//! whichever panel covers the middle of the frame.

use super::binding::{ScrollBinding, UpdateOutcome};
use super::region::{ElementBox, ResolvedRegion, TriggerParseError};
use crate::anim::{
    AnimationTimeline, Ease, Host, Playback, Property, Props, TargetId, TimelineHandle, TweenStep,
};
use crate::config::ShowcaseConfig;
use crate::lifecycle::{Lifecycle, Scope, Signal, SubscriptionId};
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

/// Where a title sits relative to the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TitleSlot {
    Current,
    Prev,
    Next,
    /// Two or more before the current title.
    Over,
    /// Two or more after the current title.
    NotOver,
}

impl TitleSlot {
    pub fn of(index: usize, current: usize) -> Self {
        match index.cmp(&current) {
            Ordering::Equal => Self::Current,
            Ordering::Less if index + 1 == current => Self::Prev,
            Ordering::Less => Self::Over,
            Ordering::Greater if index == current + 1 => Self::Next,
            Ordering::Greater => Self::NotOver,
        }
    }

    /// Offset, scale and opacity a title shows in this slot.
    pub fn props(self) -> Props {
        let (y, scale, opacity) = match self {
            Self::Current => (0.0, 1.0, 1.0),
            Self::Prev => (-70.0, 0.6, 0.6),
            Self::Next => (70.0, 0.6, 0.6),
            Self::Over => (-140.0, 0.5, 0.0),
            Self::NotOver => (140.0, 0.5, 0.0),
        };
        Props::new()
            .with(Property::Y, y)
            .with(Property::Scale, scale)
            .with(Property::Opacity, opacity)
    }
}

/// Panel covering the middle of the frame at timeline time `position`.
///
/// Panel `i` starts sliding at `(i - 1) * panel_duration` and takes over once
/// it is half way up.
pub fn panel_index(position: f64, panels: usize, panel_duration: f64) -> usize {
    (1..panels)
        .take_while(|&i| position >= (i as f64 - 1.0) * panel_duration + panel_duration / 2.0)
        .count()
}

struct Entry {
    panel: TargetId,
    image: TargetId,
    title: TargetId,
}

#[derive(Default)]
struct ShowcaseState {
    section: Option<TargetId>,
    background: Option<TargetId>,
    entries: Vec<Entry>,
    current: usize,
    fade: Option<TimelineHandle>,
    slides: Option<TimelineHandle>,
    titles: Option<TimelineHandle>,
    mounted: bool,
}

struct ShowcaseInner {
    host: Rc<dyn Host>,
    scroll: Signal<f64>,
    items: Vec<String>,
    layout: ElementBox,
    viewport_height: f64,
    initial_scroll: Cell<f64>,
    config: ShowcaseConfig,
    slides_total: Cell<f64>,
    fade_binding: RefCell<Option<ScrollBinding>>,
    pin_binding: RefCell<Option<ScrollBinding>>,
    moved_to: Cell<Option<usize>>,
    changes: Signal<usize>,
    state: RefCell<ShowcaseState>,
}

/// Scroll-pinned carousel of work items with a following title list.
#[derive(Clone)]
pub struct Showcase {
    inner: Rc<ShowcaseInner>,
}

impl Showcase {
    /// Fails if a configured trigger point cannot be parsed.
    pub fn new<I, S>(
        host: Rc<dyn Host>,
        scroll: Signal<f64>,
        items: I,
        layout: ElementBox,
        viewport_height: f64,
        config: ShowcaseConfig,
    ) -> Result<Self, TriggerParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        config.fade_region()?;
        config.pin_point()?;
        Ok(Self {
            inner: Rc::new(ShowcaseInner {
                host,
                scroll,
                items: items.into_iter().map(Into::into).collect(),
                layout,
                viewport_height,
                initial_scroll: Cell::new(0.0),
                config,
                slides_total: Cell::new(0.0),
                fade_binding: RefCell::new(None),
                pin_binding: RefCell::new(None),
                moved_to: Cell::new(None),
                changes: Signal::new(),
                state: RefCell::new(ShowcaseState::default()),
            }),
        })
    }

    pub fn starting_at(self, scroll: f64) -> Self {
        self.inner.initial_scroll.set(scroll);
        self
    }

    /// Index of the item currently in front.
    pub fn current(&self) -> usize {
        self.inner.state.borrow().current
    }

    /// Route of the item currently in front.
    pub fn current_link(&self) -> Option<String> {
        let title = self.inner.items.get(self.current())?;
        Some(format!("{}{}", self.inner.config.link_prefix, title.to_lowercase()))
    }

    pub fn background(&self) -> Option<TargetId> {
        self.inner.state.borrow().background
    }

    pub fn panels(&self) -> Vec<TargetId> {
        self.inner.state.borrow().entries.iter().map(|e| e.panel).collect()
    }

    pub fn images(&self) -> Vec<TargetId> {
        self.inner.state.borrow().entries.iter().map(|e| e.image).collect()
    }

    pub fn titles(&self) -> Vec<TargetId> {
        self.inner.state.borrow().entries.iter().map(|e| e.title).collect()
    }

    /// Scroll range the section stays pinned for.
    pub fn pinned_region(&self) -> Option<ResolvedRegion> {
        self.inner.pinned_region()
    }

    /// Listen for changes of the front item while `scope` is mounted.
    pub fn on_index<F>(&self, scope: &mut Scope, handler: F) -> SubscriptionId
    where
        F: FnMut(&usize) + 'static,
    {
        self.inner.changes.subscribe_in(scope, handler)
    }

    pub fn scroll_to(&self, scroll: f64) -> UpdateOutcome {
        self.inner.scroll_to(scroll)
    }
}

impl ShowcaseInner {
    fn pinned_region(&self) -> Option<ResolvedRegion> {
        let start = self
            .config
            .pin_point()
            .ok()?
            .scroll_offset(self.layout, self.viewport_height);
        let span = (self.items.len() as f64 + self.config.pause) * self.viewport_height;
        Some(ResolvedRegion {
            start,
            end: start + span,
        })
    }

    fn scroll_to(&self, scroll: f64) -> UpdateOutcome {
        if let Some(binding) = self.fade_binding.borrow_mut().as_mut() {
            binding.scroll_to(scroll);
        }
        let outcome = match self.pin_binding.borrow_mut().as_mut() {
            Some(binding) => binding.scroll_to(scroll),
            None => UpdateOutcome::Inactive,
        };
        if let Some(index) = self.moved_to.take() {
            self.changes.emit(&index);
        }
        outcome
    }

    /// Track the front panel for pinned progress `progress`.
    fn follow(&self, progress: f64) {
        let position = progress * self.slides_total.get();
        let index = panel_index(position, self.items.len(), self.config.panel_duration);
        {
            let mut state = self.state.borrow_mut();
            if !state.mounted || state.current == index {
                return;
            }
            state.current = index;
        }
        tracing::debug!(index, "showcase front item changed");
        self.play_titles(index);
        self.moved_to.set(Some(index));
    }

    fn play_titles(&self, current: usize) {
        let (titles, previous) = {
            let mut state = self.state.borrow_mut();
            let titles: Vec<TargetId> = state.entries.iter().map(|e| e.title).collect();
            (titles, state.titles.take())
        };
        if let Some(handle) = previous {
            self.host.cancel(handle);
        }

        let mut timeline = AnimationTimeline::labeled("showcase-titles");
        for (i, title) in titles.into_iter().enumerate() {
            let mut step = TweenStep::new(
                vec![title],
                TitleSlot::of(i, current).props(),
                self.config.title_duration,
            );
            step.ease = self.config.title_ease;
            timeline.push(step);
        }
        let handle = self.host.play(timeline, Playback::Once, None);
        self.state.borrow_mut().titles = Some(handle);
    }

    fn build(&self) -> (TargetId, TargetId) {
        let section = self.host.spawn("showcase");
        let background = self.host.spawn("showcase-background");
        let entries: Vec<Entry> = self
            .items
            .iter()
            .map(|_| Entry {
                panel: self.host.spawn("showcase-panel"),
                image: self.host.spawn("showcase-image"),
                title: self.host.spawn("showcase-title"),
            })
            .collect();

        if let Some(first) = entries.first() {
            self.host
                .set(&[first.panel], &Props::new().with(Property::YPercent, 0.0));
        }
        for (i, entry) in entries.iter().enumerate() {
            self.host.set(&[entry.title], &TitleSlot::of(i, 0).props());
        }

        *self.state.borrow_mut() = ShowcaseState {
            section: Some(section),
            background: Some(background),
            entries,
            mounted: true,
            ..ShowcaseState::default()
        };
        (section, background)
    }

    fn fade_timeline(&self, background: TargetId) -> AnimationTimeline {
        let mut step = TweenStep::new(
            vec![background],
            Props::new().with(Property::Opacity, 1.0),
            1.0,
        );
        step.from = Some(Props::new().with(Property::Opacity, 0.0));
        step.ease = Ease::None;
        AnimationTimeline::labeled("showcase-fade").then(step)
    }

    fn slides_timeline(&self) -> AnimationTimeline {
        let config = &self.config;
        let mut timeline = AnimationTimeline::labeled("showcase-panels");
        let state = self.state.borrow();
        for (i, entry) in state.entries.iter().enumerate().skip(1) {
            let at = (i as f64 - 1.0) * config.panel_duration;

            let mut panel = TweenStep::new(
                vec![entry.panel],
                Props::new().with(Property::YPercent, 0.0),
                config.panel_duration,
            );
            panel.from = Some(Props::new().with(Property::YPercent, 100.0));
            panel.ease = config.panel_ease;
            panel.offset = at;
            timeline.push(panel);

            let mut image = TweenStep::new(
                vec![entry.image],
                Props::new()
                    .with(Property::Y, 0.0)
                    .with(Property::Scale, config.image_scale),
                config.panel_duration - config.image_lead,
            );
            image.from = Some(
                Props::new()
                    .with(Property::Y, config.image_from_y)
                    .with(Property::Scale, 1.0),
            );
            image.ease = config.image_ease;
            image.offset = at;
            timeline.push(image);
        }
        // Hold on the last panel before the section unpins.
        timeline.then(TweenStep::new(Vec::new(), Props::new(), config.pause))
    }

    fn teardown(&self) {
        for binding in [&self.fade_binding, &self.pin_binding] {
            if let Some(binding) = binding.borrow_mut().as_mut() {
                binding.deactivate();
            }
        }
        let state = std::mem::take(&mut *self.state.borrow_mut());
        for handle in [state.fade, state.slides, state.titles].into_iter().flatten() {
            self.host.cancel(handle);
        }
        for entry in &state.entries {
            self.host.remove(entry.title);
            self.host.remove(entry.image);
            self.host.remove(entry.panel);
        }
        for target in [state.background, state.section].into_iter().flatten() {
            self.host.remove(target);
        }
        tracing::debug!(items = state.entries.len(), "showcase unmounted");
    }
}

impl Lifecycle for Showcase {
    fn activate(&self, scope: &mut Scope) {
        let inner = &self.inner;
        let (fade_region, pinned) = match (inner.config.fade_region(), inner.pinned_region()) {
            (Ok(region), Some(pinned)) => (
                region.resolve(inner.layout, inner.viewport_height),
                pinned,
            ),
            _ => {
                tracing::warn!("showcase regions rejected after construction");
                return;
            }
        };
        let (section, background) = inner.build();

        let fade = inner
            .host
            .play(inner.fade_timeline(background), Playback::Scrubbed, None);
        let slides_timeline = inner.slides_timeline();
        inner.slides_total.set(slides_timeline.total_duration());
        let slides = inner.host.play(slides_timeline, Playback::Scrubbed, None);
        {
            let mut state = inner.state.borrow_mut();
            state.fade = Some(fade);
            state.slides = Some(slides);
        }

        let host = Rc::clone(&inner.host);
        *inner.fade_binding.borrow_mut() = Some(
            ScrollBinding::new(Rc::clone(&inner.host), background, move |update| {
                host.seek(fade, update.progress);
            })
            .with_region(fade_region),
        );

        let host = Rc::clone(&inner.host);
        let weak: Weak<ShowcaseInner> = Rc::downgrade(inner);
        *inner.pin_binding.borrow_mut() = Some(
            ScrollBinding::new(Rc::clone(&inner.host), section, move |update| {
                host.seek(slides, update.progress);
                if let Some(inner) = weak.upgrade() {
                    inner.follow(update.progress);
                }
            })
            .with_region(pinned),
        );

        inner.scroll_to(inner.initial_scroll.get());
        tracing::debug!(items = inner.items.len(), "showcase mounted");

        let weak = Rc::downgrade(inner);
        inner.scroll.subscribe_in(scope, move |&scroll| {
            if let Some(inner) = weak.upgrade() {
                inner.scroll_to(scroll);
            }
        });

        let owned = Rc::clone(inner);
        scope.register(move || owned.teardown());
    }
}

impl fmt::Debug for Showcase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Showcase")
            .field("items", &self.inner.items)
            .field("current", &self.current())
            .finish()
    }
}
