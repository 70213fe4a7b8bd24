//! Discrete actions fired when scroll crosses a region's edges.
//!
//! `"play none none reverse"` names the action for entering, leaving,
//! entering back and leaving back, in that order.

use super::region::ResolvedRegion;
use crate::anim::{AnimationEngine, AnimationTimeline, Host, Playback, TimelineHandle};
use crate::lifecycle::{Lifecycle, Scope, Signal};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Play,
    Pause,
    Resume,
    Reverse,
    Restart,
    Reset,
    Complete,
    None,
}

impl ToggleAction {
    /// Apply to a timeline held by `engine`.
    pub fn apply<E: AnimationEngine + ?Sized>(self, engine: &E, handle: TimelineHandle) {
        match self {
            Self::Play | Self::Resume => engine.resume(handle),
            Self::Pause => engine.pause(handle),
            Self::Reverse => engine.reverse(handle),
            Self::Restart => {
                engine.seek(handle, 0.0);
                engine.resume(handle);
            }
            Self::Reset => {
                engine.pause(handle);
                engine.seek(handle, 0.0);
            }
            Self::Complete => {
                engine.pause(handle);
                engine.seek(handle, 1.0);
            }
            Self::None => {}
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Reverse => "reverse",
            Self::Restart => "restart",
            Self::Reset => "reset",
            Self::Complete => "complete",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToggleParseError {
    #[error("toggle actions need exactly four keywords, got {0}")]
    Count(usize),

    #[error("unknown toggle action '{0}'")]
    Unknown(String),
}

impl FromStr for ToggleAction {
    type Err = ToggleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "reverse" => Ok(Self::Reverse),
            "restart" => Ok(Self::Restart),
            "reset" => Ok(Self::Reset),
            "complete" => Ok(Self::Complete),
            "none" => Ok(Self::None),
            other => Err(ToggleParseError::Unknown(other.to_string())),
        }
    }
}

/// Edge crossing of a scroll region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Crossing {
    /// Past the start, scrolling forward.
    Enter,
    /// Past the end, scrolling forward.
    Leave,
    /// Back over the end, scrolling in reverse.
    EnterBack,
    /// Back over the start, scrolling in reverse.
    LeaveBack,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToggleActions {
    pub enter: ToggleAction,
    pub leave: ToggleAction,
    pub enter_back: ToggleAction,
    pub leave_back: ToggleAction,
}

impl Default for ToggleActions {
    fn default() -> Self {
        Self {
            enter: ToggleAction::Play,
            leave: ToggleAction::None,
            enter_back: ToggleAction::None,
            leave_back: ToggleAction::None,
        }
    }
}

impl ToggleActions {
    pub fn action_for(&self, crossing: Crossing) -> ToggleAction {
        match crossing {
            Crossing::Enter => self.enter,
            Crossing::Leave => self.leave,
            Crossing::EnterBack => self.enter_back,
            Crossing::LeaveBack => self.leave_back,
        }
    }
}

impl FromStr for ToggleActions {
    type Err = ToggleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let [enter, leave, enter_back, leave_back] = words.as_slice() else {
            return Err(ToggleParseError::Count(words.len()));
        };
        Ok(Self {
            enter: enter.parse()?,
            leave: leave.parse()?,
            enter_back: enter_back.parse()?,
            leave_back: leave_back.parse()?,
        })
    }
}

impl TryFrom<String> for ToggleActions {
    type Error = ToggleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ToggleActions> for String {
    fn from(value: ToggleActions) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ToggleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.enter.keyword(),
            self.leave.keyword(),
            self.enter_back.keyword(),
            self.leave_back.keyword()
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Before,
    Inside,
    After,
}

impl Zone {
    fn of(region: &ResolvedRegion, scroll: f64) -> Self {
        if scroll < region.start {
            Self::Before
        } else if scroll > region.end {
            Self::After
        } else {
            Self::Inside
        }
    }
}

/// Crossings between two zones, in the order they happen.
fn crossings(from: Zone, to: Zone) -> &'static [Crossing] {
    use Crossing::*;
    match (from, to) {
        (Zone::Before, Zone::Inside) => &[Enter],
        (Zone::Before, Zone::After) => &[Enter, Leave],
        (Zone::Inside, Zone::After) => &[Leave],
        (Zone::After, Zone::Inside) => &[EnterBack],
        (Zone::After, Zone::Before) => &[EnterBack, LeaveBack],
        (Zone::Inside, Zone::Before) => &[LeaveBack],
        _ => &[],
    }
}

struct ToggleState {
    zone: Zone,
    handle: Option<TimelineHandle>,
}

struct ToggleInner {
    host: Rc<dyn Host>,
    scroll: Signal<f64>,
    region: ResolvedRegion,
    actions: ToggleActions,
    timeline: AnimationTimeline,
    initial_scroll: f64,
    state: RefCell<ToggleState>,
}

/// Timeline started, reversed or reset as scroll crosses a region.
///
/// On mount the timeline is handed to the engine paused at its start, so
/// explicit from-values show before the first scroll event.
#[derive(Clone)]
pub struct ToggleBinding {
    inner: Rc<ToggleInner>,
}

impl ToggleBinding {
    pub fn new(
        host: Rc<dyn Host>,
        scroll: Signal<f64>,
        region: ResolvedRegion,
        actions: ToggleActions,
        timeline: AnimationTimeline,
        initial_scroll: f64,
    ) -> Self {
        Self {
            inner: Rc::new(ToggleInner {
                host,
                scroll,
                region,
                actions,
                timeline,
                initial_scroll,
                state: RefCell::new(ToggleState {
                    zone: Zone::Before,
                    handle: None,
                }),
            }),
        }
    }

    pub fn handle(&self) -> Option<TimelineHandle> {
        self.inner.state.borrow().handle
    }

    /// Feed a scroll offset; returns the crossings it caused.
    pub fn scroll_to(&self, scroll: f64) -> Vec<Crossing> {
        self.inner.scroll_to(scroll)
    }
}

impl ToggleInner {
    fn scroll_to(&self, scroll: f64) -> Vec<Crossing> {
        let (handle, fired) = {
            let mut state = self.state.borrow_mut();
            let Some(handle) = state.handle else {
                return Vec::new();
            };
            let zone = Zone::of(&self.region, scroll);
            let fired = crossings(state.zone, zone).to_vec();
            state.zone = zone;
            (handle, fired)
        };
        for &crossing in &fired {
            let action = self.actions.action_for(crossing);
            tracing::trace!(?crossing, ?action, "toggle crossing");
            action.apply(&*self.host, handle);
        }
        fired
    }

    fn teardown(&self) {
        let handle = self.state.borrow_mut().handle.take();
        if let Some(handle) = handle {
            self.host.cancel(handle);
        }
    }
}

impl Lifecycle for ToggleBinding {
    fn activate(&self, scope: &mut Scope) {
        let handle = self
            .inner
            .host
            .play(self.inner.timeline.clone(), Playback::Scrubbed, None);
        {
            let mut state = self.inner.state.borrow_mut();
            state.handle = Some(handle);
            state.zone = Zone::Before;
        }

        self.inner.scroll_to(self.inner.initial_scroll);

        let weak = Rc::downgrade(&self.inner);
        self.inner.scroll.subscribe_in(scope, move |&scroll| {
            if let Some(inner) = weak.upgrade() {
                inner.scroll_to(scroll);
            }
        });

        let inner = Rc::clone(&self.inner);
        scope.register(move || inner.teardown());
    }
}

impl fmt::Debug for ToggleBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleBinding")
            .field("region", &self.inner.region)
            .field("actions", &self.inner.actions.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{EngineEvent, HeadlessEngine, Property, Stage};
    use crate::builder::{TimelineBuilder, TweenBuilder};

    #[test]
    fn parses_four_keywords() {
        let actions: ToggleActions = "play none none reverse".parse().unwrap();
        assert_eq!(actions.enter, ToggleAction::Play);
        assert_eq!(actions.leave_back, ToggleAction::Reverse);
        assert_eq!(actions.to_string(), "play none none reverse");
    }

    #[test]
    fn rejects_bad_keywords() {
        assert_eq!(
            "play none".parse::<ToggleActions>(),
            Err(ToggleParseError::Count(2))
        );
        assert!(matches!(
            "play none none rewind".parse::<ToggleActions>(),
            Err(ToggleParseError::Unknown(w)) if w == "rewind"
        ));
    }

    #[test]
    fn jump_across_region_fires_both_edges() {
        assert_eq!(
            crossings(Zone::Before, Zone::After),
            &[Crossing::Enter, Crossing::Leave]
        );
        assert_eq!(
            crossings(Zone::After, Zone::Before),
            &[Crossing::EnterBack, Crossing::LeaveBack]
        );
        assert!(crossings(Zone::Inside, Zone::Inside).is_empty());
    }

    fn fixture() -> (Rc<HeadlessEngine>, Signal<f64>, ToggleBinding, crate::anim::TargetId) {
        let engine = Rc::new(HeadlessEngine::new());
        let heading = engine.spawn("heading");
        let timeline = TimelineBuilder::new()
            .label("heading-in")
            .step(
                TweenBuilder::new()
                    .target(heading)
                    .from(Property::Opacity, 0.0)
                    .to(Property::Opacity, 1.0)
                    .duration(0.6),
            )
            .unwrap()
            .build()
            .unwrap();
        let scroll = Signal::new();
        let binding = ToggleBinding::new(
            engine.clone(),
            scroll.clone(),
            ResolvedRegion {
                start: 100.0,
                end: 500.0,
            },
            "play none none reverse".parse().unwrap(),
            timeline,
            0.0,
        );
        (engine, scroll, binding, heading)
    }

    #[test]
    fn from_state_shows_before_first_scroll() {
        let (engine, _scroll, binding, heading) = fixture();
        let mut scope = Scope::new("heading");
        scope.mount(&binding);
        assert_eq!(engine.number(heading, Property::Opacity), Some(0.0));
    }

    #[test]
    fn enter_plays_and_leave_back_reverses() {
        let (engine, scroll, binding, heading) = fixture();
        let mut scope = Scope::new("heading");
        scope.mount(&binding);

        scroll.emit(&200.0);
        engine.settle(2.0);
        assert_eq!(engine.number(heading, Property::Opacity), Some(1.0));

        scroll.emit(&50.0);
        engine.settle(2.0);
        assert_eq!(engine.number(heading, Property::Opacity), Some(0.0));

        let handle = binding.handle().unwrap();
        assert!(engine.journal().contains(&EngineEvent::Reverse(handle)));
    }

    #[test]
    fn unmount_cancels_timeline_and_listener() {
        let (engine, scroll, binding, _heading) = fixture();
        let mut scope = Scope::new("heading");
        scope.mount(&binding);
        scope.unmount();

        assert_eq!(engine.active_timelines(), 0);
        assert_eq!(scroll.subscriber_count(), 0);
        assert_eq!(scope.registered(), scope.cancelled());
    }
}
