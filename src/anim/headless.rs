//! Deterministic engine and stage that run without a renderer.
//!
//! `HeadlessEngine` keeps every element's properties in memory and advances
//! timelines only when the host calls [`HeadlessEngine::tick`]. It is what
//! the crate's scenario tests drive, and it doubles as a reference for what
//! an engine adapter must guarantee: completions fire outside any internal
//! borrow, cancelled timelines never complete, detached elements are never
//! written.

use super::engine::{AnimationEngine, Completion, Playback, Stage, TargetId, TimelineHandle};
use super::props::{Property, Props, Value};
use super::timeline::AnimationTimeline;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Frame length used by [`HeadlessEngine::advance`].
pub const FRAME: f64 = 1.0 / 60.0;

/// Journal entry for every call the engine received.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Spawn { target: TargetId, role: String },
    Remove { target: TargetId, was_attached: bool },
    Set { targets: Vec<TargetId>, props: Props },
    Play { handle: TimelineHandle, label: Option<String> },
    Seek { handle: TimelineHandle, progress: f64 },
    Reverse(TimelineHandle),
    Resume(TimelineHandle),
    Pause(TimelineHandle),
    Cancel(TimelineHandle),
    Complete(TimelineHandle),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    Forward,
    Backward,
    Paused,
}

struct Element {
    role: String,
    attached: bool,
    props: Props,
}

struct Running {
    timeline: AnimationTimeline,
    playback: Playback,
    position: f64,
    heading: Heading,
    // step -> target -> values captured when the target started
    origins: Vec<Vec<Option<Props>>>,
    on_complete: Option<Completion>,
    completed: bool,
}

#[derive(Default)]
struct EngineState {
    next_target: u64,
    next_timeline: u64,
    clock: f64,
    elements: BTreeMap<TargetId, Element>,
    timelines: BTreeMap<TimelineHandle, Running>,
    journal: Vec<EngineEvent>,
    detached_writes: usize,
}

/// In-memory [`AnimationEngine`] + [`Stage`].
#[derive(Default)]
pub struct HeadlessEngine {
    state: RefCell<EngineState>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every running timeline by `dt` seconds and fire completions.
    pub fn tick(&self, dt: f64) {
        let finished = {
            let mut state = self.state.borrow_mut();
            state.clock += dt;
            let handles: Vec<TimelineHandle> = state.timelines.keys().copied().collect();
            let mut finished = Vec::new();
            for handle in handles {
                if let Some(done) = state.step(handle, dt) {
                    finished.push((handle, done));
                }
            }
            finished
        };

        for (handle, completion) in finished {
            tracing::trace!(handle = handle.to_raw(), "timeline complete");
            if let Some(completion) = completion {
                completion();
            }
        }
    }

    /// Advance `seconds` in frame-sized ticks.
    pub fn advance(&self, seconds: f64) {
        let mut remaining = seconds;
        while remaining > 1e-9 {
            let dt = remaining.min(FRAME);
            self.tick(dt);
            remaining -= dt;
        }
    }

    /// Tick until no timeline is moving, at most `limit` seconds.
    pub fn settle(&self, limit: f64) {
        let mut elapsed = 0.0;
        while elapsed < limit && self.has_moving_timelines() {
            self.tick(FRAME);
            elapsed += FRAME;
        }
    }

    pub fn clock(&self) -> f64 {
        self.state.borrow().clock
    }

    pub fn value(&self, target: TargetId, property: Property) -> Option<Value> {
        let state = self.state.borrow();
        let element = state.elements.get(&target)?;
        Some(
            element
                .props
                .get(property)
                .unwrap_or_else(|| property.resting_value()),
        )
    }

    pub fn number(&self, target: TargetId, property: Property) -> Option<f64> {
        self.value(target, property).and_then(Value::as_number)
    }

    pub fn role(&self, target: TargetId) -> Option<String> {
        self.state
            .borrow()
            .elements
            .get(&target)
            .map(|e| e.role.clone())
    }

    /// Attached elements with the given role, in creation order.
    pub fn attached_with_role(&self, role: &str) -> Vec<TargetId> {
        self.state
            .borrow()
            .elements
            .iter()
            .filter(|(_, e)| e.attached && e.role == role)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn active_timelines(&self) -> usize {
        self.state.borrow().timelines.len()
    }

    pub fn has_moving_timelines(&self) -> bool {
        self.state
            .borrow()
            .timelines
            .values()
            .any(|r| r.heading != Heading::Paused && !(r.completed && r.heading == Heading::Forward))
    }

    pub fn journal(&self) -> Vec<EngineEvent> {
        self.state.borrow().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.borrow_mut().journal.clear();
    }

    /// Times anything tried to write to a detached element.
    pub fn detached_writes(&self) -> usize {
        self.state.borrow().detached_writes
    }

    /// Number of `remove` calls made for `target`.
    pub fn removals_of(&self, target: TargetId) -> usize {
        self.state
            .borrow()
            .journal
            .iter()
            .filter(|e| matches!(e, EngineEvent::Remove { target: t, .. } if *t == target))
            .count()
    }
}

impl EngineState {
    fn write(&mut self, target: TargetId, property: Property, value: Value) {
        match self.elements.get_mut(&target) {
            Some(element) if element.attached => element.props.insert(property, value),
            _ => self.detached_writes += 1,
        }
    }

    fn current(&self, target: TargetId, property: Property) -> Value {
        self.elements
            .get(&target)
            .and_then(|e| e.props.get(property))
            .unwrap_or_else(|| property.resting_value())
    }

    fn snapshot(&self, target: TargetId, to: &Props) -> Props {
        let mut origin = Props::new();
        for property in to.properties() {
            origin.insert(property, self.current(target, property));
        }
        origin
    }

    /// Paint the frame at the timeline's current position.
    fn render(&mut self, handle: TimelineHandle) {
        let Some(mut running) = self.timelines.remove(&handle) else {
            return;
        };
        let position = running.position;
        for (s, step) in running.timeline.steps().iter().enumerate() {
            for (i, target) in step.targets.iter().copied().enumerate() {
                let Some(t) = step.progress_of(i, position) else {
                    if let Some(from) = &step.from {
                        for (p, v) in from.iter() {
                            self.write(target, p, v);
                        }
                    }
                    continue;
                };
                if running.origins[s][i].is_none() {
                    let mut origin = self.snapshot(target, &step.to);
                    if let Some(from) = &step.from {
                        origin.merge(from);
                    }
                    running.origins[s][i] = Some(origin);
                }
                let origin = running.origins[s][i].clone().unwrap_or_default();
                for (p, to) in step.to.iter() {
                    let from = origin.get(p).unwrap_or(to);
                    self.write(target, p, from.lerp(to, t));
                }
            }
        }
        self.timelines.insert(handle, running);
    }

    /// Advance one timeline. Returns `Some(completion)` when it just ended.
    fn step(&mut self, handle: TimelineHandle, dt: f64) -> Option<Option<Completion>> {
        let running = self.timelines.get_mut(&handle)?;
        let total = running.timeline.total_duration();
        match running.heading {
            Heading::Paused => return None,
            Heading::Forward if running.completed => return None,
            Heading::Forward => running.position = (running.position + dt).min(total),
            Heading::Backward => running.position = (running.position - dt).max(0.0),
        }
        let heading = running.heading;
        let position = running.position;
        self.render(handle);

        let running = self.timelines.get_mut(&handle)?;
        match heading {
            Heading::Backward if position <= 0.0 => {
                running.heading = Heading::Paused;
                None
            }
            Heading::Forward if position >= total => {
                running.completed = true;
                let completion = running.on_complete.take();
                if running.playback == Playback::Once {
                    self.timelines.remove(&handle);
                }
                self.journal.push(EngineEvent::Complete(handle));
                Some(completion)
            }
            _ => None,
        }
    }
}

impl AnimationEngine for HeadlessEngine {
    fn set(&self, targets: &[TargetId], props: &Props) {
        let mut state = self.state.borrow_mut();
        for &target in targets {
            for (p, v) in props.iter() {
                state.write(target, p, v);
            }
        }
        state.journal.push(EngineEvent::Set {
            targets: targets.to_vec(),
            props: props.clone(),
        });
    }

    fn play(
        &self,
        timeline: AnimationTimeline,
        playback: Playback,
        on_complete: Option<Completion>,
    ) -> TimelineHandle {
        let mut state = self.state.borrow_mut();
        state.next_timeline += 1;
        let handle = TimelineHandle::from_raw(state.next_timeline);
        let label = timeline.label().map(str::to_string);
        let origins = timeline
            .steps()
            .iter()
            .map(|s| vec![None; s.targets.len()])
            .collect();
        let heading = match playback {
            Playback::Scrubbed => Heading::Paused,
            Playback::Once | Playback::Retained => Heading::Forward,
        };
        state.timelines.insert(
            handle,
            Running {
                timeline,
                playback,
                position: 0.0,
                heading,
                origins,
                on_complete,
                completed: false,
            },
        );
        state.journal.push(EngineEvent::Play { handle, label });
        state.render(handle);
        handle
    }

    fn seek(&self, handle: TimelineHandle, progress: f64) {
        let mut state = self.state.borrow_mut();
        let Some(running) = state.timelines.get_mut(&handle) else {
            return;
        };
        let total = running.timeline.total_duration();
        running.position = progress.clamp(0.0, 1.0) * total;
        state.render(handle);
        state.journal.push(EngineEvent::Seek { handle, progress });
    }

    fn reverse(&self, handle: TimelineHandle) {
        let mut state = self.state.borrow_mut();
        if let Some(running) = state.timelines.get_mut(&handle) {
            running.heading = Heading::Backward;
            running.completed = false;
            state.journal.push(EngineEvent::Reverse(handle));
        }
    }

    fn resume(&self, handle: TimelineHandle) {
        let mut state = self.state.borrow_mut();
        if let Some(running) = state.timelines.get_mut(&handle) {
            running.heading = Heading::Forward;
            state.journal.push(EngineEvent::Resume(handle));
        }
    }

    fn pause(&self, handle: TimelineHandle) {
        let mut state = self.state.borrow_mut();
        if let Some(running) = state.timelines.get_mut(&handle) {
            running.heading = Heading::Paused;
            state.journal.push(EngineEvent::Pause(handle));
        }
    }

    fn cancel(&self, handle: TimelineHandle) {
        let mut state = self.state.borrow_mut();
        if state.timelines.remove(&handle).is_some() {
            state.journal.push(EngineEvent::Cancel(handle));
        }
    }

    fn is_active(&self, handle: TimelineHandle) -> bool {
        self.state.borrow().timelines.contains_key(&handle)
    }
}

impl Stage for HeadlessEngine {
    fn spawn(&self, role: &str) -> TargetId {
        let mut state = self.state.borrow_mut();
        state.next_target += 1;
        let target = TargetId::from_raw(state.next_target);
        state.elements.insert(
            target,
            Element {
                role: role.to_string(),
                attached: true,
                props: Props::new(),
            },
        );
        state.journal.push(EngineEvent::Spawn {
            target,
            role: role.to_string(),
        });
        target
    }

    fn remove(&self, target: TargetId) {
        let mut state = self.state.borrow_mut();
        let was_attached = match state.elements.get_mut(&target) {
            Some(element) => std::mem::replace(&mut element.attached, false),
            None => false,
        };
        state.journal.push(EngineEvent::Remove {
            target,
            was_attached,
        });
    }

    fn is_attached(&self, target: TargetId) -> bool {
        self.state
            .borrow()
            .elements
            .get(&target)
            .is_some_and(|e| e.attached)
    }
}
