//! Seams to the animation engine and the rendering host.
//!
//! The orchestration layer never interpolates anything itself. It hands
//! timelines to an [`AnimationEngine`] and asks the [`Stage`] for elements.
//! Both are called from the single UI thread, so every method takes `&self`
//! and implementations use interior mutability.

use super::props::Props;
use super::timeline::AnimationTimeline;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a visual element owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(u64);

impl TargetId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a timeline handed to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineHandle(u64);

impl TimelineHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// How the engine treats a timeline once it reaches its end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    /// Play forward immediately; forget the timeline after completion.
    Once,
    /// Play forward immediately; keep the timeline so it can be reversed or
    /// restarted until cancelled.
    Retained,
    /// Start paused at position zero; driven by `seek` (scroll scrubbing).
    Scrubbed,
}

/// Callback fired when a timeline reaches its end playing forward.
pub type Completion = Box<dyn FnOnce()>;

/// Animation engine collaborator.
///
/// Implementations must fire completions only after releasing any internal
/// borrow: completions routinely start the next timeline.
pub trait AnimationEngine {
    /// Apply `props` to every target immediately.
    fn set(&self, targets: &[TargetId], props: &Props);

    /// Hand a timeline to the engine.
    fn play(
        &self,
        timeline: AnimationTimeline,
        playback: Playback,
        on_complete: Option<Completion>,
    ) -> TimelineHandle;

    /// Jump to normalized `progress` in [0,1] and render that frame.
    fn seek(&self, handle: TimelineHandle, progress: f64);

    /// Play towards the start from the current position.
    fn reverse(&self, handle: TimelineHandle);

    /// Play forward from the current position.
    fn resume(&self, handle: TimelineHandle);

    /// Stop advancing, keep the current frame.
    fn pause(&self, handle: TimelineHandle);

    /// Drop the timeline without firing its completion. Idempotent.
    fn cancel(&self, handle: TimelineHandle);

    /// Whether the engine still holds the timeline.
    fn is_active(&self, handle: TimelineHandle) -> bool;
}

/// Rendering collaborator: owner of the visual tree.
pub trait Stage {
    /// Create a new element and attach it to the tree.
    fn spawn(&self, role: &str) -> TargetId;

    /// Detach an element. Idempotent.
    fn remove(&self, target: TargetId);

    fn is_attached(&self, target: TargetId) -> bool;
}

/// Everything a component needs from the host.
pub trait Host: AnimationEngine + Stage {}

impl<T: AnimationEngine + Stage> Host for T {}
