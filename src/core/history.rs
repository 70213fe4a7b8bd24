//! Phase change history.
//!
//! Sequencers record every phase change they make. `record` returns a new
//! history and leaves the old one untouched; owners that keep a history for
//! a whole session `push` in place instead. A bounded history drops its
//! oldest changes once it holds `limit` of them.

use super::phase::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Changes a sequencer keeps before the oldest are dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Record of a single phase change.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PhaseChange<P: Phase> {
    /// The phase being left
    pub from: P,
    /// The phase being entered
    pub to: P,
    /// Wall-clock time of the change
    pub timestamp: DateTime<Utc>,
    /// Which sequence run this change belongs to (1-based)
    pub sequence: u64,
}

/// Ordered history of phase changes.
///
/// # Example
///
/// ```rust
/// use stagehand::core::{Phase, PhaseChange, PhaseHistory};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Lamp { Off, Warming, On }
///
/// impl Phase for Lamp {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "Off",
///             Self::Warming => "Warming",
///             Self::On => "On",
///         }
///     }
/// }
///
/// let history = PhaseHistory::new()
///     .record(PhaseChange { from: Lamp::Off, to: Lamp::Warming, timestamp: Utc::now(), sequence: 1 })
///     .record(PhaseChange { from: Lamp::Warming, to: Lamp::On, timestamp: Utc::now(), sequence: 1 });
///
/// assert_eq!(history.path(), vec![&Lamp::Off, &Lamp::Warming, &Lamp::On]);
/// assert_eq!(history.position_of(&Lamp::On), Some(1));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PhaseHistory<P: Phase> {
    changes: Vec<PhaseChange<P>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

impl<P: Phase> Default for PhaseHistory<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Phase> PhaseHistory<P> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
            limit: None,
        }
    }

    /// Create an empty history that keeps at most `limit` changes.
    pub fn bounded(limit: usize) -> Self {
        Self {
            changes: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Record a change, returning a new history.
    pub fn record(&self, change: PhaseChange<P>) -> Self {
        let mut next = self.clone();
        next.push(change);
        next
    }

    /// Record a change in place, dropping the oldest beyond the limit.
    pub fn push(&mut self, change: PhaseChange<P>) {
        self.changes.push(change);
        if let Some(limit) = self.limit {
            if self.changes.len() > limit {
                let excess = self.changes.len() - limit;
                self.changes.drain(..excess);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Phases traversed: the first `from`, then every `to` in order.
    pub fn path(&self) -> Vec<&P> {
        let mut path = Vec::with_capacity(self.changes.len() + 1);
        if let Some(first) = self.changes.first() {
            path.push(&first.from);
        }
        for change in &self.changes {
            path.push(&change.to);
        }
        path
    }

    /// Index of the first change that entered `phase`.
    pub fn position_of(&self, phase: &P) -> Option<usize> {
        self.changes.iter().position(|c| &c.to == phase)
    }

    /// Number of times `phase` was entered.
    pub fn count_entries(&self, phase: &P) -> usize {
        self.changes.iter().filter(|c| &c.to == phase).count()
    }

    /// Time between the first and last change, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.changes.first()?, self.changes.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// All recorded changes in order.
    pub fn changes(&self) -> &[PhaseChange<P>] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
