//! Direction classification for continuous signals.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Reverse,
    Still,
}

impl Direction {
    /// Two-way view for bindings that only care about going back:
    /// `Still` counts as forward.
    pub fn is_reverse(self) -> bool {
        self == Self::Reverse
    }
}

/// Last seen value of a signal, compared against each update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionTracker {
    last: f64,
}

impl Default for DirectionTracker {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl DirectionTracker {
    pub fn new(initial: f64) -> Self {
        Self { last: initial }
    }

    pub fn last(&self) -> f64 {
        self.last
    }

    /// Direction from the last value to `value`, without recording it.
    pub fn peek(&self, value: f64) -> Direction {
        if value > self.last {
            Direction::Forward
        } else if value < self.last {
            Direction::Reverse
        } else {
            Direction::Still
        }
    }

    /// Classify `value` and remember it.
    pub fn classify(&mut self, value: f64) -> Direction {
        let direction = self.peek(value);
        self.last = value;
        direction
    }

    /// Forget history and start over from `value`.
    pub fn reset(&mut self, value: f64) {
        self.last = value;
    }
}
