//! Phases of a page transition.

use crate::phase_enum;

phase_enum! {
    /// Where a page transition currently is.
    ///
    /// A run goes `Idle -> Covering -> Navigating -> Revealing -> Idle`. The
    /// intro reveal on mount goes straight from `Idle` to `Revealing`.
    pub enum TransitionPhase {
        Idle,
        Covering,
        Navigating,
        Revealing,
    }
    resting: [Idle]
}

impl Default for TransitionPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl TransitionPhase {
    /// Whether `self -> next` is a legal edge.
    pub fn can_enter(self, next: TransitionPhase) -> bool {
        use TransitionPhase::*;
        matches!(
            (self, next),
            (Idle, Covering)
                | (Covering, Navigating)
                | (Navigating, Revealing)
                | (Revealing, Idle)
                | (Idle, Revealing)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Phase;

    #[test]
    fn only_idle_accepts_clicks() {
        assert!(TransitionPhase::Idle.is_resting());
        assert!(!TransitionPhase::Covering.is_resting());
        assert!(!TransitionPhase::Navigating.is_resting());
        assert!(!TransitionPhase::Revealing.is_resting());
    }

    #[test]
    fn edges_follow_the_cycle() {
        use TransitionPhase::*;
        assert!(Idle.can_enter(Covering));
        assert!(Covering.can_enter(Navigating));
        assert!(Navigating.can_enter(Revealing));
        assert!(Revealing.can_enter(Idle));
        assert!(Idle.can_enter(Revealing));

        assert!(!Idle.can_enter(Navigating));
        assert!(!Covering.can_enter(Revealing));
        assert!(!Covering.can_enter(Idle));
        assert!(!Revealing.can_enter(Covering));
    }
}
