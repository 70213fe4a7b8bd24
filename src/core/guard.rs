//! Guard predicates for gating input.
//!
//! Guards are pure boolean functions over some context value. Sequencers use
//! them to decide whether an incoming event may start a new sequence (the
//! in-flight guard, the self-navigation guard) without touching any state.

use std::fmt;

/// Pure predicate that decides whether an input is accepted.
///
/// # Example
///
/// ```rust
/// use stagehand::core::Guard;
///
/// let positive = Guard::new(|n: &i32| *n > 0);
/// let even = Guard::new(|n: &i32| n % 2 == 0);
/// let both = positive.and(even);
///
/// assert!(both.check(&4));
/// assert!(!both.check(&3));
/// assert!(!both.check(&-2));
/// ```
pub struct Guard<T> {
    predicate: Box<dyn Fn(&T) -> bool>,
}

impl<T: 'static> Guard<T> {
    /// Create a guard from a predicate.
    ///
    /// The predicate must be deterministic and free of side effects; guards
    /// may be evaluated any number of times per event.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Guard that accepts everything.
    pub fn always() -> Self {
        Guard::new(|_| true)
    }

    /// Check whether the guard accepts `value`.
    pub fn check(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    /// Accept only when both guards accept. `other` is not evaluated when
    /// `self` rejects.
    pub fn and(self, other: Guard<T>) -> Guard<T> {
        Guard::new(move |value| self.check(value) && other.check(value))
    }

    /// Invert the guard.
    pub fn not(self) -> Guard<T> {
        Guard::new(move |value| !self.check(value))
    }
}

impl<T> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn guard_allows_matching_values() {
        let guard = Guard::new(|s: &&str| s.starts_with('/'));

        assert!(guard.check(&"/work"));
        assert!(!guard.check(&"https://example.com"));
    }

    #[test]
    fn always_accepts() {
        let guard: Guard<u8> = Guard::always();
        assert!(guard.check(&0));
        assert!(guard.check(&255));
    }

    #[test]
    fn not_inverts() {
        let guard = Guard::new(|b: &bool| *b).not();
        assert!(guard.check(&false));
        assert!(!guard.check(&true));
    }

    #[test]
    fn and_short_circuits() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let guard = Guard::new(|_: &u8| false).and(Guard::new(move |_: &u8| {
            counter.set(counter.get() + 1);
            true
        }));

        assert!(!guard.check(&1));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|n: &u32| n % 3 == 0);
        assert_eq!(guard.check(&9), guard.check(&9));
        assert_eq!(guard.check(&10), guard.check(&10));
    }
}
