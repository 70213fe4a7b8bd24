//! Deferred callbacks keyed by monotonically increasing ids.
//!
//! Ids are never reused, so cancelling a timer can only ever hit the timer
//! it was issued for, even after the owner re-rendered and scheduled new
//! timers for the same slot.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Identity of one scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

struct Pending {
    due: f64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Timers {
    next: u64,
    now: f64,
    pending: BTreeMap<TimerId, Pending>,
}

/// Queue of deferred callbacks on a virtual clock advanced by the ticker.
#[derive(Clone, Default)]
pub struct TimerQueue {
    timers: Rc<RefCell<Timers>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` once, `delay` seconds from now.
    pub fn schedule<F>(&self, delay: f64, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let mut timers = self.timers.borrow_mut();
        timers.next += 1;
        let id = TimerId(timers.next);
        let due = timers.now + delay.max(0.0);
        timers.pending.insert(
            id,
            Pending {
                due,
                callback: Box::new(callback),
            },
        );
        id
    }

    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        self.timers.borrow_mut().pending.remove(&id).is_some()
    }

    /// Cancel every pending timer, returning how many were dropped.
    pub fn cancel_all(&self) -> usize {
        let drained = std::mem::take(&mut self.timers.borrow_mut().pending);
        drained.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.borrow().pending.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.borrow().pending.len()
    }

    pub fn now(&self) -> f64 {
        self.timers.borrow().now
    }

    /// Move the clock forward by `dt` seconds and fire what came due, in
    /// due order (ties by scheduling order). Callbacks may schedule or
    /// cancel timers; ones that come due within this advance fire too.
    pub fn advance(&self, dt: f64) {
        let target = self.now() + dt.max(0.0);
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers
                    .pending
                    .iter()
                    .filter(|(_, p)| p.due <= target)
                    .min_by(|(a_id, a), (b_id, b)| {
                        a.due.total_cmp(&b.due).then_with(|| a_id.cmp(b_id))
                    })
                    .map(|(id, p)| (*id, p.due));
                match due {
                    Some((id, at)) => {
                        timers.now = timers.now.max(at);
                        timers.pending.remove(&id)
                    }
                    None => {
                        timers.now = target;
                        None
                    }
                }
            };
            match next {
                Some(pending) => (pending.callback)(),
                None => break,
            }
        }
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timers = self.timers.borrow();
        f.debug_struct("TimerQueue")
            .field("now", &timers.now)
            .field("pending", &timers.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn fires_in_due_order() {
        let queue = TimerQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, name) in [(0.3, "c"), (0.1, "a"), (0.2, "b")] {
            let log = Rc::clone(&log);
            queue.schedule(delay, move || log.borrow_mut().push(name));
        }
        queue.advance(0.15);
        assert_eq!(*log.borrow(), vec!["a"]);
        queue.advance(1.0);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let queue = TimerQueue::new();
        let fired = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&fired);
        let id = queue.schedule(0.1, move || *flag.borrow_mut() = true);

        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        queue.advance(1.0);
        assert!(!*fired.borrow());
    }

    #[test]
    fn ids_are_never_reused() {
        let queue = TimerQueue::new();
        let a = queue.schedule(0.1, || {});
        queue.advance(1.0);
        let b = queue.schedule(0.1, || {});
        assert!(b > a);
        assert!(!queue.cancel(a));
        assert!(queue.is_pending(b));
    }

    #[test]
    fn callback_may_schedule_follow_up() {
        let queue = TimerQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let q = queue.clone();
        let outer = Rc::clone(&log);
        queue.schedule(0.1, move || {
            outer.borrow_mut().push("first");
            let inner = Rc::clone(&outer);
            q.schedule(0.1, move || inner.borrow_mut().push("second"));
        });
        queue.advance(0.5);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn cancel_all_reports_count() {
        let queue = TimerQueue::new();
        queue.schedule(0.1, || {});
        queue.schedule(0.2, || {});
        assert_eq!(queue.cancel_all(), 2);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn clock_advances_without_timers() {
        let queue = TimerQueue::new();
        queue.advance(0.25);
        queue.advance(0.25);
        assert!((queue.now() - 0.5).abs() < 1e-12);
    }
}
