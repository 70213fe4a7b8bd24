//! Mount/unmount controller.
//!
//! A [`Scope`] is the lifetime of one mounted component. Everything the
//! component hooks up while mounted (listeners, timelines, timers) is
//! registered with the scope as a cancel closure; unmounting runs all of them
//! synchronously, whatever the component was doing at the time.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a scope, carried in teardown logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(Uuid);

impl ScopeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle to one registration inside a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

/// A component that can be mounted into a scope.
///
/// `activate` must build the component's initial visual state before it
/// returns, so nothing flashes unstyled before the first signal arrives, and
/// must register a cancel closure for everything it hooks up.
pub trait Lifecycle {
    fn activate(&self, scope: &mut Scope);
}

type Cancel = Box<dyn FnOnce()>;

/// Lifetime of one mounted component.
///
/// # Example
///
/// ```rust
/// use stagehand::lifecycle::{Lifecycle, Scope};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// struct Listener(Rc<Cell<bool>>);
///
/// impl Lifecycle for Listener {
///     fn activate(&self, scope: &mut Scope) {
///         self.0.set(true);
///         let flag = Rc::clone(&self.0);
///         scope.register(move || flag.set(false));
///     }
/// }
///
/// let listening = Rc::new(Cell::new(false));
/// let mut scope = Scope::new("listener");
/// scope.mount(&Listener(Rc::clone(&listening)));
/// assert!(listening.get());
///
/// scope.unmount();
/// assert!(!listening.get());
/// assert_eq!(scope.registered(), scope.cancelled());
/// ```
pub struct Scope {
    id: ScopeId,
    label: String,
    mounted: bool,
    next: u64,
    pending: Vec<(RegistrationId, Cancel)>,
    registered: usize,
    cancelled: usize,
}

impl Scope {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: ScopeId::new(),
            label: label.into(),
            mounted: false,
            next: 0,
            pending: Vec::new(),
            registered: 0,
            cancelled: 0,
        }
    }

    /// Activate `component` inside this scope. Mounting an already mounted
    /// scope adds the component to the same lifetime.
    pub fn mount<C: Lifecycle + ?Sized>(&mut self, component: &C) {
        if !self.mounted {
            tracing::debug!(scope = %self.id, label = %self.label, "mount");
        }
        self.mounted = true;
        component.activate(self);
    }

    /// Register a cancel closure. Registering on an unmounted scope runs
    /// the closure right away: nothing may outlive the mounted lifetime.
    pub fn register<F>(&mut self, cancel: F) -> RegistrationId
    where
        F: FnOnce() + 'static,
    {
        self.next += 1;
        let id = RegistrationId(self.next);
        self.registered += 1;
        if self.mounted {
            self.pending.push((id, Box::new(cancel)));
        } else {
            tracing::trace!(scope = %self.id, "registration on unmounted scope cancelled");
            self.cancelled += 1;
            cancel();
        }
        id
    }

    /// Cancel one registration early. Returns `false` if it already ran.
    pub fn release(&mut self, id: RegistrationId) -> bool {
        let Some(index) = self.pending.iter().position(|(r, _)| *r == id) else {
            return false;
        };
        let (_, cancel) = self.pending.remove(index);
        self.cancelled += 1;
        cancel();
        true
    }

    /// Cancel every outstanding registration, newest first. Idempotent.
    #[tracing::instrument(level = "debug", skip(self), fields(scope = %self.id, label = %self.label))]
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        let pending = std::mem::take(&mut self.pending);
        tracing::debug!(count = pending.len(), "cancelling registrations");
        for (_, cancel) in pending.into_iter().rev() {
            self.cancelled += 1;
            cancel();
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Registrations made over the scope's whole life.
    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Cancel closures run over the scope's whole life.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("mounted", &self.mounted)
            .field("outstanding", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        log: Rc<RefCell<Vec<&'static str>>>,
        names: Vec<&'static str>,
    }

    impl Lifecycle for Recorder {
        fn activate(&self, scope: &mut Scope) {
            for &name in &self.names {
                let log = Rc::clone(&self.log);
                scope.register(move || log.borrow_mut().push(name));
            }
        }
    }

    fn recorder(names: &[&'static str]) -> (Recorder, Rc<RefCell<Vec<&'static str>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (
            Recorder {
                log: Rc::clone(&log),
                names: names.to_vec(),
            },
            log,
        )
    }

    #[test]
    fn unmount_runs_every_cancel_newest_first() {
        let (component, log) = recorder(&["scroll", "click", "timeline"]);
        let mut scope = Scope::new("test");
        scope.mount(&component);
        assert_eq!(scope.outstanding(), 3);

        scope.unmount();
        assert_eq!(*log.borrow(), vec!["timeline", "click", "scroll"]);
        assert_eq!(scope.registered(), 3);
        assert_eq!(scope.cancelled(), 3);
    }

    #[test]
    fn unmount_is_idempotent() {
        let (component, log) = recorder(&["a"]);
        let mut scope = Scope::new("test");
        scope.mount(&component);
        scope.unmount();
        scope.unmount();
        assert_eq!(log.borrow().len(), 1);
        assert!(!scope.is_mounted());
    }

    #[test]
    fn release_cancels_single_registration() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scope = Scope::new("test");
        scope.mount(&Recorder {
            log: Rc::clone(&log),
            names: vec![],
        });
        let first = {
            let log = Rc::clone(&log);
            scope.register(move || log.borrow_mut().push("first"))
        };
        let log2 = Rc::clone(&log);
        scope.register(move || log2.borrow_mut().push("second"));

        assert!(scope.release(first));
        assert!(!scope.release(first));
        scope.unmount();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(scope.registered(), scope.cancelled());
    }

    #[test]
    fn register_after_unmount_runs_immediately() {
        let mut scope = Scope::new("late");
        let ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&ran);
        scope.register(move || *flag.borrow_mut() = true);
        assert!(*ran.borrow());
        assert_eq!(scope.cancelled(), 1);
    }

    #[test]
    fn drop_unmounts() {
        let (component, log) = recorder(&["a", "b"]);
        {
            let mut scope = Scope::new("dropped");
            scope.mount(&component);
        }
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn scopes_have_distinct_ids() {
        assert_ne!(Scope::new("a").id(), Scope::new("b").id());
    }
}
