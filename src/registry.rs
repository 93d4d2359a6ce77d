/*!
 * Callback Registry
 * Two ordered lists of cleanup actions, one per shutdown style
 */

use log::debug;
use parking_lot::Mutex;

/// Cleanup callback: zero-argument, no return value, arbitrary side effects.
///
/// Panics inside a callback are not caught; a panicking callback aborts the
/// teardown sequence through the runtime's normal unwinding behavior.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Which callback list a registration or a teardown run addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Runs on interrupt-style shutdown (SIGINT)
    Interrupt,
    /// Runs on quit-style shutdown (SIGQUIT) and on the error path
    Quit,
}

#[derive(Default)]
struct Lists {
    interrupt: Vec<Callback>,
    quit: Vec<Callback>,
}

impl Lists {
    fn get_mut(&mut self, kind: ListKind) -> &mut Vec<Callback> {
        match kind {
            ListKind::Interrupt => &mut self.interrupt,
            ListKind::Quit => &mut self.quit,
        }
    }
}

/// Registry of cleanup callbacks.
///
/// Registrations are permanent for the process lifetime; there is no
/// unbind. A single lock covers both lists, and the teardown run holds it
/// for the whole execution phase: a `bind` arriving while callbacks run
/// blocks until the run finishes, then completes normally (its callback
/// will never execute).
pub struct CallbackRegistry {
    lists: Mutex<Lists>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            lists: Mutex::new(Lists::default()),
        }
    }

    /// Register a callback on `kind`.
    ///
    /// Callbacks run in reverse-registration order (most-recently-bound
    /// first), so later-acquired resources are released before
    /// earlier-acquired ones.
    pub fn bind(&self, kind: ListKind, callback: Callback) {
        let mut lists = self.lists.lock();
        lists.get_mut(kind).push(callback);
        debug!("bound cleanup callback on {:?} list", kind);
    }

    /// Number of callbacks currently bound to `kind`
    pub fn count(&self, kind: ListKind) -> usize {
        let mut lists = self.lists.lock();
        lists.get_mut(kind).len()
    }

    /// Run every callback bound to `kind`, most-recently-bound first.
    ///
    /// The registry lock is held for the entire run. Each callback is
    /// consumed; a second run of the same list executes nothing.
    pub(crate) fn run(&self, kind: ListKind) {
        let mut lists = self.lists.lock();
        let callbacks = std::mem::take(lists.get_mut(kind));
        debug!("running {} callbacks from {:?} list", callbacks.len(), kind);
        for callback in callbacks.into_iter().rev() {
            callback();
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn callbacks_run_in_reverse_registration_order() {
        let registry = CallbackRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["a", "b", "c"] {
            let order = Arc::clone(&order);
            registry.bind(ListKind::Interrupt, Box::new(move || order.lock().push(name)));
        }

        registry.run(ListKind::Interrupt);
        assert_eq!(*order.lock(), vec!["c", "b", "a"]);
    }

    #[test]
    fn lists_are_independent() {
        let registry = CallbackRegistry::new();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let h = Arc::clone(&hits);
        registry.bind(ListKind::Interrupt, Box::new(move || h.lock().push("int")));
        let h = Arc::clone(&hits);
        registry.bind(ListKind::Quit, Box::new(move || h.lock().push("quit")));

        registry.run(ListKind::Quit);
        assert_eq!(*hits.lock(), vec!["quit"]);
        assert_eq!(registry.count(ListKind::Interrupt), 1);
        assert_eq!(registry.count(ListKind::Quit), 0);
    }

    #[test]
    fn second_run_executes_nothing() {
        let registry = CallbackRegistry::new();
        let hits = Arc::new(Mutex::new(0u32));

        let h = Arc::clone(&hits);
        registry.bind(ListKind::Quit, Box::new(move || *h.lock() += 1));

        registry.run(ListKind::Quit);
        registry.run(ListKind::Quit);
        assert_eq!(*hits.lock(), 1);
    }
}
