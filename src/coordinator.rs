/*!
 * Shutdown Coordinator
 * Completion gate, teardown wait loop, and the public shutdown operations
 */

use crate::config::{Config, ExitHook};
use crate::frames;
use crate::listener::SignalListener;
use crate::registry::{CallbackRegistry, ListKind};
use crate::types::{CoordinatorError, CoordinatorResult, Trigger};
use log::{debug, error, info};
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Event consumed by the teardown wait loop
enum WaitEvent {
    Trigger(Trigger),
    Cancel,
}

/// Fire-once latch combined with a broadcast-once completion signal.
///
/// The latch guards `idle -> running`: of all competing triggers (signal
/// delivery, explicit close, error path) only the first is forwarded to
/// the wait loop. The completion signal covers `running -> done` and
/// unblocks every caller parked in [`Gate::wait_done`].
pub(crate) struct Gate {
    fired: AtomicBool,
    events: flume::Sender<WaitEvent>,
    done: Mutex<bool>,
    done_cv: Condvar,
}

impl Gate {
    fn new(events: flume::Sender<WaitEvent>) -> Self {
        Self {
            fired: AtomicBool::new(false),
            events,
            done: Mutex::new(false),
            done_cv: Condvar::new(),
        }
    }

    /// Submit a trigger. Returns true if this call won the race; losers
    /// observe an already-running teardown and should simply wait.
    pub(crate) fn fire(&self, trigger: Trigger) -> bool {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let _ = self.events.send(WaitEvent::Trigger(trigger));
            true
        } else {
            debug!("shutdown already in progress, ignoring {:?} trigger", trigger);
            false
        }
    }

    /// Stop the wait loop without running callbacks. Effective only while
    /// no trigger has fired.
    fn cancel(&self) -> bool {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let _ = self.events.send(WaitEvent::Cancel);
            true
        } else {
            false
        }
    }

    /// Block until the teardown sequence has completed
    fn wait_done(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.done_cv.wait(&mut done);
        }
    }

    fn mark_done(&self) {
        let mut done = self.done.lock();
        *done = true;
        self.done_cv.notify_all();
    }
}

/// Process-wide graceful-shutdown coordinator.
///
/// Intercepts the configured termination signals and runtime failures,
/// runs the registered cleanup callbacks exactly once, then terminates
/// the process with one of the two configured exit codes.
///
/// The teardown sequence runs at most once per process lifetime: the
/// first trigger (signal, [`close`](Self::close), [`fatal`](Self::fatal),
/// guarded failure) wins, all later ones block until teardown completes.
/// Most programs use the process-wide instance through the free functions
/// in [`crate::global`]; tests and embedders construct their own.
pub struct Coordinator {
    config: Config,
    registry: Arc<CallbackRegistry>,
    gate: Arc<Gate>,
    listener: SignalListener,
}

impl Coordinator {
    /// Construct a coordinator, subscribe to its signal set, and start
    /// the background wait loop.
    pub fn new(config: Config) -> CoordinatorResult<Self> {
        if config.exit_ok == config.exit_err {
            return Err(CoordinatorError::InvalidConfig(format!(
                "success and error exit codes are both {}",
                config.exit_ok
            )));
        }

        let (events_tx, events_rx) = flume::unbounded();
        let gate = Arc::new(Gate::new(events_tx));
        let registry = Arc::new(CallbackRegistry::new());
        let listener = SignalListener::spawn(&config.signals, Arc::clone(&gate))?;

        {
            let gate = Arc::clone(&gate);
            let registry = Arc::clone(&registry);
            let exit_ok = config.exit_ok;
            let exit_err = config.exit_err;
            let exit_hook = Arc::clone(&config.exit_hook);
            let _ = thread::Builder::new()
                .name("teardown-wait".into())
                .spawn(move || {
                    wait_loop(events_rx, registry, gate, exit_ok, exit_err, exit_hook);
                })?;
        }

        Ok(Self {
            config,
            registry,
            gate,
            listener,
        })
    }

    /// Register a cleanup callback for interrupt-style shutdown.
    ///
    /// Callbacks run most-recently-bound first. A call that arrives while
    /// teardown is executing blocks until the run finishes; its callback
    /// will never execute.
    pub fn bind_interrupt<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.registry.bind(ListKind::Interrupt, Box::new(callback));
    }

    /// Register a cleanup callback for quit-style shutdown.
    ///
    /// The quit list also runs on the error path (failure reports,
    /// guarded errors, recovered panics). Ordering and blocking behavior
    /// match [`bind_interrupt`](Self::bind_interrupt).
    pub fn bind_quit<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.registry.bind(ListKind::Quit, Box::new(callback));
    }

    /// Request graceful shutdown with the success exit code.
    ///
    /// Runs no callback list. Blocks until teardown completes; the
    /// process exits right after, so callers should not rely on code
    /// placed behind this call. Safe to call repeatedly and from any
    /// number of threads.
    pub fn close(&self) {
        self.request(Trigger::Close);
    }

    /// Log a failure message and request shutdown with the error exit
    /// code. Blocks until teardown completes.
    ///
    /// The error path runs the quit-tagged callback list. Against the
    /// process-wide instance the `fatal!` macro is the convenient form.
    pub fn fatal(&self, message: fmt::Arguments<'_>) {
        error!("{}", message);
        self.request(Trigger::Error);
    }

    /// Request shutdown with an explicit code.
    ///
    /// `code == exit_ok` follows the close path; any other value follows
    /// the error path. The final exit code is always one of the two
    /// configured codes, never `code` itself.
    pub fn exit(&self, code: i32) {
        if code == self.config.exit_ok {
            self.request(Trigger::Close);
        } else {
            self.request(Trigger::Error);
        }
    }

    /// Run `target`, funneling failures into the shutdown coordinator.
    ///
    /// An `Err` return or a panic drives the error path; a clean return
    /// leaves the coordinator untouched. On a recovered panic a bounded
    /// stack walk is printed to stderr. When `logging` is set the error
    /// or panic payload is also logged.
    pub fn guarded<F, E>(&self, target: F, logging: bool)
    where
        F: FnOnce() -> Result<(), E>,
        E: fmt::Display,
    {
        match panic::catch_unwind(AssertUnwindSafe(target)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if logging {
                    error!("error: {}", err);
                }
                self.request(Trigger::Error);
            }
            Err(payload) => {
                if logging {
                    error!("run time panic: {}", panic_message(payload.as_ref()));
                }
                eprint!("{}", frames::capture());
                self.request(Trigger::Error);
            }
        }
    }

    /// Block the calling thread until teardown completion.
    ///
    /// Used by entry points (typically `main`) that must not return
    /// before cleanup finishes.
    pub fn hold(&self) {
        self.gate.wait_done();
    }

    /// Discard this instance: stop the signal listener and the wait loop
    /// without running any callback.
    ///
    /// Only effective before any trigger has fired; afterwards it is a
    /// no-op. A cancelled coordinator must not be used again - its
    /// close-class operations would block indefinitely.
    pub fn cancel(&self) {
        if self.gate.cancel() {
            debug!("coordinator cancelled before any trigger");
        }
        self.listener.stop();
    }

    fn request(&self, trigger: Trigger) {
        self.gate.fire(trigger);
        self.gate.wait_done();
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Teardown wait loop, run on a dedicated background thread.
///
/// Receives the single winning event, executes the callback list selected
/// by the trigger, opens the completion gate, and invokes the exit hook
/// with the selected code.
fn wait_loop(
    events: flume::Receiver<WaitEvent>,
    registry: Arc<CallbackRegistry>,
    gate: Arc<Gate>,
    exit_ok: i32,
    exit_err: i32,
    exit_hook: ExitHook,
) {
    let trigger = match events.recv() {
        Ok(WaitEvent::Trigger(trigger)) => trigger,
        Ok(WaitEvent::Cancel) | Err(_) => {
            debug!("coordinator discarded before any trigger");
            return;
        }
    };

    let (list, code) = match trigger {
        Trigger::Interrupt => (Some(ListKind::Interrupt), exit_ok),
        Trigger::Quit => (Some(ListKind::Quit), exit_ok),
        Trigger::Generic | Trigger::Close => (None, exit_ok),
        Trigger::Error => (Some(ListKind::Quit), exit_err),
    };

    debug!("teardown started by {:?} trigger", trigger);
    if let Some(kind) = list {
        registry.run(kind);
    }

    gate.mark_done();
    info!("teardown complete, exiting with code {}", code);
    exit_hook(code);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
