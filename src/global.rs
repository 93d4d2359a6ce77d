/*!
 * Process-Wide Default Instance
 * Lazily created global coordinator and the free functions bound to it
 */

use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::types::{CoordinatorError, CoordinatorResult};
use std::fmt;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Coordinator> = OnceLock::new();

/// Install the process-wide coordinator with a custom configuration.
///
/// Must run before any other free function in this module; once the
/// default instance exists the configuration is fixed for the process
/// lifetime.
pub fn init(config: Config) -> CoordinatorResult<()> {
    let coordinator = Coordinator::new(config)?;
    GLOBAL
        .set(coordinator)
        .map_err(|_| CoordinatorError::AlreadyInitialized)
}

/// The process-wide coordinator, created with [`Config::default`] on
/// first use.
pub fn global() -> &'static Coordinator {
    GLOBAL.get_or_init(|| {
        Coordinator::new(Config::default())
            .expect("default signal set subscription cannot fail")
    })
}

/// Register an interrupt-style cleanup callback on the process-wide
/// coordinator. See [`Coordinator::bind_interrupt`].
pub fn bind_interrupt<F>(callback: F)
where
    F: FnOnce() + Send + 'static,
{
    global().bind_interrupt(callback);
}

/// Register a quit-style cleanup callback on the process-wide
/// coordinator. See [`Coordinator::bind_quit`].
pub fn bind_quit<F>(callback: F)
where
    F: FnOnce() + Send + 'static,
{
    global().bind_quit(callback);
}

/// Request graceful shutdown with the success exit code; blocks until
/// teardown completes. See [`Coordinator::close`].
pub fn close() {
    global().close();
}

/// Log a failure message and shut down with the error exit code; blocks
/// until teardown completes. See [`Coordinator::fatal`]; the `fatal!`
/// macro is the format-capable form.
pub fn fatal(message: fmt::Arguments<'_>) {
    global().fatal(message);
}

/// Request shutdown with an explicit code. See [`Coordinator::exit`].
pub fn exit(code: i32) {
    global().exit(code);
}

/// Run `target` on the process-wide coordinator, funneling errors and
/// panics into the error path. See [`Coordinator::guarded`].
pub fn guarded<F, E>(target: F, logging: bool)
where
    F: FnOnce() -> Result<(), E>,
    E: fmt::Display,
{
    global().guarded(target, logging);
}

/// Block the calling thread until teardown completion. See
/// [`Coordinator::hold`].
pub fn hold() {
    global().hold();
}

/// Log a formatted failure message through the process-wide coordinator
/// and shut down with the error exit code.
///
/// ```no_run
/// teardown::fatal!("disk full on {}", "/var/lib/db");
/// ```
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::global::fatal(::core::format_args!($($arg)*))
    };
}
