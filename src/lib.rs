/*!
 * Teardown
 * Process-wide graceful-shutdown coordination
 *
 * Intercepts termination signals (interrupt, quit, hangup, terminate,
 * abort) and runtime failures, runs registered cleanup callbacks exactly
 * once in reverse-registration order, then terminates the process with a
 * deterministic exit code.
 *
 * ```no_run
 * fn main() {
 *     teardown::bind_interrupt(|| {
 *         // release resources acquired so far
 *     });
 *
 *     // ... application work ...
 *
 *     teardown::hold();
 * }
 * ```
 */

mod frames;
mod listener;

pub mod config;
pub mod coordinator;
pub mod global;
pub mod registry;
pub mod types;

// Re-export public API
pub use config::{Config, DEBUG_SIGNALS, DEFAULT_SIGNALS};
pub use coordinator::Coordinator;
pub use global::{bind_interrupt, bind_quit, close, exit, fatal, global, guarded, hold, init};
pub use registry::{Callback, CallbackRegistry, ListKind};
pub use types::{CoordinatorError, CoordinatorResult, Trigger};
