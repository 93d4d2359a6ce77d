/*!
 * Coordinator Types
 * Shutdown triggers, result alias, and error definitions
 */

use thiserror::Error;

/// Coordinator operation result
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Coordinator errors
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("signal subscription failed: {0}")]
    SignalSubscription(#[from] std::io::Error),

    #[error("process-wide coordinator already installed")]
    AlreadyInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Source of a shutdown request.
///
/// The trigger that wins the race into the teardown sequence determines
/// which callback list runs and which exit code the process terminates
/// with. Exactly one trigger wins per process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Interrupt-style signal (SIGINT, Ctrl+C)
    Interrupt,
    /// Quit-style signal (SIGQUIT, Ctrl+\)
    Quit,
    /// Any other subscribed termination signal (SIGHUP, SIGTERM, SIGABRT)
    Generic,
    /// Explicit graceful close request
    Close,
    /// Failure report, error from a guarded call, or recovered panic
    Error,
}
