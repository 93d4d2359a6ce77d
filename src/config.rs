/*!
 * Coordinator Configuration
 * Exit codes, observed signal set, and the process-exit hook
 */

use signal_hook::consts::{SIGABRT, SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use std::fmt;
use std::sync::Arc;

/// Signal set observed by default: interrupt, hangup, terminate, quit, abort.
pub const DEFAULT_SIGNALS: &[i32] = &[SIGINT, SIGHUP, SIGTERM, SIGQUIT, SIGABRT];

/// Signal set without SIGABRT, convenient under debuggers that use it.
pub const DEBUG_SIGNALS: &[i32] = &[SIGINT, SIGHUP, SIGTERM, SIGQUIT];

/// Hook invoked with the selected exit code once teardown has completed.
///
/// Defaults to `std::process::exit`. Tests and embedders replace it via
/// [`Config::with_exit_hook`] to observe the code without terminating.
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

/// Coordinator configuration, fixed at construction time.
#[derive(Clone)]
pub struct Config {
    /// Exit code for graceful shutdown (default 0)
    pub exit_ok: i32,
    /// Exit code for the error path (default 1)
    pub exit_err: i32,
    /// Termination signals to subscribe to
    pub signals: Vec<i32>,
    pub(crate) exit_hook: ExitHook,
}

impl Config {
    /// Configuration observing [`DEBUG_SIGNALS`] instead of the full set
    pub fn debug() -> Self {
        Self {
            signals: DEBUG_SIGNALS.to_vec(),
            ..Self::default()
        }
    }

    /// Override both exit codes
    pub fn with_exit_codes(mut self, ok: i32, err: i32) -> Self {
        self.exit_ok = ok;
        self.exit_err = err;
        self
    }

    /// Override the observed signal set
    pub fn with_signals(mut self, signals: &[i32]) -> Self {
        self.signals = signals.to_vec();
        self
    }

    /// Replace the process-exit hook
    pub fn with_exit_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.exit_hook = Arc::new(hook);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exit_ok: 0,
            exit_err: 1,
            signals: DEFAULT_SIGNALS.to_vec(),
            exit_hook: Arc::new(|code| std::process::exit(code)),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("exit_ok", &self.exit_ok)
            .field("exit_err", &self.exit_err)
            .field("signals", &self.signals)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_matches_reference_values() {
        let config = Config::default();
        assert_eq!(config.exit_ok, 0);
        assert_eq!(config.exit_err, 1);
        assert_eq!(config.signals, DEFAULT_SIGNALS.to_vec());
    }

    #[test]
    fn debug_set_omits_sigabrt() {
        let config = Config::debug();
        assert!(!config.signals.contains(&SIGABRT));
        assert!(config.signals.contains(&SIGINT));
    }

    #[test]
    fn builder_overrides_apply() {
        let config = Config::default()
            .with_exit_codes(10, 20)
            .with_signals(&[SIGTERM]);
        assert_eq!(config.exit_ok, 10);
        assert_eq!(config.exit_err, 20);
        assert_eq!(config.signals, vec![SIGTERM]);
    }
}
