/*!
 * Signal Listener
 * Subscribes to the configured termination signals and forwards the
 * first delivery as a shutdown trigger
 */

use crate::coordinator::Gate;
use crate::types::{CoordinatorResult, Trigger};
use log::info;
use signal_hook::consts::{SIGINT, SIGQUIT};
use signal_hook::iterator::{Handle, Signals};
use std::sync::Arc;
use std::thread;

/// Translate a delivered signal into a shutdown trigger.
///
/// Subscribed signals that are neither interrupt- nor quit-style map to
/// [`Trigger::Generic`]: a plain shutdown that runs no callback list and
/// exits with the success code.
pub(crate) fn classify(signal: i32) -> Trigger {
    match signal {
        SIGINT => Trigger::Interrupt,
        SIGQUIT => Trigger::Quit,
        _ => Trigger::Generic,
    }
}

/// Background OS-signal subscription.
///
/// A dedicated thread blocks on signal delivery and fires the completion
/// gate with the first signal's trigger, then exits. Subscriptions are
/// fixed once the listener is spawned.
pub(crate) struct SignalListener {
    handle: Handle,
}

impl SignalListener {
    /// Subscribe to `signals` and start the forwarding thread.
    pub(crate) fn spawn(signals: &[i32], gate: Arc<Gate>) -> CoordinatorResult<Self> {
        let mut subscription = Signals::new(signals)?;
        let handle = subscription.handle();

        // The thread detaches; it either fires the gate once or ends when
        // the handle is closed.
        let _ = thread::Builder::new()
            .name("teardown-signals".into())
            .spawn(move || {
                if let Some(signal) = subscription.forever().next() {
                    let trigger = classify(signal);
                    info!("received signal {}, requesting {:?} shutdown", signal, trigger);
                    gate.fire(trigger);
                }
            })?;

        Ok(Self { handle })
    }

    /// Stop the forwarding thread without firing the gate.
    pub(crate) fn stop(&self) {
        self.handle.close();
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.stop();
    }
}
