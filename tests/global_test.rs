/*!
 * Process-Wide Instance Tests
 * Covers installation of the default coordinator and the free-function
 * surface, including the fatal! macro
 *
 * A triggered global coordinator stays in the done state for the rest of
 * the process, so everything lives in a single test function.
 */

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use teardown::{Config, CoordinatorError};

#[test]
fn installed_global_coordinator_drives_the_error_path_once() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (code_tx, code_rx) = flume::unbounded();
    let config = Config::default()
        .with_exit_codes(0, 7)
        .with_exit_hook(move |code| {
            let _ = code_tx.send(code);
        });
    teardown::init(config).expect("first install");

    // the configuration is fixed once installed
    let reinstall = teardown::init(Config::default());
    assert!(matches!(
        reinstall,
        Err(CoordinatorError::AlreadyInitialized)
    ));

    let quit_runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&quit_runs);
    teardown::bind_quit(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&quit_runs);
    teardown::bind_interrupt(move || {
        counter.fetch_add(100, Ordering::SeqCst);
    });

    teardown::fatal!("disk full on {}", "/var/lib/db");

    let code = code_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("teardown did not complete");
    assert_eq!(code, 7);
    assert_eq!(quit_runs.load(Ordering::SeqCst), 1);

    // later close-class calls only wait for the already-finished teardown
    teardown::close();
    teardown::hold();
    assert!(code_rx.recv_timeout(Duration::from_millis(200)).is_err());
    assert_eq!(quit_runs.load(Ordering::SeqCst), 1);
}
