/*!
 * Panic Frame Reporting
 * Bounded stack walk formatted when a guarded call recovers a panic
 */

use std::fmt::Write as _;

/// Upper bound on walked frames
const MAX_FRAMES: usize = 32;

/// Frames skipped above the recovery point (the walk machinery itself)
const SKIP_FRAMES: usize = 3;

/// Format up to [`MAX_FRAMES`] resolvable frames of the current stack,
/// starting [`SKIP_FRAMES`] above the caller.
///
/// Diagnostic only: the walk ends at the first frame whose symbol cannot
/// be resolved, which is treated as natural termination rather than an
/// error.
pub(crate) fn capture() -> String {
    let mut report = String::new();
    let mut index = 0usize;

    backtrace::trace(|frame| {
        index += 1;
        if index <= SKIP_FRAMES {
            return true;
        }
        if index > SKIP_FRAMES + MAX_FRAMES {
            return false;
        }

        let mut resolved = false;
        backtrace::resolve_frame(frame, |symbol| {
            if let Some(name) = symbol.name() {
                resolved = true;
                let _ = write!(report, "  at {}", name);
                if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
                    let _ = write!(report, " ({}:{})", file.display(), line);
                }
                report.push('\n');
            }
        });

        resolved
    });

    report
}
