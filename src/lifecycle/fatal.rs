//! Fatal error reporting.
//!
//! Every unrecoverable failure ends here: one prefixed line on stderr, one
//! structured `error` event, then exit code 1. Both channels are written by
//! [`report`] so they always agree on whether a fatal event happened.

use std::cell::Cell;
use std::fmt::Display;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

/// Prefix identifying this tool on stderr.
pub const TOOL_NAME: &str = "s3cache";

/// Exit code for every fatal path.
pub const EXIT_FAILURE: i32 = 1;

static REPORTING: AtomicBool = AtomicBool::new(false);

thread_local! {
    static IN_FATAL: Cell<bool> = const { Cell::new(false) };
}

/// Collapse a message onto a single line.
pub fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Write the fatal message to `stderr` and to the logging sink.
pub fn report<W: Write>(stderr: &mut W, message: &str) {
    let message = single_line(message);
    // stderr may be closed; the log entry is still attempted.
    let _ = writeln!(stderr, "{}: {}", TOOL_NAME, message);
    let _ = stderr.flush();
    tracing::error!(fatal = true, "{}", message);
}

/// Report `error` and terminate the process with exit code 1.
///
/// Only the first caller reports; a concurrent second fatal error (for
/// example a panic on a worker thread while the main thread is already
/// failing) waits here until the process is gone. A fault raised by the
/// report itself re-enters on the same thread and exits at once.
pub fn fatal_error(error: impl Display) -> ! {
    if IN_FATAL.with(|flag| flag.replace(true)) {
        std::process::exit(EXIT_FAILURE);
    }

    if REPORTING.swap(true, Ordering::SeqCst) {
        loop {
            std::thread::park();
        }
    }

    report(&mut std::io::stderr().lock(), &error.to_string());
    std::process::exit(EXIT_FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("boom"), "boom");
        assert_eq!(single_line("first\n  second\n\nthird\n"), "first | second | third");
    }

    #[test]
    fn test_report_writes_both_channels_once() {
        let log = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .finish();

        let mut stderr = Vec::new();
        tracing::subscriber::with_default(subscriber, || {
            report(&mut stderr, "Could not resolve AWS credentials: none\nfound");
        });

        assert_eq!(
            String::from_utf8(stderr).unwrap(),
            "s3cache: Could not resolve AWS credentials: none | found\n"
        );

        let log = log.text();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("ERROR"));
        assert!(log.contains("Could not resolve AWS credentials: none | found"));
        assert!(log.contains("fatal=true"));
    }
}
