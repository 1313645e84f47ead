//! Stderr logging for chunkscribe crates.
//!
//! Transcription runs print lifecycle progress for minutes at a time,
//! so every line is level-tagged and goes to stderr, keeping stdout
//! clean for the transcript itself. `verbose!` lines are suppressed
//! unless `set_verbose(true)` was called; the other levels always
//! print.

use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enable or disable debug-level output
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::SeqCst);
}

/// Check whether debug-level output is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Write one level-tagged line to stderr; the logging macros funnel
/// through here so the line format stays in one place
pub fn log_line(level: &str, message: std::fmt::Arguments<'_>) {
    eprintln!("chunkscribe[{level}] {message}");
}

/// Log a debug message, shown only when verbose mode is enabled
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::verbose::is_verbose() {
            $crate::verbose::log_line("debug", format_args!($($arg)*));
        }
    };
}

/// Log a progress/status message
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::verbose::log_line("info", format_args!($($arg)*))
    };
}

/// Log a warning
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::verbose::log_line("warn", format_args!($($arg)*))
    };
}

/// Log an error
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::verbose::log_line("error", format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_roundtrip() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
