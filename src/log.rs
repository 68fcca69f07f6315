// src/log.rs
//
// Logging front-end. The macros keep their short names and forward to
// `tracing`; whoever owns the process (the CLI, a test, an embedding UI)
// decides where events go by installing a subscriber.

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        ::tracing::error!($($arg)*)
    };
}

/// Install a stderr `fmt` subscriber. `verbosity` counts `-v` flags.
/// Calling it twice is harmless; the second install is ignored.
#[cfg(feature = "cli")]
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
