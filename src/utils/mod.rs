//! Utilities: logging setup (dynamic level from -v / -q) and the scoped
//! progress spinner handed to every tool call.
//!
//! Key items:
//!   init_logging / derive_level
//!   Progress (start / note / succeed / fail; cleared on drop)

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Logging helpers.
pub mod logging {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::filter::LevelFilter;

    /// Map CLI verbosity to a level. Default is WARN so log lines do not
    /// interleave with interactive prompts; RUST_LOG still overrides.
    pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::ERROR;
        }
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Install the global stderr subscriber. Safe to call twice (second call is a no-op).
    pub fn init_logging(level: LevelFilter) {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};

/// Spinner scoped to one tool call. Created by the caller, passed by
/// reference into the invocation, finished (or cleared on drop) afterwards.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Start a spinner on stderr; hidden when disabled or stderr is not a TTY.
    pub fn start(message: impl Into<String>, enabled: bool) -> Self {
        if !enabled || !std::io::stderr().is_terminal() {
            return Self::hidden();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Show what is currently running.
    pub fn note(&self, running: impl AsRef<str>) {
        self.bar.set_message(format!("run : {}", running.as_ref()));
    }

    pub fn succeed(self, message: impl Into<String>) {
        self.bar.finish_with_message(format!("✔ {}", message.into()));
    }

    pub fn fail(self, message: impl Into<String>) {
        self.bar.abandon_with_message(format!("✖ {}", message.into()));
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
