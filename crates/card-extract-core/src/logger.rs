//! Minimal stderr logger.
//!
//! Prints `[elapsed LEVEL target] message`. Records from this workspace
//! (`card_extract*` targets) pass at the configured level; everything else
//! is capped at `warn`. Use `init_with_level` once at startup; later calls
//! are no-ops.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const OWN_TARGET: &str = "card_extract";

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn threshold(&self, target: &str) -> LevelFilter {
        if target.starts_with(OWN_TARGET) {
            self.level
        } else {
            self.level.min(LevelFilter::Warn)
        }
    }
}

fn format_line(elapsed: f64, level: Level, target: &str, args: &std::fmt::Arguments<'_>) -> String {
    let mut line = String::with_capacity(64);
    let _ = write!(line, "[{elapsed:7.3}s {level:>5} {target}] {args}");
    line
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.threshold(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Fails only when a different logger was installed by someone else.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber with span close timings.
///
/// With `level` set, this workspace logs at that level and everything else
/// at `warn`. Otherwise the filter is read from `CARD_EXTRACT_LOG` (same
/// syntax as `RUST_LOG`), falling back to `info` for this workspace.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, level: Option<LevelFilter>) {
    let filter = match level {
        Some(level) => EnvFilter::new(default_directives(level)),
        None => EnvFilter::try_from_env(crate::LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(default_directives(LevelFilter::Info))),
    };
    let builder = fmt().with_env_filter(filter).with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.with_timer(fmt::time::Uptime::default()).finish().try_init()
    };
}

#[cfg(feature = "tracing")]
fn default_directives(level: LevelFilter) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,card_extract={level},card_extract_core={level},card_extract_detect={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_targets_are_capped_at_warn() {
        let logger = StderrLogger {
            level: LevelFilter::Debug,
            started: Instant::now(),
        };
        assert_eq!(logger.threshold("card_extract_detect::ranking"), LevelFilter::Debug);
        assert_eq!(logger.threshold("png::decoder"), LevelFilter::Warn);

        let quiet = StderrLogger {
            level: LevelFilter::Error,
            started: Instant::now(),
        };
        assert_eq!(quiet.threshold("png::decoder"), LevelFilter::Error);
    }

    #[test]
    fn line_carries_level_and_target() {
        let line = format_line(1.5, Level::Warn, "card_extract_detect", &format_args!("region {} low", 3));
        assert_eq!(line, "[  1.500s  WARN card_extract_detect] region 3 low");
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn directives_raise_only_own_targets() {
        assert_eq!(
            default_directives(LevelFilter::Debug),
            "warn,card_extract=debug,card_extract_core=debug,card_extract_detect=debug"
        );
    }
}
