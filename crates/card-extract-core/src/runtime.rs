//! Process-wide one-time setup.

use std::str::FromStr;
use std::sync::OnceLock;

use log::LevelFilter;

use crate::init_with_level;

/// Environment variable read by [`init`] for the log level.
pub const LOG_ENV_VAR: &str = "CARD_EXTRACT_LOG";

/// What [`init`] settled on. Immutable after the first call.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeInfo {
    pub log_level: LevelFilter,
    /// `false` when another logger was already installed by the host.
    pub logger_installed: bool,
}

static RUNTIME: OnceLock<RuntimeInfo> = OnceLock::new();

/// One-time initialization. Safe to call repeatedly and from several
/// threads; only the first call does any work.
pub fn init() -> &'static RuntimeInfo {
    init_at(None)
}

/// Same as [`init`], with an explicit `level` taking precedence over
/// `CARD_EXTRACT_LOG`. Only the first call of either function has an effect.
pub fn init_at(level: Option<LevelFilter>) -> &'static RuntimeInfo {
    RUNTIME.get_or_init(|| {
        let log_level = resolve_level(level, std::env::var(LOG_ENV_VAR).ok().as_deref());
        let logger_installed = init_with_level(log_level).is_ok();
        RuntimeInfo {
            log_level,
            logger_installed,
        }
    })
}

fn resolve_level(explicit: Option<LevelFilter>, env: Option<&str>) -> LevelFilter {
    explicit
        .or_else(|| env.and_then(|raw| LevelFilter::from_str(raw.trim()).ok()))
        .unwrap_or(LevelFilter::Warn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_wins_over_env() {
        assert_eq!(resolve_level(Some(LevelFilter::Debug), Some("error")), LevelFilter::Debug);
        assert_eq!(resolve_level(None, Some(" info ")), LevelFilter::Info);
        assert_eq!(resolve_level(None, Some("loud")), LevelFilter::Warn);
        assert_eq!(resolve_level(None, None), LevelFilter::Warn);
    }

    #[test]
    fn init_is_idempotent() {
        let first = init() as *const RuntimeInfo;
        let second = init() as *const RuntimeInfo;
        assert_eq!(first, second);
    }
}
