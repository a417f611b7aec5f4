//! Per-module loggers for the weft crates.
//!
//! Loggers are switched on through the environment:
//! - `WEFT_LOG=*` (or `1`, `true`) enables every logger
//! - `WEFT_LOG=match` enables only the match engine
//! - `WEFT_LOG=match,bnf` enables several
//!
//! `WEFT_LOG_LEVEL` (0-3, default 1) selects how chatty enabled loggers are.
//! A program can install its own [`LogConfig`] with [`configure`] before the
//! first logger is created; afterwards the configuration is fixed.

use std::collections::HashSet;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

pub const ENV_LOG: &str = "WEFT_LOG";
pub const ENV_LOG_LEVEL: &str = "WEFT_LOG_LEVEL";

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Enabled {
    All,
    None,
    Some(HashSet<String>),
}

/// Which loggers are enabled and at what verbosity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    enabled: Enabled,
    level: u8,
}

impl LogConfig {
    /// Everything off.
    pub fn disabled() -> Self {
        Self { enabled: Enabled::None, level: 1 }
    }

    /// Build from a logger list (`*`, `match,bnf`, ...) and an optional level.
    pub fn parse(spec: &str, level: Option<u8>) -> Self {
        let enabled = match spec.trim() {
            "" | "0" | "false" => Enabled::None,
            "*" | "1" | "true" => Enabled::All,
            value => {
                let set: HashSet<_> = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if set.is_empty() { Enabled::None } else { Enabled::Some(set) }
            }
        };
        Self { enabled, level: level.unwrap_or(1).min(3) }
    }

    /// Read `WEFT_LOG` and `WEFT_LOG_LEVEL`.
    pub fn from_env() -> Self {
        let level = env::var(ENV_LOG_LEVEL).ok().and_then(|v| v.trim().parse().ok());
        match env::var(ENV_LOG) {
            Ok(spec) => Self::parse(&spec, level),
            Err(_) => Self { level: level.unwrap_or(1).min(3), ..Self::disabled() },
        }
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        match &self.enabled {
            Enabled::None => false,
            Enabled::All => true,
            Enabled::Some(set) => set.contains(name),
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

static CONFIG: OnceLock<LogConfig> = OnceLock::new();

fn config() -> &'static LogConfig {
    CONFIG.get_or_init(LogConfig::from_env)
}

/// Install `config` as the process-wide logging configuration.
///
/// Returns `false` when a configuration was already in place (either installed
/// earlier or read from the environment by a logger created before this call).
pub fn configure(config: LogConfig) -> bool {
    CONFIG.set(config).is_ok()
}

// ============================================================================
// Logger
// ============================================================================

pub struct Logger {
    name: &'static str,
    level: u8,
    indent: AtomicUsize,
}

impl Logger {
    pub const fn disabled() -> Self {
        Self { name: "", level: 0, indent: AtomicUsize::new(0) }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.level > 0
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn emit(&self, min_level: u8, tag: &str, msg: &str) {
        if self.level < min_level {
            return;
        }
        let indent = self.indent.load(Ordering::Relaxed);
        eprintln!("{}[{}] {}{}", "  ".repeat(indent), self.name, tag, msg);
    }

    #[inline]
    pub fn log(&self, msg: &str) {
        self.emit(1, "", msg);
    }

    #[inline]
    pub fn detail(&self, msg: &str) {
        self.emit(2, "", msg);
    }

    #[inline]
    pub fn trace(&self, msg: &str) {
        self.emit(3, "", msg);
    }

    #[inline]
    pub fn success(&self, msg: &str) {
        self.emit(1, "OK: ", msg);
    }

    #[inline]
    pub fn fail(&self, msg: &str) {
        self.emit(1, "FAIL: ", msg);
    }

    #[inline]
    pub fn push_indent(&self) {
        if self.enabled() {
            self.indent.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn pop_indent(&self) {
        if self.enabled() {
            let _ = self
                .indent
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(1)));
        }
    }
}

/// Create a logger. The name must be a static string.
pub fn create_logger(name: &'static str) -> Logger {
    let config = config();
    if config.is_enabled(name) && config.level > 0 {
        Logger { name, level: config.level, indent: AtomicUsize::new(0) }
    } else {
        Logger::disabled()
    }
}

// ============================================================================
// Macros - avoid format! cost when disabled
// ============================================================================

#[macro_export]
macro_rules! log {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.log(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_detail {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.detail(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.trace(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_success {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.success(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_fail {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.fail(&format!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all() {
        for spec in ["*", "1", "true"] {
            let config = LogConfig::parse(spec, None);
            assert!(config.is_enabled("match"));
            assert!(config.is_enabled("anything"));
        }
    }

    #[test]
    fn test_parse_list() {
        let config = LogConfig::parse(" match , bnf ,", Some(2));
        assert!(config.is_enabled("match"));
        assert!(config.is_enabled("bnf"));
        assert!(!config.is_enabled("init"));
        assert_eq!(config.level(), 2);
    }

    #[test]
    fn test_parse_off() {
        for spec in ["", "0", "false", " , "] {
            assert!(!LogConfig::parse(spec, None).is_enabled("match"));
        }
    }

    #[test]
    fn test_level_is_clamped() {
        assert_eq!(LogConfig::parse("*", Some(9)).level(), 3);
    }

    #[test]
    fn test_disabled_logger_is_silent() {
        let logger = Logger::disabled();
        assert!(!logger.enabled());
        logger.push_indent();
        logger.pop_indent();
        log!(logger, "never formatted {}", 1);
    }
}
