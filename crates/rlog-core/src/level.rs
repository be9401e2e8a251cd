//! Severity levels and their fixed rank/color tables.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::markup::Color;

/// Severity of a console message, and the threshold it is compared against.
///
/// The order is defined by [`LogLevel::rank`]: a higher rank is more verbose.
/// A threshold of `Unset` lets nothing but `Unset` through; `Trace` lets
/// everything through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No level; the quietest threshold.
    Unset,
    /// Failures.
    Error,
    /// Potential problems (default threshold).
    #[default]
    Warn,
    /// Normal progress messages.
    Info,
    /// Detail useful while debugging.
    Debug,
    /// Everything.
    Trace,
}

/// Returned when parsing a level name fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level `{0}` (expected one of: unset, error, warn, info, debug, trace)")]
pub struct UnknownLevel(pub String);

impl LogLevel {
    /// All levels, lowest rank first.
    pub const ALL: [Self; 6] = [
        Self::Unset,
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    /// Position in the verbosity order.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Trace => 5,
            Self::Debug => 4,
            Self::Info => 3,
            Self::Warn => 2,
            Self::Error => 1,
            Self::Unset => 0,
        }
    }

    /// Inverse of [`rank`](Self::rank). Ranks above 5 saturate to `Trace`.
    pub const fn from_rank(rank: u8) -> Self {
        match rank {
            0 => Self::Unset,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Base display color of the level's prefix.
    pub const fn color(self) -> Color {
        match self {
            Self::Trace | Self::Unset => Color::White,
            Self::Debug => Color::Blue,
            Self::Info => Color::Green,
            Self::Warn | Self::Error => Color::Red,
        }
    }

    /// Lowercase name, as used in config files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Uppercase name, as shown in the console prefix.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unset => "UNSET",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Messages at this level go to the error stream.
    pub const fn uses_error_stream(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }

    /// Whether a message at `level` passes a threshold of `self`.
    pub const fn allows(self, level: Self) -> bool {
        self.rank() >= level.rank()
    }

    /// Equivalent `tracing` filter directive.
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Unset => "off",
            other => other.as_str(),
        }
    }
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unset" => Ok(Self::Unset),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_table() {
        let ranks: Vec<u8> = LogLevel::ALL.iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn ordering_matches_rank() {
        for a in LogLevel::ALL {
            for b in LogLevel::ALL {
                assert_eq!(a > b, a.rank() > b.rank(), "{a} vs {b}");
                assert_eq!(a.cmp(&b), a.rank().cmp(&b.rank()));
            }
        }
        assert!(LogLevel::Trace > LogLevel::Debug);
        assert!(LogLevel::Error < LogLevel::Warn);
    }

    #[test]
    fn from_rank_inverts_rank() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_rank(level.rank()), level);
        }
        assert_eq!(LogLevel::from_rank(42), LogLevel::Trace);
    }

    #[test]
    fn colors_are_fixed() {
        assert_eq!(LogLevel::Trace.color(), Color::White);
        assert_eq!(LogLevel::Unset.color(), Color::White);
        assert_eq!(LogLevel::Debug.color(), Color::Blue);
        assert_eq!(LogLevel::Info.color(), Color::Green);
        assert_eq!(LogLevel::Warn.color(), Color::Red);
        assert_eq!(LogLevel::Error.color(), Color::Red);
    }

    #[test]
    fn default_is_warn() {
        assert_eq!(LogLevel::default(), LogLevel::Warn);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(" trace ".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn only_warn_and_error_use_error_stream() {
        let routed: Vec<LogLevel> = LogLevel::ALL
            .into_iter()
            .filter(|l| l.uses_error_stream())
            .collect();
        assert_eq!(routed, vec![LogLevel::Error, LogLevel::Warn]);
    }

    #[test]
    fn unset_maps_to_off_directive() {
        assert_eq!(LogLevel::Unset.directive(), "off");
        assert_eq!(LogLevel::Debug.directive(), "debug");
    }
}
