//! Log message severity levels.
//!
//! Levels are ordered by verbosity: a higher ordinal is more verbose. A message is emitted when its
//! severity is less than or equal to the level configured for its tag, so [`Severity::None`] as a
//! configured level silences a tag entirely.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Log message severity levels.
///
/// The ordinal values are stable and match the display order of [`Severity::ALL`].
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Severity {
    /// No messages at all. Only meaningful as a configured level.
    #[serde(rename = "NONE")]
    None = 0,

    /// The "error" level.
    ///
    /// Designates very serious errors.
    #[serde(rename = "ERROR")]
    Error = 1,

    /// The "warn" level.
    ///
    /// Designates hazardous situations.
    #[serde(rename = "WARN")]
    Warn = 2,

    /// The "info" level.
    ///
    /// Designates useful information.
    #[serde(rename = "INFO")]
    Info = 3,

    /// The "debug" level.
    ///
    /// Designates lower priority information.
    #[default]
    #[serde(rename = "DEBUG")]
    Debug = 4,

    /// The "verbose" level.
    ///
    /// Designates very low priority, often extremely verbose, information.
    #[serde(rename = "VERBOSE")]
    Verbose = 5,

    /// The "very verbose" level.
    ///
    /// Designates information that is only useful while debugging the logger's neighbours
    /// themselves, e.g. per-byte bus traffic.
    #[serde(rename = "VERY_VERBOSE")]
    VeryVerbose = 6,
}

impl Severity {
    /// Every level, in ordinal order.
    pub const ALL: [Severity; 7] = [
        Severity::None,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
        Severity::Verbose,
        Severity::VeryVerbose,
    ];

    /// Returns the fixed display name of this level.
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Verbose => "VERBOSE",
            Severity::VeryVerbose => "VERY_VERBOSE",
        }
    }

    /// Returns the numeric ordinal of this level.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Maps a [`log`] facade level onto the severity table.
    ///
    /// `Trace` becomes [`Severity::Verbose`]; the facade has no counterpart for
    /// [`Severity::VeryVerbose`].
    pub const fn from_level(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warn,
            log::Level::Info => Severity::Info,
            log::Level::Debug => Severity::Debug,
            log::Level::Trace => Severity::Verbose,
        }
    }

    /// Returns the most permissive [`log::LevelFilter`] that still lets every message at this
    /// severity through the facade.
    pub const fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Severity::None => log::LevelFilter::Off,
            Severity::Error => log::LevelFilter::Error,
            Severity::Warn => log::LevelFilter::Warn,
            Severity::Info => log::LevelFilter::Info,
            Severity::Debug => log::LevelFilter::Debug,
            Severity::Verbose | Severity::VeryVerbose => log::LevelFilter::Trace,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so width/alignment flags work in diagnostic dumps.
        f.pad(self.as_str())
    }
}

/// The error returned when converting an out-of-range ordinal into a [`Severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverity(pub u8);

impl fmt::Display for InvalidSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid severity ordinal {}", self.0)
    }
}

impl core::error::Error for InvalidSeverity {}

impl TryFrom<u8> for Severity {
    type Error = InvalidSeverity;

    fn try_from(value: u8) -> Result<Self, InvalidSeverity> {
        Severity::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(InvalidSeverity(value))
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        severity.as_u8()
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        Severity::from_level(level)
    }
}

/// The error returned when parsing an unknown severity name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSeverityError(());

impl fmt::Display for ParseSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            "unknown severity, expected one of NONE, ERROR, WARN, INFO, DEBUG, VERBOSE, VERY_VERBOSE",
        )
    }
}

impl core::error::Error for ParseSeverityError {}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s))
            .ok_or(ParseSeverityError(()))
    }
}

#[cfg(test)]
mod tests {
    use super::{InvalidSeverity, Severity};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn ordinals_follow_verbosity() {
        for (ordinal, severity) in Severity::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(severity.as_u8()), ordinal);
        }
        assert!(Severity::Error < Severity::Warn);
        assert!(Severity::Verbose < Severity::VeryVerbose);
    }

    #[test_case(Severity::None, "NONE")]
    #[test_case(Severity::Warn, "WARN")]
    #[test_case(Severity::VeryVerbose, "VERY_VERBOSE")]
    fn display_names(severity: Severity, name: &str) {
        assert_eq!(std::format!("{severity}"), name);
        assert_eq!(name.parse::<Severity>(), Ok(severity));
    }

    #[test]
    fn parse_ignores_case() {
        assert_eq!("very_verbose".parse::<Severity>(), Ok(Severity::VeryVerbose));
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn out_of_range_ordinal_is_rejected() {
        assert_eq!(Severity::try_from(3), Ok(Severity::Info));
        assert_eq!(Severity::try_from(7), Err(InvalidSeverity(7)));
    }

    #[test_case(log::Level::Error, Severity::Error)]
    #[test_case(log::Level::Info, Severity::Info)]
    #[test_case(log::Level::Trace, Severity::Verbose)]
    fn facade_levels(level: log::Level, severity: Severity) {
        assert_eq!(Severity::from(level), severity);
    }

    #[test]
    fn level_filters() {
        assert_eq!(Severity::None.to_level_filter(), log::LevelFilter::Off);
        assert_eq!(Severity::Info.to_level_filter(), log::LevelFilter::Info);
        assert_eq!(
            Severity::VeryVerbose.to_level_filter(),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn serde_uses_display_names() {
        assert_eq!(
            serde_json::to_string(&Severity::VeryVerbose).unwrap(),
            "\"VERY_VERBOSE\""
        );
        assert_eq!(
            serde_json::from_str::<Severity>("\"ERROR\"").unwrap(),
            Severity::Error
        );
    }
}
