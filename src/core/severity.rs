//! Severity definitions and threshold semantics

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered severity of a log event.
///
/// `Print` and `None` are sentinels: print calls bypass the threshold entirely,
/// and `None` is only meaningful as a threshold that suppresses every leveled call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Severity {
    Print = 0,
    #[default]
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Panic = 5,
    Fatal = 6,
    None = 7,
}

impl Severity {
    /// Every severity in rank order
    pub const ALL: [Severity; 8] = [
        Severity::Print,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Panic,
        Severity::Fatal,
        Severity::None,
    ];

    /// Highest valid rank
    pub const MAX_RANK: u8 = Severity::None as u8;

    #[inline]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// `true` when a message of this severity passes `threshold`
    #[inline]
    pub fn passes(self, threshold: Severity) -> bool {
        self >= threshold
    }

    /// Trimmed name, e.g. `"Info"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Print => "Print",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warn => "Warn",
            Severity::Error => "Error",
            Severity::Panic => "Panic",
            Severity::Fatal => "Fatal",
            Severity::None => "None",
        }
    }

    /// Five character, right-aligned label used in formatted lines
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Print => "Print",
            Severity::Debug => "Debug",
            Severity::Info => " Info",
            Severity::Warn => " Warn",
            Severity::Error => "Error",
            Severity::Panic => "Panic",
            Severity::Fatal => "Fatal",
            Severity::None => " None",
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Severity::Print | Severity::None => White,
            Severity::Debug => Blue,
            Severity::Info => Green,
            Severity::Warn => Yellow,
            Severity::Error => Red,
            Severity::Panic | Severity::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "print" => Ok(Severity::Print),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "panic" => Ok(Severity::Panic),
            "fatal" => Ok(Severity::Fatal),
            "none" | "off" => Ok(Severity::None),
            _ => Err(LoggerError::UnknownLevel(s.to_string())),
        }
    }
}

impl TryFrom<i64> for Severity {
    type Error = LoggerError;

    fn try_from(value: i64) -> Result<Self, LoggerError> {
        usize::try_from(value)
            .ok()
            .and_then(|idx| Severity::ALL.get(idx).copied())
            .ok_or(LoggerError::InvalidLevel {
                value,
                max: Severity::MAX_RANK,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order() {
        for pair in Severity::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].rank() + 1, pair[1].rank());
        }
    }

    #[test]
    fn test_passes() {
        assert!(Severity::Warn.passes(Severity::Warn));
        assert!(Severity::Error.passes(Severity::Warn));
        assert!(!Severity::Info.passes(Severity::Warn));
        assert!(!Severity::Fatal.passes(Severity::None));
    }

    #[test]
    fn test_labels_are_five_wide() {
        for level in Severity::ALL {
            assert_eq!(level.label().len(), 5, "label for {level}");
            assert_eq!(level.label().trim_start(), level.as_str());
        }
    }

    #[test]
    fn test_try_from_range() {
        assert_eq!(Severity::try_from(0).unwrap(), Severity::Print);
        assert_eq!(Severity::try_from(7).unwrap(), Severity::None);
        assert!(matches!(
            Severity::try_from(8),
            Err(LoggerError::InvalidLevel { value: 8, .. })
        ));
        assert!(Severity::try_from(-1).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!(" info ".parse::<Severity>().unwrap(), Severity::Info);
        assert!("verbose".parse::<Severity>().is_err());
    }
}
