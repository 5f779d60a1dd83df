//! Report Mode
//!
//! The two-valued toggle that selects which question set and overview
//! are active.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ReflectionError;

/// Which daily report the user is filling out
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Start-of-day planning
    #[default]
    Morning,
    /// End-of-day review
    Evening,
}

impl ReportMode {
    /// Get all modes for iteration
    pub fn all() -> &'static [ReportMode] {
        &[ReportMode::Morning, ReportMode::Evening]
    }

    /// Wire and storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Morning => "morning",
            ReportMode::Evening => "evening",
        }
    }

    /// Heading shown on the mode toggle and overview
    pub fn title(&self) -> &'static str {
        match self {
            ReportMode::Morning => "Morning Report",
            ReportMode::Evening => "Evening Report",
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ReportMode {
    type Err = ReflectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(ReportMode::Morning),
            "evening" => Ok(ReportMode::Evening),
            other => Err(ReflectionError::Configuration(format!(
                "unrecognized report mode '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_morning() {
        assert_eq!(ReportMode::default(), ReportMode::Morning);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Evening".parse::<ReportMode>().unwrap(), ReportMode::Evening);
        assert_eq!(" morning ".parse::<ReportMode>().unwrap(), ReportMode::Morning);
    }

    #[test]
    fn test_parse_unknown_mode() {
        let err = "afternoon".parse::<ReportMode>().unwrap_err();
        assert!(matches!(err, ReflectionError::Configuration(_)));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ReportMode::Evening).unwrap();
        assert_eq!(json, "\"evening\"");
        let mode: ReportMode = serde_json::from_str("\"morning\"").unwrap();
        assert_eq!(mode, ReportMode::Morning);
    }
}
