//! Validated value types shared by the stores and the engine.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Minimum acceptable attendance percentage for a subject.
///
/// Always within `50..=100`. Deserializing an out-of-range value fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Target(u8);

impl Target {
    pub const MIN: u8 = 50;
    pub const MAX: u8 = 100;

    /// Creates a target after range validation.
    pub fn new(value: i64) -> Result<Self, Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(Error::InvalidTarget(value))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether the target demands every single class.
    #[must_use]
    pub const fn is_full(self) -> bool {
        self.0 == Self::MAX
    }
}

impl Default for Target {
    fn default() -> Self {
        Self(75)
    }
}

impl TryFrom<i64> for Target {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Target> for u8 {
    fn from(target: Target) -> Self {
        target.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// The attendance result recorded for a subject on one date.
///
/// Older data files tagged outcomes as `Present`/`Absent`; both spellings
/// are accepted on read, and the canonical tag is always written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[serde(alias = "Present", alias = "present", alias = "Attended")]
    Attended,
    #[serde(alias = "Absent", alias = "absent", alias = "Missed")]
    Missed,
}

impl Outcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attended => "attended",
            Self::Missed => "missed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for unknown outcome strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOutcome(String);

impl fmt::Display for UnknownOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown outcome: {} (expected present/attended or absent/missed)",
            self.0
        )
    }
}

impl std::error::Error for UnknownOutcome {}

impl FromStr for Outcome {
    type Err = UnknownOutcome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attended" | "present" | "p" => Ok(Self::Attended),
            "missed" | "absent" | "a" => Ok(Self::Missed),
            _ => Err(UnknownOutcome(s.to_string())),
        }
    }
}

/// A weekday used as a timetable key.
///
/// Ordered Monday first, so maps keyed by `Day` iterate in calendar order.
/// Serialized as the full English name (`"Monday"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Day(Weekday);

impl Day {
    /// Every weekday, Monday first.
    pub const ALL: [Self; 7] = [
        Self(Weekday::Mon),
        Self(Weekday::Tue),
        Self(Weekday::Wed),
        Self(Weekday::Thu),
        Self(Weekday::Fri),
        Self(Weekday::Sat),
        Self(Weekday::Sun),
    ];

    /// Monday through Saturday, the default teaching week.
    pub const TEACHING_WEEK: [Self; 6] = [
        Self(Weekday::Mon),
        Self(Weekday::Tue),
        Self(Weekday::Wed),
        Self(Weekday::Thu),
        Self(Weekday::Fri),
        Self(Weekday::Sat),
    ];

    #[must_use]
    pub const fn weekday(self) -> Weekday {
        self.0
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.0 {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        Self(weekday)
    }
}

impl PartialOrd for Day {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Day {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .num_days_from_monday()
            .cmp(&other.0.num_days_from_monday())
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Day {
    type Err = Error;

    /// Accepts full or three-letter names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Weekday>()
            .map(Self)
            .map_err(|_| Error::UnknownDay(s.to_string()))
    }
}

impl Serialize for Day {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
