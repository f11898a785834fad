//! Report period selection
//!
//! A `PeriodSelector` names a window relative to "today" (or an explicit
//! custom range) and resolves to an inclusive `DateRange` of calendar days.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::date::parse_date_token;

/// Selector names without the custom bounds; used in settings and on the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    #[default]
    All,
    Weekly,
    Biweekly,
    Monthly,
    Custom,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "all-time" => Ok(Self::All),
            "weekly" | "week" => Ok(Self::Weekly),
            "biweekly" | "bi-weekly" => Ok(Self::Biweekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "custom" => Ok(Self::Custom),
            other => Err(format!(
                "unknown period '{}' (expected all, weekly, biweekly, monthly or custom)",
                other
            )),
        }
    }
}

/// Which transactions a report covers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PeriodSelector {
    /// Everything up to and including today
    #[default]
    All,
    /// Most recent Sunday through today
    Weekly,
    /// The last 14 days including today
    Biweekly,
    /// First of the current month through today
    Monthly,
    /// Explicit bounds, as entered by the user
    Custom {
        start: Option<String>,
        end: Option<String>,
    },
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Why a custom range could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("custom range is missing its {0} date")]
    MissingBound(&'static str),

    #[error("could not parse {bound} date '{value}'")]
    UnparseableBound { bound: &'static str, value: String },

    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Start of the "all time" window
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl PeriodSelector {
    /// Build a selector from its kind and optional custom bounds
    pub fn from_kind(kind: PeriodKind, start: Option<String>, end: Option<String>) -> Self {
        match kind {
            PeriodKind::All => Self::All,
            PeriodKind::Weekly => Self::Weekly,
            PeriodKind::Biweekly => Self::Biweekly,
            PeriodKind::Monthly => Self::Monthly,
            PeriodKind::Custom => Self::Custom { start, end },
        }
    }

    pub fn custom(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Custom {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    pub fn kind(&self) -> PeriodKind {
        match self {
            Self::All => PeriodKind::All,
            Self::Weekly => PeriodKind::Weekly,
            Self::Biweekly => PeriodKind::Biweekly,
            Self::Monthly => PeriodKind::Monthly,
            Self::Custom { .. } => PeriodKind::Custom,
        }
    }

    /// Resolve to concrete inclusive bounds relative to `today`
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, RangeError> {
        let range = match self {
            Self::All => DateRange {
                start: epoch(),
                end: today,
            },
            Self::Weekly => {
                let since_sunday = today.weekday().num_days_from_sunday() as i64;
                DateRange {
                    start: today - Duration::days(since_sunday),
                    end: today,
                }
            }
            Self::Biweekly => DateRange {
                start: today - Duration::days(13),
                end: today,
            },
            Self::Monthly => DateRange {
                start: today.with_day(1).unwrap_or(today),
                end: today,
            },
            Self::Custom { start, end } => {
                let start = parse_bound("start", start.as_deref())?;
                let end = parse_bound("end", end.as_deref())?;
                if start > end {
                    return Err(RangeError::Inverted { start, end });
                }
                DateRange { start, end }
            }
        };

        Ok(range)
    }

    /// Human readable name of the window
    pub fn label(&self, today: NaiveDate) -> String {
        match self {
            Self::All => "All Time".to_string(),
            Self::Weekly => "This Week".to_string(),
            Self::Biweekly => "Last 14 Days".to_string(),
            Self::Monthly => "This Month".to_string(),
            Self::Custom { .. } => match self.resolve(today) {
                Ok(range) => format!(
                    "Custom: {} - {}",
                    range.start.format("%m/%d/%y"),
                    range.end.format("%m/%d/%y")
                ),
                Err(_) => "Invalid Custom Range".to_string(),
            },
        }
    }
}

fn parse_bound(bound: &'static str, value: Option<&str>) -> Result<NaiveDate, RangeError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(RangeError::MissingBound(bound))?;

    parse_date_token(value).ok_or_else(|| RangeError::UnparseableBound {
        bound,
        value: value.to_string(),
    })
}
