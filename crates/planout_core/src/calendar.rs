use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How often a task repeats. `Once` has a zero-length period.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(try_from = "String")]
pub enum Frequency {
    #[default]
    Once,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn is_repeating(self) -> bool {
        !matches!(self, Frequency::Once)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Once => "Once",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }

    /// Moves `date` by `periods` whole periods (negative moves backwards).
    ///
    /// This is the only place period arithmetic happens. Months clamp to the
    /// last day of the target month, so 2024-01-31 + 1 month is 2024-02-29.
    /// `None` is returned only when the result leaves chrono's date range.
    pub fn advance(self, date: NaiveDate, periods: i32) -> Option<NaiveDate> {
        match self {
            Frequency::Once => Some(date),
            Frequency::Daily => date.checked_add_signed(Duration::days(periods.into())),
            Frequency::Weekly => date.checked_add_signed(Duration::weeks(periods.into())),
            Frequency::Monthly => {
                let months = Months::new(periods.unsigned_abs());
                if periods >= 0 {
                    date.checked_add_months(months)
                } else {
                    date.checked_sub_months(months)
                }
            }
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "once" => Ok(Frequency::Once),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(ModelError::UnknownFrequency(s.to_string())),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A repeating series: the anchor occurrence plus its frequency.
///
/// Series dates are always computed from the anchor (`anchor + k periods`)
/// rather than by stepping from the previous occurrence, so month-end clamping
/// never drifts: a series anchored on Jan 31 yields Feb 29 and then Mar 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    pub anchor: NaiveDate,
    pub frequency: Frequency,
}

impl Recurrence {
    pub fn new(anchor: NaiveDate, frequency: Frequency) -> Self {
        Self { anchor, frequency }
    }

    /// The `k`-th occurrence, where `0` is the anchor.
    pub fn nth(&self, k: u32) -> Option<NaiveDate> {
        if k == 0 {
            return Some(self.anchor);
        }
        if !self.frequency.is_repeating() {
            return None;
        }
        self.frequency.advance(self.anchor, i32::try_from(k).ok()?)
    }

    /// Position of `date` within the series, if it is a series date.
    pub fn index_of(&self, date: NaiveDate) -> Option<u32> {
        if date < self.anchor {
            return None;
        }
        let days = date.signed_duration_since(self.anchor).num_days();
        let k = match self.frequency {
            Frequency::Once => 0,
            Frequency::Daily => days,
            Frequency::Weekly => {
                if days % 7 != 0 {
                    return None;
                }
                days / 7
            }
            Frequency::Monthly => i64::from(months_between(self.anchor, date)),
        };
        let k = u32::try_from(k).ok()?;
        (self.nth(k)? == date).then_some(k)
    }

    /// Moves `date` by `delta` periods.
    ///
    /// A date lying on the series moves to the neighbouring series date;
    /// anything else moves by plain period arithmetic.
    pub fn shift(&self, date: NaiveDate, delta: i32) -> Option<NaiveDate> {
        if !self.frequency.is_repeating() {
            return Some(date);
        }
        if let Some(k) = self.index_of(date) {
            let target = i64::from(k) + i64::from(delta);
            if target >= 0 {
                return self.nth(u32::try_from(target).ok()?);
            }
        }
        self.frequency.advance(date, delta)
    }
}

/// Truncates a date-time to its calendar date (midnight).
pub fn normalize(moment: NaiveDateTime) -> NaiveDate {
    moment.date()
}

pub fn to_date_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses `YYYY-MM-DD`, or an ISO date-time whose calendar date is kept.
pub fn parse_date(input: &str) -> Result<NaiveDate, ModelError> {
    let trimmed = input.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, DATE_FORMAT)
        .map_err(|_| ModelError::InvalidDate(input.to_string()))
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32)
}

/// Serde adapter for optional dates that may arrive as full date-times.
pub mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_some(&super::to_date_string(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => Ok(None),
            Some(value) => super::parse_date(&value)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
