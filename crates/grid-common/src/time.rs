//! Forecast time units and valid-time arithmetic.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of a forecast time offset (GRIB2 code table 4.4 numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Month,
    Year,
    Decade,
    /// Thirty-year climatological normal.
    Normal,
    Century,
    ThreeHours,
    SixHours,
    TwelveHours,
    Second,
    /// Any code without a known duration.
    Other(i32),
}

impl TimeUnit {
    /// Hours per unit. Months and years use fixed 30 and 365 day lengths;
    /// unknown units count as one hour.
    pub fn hours_factor(&self) -> f64 {
        match self {
            Self::Minute => 1.0 / 60.0,
            Self::Hour => 1.0,
            Self::Day => 24.0,
            Self::Month => 24.0 * 30.0,
            Self::Year => 24.0 * 365.0,
            Self::Decade => 24.0 * 365.0 * 10.0,
            Self::Normal => 24.0 * 365.0 * 30.0,
            Self::Century => 24.0 * 365.0 * 100.0,
            Self::ThreeHours => 3.0,
            Self::SixHours => 6.0,
            Self::TwelveHours => 12.0,
            Self::Second => 1.0 / 3600.0,
            Self::Other(_) => 1.0,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Minute => 0,
            Self::Hour => 1,
            Self::Day => 2,
            Self::Month => 3,
            Self::Year => 4,
            Self::Decade => 5,
            Self::Normal => 6,
            Self::Century => 7,
            Self::ThreeHours => 10,
            Self::SixHours => 11,
            Self::TwelveHours => 12,
            Self::Second => 13,
            Self::Other(code) => *code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Minute,
            1 => Self::Hour,
            2 => Self::Day,
            3 => Self::Month,
            4 => Self::Year,
            5 => Self::Decade,
            6 => Self::Normal,
            7 => Self::Century,
            10 => Self::ThreeHours,
            11 => Self::SixHours,
            12 => Self::TwelveHours,
            13 => Self::Second,
            other => Self::Other(other),
        }
    }

    /// Name used in unit strings such as `"hour"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
            Self::Decade => "decade",
            Self::Normal => "normal",
            Self::Century => "century",
            Self::ThreeHours => "3 hours",
            Self::SixHours => "6 hours",
            Self::TwelveHours => "12 hours",
            Self::Second => "second",
            Self::Other(_) => "unknown",
        }
    }
}

impl Default for TimeUnit {
    fn default() -> Self {
        Self::Hour
    }
}

impl From<i32> for TimeUnit {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<TimeUnit> for i32 {
    fn from(unit: TimeUnit) -> Self {
        unit.code()
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Valid time for a record without an explicit one:
/// `reference + offset * hours_factor(unit)`, rounded to the millisecond.
///
/// `None` when the result falls outside the representable date range.
pub fn valid_time_from_offset(
    reference: DateTime<Utc>,
    offset: i32,
    unit: TimeUnit,
) -> Option<DateTime<Utc>> {
    let millis = offset as f64 * unit.hours_factor() * 3_600_000.0;
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis.round() as i64)?;
    reference.checked_add_signed(delta)
}

/// Signed offset between two instants in hours.
pub fn hours_between(base: DateTime<Utc>, time: DateTime<Utc>) -> f64 {
    (time - base).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_hour_offsets() {
        let valid = valid_time_from_offset(base(), 6, TimeUnit::Hour);
        assert_eq!(valid, Some(Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap()));
        let earlier = valid_time_from_offset(base(), -30, TimeUnit::Minute);
        assert_eq!(earlier, Some(Utc.with_ymd_and_hms(2024, 1, 14, 23, 30, 0).unwrap()));
    }

    #[test]
    fn test_bucket_units() {
        assert_eq!(
            valid_time_from_offset(base(), 2, TimeUnit::ThreeHours),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap())
        );
        assert_eq!(
            valid_time_from_offset(base(), 1, TimeUnit::Day),
            Some(Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap())
        );
        assert_eq!(
            valid_time_from_offset(base(), 90, TimeUnit::Minute),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 1, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_unknown_unit_defaults_to_hours() {
        let unit = TimeUnit::from_code(254);
        assert_eq!(unit, TimeUnit::Other(254));
        assert_eq!(unit.hours_factor(), 1.0);
        assert_eq!(
            valid_time_from_offset(base(), 3, unit),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 3, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_out_of_range_offsets() {
        assert_eq!(valid_time_from_offset(base(), i32::MAX, TimeUnit::Century), None);
        assert_eq!(valid_time_from_offset(base(), i32::MIN, TimeUnit::Century), None);
        assert_eq!(valid_time_from_offset(base(), i32::MAX, TimeUnit::Year), None);
        assert!(valid_time_from_offset(base(), i32::MAX, TimeUnit::Second).is_some());
    }

    #[test]
    fn test_code_roundtrip() {
        for code in [0, 1, 2, 3, 4, 5, 6, 7, 10, 11, 12, 13, 99] {
            assert_eq!(TimeUnit::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_hours_between() {
        let later = Utc.with_ymd_and_hms(2024, 1, 15, 1, 30, 0).unwrap();
        assert_eq!(hours_between(base(), later), 1.5);
        assert_eq!(hours_between(later, base()), -1.5);
    }
}
