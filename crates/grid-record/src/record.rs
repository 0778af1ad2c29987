//! The uniform in-memory shape of one decoded grid message.

use chrono::{DateTime, Utc};
use grid_common::{valid_time_from_offset, TimeUnit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameter identity.
///
/// GRIB-2 uses (discipline, category, number). GRIB-1 records put the
/// parameter table version in `category` and leave `discipline` at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterId {
    pub discipline: u8,
    pub category: u8,
    pub number: u8,
}

impl ParameterId {
    pub fn new(discipline: u8, category: u8, number: u8) -> Self {
        Self {
            discipline,
            category,
            number,
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.discipline, self.category, self.number)
    }
}

/// Statistical process applied over a time interval (GRIB2 code table 4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum StatisticType {
    Average,
    Accumulation,
    Maximum,
    Minimum,
    /// Value at end minus value at start.
    Difference,
    RootMeanSquare,
    StandardDeviation,
    Covariance,
    /// Value at start minus value at end.
    DifferenceReverse,
    Ratio,
    Other(i32),
}

impl StatisticType {
    pub fn code(&self) -> i32 {
        match self {
            Self::Average => 0,
            Self::Accumulation => 1,
            Self::Maximum => 2,
            Self::Minimum => 3,
            Self::Difference => 4,
            Self::RootMeanSquare => 5,
            Self::StandardDeviation => 6,
            Self::Covariance => 7,
            Self::DifferenceReverse => 8,
            Self::Ratio => 9,
            Self::Other(code) => *code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Average,
            1 => Self::Accumulation,
            2 => Self::Maximum,
            3 => Self::Minimum,
            4 => Self::Difference,
            5 => Self::RootMeanSquare,
            6 => Self::StandardDeviation,
            7 => Self::Covariance,
            8 => Self::DifferenceReverse,
            9 => Self::Ratio,
            other => Self::Other(other),
        }
    }

    /// Short suffix used in variable names.
    pub fn suffix(&self) -> String {
        match self {
            Self::Average => "avg".to_string(),
            Self::Accumulation => "acc".to_string(),
            Self::Maximum => "max".to_string(),
            Self::Minimum => "min".to_string(),
            Self::Difference | Self::DifferenceReverse => "diff".to_string(),
            Self::RootMeanSquare => "rms".to_string(),
            Self::StandardDeviation => "stddev".to_string(),
            Self::Covariance => "cov".to_string(),
            Self::Ratio => "ratio".to_string(),
            Self::Other(code) => format!("stat{}", code),
        }
    }

    /// Human readable name used in long names.
    pub fn name(&self) -> String {
        match self {
            Self::Average => "Average".to_string(),
            Self::Accumulation => "Accumulation".to_string(),
            Self::Maximum => "Maximum".to_string(),
            Self::Minimum => "Minimum".to_string(),
            Self::Difference | Self::DifferenceReverse => "Difference".to_string(),
            Self::RootMeanSquare => "Root Mean Square".to_string(),
            Self::StandardDeviation => "Standard Deviation".to_string(),
            Self::Covariance => "Covariance".to_string(),
            Self::Ratio => "Ratio".to_string(),
            Self::Other(code) => format!("Statistic {}", code),
        }
    }
}

impl From<i32> for StatisticType {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<StatisticType> for i32 {
    fn from(stat: StatisticType) -> Self {
        stat.code()
    }
}

/// A statistically processed time span, offsets in the record's time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: i32,
    pub end: i32,
    pub statistic: StatisticType,
}

impl TimeInterval {
    pub fn new(start: i32, end: i32, statistic: StatisticType) -> Self {
        Self {
            start,
            end,
            statistic,
        }
    }

    /// `end - start`.
    pub fn width(&self) -> i32 {
        self.end - self.start
    }
}

/// Ensemble membership of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnsembleMember {
    /// Perturbation type (control, negative, positive ...).
    pub kind: i32,
    pub number: i32,
}

/// Byte range of the message in its source file, opaque to the indexer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLocation {
    pub offset: u64,
    pub length: u64,
}

/// One decoded 2-D grid message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRecord {
    pub parameter: ParameterId,
    pub level_type1: i32,
    #[serde(default)]
    pub level1: f64,
    #[serde(default = "missing_level_type")]
    pub level_type2: i32,
    #[serde(default)]
    pub level2: f64,
    pub reference_time: DateTime<Utc>,
    #[serde(default)]
    pub valid_time: Option<DateTime<Utc>>,
    /// Forecast time in `time_unit`.
    #[serde(default)]
    pub valid_time_offset: i32,
    #[serde(default)]
    pub time_unit: TimeUnit,
    pub grid_definition_id: String,
    #[serde(default)]
    pub decimal_scale: i32,
    #[serde(default)]
    pub interval: Option<TimeInterval>,
    #[serde(default)]
    pub ensemble: Option<EnsembleMember>,
    #[serde(default)]
    pub location: RecordLocation,
}

/// Level type code meaning "no second surface".
pub const MISSING_LEVEL_TYPE: i32 = 255;

fn missing_level_type() -> i32 {
    MISSING_LEVEL_TYPE
}

impl GridRecord {
    /// A surface analysis record; chain the `with_*` methods for anything else.
    pub fn new(
        parameter: ParameterId,
        grid_definition_id: impl Into<String>,
        reference_time: DateTime<Utc>,
    ) -> Self {
        Self {
            parameter,
            level_type1: 1,
            level1: 0.0,
            level_type2: MISSING_LEVEL_TYPE,
            level2: 0.0,
            reference_time,
            valid_time: None,
            valid_time_offset: 0,
            time_unit: TimeUnit::Hour,
            grid_definition_id: grid_definition_id.into(),
            decimal_scale: 0,
            interval: None,
            ensemble: None,
            location: RecordLocation::default(),
        }
    }

    pub fn with_level(mut self, level_type: i32, value: f64) -> Self {
        self.level_type1 = level_type;
        self.level1 = value;
        self.level_type2 = MISSING_LEVEL_TYPE;
        self.level2 = 0.0;
        self
    }

    pub fn with_layer(mut self, type1: i32, value1: f64, type2: i32, value2: f64) -> Self {
        self.level_type1 = type1;
        self.level1 = value1;
        self.level_type2 = type2;
        self.level2 = value2;
        self
    }

    pub fn with_forecast(mut self, offset: i32, unit: TimeUnit) -> Self {
        self.valid_time_offset = offset;
        self.time_unit = unit;
        self
    }

    pub fn with_valid_time(mut self, valid_time: DateTime<Utc>) -> Self {
        self.valid_time = Some(valid_time);
        self
    }

    /// Statistically processed record. The forecast offset becomes the interval start.
    pub fn with_interval(mut self, start: i32, end: i32, statistic: StatisticType) -> Self {
        self.interval = Some(TimeInterval::new(start, end, statistic));
        self.valid_time_offset = start;
        self
    }

    pub fn with_ensemble(mut self, kind: i32, number: i32) -> Self {
        self.ensemble = Some(EnsembleMember { kind, number });
        self
    }

    pub fn with_location(mut self, offset: u64, length: u64) -> Self {
        self.location = RecordLocation { offset, length };
        self
    }

    pub fn is_interval(&self) -> bool {
        self.interval.is_some()
    }

    /// Start offset of the interval, or the forecast offset for point records.
    pub fn interval_start(&self) -> i32 {
        self.interval.map(|i| i.start).unwrap_or(self.valid_time_offset)
    }

    /// Interval width, zero for point records.
    pub fn interval_width(&self) -> i32 {
        self.interval.map(|i| i.width()).unwrap_or(0)
    }

    /// Resolved valid time.
    ///
    /// An explicit valid time wins. Otherwise interval records are valid at
    /// the end of their interval and point records at the forecast offset.
    /// `None` when the offset leaves the representable date range.
    pub fn valid_time(&self) -> Option<DateTime<Utc>> {
        if let Some(valid) = self.valid_time {
            return Some(valid);
        }
        let offset = self.interval.map(|i| i.end).unwrap_or(self.valid_time_offset);
        valid_time_from_offset(self.reference_time, offset, self.time_unit)
    }
}
