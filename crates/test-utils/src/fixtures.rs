//! Common test fixtures for grid indexing tests.
//!
//! Grid definitions are small so that coordinate values can be checked by
//! hand, and records all share one reference time unless a test says
//! otherwise.

use chrono::{DateTime, TimeZone, Utc};
use grid_record::{GridRecord, ParameterId, StatisticType};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Reference time shared by the record builders: 2024-03-01 12:00 UTC.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Common GRIB-2 parameters.
pub mod params {
    use grid_record::ParameterId;

    pub const TEMPERATURE: ParameterId = ParameterId {
        discipline: 0,
        category: 0,
        number: 0,
    };
    pub const RELATIVE_HUMIDITY: ParameterId = ParameterId {
        discipline: 0,
        category: 1,
        number: 1,
    };
    pub const TOTAL_PRECIPITATION: ParameterId = ParameterId {
        discipline: 0,
        category: 1,
        number: 8,
    };
    pub const U_WIND: ParameterId = ParameterId {
        discipline: 0,
        category: 2,
        number: 2,
    };
    pub const GEOPOTENTIAL_HEIGHT: ParameterId = ParameterId {
        discipline: 0,
        category: 3,
        number: 5,
    };
}

/// Grid definitions, one per projection family.
///
/// Keys are passed in so tests can register several copies of one shape.
pub mod grids {
    use grid_common::{keys, GridDefinition};

    /// Regular lat/lon grid starting at (10N, 20E), 1 degree spacing, north to south.
    pub fn lat_lon(key: &str, nx: usize, ny: usize) -> GridDefinition {
        GridDefinition::new(key)
            .with_param(keys::GRID_TYPE, 0)
            .with_param(keys::NX, nx)
            .with_param(keys::NY, ny)
            .with_param(keys::LA1, 10.0)
            .with_param(keys::LO1, 20.0)
            .with_param(keys::DX, 1.0)
            .with_param(keys::DY, 1.0)
            .with_param(keys::SHAPE_CODE, 6)
    }

    /// 5x4 corner of the HRRR Lambert conformal grid, 3 km spacing.
    pub fn lambert_conformal(key: &str) -> GridDefinition {
        GridDefinition::new(key)
            .with_param(keys::GRID_TYPE, 30)
            .with_param(keys::NX, 5)
            .with_param(keys::NY, 4)
            .with_param(keys::LA1, 21.138123)
            .with_param(keys::LO1, 237.280472)
            .with_param(keys::LOV, 262.5)
            .with_param(keys::LATIN1, 38.5)
            .with_param(keys::LATIN2, 38.5)
            .with_param(keys::DX, 3000.0)
            .with_param(keys::DY, 3000.0)
            .with_param(keys::SCAN_MODE, 64)
            .with_param(keys::SHAPE_CODE, 6)
    }

    /// North polar stereographic grid with its first point at the pole.
    pub fn polar_stereographic(key: &str) -> GridDefinition {
        GridDefinition::new(key)
            .with_param(keys::GRID_TYPE, 20)
            .with_param(keys::NX, 6)
            .with_param(keys::NY, 6)
            .with_param(keys::LA1, 90.0)
            .with_param(keys::LO1, 0.0)
            .with_param(keys::LOV, -105.0)
            .with_param(keys::DX, 47625.0)
            .with_param(keys::DY, 47625.0)
            .with_param(keys::SCAN_MODE, 64)
    }

    /// T62 Gaussian grid (94 rows, 47 parallels between pole and equator).
    pub fn gaussian(key: &str) -> GridDefinition {
        GridDefinition::new(key)
            .with_param(keys::GRID_TYPE, 40)
            .with_param(keys::NX, 192)
            .with_param(keys::NY, 94)
            .with_param(keys::LA1, 88.542)
            .with_param(keys::LO1, 0.0)
            .with_param(keys::LA2, -88.542)
            .with_param(keys::LO2, 358.125)
            .with_param(keys::DX, 1.875)
            .with_param(keys::NUMBER_PARALLELS, 47)
    }

    /// Gaussian grid missing its parallel count.
    pub fn gaussian_without_parallels(key: &str) -> GridDefinition {
        GridDefinition::new(key)
            .with_param(keys::GRID_TYPE, 40)
            .with_param(keys::NX, 192)
            .with_param(keys::NY, 94)
            .with_param(keys::LA1, 88.542)
            .with_param(keys::LO1, 0.0)
            .with_param(keys::DX, 1.875)
    }

    /// 5x5 EUMETSAT MSG window centred on the sub-satellite point.
    ///
    /// The declared spacing is the uncorrected value; the calibrated
    /// correction replaces it with 1207/1203.
    pub fn msg(key: &str) -> GridDefinition {
        GridDefinition::new(key)
            .with_param(keys::GRID_TYPE, 90)
            .with_param(keys::CENTER, 254)
            .with_param(keys::NX, 5)
            .with_param(keys::NY, 5)
            .with_param(keys::LAP, 0.0)
            .with_param(keys::LOP, 0.0)
            .with_param(keys::XP, 3)
            .with_param(keys::YP, 3)
            .with_param(keys::NR, 6.6107)
            .with_param(keys::DX, 1800.0)
            .with_param(keys::DY, 1800.0)
    }

    /// A definition whose template no projection handles.
    pub fn unsupported(key: &str) -> GridDefinition {
        lat_lon(key, 3, 2).with_param(keys::GRID_TYPE, 204)
    }
}

/// Point record at a level, valid `hour` hours after [`reference_time`].
pub fn point_record(
    definition: &str,
    parameter: ParameterId,
    level_type: i32,
    level: f64,
    hour: i32,
) -> GridRecord {
    GridRecord::new(parameter, definition, reference_time())
        .with_level(level_type, level)
        .with_forecast(hour, grid_common::TimeUnit::Hour)
}

/// Point record on an isobaric surface given in hPa.
pub fn isobaric(definition: &str, parameter: ParameterId, hpa: f64, hour: i32) -> GridRecord {
    point_record(definition, parameter, 100, hpa * 100.0, hour)
}

/// Point record at the ground surface.
pub fn surface(definition: &str, parameter: ParameterId, hour: i32) -> GridRecord {
    point_record(definition, parameter, 1, 0.0, hour)
}

/// Point record at a height above ground in metres.
pub fn above_ground(definition: &str, parameter: ParameterId, metres: f64, hour: i32) -> GridRecord {
    point_record(definition, parameter, 103, metres, hour)
}

/// Surface accumulation over `[start, end]` hours.
pub fn accumulation(definition: &str, parameter: ParameterId, start: i32, end: i32) -> GridRecord {
    GridRecord::new(parameter, definition, reference_time())
        .with_level(1, 0.0)
        .with_interval(start, end, StatisticType::Accumulation)
}

/// Hybrid level record; hybrid levels are numbered from 1.
pub fn hybrid(definition: &str, parameter: ParameterId, number: i32, hour: i32) -> GridRecord {
    point_record(definition, parameter, 105, number as f64, hour)
}

/// Write `contents` to `name` inside a fresh temporary directory.
///
/// Keep the returned [`TempDir`] alive for as long as the file is needed.
pub fn write_temp_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::keys;

    #[test]
    fn test_record_builders() {
        let rec = isobaric("g", params::TEMPERATURE, 850.0, 6);
        assert_eq!(rec.level_type1, 100);
        assert_eq!(rec.level1, 85000.0);
        assert_eq!(rec.valid_time(), Some(reference_time() + chrono::Duration::hours(6)));

        let acc = accumulation("g", params::TOTAL_PRECIPITATION, 0, 6);
        assert!(acc.is_interval());
        assert_eq!(acc.interval_width(), 6);
    }

    #[test]
    fn test_grid_fixtures() {
        assert_eq!(grids::lat_lon("a", 4, 3).nx().unwrap(), 4);
        assert_eq!(grids::msg("m").center(), Some(254));
        assert_eq!(grids::unsupported("u").grid_type(), 204);
        assert!(grids::gaussian_without_parallels("g")
            .get(keys::NUMBER_PARALLELS)
            .is_none());
    }

    #[test]
    fn test_write_temp_file() {
        let (_dir, path) = write_temp_file("index.json", "{}");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }
}
