//! End-to-end synthesis tests: records in, coordinate graph and schema out.

use chrono::Duration;
use grid_common::{AttributeValue, TimeUnit};
use grid_index::{
    CancelCheck, Dataset, Diagnostic, GridIndex, SlotRead, SynthesisConfig, SynthesisError,
    Synthesizer,
};
use grid_record::{GridRecord, StatisticType, TableLookup};
use std::cell::Cell;
use std::sync::Arc;
use test_utils::{
    accumulation, assert_approx_eq, assert_values_approx_eq, grids, hybrid, isobaric,
    isobaric_records, params, point_record, reference_time, shuffled, surface, surface_records,
};

fn synthesizer() -> Synthesizer {
    Synthesizer::new(Arc::new(TableLookup::grib2()), SynthesisConfig::default()).unwrap()
}

fn synthesize(index: &GridIndex) -> Dataset {
    synthesizer().synthesize(index)
}

fn names(dataset: &Dataset) -> Vec<String> {
    let mut names = dataset.variable_names();
    names.sort();
    names
}

fn dims(dataset: &Dataset, group: Option<&str>, variable: &str) -> Vec<String> {
    dataset
        .schema
        .group(group)
        .and_then(|g| g.variable(variable))
        .map(|v| v.dimensions.clone())
        .unwrap_or_default()
}

fn text<'a>(dataset: &'a Dataset, group: Option<&str>, variable: &str, attr: &str) -> Option<&'a str> {
    dataset
        .schema
        .group(group)?
        .variable(variable)?
        .attribute(attr)?
        .as_str()
}

#[test]
fn test_slot_addressing_and_read_path() {
    let mut records = isobaric_records("a", params::TEMPERATURE, &[1000.0, 850.0, 500.0], &[0, 6, 12, 18]);
    // Leave (18h, 500 hPa) empty
    records.retain(|r| !(r.level1 == 50000.0 && r.valid_time_offset == 18));
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 4, 3))
        .with_records(records);

    let dataset = synthesize(&index);
    assert!(dataset.diagnostics.is_empty());
    assert_eq!(dataset.placed_records(), 11);

    let handle = dataset.find_variable(None, "Temperature").unwrap();
    let variable = dataset.variable(handle).unwrap();
    let tracker = variable.tracker.as_ref().unwrap();
    assert_eq!(tracker.n_times(), 4);
    assert_eq!(tracker.n_levels(), 3);
    assert_eq!(tracker.slot(2, 0, 1).unwrap(), 7);

    let record = tracker.find(2, 0, 1).unwrap();
    assert_eq!(record.level1, 85000.0);
    assert_eq!(record.valid_time(), Some(reference_time() + Duration::hours(12)));

    match dataset.read_slot(handle, 2, 0, 1, 0..3, 0..4).unwrap() {
        SlotRead::Record(r) => assert_eq!(r, record),
        other => panic!("expected a record, got {:?}", other),
    }

    let missing = dataset.read_slot(handle, 3, 0, 2, 1..3, 0..2).unwrap();
    assert_eq!(
        missing,
        SlotRead::Missing {
            fill: -9999.0,
            shape: (2, 2)
        }
    );
    assert_eq!(missing.fill_buffer().unwrap().len(), 4);
}

#[test]
fn test_read_slot_rejects_out_of_range() {
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 4, 3))
        .with_records(isobaric_records("a", params::TEMPERATURE, &[850.0], &[0, 6]));
    let dataset = synthesize(&index);
    let handle = dataset.find_variable(None, "Temperature").unwrap();

    assert!(matches!(
        dataset.read_slot(handle, 2, 0, 0, 0..3, 0..4),
        Err(SynthesisError::IndexOutOfRange { what: "time", index: 2, size: 2 })
    ));
    assert!(matches!(
        dataset.read_slot(handle, 0, 1, 0, 0..3, 0..4),
        Err(SynthesisError::IndexOutOfRange { what: "ensemble", .. })
    ));
    assert!(matches!(
        dataset.read_slot(handle, 0, 0, 0, 0..3, 0..5),
        Err(SynthesisError::IndexOutOfRange { what: "x", index: 5, size: 4 })
    ));
    assert!(matches!(
        dataset.find_variable(None, "Pressure"),
        Err(SynthesisError::UnknownVariable(_))
    ));
}

#[test]
fn test_vertical_sort_orders() {
    let mut records = isobaric_records("a", params::TEMPERATURE, &[500.0, 1000.0, 850.0], &[0]);
    for metres in [100.0, 10.0, 50.0] {
        records.push(point_record("a", params::U_WIND, 103, metres, 0));
    }
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 2, 2))
        .with_records(records);
    let dataset = synthesize(&index);

    let pressure = dataset.verticals.iter().find(|v| v.level_name() == "isobaric").unwrap();
    assert_eq!(pressure.values(), vec![100000.0, 85000.0, 50000.0]);
    assert_eq!(pressure.positive(), "down");

    let height = dataset
        .verticals
        .iter()
        .find(|v| v.level_name() == "height_above_ground")
        .unwrap();
    assert_eq!(height.values(), vec![10.0, 50.0, 100.0]);
    assert_eq!(height.positive(), "up");

    assert_eq!(text(&dataset, None, "isobaric", "positive"), Some("down"));
    assert_eq!(text(&dataset, None, "isobaric", "_CoordinateAxisType"), Some("Pressure"));
    assert_eq!(
        text(&dataset, None, "height_above_ground", "_CoordinateAxisType"),
        Some("Height")
    );
}

#[test]
fn test_disambiguation_keeps_bare_name_for_most_levels() {
    let mut records = isobaric_records(
        "a",
        params::TEMPERATURE,
        &[1000.0, 850.0, 700.0, 500.0, 300.0],
        &[0, 6],
    );
    records.extend(surface_records("a", params::TEMPERATURE, &[0, 6]));
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 3, 2))
        .with_records(records);
    let dataset = synthesize(&index);

    assert_eq!(names(&dataset), vec!["Temperature", "Temperature_surface"]);
    assert_eq!(
        dims(&dataset, None, "Temperature"),
        vec!["time", "isobaric", "lat", "lon"]
    );
    assert_eq!(dims(&dataset, None, "Temperature_surface"), vec!["time", "lat", "lon"]);
    assert_eq!(
        text(&dataset, None, "Temperature_surface", "long_name"),
        Some("Temperature @ Ground or water surface")
    );
    // The single surface level carries no vertical dimension.
    assert!(dataset.schema.root.dimension("surface").is_none());
}

#[test]
fn test_coordinates_shared_across_variables() {
    let mut records = isobaric_records("a", params::TEMPERATURE, &[1000.0, 850.0, 500.0], &[0, 6]);
    let mut humidity = isobaric_records("a", params::RELATIVE_HUMIDITY, &[500.0, 850.0, 1000.0], &[6, 0]);
    // Floating noise below the level tolerance
    for r in &mut humidity {
        r.level1 += 1e-4;
    }
    records.extend(humidity);
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 3, 2))
        .with_records(records);
    let dataset = synthesize(&index);

    assert_eq!(dataset.verticals.len(), 1);
    assert_eq!(dataset.times.len(), 1);
    let t = dataset.find_variable(None, "Temperature").unwrap();
    let rh = dataset.find_variable(None, "Relative_humidity").unwrap();
    assert_eq!(
        dataset.variable(t).unwrap().coordinates,
        dataset.variable(rh).unwrap().coordinates
    );
    assert_eq!(dataset.placed_records(), 12);
}

#[test]
fn test_different_level_sets_get_numbered_dimensions() {
    let mut records = isobaric_records("a", params::TEMPERATURE, &[1000.0, 850.0, 500.0], &[0]);
    records.extend(isobaric_records("a", params::RELATIVE_HUMIDITY, &[850.0, 500.0], &[0]));
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 3, 2))
        .with_records(records);
    let dataset = synthesize(&index);

    assert_eq!(dataset.verticals.len(), 2);
    assert_eq!(dims(&dataset, None, "Temperature")[1], "isobaric");
    assert_eq!(dims(&dataset, None, "Relative_humidity")[1], "isobaric1");
    assert_eq!(dataset.schema.root.dimension("isobaric1").unwrap().length, 2);
}

#[test]
fn test_synthesis_is_order_independent() {
    let mut records = isobaric_records("a", params::TEMPERATURE, &[1000.0, 850.0, 500.0], &[0, 6, 12]);
    records.extend(surface_records("a", params::TEMPERATURE, &[0, 6, 12]));
    records.extend(isobaric_records("a", params::RELATIVE_HUMIDITY, &[850.0, 500.0], &[0, 6]));
    records.push(accumulation("a", params::TOTAL_PRECIPITATION, 0, 6));
    records.push(accumulation("a", params::TOTAL_PRECIPITATION, 6, 12));
    records.extend(isobaric_records("b", params::GEOPOTENTIAL_HEIGHT, &[500.0], &[0, 6]));

    let index = |records: Vec<GridRecord>| {
        GridIndex::new()
            .with_definition(grids::lat_lon("a", 3, 2))
            .with_definition(grids::lambert_conformal("b"))
            .with_records(records)
    };

    let baseline = synthesize(&index(records.clone()));
    for seed in [1, 7, 99] {
        let dataset = synthesize(&index(shuffled(records.clone(), seed)));
        assert_eq!(dataset.variable_names(), baseline.variable_names());
        assert_eq!(dataset.schema, baseline.schema, "schema differs for seed {}", seed);
        assert_eq!(dataset.placed_records(), baseline.placed_records());
    }
}

#[test]
fn test_mixed_interval_prefers_zero_start() {
    let a = accumulation("a", params::TOTAL_PRECIPITATION, 0, 6);
    let b = accumulation("a", params::TOTAL_PRECIPITATION, 3, 6);

    for records in [vec![a.clone(), b.clone()], vec![b.clone(), a.clone()]] {
        let index = GridIndex::new()
            .with_definition(grids::lat_lon("a", 2, 2))
            .with_records(records);
        let dataset = synthesize(&index);
        let handle = dataset.find_variable(None, "Total_precipitation").unwrap();
        let variable = dataset.variable(handle).unwrap();

        let time = dataset.times.get(variable.coordinates.unwrap().time);
        assert!(time.is_mixed());
        assert_eq!(time.len(), 1);
        assert_eq!(time.bounds(), vec![(0.0, 6.0)]);

        let occupant = variable.tracker.as_ref().unwrap().find(0, 0, 0).unwrap();
        assert_eq!(occupant.interval_start(), 0);
        assert_eq!(dataset.placed_records(), 1);
        assert_eq!(dataset.dropped_records(), 1);
        assert!(matches!(
            &dataset.diagnostics[..],
            [Diagnostic::SlotConflict { time: 0, ensemble: 0, level: 0, .. }]
        ));
        assert_eq!(
            variable.long_name,
            "Total precipitation (Accumulation for Mixed Intervals) @ Ground or water surface"
        );
    }
}

#[test]
fn test_mixed_interval_bounds_match_occupants() {
    let records = vec![
        accumulation("a", params::TOTAL_PRECIPITATION, 0, 3),
        accumulation("a", params::TOTAL_PRECIPITATION, 3, 6),
        accumulation("a", params::TOTAL_PRECIPITATION, 4, 6),
    ];
    for seed in [0, 1, 7, 42, 99] {
        let index = GridIndex::new()
            .with_definition(grids::lat_lon("a", 2, 2))
            .with_records(shuffled(records.clone(), seed));
        let dataset = synthesize(&index);

        let bounds = dataset.schema.root.variable("time_bounds").unwrap();
        assert_eq!(
            bounds.values.as_deref(),
            Some(&[0.0, 3.0, 3.0, 6.0][..]),
            "bounds differ for seed {}",
            seed
        );

        let handle = dataset.find_variable(None, "Total_precipitation").unwrap();
        let tracker = dataset.variable(handle).unwrap().tracker.as_ref().unwrap();
        assert_eq!(tracker.find(0, 0, 0).unwrap().interval_start(), 0);
        assert_eq!(tracker.find(1, 0, 0).unwrap().interval_start(), 3);
        assert_eq!(dataset.placed_records(), 2);
        assert_eq!(dataset.dropped_records(), 1);
    }
}

#[test]
fn test_duplicate_records_are_counted_as_dropped() {
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 2, 2))
        .with_records([
            surface("a", params::TEMPERATURE, 0),
            surface("a", params::TEMPERATURE, 6),
            surface("a", params::TEMPERATURE, 6).with_location(4096, 512),
        ]);
    let dataset = synthesize(&index);

    assert_eq!(dataset.placed_records(), 2);
    assert_eq!(dataset.dropped_records(), 1);
    assert!(matches!(
        &dataset.diagnostics[..],
        [Diagnostic::SlotConflict { time: 1, ensemble: 0, level: 0, .. }]
    ));
}

#[test]
fn test_unrepresentable_valid_time_is_dropped() {
    let far = surface("a", params::TEMPERATURE, 0).with_forecast(i32::MAX, TimeUnit::Century);
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 2, 2))
        .with_records([surface("a", params::TEMPERATURE, 6), far]);
    let dataset = synthesize(&index);

    assert_eq!(dataset.placed_records(), 1);
    assert_eq!(dataset.dropped_records(), 1);
    assert!(matches!(
        &dataset.diagnostics[..],
        [Diagnostic::InvalidValidTime { definition, offset: i32::MAX, unit: TimeUnit::Century, .. }]
            if definition == "a"
    ));
    let time = dataset.schema.root.variable("time").unwrap();
    assert_eq!(time.values.as_deref(), Some(&[6.0][..]));
}

#[test]
fn test_constant_interval_bounds_emitted() {
    let records = vec![
        accumulation("a", params::TOTAL_PRECIPITATION, 12, 18),
        accumulation("a", params::TOTAL_PRECIPITATION, 0, 6),
        accumulation("a", params::TOTAL_PRECIPITATION, 6, 12),
    ];
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 2, 2))
        .with_records(records);
    let dataset = synthesize(&index);
    let root = &dataset.schema.root;

    let time = root.variable("time").unwrap();
    assert_eq!(time.values.as_deref(), Some(&[6.0, 12.0, 18.0][..]));
    assert_eq!(time.attribute("bounds").and_then(|v| v.as_str()), Some("time_bounds"));
    assert_eq!(
        time.attribute("units").and_then(|v| v.as_str()),
        Some("hours since 2024-03-01T12:00:00Z")
    );
    assert_eq!(
        time.attribute("long_name").and_then(|v| v.as_str()),
        Some("forecast time for 6 Hour Intervals")
    );

    let bounds = root.variable("time_bounds").unwrap();
    assert_eq!(bounds.dimensions, vec!["time", "nv"]);
    assert_eq!(
        bounds.values.as_deref(),
        Some(&[0.0, 6.0, 6.0, 12.0, 12.0, 18.0][..])
    );
    assert_eq!(root.dimension("nv").unwrap().length, 2);

    let precip = root.variable("Total_precipitation").unwrap();
    assert_eq!(
        precip.attribute("GRIB2_interval_statistic").and_then(|v| v.as_str()),
        Some(StatisticType::Accumulation.name().as_str())
    );
}

#[test]
fn test_failed_groups_do_not_stop_synthesis() {
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 3, 2))
        .with_definition(grids::unsupported("b"))
        .with_definition(grids::gaussian_without_parallels("c"))
        .with_records([
            surface("a", params::TEMPERATURE, 0),
            surface("b", params::TEMPERATURE, 0),
            surface("b", params::TEMPERATURE, 6),
            surface("c", params::TEMPERATURE, 0),
        ]);
    let dataset = synthesize(&index);

    assert_eq!(dataset.groups.len(), 1);
    assert_eq!(dataset.groups[0].hcs.key, "a");
    assert_eq!(dataset.diagnostics.len(), 2);
    assert!(matches!(
        &dataset.diagnostics[0],
        Diagnostic::HorizontalGroupFailed { definition, records: 2, .. } if definition == "b"
    ));
    assert!(matches!(
        &dataset.diagnostics[1],
        Diagnostic::HorizontalGroupFailed { definition, records: 1, .. } if definition == "c"
    ));
    assert_eq!(dataset.dropped_records(), 3);
    assert!(dataset.find_variable(None, "Temperature").is_ok());
}

/// Cancels once it has been polled more than `limit` times.
struct CancelAfter {
    polls: Cell<usize>,
    limit: usize,
}

impl CancelAfter {
    fn new(limit: usize) -> Self {
        Self {
            polls: Cell::new(0),
            limit,
        }
    }
}

impl CancelCheck for CancelAfter {
    fn is_cancelled(&self) -> bool {
        self.polls.set(self.polls.get() + 1);
        self.polls.get() > self.limit
    }
}

#[test]
fn test_cancellation_is_polled_per_group_and_variable() {
    let records = vec![
        surface("a", params::TEMPERATURE, 0),
        surface("a", params::RELATIVE_HUMIDITY, 0),
        surface("b", params::TEMPERATURE, 0),
    ];
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 3, 2))
        .with_definition(grids::lat_lon("b", 4, 4))
        .with_records(records);

    // group a, both variables, then group b is refused
    let dataset = synthesizer().synthesize_with_cancel(&index, &CancelAfter::new(3));
    assert!(dataset.cancelled);
    assert_eq!(dataset.groups.len(), 1);
    assert_eq!(dataset.groups[0].variables.len(), 2);

    // second variable of group a is refused
    let dataset = synthesizer().synthesize_with_cancel(&index, &CancelAfter::new(2));
    assert!(dataset.cancelled);
    assert_eq!(dataset.groups.len(), 1);
    assert_eq!(dataset.groups[0].variables.len(), 1);

    let dataset = synthesizer().synthesize_with_cancel(&index, &CancelAfter::new(usize::MAX));
    assert!(!dataset.cancelled);
    assert_eq!(dataset.groups.len(), 2);
}

#[test]
fn test_multiple_groups_are_named() {
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 3, 2))
        .with_definition(grids::lambert_conformal("b"))
        .with_records([
            surface("a", params::TEMPERATURE, 0),
            surface("b", params::TEMPERATURE, 0),
        ]);
    let dataset = synthesize(&index);

    let groups: Vec<&str> = dataset.schema.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(groups, vec!["Latitude_Longitude", "Lambert_Conformal"]);
    assert!(dataset.schema.root.variables.is_empty());

    assert!(dataset.find_variable(Some("Latitude_Longitude"), "Temperature").is_ok());
    assert!(dataset.find_variable(Some("Lambert_Conformal"), "Temperature").is_ok());
    assert!(dataset.find_variable(None, "Temperature").is_err());

    let lambert = dataset.schema.group(Some("Lambert_Conformal")).unwrap();
    assert_eq!(
        lambert.variable("Temperature").unwrap().dimensions,
        vec!["time", "y", "x"]
    );
    assert_eq!(
        text(&dataset, Some("Lambert_Conformal"), "Temperature", "grid_mapping"),
        Some("Lambert_Conformal_Projection")
    );
    let x = lambert.variable("x").unwrap().values.clone().unwrap();
    assert_eq!(x.len(), 5);
    assert_approx_eq!(x[1] - x[0], 3.0, 1e-6);
    assert_eq!(
        lambert
            .variable("Lambert_Conformal_Projection")
            .and_then(|v| v.attribute("grid_mapping_name"))
            .and_then(|v| v.as_str()),
        Some("lambert_conformal_conic")
    );
}

#[test]
fn test_time_dimension_names_are_dataset_wide() {
    let mut records = surface_records("a", params::TEMPERATURE, &[0, 6, 12]);
    records.extend(surface_records("b", params::TEMPERATURE, &[0, 6]));
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 3, 2))
        .with_definition(grids::lambert_conformal("b"))
        .with_records(records);
    let dataset = synthesize(&index);

    assert_eq!(dataset.times.len(), 2);
    assert_eq!(
        dims(&dataset, Some("Latitude_Longitude"), "Temperature"),
        vec!["time", "lat", "lon"]
    );
    // the only time axis of the second group keeps its dataset-wide name
    assert_eq!(
        dims(&dataset, Some("Lambert_Conformal"), "Temperature"),
        vec!["time1", "y", "x"]
    );
    let lambert = dataset.schema.group(Some("Lambert_Conformal")).unwrap();
    assert!(lambert.dimension("time").is_none());
    assert_eq!(lambert.dimension("time1").unwrap().length, 2);
}

#[test]
fn test_identical_grid_names_are_made_unique() {
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 3, 2))
        .with_definition(grids::lat_lon("b", 4, 4))
        .with_records([
            surface("a", params::TEMPERATURE, 0),
            surface("b", params::TEMPERATURE, 0),
        ]);
    let dataset = synthesize(&index);
    let groups: Vec<&str> = dataset.schema.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(groups, vec!["Latitude_Longitude", "Latitude_Longitude_2"]);
}

#[test]
fn test_hybrid_factors_follow_level_order() {
    let definition = grids::lat_lon("h", 3, 2)
        .with_vertical_coordinates(vec![10.0, 20.0, 30.0, 0.1, 0.2, 0.3]);
    let records = (1..=3).map(|n| hybrid("h", params::TEMPERATURE, n, 0));
    let index = GridIndex::new()
        .with_definition(definition)
        .with_records(records);
    let dataset = synthesize(&index);
    let root = &dataset.schema.root;

    let coord = root.variable("hybrid").unwrap();
    assert_eq!(coord.values.as_deref(), Some(&[3.0, 2.0, 1.0][..]));
    assert_eq!(
        coord.attribute("formula_terms").and_then(|v| v.as_str()),
        Some("ap: hybrid_a b: hybrid_b ps: ps")
    );
    assert_eq!(root.variable("hybrid_a").unwrap().values.as_deref(), Some(&[30.0, 20.0, 10.0][..]));
    assert_eq!(root.variable("hybrid_b").unwrap().values.as_deref(), Some(&[0.3, 0.2, 0.1][..]));
}

#[test]
fn test_msg_grid_has_two_dimensional_lat_lon() {
    let index = GridIndex::new()
        .with_definition(grids::msg("m"))
        .with_records([surface("m", params::TEMPERATURE, 0)]);
    let dataset = synthesize(&index);
    let hcs = &dataset.groups[0].hcs;

    let fields = hcs.lat_lon_2d.as_ref().unwrap();
    assert_eq!(fields.lat.len(), 25);
    // Sub-satellite point at the window centre
    assert_approx_eq!(hcs.x.values[2], 0.0, 1e-9);
    assert_approx_eq!(hcs.y.values[2], 0.0, 1e-9);
    assert_approx_eq!(fields.lat[12], 0.0, 1e-6);
    assert_approx_eq!(fields.lon[12], 0.0, 1e-6);

    // Calibrated spacing replaces the declared 1800
    let angular = 2.0 * (1.0 / 6.6107f64).asin();
    let scale = 5.6107 * 6378.169;
    assert_approx_eq!(hcs.x.values[1] - hcs.x.values[0], scale * angular / 1207.0, 1e-6);

    assert_eq!(
        text(&dataset, None, "Temperature", "coordinates"),
        Some("time lat lon")
    );
    assert_eq!(dims(&dataset, None, "lat"), vec!["y", "x"]);

    let uncorrected = Synthesizer::new(
        Arc::new(TableLookup::grib2()),
        SynthesisConfig {
            apply_msg_correction: false,
            ..Default::default()
        },
    )
    .unwrap()
    .synthesize(&index);
    let x = &uncorrected.groups[0].hcs.x.values;
    assert_approx_eq!(x[1] - x[0], scale * angular / 1800.0, 1e-6);
}

#[test]
fn test_ensemble_axis_is_ensemble_major() {
    let mut records = Vec::new();
    for (kind, number) in [(3, 2), (1, 0), (3, 1)] {
        for hpa in [850.0, 500.0] {
            for hour in [0, 6] {
                records.push(isobaric("a", params::TEMPERATURE, hpa, hour).with_ensemble(kind, number));
            }
        }
    }
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 2, 2))
        .with_records(records);
    let dataset = synthesize(&index);

    assert_eq!(
        dims(&dataset, None, "Temperature"),
        vec!["time", "ens", "isobaric", "lat", "lon"]
    );
    let ens = dataset.schema.root.variable("ens").unwrap();
    assert_eq!(ens.values.as_deref(), Some(&[0.0, 1.0, 2.0][..]));
    assert_eq!(
        ens.attribute("ensemble_type"),
        Some(&AttributeValue::Doubles(vec![1.0, 3.0, 3.0]))
    );

    let handle = dataset.find_variable(None, "Temperature").unwrap();
    let tracker = dataset.variable(handle).unwrap().tracker.as_ref().unwrap();
    assert_eq!(tracker.len(), 12);
    assert_eq!(tracker.slot(1, 2, 0).unwrap(), 10);
    let record = dataset.read_slot(handle, 1, 2, 0, 0..2, 0..2).unwrap();
    let record = record.record().unwrap();
    assert_eq!(record.ensemble.map(|m| (m.kind, m.number)), Some((3, 2)));
    assert_eq!(record.level1, 85000.0);
    assert_eq!(record.valid_time_offset, 6);
}

#[test]
fn test_reference_time_mismatch_is_kept_with_warning() {
    let mut late = surface("a", params::TEMPERATURE, 6);
    late.reference_time = reference_time() + Duration::hours(6);
    let index = GridIndex::new()
        .with_definition(grids::lat_lon("a", 2, 2))
        .with_records([surface("a", params::TEMPERATURE, 0), late]);
    let dataset = synthesize(&index);

    assert_eq!(dataset.diagnostics.len(), 1);
    assert!(matches!(dataset.diagnostics[0], Diagnostic::ReferenceTimeMismatch { .. }));
    assert_eq!(dataset.dropped_records(), 0);
    assert_eq!(dataset.placed_records(), 2);
    let time = dataset.schema.root.variable("time").unwrap();
    assert_values_approx_eq!(time.values.clone().unwrap(), vec![0.0, 12.0], 1e-9);
}

#[test]
fn test_gaussian_group_emits_weights() {
    let index = GridIndex::new()
        .with_definition(grids::gaussian("g"))
        .with_records([surface("g", params::TEMPERATURE, 0)]);
    let dataset = synthesize(&index);
    let root = &dataset.schema.root;

    let weights = root.variable("gaussw").unwrap();
    assert_eq!(weights.dimensions, vec!["lat"]);
    let total: f64 = weights.values.as_ref().unwrap().iter().sum();
    assert_approx_eq!(total, 2.0, 1e-9);
    let lat = root.variable("lat").unwrap().values.clone().unwrap();
    assert_eq!(lat.len(), 94);
    assert!(lat[0] > lat[93]);
    assert!(text(&dataset, None, "Temperature", "grid_mapping").is_none());
}
