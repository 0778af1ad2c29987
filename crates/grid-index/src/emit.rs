//! Emission of a synthesized dataset into a container sink.

use crate::dataset::{Dataset, GroupCoordinates, HorizontalGroup};
use crate::ensemble::{EnsembleCoord, EnsembleRegistry};
use crate::horizontal::{Axis, HorizontalCoordSys};
use crate::schema::{DataType, DatasetSink, Dimension, VariableHandle, VariableSchema};
use crate::time::{TimeCoord, TimeRegistry};
use crate::variable::GridVariable;
use crate::vertical::{VerticalCoord, VerticalRegistry};
use grid_common::AttributeValue;
use std::collections::HashSet;

/// Second dimension of bounds variables.
const BOUNDS_DIM: &str = "nv";
const GAUSSIAN_WEIGHTS: &str = "gaussw";

/// Name of the scalar grid mapping variable of a horizontal system.
pub fn mapping_variable_name(hcs: &HorizontalCoordSys) -> String {
    format!("{}_Projection", hcs.grid_name)
}

/// Names of every dimension and coordinate variable a group emits.
/// Data variable names must avoid them.
pub fn reserved_names(
    group: &HorizontalGroup,
    verticals: &VerticalRegistry,
    times: &TimeRegistry,
    ensembles: &EnsembleRegistry,
) -> HashSet<String> {
    let coords = group.coordinates();
    let mut names = HashSet::new();
    for id in &coords.times {
        let time = times.get(*id);
        names.insert(time.dimension.clone());
        names.insert(bounds_name(&time.dimension));
    }
    for id in &coords.verticals {
        let vertical = verticals.get(*id);
        names.insert(vertical.dimension.clone());
        names.insert(bounds_name(&vertical.dimension));
        names.insert(format!("{}_a", vertical.dimension));
        names.insert(format!("{}_b", vertical.dimension));
    }
    for id in &coords.ensembles {
        names.insert(ensembles.get(*id).dimension.clone());
    }
    let hcs = &group.hcs;
    names.insert(hcs.y.name.clone());
    names.insert(hcs.x.name.clone());
    names.insert("lat".to_string());
    names.insert("lon".to_string());
    names.insert(GAUSSIAN_WEIGHTS.to_string());
    names.insert(BOUNDS_DIM.to_string());
    names.insert(mapping_variable_name(hcs));
    names
}

fn bounds_name(dimension: &str) -> String {
    format!("{}_bounds", dimension)
}

impl Dataset {
    /// Emit global attributes, then per group its dimensions, coordinate
    /// variables, grid mapping and data variables.
    pub fn emit(&self, sink: &mut dyn DatasetSink) {
        for attr in &self.attributes {
            sink.add_global_attribute(attr.clone());
        }
        for (gi, group) in self.groups.iter().enumerate() {
            if let Some(name) = &group.name {
                sink.add_group(name);
            }
            self.emit_group(gi, group, sink);
        }
    }

    fn emit_group(&self, gi: usize, group: &HorizontalGroup, sink: &mut dyn DatasetSink) {
        let target = group.name.as_deref();
        let coords = group.coordinates();
        let hcs = &group.hcs;

        self.emit_dimensions(&coords, hcs, target, sink);

        for id in &coords.times {
            self.emit_time(self.times.get(*id), target, sink);
        }
        for id in &coords.ensembles {
            emit_ensemble(self.ensembles.get(*id), target, sink);
        }
        for id in &coords.verticals {
            let vertical = self.verticals.get(*id);
            if vertical.has_dimension() {
                emit_vertical(vertical, target, sink);
            }
        }
        emit_horizontal(hcs, target, sink);

        for (vi, var) in group.placed_variables() {
            let variable = self.data_variable(var, hcs, VariableHandle { group: gi, variable: vi });
            sink.add_variable(target, variable);
        }
    }

    fn emit_dimensions(
        &self,
        coords: &GroupCoordinates,
        hcs: &HorizontalCoordSys,
        target: Option<&str>,
        sink: &mut dyn DatasetSink,
    ) {
        let mut needs_bounds = false;
        for id in &coords.times {
            let time = self.times.get(*id);
            needs_bounds |= time.is_interval();
            sink.add_dimension(target, Dimension::new(time.dimension.clone(), time.len()));
        }
        for id in &coords.ensembles {
            let ens = self.ensembles.get(*id);
            sink.add_dimension(target, Dimension::new(ens.dimension.clone(), ens.len()));
        }
        for id in &coords.verticals {
            let vertical = self.verticals.get(*id);
            if vertical.has_dimension() {
                needs_bounds |= vertical.spec.is_layer;
                sink.add_dimension(target, Dimension::new(vertical.dimension.clone(), vertical.len()));
            }
        }
        sink.add_dimension(target, Dimension::new(hcs.y.name.clone(), hcs.ny()));
        sink.add_dimension(target, Dimension::new(hcs.x.name.clone(), hcs.nx()));
        if needs_bounds {
            sink.add_dimension(target, Dimension::new(BOUNDS_DIM, 2));
        }
    }

    fn emit_time(&self, time: &TimeCoord, target: Option<&str>, sink: &mut dyn DatasetSink) {
        let units = format!(
            "{}s since {}",
            self.time_unit_name,
            time.reference_time.format("%Y-%m-%dT%H:%M:%SZ")
        );
        let long_name = match time.interval_label() {
            Some(label) => format!("forecast time for {}", label),
            None => "forecast time".to_string(),
        };
        let mut coord = VariableSchema::new(time.dimension.clone(), DataType::Double)
            .with_dimensions([time.dimension.clone()])
            .with_attribute("units", units.clone())
            .with_attribute("long_name", long_name)
            .with_attribute("standard_name", "time")
            .with_attribute("_CoordinateAxisType", "Time")
            .with_values(time.values());

        if time.is_interval() {
            let bounds = bounds_name(&time.dimension);
            coord = coord.with_attribute("bounds", bounds.clone());
            let values = time.bounds().into_iter().flat_map(|(s, e)| [s, e]).collect();
            sink.add_variable(target, coord);
            sink.add_variable(
                target,
                VariableSchema::new(bounds, DataType::Double)
                    .with_dimensions([time.dimension.clone(), BOUNDS_DIM.to_string()])
                    .with_attribute("units", units)
                    .with_attribute("long_name", format!("bounds for {}", time.dimension))
                    .with_values(values),
            );
        } else {
            sink.add_variable(target, coord);
        }
    }

    fn data_variable(
        &self,
        var: &GridVariable,
        hcs: &HorizontalCoordSys,
        handle: VariableHandle,
    ) -> VariableSchema {
        let mut dims = Vec::with_capacity(5);
        let mut coordinate_names = Vec::new();
        if let Some(ids) = var.coordinates {
            let time = self.times.get(ids.time);
            dims.push(time.dimension.clone());
            if let Some(ens) = ids.ensemble {
                dims.push(self.ensembles.get(ens).dimension.clone());
            }
            let vertical = self.verticals.get(ids.vertical);
            if vertical.has_dimension() {
                dims.push(vertical.dimension.clone());
            }
            coordinate_names = dims.clone();
        }
        dims.push(hcs.y.name.clone());
        dims.push(hcs.x.name.clone());

        let prefix = self.format.attribute_prefix();
        let mut schema = VariableSchema::new(var.name.clone(), DataType::Float)
            .with_dimensions(dims)
            .with_attribute("long_name", var.long_name.clone())
            .with_attribute("units", var.parameter.unit.clone())
            .with_attribute("description", var.parameter.description.clone())
            .with_attribute("missing_value", self.missing_value as f64);

        if !hcs.is_lat_lon() {
            schema = schema.with_attribute("grid_mapping", mapping_variable_name(hcs));
        }
        if hcs.lat_lon_2d.is_some() {
            coordinate_names.push("lat".to_string());
            coordinate_names.push("lon".to_string());
            schema = schema.with_attribute("coordinates", coordinate_names.join(" "));
        }

        schema = schema
            .with_attribute(format!("{}_param_discipline", prefix), var.key.parameter.discipline as i64)
            .with_attribute(format!("{}_param_category", prefix), var.key.parameter.category as i64)
            .with_attribute(format!("{}_param_number", prefix), var.key.parameter.number as i64)
            .with_attribute(format!("{}_level_type", prefix), var.key.level_type);
        if let Some(stat) = var.statistic {
            schema = schema.with_attribute(format!("{}_interval_statistic", prefix), stat.name());
        }
        schema.with_handle(handle)
    }
}

fn emit_ensemble(ens: &EnsembleCoord, target: Option<&str>, sink: &mut dyn DatasetSink) {
    let numbers = ens.members().iter().map(|m| m.number as f64).collect();
    let kinds: Vec<f64> = ens.members().iter().map(|m| m.kind as f64).collect();
    sink.add_variable(
        target,
        VariableSchema::new(ens.dimension.clone(), DataType::Int)
            .with_dimensions([ens.dimension.clone()])
            .with_attribute("long_name", "ensemble member")
            .with_attribute("_CoordinateAxisType", "Ensemble")
            .with_attribute("ensemble_type", AttributeValue::Doubles(kinds))
            .with_values(numbers),
    );
}

fn vertical_axis_type(units: &str) -> &'static str {
    match units {
        "Pa" | "hPa" | "mb" | "millibar" => "Pressure",
        "m" | "km" => "Height",
        _ => "GeoZ",
    }
}

fn emit_vertical(vertical: &VerticalCoord, target: Option<&str>, sink: &mut dyn DatasetSink) {
    let dim = vertical.dimension.clone();
    let spec = &vertical.spec;
    let mut coord = VariableSchema::new(dim.clone(), DataType::Float)
        .with_dimensions([dim.clone()])
        .with_attribute("units", spec.units.clone())
        .with_attribute("long_name", spec.description.clone())
        .with_attribute("positive", vertical.positive())
        .with_attribute("_CoordinateAxisType", vertical_axis_type(&spec.units))
        .with_attribute("_CoordinateZisPositive", vertical.positive())
        .with_values(vertical.values());

    if spec.is_layer {
        coord = coord.with_attribute("bounds", bounds_name(&dim));
    }
    if let Some(hybrid) = &vertical.hybrid {
        coord = coord
            .with_attribute("standard_name", "atmosphere_hybrid_sigma_pressure_coordinate")
            .with_attribute("formula_terms", format!("ap: {dim}_a b: {dim}_b ps: ps"));
        sink.add_variable(target, coord);
        for (suffix, values, long_name) in [
            ("a", &hybrid.a, "hybrid A coefficient"),
            ("b", &hybrid.b, "hybrid B coefficient"),
        ] {
            sink.add_variable(
                target,
                VariableSchema::new(format!("{}_{}", dim, suffix), DataType::Double)
                    .with_dimensions([dim.clone()])
                    .with_attribute("long_name", long_name)
                    .with_values(values.clone()),
            );
        }
    } else {
        sink.add_variable(target, coord);
    }

    if spec.is_layer {
        let values = vertical
            .levels()
            .iter()
            .flat_map(|l| [l.value1, l.value2])
            .collect();
        sink.add_variable(
            target,
            VariableSchema::new(bounds_name(&dim), DataType::Float)
                .with_dimensions([dim.clone(), BOUNDS_DIM.to_string()])
                .with_attribute("units", spec.units.clone())
                .with_attribute("long_name", format!("bounds for {}", dim))
                .with_values(values),
        );
    }
}

fn axis_variable(axis: &Axis) -> VariableSchema {
    VariableSchema::new(axis.name.clone(), DataType::Float)
        .with_dimensions([axis.name.clone()])
        .with_attribute("units", axis.units.clone())
        .with_attribute("long_name", axis.long_name.clone())
        .with_attribute("standard_name", axis.standard_name.clone())
        .with_attribute("_CoordinateAxisType", axis.axis_type.clone())
        .with_values(axis.values.clone())
}

fn emit_horizontal(hcs: &HorizontalCoordSys, target: Option<&str>, sink: &mut dyn DatasetSink) {
    sink.add_variable(target, axis_variable(&hcs.y));
    sink.add_variable(target, axis_variable(&hcs.x));

    if let Some(weights) = &hcs.gaussian_weights {
        sink.add_variable(
            target,
            VariableSchema::new(GAUSSIAN_WEIGHTS, DataType::Double)
                .with_dimensions([hcs.y.name.clone()])
                .with_attribute("long_name", "gaussian weights (unnormalized)")
                .with_values(weights.clone()),
        );
    }

    if let Some(fields) = &hcs.lat_lon_2d {
        let dims = [hcs.y.name.clone(), hcs.x.name.clone()];
        sink.add_variable(
            target,
            VariableSchema::new("lat", DataType::Double)
                .with_dimensions(dims.clone())
                .with_attribute("units", "degrees_north")
                .with_attribute("long_name", "latitude coordinate")
                .with_attribute("standard_name", "latitude")
                .with_attribute("_CoordinateAxisType", "Lat")
                .with_values(fields.lat.clone()),
        );
        sink.add_variable(
            target,
            VariableSchema::new("lon", DataType::Double)
                .with_dimensions(dims)
                .with_attribute("units", "degrees_east")
                .with_attribute("long_name", "longitude coordinate")
                .with_attribute("standard_name", "longitude")
                .with_attribute("_CoordinateAxisType", "Lon")
                .with_values(fields.lon.clone()),
        );
    }

    sink.add_variable(
        target,
        VariableSchema::new(mapping_variable_name(hcs), DataType::Char)
            .with_attributes(hcs.mapping_attributes.iter().cloned())
            .with_attribute("_CoordinateTransformType", "Projection")
            .with_attribute("_CoordinateAxes", format!("{} {}", hcs.y.name, hcs.x.name)),
    );
}
