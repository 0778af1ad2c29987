//! Variable name disambiguation.
//!
//! Variables of one horizontal group that share a simple name (the same
//! parameter description) are split by vertical coordinate. The coordinate
//! with the most levels keeps the bare name, ties broken by level name; the
//! others get the vertical dimension name appended. Variables sharing both
//! the simple name and the vertical coordinate get a statistic suffix.

use crate::variable::{sanitize_name, GridVariable};
use crate::vertical::{VerticalId, VerticalRegistry};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

/// Assign unique names to the placed variables of one group.
///
/// `reserved` holds names already taken in the group (coordinate variables).
pub fn assign_names(
    variables: &mut [GridVariable],
    verticals: &VerticalRegistry,
    use_description: bool,
    reserved: &HashSet<String>,
) {
    let mut products: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, var) in variables.iter().enumerate() {
        if var.coordinates.is_some() {
            products.entry(var.simple_name(use_description)).or_default().push(i);
        }
    }

    for (simple, members) in products {
        let mut by_vertical: BTreeMap<VerticalId, Vec<usize>> = BTreeMap::new();
        for i in members {
            if let Some(coords) = variables[i].coordinates {
                by_vertical.entry(coords.vertical).or_default().push(i);
            }
        }

        let mut groups: Vec<(VerticalId, Vec<usize>)> = by_vertical.into_iter().collect();
        groups.sort_by_key(|(id, _)| {
            let coord = verticals.get(*id);
            (
                Reverse(coord.len()),
                coord.level_name().to_string(),
                coord.dimension.clone(),
            )
        });

        for (k, (vertical, mut group)) in groups.into_iter().enumerate() {
            let base = if k == 0 && use_description {
                simple.clone()
            } else {
                format!("{}_{}", simple, verticals.get(vertical).dimension)
            };
            if group.len() == 1 {
                variables[group[0]].name = base;
                continue;
            }
            group.sort_by_key(|i| variables[*i].key);
            for i in group {
                let qualifier = qualifier(&variables[i]);
                variables[i].name = format!("{}_{}", base, qualifier);
            }
        }
    }

    make_unique(variables, reserved);
}

/// Suffix separating variables that share a name and vertical coordinate.
fn qualifier(var: &GridVariable) -> String {
    match (var.statistic, var.key.layer) {
        (Some(stat), _) => stat.suffix(),
        (None, true) => "layer".to_string(),
        (None, false) => format!("L{}", var.key.level_type),
    }
}

/// Append `_2`, `_3` ... to names that are still taken, in key order.
fn make_unique(variables: &mut [GridVariable], reserved: &HashSet<String>) {
    let mut order: Vec<usize> = (0..variables.len())
        .filter(|i| variables[*i].coordinates.is_some())
        .collect();
    order.sort_by_key(|i| variables[*i].key);

    let mut used: HashSet<String> = reserved.clone();
    for i in order {
        let base = variables[i].name.clone();
        let mut candidate = base.clone();
        let mut n = 2;
        while used.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        used.insert(candidate.clone());
        variables[i].name = candidate;
    }
}

/// Group name for a horizontal grid, unique among `used`.
pub fn sanitize_group_name(grid_name: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_name(grid_name);
    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}
