mod north;
mod south;
pub(crate) mod types;
pub use types::*;
use north::*;
use south::*;

use crate::config::DiagramConfig;
use crate::ir::{ChartResult, PlanetPlacement, ZodiacSign};
use std::collections::BTreeMap;

/// Appended to a planet abbreviation when the planet is retrograde.
pub const RETROGRADE_MARKER: char = '\u{211B}';

/// Resolves both diagram styles for one chart result.
///
/// Pure function of its inputs: planets that reference a house or sign with no
/// matching region are left out rather than reported, and missing cusps only
/// blank the affected labels.
pub fn compute_layout(chart: &ChartResult, config: &DiagramConfig) -> ChartLayout {
    let planets = chart.planets();
    let houses = chart.houses();

    let planets_by_house = group_by(planets, |planet| planet.house);
    let planets_by_sign = group_by(planets, PlanetPlacement::zodiac_sign);
    let cusps_by_house = group_by(houses, |house| house.house_number);
    let cusps_by_sign = group_by(houses, |house| ZodiacSign::from_name(&house.sign));

    let size = config.size.max(1.0);
    let top = config.padding + if config.show_titles { config.title_height } else { 0.0 };
    let north = compute_north_layout(
        &planets_by_house,
        &cusps_by_house,
        (config.padding, top),
        size,
    );
    let south = compute_south_layout(
        &planets_by_sign,
        &cusps_by_sign,
        (config.padding + size + config.gap, top),
        size,
    );

    ChartLayout {
        north,
        south,
        width: config.padding * 2.0 + size * 2.0 + config.gap,
        height: top + size + config.padding,
    }
}

/// Single grouping pass: key -> items in input order. Items whose key cannot be
/// derived are skipped.
pub fn group_by<'a, T, K, F>(items: &'a [T], mut key: F) -> BTreeMap<K, Vec<&'a T>>
where
    K: Ord,
    F: FnMut(&'a T) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<&'a T>> = BTreeMap::new();
    for item in items {
        if let Some(k) = key(item) {
            groups.entry(k).or_default().push(item);
        }
    }
    groups
}

pub fn planet_abbreviation(name: &str) -> String {
    match name.trim() {
        "Asc" | "Ascendant" => "As".to_string(),
        "Mercury" => "Me".to_string(),
        "Jupiter" => "Ju".to_string(),
        "Saturn" => "Sa".to_string(),
        other => other.chars().take(2).collect(),
    }
}

pub fn planet_label(planet: &PlanetPlacement) -> String {
    let mut label = planet_abbreviation(&planet.name);
    if planet.retrograde {
        label.push(RETROGRADE_MARKER);
    }
    label
}

fn planet_labels(group: Option<&Vec<&PlanetPlacement>>) -> Vec<String> {
    group
        .map(|planets| planets.iter().map(|planet| planet_label(planet)).collect())
        .unwrap_or_default()
}

fn sign_prefix(sign: &str) -> String {
    sign.trim().chars().take(3).collect()
}

fn place_outline(outline: &[(f32, f32)], origin: (f32, f32), size: f32) -> Vec<(f32, f32)> {
    outline
        .iter()
        .map(|(fx, fy)| (origin.0 + fx * size, origin.1 + fy * size))
        .collect()
}
