use std::collections::BTreeMap;

use crate::ir::{HouseCusp, PlanetPlacement};

use super::{
    DiagramLayout, DiagramStyle, RegionKey, RegionLayout, place_outline, planet_labels, sign_prefix,
};

struct HouseSlot {
    house: u32,
    row: usize,
    col: usize,
    anchor: (f32, f32),
    outline: &'static [(f32, f32)],
}

// Square with both diagonals and the inscribed diamond. House 1 is the top
// diamond; houses then run counter-clockwise. Outline and anchor are fractions
// of the square side.
const HOUSE_SLOTS: [HouseSlot; 12] = [
    HouseSlot {
        house: 1,
        row: 0,
        col: 2,
        anchor: (0.50, 0.25),
        outline: &[(0.5, 0.0), (0.75, 0.25), (0.5, 0.5), (0.25, 0.25)],
    },
    HouseSlot {
        house: 2,
        row: 1,
        col: 3,
        anchor: (0.25, 0.09),
        outline: &[(0.0, 0.0), (0.5, 0.0), (0.25, 0.25)],
    },
    HouseSlot {
        house: 3,
        row: 2,
        col: 3,
        anchor: (0.09, 0.25),
        outline: &[(0.0, 0.0), (0.25, 0.25), (0.0, 0.5)],
    },
    HouseSlot {
        house: 4,
        row: 3,
        col: 2,
        anchor: (0.25, 0.50),
        outline: &[(0.25, 0.25), (0.5, 0.5), (0.25, 0.75), (0.0, 0.5)],
    },
    HouseSlot {
        house: 5,
        row: 1,
        col: 2,
        anchor: (0.09, 0.75),
        outline: &[(0.0, 0.5), (0.25, 0.75), (0.0, 1.0)],
    },
    HouseSlot {
        house: 6,
        row: 2,
        col: 2,
        anchor: (0.25, 0.91),
        outline: &[(0.0, 1.0), (0.25, 0.75), (0.5, 1.0)],
    },
    HouseSlot {
        house: 7,
        row: 2,
        col: 1,
        anchor: (0.50, 0.75),
        outline: &[(0.5, 0.5), (0.75, 0.75), (0.5, 1.0), (0.25, 0.75)],
    },
    HouseSlot {
        house: 8,
        row: 1,
        col: 1,
        anchor: (0.75, 0.91),
        outline: &[(0.5, 1.0), (0.75, 0.75), (1.0, 1.0)],
    },
    HouseSlot {
        house: 9,
        row: 3,
        col: 1,
        anchor: (0.91, 0.75),
        outline: &[(1.0, 1.0), (0.75, 0.75), (1.0, 0.5)],
    },
    HouseSlot {
        house: 10,
        row: 2,
        col: 0,
        anchor: (0.75, 0.50),
        outline: &[(0.75, 0.25), (1.0, 0.5), (0.75, 0.75), (0.5, 0.5)],
    },
    HouseSlot {
        house: 11,
        row: 1,
        col: 0,
        anchor: (0.91, 0.25),
        outline: &[(1.0, 0.5), (0.75, 0.25), (1.0, 0.0)],
    },
    HouseSlot {
        house: 12,
        row: 0,
        col: 1,
        anchor: (0.75, 0.09),
        outline: &[(1.0, 0.0), (0.75, 0.25), (0.5, 0.0)],
    },
];

pub(super) fn compute_north_layout(
    planets_by_house: &BTreeMap<u32, Vec<&PlanetPlacement>>,
    cusps_by_house: &BTreeMap<u32, Vec<&HouseCusp>>,
    origin: (f32, f32),
    size: f32,
) -> DiagramLayout {
    let regions = HOUSE_SLOTS
        .iter()
        .map(|slot| {
            let label = cusps_by_house
                .get(&slot.house)
                .and_then(|cusps| cusps.first())
                .map(|cusp| sign_prefix(&cusp.sign))
                .unwrap_or_default();
            RegionLayout {
                key: RegionKey::House(slot.house),
                heading: Some(slot.house.to_string()),
                label,
                planets: planet_labels(planets_by_house.get(&slot.house)),
                row: slot.row,
                col: slot.col,
                outline: place_outline(slot.outline, origin, size),
                anchor: (
                    origin.0 + slot.anchor.0 * size,
                    origin.1 + slot.anchor.1 * size,
                ),
            }
        })
        .collect();

    DiagramLayout {
        style: DiagramStyle::NorthIndian,
        x: origin.0,
        y: origin.1,
        size,
        regions,
    }
}
