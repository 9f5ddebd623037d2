use std::collections::BTreeMap;

use crate::ir::{HouseCusp, PlanetPlacement, ZodiacSign};

use super::{DiagramLayout, DiagramStyle, RegionKey, RegionLayout, place_outline, planet_labels};

const GRID: f32 = 4.0;

// Aries sits second from the left on the top row and the signs run clockwise
// around the rim of the 4x4 grid; the centre 2x2 block is left empty.
const SIGN_SLOTS: [(ZodiacSign, usize, usize); 12] = [
    (ZodiacSign::Aries, 0, 1),
    (ZodiacSign::Taurus, 0, 2),
    (ZodiacSign::Gemini, 0, 3),
    (ZodiacSign::Cancer, 1, 3),
    (ZodiacSign::Leo, 2, 3),
    (ZodiacSign::Virgo, 3, 3),
    (ZodiacSign::Libra, 3, 2),
    (ZodiacSign::Scorpio, 3, 1),
    (ZodiacSign::Sagittarius, 3, 0),
    (ZodiacSign::Capricorn, 2, 0),
    (ZodiacSign::Aquarius, 1, 0),
    (ZodiacSign::Pisces, 0, 0),
];

pub(super) fn compute_south_layout(
    planets_by_sign: &BTreeMap<ZodiacSign, Vec<&PlanetPlacement>>,
    cusps_by_sign: &BTreeMap<ZodiacSign, Vec<&HouseCusp>>,
    origin: (f32, f32),
    size: f32,
) -> DiagramLayout {
    let regions = SIGN_SLOTS
        .iter()
        .map(|&(sign, row, col)| {
            let (left, top) = (col as f32 / GRID, row as f32 / GRID);
            let (right, bottom) = (left + 1.0 / GRID, top + 1.0 / GRID);
            let heading = cusps_by_sign
                .get(&sign)
                .and_then(|cusps| cusps.first())
                .and_then(|cusp| cusp.house_number)
                .map(|number| number.to_string());
            RegionLayout {
                key: RegionKey::Sign(sign),
                heading,
                label: sign.abbreviation().to_string(),
                planets: planet_labels(planets_by_sign.get(&sign)),
                row,
                col,
                outline: place_outline(
                    &[(left, top), (right, top), (right, bottom), (left, bottom)],
                    origin,
                    size,
                ),
                anchor: (
                    origin.0 + (left + right) / 2.0 * size,
                    origin.1 + (top + bottom) / 2.0 * size,
                ),
            }
        })
        .collect();

    DiagramLayout {
        style: DiagramStyle::SouthIndian,
        x: origin.0,
        y: origin.1,
        size,
        regions,
    }
}
