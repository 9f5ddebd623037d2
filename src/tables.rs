//! Category tables shared by the on-screen view and the report export.
//!
//! Both paths read the same [`ChartResult`] but format it differently:
//! the screen spells out retrograde status and uses degree/minute/second
//! notation, the report keeps cells short enough for fixed-width columns.

use serde_json::Value;

use crate::format::{format_decimal_degree, format_degree};
use crate::ir::{
    Aspect, ChartResult, HouseCusp, PeriodTable, PlanetPlacement, Significators, value_as_f64,
};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Screen,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Planets,
    Houses,
    Periods,
    Aspects,
    PlanetSignificators,
    HouseSignificators,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Planets,
        Category::Houses,
        Category::Periods,
        Category::Aspects,
        Category::PlanetSignificators,
        Category::HouseSignificators,
    ];

    pub fn title(self, mode: TableMode) -> &'static str {
        match (self, mode) {
            (Category::Planets, TableMode::Screen) => "Planetary Positions",
            (Category::Planets, TableMode::Report) => "PLANETARY POSITIONS",
            (Category::Houses, TableMode::Screen) => "House Cusps",
            (Category::Houses, TableMode::Report) => "HOUSE CUSPS",
            (Category::Periods, TableMode::Screen) => "Vimshottari Dasa Periods",
            (Category::Periods, TableMode::Report) => "VIMSHOTTARI DASA PERIODS",
            (Category::Aspects, TableMode::Screen) => "Planetary Aspects",
            (Category::Aspects, TableMode::Report) => "PLANETARY ASPECTS",
            (Category::PlanetSignificators, TableMode::Screen) => {
                "Planet Significators (KP System)"
            }
            (Category::PlanetSignificators, TableMode::Report) => {
                "PLANET SIGNIFICATORS (KP SYSTEM)"
            }
            (Category::HouseSignificators, TableMode::Screen) => "House Significators (KP System)",
            (Category::HouseSignificators, TableMode::Report) => "HOUSE SIGNIFICATORS (KP SYSTEM)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub category: Category,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    fn new(category: Category, mode: TableMode, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            category,
            title: category.title(mode).to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }
}

/// Every category present in `result`, in report order. Absent categories are
/// skipped; aspects are also skipped when the list is empty.
pub fn chart_tables(result: &ChartResult, mode: TableMode) -> Vec<TableData> {
    Category::ALL
        .iter()
        .filter_map(|category| category_table(result, *category, mode))
        .collect()
}

pub fn category_table(result: &ChartResult, category: Category, mode: TableMode) -> Option<TableData> {
    match category {
        Category::Planets => result.planets.as_deref().map(|p| planet_table(p, mode)),
        Category::Houses => result.houses.as_deref().map(|h| house_table(h, mode)),
        Category::Periods => result.periods.as_ref().map(|p| period_table(p, mode)),
        Category::Aspects => result
            .aspects
            .as_deref()
            .filter(|aspects| !aspects.is_empty())
            .map(|a| aspect_table(a, mode)),
        Category::PlanetSignificators => result
            .planet_significators
            .as_ref()
            .map(|s| planet_significator_table(s, mode)),
        Category::HouseSignificators => result
            .house_significators
            .as_ref()
            .map(|s| house_significator_table(s, mode)),
    }
}

pub fn planet_table(planets: &[PlanetPlacement], mode: TableMode) -> TableData {
    let nak_lord = match mode {
        TableMode::Screen => "Nakshatra Lord",
        TableMode::Report => "Nak. Lord",
    };
    let headers = [
        "Planet", "Sign", "Sign Lord", "Degree", "Nakshatra", nak_lord, "House", "Status",
    ];
    let rows = planets
        .iter()
        .map(|planet| {
            vec![
                text_or_na(Some(&planet.name)),
                text_or_na(Some(&planet.sign)),
                text_or_na(planet.rasi_lord.as_deref()),
                degree_cell(planet.sign_degree, mode),
                text_or_na(planet.nakshatra.as_deref()),
                text_or_na(planet.nakshatra_lord.as_deref()),
                planet
                    .house
                    .map(|house| house.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                retrograde_status(planet.retrograde, mode).to_string(),
            ]
        })
        .collect();
    TableData::new(Category::Planets, mode, &headers, rows)
}

pub fn house_table(houses: &[HouseCusp], mode: TableMode) -> TableData {
    let rows = houses
        .iter()
        .map(|house| {
            vec![
                house
                    .house_number
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                text_or_na(Some(&house.sign)),
                degree_cell(house.cusp_degree, mode),
                text_or_na(house.lord.as_deref()),
            ]
        })
        .collect();
    TableData::new(
        Category::Houses,
        mode,
        &["House", "Sign", "Cusp Degree", "Lord"],
        rows,
    )
}

/// Candidate duration fields, most specific first for each path. The service
/// has shipped all three names; none is treated as canonical.
pub fn duration_fields(mode: TableMode) -> &'static [&'static str] {
    match mode {
        TableMode::Screen => &["duration_years", "duration", "years"],
        TableMode::Report => &["duration", "years", "duration_years"],
    }
}

pub fn period_table(periods: &PeriodTable, mode: TableMode) -> TableData {
    let rows = periods
        .entries()
        .iter()
        .map(|entry| {
            vec![
                text_or_na(Some(entry.planet)),
                value_or_na(entry.field("start_date")),
                value_or_na(entry.field("end_date")),
                value_or_na(entry.first_present(duration_fields(mode))),
            ]
        })
        .collect();
    TableData::new(
        Category::Periods,
        mode,
        &["Planet", "Start Date", "End Date", "Duration (Years)"],
        rows,
    )
}

pub fn aspect_table(aspects: &[Aspect], mode: TableMode) -> TableData {
    let rows = aspects
        .iter()
        .map(|aspect| {
            vec![
                value_or_na(aspect.first_planet()),
                value_or_na(aspect.kind()),
                value_or_na(aspect.second_planet()),
                aspect
                    .orb()
                    .map(format_decimal_degree)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ]
        })
        .collect();
    TableData::new(
        Category::Aspects,
        mode,
        &["Planet 1", "Aspect Type", "Planet 2", "Orb"],
        rows,
    )
}

pub fn planet_significator_table(significators: &Significators, mode: TableMode) -> TableData {
    let rows = significators
        .iter()
        .map(|(planet, houses)| vec![planet.to_string(), list_text(houses)])
        .collect();
    TableData::new(
        Category::PlanetSignificators,
        mode,
        &["Planet", "Signifies Houses"],
        rows,
    )
}

pub fn house_significator_table(significators: &Significators, mode: TableMode) -> TableData {
    let rows = significators
        .iter()
        .map(|(house, planets)| {
            let key = match mode {
                TableMode::Report => format!("House {house}"),
                TableMode::Screen => house.to_string(),
            };
            vec![key, list_text(planets)]
        })
        .collect();
    TableData::new(
        Category::HouseSignificators,
        mode,
        &["House", "Significator Planets"],
        rows,
    )
}

pub fn retrograde_status(retrograde: bool, mode: TableMode) -> &'static str {
    match (retrograde, mode) {
        (true, TableMode::Screen) => "Retrograde",
        (false, TableMode::Screen) => "Direct",
        (true, TableMode::Report) => "R",
        (false, TableMode::Report) => "D",
    }
}

fn degree_cell(degree: Option<f64>, mode: TableMode) -> String {
    match (degree, mode) {
        (Some(value), TableMode::Screen) => format_degree(value),
        (Some(value), TableMode::Report) => format_decimal_degree(value),
        (None, _) => NOT_AVAILABLE.to_string(),
    }
}

fn text_or_na(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn value_or_na(value: Option<&Value>) -> String {
    value.map(scalar_text).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Integral numbers print without a fractional part, everything else as-is.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), value_as_f64(value)) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => list_text(value),
    }
}

/// Arrays join with `", "`; objects (A/B/C/D significator levels) render as
/// `A: 1, 2; B: 3`.
pub fn list_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(key, inner)| format!("{key}: {}", list_text(inner)))
            .collect::<Vec<_>>()
            .join("; "),
        other => scalar_text(other),
    }
}

/// Plain-text rendering with left-aligned, content-sized columns.
pub fn render_text_table(table: &TableData) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: &[String]| -> String {
        let mut line = String::new();
        for (idx, width) in widths.iter().enumerate() {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            if idx > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            let pad = width.saturating_sub(cell.chars().count());
            line.extend(std::iter::repeat_n(' ', pad));
        }
        line.trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&table.title);
    out.push('\n');
    out.push_str(&format_row(&table.headers));
    out.push('\n');
    let rule_len = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 2;
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}
