use std::path::Path;

use birthchart_renderer::layout::group_by;
use birthchart_renderer::tables::render_text_table;
use birthchart_renderer::{
    ChartDocument, DiagramConfig, RegionKey, TableMode, Theme, chart_tables, compute_layout,
    render_svg,
};
use birthchart_renderer::ir::ZodiacSign;

fn load_fixture(name: &str) -> ChartDocument {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    serde_json::from_str(&input).expect("fixture parse failed")
}

#[test]
fn every_planet_appears_once_per_style() {
    let doc = load_fixture("natal_full.json");
    let layout = compute_layout(&doc.data, &DiagramConfig::default());
    for planet in doc.data.planets() {
        let label_prefix = birthchart_renderer::layout::planet_abbreviation(&planet.name);
        let house = planet.house.unwrap();
        let north_hits: Vec<RegionKey> = layout
            .north
            .regions
            .iter()
            .filter(|r| r.planets.iter().any(|p| p.starts_with(&label_prefix)))
            .map(|r| r.key)
            .collect();
        assert!(north_hits.contains(&RegionKey::House(house)), "{}", planet.name);

        let sign = planet.zodiac_sign().unwrap();
        let south = layout.south.region(RegionKey::Sign(sign)).unwrap();
        assert!(south.planets.iter().any(|p| p.starts_with(&label_prefix)), "{}", planet.name);
    }
    assert_eq!(layout.north.planet_count(), doc.data.planets().len());
    assert_eq!(layout.south.planet_count(), doc.data.planets().len());
}

#[test]
fn crowded_house_keeps_input_order() {
    let doc = load_fixture("natal_full.json");
    let layout = compute_layout(&doc.data, &DiagramConfig::default());
    let twelfth = layout.north.region(RegionKey::House(12)).unwrap();
    assert_eq!(twelfth.planets, vec!["Ma", "Ve", "Sa"]);
    assert_eq!(twelfth.label, "Cap");
    let pisces = layout.south.region(RegionKey::Sign(ZodiacSign::Pisces)).unwrap();
    assert_eq!(pisces.planets, vec!["Me\u{211B}"]);
    assert_eq!(pisces.heading.as_deref(), Some("2"));
}

#[test]
fn sparse_chart_degrades_gracefully() {
    let doc = load_fixture("horary_sparse.json");
    let layout = compute_layout(&doc.data, &DiagramConfig::default());
    let seventh = layout.north.region(RegionKey::House(7)).unwrap();
    assert_eq!(seventh.label, "");
    assert_eq!(seventh.planets, vec!["Mo"]);
    // The unknown planet references neither a real house nor a real sign.
    assert_eq!(layout.north.planet_count(), 2);
    assert_eq!(layout.south.planet_count(), 2);
    let svg = render_svg(&layout, &Theme::classic(), &DiagramConfig::default());
    assert!(svg.contains("</svg>"));
}

#[test]
fn grouping_is_shared_by_key() {
    let doc = load_fixture("natal_full.json");
    let by_sign = group_by(doc.data.planets(), |p| p.zodiac_sign());
    let capricorn: Vec<&str> = by_sign[&ZodiacSign::Capricorn]
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(capricorn, vec!["Mars", "Venus", "Saturn"]);
}

#[test]
fn layout_is_pure() {
    let doc = load_fixture("natal_full.json");
    let config = DiagramConfig::default();
    let first = compute_layout(&doc.data, &config);
    let second = compute_layout(&doc.data, &config);
    assert_eq!(first, second);
    let theme = Theme::midnight();
    assert_eq!(
        render_svg(&first, &theme, &config),
        render_svg(&second, &theme, &config)
    );
}

#[test]
fn screen_and_report_tables_share_rows() {
    let doc = load_fixture("natal_full.json");
    let report = chart_tables(&doc.data, TableMode::Report);
    let screen = chart_tables(&doc.data, TableMode::Screen);
    assert_eq!(report.len(), 6);
    assert_eq!(screen.len(), 6);
    for (r, s) in report.iter().zip(&screen) {
        assert_eq!(r.category, s.category);
        assert_eq!(r.rows.len(), s.rows.len());
    }

    let periods = &report[2];
    assert_eq!(periods.rows[0][3], "16");
    assert_eq!(periods.rows[1][3], "19");
    assert_eq!(periods.rows[2][3], "17");

    let aspects = &report[3];
    assert_eq!(aspects.rows[0], vec!["Jupiter", "Opposition", "Sun", "1.23°"]);
    assert_eq!(aspects.rows[1], vec!["Saturn", "Conjunction", "Mars", "2.77°"]);

    let mercury = &screen[0].rows[4];
    assert_eq!(mercury[3], "5° 30' 0\"");
    assert_eq!(mercury[7], "Retrograde");

    let text = render_text_table(&report[5]);
    assert!(text.contains("House 12  Mars, Venus, Saturn"));
}
