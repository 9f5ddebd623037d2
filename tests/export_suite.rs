use std::path::Path;

use birthchart_renderer::capture::{CaptureError, RasterImage, Rasterizer};
use birthchart_renderer::report::DrawOp;
use birthchart_renderer::theme::Rgb;
use birthchart_renderer::{
    CHART_REGION_MARKER, ChartDocument, DiagramConfig, ExportClock, ExportOutcome, RenderedView,
    ReportConfig, Theme, assemble_report, compute_layout, export_chart, render_svg,
};
use chrono::NaiveDate;

fn load_fixture(name: &str) -> ChartDocument {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    serde_json::from_str(&input).expect("fixture parse failed")
}

fn clock() -> ExportClock {
    ExportClock::fixed(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
}

fn mounted_view(doc: &ChartDocument) -> RenderedView {
    let config = DiagramConfig::default();
    let layout = compute_layout(&doc.data, &config);
    let mut view = RenderedView::new();
    view.mount(render_svg(&layout, &Theme::midnight(), &config));
    view
}

/// Produces a flat image sized from the markup's declared width and height.
struct FlatRasterizer;

impl Rasterizer for FlatRasterizer {
    fn rasterize(&self, svg: &str, scale: f32, background: Rgb) -> Result<RasterImage, CaptureError> {
        assert!(svg.contains(CHART_REGION_MARKER));
        let (width, height) = ((100.0 * scale) as u32, (40.0 * scale) as u32);
        let rgb = [background.0, background.1, background.2].repeat((width * height) as usize);
        Ok(RasterImage { width, height, rgb })
    }
}

struct BrokenRasterizer;

impl Rasterizer for BrokenRasterizer {
    fn rasterize(&self, _svg: &str, _scale: f32, _background: Rgb) -> Result<RasterImage, CaptureError> {
        Err(CaptureError::Parse("unexpected end of stream".to_string()))
    }
}

#[test]
fn horary_file_name_uses_sanitized_subject_and_date() {
    let doc = load_fixture("horary_sparse.json");
    let outcome = export_chart(&doc, &mounted_view(&doc), &FlatRasterizer, &ReportConfig::default(), &clock());
    assert_eq!(outcome.file_name(), Some("horary_chart_Jane_Doe_2024-01-05.pdf"));
}

#[test]
fn whitespace_runs_collapse_in_file_name() {
    let doc = load_fixture("natal_full.json");
    let outcome = export_chart(&doc, &mounted_view(&doc), &FlatRasterizer, &ReportConfig::default(), &clock());
    assert_eq!(outcome.file_name(), Some("natal_chart_Jane_Doe_2024-01-05.pdf"));
}

#[test]
fn empty_chart_yields_single_cover_page() {
    let doc = load_fixture("empty.json");
    let report = assemble_report(&doc, None, &ReportConfig::default(), &clock());
    assert_eq!(report.page_count(), 1);
    let texts: Vec<&str> = report.pages[0].texts().collect();
    assert_eq!(texts[0], "NATAL CHART");
    assert!(texts.contains(&"BIRTH DETAILS"));
    assert!(texts.contains(&"N/A"));
    assert_eq!(texts.last(), Some(&"Generated by Bobo Astrologer - 1/5/2024"));

    let outcome = export_chart(&doc, &RenderedView::new(), &FlatRasterizer, &ReportConfig::default(), &clock());
    let ExportOutcome::Success { bytes, diagram_embedded, .. } = outcome else {
        panic!("empty chart should still export");
    };
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(!diagram_embedded);
}

#[test]
fn full_chart_has_cover_plus_six_table_pages() {
    let doc = load_fixture("natal_full.json");
    let image = FlatRasterizer
        .rasterize(CHART_REGION_MARKER, 2.0, Rgb(10, 10, 10))
        .unwrap();
    let report = assemble_report(&doc, Some(image), &ReportConfig::default(), &clock());
    assert_eq!(report.page_count(), 7);
    let headings: Vec<&str> = report.pages[1..]
        .iter()
        .filter_map(|page| page.texts().next())
        .collect();
    assert_eq!(
        headings,
        vec![
            "PLANETARY POSITIONS",
            "HOUSE CUSPS",
            "VIMSHOTTARI DASA PERIODS",
            "PLANETARY ASPECTS",
            "PLANET SIGNIFICATORS (KP SYSTEM)",
            "HOUSE SIGNIFICATORS (KP SYSTEM)",
        ]
    );
    assert!(report.pages[0].has_image());
    assert!(report.pages[1].texts().any(|t| t == "R"));
    assert!(report.pages[1].texts().any(|t| t == "29.85°"));
}

#[test]
fn table_rows_stay_inside_the_page() {
    let doc = load_fixture("natal_full.json");
    let config = ReportConfig::default();
    let report = assemble_report(&doc, None, &config, &clock());
    for page in &report.pages {
        for op in &page.ops {
            if let DrawOp::Text { x, y, .. } = op {
                assert!(*x >= 0.0 && *x <= config.page_width);
                assert!(*y >= 0.0 && *y <= config.page_height);
            }
        }
    }
}

#[test]
fn raster_failure_still_succeeds_without_diagram() {
    let doc = load_fixture("natal_full.json");
    let outcome = export_chart(&doc, &mounted_view(&doc), &BrokenRasterizer, &ReportConfig::default(), &clock());
    let ExportOutcome::Success { file_name, bytes, diagram_embedded } = outcome else {
        panic!("capture failure must not fail the export");
    };
    assert_eq!(file_name, "natal_chart_Jane_Doe_2024-01-05.pdf");
    assert!(!diagram_embedded);
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn captured_diagram_is_embedded() {
    let doc = load_fixture("natal_full.json");
    let outcome = export_chart(&doc, &mounted_view(&doc), &FlatRasterizer, &ReportConfig::default(), &clock());
    assert!(matches!(outcome, ExportOutcome::Success { diagram_embedded: true, .. }));
}

#[cfg(feature = "png")]
#[test]
fn resvg_captures_rendered_chart() {
    use birthchart_renderer::ResvgRasterizer;

    let doc = load_fixture("natal_full.json");
    let view = mounted_view(&doc);
    let svg = view.locate(CHART_REGION_MARKER).unwrap();
    let image = ResvgRasterizer::default()
        .rasterize(&svg, 1.0, Rgb(10, 10, 10))
        .unwrap();
    let layout = compute_layout(&doc.data, &DiagramConfig::default());
    assert_eq!(image.width, layout.width.ceil() as u32);
    assert_eq!(image.rgb.len(), (image.width * image.height * 3) as usize);
}

#[cfg(feature = "png")]
#[test]
fn capture_uses_report_background_for_light_theme() {
    use birthchart_renderer::ResvgRasterizer;
    use birthchart_renderer::report::{DiagramHost, capture_diagram};

    let doc = load_fixture("natal_full.json");
    let config = DiagramConfig::default();
    let layout = compute_layout(&doc.data, &config);
    let mut view = RenderedView::new();
    view.mount(render_svg(&layout, &Theme::classic(), &config));

    let region = view.locate_region(CHART_REGION_MARKER).unwrap();
    assert!(!region.contains("height=\"100%\""));

    let image = capture_diagram(&view, &ResvgRasterizer::default(), &ReportConfig::default()).unwrap();
    assert_eq!(&image.rgb[..3], &[10, 10, 10]);
}
