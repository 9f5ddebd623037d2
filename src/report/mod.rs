//! Report assembly: chart document in, paginated PDF bytes out.

mod page;
mod pdf;
mod table;

pub use page::{DrawOp, PageWriter, Palette, ReportDocument, ReportPage};
pub use pdf::write_pdf;
pub use table::{TableStyle, draw_table};

use chrono::NaiveDate;
use thiserror::Error;

use crate::capture::{CaptureError, RasterImage, Rasterizer, sanitize_for_capture};
use crate::config::ReportConfig;
use crate::format::{
    birth_date, birth_time, format_coordinates, format_date_short, sanitize_file_stem,
};
use crate::ir::{ChartDocument, ChartInput, ChartKind};
use crate::render::{CHART_REGION_MARKER, RenderedView};
use crate::tables::{NOT_AVAILABLE, TableMode, chart_tables};
use crate::text_metrics::FontStyle;
use crate::theme::Rgb;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report has no pages")]
    EmptyDocument,
    #[error("image {index} holds {actual} bytes, expected {expected}")]
    InvalidImage {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("page {page} references missing image {image}")]
    MissingImage { page: usize, image: usize },
}

/// Whatever currently displays the rendered chart diagrams. Export asks it for
/// the markup of the region tagged with a marker id.
pub trait DiagramHost {
    fn locate_region(&self, marker: &str) -> Option<String>;
}

impl DiagramHost for RenderedView {
    fn locate_region(&self, marker: &str) -> Option<String> {
        self.locate(marker)
    }
}

/// Dates stamped on an export: the file name uses the UTC calendar date, the
/// footer the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportClock {
    pub file_date: NaiveDate,
    pub footer_date: NaiveDate,
}

impl ExportClock {
    pub fn now() -> Self {
        Self {
            file_date: chrono::Utc::now().date_naive(),
            footer_date: chrono::Local::now().date_naive(),
        }
    }

    pub fn fixed(date: NaiveDate) -> Self {
        Self {
            file_date: date,
            footer_date: date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Rendering,
    Writing { degraded: bool },
    Finalized,
    Failed,
}

/// Phase tracker for one export invocation.
#[derive(Debug, Clone)]
pub struct ExportState {
    history: Vec<ExportPhase>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self {
            history: vec![ExportPhase::Idle],
        }
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ExportPhase {
        self.history.last().copied().unwrap_or(ExportPhase::Idle)
    }

    pub fn history(&self) -> &[ExportPhase] {
        &self.history
    }

    pub fn transition(&mut self, next: ExportPhase) {
        log::debug!("export: {:?} -> {:?}", self.phase(), next);
        self.history.push(next);
    }
}

/// Result of the diagram capture step.
#[derive(Debug)]
pub enum DiagramCapture {
    Captured(RasterImage),
    Failed(CaptureError),
}

impl DiagramCapture {
    pub fn image(&self) -> Option<&RasterImage> {
        match self {
            DiagramCapture::Captured(image) => Some(image),
            DiagramCapture::Failed(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum ExportOutcome {
    Success {
        file_name: String,
        bytes: Vec<u8>,
        diagram_embedded: bool,
    },
    Failure {
        error: String,
    },
}

impl ExportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExportOutcome::Success { .. })
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            ExportOutcome::Success { file_name, .. } => Some(file_name),
            ExportOutcome::Failure { .. } => None,
        }
    }
}

/// `{type}_chart_{name or "chart"}_{YYYY-MM-DD}.pdf`. The name is not trimmed:
/// leading or trailing whitespace becomes an underscore like any other run.
pub fn export_file_name(kind: ChartKind, input: Option<&ChartInput>, date: NaiveDate) -> String {
    let name = input
        .and_then(|input| input.name.as_deref())
        .filter(|name| !name.is_empty())
        .map(sanitize_file_stem)
        .unwrap_or_else(|| "chart".to_string());
    format!("{}_chart_{}_{}.pdf", kind.slug(), name, date.format("%Y-%m-%d"))
}

/// Locates the diagram region on `host`, sanitizes it and rasterizes it.
pub fn capture_diagram(
    host: &dyn DiagramHost,
    rasterizer: &dyn Rasterizer,
    config: &ReportConfig,
) -> Result<RasterImage, CaptureError> {
    let markup = host
        .locate_region(CHART_REGION_MARKER)
        .ok_or_else(|| CaptureError::RegionNotFound(CHART_REGION_MARKER.to_string()))?;
    let sanitized = sanitize_for_capture(&markup);
    let background = Rgb::parse_or(&config.capture_background, Rgb(10, 10, 10));
    rasterizer.rasterize(&sanitized, config.capture_scale, background)
}

/// Lays out every report page. `diagram` is embedded after the birth details
/// when present; the tables follow, one category per page.
pub fn assemble_report(
    doc: &ChartDocument,
    diagram: Option<RasterImage>,
    config: &ReportConfig,
    clock: &ExportClock,
) -> ReportDocument {
    let title = doc.kind.title();
    let mut writer = PageWriter::new(config, title);
    let palette = writer.palette();
    let margin = writer.margin();

    let y = writer.cursor();
    writer.centered_text(y, title, config.title_size, FontStyle::Bold, palette.text_primary);
    writer.advance(8.0);
    writer.rule();
    writer.advance(3.0);

    let input = doc.input.as_ref();
    if let Some(name) = input.and_then(ChartInput::subject_name) {
        writer.ensure_space(30.0);
        section_heading(&mut writer, "PERSONAL INFORMATION", 8.0);
        labelled_value(&mut writer, "Name:", name, 20.0, config.personal_size);
        let place = input
            .and_then(|i| i.place_of_birth.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty());
        if let Some(place) = place {
            labelled_value(&mut writer, "Place of Birth:", place, 30.0, config.personal_size);
        }
        writer.advance(5.0);
        writer.rule();
        writer.advance(3.0);
    }

    writer.ensure_space(40.0);
    section_heading(&mut writer, "BIRTH DETAILS", 8.0);
    for (label, value) in birth_details(doc.kind, input) {
        writer.ensure_space(6.0);
        labelled_value(&mut writer, label, &value, 30.0, config.detail_size);
    }
    writer.advance(5.0);
    writer.rule();
    writer.advance(5.0);

    if let Some(image) = diagram {
        writer.ensure_space(120.0);
        section_heading(&mut writer, "CHART WHEELS", 10.0);
        let width = writer.content_width();
        let height = width * image.aspect_ratio();
        writer.ensure_space(height);
        let y = writer.cursor();
        writer.image(image, margin, y, width, height);
        writer.advance(height + 10.0);
    }

    let style = TableStyle::from_config(config, &palette);
    for table in chart_tables(&doc.data, TableMode::Report) {
        writer.new_page();
        section_heading(&mut writer, &table.title, 10.0);
        let (width, y) = (writer.content_width(), writer.cursor());
        let used = draw_table(
            writer.page_mut(),
            &table.headers,
            &table.rows,
            margin,
            y,
            width,
            &style,
        );
        writer.advance(used + 10.0);
    }

    let footer = format!(
        "Generated by {} - {}",
        config.footer_brand,
        format_date_short(clock.footer_date)
    );
    writer.centered_text(
        config.page_height - 10.0,
        &footer,
        config.footer_size,
        FontStyle::Oblique,
        palette.text_secondary,
    );

    writer.finish()
}

fn section_heading(writer: &mut PageWriter<'_>, heading: &str, advance: f32) {
    let (x, y) = (writer.margin(), writer.cursor());
    let size = writer.config().section_size;
    let color = writer.palette().accent_purple;
    writer.text(x, y, heading, size, FontStyle::Bold, color);
    writer.advance(advance);
}

/// Gold bold label at `margin + 5`, value at `margin + 5 + value_offset`.
fn labelled_value(writer: &mut PageWriter<'_>, label: &str, value: &str, value_offset: f32, size: f32) {
    let palette = writer.palette();
    let (x, y) = (writer.margin() + 5.0, writer.cursor());
    writer.text(x, y, label, size, FontStyle::Bold, palette.accent_gold);
    writer.text(x + value_offset, y, value, size, FontStyle::Regular, palette.text_primary);
    writer.advance(6.0);
}

fn birth_details(kind: ChartKind, input: Option<&ChartInput>) -> Vec<(&'static str, String)> {
    let text = |value: Option<&str>| -> String {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };
    let Some(input) = input else {
        return ["Date:", "Time:", "Timezone:", "Coordinates:", "Ayanamsa:", "House System:"]
            .into_iter()
            .map(|label| (label, NOT_AVAILABLE.to_string()))
            .collect();
    };

    let mut details = vec![
        ("Date:", birth_date(input)),
        ("Time:", birth_time(input)),
        ("Timezone:", text(Some(input.utc.as_str()))),
        ("Coordinates:", format_coordinates(input.latitude, input.longitude)),
        ("Ayanamsa:", text(input.ayanamsa.as_deref())),
        ("House System:", text(input.house_system.as_deref())),
    ];
    if kind == ChartKind::Horary {
        if let Some(number) = input.horary_number {
            details.push(("Horary Number:", number.to_string()));
        }
    }
    details
}

/// Runs a full export. Never panics and never returns an error: capture
/// failures drop the diagram, write failures become [`ExportOutcome::Failure`].
pub fn export_chart(
    doc: &ChartDocument,
    host: &dyn DiagramHost,
    rasterizer: &dyn Rasterizer,
    config: &ReportConfig,
    clock: &ExportClock,
) -> ExportOutcome {
    let mut state = ExportState::new();

    state.transition(ExportPhase::Rendering);
    let capture = match capture_diagram(host, rasterizer, config) {
        Ok(image) => DiagramCapture::Captured(image),
        Err(err) => {
            log::warn!("diagram capture failed, exporting without it: {err}");
            DiagramCapture::Failed(err)
        }
    };
    let diagram_embedded = capture.image().is_some();
    state.transition(ExportPhase::Writing {
        degraded: !diagram_embedded,
    });

    let diagram = match capture {
        DiagramCapture::Captured(image) => Some(image),
        DiagramCapture::Failed(_) => None,
    };
    let report = assemble_report(doc, diagram, config, clock);
    match write_pdf(&report) {
        Ok(bytes) => {
            state.transition(ExportPhase::Finalized);
            let file_name = export_file_name(doc.kind, doc.input.as_ref(), clock.file_date);
            log::info!(
                "exported {file_name} ({} page(s), {} bytes)",
                report.page_count(),
                bytes.len()
            );
            ExportOutcome::Success {
                file_name,
                bytes,
                diagram_embedded,
            }
        }
        Err(err) => {
            state.transition(ExportPhase::Failed);
            log::error!("report export failed: {err}");
            ExportOutcome::Failure {
                error: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ChartResult;

    struct NoHost;

    impl DiagramHost for NoHost {
        fn locate_region(&self, _marker: &str) -> Option<String> {
            None
        }
    }

    struct SolidRasterizer;

    impl Rasterizer for SolidRasterizer {
        fn rasterize(&self, svg: &str, scale: f32, background: Rgb) -> Result<RasterImage, CaptureError> {
            assert!(!svg.contains("oklch("));
            let (width, height) = ((4.0 * scale) as u32, (2.0 * scale) as u32);
            let rgb = [background.0, background.1, background.2]
                .repeat((width * height) as usize);
            Ok(RasterImage { width, height, rgb })
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn input(name: Option<&str>) -> ChartInput {
        ChartInput {
            name: name.map(str::to_string),
            place_of_birth: Some("Pune".to_string()),
            year: 1990,
            month: 7,
            day: 4,
            hour: 6,
            minute: 30,
            second: 0,
            utc: "+05:30".to_string(),
            latitude: 18.5204,
            longitude: 73.8567,
            ayanamsa: Some("Krishnamurti".to_string()),
            house_system: Some("Placidus".to_string()),
            horary_number: Some(108),
        }
    }

    #[test]
    fn file_name_sanitizes_subject() {
        let horary = input(Some("Jane Doe"));
        assert_eq!(
            export_file_name(ChartKind::Horary, Some(&horary), date()),
            "horary_chart_Jane_Doe_2024-01-05.pdf"
        );
        let padded = input(Some("Jane Doe "));
        assert_eq!(
            export_file_name(ChartKind::Horary, Some(&padded), date()),
            "horary_chart_Jane_Doe__2024-01-05.pdf"
        );
        let blank = input(Some("   "));
        assert_eq!(
            export_file_name(ChartKind::Natal, Some(&blank), date()),
            "natal_chart___2024-01-05.pdf"
        );
        let unnamed = input(Some(""));
        assert_eq!(
            export_file_name(ChartKind::Natal, Some(&unnamed), date()),
            "natal_chart_chart_2024-01-05.pdf"
        );
        assert_eq!(
            export_file_name(ChartKind::Natal, None, date()),
            "natal_chart_chart_2024-01-05.pdf"
        );
    }

    #[test]
    fn cover_page_lists_personal_and_birth_details() {
        let doc = ChartDocument {
            kind: ChartKind::Horary,
            input: Some(input(Some("Jane Doe"))),
            data: ChartResult::default(),
        };
        let report = assemble_report(&doc, None, &ReportConfig::default(), &ExportClock::fixed(date()));
        assert_eq!(report.page_count(), 1);
        let texts: Vec<&str> = report.pages[0].texts().collect();
        assert_eq!(texts[0], "HORARY CHART");
        assert!(texts.contains(&"PERSONAL INFORMATION"));
        assert!(texts.contains(&"Jane Doe"));
        assert!(texts.contains(&"Pune"));
        assert!(texts.contains(&"04/07/1990"));
        assert!(texts.contains(&"06:30:00"));
        assert!(texts.contains(&"18.5204°, 73.8567°"));
        assert!(texts.contains(&"Horary Number:"));
        assert!(texts.contains(&"108"));
        assert!(!texts.contains(&"CHART WHEELS"));
        assert_eq!(texts.last(), Some(&"Generated by Bobo Astrologer - 1/5/2024"));
    }

    #[test]
    fn natal_charts_omit_horary_number_and_missing_name_skips_section() {
        let doc = ChartDocument {
            kind: ChartKind::Natal,
            input: Some(input(None)),
            data: ChartResult::default(),
        };
        let report = assemble_report(&doc, None, &ReportConfig::default(), &ExportClock::fixed(date()));
        let texts: Vec<&str> = report.pages[0].texts().collect();
        assert!(!texts.contains(&"PERSONAL INFORMATION"));
        assert!(!texts.contains(&"Horary Number:"));
        assert!(texts.contains(&"BIRTH DETAILS"));
    }

    #[test]
    fn each_present_category_gets_its_own_page() {
        let data: ChartResult = serde_json::from_str(
            r#"{"planets_data": [{"name": "Sun", "sign": "Aries", "house": 1}],
                "houses_data": [{"house_number": 1, "sign": "Aries"}],
                "planetary_aspects": [],
                "house_significators": {"1": ["Sun"]}}"#,
        )
        .unwrap();
        let doc = ChartDocument {
            kind: ChartKind::Natal,
            input: None,
            data,
        };
        let report = assemble_report(&doc, None, &ReportConfig::default(), &ExportClock::fixed(date()));
        assert_eq!(report.page_count(), 4);
        assert_eq!(report.pages[1].texts().next(), Some("PLANETARY POSITIONS"));
        assert_eq!(report.pages[2].texts().next(), Some("HOUSE CUSPS"));
        assert_eq!(
            report.pages[3].texts().next(),
            Some("HOUSE SIGNIFICATORS (KP SYSTEM)")
        );
        let footer_pages = report
            .pages
            .iter()
            .filter(|page| page.texts().any(|t| t.starts_with("Generated by")))
            .count();
        assert_eq!(footer_pages, 1);
        assert!(report.pages[3].texts().any(|t| t.starts_with("Generated by")));
    }

    #[test]
    fn diagram_is_scaled_to_content_width() {
        let doc = ChartDocument::default();
        let image = RasterImage {
            width: 400,
            height: 200,
            rgb: vec![0; 400 * 200 * 3],
        };
        let report = assemble_report(&doc, Some(image), &ReportConfig::default(), &ExportClock::fixed(date()));
        assert!(report.pages[0].texts().any(|t| t == "CHART WHEELS"));
        let placed = report.pages.iter().flat_map(|p| &p.ops).find_map(|op| match op {
            DrawOp::Image { x, width, height, .. } => Some((*x, *width, *height)),
            _ => None,
        });
        assert_eq!(placed, Some((15.0, 180.0, 90.0)));
    }

    #[test]
    fn missing_region_degrades_without_failing() {
        let outcome = export_chart(
            &ChartDocument::default(),
            &NoHost,
            &SolidRasterizer,
            &ReportConfig::default(),
            &ExportClock::fixed(date()),
        );
        let ExportOutcome::Success {
            file_name,
            bytes,
            diagram_embedded,
        } = outcome
        else {
            panic!("export should succeed");
        };
        assert_eq!(file_name, "natal_chart_chart_2024-01-05.pdf");
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(!diagram_embedded);
    }

    #[test]
    fn located_region_is_sanitized_and_embedded() {
        let mut view = RenderedView::new();
        view.mount(r#"<svg><g id="chart-wheel-container"><rect fill="oklch(0.5 0 0)"/></g></svg>"#.to_string());
        let outcome = export_chart(
            &ChartDocument::default(),
            &view,
            &SolidRasterizer,
            &ReportConfig::default(),
            &ExportClock::fixed(date()),
        );
        assert!(matches!(
            outcome,
            ExportOutcome::Success {
                diagram_embedded: true,
                ..
            }
        ));
    }

    #[test]
    fn state_history_records_transitions() {
        let mut state = ExportState::new();
        state.transition(ExportPhase::Rendering);
        state.transition(ExportPhase::Writing { degraded: true });
        state.transition(ExportPhase::Finalized);
        assert_eq!(state.phase(), ExportPhase::Finalized);
        assert_eq!(state.history().len(), 4);
    }
}
