use crate::capture::ResvgRasterizer;
use crate::config::{Config, load_config};
use crate::ir::ChartDocument;
use crate::layout::compute_layout;
use crate::layout_dump::{layout_dump_json, write_layout_dump};
use crate::render::{RenderedView, render_svg, render_text_grid, write_output_png, write_output_svg};
use crate::report::{ExportClock, ExportOutcome, export_chart};
use crate::tables::{TableMode, chart_tables, render_text_table};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "bchart", version, about = "Vedic birth-chart diagrams and PDF reports")]
pub struct Args {
    /// Chart JSON file ({"type", "input", "data"}) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. SVG, text and JSON default to stdout; PDF defaults to the
    /// suggested export file name.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Export date used for the PDF file name and footer (YYYY-MM-DD)
    #[arg(long = "date", value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
    Text,
    Json,
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| format!("{err} (expected YYYY-MM-DD)"))
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let doc = parse_chart_document(&input)?;
    log::debug!(
        "loaded {} chart: {} planet(s), {} house(s)",
        doc.kind.slug(),
        doc.data.planets().len(),
        doc.data.houses().len()
    );

    let layout = compute_layout(&doc.data, &config.layout);
    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.layout);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &config.theme, &config.layout);
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &layout)?,
            None => println!("{}", layout_dump_json(&layout)?),
        },
        OutputFormat::Text => {
            let text = render_text(&doc, &config);
            write_output_text(&text, args.output.as_deref())?;
        }
        OutputFormat::Pdf => {
            let clock = args.date.map(ExportClock::fixed).unwrap_or_else(ExportClock::now);
            export_pdf(&doc, &config, &clock, args.output.as_deref())?;
        }
    }

    Ok(())
}

/// Screen rendering: both diagrams as text grids followed by every table.
pub fn render_text(doc: &ChartDocument, config: &Config) -> String {
    let layout = compute_layout(&doc.data, &config.layout);
    let mut sections: Vec<String> = layout.diagrams().iter().map(|d| render_text_grid(d)).collect();
    sections.extend(
        chart_tables(&doc.data, TableMode::Screen)
            .iter()
            .map(render_text_table),
    );
    sections.join("\n")
}

fn export_pdf(doc: &ChartDocument, config: &Config, clock: &ExportClock, output: Option<&Path>) -> Result<()> {
    let layout = compute_layout(&doc.data, &config.layout);
    let mut view = RenderedView::new();
    view.mount(render_svg(&layout, &config.theme, &config.layout));
    let rasterizer = ResvgRasterizer::new(&config.theme.font_family);

    match export_chart(doc, &view, &rasterizer, &config.report, clock) {
        ExportOutcome::Success {
            file_name,
            bytes,
            diagram_embedded,
        } => {
            let path = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(&file_name));
            std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
            if !diagram_embedded {
                log::warn!("report written without the chart diagram");
            }
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        ExportOutcome::Failure { error } => Err(anyhow::anyhow!("PDF export failed: {error}")),
    }
}

fn parse_chart_document(input: &str) -> Result<ChartDocument> {
    serde_json::from_str(input).context("invalid chart document")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::parse_from([
            "bchart", "-i", "chart.json", "-e", "pdf", "--date", "2024-01-05",
        ]);
        assert_eq!(args.output_format, OutputFormat::Pdf);
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert!(Args::try_parse_from(["bchart", "--date", "05/01/2024"]).is_err());
    }

    #[test]
    fn text_output_shows_grids_and_screen_tables() {
        let doc = parse_chart_document(
            r#"{"type": "natal", "data": {
                "planets_data": [{"name": "Venus", "sign": "Taurus", "house": 2, "retrograde": true}],
                "houses_data": [{"house_number": 2, "sign": "Taurus"}]}}"#,
        )
        .unwrap();
        let text = render_text(&doc, &Config::default());
        assert!(text.contains("North Indian Style"));
        assert!(text.contains("South Indian Style"));
        assert!(text.contains("Planetary Positions"));
        assert!(text.contains("Retrograde"));
        assert!(text.contains("Ve\u{211B}"));
    }

    #[test]
    fn missing_png_output_is_an_error() {
        assert!(ensure_output(&None, "png").is_err());
    }
}
