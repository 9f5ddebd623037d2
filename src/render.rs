use crate::config::{DiagramConfig, RenderConfig};
use crate::layout::{ChartLayout, DiagramLayout, DiagramStyle, RegionLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Element id of the group holding both chart diagrams. Export locates the
/// region to capture by this marker.
pub const CHART_REGION_MARKER: &str = "chart-wheel-container";

pub fn render_svg(layout: &ChartLayout, theme: &Theme, config: &DiagramConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str(&format!("<g id=\"{CHART_REGION_MARKER}\">"));
    for diagram in layout.diagrams() {
        svg.push_str(&diagram_svg(diagram, theme, config));
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

fn diagram_svg(diagram: &DiagramLayout, theme: &Theme, config: &DiagramConfig) -> String {
    let mut svg = String::new();
    let style_class = match diagram.style {
        DiagramStyle::NorthIndian => "north-indian",
        DiagramStyle::SouthIndian => "south-indian",
    };
    svg.push_str(&format!("<g class=\"chart {style_class}\">"));

    if config.show_titles {
        let title_x = diagram.x + diagram.size / 2.0;
        let title_y = diagram.y - config.title_height / 2.0 + theme.font_size * 0.35;
        svg.push_str(&format!(
            "<text x=\"{title_x:.2}\" y=\"{title_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            theme.font_family,
            theme.font_size * 1.15,
            theme.title_color,
            escape_xml(diagram.style.title())
        ));
    }

    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        diagram.x,
        diagram.y,
        diagram.size,
        diagram.size,
        theme.chart_fill,
        theme.line_color,
        config.frame_stroke_width
    ));

    for region in &diagram.regions {
        svg.push_str(&format!(
            "<polygon data-region=\"{}\" points=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
            region.key,
            points_attr(&region.outline),
            theme.chart_fill,
            theme.line_color
        ));
    }
    for region in &diagram.regions {
        svg.push_str(&region_label_svg(region, theme, config));
    }

    svg.push_str("</g>");
    svg
}

fn points_attr(points: &[(f32, f32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stacked lines centred on the region anchor: house number, sign, then one
/// line per planet.
fn region_label_svg(region: &RegionLayout, theme: &Theme, config: &DiagramConfig) -> String {
    let small = theme.font_size * 0.75;
    let mut lines: Vec<(&str, &str, f32)> = Vec::new();
    if let Some(heading) = region.heading.as_deref() {
        lines.push((heading, theme.house_number_color.as_str(), small));
    }
    if !region.label.is_empty() {
        lines.push((region.label.as_str(), theme.sign_color.as_str(), small));
    }
    for planet in &region.planets {
        lines.push((planet.as_str(), theme.planet_color.as_str(), theme.font_size));
    }
    if lines.is_empty() {
        return String::new();
    }

    let line_height = theme.font_size * config.label_line_height;
    let total_height = lines.len() as f32 * line_height;
    let (x, y) = region.anchor;
    let start_y = y - total_height / 2.0 + theme.font_size;

    let mut text = format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\">",
        theme.font_family, theme.font_size
    );
    for (idx, (line, fill, size)) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\" font-size=\"{size}\" fill=\"{fill}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

/// Monospace rendering of one diagram on its 4x4 lattice. Unused lattice
/// cells stay blank.
pub fn render_text_grid(diagram: &DiagramLayout) -> String {
    const GRID: usize = 4;
    let mut cells: BTreeMap<(usize, usize), [String; 2]> = BTreeMap::new();
    for region in &diagram.regions {
        let head = match region.heading.as_deref() {
            Some(heading) if region.label.is_empty() => heading.to_string(),
            Some(heading) => format!("{heading} {}", region.label),
            None => region.label.clone(),
        };
        cells.insert((region.row, region.col), [head, region.planets.join(" ")]);
    }

    let width = cells
        .values()
        .flat_map(|lines| lines.iter().map(|line| line.chars().count()))
        .max()
        .unwrap_or(0)
        .max(8);
    let border = format!("+{}", format!("{}+", "-".repeat(width + 2)).repeat(GRID));

    let mut out = String::new();
    out.push_str(diagram.style.title());
    out.push('\n');
    out.push_str(&border);
    out.push('\n');
    for row in 0..GRID {
        for line in 0..2 {
            out.push('|');
            for col in 0..GRID {
                let text = cells
                    .get(&(row, col))
                    .map(|lines| lines[line].as_str())
                    .unwrap_or("");
                let pad = width - text.chars().count();
                out.push(' ');
                out.push_str(text);
                out.push_str(&" ".repeat(pad + 1));
                out.push('|');
            }
            out.push('\n');
        }
        out.push_str(&border);
        out.push('\n');
    }
    out
}

/// Rendered diagram documents addressable by element id, standing in for the
/// view layer that mounts the chart before export.
#[derive(Debug, Clone, Default)]
pub struct RenderedView {
    documents: Vec<String>,
}

impl RenderedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, svg: String) {
        self.documents.push(svg);
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Markup of the element whose id is `marker`, taken from the most recently
    /// mounted document that has one. The element is wrapped in that document's
    /// root `<svg>` tag so size and viewBox carry over; siblings such as the
    /// page background are left out.
    pub fn locate(&self, marker: &str) -> Option<String> {
        self.documents
            .iter()
            .rev()
            .find_map(|doc| extract_region(doc, marker))
    }
}

fn extract_region(doc: &str, marker: &str) -> Option<String> {
    let id_at = doc.find(&format!("id=\"{marker}\""))?;
    let start = doc[..id_at].rfind('<')?;
    let name_end = doc[start + 1..]
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')?
        + start
        + 1;
    let tag = &doc[start + 1..name_end];
    let open_end = doc[start..].find('>')? + start;
    let end = if doc[..open_end].ends_with('/') {
        open_end + 1
    } else {
        closing_tag_end(doc, open_end + 1, tag)?
    };

    let root_start = doc.find("<svg")?;
    if root_start == start {
        return Some(doc[start..end].to_string());
    }
    let root_end = doc[root_start..].find('>')? + root_start + 1;
    Some(format!("{}{}</svg>", &doc[root_start..root_end], &doc[start..end]))
}

/// Byte offset just past the `</tag>` closing the element opened before `from`.
fn closing_tag_end(doc: &str, from: usize, tag: &str) -> Option<usize> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut depth = 1usize;
    let mut pos = from;
    while depth > 0 {
        let next_close = doc[pos..].find(&close)? + pos;
        match doc[pos..next_close].find(&open).map(|idx| idx + pos) {
            Some(open_at) => {
                let tag_end = doc[open_at..].find('>')? + open_at;
                let boundary = doc[open_at + open.len()..].chars().next();
                let same_name =
                    matches!(boundary, Some(c) if c.is_whitespace() || c == '>' || c == '/');
                if same_name && !doc[..tag_end].ends_with('/') {
                    depth += 1;
                }
                pos = tag_end + 1;
            }
            None => {
                depth -= 1;
                pos = next_close + close.len();
            }
        }
    }
    Some(pos)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme.font_family.split(',').next().unwrap_or("Helvetica").trim().to_string();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("invalid default render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = if render_cfg.scale > 0.0 { render_cfg.scale } else { 1.0 };
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    let background = crate::theme::Rgb::parse_or(&render_cfg.background, crate::theme::Rgb::WHITE);
    pixmap.fill(resvg::tiny_skia::Color::from_rgba8(background.0, background.1, background.2, 255));

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::from_scale(scale, scale), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
