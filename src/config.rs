use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry of the two chart diagrams (all values in SVG user units).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramConfig {
    pub size: f32,
    pub gap: f32,
    pub padding: f32,
    pub title_height: f32,
    pub label_line_height: f32,
    pub show_titles: bool,
    pub frame_stroke_width: f32,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            size: 480.0,
            gap: 48.0,
            padding: 24.0,
            title_height: 36.0,
            label_line_height: 1.25,
            show_titles: true,
            frame_stroke_width: 2.0,
        }
    }
}

/// Page layout and palette for the exported report. Lengths are millimetres,
/// font sizes are points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub background: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub accent_gold: String,
    pub accent_purple: String,
    pub surface_elevated: String,
    pub border_subtle: String,
    pub title_size: f32,
    pub section_size: f32,
    pub personal_size: f32,
    pub detail_size: f32,
    pub footer_size: f32,
    pub rule_width: f32,
    pub table_font_size: f32,
    pub table_row_height: f32,
    pub table_cell_padding: f32,
    pub table_rule_width: f32,
    pub capture_scale: f32,
    pub capture_background: String,
    pub footer_brand: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 15.0,
            background: "#0A0A0A".to_string(),
            text_primary: "#FFFFFF".to_string(),
            text_secondary: "#B8B8B8".to_string(),
            accent_gold: "#D4AF37".to_string(),
            accent_purple: "#8B5CF6".to_string(),
            surface_elevated: "#1A1A1A".to_string(),
            border_subtle: "#333333".to_string(),
            title_size: 32.0,
            section_size: 16.0,
            personal_size: 11.0,
            detail_size: 10.0,
            footer_size: 8.0,
            rule_width: 0.5,
            table_font_size: 8.0,
            table_row_height: 7.0,
            table_cell_padding: 2.0,
            table_rule_width: 0.3,
            capture_scale: 2.0,
            capture_background: "#0a0a0a".to_string(),
            footer_brand: "Bobo Astrologer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            scale: 1.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: DiagramConfig,
    pub render: RenderConfig,
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: DiagramConfig::default(),
            render,
            report: ReportConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    background: Option<String>,
    chart_fill: Option<String>,
    line_color: Option<String>,
    title_color: Option<String>,
    house_number_color: Option<String>,
    sign_color: Option<String>,
    planet_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    diagram: Option<DiagramConfig>,
    report: Option<ReportConfig>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document. Strict JSON first, then JSON5 so hand-written
/// files may carry comments and trailing commas.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|json5_err| {
            anyhow::anyhow!("invalid config: {json_err} (json5: {json5_err})")
        })?,
    };

    let mut config = Config::default();
    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => log::warn!("unknown theme '{theme_name}', keeping the default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.as_ref().and_then(NumberOrString::as_f32) {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.chart_fill {
            config.theme.chart_fill = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.title_color {
            config.theme.title_color = v;
        }
        if let Some(v) = vars.house_number_color {
            config.theme.house_number_color = v;
        }
        if let Some(v) = vars.sign_color {
            config.theme.sign_color = v;
        }
        if let Some(v) = vars.planet_color {
            config.theme.planet_color = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(diagram) = parsed.diagram {
        config.layout = diagram;
    }
    if let Some(report) = parsed.report {
        config.report = report;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_sections_keep_defaults() {
        let config = parse_config(
            r##"{"theme": "midnight", "themeVariables": {"fontSize": "18px", "signColor": "#ff0000"},
                 "diagram": {"size": 300}, "report": {"margin": 20}}"##,
        )
        .unwrap();
        assert_eq!(config.theme.background, "#0A0A0A");
        assert_eq!(config.theme.font_size, 18.0);
        assert_eq!(config.theme.sign_color, "#ff0000");
        assert_eq!(config.layout.size, 300.0);
        assert_eq!(config.layout.gap, DiagramConfig::default().gap);
        assert_eq!(config.report.margin, 20.0);
        assert_eq!(config.report.table_row_height, 7.0);
        assert_eq!(config.render.background, "#0A0A0A");
    }

    #[test]
    fn accepts_json5_documents() {
        let config = parse_config(
            "{\n  // hand edited\n  theme: 'classic',\n  diagram: { gap: 10, },\n}",
        )
        .unwrap();
        assert_eq!(config.layout.gap, 10.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_config("not a config").is_err());
    }
}
