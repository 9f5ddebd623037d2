//! Diagram capture: colour sanitation and rasterization of rendered markup.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::theme::Rgb;

pub const TEXT_FILL_FALLBACK: &str = "#ffffff";
pub const FILL_FALLBACK: &str = "#1f2937";
pub const STROKE_FALLBACK: &str = "#333333";

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z][\w:-]*)(\s[^>]*)>").unwrap());
static COLOR_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\s)(stop-color|fill|stroke|color)(\s*=\s*)"([^"]*)""#).unwrap()
});
static STYLE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\sstyle\s*=\s*)"([^"]*)""#).unwrap());
static UNSUPPORTED_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(oklch|oklab|lch|lab|color)\(").unwrap());

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("diagram region '{0}' is not mounted")]
    RegionNotFound(String),
    #[error("failed to parse diagram markup: {0}")]
    Parse(String),
    #[error("failed to allocate a {width}x{height} raster")]
    Allocation { width: u32, height: u32 },
    #[error("diagram rasterization is not available in this build")]
    Unsupported,
}

/// Opaque RGB pixels, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 {
            return 1.0;
        }
        self.height as f32 / self.width as f32
    }
}

pub trait Rasterizer {
    fn rasterize(&self, svg: &str, scale: f32, background: Rgb) -> Result<RasterImage, CaptureError>;
}

pub fn is_unsupported_color(value: &str) -> bool {
    UNSUPPORTED_COLOR_RE.is_match(value)
}

fn fallback_for(property: &str, in_text: bool) -> &'static str {
    match property {
        "stroke" => STROKE_FALLBACK,
        "color" => TEXT_FILL_FALLBACK,
        "fill" if in_text => TEXT_FILL_FALLBACK,
        _ => FILL_FALLBACK,
    }
}

/// Replaces colour values the rasterizer cannot read with fixed fallbacks.
/// Only `fill`, `stroke`, `color` and `stop-color` are inspected, both as
/// attributes and inside inline `style` declarations.
pub fn sanitize_for_capture(svg: &str) -> String {
    TAG_RE
        .replace_all(svg, |caps: &Captures| {
            let name = &caps[1];
            let in_text = matches!(name, "text" | "tspan" | "textPath");
            let attrs = sanitize_attributes(&caps[2], in_text);
            format!("<{name}{attrs}>")
        })
        .into_owned()
}

fn sanitize_attributes(attrs: &str, in_text: bool) -> String {
    let attrs = COLOR_ATTR_RE.replace_all(attrs, |caps: &Captures| {
        let value = &caps[4];
        if is_unsupported_color(value) {
            format!("{}{}{}\"{}\"", &caps[1], &caps[2], &caps[3], fallback_for(&caps[2], in_text))
        } else {
            caps[0].to_string()
        }
    });
    STYLE_ATTR_RE
        .replace_all(&attrs, |caps: &Captures| {
            format!("{}\"{}\"", &caps[1], sanitize_style(&caps[2], in_text))
        })
        .into_owned()
}

fn sanitize_style(style: &str, in_text: bool) -> String {
    style
        .split(';')
        .map(|decl| {
            let Some((prop, value)) = decl.split_once(':') else {
                return decl.to_string();
            };
            let property = prop.trim().to_ascii_lowercase();
            let known = matches!(property.as_str(), "fill" | "stroke" | "color" | "stop-color");
            if known && is_unsupported_color(value) {
                format!("{prop}:{}", fallback_for(&property, in_text))
            } else {
                decl.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// resvg-backed rasterizer. System fonts are loaded once per instance.
#[cfg(feature = "png")]
pub struct ResvgRasterizer {
    options: usvg::Options<'static>,
}

#[cfg(feature = "png")]
impl ResvgRasterizer {
    pub fn new(font_family: &str) -> Self {
        let mut options = usvg::Options::default();
        options.font_family = font_family.to_string();
        options.fontdb_mut().load_system_fonts();
        Self { options }
    }
}

#[cfg(feature = "png")]
impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new("Helvetica")
    }
}

#[cfg(feature = "png")]
impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, scale: f32, background: Rgb) -> Result<RasterImage, CaptureError> {
        let tree = usvg::Tree::from_str(svg, &self.options)
            .map_err(|err| CaptureError::Parse(err.to_string()))?;
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let width = (tree.size().width() * scale).ceil().max(1.0) as u32;
        let height = (tree.size().height() * scale).ceil().max(1.0) as u32;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or(CaptureError::Allocation { width, height })?;
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(
            background.0,
            background.1,
            background.2,
            255,
        ));
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        // The background is opaque, so premultiplied and straight RGB agree.
        let rgb = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        log::debug!("rasterized diagram at {width}x{height} (scale {scale})");
        Ok(RasterImage { width, height, rgb })
    }
}

/// Stand-in for builds without the `png` feature; every capture fails and the
/// report is written without the diagram.
#[cfg(not(feature = "png"))]
#[derive(Debug, Default)]
pub struct ResvgRasterizer;

#[cfg(not(feature = "png"))]
impl ResvgRasterizer {
    pub fn new(_font_family: &str) -> Self {
        Self
    }
}

#[cfg(not(feature = "png"))]
impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, _svg: &str, _scale: f32, _background: Rgb) -> Result<RasterImage, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}
