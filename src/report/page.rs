use crate::capture::RasterImage;
use crate::config::ReportConfig;
use crate::text_metrics::{FontStyle, text_width_mm};
use crate::theme::Rgb;

/// One drawing instruction. Coordinates are millimetres from the top-left
/// corner of the page; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgb,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        style: FontStyle,
        color: Rgb,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPage {
    pub ops: Vec<DrawOp>,
}

impl ReportPage {
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_image(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, DrawOp::Image { .. }))
    }
}

/// Finished page sequence plus the raster images the pages reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<ReportPage>,
    pub images: Vec<RasterImage>,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Report colours resolved from their configured hex strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgb,
    pub text_primary: Rgb,
    pub text_secondary: Rgb,
    pub accent_gold: Rgb,
    pub accent_purple: Rgb,
    pub surface_elevated: Rgb,
    pub border_subtle: Rgb,
}

impl Palette {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            background: Rgb::parse_or(&config.background, Rgb(10, 10, 10)),
            text_primary: Rgb::parse_or(&config.text_primary, Rgb::WHITE),
            text_secondary: Rgb::parse_or(&config.text_secondary, Rgb(184, 184, 184)),
            accent_gold: Rgb::parse_or(&config.accent_gold, Rgb(212, 175, 55)),
            accent_purple: Rgb::parse_or(&config.accent_purple, Rgb(139, 92, 246)),
            surface_elevated: Rgb::parse_or(&config.surface_elevated, Rgb(26, 26, 26)),
            border_subtle: Rgb::parse_or(&config.border_subtle, Rgb(51, 51, 51)),
        }
    }
}

/// Mutable pagination state for one export: the page under construction and
/// the vertical cursor on it.
#[derive(Debug)]
pub struct PageWriter<'a> {
    config: &'a ReportConfig,
    palette: Palette,
    doc: ReportDocument,
    cursor: f32,
}

impl<'a> PageWriter<'a> {
    /// Opens page 1 with its background already painted.
    pub fn new(config: &'a ReportConfig, title: &str) -> Self {
        let mut writer = Self {
            config,
            palette: Palette::from_config(config),
            doc: ReportDocument {
                title: title.to_string(),
                page_width: config.page_width,
                page_height: config.page_height,
                pages: Vec::new(),
                images: Vec::new(),
            },
            cursor: config.margin,
        };
        writer.new_page();
        writer
    }

    pub fn config(&self) -> &ReportConfig {
        self.config
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn advance(&mut self, delta: f32) {
        self.cursor += delta;
    }

    pub fn margin(&self) -> f32 {
        self.config.margin
    }

    pub fn content_width(&self) -> f32 {
        self.config.page_width - 2.0 * self.config.margin
    }

    pub fn page_count(&self) -> usize {
        self.doc.pages.len()
    }

    pub fn new_page(&mut self) {
        let mut page = ReportPage::default();
        page.push(DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            width: self.config.page_width,
            height: self.config.page_height,
            color: self.palette.background,
        });
        self.doc.pages.push(page);
        self.cursor = self.config.margin;
    }

    /// Starts a new page when `height` would run past the bottom margin.
    /// Returns whether a break happened.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if self.cursor + height > self.config.page_height - self.config.margin {
            self.new_page();
            return true;
        }
        false
    }

    pub fn page_mut(&mut self) -> &mut ReportPage {
        if self.doc.pages.is_empty() {
            self.new_page();
        }
        let last = self.doc.pages.len() - 1;
        &mut self.doc.pages[last]
    }

    pub fn text(&mut self, x: f32, y: f32, text: &str, size: f32, style: FontStyle, color: Rgb) {
        self.page_mut().push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            size,
            style,
            color,
        });
    }

    pub fn centered_text(&mut self, y: f32, text: &str, size: f32, style: FontStyle, color: Rgb) {
        let width = text_width_mm(text, size, style);
        let x = (self.config.page_width - width) / 2.0;
        self.text(x, y, text, size, style, color);
    }

    /// Full-width rule at the cursor, then moves past it.
    pub fn rule(&mut self) {
        let y = self.cursor;
        let (left, right) = (self.config.margin, self.config.page_width - self.config.margin);
        let op = DrawOp::Line {
            from: (left, y),
            to: (right, y),
            width: self.config.rule_width,
            color: self.palette.border_subtle,
        };
        self.page_mut().push(op);
        self.cursor += 5.0;
    }

    pub fn image(&mut self, image: RasterImage, x: f32, y: f32, width: f32, height: f32) {
        let index = self.doc.images.len();
        self.doc.images.push(image);
        self.page_mut().push(DrawOp::Image {
            x,
            y,
            width,
            height,
            image: index,
        });
    }

    pub fn finish(self) -> ReportDocument {
        self.doc
    }
}
