use crate::config::ReportConfig;
use crate::text_metrics::{FontStyle, fit_to_width};
use crate::theme::Rgb;

use super::page::{DrawOp, Palette, ReportPage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub row_height: f32,
    pub font_size: f32,
    pub cell_padding: f32,
    pub rule_width: f32,
    pub header_fill: Rgb,
    pub header_text: Rgb,
    pub body_text: Rgb,
    pub alternate_fill: Rgb,
    pub rule_color: Rgb,
}

impl TableStyle {
    pub fn from_config(config: &ReportConfig, palette: &Palette) -> Self {
        Self {
            row_height: config.table_row_height,
            font_size: config.table_font_size,
            cell_padding: config.table_cell_padding,
            rule_width: config.table_rule_width,
            header_fill: palette.accent_purple,
            header_text: palette.text_primary,
            body_text: palette.text_secondary,
            alternate_fill: palette.surface_elevated,
            rule_color: palette.border_subtle,
        }
    }
}

impl Default for TableStyle {
    fn default() -> Self {
        let config = ReportConfig::default();
        Self::from_config(&config, &Palette::from_config(&config))
    }
}

/// Draws a header row and `rows` below it at `(x, y)` with equal-width
/// columns. Cell text keeps only the first line that fits the column; rows
/// never grow. Returns the height used.
pub fn draw_table(
    page: &mut ReportPage,
    headers: &[String],
    rows: &[Vec<String>],
    x: f32,
    y: f32,
    width: f32,
    style: &TableStyle,
) -> f32 {
    let columns = headers.len().max(1);
    let column_width = width / columns as f32;
    let row_height = style.row_height;
    let text_width = (column_width - 2.0 * style.cell_padding).max(0.0);
    // Baseline sits 5/7 of the way down the row.
    let baseline = row_height * 5.0 / 7.0;

    page.push(DrawOp::FillRect {
        x,
        y,
        width,
        height: row_height,
        color: style.header_fill,
    });
    for (idx, header) in headers.iter().enumerate() {
        page.push(DrawOp::Text {
            x: x + idx as f32 * column_width + style.cell_padding,
            y: y + baseline,
            text: fit_to_width(header, text_width, style.font_size, FontStyle::Bold),
            size: style.font_size,
            style: FontStyle::Bold,
            color: style.header_text,
        });
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let row_y = y + (row_idx + 1) as f32 * row_height;
        if row_idx % 2 == 0 {
            page.push(DrawOp::FillRect {
                x,
                y: row_y,
                width,
                height: row_height,
                color: style.alternate_fill,
            });
        }
        for (col_idx, cell) in row.iter().enumerate().take(columns) {
            let text = fit_to_width(cell, text_width, style.font_size, FontStyle::Regular);
            if text.is_empty() {
                continue;
            }
            page.push(DrawOp::Text {
                x: x + col_idx as f32 * column_width + style.cell_padding,
                y: row_y + baseline,
                text,
                size: style.font_size,
                style: FontStyle::Regular,
                color: style.body_text,
            });
        }
    }

    let height = (rows.len() + 1) as f32 * row_height;
    for idx in 0..=rows.len() + 1 {
        let line_y = y + idx as f32 * row_height;
        page.push(DrawOp::Line {
            from: (x, line_y),
            to: (x + width, line_y),
            width: style.rule_width,
            color: style.rule_color,
        });
    }
    for idx in 0..=columns {
        let line_x = x + idx as f32 * column_width;
        page.push(DrawOp::Line {
            from: (line_x, y),
            to: (line_x, y + height),
            width: style.rule_width,
            color: style.rule_color,
        });
    }

    height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn rule_counts(page: &ReportPage) -> (usize, usize) {
        let mut horizontal = 0;
        let mut vertical = 0;
        for op in &page.ops {
            if let DrawOp::Line { from, to, .. } = op {
                if from.1 == to.1 {
                    horizontal += 1;
                } else if from.0 == to.0 {
                    vertical += 1;
                }
            }
        }
        (horizontal, vertical)
    }

    #[test]
    fn grid_has_one_rule_per_boundary() {
        let mut page = ReportPage::default();
        let headers = strings(&["Planet", "Start Date", "End Date", "Duration (Years)"]);
        let rows: Vec<Vec<String>> = (0..5)
            .map(|i| strings(&["Ketu", "2001-01-01", "2008-01-01", &i.to_string()]))
            .collect();
        let height = draw_table(&mut page, &headers, &rows, 15.0, 25.0, 180.0, &TableStyle::default());
        assert_eq!(height, 42.0);
        let (horizontal, vertical) = rule_counts(&page);
        assert_eq!(vertical, 4 + 1);
        assert_eq!(horizontal, 5 + 2);
    }

    #[test]
    fn only_even_rows_are_shaded() {
        let mut page = ReportPage::default();
        let style = TableStyle::default();
        let rows: Vec<Vec<String>> = (0..4).map(|_| strings(&["a", "b"])).collect();
        draw_table(&mut page, &strings(&["A", "B"]), &rows, 0.0, 0.0, 100.0, &style);
        let shaded: Vec<f32> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { y, color, .. } if *color == style.alternate_fill => Some(*y),
                _ => None,
            })
            .collect();
        assert_eq!(shaded, vec![7.0, 21.0]);
    }

    #[test]
    fn columns_are_equal_width_and_text_is_padded() {
        let mut page = ReportPage::default();
        draw_table(
            &mut page,
            &strings(&["Planet", "Signifies Houses"]),
            &[strings(&["Sun", "1, 5, 9"])],
            15.0,
            40.0,
            180.0,
            &TableStyle::default(),
        );
        let positions: Vec<(f32, f32, &str)> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(positions[0], (17.0, 45.0, "Planet"));
        assert_eq!(positions[1], (107.0, 45.0, "Signifies Houses"));
        assert_eq!(positions[3], (107.0, 52.0, "1, 5, 9"));
    }

    #[test]
    fn overlong_cells_are_cut_to_one_line() {
        let mut page = ReportPage::default();
        let long = "Sun, Moon, Mars, Mercury, Jupiter, Venus, Saturn, Rahu, Ketu";
        draw_table(
            &mut page,
            &strings(&["House", "Significator Planets", "x", "y", "z", "w", "v", "u"]),
            &[strings(&["House 1", long])],
            0.0,
            0.0,
            180.0,
            &TableStyle::default(),
        );
        let cell = page.texts().find(|t| t.starts_with("Sun")).unwrap();
        assert!(cell.len() < long.len());
    }
}
