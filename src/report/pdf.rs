use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::text_metrics::{FontStyle, POINTS_PER_MM, to_winansi};
use crate::theme::Rgb;

use super::ReportError;
use super::page::{DrawOp, ReportDocument};

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

/// Serializes a finished report. Text uses the standard Helvetica faces with
/// WinAnsi encoding; content streams and images are Flate-compressed.
pub fn write_pdf(doc: &ReportDocument) -> Result<Vec<u8>, ReportError> {
    if doc.pages.is_empty() {
        return Err(ReportError::EmptyDocument);
    }
    for (index, image) in doc.images.iter().enumerate() {
        let expected = image.width as usize * image.height as usize * 3;
        if image.width == 0 || image.height == 0 || image.rgb.len() != expected {
            return Err(ReportError::InvalidImage {
                index,
                expected,
                actual: image.rgb.len(),
            });
        }
    }

    let mut next_id = 1;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();
    let font_ids: Vec<(FontStyle, Ref)> = FontStyle::ALL.iter().map(|style| (*style, alloc())).collect();
    let image_ids: Vec<Ref> = doc.images.iter().map(|_| alloc()).collect();
    let page_ids: Vec<Ref> = doc.pages.iter().map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = doc.pages.iter().map(|_| alloc()).collect();

    let mut pdf = Pdf::new();
    pdf.document_info(info_id)
        .title(TextStr(&doc.title))
        .producer(TextStr(concat!("birthchart-renderer ", env!("CARGO_PKG_VERSION"))));

    for (style, font_id) in &font_ids {
        pdf.type1_font(*font_id)
            .base_font(Name(style.base_font().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (image, image_id) in doc.images.iter().zip(&image_ids) {
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&image.rgb, 6);
        let mut xobj = pdf.image_xobject(*image_id, &compressed);
        xobj.filter(Filter::FlateDecode);
        xobj.width(image.width as i32);
        xobj.height(image.height as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
    }

    for (page_idx, page) in doc.pages.iter().enumerate() {
        let mut content = Content::new();
        for op in &page.ops {
            if let DrawOp::Image { image, .. } = op {
                if *image >= doc.images.len() {
                    return Err(ReportError::MissingImage {
                        page: page_idx,
                        image: *image,
                    });
                }
            }
            draw_op(&mut content, op, doc.page_height);
        }
        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[page_idx], &compressed)
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    let width_pt = doc.page_width * POINTS_PER_MM;
    let height_pt = doc.page_height * POINTS_PER_MM;
    for (page_idx, page_id) in page_ids.iter().enumerate() {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, width_pt, height_pt))
            .parent(pages_id)
            .contents(content_ids[page_idx]);
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            for (style, font_id) in &font_ids {
                fonts.pair(Name(style.resource_name().as_bytes()), *font_id);
            }
        }
        if !image_ids.is_empty() {
            let mut xobjects = resources.x_objects();
            for (index, image_id) in image_ids.iter().enumerate() {
                let name = image_name(index);
                xobjects.pair(Name(name.as_bytes()), *image_id);
            }
        }
    }

    let bytes = pdf.finish();
    log::debug!(
        "wrote report: {} page(s), {} image(s), {} bytes",
        doc.pages.len(),
        doc.images.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn set_fill(content: &mut Content, color: Rgb) {
    let (r, g, b) = color.to_unit();
    content.set_fill_rgb(r, g, b);
}

/// Page coordinates run top-down in millimetres; PDF user space runs
/// bottom-up in points.
fn draw_op(content: &mut Content, op: &DrawOp, page_height: f32) {
    let k = POINTS_PER_MM;
    let flip = |y: f32| (page_height - y) * k;
    match op {
        DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => {
            content.save_state();
            set_fill(content, *color);
            content.rect(x * k, flip(y + height), width * k, height * k);
            content.fill_nonzero();
            content.restore_state();
        }
        DrawOp::Line {
            from,
            to,
            width,
            color,
        } => {
            let (r, g, b) = color.to_unit();
            content.save_state();
            content.set_line_width(width * k);
            content.set_stroke_rgb(r, g, b);
            content.move_to(from.0 * k, flip(from.1));
            content.line_to(to.0 * k, flip(to.1));
            content.stroke();
            content.restore_state();
        }
        DrawOp::Text {
            x,
            y,
            text,
            size,
            style,
            color,
        } => {
            let bytes = to_winansi(text);
            content.save_state();
            set_fill(content, *color);
            content
                .begin_text()
                .set_font(Name(style.resource_name().as_bytes()), *size)
                .next_line(x * k, flip(*y))
                .show(Str(&bytes))
                .end_text();
            content.restore_state();
        }
        DrawOp::Image {
            x,
            y,
            width,
            height,
            image,
        } => {
            let name = image_name(*image);
            content.save_state();
            content.transform([width * k, 0.0, 0.0, height * k, x * k, flip(y + height)]);
            content.x_object(Name(name.as_bytes()));
            content.restore_state();
        }
    }
}
