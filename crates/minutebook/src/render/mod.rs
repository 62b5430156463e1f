//! Painting laid-out documents.
//!
//! A [`Surface`] is the low-level drawing primitive: single-line text,
//! rectangles, lines and raster images at page coordinates. [`paint`] walks
//! a [`LaidOutDocument`] and drives a surface, expanding table fragments
//! into fills, strokes and text runs on the way. [`PdfSurface`] is the
//! production surface.

pub mod image;
pub mod pdf;

use tracing::{debug, warn};

use crate::config::DocumentConfig;
use crate::error::Result;
use crate::layout::metrics::PT_TO_MM;
use crate::layout::{compose, Align, DrawCommand, DrawTable, FontStyle, LaidOutDocument, LayoutOptions, RectStyle, Rgb};
use crate::record::MinutesRecord;

pub use pdf::PdfSurface;

/// Baseline offset of a cell's first line below the padding, as a share of the font size.
const CELL_ASCENT: f32 = 0.85;

/// A target that can paint the primitives the layout produces.
///
/// Coordinates are millimetres from the top-left of an A4 page; text `y`
/// is the baseline.
pub trait Surface {
    /// Start a new page. Subsequent calls paint on it.
    fn begin_page(&mut self);

    /// Colour for rectangle fills.
    fn set_fill_color(&mut self, color: Rgb);

    /// Colour for text.
    fn set_text_color(&mut self, color: Rgb);

    /// Colour for lines and outlines.
    fn set_draw_color(&mut self, color: Rgb);

    /// Font weight and size in points.
    fn set_font(&mut self, style: FontStyle, size: f32);

    /// Whether [`Surface::set_opacity`] has any effect.
    fn supports_opacity(&self) -> bool;

    /// Opacity for subsequent painting.
    fn set_opacity(&mut self, opacity: f32);

    /// A single line of text.
    fn text(&mut self, x: f32, y: f32, text: &str, align: Align);

    /// An axis-aligned rectangle.
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, style: RectStyle);

    /// A straight line.
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);

    /// A raster image scaled into the box.
    ///
    /// # Errors
    ///
    /// Returns an error when the image cannot be decoded or embedded.
    fn image(&mut self, data: &[u8], x: f32, y: f32, w: f32, h: f32) -> Result<()>;
}

/// Paint every page of `document` onto `surface`.
///
/// Images that fail to embed are logged and skipped; the rest of the page
/// is still painted.
pub fn paint<S: Surface + ?Sized>(document: &LaidOutDocument, surface: &mut S) {
    for page in &document.pages {
        surface.begin_page();
        for command in &page.commands {
            paint_command(command, surface, page.number);
        }
    }
}

fn paint_command<S: Surface + ?Sized>(command: &DrawCommand, surface: &mut S, page: usize) {
    match command {
        DrawCommand::SetFillColor(color) => surface.set_fill_color(*color),
        DrawCommand::SetTextColor(color) => surface.set_text_color(*color),
        DrawCommand::SetDrawColor(color) => surface.set_draw_color(*color),
        DrawCommand::SetFont { style, size } => surface.set_font(*style, *size),
        DrawCommand::SetOpacity(opacity) => surface.set_opacity(*opacity),
        DrawCommand::Text { x, y, text, align } => surface.text(*x, *y, text, *align),
        DrawCommand::TextBlock {
            x,
            y,
            lines,
            line_height,
        } => {
            for (i, line) in lines.iter().enumerate() {
                surface.text(*x, y + i as f32 * line_height, line, Align::Left);
            }
        }
        DrawCommand::Rect { x, y, w, h, style } => surface.rect(*x, *y, *w, *h, *style),
        DrawCommand::Line { x1, y1, x2, y2 } => surface.line(*x1, *y1, *x2, *y2),
        DrawCommand::Image { data, x, y, w, h } => {
            if let Err(e) = surface.image(data, *x, *y, *w, *h) {
                warn!(page, error = %e, "Skipping image that could not be embedded");
            }
        }
        DrawCommand::Table(table) => paint_table(table, surface),
    }
}

fn paint_table<S: Surface + ?Sized>(table: &DrawTable, surface: &mut S) {
    let ascent = table.font_size * PT_TO_MM * CELL_ASCENT;

    if let Some(header) = &table.header {
        surface.set_fill_color(table.header_fill);
        surface.rect(table.x, header.y, table.width(), header.height, RectStyle::Fill);
        surface.set_font(FontStyle::Bold, table.font_size);
        surface.set_text_color(table.header_text);
        let mut x = table.x;
        for (column, lines) in table.columns.iter().zip(&header.cells) {
            paint_cell_text(surface, table, x, column.width, column.align, header.y + ascent, lines);
            x += column.width;
        }
        if let Some(grid) = table.grid {
            stroke_row(surface, table, grid, header.y, header.height);
        }
    }

    for row in &table.rows {
        let mut x = table.x;
        for column in &table.columns {
            if let Some(fill) = column.fill.or(row.fill) {
                surface.set_fill_color(fill);
                surface.rect(x, row.y, column.width, row.height, RectStyle::Fill);
            }
            x += column.width;
        }

        surface.set_text_color(table.body_text);
        let mut x = table.x;
        for (column, lines) in table.columns.iter().zip(&row.cells) {
            surface.set_font(column.style, table.font_size);
            paint_cell_text(surface, table, x, column.width, column.align, row.y + ascent, lines);
            x += column.width;
        }

        if let Some(grid) = table.grid {
            stroke_row(surface, table, grid, row.y, row.height);
        }
    }
}

fn paint_cell_text<S: Surface + ?Sized>(
    surface: &mut S,
    table: &DrawTable,
    x: f32,
    width: f32,
    align: Align,
    first_baseline: f32,
    lines: &[String],
) {
    let anchor = match align {
        Align::Left => x + table.padding,
        Align::Center => x + width / 2.0,
        Align::Right => x + width - table.padding,
    };
    for (i, line) in lines.iter().enumerate().filter(|(_, line)| !line.is_empty()) {
        let baseline = first_baseline + table.padding + i as f32 * table.line_height;
        surface.text(anchor, baseline, line, align);
    }
}

fn stroke_row<S: Surface + ?Sized>(surface: &mut S, table: &DrawTable, grid: Rgb, y: f32, height: f32) {
    surface.set_draw_color(grid);
    let mut x = table.x;
    for column in &table.columns {
        surface.rect(x, y, column.width, height, RectStyle::Stroke);
        x += column.width;
    }
}

/// Lay out a record and render it to PDF bytes.
///
/// # Errors
///
/// Returns an error if the record violates the status invariants or the
/// PDF cannot be serialized. Undecodable images are skipped, not errors.
pub fn render_pdf(record: &MinutesRecord, config: &DocumentConfig) -> Result<Vec<u8>> {
    let mut surface = PdfSurface::new();
    let options = LayoutOptions::from_config(config, surface.supports_opacity());
    let document = compose(record, &options)?;
    debug!(pages = document.page_count(), "Painting document");
    paint(&document, &mut surface);
    surface.finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::Error;
    use crate::layout::commands::{Page, TableColumn, TableRow};

    /// Records every call as a short string.
    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
        pages: usize,
    }

    impl Recorder {
        fn count(&self, prefix: &str) -> usize {
            self.calls.iter().filter(|c| c.starts_with(prefix)).count()
        }
    }

    impl Surface for Recorder {
        fn begin_page(&mut self) {
            self.pages += 1;
            self.calls.push("page".into());
        }
        fn set_fill_color(&mut self, color: Rgb) {
            self.calls.push(format!("fill {color:?}"));
        }
        fn set_text_color(&mut self, color: Rgb) {
            self.calls.push(format!("textcolor {color:?}"));
        }
        fn set_draw_color(&mut self, color: Rgb) {
            self.calls.push(format!("draw {color:?}"));
        }
        fn set_font(&mut self, style: FontStyle, size: f32) {
            self.calls.push(format!("font {style:?} {size}"));
        }
        fn supports_opacity(&self) -> bool {
            false
        }
        fn set_opacity(&mut self, opacity: f32) {
            self.calls.push(format!("opacity {opacity}"));
        }
        fn text(&mut self, _x: f32, _y: f32, text: &str, align: Align) {
            self.calls.push(format!("text {align:?} {text}"));
        }
        fn rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, style: RectStyle) {
            self.calls.push(format!("rect {style:?}"));
        }
        fn line(&mut self, _x1: f32, _y1: f32, _x2: f32, _y2: f32) {
            self.calls.push("line".into());
        }
        fn image(&mut self, data: &[u8], _x: f32, _y: f32, _w: f32, _h: f32) -> Result<()> {
            if data == b"bad" {
                return Err(Error::image_decode("embedded", "unsupported"));
            }
            self.calls.push("image".into());
            Ok(())
        }
    }

    fn table(grid: Option<Rgb>) -> DrawTable {
        let column = |width, align, style| TableColumn {
            width,
            align,
            style,
            fill: None,
        };
        DrawTable {
            x: 14.0,
            columns: vec![
                column(15.0, Align::Center, FontStyle::Normal),
                column(167.0, Align::Left, FontStyle::Bold),
            ],
            header: Some(TableRow {
                y: 50.0,
                height: 7.5,
                cells: vec![vec!["#".into()], vec!["Item".into()]],
                fill: Some(Rgb(46, 204, 113)),
            }),
            rows: vec![
                TableRow {
                    y: 57.5,
                    height: 11.6,
                    cells: vec![vec!["1".into()], vec!["first line".into(), "second line".into()]],
                    fill: Some(Rgb::gray(245)),
                },
                TableRow {
                    y: 69.1,
                    height: 7.5,
                    cells: vec![vec!["2".into()], vec![String::new()]],
                    fill: None,
                },
            ],
            header_fill: Rgb(46, 204, 113),
            header_text: Rgb::WHITE,
            body_text: Rgb::BLACK,
            grid,
            font_size: 10.0,
            padding: 1.76,
            line_height: 4.06,
        }
    }

    fn document(commands: Vec<DrawCommand>) -> LaidOutDocument {
        LaidOutDocument {
            pages: vec![Page { number: 1, commands }],
        }
    }

    #[test]
    fn test_table_expands_to_primitives() {
        let mut surface = Recorder::default();
        paint(&document(vec![DrawCommand::Table(table(Some(Rgb::gray(200))))]), &mut surface);

        // Header band plus the striped first row.
        assert_eq!(surface.count("rect Fill"), 2);
        // One outline per cell in three rows.
        assert_eq!(surface.count("rect Stroke"), 6);
        // Empty cell lines are not painted.
        assert_eq!(surface.count("text "), 2 + 3 + 1);
        assert!(surface.calls.contains(&"text Center #".to_string()));
        assert!(surface.calls.contains(&"text Left second line".to_string()));
    }

    #[test]
    fn test_striped_table_has_no_outlines() {
        let mut surface = Recorder::default();
        paint(&document(vec![DrawCommand::Table(table(None))]), &mut surface);
        assert_eq!(surface.count("rect Stroke"), 0);
    }

    #[test]
    fn test_failed_image_does_not_stop_painting() {
        let mut surface = Recorder::default();
        let doc = document(vec![
            DrawCommand::Image {
                data: Arc::from(&b"bad"[..]),
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 10.0,
            },
            DrawCommand::Text {
                x: 105.0,
                y: 290.0,
                text: "Page 1 of 1".into(),
                align: Align::Center,
            },
        ]);
        paint(&doc, &mut surface);
        assert_eq!(surface.count("image"), 0);
        assert!(surface.calls.contains(&"text Center Page 1 of 1".to_string()));
    }

    #[test]
    fn test_text_block_paints_each_line() {
        let mut surface = Recorder::default();
        let doc = document(vec![DrawCommand::TextBlock {
            x: 14.0,
            y: 100.0,
            lines: vec!["one".into(), "two".into(), "three".into()],
            line_height: 6.0,
        }]);
        paint(&doc, &mut surface);
        assert_eq!(surface.count("text Left"), 3);
    }

    #[test]
    fn test_each_page_begins_once() {
        let mut surface = Recorder::default();
        let doc = LaidOutDocument {
            pages: vec![
                Page {
                    number: 1,
                    commands: vec![],
                },
                Page {
                    number: 2,
                    commands: vec![DrawCommand::Line {
                        x1: 14.0,
                        y1: 20.0,
                        x2: 196.0,
                        y2: 20.0,
                    }],
                },
            ],
        };
        paint(&doc, &mut surface);
        assert_eq!(surface.pages, 2);
        assert_eq!(surface.calls, vec!["page", "page", "line"]);
    }

    #[test]
    fn test_render_pdf_sample_record() {
        let record = crate::record::tests::sample_record();
        let bytes = render_pdf(&record, &DocumentConfig::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
    }
}
