//! Document assembly and layout.
//!
//! [`compose`] runs the section renderers in their fixed order against a
//! [`PageFlow`], which owns the vertical cursor and every page-break
//! decision, and finishes with the page-numbering pass. The result is a
//! backend-neutral [`LaidOutDocument`] that a
//! [`Surface`](crate::render::Surface) can paint.
//!
//! Units are millimetres on an A4 page with the origin in the top-left
//! corner.

pub mod commands;
pub mod metrics;
pub mod sections;
pub mod table;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::DocumentConfig;
use crate::error::Result;
use crate::record::{check_invariants, MinutesRecord};
use crate::render::image::dimensions;

pub use commands::{Align, DrawCommand, DrawTable, FontStyle, LaidOutDocument, Page, RectStyle, Rgb};
pub use table::{Cell, ColumnSpec, TableSpec, Theme};

/// Page width.
pub const PAGE_WIDTH: f32 = 210.0;
/// Page height.
pub const PAGE_HEIGHT: f32 = 297.0;
/// Left and right margin.
pub const MARGIN_X: f32 = 14.0;
/// Width between the margins.
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;
/// Height of the header band on the first page.
pub const HEADER_HEIGHT: f32 = 40.0;
/// Where the metadata grid starts on the first page.
pub const METADATA_TOP: f32 = 50.0;
/// Cursor position on continuation pages.
pub const TOP_MARGIN: f32 = 20.0;
/// Nothing flowing is placed below this line.
pub const CONTENT_BOTTOM: f32 = 280.0;
/// The signature block starts a new page when the cursor is below this.
pub const SIGNATURE_BREAK_Y: f32 = 240.0;
/// Baseline of the page-number footer.
pub const FOOTER_Y: f32 = 290.0;

/// Gap between a table's title baseline and the table.
const TABLE_TITLE_GAP: f32 = 5.0;
/// Gap between the summary title and its first line.
const SUMMARY_TITLE_GAP: f32 = 6.0;
/// Baseline distance in the summary.
const SUMMARY_LINE_HEIGHT: f32 = 6.0;
/// Space after the summary.
const SUMMARY_SPACE_AFTER: f32 = 10.0;
/// Inset of images drawn inside table cells.
const CELL_IMAGE_INSET: f32 = 2.0;

/// Document-wide settings that do not come from the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Label in the header band.
    pub confidential_label: String,
    /// Text after the page number.
    pub footer_text: String,
    /// Whether the target surface can paint translucently.
    pub supports_opacity: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from_config(&DocumentConfig::default(), true)
    }
}

impl LayoutOptions {
    /// Options from the `[document]` configuration.
    #[must_use]
    pub fn from_config(config: &DocumentConfig, supports_opacity: bool) -> Self {
        Self {
            confidential_label: config.confidential_label.clone(),
            footer_text: config.footer_text.clone(),
            supports_opacity,
        }
    }
}

/// Lay out a minutes record.
///
/// The record is normalized first. Images that cannot be decoded are
/// skipped with a warning.
///
/// # Errors
///
/// Returns a validation error when the record's status contradicts its
/// signatures; nothing is laid out in that case.
pub fn compose(record: &MinutesRecord, options: &LayoutOptions) -> Result<LaidOutDocument> {
    check_invariants(record)?;
    let record = record.normalized();
    let mut flow = PageFlow::new();

    flow.extend(sections::header(&record, options));

    if let Some(bytes) = &record.watermark_image {
        match dimensions(bytes) {
            Ok(pixels) => {
                let image: Arc<[u8]> = Arc::from(bytes.as_slice());
                flow.extend(sections::watermark(image, pixels, options.supports_opacity));
            }
            Err(e) => warn!(error = %e, "Skipping watermark"),
        }
    }

    flow.set_cursor(METADATA_TOP);
    flow.place_table(&sections::metadata_table(&record));

    let tables = [
        sections::attendee_table(&record),
        sections::agenda_table(&record.agenda_items),
        sections::decisions_table(&record.decisions),
    ];
    for table in tables.iter().flatten() {
        flow.place_table(table);
    }

    if let Some(lines) = sections::executive_summary(&record.executive_summary) {
        flow.place_summary(lines);
    }

    if sections::has_signatories(&record) {
        if flow.cursor() > SIGNATURE_BREAK_Y {
            flow.new_page();
        }
        let (commands, cursor) = sections::signature_block(&record, flow.cursor());
        flow.extend(commands);
        flow.set_cursor(cursor);
    }

    let document = flow.finish(&options.footer_text);
    info!(pages = document.page_count(), title = %record.title, "Composed minutes document");
    Ok(document)
}

/// Page and cursor state of one assembly.
#[derive(Debug, Clone)]
pub struct PageFlow {
    pages: Vec<Page>,
    cursor: f32,
}

impl Default for PageFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFlow {
    /// Start on page 1 with the cursor at the top edge.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: vec![Page {
                number: 1,
                commands: Vec::new(),
            }],
            cursor: 0.0,
        }
    }

    /// Current cursor.
    #[must_use]
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Move the cursor.
    pub fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    /// Current page number.
    #[must_use]
    pub fn page_number(&self) -> usize {
        self.pages.len()
    }

    /// Whether nothing flowing has been placed on this page yet.
    #[must_use]
    pub fn at_page_top(&self) -> bool {
        self.cursor <= TOP_MARGIN
    }

    /// Append a command to the current page.
    pub fn push(&mut self, command: DrawCommand) {
        if let Some(page) = self.pages.last_mut() {
            page.commands.push(command);
        }
    }

    /// Append commands to the current page.
    pub fn extend(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        if let Some(page) = self.pages.last_mut() {
            page.commands.extend(commands);
        }
    }

    /// Start a new page and reset the cursor to the top margin.
    pub fn new_page(&mut self) {
        let number = self.pages.len() + 1;
        debug!(page = number, "Starting new page");
        self.pages.push(Page {
            number,
            commands: Vec::new(),
        });
        self.cursor = TOP_MARGIN;
    }

    /// Place a logical table, splitting it across pages as needed.
    ///
    /// The title, header row and first body row are kept together. On every
    /// continuation page the header row is repeated.
    pub fn place_table(&mut self, spec: &TableSpec) {
        let table = spec.measure();
        let header_height = table.header_height();
        let title_height = if spec.title.is_some() { TABLE_TITLE_GAP } else { 0.0 };
        let first_row = table.rows.first().map_or(0.0, |r| r.height);

        if self.cursor + title_height + header_height + first_row > CONTENT_BOTTOM && !self.at_page_top() {
            self.new_page();
        }

        if let Some(title) = &spec.title {
            self.extend([
                DrawCommand::SetFont {
                    style: FontStyle::Bold,
                    size: sections::SECTION_TITLE_SIZE,
                },
                DrawCommand::SetTextColor(Rgb::BLACK),
                DrawCommand::Text {
                    x: MARGIN_X,
                    y: self.cursor,
                    text: title.clone(),
                    align: Align::Left,
                },
            ]);
            self.cursor += title_height;
        }

        let mut top = self.cursor;
        let mut y = top + header_height;
        let mut placed: Vec<(commands::TableRow, Option<usize>)> = Vec::new();

        for (index, measured) in table.rows.iter().enumerate() {
            let mut row = measured.clone();
            let mut images = Some(index);
            loop {
                if y + row.height <= CONTENT_BOTTOM {
                    placed.push((commands::TableRow { y, ..row }, images));
                    y += row.height;
                    break;
                }

                let fits_fresh_page = TOP_MARGIN + header_height + row.height <= CONTENT_BOTTOM;
                let lines = table::lines_fitting(&row, CONTENT_BOTTOM - y, table.line_height);
                if (fits_fresh_page && !placed.is_empty()) || lines == 0 {
                    self.emit_fragment(spec, &table, top, &placed);
                    self.new_page();
                    top = self.cursor;
                    y = top + header_height;
                    placed.clear();
                    continue;
                }

                // Too tall for any page: fill this one and carry the rest over.
                let (head, tail) = table::split_row(&row, lines, table.line_height);
                debug!(row = index, lines, "Splitting table row across pages");
                placed.push((commands::TableRow { y, ..head }, images.take()));
                self.emit_fragment(spec, &table, top, &placed);
                self.new_page();
                top = self.cursor;
                y = top + header_height;
                placed.clear();
                row = tail;
            }
        }
        self.emit_fragment(spec, &table, top, &placed);

        self.cursor = y + spec.space_after;
    }

    fn emit_fragment(
        &mut self,
        spec: &TableSpec,
        table: &table::MeasuredTable,
        top: f32,
        placed: &[(commands::TableRow, Option<usize>)],
    ) {
        if placed.is_empty() && !table.rows.is_empty() {
            return;
        }
        let rows = placed.iter().map(|(row, _)| row.clone()).collect();
        let header = table.header.clone().map(|header| commands::TableRow { y: top, ..header });

        debug!(
            page = self.page_number(),
            rows = placed.len(),
            title = spec.title.as_deref().unwrap_or("metadata"),
            "Placed table fragment"
        );

        self.push(DrawCommand::Table(DrawTable {
            x: MARGIN_X,
            columns: table.columns.clone(),
            header,
            rows,
            header_fill: spec.header_fill,
            header_text: Rgb::WHITE,
            body_text: Rgb::BLACK,
            grid: table.grid,
            font_size: table::TABLE_FONT_SIZE,
            padding: table::CELL_PADDING,
            line_height: table.line_height,
        }));

        let (w, h) = spec.image_size;
        for (row, index) in placed {
            let Some(index) = index else { continue };
            for (column, data) in &table.images[*index] {
                self.push(DrawCommand::Image {
                    data: Arc::clone(data),
                    x: MARGIN_X + table.column_offset(*column) + CELL_IMAGE_INSET,
                    y: row.y + CELL_IMAGE_INSET,
                    w,
                    h,
                });
            }
        }
    }

    /// Place the executive summary, continuing on new pages as needed.
    pub fn place_summary(&mut self, lines: Vec<String>) {
        if self.cursor + SUMMARY_TITLE_GAP + SUMMARY_LINE_HEIGHT > CONTENT_BOTTOM && !self.at_page_top() {
            self.new_page();
        }

        self.extend([
            DrawCommand::SetFont {
                style: FontStyle::Bold,
                size: sections::SECTION_TITLE_SIZE,
            },
            DrawCommand::SetTextColor(Rgb::BLACK),
            DrawCommand::Text {
                x: MARGIN_X,
                y: self.cursor,
                text: "Executive Summary".to_string(),
                align: Align::Left,
            },
        ]);
        self.cursor += SUMMARY_TITLE_GAP;

        let body_font = DrawCommand::SetFont {
            style: FontStyle::Normal,
            size: sections::SUMMARY_FONT_SIZE,
        };
        self.push(body_font.clone());

        let mut start = self.cursor;
        let mut y = self.cursor;
        let mut chunk = Vec::new();
        for line in lines {
            if y > CONTENT_BOTTOM && !chunk.is_empty() {
                self.push(text_block(start, std::mem::take(&mut chunk)));
                self.new_page();
                self.extend([body_font.clone(), DrawCommand::SetTextColor(Rgb::BLACK)]);
                start = self.cursor;
                y = self.cursor;
            }
            chunk.push(line);
            y += SUMMARY_LINE_HEIGHT;
        }
        if !chunk.is_empty() {
            self.push(text_block(start, chunk));
        }

        self.cursor = y + SUMMARY_SPACE_AFTER;
    }

    /// Stamp `Page i of N` on every page and hand over the pages.
    #[must_use]
    pub fn finish(mut self, footer_text: &str) -> LaidOutDocument {
        let total = self.pages.len();
        for page in &mut self.pages {
            page.commands.extend(sections::footer(page.number, total, footer_text));
        }
        LaidOutDocument { pages: self.pages }
    }
}

fn text_block(y: f32, lines: Vec<String>) -> DrawCommand {
    DrawCommand::TextBlock {
        x: MARGIN_X,
        y,
        lines,
        line_height: SUMMARY_LINE_HEIGHT,
    }
}
