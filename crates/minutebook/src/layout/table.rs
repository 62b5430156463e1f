//! Logical tables and their measurement.
//!
//! Section renderers describe a whole table as a [`TableSpec`]. The page
//! flow controller measures it once with [`TableSpec::measure`] and then
//! decides where each row lands, splitting the table into one
//! [`DrawTable`](super::commands::DrawTable) per page.

use std::sync::Arc;

use super::commands::{Align, FontStyle, Rgb, TableColumn, TableRow};
use super::metrics::{wrap_text, PT_TO_MM};
use super::CONTENT_WIDTH;

/// Font size of table cells, in points.
pub const TABLE_FONT_SIZE: f32 = 10.0;

/// Inner cell padding in millimetres.
pub const CELL_PADDING: f32 = 1.76;

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// Background of every other striped body row.
const STRIPE: Rgb = Rgb::gray(245);

/// Border colour of grid tables.
const GRID_LINE: Rgb = Rgb::gray(200);

/// Visual grammar of a table body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Every cell outlined.
    Grid,
    /// No borders, alternating row backgrounds.
    Striped,
}

/// A column before width resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Fixed width, or `None` to share the remaining width equally.
    pub width: Option<f32>,
    /// Alignment of body text.
    pub align: Align,
    /// Weight of body text.
    pub style: FontStyle,
    /// Background of body cells.
    pub fill: Option<Rgb>,
}

impl ColumnSpec {
    /// An auto-width, left-aligned, regular column.
    #[must_use]
    pub fn auto() -> Self {
        Self {
            width: None,
            align: Align::Left,
            style: FontStyle::Normal,
            fill: None,
        }
    }

    /// A fixed-width column.
    #[must_use]
    pub fn fixed(width: f32) -> Self {
        Self {
            width: Some(width),
            ..Self::auto()
        }
    }

    /// Set the alignment.
    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Make body text bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.style = FontStyle::Bold;
        self
    }

    /// Set the body cell background.
    #[must_use]
    pub fn fill(mut self, fill: Rgb) -> Self {
        self.fill = Some(fill);
        self
    }
}

/// One body cell: text and an optional image drawn over it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// Cell text.
    pub text: String,
    /// Image drawn inside the cell.
    pub image: Option<Arc<[u8]>>,
}

impl Cell {
    /// A text-only cell.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    /// A cell carrying an image.
    #[must_use]
    pub fn image(image: Option<Arc<[u8]>>) -> Self {
        Self {
            text: String::new(),
            image,
        }
    }
}

/// A whole logical table as produced by a section renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    /// Section title drawn above the table and kept with its first row.
    pub title: Option<String>,
    /// Columns.
    pub columns: Vec<ColumnSpec>,
    /// Header labels.
    pub header: Option<Vec<String>>,
    /// Body rows.
    pub rows: Vec<Vec<Cell>>,
    /// Body theme.
    pub theme: Theme,
    /// Header background.
    pub header_fill: Rgb,
    /// Minimum body row height.
    pub min_row_height: f32,
    /// Size of images placed in cells.
    pub image_size: (f32, f32),
    /// Cursor advance after the table.
    pub space_after: f32,
}

/// A table with widths resolved and every cell wrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredTable {
    /// Resolved columns.
    pub columns: Vec<TableColumn>,
    /// Header row with `y = 0`.
    pub header: Option<TableRow>,
    /// Body rows with `y = 0`.
    pub rows: Vec<TableRow>,
    /// Per-row cell images as `(column, bytes)`.
    pub images: Vec<Vec<(usize, Arc<[u8]>)>>,
    /// Border colour, if the theme draws borders.
    pub grid: Option<Rgb>,
    /// Baseline-to-baseline distance inside cells.
    pub line_height: f32,
}

impl TableSpec {
    /// Resolve column widths, wrap every cell and compute row heights.
    #[must_use]
    pub fn measure(&self) -> MeasuredTable {
        let widths = resolve_widths(&self.columns, CONTENT_WIDTH);
        let line_height = TABLE_FONT_SIZE * LINE_HEIGHT_FACTOR * PT_TO_MM;

        let columns: Vec<TableColumn> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(spec, &width)| TableColumn {
                width,
                align: spec.align,
                style: spec.style,
                fill: spec.fill,
            })
            .collect();

        let header = self.header.as_ref().map(|labels| {
            let cells: Vec<Vec<String>> = labels
                .iter()
                .zip(&columns)
                .map(|(label, column)| wrap_cell(label, FontStyle::Bold, column.width))
                .collect();
            TableRow {
                y: 0.0,
                height: row_height(&cells, line_height, 0.0),
                cells,
                fill: Some(self.header_fill),
            }
        });

        let mut rows = Vec::with_capacity(self.rows.len());
        let mut images = Vec::with_capacity(self.rows.len());
        for (index, row) in self.rows.iter().enumerate() {
            let cells: Vec<Vec<String>> = row
                .iter()
                .zip(&columns)
                .map(|(cell, column)| wrap_cell(&cell.text, column.style, column.width))
                .collect();
            let fill = match self.theme {
                Theme::Striped if index % 2 == 0 => Some(STRIPE),
                _ => None,
            };
            rows.push(TableRow {
                y: 0.0,
                height: row_height(&cells, line_height, self.min_row_height),
                cells,
                fill,
            });
            images.push(
                row.iter()
                    .enumerate()
                    .filter_map(|(col, cell)| cell.image.clone().map(|img| (col, img)))
                    .collect(),
            );
        }

        MeasuredTable {
            columns,
            header,
            rows,
            images,
            grid: match self.theme {
                Theme::Grid => Some(GRID_LINE),
                Theme::Striped => None,
            },
            line_height,
        }
    }
}

impl MeasuredTable {
    /// Header height, zero without a header.
    #[must_use]
    pub fn header_height(&self) -> f32 {
        self.header.as_ref().map_or(0.0, |h| h.height)
    }

    /// Left edge of a column relative to the table's left edge.
    #[must_use]
    pub fn column_offset(&self, column: usize) -> f32 {
        self.columns.iter().take(column).map(|c| c.width).sum()
    }
}

/// How many wrapped lines of `row` fit in `room` millimetres.
#[must_use]
pub fn lines_fitting(row: &TableRow, room: f32, line_height: f32) -> usize {
    let total = row.cells.iter().map(Vec::len).max().unwrap_or(0);
    let mut lines = 0;
    while lines < total && (lines + 1) as f32 * line_height + 2.0 * CELL_PADDING <= room {
        lines += 1;
    }
    lines
}

/// Split a body row after its first `lines` wrapped lines.
///
/// Both parts keep the row's fill. The tail may be split again.
#[must_use]
pub fn split_row(row: &TableRow, lines: usize, line_height: f32) -> (TableRow, TableRow) {
    let (head, tail): (Vec<Vec<String>>, Vec<Vec<String>>) = row
        .cells
        .iter()
        .map(|cell| {
            let at = lines.min(cell.len());
            (cell[..at].to_vec(), cell[at..].to_vec())
        })
        .unzip();
    let head = TableRow {
        y: row.y,
        height: row_height(&head, line_height, 0.0),
        cells: head,
        fill: row.fill,
    };
    let tail = TableRow {
        y: row.y,
        height: row_height(&tail, line_height, 0.0),
        cells: tail,
        fill: row.fill,
    };
    (head, tail)
}

/// Split `total` between fixed and auto columns.
///
/// Auto columns share whatever the fixed ones leave, never less than zero.
#[must_use]
pub fn resolve_widths(columns: &[ColumnSpec], total: f32) -> Vec<f32> {
    let fixed: f32 = columns.iter().filter_map(|c| c.width).sum();
    let autos = columns.iter().filter(|c| c.width.is_none()).count();
    let share = if autos == 0 {
        0.0
    } else {
        ((total - fixed) / autos as f32).max(0.0)
    };
    columns.iter().map(|c| c.width.unwrap_or(share)).collect()
}

fn wrap_cell(text: &str, style: FontStyle, width: f32) -> Vec<String> {
    let inner = (width - 2.0 * CELL_PADDING).max(1.0);
    wrap_text(text, style, TABLE_FONT_SIZE, inner)
}

fn row_height(cells: &[Vec<String>], line_height: f32, min_height: f32) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    (lines as f32 * line_height + 2.0 * CELL_PADDING).max(min_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(rows: Vec<Vec<Cell>>) -> TableSpec {
        TableSpec {
            title: Some("Agenda Items".to_string()),
            columns: vec![
                ColumnSpec::fixed(15.0).align(Align::Center),
                ColumnSpec::auto(),
                ColumnSpec::fixed(40.0),
            ],
            header: Some(vec!["#".into(), "Item Description".into(), "Speaker".into()]),
            rows,
            theme: Theme::Grid,
            header_fill: Rgb(46, 204, 113),
            min_row_height: 0.0,
            image_size: (25.0, 10.0),
            space_after: 10.0,
        }
    }

    #[test]
    fn test_split_row_keeps_every_line_once() {
        let row = TableRow {
            y: 0.0,
            height: 0.0,
            cells: vec![
                vec!["1".to_string()],
                (0..10).map(|n| format!("line {n}")).collect(),
                vec!["Ahmed".to_string(), "Ali".to_string()],
            ],
            fill: Some(STRIPE),
        };
        let (head, tail) = split_row(&row, 3, 4.0);

        assert_eq!(head.cells[1].len(), 3);
        assert_eq!(tail.cells[1].len(), 7);
        assert_eq!(head.cells[2].len(), 2);
        assert!(tail.cells[2].is_empty());
        assert!(tail.cells[0].is_empty());
        assert!((head.height - (3.0 * 4.0 + 2.0 * CELL_PADDING)).abs() < 1e-4);
        assert_eq!(tail.fill, Some(STRIPE));
    }

    #[test]
    fn test_lines_fitting() {
        let row = TableRow {
            y: 0.0,
            height: 0.0,
            cells: vec![(0..10).map(|n| n.to_string()).collect()],
            fill: None,
        };
        assert_eq!(lines_fitting(&row, 2.0 * CELL_PADDING + 8.5, 4.0), 2);
        assert_eq!(lines_fitting(&row, 1.0, 4.0), 0);
        assert_eq!(lines_fitting(&row, 1000.0, 4.0), 10);
    }

    #[test]
    fn test_resolve_widths() {
        let columns = [ColumnSpec::fixed(15.0), ColumnSpec::auto(), ColumnSpec::fixed(40.0)];
        let widths = resolve_widths(&columns, 182.0);
        assert_eq!(widths, vec![15.0, 127.0, 40.0]);

        let columns = [ColumnSpec::fixed(40.0), ColumnSpec::auto(), ColumnSpec::auto(), ColumnSpec::auto()];
        let widths = resolve_widths(&columns, 182.0);
        assert!((widths[1] - 142.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_widths_never_negative() {
        let columns = [ColumnSpec::fixed(200.0), ColumnSpec::auto()];
        assert_eq!(resolve_widths(&columns, 182.0), vec![200.0, 0.0]);
    }

    #[test]
    fn test_single_line_row_height() {
        let table = spec(vec![vec![Cell::text("1"), Cell::text("Budget"), Cell::text("Ahmed")]]).measure();
        let expected = TABLE_FONT_SIZE * LINE_HEIGHT_FACTOR * PT_TO_MM + 2.0 * CELL_PADDING;
        assert!((table.rows[0].height - expected).abs() < 1e-4);
        assert!((table.header_height() - expected).abs() < 1e-4);
        assert_eq!(table.grid, Some(GRID_LINE));
    }

    #[test]
    fn test_long_cell_grows_row() {
        let long = "word ".repeat(80);
        let table = spec(vec![vec![Cell::text("1"), Cell::text(long), Cell::text("Ahmed")]]).measure();
        assert!(table.rows[0].cells[1].len() > 1);
        assert!(table.rows[0].height > table.header_height());
    }

    #[test]
    fn test_min_row_height_and_images() {
        let mut spec = spec(vec![vec![
            Cell::text("1"),
            Cell::text("Budget"),
            Cell::image(Some(Arc::from(&b"png"[..]))),
        ]]);
        spec.min_row_height = 12.0;
        spec.theme = Theme::Striped;
        let table = spec.measure();

        assert!((table.rows[0].height - 12.0).abs() < f32::EPSILON);
        assert_eq!(table.rows[0].fill, Some(STRIPE));
        assert_eq!(table.images[0].len(), 1);
        assert_eq!(table.images[0][0].0, 2);
        assert!(table.grid.is_none());
    }

    #[test]
    fn test_column_offset() {
        let table = spec(vec![]).measure();
        assert!(table.column_offset(0).abs() < f32::EPSILON);
        assert!((table.column_offset(2) - 142.0).abs() < 1e-4);
    }
}
