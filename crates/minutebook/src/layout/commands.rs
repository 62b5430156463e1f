//! Draw commands, the output of layout and the input of rendering.
//!
//! All coordinates are millimetres from the top-left corner of an A4 page.
//! Font sizes are points.

use std::sync::Arc;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Black.
    pub const BLACK: Self = Self(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self(255, 255, 255);

    /// A neutral grey of the given level.
    #[must_use]
    pub const fn gray(level: u8) -> Self {
        Self(level, level, level)
    }
}

/// Font weight. The face is always Helvetica.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
}

/// Horizontal anchoring of a text run relative to its x coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    /// `x` is the left edge.
    #[default]
    Left,
    /// `x` is the centre.
    Center,
    /// `x` is the right edge.
    Right,
}

/// How a rectangle is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectStyle {
    /// Filled with the fill colour.
    Fill,
    /// Outlined with the draw colour.
    Stroke,
    /// Both.
    FillStroke,
}

/// One resolved table column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    /// Width in mm.
    pub width: f32,
    /// Alignment of cell text.
    pub align: Align,
    /// Font weight of body cells.
    pub style: FontStyle,
    /// Background of body cells in this column, overriding row striping.
    pub fill: Option<Rgb>,
}

/// One positioned table row with its text already wrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Top edge.
    pub y: f32,
    /// Row height.
    pub height: f32,
    /// Wrapped lines per cell.
    pub cells: Vec<Vec<String>>,
    /// Row background, if any.
    pub fill: Option<Rgb>,
}

/// The part of a logical table that lands on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTable {
    /// Left edge.
    pub x: f32,
    /// Column geometry and styles.
    pub columns: Vec<TableColumn>,
    /// Header row, repeated on every page the table touches.
    pub header: Option<TableRow>,
    /// Body rows on this page.
    pub rows: Vec<TableRow>,
    /// Header background.
    pub header_fill: Rgb,
    /// Header text colour.
    pub header_text: Rgb,
    /// Body text colour.
    pub body_text: Rgb,
    /// Cell border colour; `None` draws no borders.
    pub grid: Option<Rgb>,
    /// Cell font size.
    pub font_size: f32,
    /// Inner cell padding.
    pub padding: f32,
    /// Distance between wrapped lines.
    pub line_height: f32,
}

impl DrawTable {
    /// Total width of all columns.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Bottom edge of the last row.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.rows
            .last()
            .or(self.header.as_ref())
            .map_or(0.0, |row| row.y + row.height)
    }
}

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Colour for subsequent rectangle fills.
    SetFillColor(Rgb),
    /// Colour for subsequent text.
    SetTextColor(Rgb),
    /// Colour for subsequent lines and outlines.
    SetDrawColor(Rgb),
    /// Font for subsequent text.
    SetFont {
        /// Weight.
        style: FontStyle,
        /// Size in points.
        size: f32,
    },
    /// Opacity for subsequent painting, 0.0 to 1.0.
    SetOpacity(f32),
    /// A single line of text; `y` is the baseline.
    Text {
        /// Anchor x.
        x: f32,
        /// Baseline y.
        y: f32,
        /// The text.
        text: String,
        /// Anchoring.
        align: Align,
    },
    /// Pre-wrapped lines, left-aligned, first baseline at `y`.
    TextBlock {
        /// Left edge.
        x: f32,
        /// First baseline.
        y: f32,
        /// The lines.
        lines: Vec<String>,
        /// Baseline-to-baseline distance.
        line_height: f32,
    },
    /// An axis-aligned rectangle.
    Rect {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        w: f32,
        /// Height.
        h: f32,
        /// Fill and/or stroke.
        style: RectStyle,
    },
    /// A straight line.
    Line {
        /// Start x.
        x1: f32,
        /// Start y.
        y1: f32,
        /// End x.
        x2: f32,
        /// End y.
        y2: f32,
    },
    /// A raster image scaled into the given box.
    Image {
        /// Encoded image bytes (PNG or JPEG).
        data: Arc<[u8]>,
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        w: f32,
        /// Height.
        h: f32,
    },
    /// A table fragment.
    Table(DrawTable),
}

/// One laid-out page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    /// Commands in paint order.
    pub commands: Vec<DrawCommand>,
}

impl Page {
    /// Every single-line text run and table cell line on the page, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().flat_map(command_texts)
    }

    /// Table fragments on the page.
    pub fn tables(&self) -> impl Iterator<Item = &DrawTable> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Number of image draws on the page.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Image { .. }))
            .count()
    }
}

fn command_texts(command: &DrawCommand) -> Box<dyn Iterator<Item = &str> + '_> {
    match command {
        DrawCommand::Text { text, .. } => Box::new(std::iter::once(text.as_str())),
        DrawCommand::TextBlock { lines, .. } => Box::new(lines.iter().map(String::as_str)),
        DrawCommand::Table(table) => Box::new(
            table
                .header
                .iter()
                .chain(&table.rows)
                .flat_map(|row| row.cells.iter().flatten().map(String::as_str)),
        ),
        _ => Box::new(std::iter::empty()),
    }
}

/// The complete layout of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutDocument {
    /// Pages in order.
    pub pages: Vec<Page>,
}

impl LaidOutDocument {
    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether any page carries exactly this text run.
    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages.iter().any(|page| page.texts().any(|t| t == needle))
    }
}
