//! PDF backend built on `lopdf`.
//!
//! Pages are A4 in points with the origin flipped to the bottom-left, as
//! PDF expects. Text uses the standard Helvetica faces with WinAnsi
//! encoding, so no font programs are embedded.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use tracing::debug;

use super::image::decode;
use super::Surface;
use crate::error::{Error, Result};
use crate::layout::metrics::text_width;
use crate::layout::{Align, FontStyle, RectStyle, Rgb, PAGE_HEIGHT, PAGE_WIDTH};

/// Points per millimetre.
const MM_TO_PT: f32 = 72.0 / 25.4;

/// Stroke width for lines and cell borders, in points.
const LINE_WIDTH: f32 = 0.57;

/// A [`Surface`] that accumulates pages into a PDF document.
#[derive(Debug)]
pub struct PdfSurface {
    document: Document,
    pages: Vec<Vec<Operation>>,
    fill: Rgb,
    text_color: Rgb,
    draw: Rgb,
    font: (FontStyle, f32),
    images: HashMap<blake3::Hash, String>,
    xobjects: Dictionary,
    graphics_states: Dictionary,
}

impl Default for PdfSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfSurface {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: Document::with_version("1.5"),
            pages: Vec::new(),
            fill: Rgb::BLACK,
            text_color: Rgb::BLACK,
            draw: Rgb::BLACK,
            font: (FontStyle::Normal, 10.0),
            images: HashMap::new(),
            xobjects: Dictionary::new(),
            graphics_states: Dictionary::new(),
        }
    }

    /// Number of pages begun so far.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Assemble the page tree and serialize the document.
    ///
    /// # Errors
    ///
    /// Returns a render error if a content stream cannot be encoded or the
    /// document cannot be written.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            self.begin_page();
        }

        let pages_id = self.document.new_object_id();
        let regular = self.document.add_object(font_dictionary("Helvetica"));
        let bold = self.document.add_object(font_dictionary("Helvetica-Bold"));

        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => regular, "F2" => bold },
        };
        if !self.xobjects.is_empty() {
            resources.set("XObject", std::mem::take(&mut self.xobjects));
        }
        if !self.graphics_states.is_empty() {
            resources.set("ExtGState", std::mem::take(&mut self.graphics_states));
        }
        let resources_id = self.document.add_object(resources);

        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            (PAGE_WIDTH * MM_TO_PT).into(),
            (PAGE_HEIGHT * MM_TO_PT).into(),
        ];

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in std::mem::take(&mut self.pages) {
            let encoded = Content { operations }.encode()?;
            let content_id = self.document.add_object(Stream::new(Dictionary::new(), encoded));
            let page_id = self.document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.document.trailer.set("Root", catalog_id);
        let info_id = self.document.add_object(dictionary! {
            "Producer" => Object::string_literal("minutebook"),
        });
        self.document.trailer.set("Info", info_id);

        self.document.compress();
        let mut bytes = Vec::new();
        self.document
            .save_to(&mut bytes)
            .map_err(|e| Error::render(format!("failed to write PDF: {e}")))?;
        debug!(pages = count, bytes = bytes.len(), "PDF written");
        Ok(bytes)
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.begin_page();
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn emit(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops().push(Operation::new(operator, operands));
    }

    /// Register an image as an XObject, once per distinct content.
    fn image_name(&mut self, data: &[u8]) -> Result<String> {
        let hash = blake3::hash(data);
        if let Some(name) = self.images.get(&hash) {
            return Ok(name.clone());
        }

        let image = decode(data)?;
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        if let Some(alpha) = image.alpha {
            let mask_id = self.document.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(image.width),
                    "Height" => i64::from(image.height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha,
            ));
            dict.set("SMask", mask_id);
        }
        let image_id = self.document.add_object(Stream::new(dict, image.rgb));

        let name = format!("Im{}", self.images.len() + 1);
        self.xobjects.set(name.clone(), image_id);
        self.images.insert(hash, name.clone());
        Ok(name)
    }
}

impl Surface for PdfSurface {
    fn begin_page(&mut self) {
        self.pages
            .push(vec![Operation::new("w", vec![LINE_WIDTH.into()])]);
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill = color;
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.draw = color;
    }

    fn set_font(&mut self, style: FontStyle, size: f32) {
        self.font = (style, size);
    }

    fn supports_opacity(&self) -> bool {
        true
    }

    fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        let name = format!("GS{}", (opacity * 1000.0).round() as u32);
        if !self.graphics_states.has(name.as_bytes()) {
            self.graphics_states.set(
                name.clone(),
                dictionary! { "Type" => "ExtGState", "ca" => opacity, "CA" => opacity },
            );
        }
        self.emit("gs", vec![Object::Name(name.into_bytes())]);
    }

    fn text(&mut self, x: f32, y: f32, text: &str, align: Align) {
        let (style, size) = self.font;
        let x = match align {
            Align::Left => x,
            Align::Center => x - text_width(text, style, size) / 2.0,
            Align::Right => x - text_width(text, style, size),
        };
        let font = match style {
            FontStyle::Normal => "F1",
            FontStyle::Bold => "F2",
        };
        let color = color_operands(self.text_color);
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
        ops.push(Operation::new("rg", color));
        ops.push(Operation::new("Td", vec![pt_x(x).into(), pt_y(y).into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
        ops.push(Operation::new("ET", vec![]));
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, style: RectStyle) {
        let fill = color_operands(self.fill);
        let draw = color_operands(self.draw);
        let ops = self.ops();
        ops.push(Operation::new("rg", fill));
        ops.push(Operation::new("RG", draw));
        ops.push(Operation::new(
            "re",
            vec![
                pt_x(x).into(),
                pt_y(y + h).into(),
                (w * MM_TO_PT).into(),
                (h * MM_TO_PT).into(),
            ],
        ));
        let paint = match style {
            RectStyle::Fill => "f",
            RectStyle::Stroke => "S",
            RectStyle::FillStroke => "B",
        };
        ops.push(Operation::new(paint, vec![]));
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let draw = color_operands(self.draw);
        let ops = self.ops();
        ops.push(Operation::new("RG", draw));
        ops.push(Operation::new("m", vec![pt_x(x1).into(), pt_y(y1).into()]));
        ops.push(Operation::new("l", vec![pt_x(x2).into(), pt_y(y2).into()]));
        ops.push(Operation::new("S", vec![]));
    }

    fn image(&mut self, data: &[u8], x: f32, y: f32, w: f32, h: f32) -> Result<()> {
        let name = self.image_name(data)?;
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                (w * MM_TO_PT).into(),
                0.into(),
                0.into(),
                (h * MM_TO_PT).into(),
                pt_x(x).into(),
                pt_y(y + h).into(),
            ],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        ops.push(Operation::new("Q", vec![]));
        Ok(())
    }
}

fn font_dictionary(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn color_operands(color: Rgb) -> Vec<Object> {
    [color.0, color.1, color.2]
        .into_iter()
        .map(|c| (f32::from(c) / 255.0).into())
        .collect()
}

fn pt_x(x: f32) -> f32 {
    x * MM_TO_PT
}

fn pt_y(y: f32) -> f32 {
    (PAGE_HEIGHT - y) * MM_TO_PT
}

/// Encode text for a WinAnsi simple font.
///
/// Latin-1 characters map to themselves; everything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
