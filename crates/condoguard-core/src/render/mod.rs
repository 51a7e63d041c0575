//! Document generation
//!
//! Cards and reports are drawn against the `Canvas` capability rather than
//! a concrete PDF library. The capability is deliberately small:
//!
//! - `draw_text` / `draw_rect` / `draw_line`: absolute drawing on the
//!   current page
//! - `start_table`: a paginating table laid out by the backend
//! - `add_footer_on_each_page`: a footer repeated on every page
//! - `finish`: produce the encoded document
//!
//! Coordinates are millimetres from the top-left corner of the page; text
//! is positioned by its baseline.
//!
//! Rendering never touches the resident store. A failure leaves nothing to
//! roll back beyond a partially written output file, which `write_document`
//! avoids by writing atomically.

pub mod card;
pub mod pdf;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Resident;

pub use card::{render_card, CardLayout};
pub use pdf::PdfCanvas;
pub use report::{render_report, ReportLayout};

/// Default report file name
pub const REPORT_FILE_NAME: &str = "Relatorio_Semestral_CondoGuard.pdf";

/// Errors raised while producing a document
#[derive(Error, Debug)]
pub enum RenderError {
    /// The drawing backend rejected an operation or failed to encode
    #[error("Document backend error: {0}")]
    Backend(String),

    /// A coordinate or size was outside the page
    #[error("Invalid layout: {0}")]
    Layout(String),

    /// Writing the finished document failed
    #[error("Failed to write document to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);
    pub const SLATE_50: Color = Color(248, 250, 252);
    pub const SLATE_100: Color = Color(241, 245, 249);
    pub const SLATE_300: Color = Color(203, 213, 225);
    pub const SLATE_500: Color = Color(100, 116, 139);
    pub const SLATE_600: Color = Color(71, 85, 105);
    pub const SLATE_700: Color = Color(51, 65, 85);
    pub const SLATE_800: Color = Color(30, 41, 59);

    /// Components scaled to `0.0..=1.0`
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// How a run of text is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points
    pub size: f32,
    pub weight: FontWeight,
    pub color: Color,
    /// Alignment relative to the x coordinate
    pub align: Align,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Normal,
            color: Color::SLATE_800,
            align: Align::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// Line colour and width (mm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

impl Stroke {
    pub fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}

/// Axis-aligned rectangle in mm, from its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Outline and/or fill of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectStyle {
    pub stroke: Option<Stroke>,
    pub fill: Option<Color>,
}

impl RectStyle {
    pub fn outline(stroke: Stroke) -> Self {
        Self {
            stroke: Some(stroke),
            fill: None,
        }
    }

    pub fn filled(color: Color) -> Self {
        Self {
            stroke: None,
            fill: Some(color),
        }
    }
}

/// Per-column layout hints for a table
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Column {
    /// Fixed width in mm; `None` shares the remaining width
    pub width: Option<f32>,
    pub align: Align,
    pub bold: bool,
}

/// A table laid out and paginated by the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Top of the table on the current page, in mm
    pub start_y: f32,
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
    pub columns: Vec<Column>,
    /// Body font size in points
    pub font_size: f32,
    /// Header font size in points
    pub head_font_size: f32,
    pub head_fill: Color,
    /// Fill for every other body row
    pub stripe_fill: Option<Color>,
    /// Cell padding in mm
    pub cell_padding: f32,
}

/// A footer line repeated on every page
pub struct Footer {
    /// Text for a given 1-based page number
    pub text: Box<dyn Fn(usize) -> String>,
    /// Baseline distance from the bottom edge, in mm
    pub baseline_from_bottom: f32,
    pub style: TextStyle,
    /// Rule drawn above the text: distance from bottom edge and stroke
    pub rule: Option<(f32, Stroke)>,
    /// Horizontal margin for the rule, in mm
    pub margin: f32,
}

/// Drawing surface for documents
pub trait Canvas {
    /// Page width in mm
    fn page_width(&self) -> f32;

    /// Page height in mm
    fn page_height(&self) -> f32;

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> RenderResult<()>;

    fn draw_rect(&mut self, rect: Rect, style: &RectStyle) -> RenderResult<()>;

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke)
        -> RenderResult<()>;

    /// Lay out a table starting at `table.start_y`, adding pages as needed
    fn start_table(&mut self, table: &Table) -> RenderResult<()>;

    /// Register a footer drawn on every page when the document is finished
    fn add_footer_on_each_page(&mut self, footer: Footer);

    /// Encode the document
    fn finish(&mut self) -> RenderResult<Vec<u8>>;
}

/// File name for a resident's card: whitespace runs become `_`
pub fn card_file_name(resident: &Resident) -> String {
    let name = resident.name.trim();
    let base = if name.is_empty() {
        "Ficha".to_string()
    } else {
        name.split_whitespace().collect::<Vec<_>>().join("_")
    };
    format!("{}.pdf", base)
}

/// Render a resident's card to a PDF file in `out_dir`
pub fn export_card(
    resident: &Resident,
    issued_at: &str,
    layout: &CardLayout,
    out_dir: &Path,
) -> RenderResult<PathBuf> {
    let mut canvas = PdfCanvas::a4();
    render_card(&mut canvas, resident, issued_at, layout)?;
    let bytes = canvas.finish()?;

    let path = out_dir.join(card_file_name(resident));
    write_document(&path, &bytes)?;
    Ok(path)
}

/// Render the report over `residents` to a PDF file in `out_dir`
pub fn export_report(
    residents: &[Resident],
    generated_at: &str,
    layout: &ReportLayout,
    out_dir: &Path,
) -> RenderResult<PathBuf> {
    let mut canvas = PdfCanvas::a4();
    render_report(&mut canvas, residents, generated_at, layout)?;
    let bytes = canvas.finish()?;

    let path = out_dir.join(&layout.file_name);
    write_document(&path, &bytes)?;
    Ok(path)
}

/// Write a finished document atomically
pub fn write_document(path: &Path, bytes: &[u8]) -> RenderResult<()> {
    let wrap = |source: io::Error| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
    }

    let temp_path = path.with_extension("pdf.tmp");
    let mut file = File::create(&temp_path).map_err(wrap)?;
    file.write_all(bytes).map_err(wrap)?;
    file.sync_all().map_err(wrap)?;
    fs::rename(&temp_path, path).map_err(wrap)?;
    Ok(())
}
