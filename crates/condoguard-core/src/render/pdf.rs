//! PDF backend for `Canvas`, built on lopdf
//!
//! Pages are A4 portrait. Text uses the standard Helvetica faces with
//! WinAnsi encoding, so Portuguese accents render; characters outside
//! Latin-1 are replaced with `?`. There are no embedded font metrics: text
//! width for alignment and wrapping comes from an approximate per-glyph
//! table, which is close enough for centring labels and breaking cells.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use super::{
    Align, Canvas, Color, Footer, FontWeight, Rect, RectStyle, RenderError, RenderResult, Stroke,
    Table, TextStyle,
};

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Side margin for tables, in mm
const TABLE_MARGIN: f32 = 14.0;
/// Space kept free for the footer at the bottom of each page, in mm
const BOTTOM_RESERVE: f32 = 22.0;
/// Top of a table continued on a new page, in mm
const CONTINUATION_TOP: f32 = 15.0;
const LINE_SPACING: f32 = 1.15;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// A4 PDF document under construction
pub struct PdfCanvas {
    pages: Vec<Vec<Operation>>,
    footers: Vec<Footer>,
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::a4()
    }
}

impl PdfCanvas {
    /// Empty document with one blank A4 page
    pub fn a4() -> Self {
        Self {
            pages: vec![Vec::new()],
            footers: Vec::new(),
        }
    }

    /// Number of pages so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn push_text(&mut self, page: usize, text: &str, x: f32, y: f32, style: &TextStyle) {
        let width = text_width(text, style.size, style.weight);
        let left = match style.align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let font = match style.weight {
            FontWeight::Normal => FONT_REGULAR,
            FontWeight::Bold => FONT_BOLD,
        };
        let (r, g, b) = style.color.unit();

        let ops = &mut self.pages[page];
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("rg", vec![real(r), real(g), real(b)]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), real(style.size)],
        ));
        ops.push(Operation::new("Td", vec![pt(left), pt(A4_HEIGHT_MM - y)]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    fn push_rect(&mut self, page: usize, rect: Rect, style: &RectStyle) {
        let paint = match (style.fill, style.stroke) {
            (Some(_), Some(_)) => "B",
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (None, None) => return,
        };

        let ops = &mut self.pages[page];
        ops.push(Operation::new("q", vec![]));
        if let Some(fill) = style.fill {
            let (r, g, b) = fill.unit();
            ops.push(Operation::new("rg", vec![real(r), real(g), real(b)]));
        }
        if let Some(stroke) = style.stroke {
            push_stroke(ops, stroke);
        }
        ops.push(Operation::new(
            "re",
            vec![
                pt(rect.x),
                pt(A4_HEIGHT_MM - rect.y - rect.height),
                pt(rect.width),
                pt(rect.height),
            ],
        ));
        ops.push(Operation::new(paint, vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn push_line(&mut self, page: usize, from: (f32, f32), to: (f32, f32), stroke: Stroke) {
        let ops = &mut self.pages[page];
        ops.push(Operation::new("q", vec![]));
        push_stroke(ops, stroke);
        ops.push(Operation::new("m", vec![pt(from.0), pt(A4_HEIGHT_MM - from.1)]));
        ops.push(Operation::new("l", vec![pt(to.0), pt(A4_HEIGHT_MM - to.1)]));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn draw_table_head(&mut self, table: &Table, widths: &[f32], y: f32) -> f32 {
        let height = row_height(&[vec![String::new()]], table.head_font_size, table.cell_padding);
        let page = self.pages.len() - 1;
        let total: f32 = widths.iter().sum();
        self.push_rect(
            page,
            Rect::new(TABLE_MARGIN, y, total, height),
            &RectStyle::filled(table.head_fill),
        );

        let style = TextStyle::new(table.head_font_size)
            .bold()
            .color(Color::WHITE)
            .align(Align::Center);
        let mut x = TABLE_MARGIN;
        for (heading, width) in table.head.iter().zip(widths) {
            let baseline = first_baseline(y, table.head_font_size, table.cell_padding);
            self.push_text(page, heading, x + width / 2.0, baseline, &style);
            x += width;
        }
        y + height
    }

    fn emit_footers(&mut self) {
        let footers = std::mem::take(&mut self.footers);
        for page in 0..self.pages.len() {
            for footer in &footers {
                if let Some((from_bottom, stroke)) = footer.rule {
                    let y = A4_HEIGHT_MM - from_bottom;
                    self.push_line(
                        page,
                        (footer.margin, y),
                        (A4_WIDTH_MM - footer.margin, y),
                        stroke,
                    );
                }
                let text = (footer.text)(page + 1);
                let x = match footer.style.align {
                    Align::Left => footer.margin,
                    Align::Center => A4_WIDTH_MM / 2.0,
                    Align::Right => A4_WIDTH_MM - footer.margin,
                };
                self.push_text(
                    page,
                    &text,
                    x,
                    A4_HEIGHT_MM - footer.baseline_from_bottom,
                    &footer.style,
                );
            }
        }
        self.footers = footers;
    }

    fn build(&self) -> RenderResult<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => regular_id,
                FONT_BOLD => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in &self.pages {
            let content = Content {
                operations: operations.clone(),
            };
            let encoded = content
                .encode()
                .map_err(|e| RenderError::Backend(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                pt(A4_WIDTH_MM),
                pt(A4_HEIGHT_MM),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        Ok(bytes)
    }
}

impl Canvas for PdfCanvas {
    fn page_width(&self) -> f32 {
        A4_WIDTH_MM
    }

    fn page_height(&self) -> f32 {
        A4_HEIGHT_MM
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> RenderResult<()> {
        check_point(x, y)?;
        let page = self.pages.len() - 1;
        self.push_text(page, text, x, y, style);
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, style: &RectStyle) -> RenderResult<()> {
        check_point(rect.x, rect.y)?;
        check_point(rect.x + rect.width, rect.y + rect.height)?;
        let page = self.pages.len() - 1;
        self.push_rect(page, rect, style);
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        stroke: Stroke,
    ) -> RenderResult<()> {
        check_point(from.0, from.1)?;
        check_point(to.0, to.1)?;
        let page = self.pages.len() - 1;
        self.push_line(page, from, to, stroke);
        Ok(())
    }

    fn start_table(&mut self, table: &Table) -> RenderResult<()> {
        if table.columns.len() != table.head.len() {
            return Err(RenderError::Layout(format!(
                "table has {} headings but {} column definitions",
                table.head.len(),
                table.columns.len()
            )));
        }

        let widths = column_widths(&table.columns, A4_WIDTH_MM - 2.0 * TABLE_MARGIN)?;
        let page_bottom = A4_HEIGHT_MM - BOTTOM_RESERVE;

        let mut y = self.draw_table_head(table, &widths, table.start_y);

        for (index, row) in table.body.iter().enumerate() {
            let cells: Vec<Vec<String>> = row
                .iter()
                .zip(&widths)
                .zip(&table.columns)
                .map(|((text, width), column)| {
                    let weight = if column.bold {
                        FontWeight::Bold
                    } else {
                        FontWeight::Normal
                    };
                    wrap_text(
                        text,
                        width - 2.0 * table.cell_padding,
                        table.font_size,
                        weight,
                    )
                })
                .collect();
            let height = row_height(&cells, table.font_size, table.cell_padding);

            if y + height > page_bottom {
                self.new_page();
                debug!(page = self.pages.len(), "Table continues on a new page");
                y = self.draw_table_head(table, &widths, CONTINUATION_TOP);
            }

            let page = self.pages.len() - 1;
            if let Some(stripe) = table.stripe_fill {
                if index % 2 == 1 {
                    let total: f32 = widths.iter().sum();
                    self.push_rect(
                        page,
                        Rect::new(TABLE_MARGIN, y, total, height),
                        &RectStyle::filled(stripe),
                    );
                }
            }

            let mut x = TABLE_MARGIN;
            for ((lines, width), column) in cells.iter().zip(&widths).zip(&table.columns) {
                let mut style = TextStyle::new(table.font_size).color(Color::SLATE_800);
                if column.bold {
                    style = style.bold();
                }
                let anchor = match column.align {
                    Align::Left => x + table.cell_padding,
                    Align::Center => x + width / 2.0,
                    Align::Right => x + width - table.cell_padding,
                };
                style = style.align(column.align);

                // Vertically centre shorter cells in the row
                let content = lines.len() as f32 * line_height(table.font_size);
                let offset = (height - 2.0 * table.cell_padding - content) / 2.0;
                for (i, line) in lines.iter().enumerate() {
                    let baseline = first_baseline(y + offset, table.font_size, table.cell_padding)
                        + i as f32 * line_height(table.font_size);
                    self.push_text(page, line, anchor, baseline, &style);
                }
                x += width;
            }

            y += height;
        }

        Ok(())
    }

    fn add_footer_on_each_page(&mut self, footer: Footer) {
        self.footers.push(footer);
    }

    fn finish(&mut self) -> RenderResult<Vec<u8>> {
        self.emit_footers();
        let bytes = self.build()?;
        debug!(pages = self.pages.len(), bytes = bytes.len(), "Encoded PDF");
        Ok(bytes)
    }
}

fn push_stroke(ops: &mut Vec<Operation>, stroke: Stroke) {
    let (r, g, b) = stroke.color.unit();
    ops.push(Operation::new("RG", vec![real(r), real(g), real(b)]));
    ops.push(Operation::new("w", vec![pt(stroke.width)]));
}

fn check_point(x: f32, y: f32) -> RenderResult<()> {
    let inside = (0.0..=A4_WIDTH_MM).contains(&x) && (0.0..=A4_HEIGHT_MM).contains(&y);
    if inside {
        Ok(())
    } else {
        Err(RenderError::Layout(format!(
            "point ({:.1}, {:.1}) mm is outside the page",
            x, y
        )))
    }
}

/// Split `available` width between columns without a fixed width
fn column_widths(columns: &[super::Column], available: f32) -> RenderResult<Vec<f32>> {
    let fixed: f32 = columns.iter().filter_map(|c| c.width).sum();
    let flexible = columns.iter().filter(|c| c.width.is_none()).count();
    let remaining = available - fixed;

    if remaining < 0.0 || (flexible > 0 && remaining <= 0.0) {
        return Err(RenderError::Layout(format!(
            "fixed column widths ({:.1} mm) exceed the page ({:.1} mm)",
            fixed, available
        )));
    }

    let share = if flexible > 0 {
        remaining / flexible as f32
    } else {
        0.0
    };
    Ok(columns.iter().map(|c| c.width.unwrap_or(share)).collect())
}

fn line_height(font_size: f32) -> f32 {
    font_size * LINE_SPACING / PT_PER_MM
}

fn row_height(cells: &[Vec<String>], font_size: f32, padding: f32) -> f32 {
    let lines = cells.iter().map(|c| c.len().max(1)).max().unwrap_or(1);
    lines as f32 * line_height(font_size) + 2.0 * padding
}

/// Baseline of the first text line in a cell whose top edge is `top`
fn first_baseline(top: f32, font_size: f32, padding: f32) -> f32 {
    // Cap height of Helvetica is roughly 0.72 em
    top + padding + (line_height(font_size) + font_size * 0.72 / PT_PER_MM) / 2.0
}

/// Approximate Helvetica advance width, in 1/1000 em
fn glyph_width(c: char) -> f32 {
    match c {
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' | 'i' | 'j' | 'l' | 'I' => 278.0,
        'f' | 't' | 'r' | '(' | ')' | '-' | '/' => 333.0,
        'm' | 'M' => 833.0,
        'w' => 722.0,
        'W' => 944.0,
        '0'..='9' => 556.0,
        c if c.is_uppercase() => 680.0,
        _ => 540.0,
    }
}

/// Approximate rendered width of `text` in mm
pub(crate) fn text_width(text: &str, size: f32, weight: FontWeight) -> f32 {
    let em: f32 = text.chars().map(glyph_width).sum::<f32>() / 1000.0;
    let bold = match weight {
        FontWeight::Normal => 1.0,
        FontWeight::Bold => 1.06,
    };
    em * size * bold / PT_PER_MM
}

/// Break `text` into lines no wider than `max_width` mm
///
/// Words longer than a line are split by character.
pub(crate) fn wrap_text(text: &str, max_width: f32, size: f32, weight: FontWeight) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if text_width(&candidate, size, weight) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, size, weight) <= max_width {
            current = word.to_string();
        } else {
            for c in word.chars() {
                let mut next = current.clone();
                next.push(c);
                if !current.is_empty() && text_width(&next, size, weight) > max_width {
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                } else {
                    current = next;
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Latin-1 bytes for the WinAnsi-encoded standard fonts
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

fn pt(mm: f32) -> Object {
    real(mm * PT_PER_MM)
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Column;

    fn table(rows: usize) -> Table {
        Table {
            start_y: 30.0,
            head: vec!["A".to_string(), "B".to_string()],
            body: (0..rows)
                .map(|i| vec![format!("row {}", i), "value".to_string()])
                .collect(),
            columns: vec![
                Column::default(),
                Column {
                    width: Some(40.0),
                    align: Align::Center,
                    bold: false,
                },
            ],
            font_size: 8.0,
            head_font_size: 9.0,
            head_fill: Color::SLATE_800,
            stripe_fill: Some(Color::SLATE_50),
            cell_padding: 1.5,
        }
    }

    #[test]
    fn test_finish_produces_loadable_pdf() {
        let mut canvas = PdfCanvas::a4();
        canvas
            .draw_text("Olá, condomínio", 20.0, 20.0, &TextStyle::new(12.0))
            .unwrap();
        canvas
            .draw_rect(
                Rect::new(10.0, 10.0, 50.0, 20.0),
                &RectStyle::outline(Stroke::new(0.5, Color::BLACK)),
            )
            .unwrap();

        let bytes = canvas.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_table_paginates_with_footer_on_every_page() {
        let mut canvas = PdfCanvas::a4();
        canvas.add_footer_on_each_page(Footer {
            text: Box::new(|page| format!("PAGE {}", page)),
            baseline_from_bottom: 10.0,
            style: TextStyle::new(7.0).align(Align::Center),
            rule: Some((15.0, Stroke::new(0.1, Color::SLATE_300))),
            margin: 20.0,
        });

        canvas.start_table(&table(150)).unwrap();
        assert!(canvas.page_count() > 1);

        let pages = canvas.page_count();
        let bytes = canvas.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), pages);
    }

    #[test]
    fn test_short_table_fits_one_page() {
        let mut canvas = PdfCanvas::a4();
        canvas.start_table(&table(5)).unwrap();
        assert_eq!(canvas.page_count(), 1);
    }

    #[test]
    fn test_rejects_points_off_the_page() {
        let mut canvas = PdfCanvas::a4();
        let err = canvas
            .draw_text("x", 250.0, 10.0, &TextStyle::new(10.0))
            .unwrap_err();
        assert!(matches!(err, RenderError::Layout(_)));
    }

    #[test]
    fn test_rejects_mismatched_columns() {
        let mut canvas = PdfCanvas::a4();
        let mut bad = table(1);
        bad.columns.pop();
        assert!(matches!(
            canvas.start_table(&bad),
            Err(RenderError::Layout(_))
        ));
    }

    #[test]
    fn test_column_widths_share_remaining_space() {
        let columns = [
            Column::default(),
            Column {
                width: Some(50.0),
                ..Column::default()
            },
            Column::default(),
        ];
        let widths = column_widths(&columns, 150.0).unwrap();
        assert_eq!(widths, vec![50.0, 50.0, 50.0]);

        let too_wide = [Column {
            width: Some(300.0),
            ..Column::default()
        }];
        assert!(column_widths(&too_wide, 150.0).is_err());
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let text = "CARLOS PINTOR, JOAO PEDREIRO, MARIA ELETRICISTA, JOSE ENCANADOR";
        let lines = wrap_text(text, 40.0, 8.0, FontWeight::Normal);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 8.0, FontWeight::Normal) <= 40.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_text_splits_overlong_words() {
        let lines = wrap_text(&"A".repeat(80), 20.0, 8.0, FontWeight::Bold);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "A".repeat(80));
    }

    #[test]
    fn test_wrap_empty_text_yields_one_line() {
        assert_eq!(wrap_text("", 20.0, 8.0, FontWeight::Normal), vec![String::new()]);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Ação"), vec![b'A', 0xE7, 0xE3, b'o']);
        assert_eq!(encode_win_ansi("→"), vec![b'?']);
    }

    #[test]
    fn test_text_width_alignment_helpers() {
        let narrow = text_width("iii", 10.0, FontWeight::Normal);
        let wide = text_width("MMM", 10.0, FontWeight::Normal);
        assert!(wide > narrow);
        assert!(
            text_width("ABC", 10.0, FontWeight::Bold) > text_width("ABC", 10.0, FontWeight::Normal)
        );
    }
}
