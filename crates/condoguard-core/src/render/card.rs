//! Resident authorization card
//!
//! One A4 page carrying two identical copies of the card, so it can be cut
//! in half and handed out twice (gate and resident).

use crate::config::Config;
use crate::models::Resident;

use super::{Align, Canvas, Color, Rect, RectStyle, RenderResult, Stroke, TextStyle};

/// Fixed layout of the card, in mm
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    /// Top edge of each copy
    pub copy_offsets: Vec<f32>,
    pub left: f32,
    pub width: f32,
    pub height: f32,
    pub border_width: f32,
    pub header_height: f32,
    /// Height of each provider row
    pub provider_row_height: f32,
    /// Distance from the card top to the signature line
    pub signature_offset: f32,
    /// Title in the header bar
    pub title: String,
    /// Small line in the top-right corner and centred footer
    pub footer: String,
}

impl Default for CardLayout {
    fn default() -> Self {
        let config = Config::default();
        Self {
            copy_offsets: vec![5.0, 150.0],
            left: 10.0,
            width: 190.0,
            height: 135.0,
            border_width: 3.0,
            header_height: 14.0,
            provider_row_height: 11.0,
            signature_offset: 125.0,
            title: config.card_title,
            footer: config.footer_text,
        }
    }
}

impl CardLayout {
    /// Default geometry with the configured texts
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.card_title.clone(),
            footer: config.footer_text.clone(),
            ..Self::default()
        }
    }

    fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    fn right(&self) -> f32 {
        self.left + self.width
    }
}

/// Draw both copies of `resident`'s card on the current page
pub fn render_card(
    canvas: &mut impl Canvas,
    resident: &Resident,
    issued_at: &str,
    layout: &CardLayout,
) -> RenderResult<()> {
    for &top in &layout.copy_offsets {
        draw_copy(canvas, resident, issued_at, layout, top)?;
    }
    Ok(())
}

fn draw_copy(
    canvas: &mut impl Canvas,
    resident: &Resident,
    issued_at: &str,
    layout: &CardLayout,
    top: f32,
) -> RenderResult<()> {
    let left = layout.left;
    let right = layout.right();
    let center = layout.center_x();
    let inner_left = left + 5.0;
    let inner_right = right - 5.0;
    let inner_width = inner_right - inner_left;

    // Frame
    canvas.draw_rect(
        Rect::new(left, top, layout.width, layout.height),
        &RectStyle::outline(Stroke::new(layout.border_width, Color::SLATE_800)),
    )?;

    // Header bar, inset so it does not cover the frame
    canvas.draw_rect(
        Rect::new(
            left + 0.6,
            top + 0.6,
            layout.width - 1.2,
            layout.header_height,
        ),
        &RectStyle::filled(Color::SLATE_100),
    )?;
    canvas.draw_text(
        &layout.footer,
        inner_right,
        top + 4.0,
        &TextStyle::new(6.0)
            .color(Color::SLATE_600)
            .align(Align::Right),
    )?;
    canvas.draw_text(
        &layout.title,
        center,
        top + 10.0,
        &TextStyle::new(14.0).bold().align(Align::Center),
    )?;
    canvas.draw_line(
        (left, top + layout.header_height + 1.0),
        (right, top + layout.header_height + 1.0),
        Stroke::new(0.5, Color::SLATE_800),
    )?;

    // Resident section
    canvas.draw_text(
        "DADOS DO MORADOR / OBRA",
        inner_left,
        top + 22.0,
        &TextStyle::new(11.0).bold(),
    )?;

    let body = TextStyle::new(10.0);
    let name = if resident.name.is_empty() {
        "---".to_string()
    } else {
        resident.name.to_uppercase()
    };
    let column_two = left + 100.0;
    canvas.draw_text(&format!("Morador: {}", name), inner_left, top + 28.0, &body)?;
    canvas.draw_text(
        &format!("Casa: {}", resident.house_number),
        inner_left,
        top + 34.0,
        &body,
    )?;
    canvas.draw_text(
        &format!("Telefone: {}", resident.phone),
        inner_left,
        top + 40.0,
        &body,
    )?;
    canvas.draw_text(
        &format!("Início da Obra: {}", resident.start_date),
        column_two,
        top + 34.0,
        &body,
    )?;
    canvas.draw_text(
        &format!("Previsão de Fim: {}", resident.end_date),
        column_two,
        top + 40.0,
        &body,
    )?;
    canvas.draw_line(
        (inner_left, top + 45.0),
        (inner_right, top + 45.0),
        Stroke::new(0.2, Color::SLATE_300),
    )?;

    // Providers
    canvas.draw_text(
        "PRESTADORES DE SERVIÇO AUTORIZADOS",
        center,
        top + 51.0,
        &TextStyle::new(10.0)
            .bold()
            .color(Color::SLATE_700)
            .align(Align::Center),
    )?;

    let table_top = top + 55.0;
    let head_height = 7.0;
    canvas.draw_rect(
        Rect::new(inner_left, table_top, inner_width, head_height),
        &RectStyle {
            stroke: Some(Stroke::new(0.5, Color::SLATE_800)),
            fill: Some(Color::SLATE_50),
        },
    )?;
    let head = TextStyle::new(9.0).bold().color(Color::SLATE_700);
    let document_x = left + 100.0;
    canvas.draw_text("NOME COMPLETO", inner_left + 5.0, table_top + 5.0, &head)?;
    canvas.draw_text("DOCUMENTO (CPF/RG)", document_x, table_top + 5.0, &head)?;

    let cell = TextStyle::new(9.0).color(Color::SLATE_700);
    let rows_top = table_top + head_height;
    // Rows stop above the signature line
    let max_rows =
        ((layout.signature_offset - 8.0 - (rows_top - top)) / layout.provider_row_height) as usize;
    // The last row gives way to a count of the providers that do not fit
    let shown = if resident.providers.len() > max_rows {
        max_rows.saturating_sub(1)
    } else {
        resident.providers.len()
    };
    for (i, provider) in resident.providers.iter().take(shown).enumerate() {
        let row_y = rows_top + i as f32 * layout.provider_row_height;
        canvas.draw_rect(
            Rect::new(inner_left, row_y, inner_width, layout.provider_row_height),
            &RectStyle::outline(Stroke::new(0.3, Color::SLATE_800)),
        )?;
        let provider_name = if provider.name.is_empty() {
            "---".to_string()
        } else {
            provider.name.to_uppercase()
        };
        let document = if provider.document.is_empty() {
            "---"
        } else {
            provider.document.as_str()
        };
        canvas.draw_text(&provider_name, inner_left + 5.0, row_y + 7.0, &cell)?;
        canvas.draw_text(document, document_x, row_y + 7.0, &cell)?;
    }
    let hidden = resident.providers.len() - shown;
    if hidden > 0 {
        let row_y = rows_top + shown as f32 * layout.provider_row_height;
        canvas.draw_text(
            &format!("+{} PRESTADORES", hidden),
            inner_left + 5.0,
            row_y + 7.0,
            &cell.bold(),
        )?;
    }

    // Signature and issuance
    let sig_y = top + layout.signature_offset;
    canvas.draw_line(
        (right - 80.0, sig_y),
        (right - 10.0, sig_y),
        Stroke::new(0.3, Color::SLATE_800),
    )?;
    let small = TextStyle::new(7.0).color(Color::SLATE_700);
    canvas.draw_text(
        "ASSINATURA DO RESPONSÁVEL / SEGURANÇA",
        right - 45.0,
        sig_y + 4.0,
        &small.align(Align::Center),
    )?;
    canvas.draw_text(
        &format!("Emitido em: {}", issued_at),
        inner_left,
        sig_y + 4.0,
        &small,
    )?;

    canvas.draw_text(
        &layout.footer.to_uppercase(),
        center,
        top + layout.height - 3.0,
        &TextStyle::new(7.0)
            .bold()
            .color(Color::SLATE_600)
            .align(Align::Center),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResidentStatus, ServiceProvider};
    use crate::render::testing::{DrawOp, RecordingCanvas};

    fn resident() -> Resident {
        Resident {
            id: "12".to_string(),
            name: "ana souza".to_string(),
            house_number: "42".to_string(),
            phone: "(34) 99999-0000".to_string(),
            start_date: "2026-05-01".to_string(),
            end_date: "2026-08-01".to_string(),
            status: ResidentStatus::Active,
            providers: vec![
                ServiceProvider::new("carlos pintor", "123.456.789-00"),
                ServiceProvider::new("", "RG 99"),
            ],
            created_at: 0,
            observations: None,
        }
    }

    #[test]
    fn test_draws_two_identical_copies() {
        let mut canvas = RecordingCanvas::new();
        render_card(&mut canvas, &resident(), "20/05/2026 10:00", &CardLayout::default())
            .unwrap();

        let frames: Vec<_> = canvas
            .rects()
            .into_iter()
            .filter(|(rect, _)| rect.width == 190.0 && rect.height == 135.0)
            .map(|(rect, _)| rect.y)
            .collect();
        assert_eq!(frames, vec![5.0, 150.0]);

        let names = canvas.texts_containing("Morador: ANA SOUZA");
        assert_eq!(names.len(), 2);
        assert_eq!(names[1].1 - names[0].1, 145.0);
    }

    #[test]
    fn test_provider_rows_with_placeholders() {
        let mut canvas = RecordingCanvas::new();
        render_card(&mut canvas, &resident(), "now", &CardLayout::default()).unwrap();

        assert_eq!(canvas.texts_containing("CARLOS PINTOR").len(), 2);
        assert_eq!(canvas.texts_containing("123.456.789-00").len(), 2);
        // The unnamed provider prints a placeholder next to its document
        let placeholders = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { text, .. } if text == "---"))
            .count();
        assert_eq!(placeholders, 2);

        let row_boxes = canvas
            .rects()
            .into_iter()
            .filter(|(rect, _)| rect.height == 11.0)
            .count();
        assert_eq!(row_boxes, 4);
    }

    #[test]
    fn test_shows_window_phone_and_issuance() {
        let mut canvas = RecordingCanvas::new();
        render_card(&mut canvas, &resident(), "20/05/2026 10:00", &CardLayout::default())
            .unwrap();

        assert_eq!(canvas.texts_containing("Início da Obra: 2026-05-01").len(), 2);
        assert_eq!(canvas.texts_containing("Previsão de Fim: 2026-08-01").len(), 2);
        assert_eq!(canvas.texts_containing("Telefone: (34) 99999-0000").len(), 2);
        assert_eq!(canvas.texts_containing("Emitido em: 20/05/2026 10:00").len(), 2);
        assert_eq!(canvas.texts_containing("ASSINATURA").len(), 2);
    }

    #[test]
    fn test_empty_name_uses_placeholder() {
        let mut empty = resident();
        empty.name.clear();
        empty.providers.clear();

        let mut canvas = RecordingCanvas::new();
        render_card(&mut canvas, &empty, "now", &CardLayout::default()).unwrap();

        assert_eq!(canvas.texts_containing("Morador: ---").len(), 2);
    }

    #[test]
    fn test_provider_rows_stay_above_signature() {
        let mut crowded = resident();
        crowded.providers = (0..20)
            .map(|i| ServiceProvider::new(format!("p{}", i), "doc"))
            .collect();

        let mut canvas = RecordingCanvas::new();
        let layout = CardLayout::default();
        render_card(&mut canvas, &crowded, "now", &layout).unwrap();

        for (rect, _) in canvas.rects() {
            if rect.height == layout.provider_row_height {
                let copy_top = if rect.y < 150.0 { 5.0 } else { 150.0 };
                assert!(rect.y + rect.height <= copy_top + layout.signature_offset);
            }
        }
    }

    #[test]
    fn test_overflowing_providers_are_counted() {
        let mut crowded = resident();
        crowded.providers = (0..7)
            .map(|i| ServiceProvider::new(format!("p{}", i), "doc"))
            .collect();

        let mut canvas = RecordingCanvas::new();
        render_card(&mut canvas, &crowded, "now", &CardLayout::default()).unwrap();

        // Four rows per copy, the fifth holds the count
        assert_eq!(canvas.texts_containing("P3").len(), 2);
        assert!(canvas.texts_containing("P4").is_empty());
        assert_eq!(canvas.texts_containing("+3 PRESTADORES").len(), 2);
    }

    #[test]
    fn test_full_provider_table_has_no_count() {
        let mut full = resident();
        full.providers = (0..5)
            .map(|i| ServiceProvider::new(format!("p{}", i), "doc"))
            .collect();

        let mut canvas = RecordingCanvas::new();
        render_card(&mut canvas, &full, "now", &CardLayout::default()).unwrap();

        assert_eq!(canvas.texts_containing("P4").len(), 2);
        assert!(canvas
            .texts_containing("PRESTADORES")
            .iter()
            .all(|(text, _)| !text.starts_with('+')));
    }

    #[test]
    fn test_layout_texts_come_from_config() {
        let config = Config {
            card_title: "PORTARIA".to_string(),
            footer_text: "Bloco B".to_string(),
            ..Config::default()
        };

        let mut canvas = RecordingCanvas::new();
        render_card(&mut canvas, &resident(), "now", &CardLayout::from_config(&config)).unwrap();

        assert_eq!(canvas.texts_containing("PORTARIA").len(), 2);
        assert_eq!(canvas.texts_containing("BLOCO B").len(), 2);
    }
}
