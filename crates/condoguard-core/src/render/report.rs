//! Periodic report
//!
//! A titled, multi-page table of residents. Which residents appear is the
//! caller's decision; see `query::within_report_window`.

use crate::config::Config;
use crate::models::Resident;

use super::{
    Align, Canvas, Color, Column, Footer, RenderResult, Stroke, Table, TextStyle,
    REPORT_FILE_NAME,
};

/// Column headings, in order
pub const REPORT_COLUMNS: [&str; 6] = ["MORADOR", "CASA", "INÍCIO", "FIM", "STATUS", "PRESTADORES"];

/// Texts and placement for the report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    /// Appended to the page number in every footer
    pub footer: String,
    pub file_name: String,
    /// Top of the table on the first page, in mm
    pub table_top: f32,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            title: "RELATÓRIO SEMESTRAL DE OBRAS E SERVIÇOS".to_string(),
            footer: Config::default().footer_text,
            file_name: REPORT_FILE_NAME.to_string(),
            table_top: 30.0,
        }
    }
}

impl ReportLayout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            footer: config.footer_text.clone(),
            ..Self::default()
        }
    }
}

/// One table row per resident
pub fn report_rows(residents: &[Resident]) -> Vec<Vec<String>> {
    residents
        .iter()
        .map(|r| {
            vec![
                r.name.to_uppercase(),
                r.house_number.clone(),
                r.start_date.clone(),
                r.end_date.clone(),
                r.status.as_str().to_uppercase(),
                r.provider_names().join(", "),
            ]
        })
        .collect()
}

/// Draw the report; the canvas paginates the table
pub fn render_report(
    canvas: &mut impl Canvas,
    residents: &[Resident],
    generated_at: &str,
    layout: &ReportLayout,
) -> RenderResult<()> {
    let center = canvas.page_width() / 2.0;

    let footer_text = layout.footer.clone();
    canvas.add_footer_on_each_page(Footer {
        text: Box::new(move |page| format!("PÁGINA {}   |   {}", page, footer_text).to_uppercase()),
        baseline_from_bottom: 10.0,
        style: TextStyle::new(7.0)
            .bold()
            .color(Color::SLATE_600)
            .align(Align::Center),
        rule: Some((15.0, Stroke::new(0.1, Color::SLATE_300))),
        margin: 20.0,
    });

    canvas.draw_text(
        &layout.title,
        center,
        15.0,
        &TextStyle::new(18.0).bold().align(Align::Center),
    )?;
    canvas.draw_text(
        &format!("Gerado em: {}", generated_at),
        center,
        22.0,
        &TextStyle::new(9.0)
            .color(Color::SLATE_500)
            .align(Align::Center),
    )?;

    let table = Table {
        start_y: layout.table_top,
        head: REPORT_COLUMNS.iter().map(|h| h.to_string()).collect(),
        body: report_rows(residents),
        columns: vec![
            Column {
                bold: true,
                ..Column::default()
            },
            Column {
                align: Align::Center,
                width: Some(16.0),
                ..Column::default()
            },
            Column {
                width: Some(22.0),
                ..Column::default()
            },
            Column {
                width: Some(22.0),
                ..Column::default()
            },
            Column {
                align: Align::Center,
                width: Some(24.0),
                ..Column::default()
            },
            Column {
                width: Some(50.0),
                ..Column::default()
            },
        ],
        font_size: 8.0,
        head_font_size: 9.0,
        head_fill: Color::SLATE_800,
        stripe_fill: Some(Color::SLATE_50),
        cell_padding: 1.5,
    };
    canvas.start_table(&table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResidentStatus, ServiceProvider};
    use crate::render::testing::{DrawOp, RecordingCanvas};

    fn resident(name: &str, status: ResidentStatus, providers: &[&str]) -> Resident {
        Resident {
            id: "1".to_string(),
            name: name.to_string(),
            house_number: "12".to_string(),
            phone: String::new(),
            start_date: "2026-01-01".to_string(),
            end_date: "2026-03-01".to_string(),
            status,
            providers: providers
                .iter()
                .map(|n| ServiceProvider::new(*n, "doc"))
                .collect(),
            created_at: 0,
            observations: None,
        }
    }

    #[test]
    fn test_rows_are_uppercased_and_joined() {
        let rows = report_rows(&[resident(
            "ana",
            ResidentStatus::Inactive,
            &["carlos", "", "bia"],
        )]);

        assert_eq!(
            rows[0],
            vec![
                "ANA".to_string(),
                "12".to_string(),
                "2026-01-01".to_string(),
                "2026-03-01".to_string(),
                "DESATIVADO".to_string(),
                "CARLOS, BIA".to_string(),
            ]
        );
    }

    #[test]
    fn test_renders_title_table_and_footer() {
        let mut canvas = RecordingCanvas::new();
        let residents = vec![
            resident("ana", ResidentStatus::Active, &["carlos"]),
            resident("beto", ResidentStatus::Inactive, &[]),
        ];

        render_report(&mut canvas, &residents, "20/05/2026 10:00", &ReportLayout::default())
            .unwrap();

        assert_eq!(
            canvas.texts_containing("RELATÓRIO SEMESTRAL").len(),
            1
        );
        assert_eq!(canvas.texts_containing("Gerado em: 20/05/2026 10:00").len(), 1);

        let table = canvas
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Table(table) => Some(table.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(table.head.len(), 6);
        assert_eq!(table.columns.len(), 6);
        assert_eq!(table.body.len(), 2);
        assert_eq!(table.start_y, 30.0);

        let footer = canvas.footer_text(3).unwrap();
        assert!(footer.starts_with("PÁGINA 3"));
        assert!(footer.contains("CONDOGUARD PRO"));
    }

    #[test]
    fn test_empty_report_still_has_header_row() {
        let mut canvas = RecordingCanvas::new();
        render_report(&mut canvas, &[], "now", &ReportLayout::default()).unwrap();

        let tables: Vec<_> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Table(table) => Some(table),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 1);
        assert!(tables[0].body.is_empty());
        assert_eq!(tables[0].head[0], "MORADOR");
    }
}
