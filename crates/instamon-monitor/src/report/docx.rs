//! `.docx` rendering via `docx-rs`.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run, Style, StyleType};

use super::{Block, Report};
use crate::error::ReportError;

const TITLE_STYLE: &str = "Title";
const HEADING1_STYLE: &str = "Heading1";
const HEADING2_STYLE: &str = "Heading2";

// Sizes are in half-points.
const TITLE_SIZE: usize = 36;
const HEADING1_SIZE: usize = 32;
const HEADING2_SIZE: usize = 28;

/// Paragraph styles the report refers to. Names follow Word's built-in
/// heading styles so the headings show up in the navigation pane.
fn heading_styles() -> [Style; 3] {
    [
        Style::new(TITLE_STYLE, StyleType::Paragraph)
            .name("Title")
            .size(TITLE_SIZE)
            .bold(),
        Style::new(HEADING1_STYLE, StyleType::Paragraph)
            .name("heading 1")
            .size(HEADING1_SIZE)
            .bold(),
        Style::new(HEADING2_STYLE, StyleType::Paragraph)
            .name("heading 2")
            .size(HEADING2_SIZE)
            .bold(),
    ]
}

fn heading_style(level: u8) -> &'static str {
    if level <= 1 {
        HEADING1_STYLE
    } else {
        HEADING2_STYLE
    }
}

fn styled(text: &str, style: &str) -> Paragraph {
    Paragraph::new()
        .style(style)
        .add_run(Run::new().add_text(text))
}

/// Builds the in-memory document for `report`.
fn build(report: &Report) -> Docx {
    let mut doc = heading_styles()
        .into_iter()
        .fold(Docx::new(), Docx::add_style)
        .add_paragraph(styled(&report.title, TITLE_STYLE));

    for block in &report.blocks {
        let paragraph = match block {
            Block::Heading { level, text } => styled(text, heading_style(*level)),
            Block::Paragraph(text) => Paragraph::new().add_run(Run::new().add_text(text)),
        };
        doc = doc.add_paragraph(paragraph);
    }
    doc
}

/// Packs `report` into an in-memory `.docx` container.
///
/// # Errors
///
/// Returns [`ReportError::Docx`] if the zip container cannot be written.
pub fn render_docx(report: &Report) -> Result<Vec<u8>, ReportError> {
    let mut buf = Cursor::new(Vec::new());
    build(report)
        .build()
        .pack(&mut buf)
        .map_err(|e| ReportError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}
