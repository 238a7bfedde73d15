//! Report assembly.
//!
//! A [`Report`] is a plain list of headings and paragraphs built from the
//! run log and the final tallies only, so identical runs yield identical
//! reports. Rendering to `.docx` and writing to disk live in [`docx`].

mod docx;

use std::path::{Path, PathBuf};

use instamon_core::{LineKind, RunLog};
use instamon_graph::Account;

use crate::error::ReportError;
use crate::matcher::KeywordTally;
use crate::monthly::MonthlyBuckets;

pub use self::docx::render_docx;

/// File name used by every monthly-indicator report.
pub const MONTHLY_REPORT_FILE_NAME: &str = "relatorio_indicadores_mensais.docx";

const KEYWORD_FILE_PREFIX: &str = "relatorio_instagram_";
const KEYWORD_REPORT_TITLE: &str = "Instagram Comment Monitoring";
const MONTHLY_REPORT_TITLE: &str = "Instagram Monthly Indicators";
const SUMMARY_HEADING: &str = "Final analysis";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
}

/// Document content, independent of the output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub blocks: Vec<Block>,
    pub file_name: String,
}

impl Report {
    /// Renders the report and writes it to `dir/{file_name}` in one write.
    ///
    /// Nothing is written if rendering fails.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Docx`] if the document cannot be packed, or
    /// [`ReportError::Io`] if the file cannot be written.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, usize), ReportError> {
        let bytes = render_docx(self)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &bytes).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "report written");
        Ok((path, bytes.len()))
    }
}

pub struct ReportBuilder;

impl ReportBuilder {
    /// Keyword report: the run log in order, with every post-section line
    /// promoted to a heading, followed by one summary line per keyword.
    #[must_use]
    pub fn keyword_report(log: &RunLog, tally: &KeywordTally) -> Report {
        let mut blocks: Vec<Block> = log
            .lines()
            .iter()
            .map(|line| match line.kind {
                LineKind::Section => Block::Heading {
                    level: 2,
                    text: line.text.clone(),
                },
                LineKind::Info | LineKind::Warning => Block::Paragraph(line.text.clone()),
            })
            .collect();

        blocks.push(Block::Heading {
            level: 2,
            text: SUMMARY_HEADING.to_string(),
        });
        blocks.extend(
            tally
                .entries()
                .iter()
                .map(|entry| Block::Paragraph(tally.summary_line(entry))),
        );

        let keywords: Vec<&str> = tally.entries().iter().map(|e| e.keyword.as_str()).collect();
        Report {
            title: KEYWORD_REPORT_TITLE.to_string(),
            blocks,
            file_name: keyword_file_name(&keywords),
        }
    }

    /// Monthly report: account header, then one paragraph per month, oldest
    /// first.
    #[must_use]
    pub fn monthly_report(account: &Account, buckets: &MonthlyBuckets) -> Report {
        let name = account.username.as_deref().unwrap_or(&account.id);
        let mut blocks = vec![Block::Paragraph(format!(
            "Account: {name} ({} followers)",
            account.followers_count
        ))];

        if buckets.is_empty() {
            blocks.push(Block::Paragraph("No posts in the selected period.".to_string()));
        }
        blocks.extend(
            buckets
                .iter()
                .map(|(month, totals)| Block::Paragraph(MonthlyBuckets::describe(month, totals))),
        );

        Report {
            title: MONTHLY_REPORT_TITLE.to_string(),
            blocks,
            file_name: MONTHLY_REPORT_FILE_NAME.to_string(),
        }
    }
}

/// `relatorio_instagram_{kw1}_{kw2}.docx`, with `&` and path separators in
/// each keyword replaced by `_`.
#[must_use]
pub fn keyword_file_name(keywords: &[&str]) -> String {
    let joined = keywords
        .iter()
        .map(|k| k.replace(['&', '/', '\\'], "_"))
        .collect::<Vec<_>>()
        .join("_");
    format!("{KEYWORD_FILE_PREFIX}{joined}.docx")
}
