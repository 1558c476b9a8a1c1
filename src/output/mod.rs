pub mod formatter;
pub mod html;
pub mod pdf;

pub use formatter::{format_record_table, format_stats, format_summary, format_tsv, should_use_colors};
pub use html::render_html;
pub use pdf::render_pdf;

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Descriptions longer than this many characters are cut in file reports
pub const DESCRIPTION_LIMIT: usize = 500;

/// How a report is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Html,
    Pdf,
}

impl OutputFormat {
    /// Report file written when no `--output` is given; `None` for stdout formats
    pub fn default_path(&self) -> Option<PathBuf> {
        match self {
            OutputFormat::Html => Some(PathBuf::from("pr-ledger.html")),
            OutputFormat::Pdf => Some(PathBuf::from("pr-ledger.pdf")),
            OutputFormat::Table | OutputFormat::Tsv => None,
        }
    }
}

pub(crate) fn truncate_description(description: &str) -> String {
    let mut chars = description.chars();
    let head: String = chars.by_ref().take(DESCRIPTION_LIMIT).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Write a report file atomically so a failed run never leaves a partial file
pub fn write_report(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_description() {
        let exact = "y".repeat(DESCRIPTION_LIMIT);
        assert_eq!(truncate_description(&exact), exact);

        let long = "é".repeat(DESCRIPTION_LIMIT + 1);
        let cut = truncate_description(&long);
        assert_eq!(cut.chars().count(), DESCRIPTION_LIMIT + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_default_paths() {
        assert_eq!(OutputFormat::Pdf.default_path(), Some(PathBuf::from("pr-ledger.pdf")));
        assert_eq!(OutputFormat::Html.default_path(), Some(PathBuf::from("pr-ledger.html")));
        assert_eq!(OutputFormat::Table.default_path(), None);
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        write_report(&path, b"<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}
