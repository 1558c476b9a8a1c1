use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::pulls::{PrState, PrStats, PullRequestRecord};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate title to fit available width, accounting for Unicode
fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// "+120/-30 (4 files)", or "-" when size data is missing
pub fn format_stats(stats: Option<&PrStats>) -> String {
    match stats {
        Some(s) => format!("+{}/-{} ({} files)", s.additions, s.deletions, s.changed_files),
        None => "-".to_string(),
    }
}

fn paint_state(state: PrState, padded: &str) -> String {
    match state {
        PrState::Merged => padded.magenta().to_string(),
        PrState::Open => padded.green().to_string(),
        PrState::Closed => padded.red().to_string(),
    }
}

/// Format records as a table with columns: Index, State, Date, Ref, Relation,
/// optional Stats, Title. Titles are truncated to the terminal width.
pub fn format_record_table(
    records: &[PullRequestRecord],
    use_colors: bool,
    show_stats: bool,
) -> String {
    if records.is_empty() {
        return "No pull requests found.".to_string();
    }

    let term_width = get_terminal_width();
    let separator = "  ";
    let state_width = 6;
    let date_width = 10;
    let ref_width = records.iter().map(|r| r.short_ref().len()).max().unwrap_or(0);
    let relation_width = records.iter().map(|r| r.relation.label().len()).max().unwrap_or(0);
    let stats_width = if show_stats {
        records
            .iter()
            .map(|r| format_stats(r.stats.as_ref()).len())
            .max()
            .unwrap_or(0)
    } else {
        0
    };

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let index_str = format!("{:>3}.", idx + 1);
            let state = format!("{:<width$}", record.state.to_string(), width = state_width);
            let date = record.effective_date.format("%Y-%m-%d").to_string();
            let short_ref = format!("{:<width$}", record.short_ref(), width = ref_width);
            let relation = format!("{:<width$}", record.relation.label(), width = relation_width);
            let stats = if show_stats {
                format!(
                    "{:<width$}{}",
                    format_stats(record.stats.as_ref()),
                    separator,
                    width = stats_width
                )
            } else {
                String::new()
            };

            let fixed_width = 4
                + 1
                + state_width
                + date_width
                + ref_width
                + relation_width
                + if show_stats { stats_width + separator.len() } else { 0 }
                + separator.len() * 4;
            let title = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_title(&record.title, width - fixed_width)
                }
                // Very narrow terminal, show truncated
                Some(_) => truncate_title(&record.title, 20),
                // No terminal (pipe), don't truncate
                None => record.title.clone(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    paint_state(record.state, &state),
                    separator,
                    date,
                    separator,
                    short_ref.underline(),
                    separator,
                    relation.cyan(),
                    separator,
                    stats.dimmed(),
                    title.bold()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}{}",
                    index_str,
                    state,
                    separator,
                    date,
                    separator,
                    short_ref,
                    separator,
                    relation,
                    separator,
                    stats,
                    title
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format records as tab-separated values for scripting
/// Columns: state, date, repo, number, relation, additions, deletions,
/// changed_files, title, url (no headers, no colors). Missing stats are empty.
pub fn format_tsv(records: &[PullRequestRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    records
        .iter()
        .map(|record| {
            let (additions, deletions, changed_files) = match record.stats {
                Some(s) => (
                    s.additions.to_string(),
                    s.deletions.to_string(),
                    s.changed_files.to_string(),
                ),
                None => (String::new(), String::new(), String::new()),
            };
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                record.state.as_str(),
                record.effective_date.format("%Y-%m-%d"),
                record.repository,
                record.number,
                record.relation.label(),
                additions,
                deletions,
                changed_files,
                record.title.replace(['\t', '\n'], " "),
                record.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line count summary: "5 PRs: 3 merged, 1 open, 1 closed"
pub fn format_summary(records: &[PullRequestRecord]) -> String {
    let count = |state: PrState| records.iter().filter(|r| r.state == state).count();
    format!(
        "{} PR{}: {} merged, {} open, {} closed",
        records.len(),
        if records.len() == 1 { "" } else { "s" },
        count(PrState::Merged),
        count(PrState::Open),
        count(PrState::Closed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulls::{Relation, Relations};
    use chrono::{TimeZone, Utc};

    fn sample_record() -> PullRequestRecord {
        let created = Utc.with_ymd_and_hms(2024, 12, 3, 10, 0, 0).unwrap();
        PullRequestRecord {
            number: 123,
            repository: "owner/repo".to_string(),
            title: "Fix login bug".to_string(),
            state: PrState::Merged,
            url: "https://github.com/owner/repo/pull/123".to_string(),
            author: Some("octocat".to_string()),
            created_at: created,
            merged_at: Some(created),
            effective_date: created,
            description: String::new(),
            relation: Relations::single(Relation::Authored),
            stats: Some(PrStats {
                commits: 2,
                additions: 50,
                deletions: 10,
                changed_files: 3,
            }),
        }
    }

    // truncate_title tests
    #[test]
    fn test_truncate_title_short() {
        assert_eq!(truncate_title("Short title", 20), "Short title");
    }

    #[test]
    fn test_truncate_title_long() {
        assert_eq!(truncate_title("This is a very long title", 15), "This is a ve...");
    }

    #[test]
    fn test_truncate_title_unicode() {
        // By char, not by byte
        assert_eq!(truncate_title("Grüße aus Köln", 14), "Grüße aus Köln");
        assert_eq!(truncate_title("Grüße aus Köln und Bonn", 10), "Grüße a...");
    }

    #[test]
    fn test_truncate_title_very_narrow() {
        assert_eq!(truncate_title("Hello world", 3), "Hel");
    }

    #[test]
    fn test_format_stats() {
        let record = sample_record();
        assert_eq!(format_stats(record.stats.as_ref()), "+50/-10 (3 files)");
        assert_eq!(format_stats(None), "-");
    }

    #[test]
    fn test_format_record_table_empty() {
        assert_eq!(format_record_table(&[], false, true), "No pull requests found.");
    }

    #[test]
    fn test_format_record_table_columns() {
        let mut second = sample_record();
        second.number = 7;
        second.state = PrState::Open;
        second.title = "Add feature".to_string();
        second.relation = Relations::single(Relation::Authored).union(&Relations::single(Relation::Reviewed));
        second.stats = None;

        let result = format_record_table(&[sample_record(), second], false, true);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1. MERGED"));
        assert!(lines[0].contains("2024-12-03"));
        assert!(lines[0].contains("owner/repo#123"));
        assert!(lines[0].contains("+50/-10 (3 files)"));
        assert!(lines[0].contains("Fix login bug"));
        assert!(lines[1].starts_with("  2. OPEN"));
        assert!(lines[1].contains("authored+reviewed"));
        assert!(lines[1].contains("Add feature"));
    }

    #[test]
    fn test_format_record_table_without_stats() {
        let result = format_record_table(&[sample_record()], false, false);
        assert!(!result.contains("files"));
        assert!(result.contains("Fix login bug"));
    }

    #[test]
    fn test_format_tsv_empty() {
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_format_tsv_single() {
        assert_eq!(
            format_tsv(&[sample_record()]),
            "merged\t2024-12-03\towner/repo\t123\tauthored\t50\t10\t3\tFix login bug\thttps://github.com/owner/repo/pull/123"
        );
    }

    #[test]
    fn test_format_tsv_missing_stats_and_tabs_in_title() {
        let mut record = sample_record();
        record.stats = None;
        record.title = "Tabs\tand\nnewlines".to_string();
        let line = format_tsv(&[record]);
        assert_eq!(line.split('\t').count(), 10);
        assert!(line.contains("\t\t\t\tTabs and newlines\t"));
    }

    #[test]
    fn test_format_summary() {
        let mut open = sample_record();
        open.state = PrState::Open;
        assert_eq!(
            format_summary(&[sample_record(), open]),
            "2 PRs: 1 merged, 1 open, 0 closed"
        );
        assert_eq!(format_summary(&[sample_record()]), "1 PR: 1 merged, 0 open, 0 closed");
    }
}
