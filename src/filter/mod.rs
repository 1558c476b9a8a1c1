pub mod dates;
pub mod options;

pub use dates::{last_full_month, parse_end, parse_start, resolve_range, DateParseError};
pub use options::{DateRange, FilterOptions, RelationFilter, SortOrder};

use std::cmp::Ordering;

use crate::pulls::{PrState, PullRequestRecord};

/// Whether a record passes every configured filter
pub fn matches(record: &PullRequestRecord, options: &FilterOptions) -> bool {
    options.date_range.contains(record.effective_date)
        && (options.statuses.is_empty() || options.statuses.contains(&record.state))
        && options.relation.matches(&record.relation)
}

/// Filter then order the records. The input is left untouched.
pub fn filter_and_sort(
    records: &[PullRequestRecord],
    options: &FilterOptions,
) -> Vec<PullRequestRecord> {
    let mut kept: Vec<PullRequestRecord> = records
        .iter()
        .filter(|record| matches(record, options))
        .cloned()
        .collect();

    kept.sort_by(|a, b| compare(a, b, options.sort));
    kept
}

fn status_rank(state: PrState) -> u8 {
    match state {
        PrState::Merged => 0,
        PrState::Open => 1,
        PrState::Closed => 2,
    }
}

fn compare(a: &PullRequestRecord, b: &PullRequestRecord, order: SortOrder) -> Ordering {
    let primary = match order {
        SortOrder::DateNewest => b.effective_date.cmp(&a.effective_date),
        SortOrder::DateOldest => a.effective_date.cmp(&b.effective_date),
        SortOrder::PrNumber => a
            .number
            .cmp(&b.number)
            .then_with(|| a.repository.cmp(&b.repository)),
        SortOrder::Status => status_rank(a.state)
            .cmp(&status_rank(b.state))
            .then_with(|| b.effective_date.cmp(&a.effective_date)),
    };

    // Deterministic output for equal keys
    primary
        .then_with(|| a.repository.cmp(&b.repository))
        .then_with(|| a.number.cmp(&b.number))
}
