use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::pulls::normalize::normalize;
use crate::pulls::record::{PullRequestRecord, Relation};

/// Raw batches fetched for one repository. One slot per repository.
#[derive(Debug, Clone, Default)]
pub struct RepoPulls {
    pub repository: String,
    pub authored: Vec<Value>,
    pub reviewed: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregated {
    pub records: Vec<PullRequestRecord>,
    /// Raw items dropped as malformed
    pub dropped: usize,
}

/// Normalize and merge every repository slot into one deduplicated sequence.
///
/// Within a repository the authored batch is normalized first, so when a PR
/// appears in both batches the authored record is the base of the merge and
/// its stats take precedence. Output keeps slot order, then first-seen order.
pub fn aggregate(slots: &[RepoPulls]) -> Aggregated {
    let mut aggregated = Aggregated::default();

    for slot in slots {
        let authored = normalize_batch(&slot.authored, &slot.repository, Relation::Authored);
        let reviewed = normalize_batch(&slot.reviewed, &slot.repository, Relation::Reviewed);
        aggregated.dropped += authored.dropped + reviewed.dropped;

        let merged = merge_by_key(authored.records, reviewed.records);
        aggregated.records.extend(merged);
    }

    aggregated
}

fn normalize_batch(items: &[Value], repository: &str, relation: Relation) -> Aggregated {
    let mut batch = Aggregated::default();
    for item in items {
        match normalize(item, repository, relation) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                warn!(repository, ?relation, "Dropping pull request: {}", e);
                batch.dropped += 1;
            }
        }
    }
    batch
}

/// Merge two normalized sets keyed by `(repository, number)`.
fn merge_by_key(
    authored: Vec<PullRequestRecord>,
    reviewed: Vec<PullRequestRecord>,
) -> Vec<PullRequestRecord> {
    let mut index: HashMap<(String, u64), usize> = HashMap::new();
    let mut merged: Vec<PullRequestRecord> = Vec::with_capacity(authored.len() + reviewed.len());

    for record in authored.into_iter().chain(reviewed) {
        match index.get(&record.key()) {
            Some(&pos) => {
                let combined = merged[pos].merged_with(&record);
                merged[pos] = combined;
            }
            None => {
                index.insert(record.key(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}
