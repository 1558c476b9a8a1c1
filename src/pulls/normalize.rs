use serde_json::Value;
use thiserror::Error;

use crate::github::types::RawPullRequest;
use crate::pulls::record::{effective_date, PrState, PrStats, PullRequestRecord, Relation, Relations};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("malformed pull request record: {field}")]
    MalformedRecord { field: String },
}

fn malformed(field: &str) -> NormalizeError {
    NormalizeError::MalformedRecord {
        field: field.to_string(),
    }
}

/// Map one raw API item into the canonical record.
///
/// `number`, `created_at` and `state` are required. The merge timestamp is
/// read from the top level (listing shape) or from `pull_request` (search
/// shape); either one turns the state into `Merged`.
pub fn normalize(
    raw: &Value,
    repository: &str,
    relation: Relation,
) -> Result<PullRequestRecord, NormalizeError> {
    let parsed: RawPullRequest = serde_json::from_value(raw.clone())
        .map_err(|e| malformed(&format!("payload ({})", e)))?;
    normalize_raw(parsed, repository, relation)
}

pub fn normalize_raw(
    raw: RawPullRequest,
    repository: &str,
    relation: Relation,
) -> Result<PullRequestRecord, NormalizeError> {
    let number = raw.number.ok_or_else(|| malformed("number"))?;
    let created_at = raw.created_at.ok_or_else(|| malformed("created_at"))?;
    let raw_state = raw.state.as_deref().ok_or_else(|| malformed("state"))?;

    let merged_at = raw.merge_time();
    let state = match (merged_at, raw_state.to_ascii_lowercase().as_str()) {
        (Some(_), _) => PrState::Merged,
        (None, "open") => PrState::Open,
        (None, "closed") => PrState::Closed,
        (None, other) => return Err(malformed(&format!("state '{}'", other))),
    };

    let stats = match (raw.commits, raw.additions, raw.deletions, raw.changed_files) {
        (Some(commits), Some(additions), Some(deletions), Some(changed_files)) => Some(PrStats {
            commits,
            additions,
            deletions,
            changed_files,
        }),
        _ => None,
    };

    let url = raw
        .html_url
        .clone()
        .or_else(|| raw.pull_request.as_ref().and_then(|link| link.html_url.clone()))
        .unwrap_or_else(|| format!("https://github.com/{}/pull/{}", repository, number));

    Ok(PullRequestRecord {
        number,
        repository: repository.to_string(),
        title: raw.title.clone().unwrap_or_default(),
        state,
        url,
        author: raw.login().map(str::to_string),
        created_at,
        merged_at,
        effective_date: effective_date(created_at, merged_at),
        description: raw.body.unwrap_or_default(),
        relation: Relations::single(relation),
        stats,
    })
}
