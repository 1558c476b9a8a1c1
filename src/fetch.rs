use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::filter::filter_and_sort;
use crate::github::{fetch_authored, fetch_reviewed, ApiError, GitHubClient, Transport};
use crate::pulls::{aggregate, PullRequestRecord, RepoPulls};
use crate::request::{FetchRequest, RepoName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Authored,
    Reviewed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Authored => write!(f, "authored"),
            FetchPhase::Reviewed => write!(f, "reviewed"),
        }
    }
}

/// Which repository and which phase failed, and why
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{repository} ({phase} PRs): {source}")]
pub struct FetchError {
    pub repository: String,
    pub phase: FetchPhase,
    pub source: ApiError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub records: Vec<PullRequestRecord>,
    /// Recoverable failures; the records above are still valid
    pub failures: Vec<FetchError>,
    /// Raw items dropped as malformed
    pub dropped: usize,
}

impl Report {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Found(Report),
    /// Fetch succeeded but nothing survived the filters
    NoMatchingRecords {
        failures: Vec<FetchError>,
        dropped: usize,
    },
}

impl ReportOutcome {
    pub fn failures(&self) -> &[FetchError] {
        match self {
            ReportOutcome::Found(report) => &report.failures,
            ReportOutcome::NoMatchingRecords { failures, .. } => failures,
        }
    }

    pub fn records(&self) -> &[PullRequestRecord] {
        match self {
            ReportOutcome::Found(report) => &report.records,
            ReportOutcome::NoMatchingRecords { .. } => &[],
        }
    }
}

/// Result of both fetches for one repository
struct RepoFetch {
    pulls: RepoPulls,
    failure: Option<FetchError>,
}

/// Fetch the authored listing, then the reviewed search, for one repository.
///
/// An authored failure aborts the repository and the search is never sent.
/// A reviewed failure keeps the authored batch.
async fn fetch_repository<T: Transport>(
    client: &GitHubClient<T>,
    repo: &RepoName,
    username: &str,
) -> Result<RepoFetch, FetchError> {
    let repository = repo.to_string();

    let authored = fetch_authored(client, repo, username)
        .await
        .map_err(|source| FetchError {
            repository: repository.clone(),
            phase: FetchPhase::Authored,
            source,
        })?;

    let (reviewed, failure) = match fetch_reviewed(client, repo, username).await {
        Ok(reviewed) => (reviewed, None),
        Err(source) => {
            let failure = FetchError {
                repository: repository.clone(),
                phase: FetchPhase::Reviewed,
                source,
            };
            warn!("Reviewed PRs unavailable, keeping authored results: {}", failure);
            (Vec::<Value>::new(), Some(failure))
        }
    };

    Ok(RepoFetch {
        pulls: RepoPulls {
            repository,
            authored,
            reviewed,
        },
        failure,
    })
}

/// Fetch every repository in the request, then aggregate, filter and sort.
///
/// Repositories are fetched concurrently; results land in per-repository
/// slots so the output order follows the request order. Returns `Err` only
/// when every repository failed.
pub async fn fetch_report<T: Transport>(
    client: &GitHubClient<T>,
    request: &FetchRequest,
) -> Result<ReportOutcome, FetchError> {
    let mut slots: Vec<Option<RepoPulls>> = vec![None; request.repositories.len()];
    let mut failures: Vec<(usize, FetchError)> = Vec::new();

    let mut futures = FuturesUnordered::new();
    for (index, repo) in request.repositories.iter().enumerate() {
        let username = request.username.as_str();
        futures.push(async move { (index, fetch_repository(client, repo, username).await) });
    }

    while let Some((index, result)) = futures.next().await {
        match result {
            Ok(fetched) => {
                debug!(
                    repository = %fetched.pulls.repository,
                    authored = fetched.pulls.authored.len(),
                    reviewed = fetched.pulls.reviewed.len(),
                    "repository fetched"
                );
                if let Some(failure) = fetched.failure {
                    failures.push((index, failure));
                }
                slots[index] = Some(fetched.pulls);
            }
            Err(e) => {
                warn!("Repository skipped: {}", e);
                failures.push((index, e));
            }
        }
    }

    failures.sort_by_key(|(index, failure)| (*index, failure.phase == FetchPhase::Reviewed));
    let failures: Vec<FetchError> = failures.into_iter().map(|(_, failure)| failure).collect();

    let slots: Vec<RepoPulls> = slots.into_iter().flatten().collect();
    if slots.is_empty() {
        if let Some(first) = failures.into_iter().next() {
            return Err(first);
        }
        // Unreachable with a validated request, which holds at least one repository
        return Ok(ReportOutcome::NoMatchingRecords {
            failures: Vec::new(),
            dropped: 0,
        });
    }

    let aggregated = aggregate(&slots);
    let records: Vec<PullRequestRecord> = if request.include_stats {
        aggregated.records
    } else {
        aggregated.records.iter().map(PullRequestRecord::without_stats).collect()
    };

    let total = records.len();
    let records = filter_and_sort(&records, &request.filter_options());
    info!(
        "{} of {} PRs match ({} dropped, {} failures)",
        records.len(),
        total,
        aggregated.dropped,
        failures.len()
    );

    if records.is_empty() {
        Ok(ReportOutcome::NoMatchingRecords {
            failures,
            dropped: aggregated.dropped,
        })
    } else {
        Ok(ReportOutcome::Found(Report {
            records,
            failures,
            dropped: aggregated.dropped,
        }))
    }
}
