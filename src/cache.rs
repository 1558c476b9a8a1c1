use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::fetch::{Report, ReportOutcome};
use crate::pulls::PullRequestRecord;
use crate::request::FetchRequest;

/// Get the platform-appropriate cache directory for pr-ledger
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("pr-ledger/report-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/pr-ledger/report-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Clear the report cache directory
pub fn clear_cache(cache_path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// Cached report with the time it was written
#[derive(Debug, Serialize, Deserialize)]
struct CachedReport {
    records: Vec<PullRequestRecord>,
    dropped: usize,
    cached_at: u64, // Unix timestamp
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Disk cache of finished reports, keyed by the request that produced them.
///
/// Lives entirely outside the fetch pipeline. Only complete outcomes (no
/// recorded failures) are stored.
pub struct ReportCache {
    cache_path: PathBuf,
    ttl: Duration,
}

impl ReportCache {
    pub fn new(cache_path: PathBuf, ttl: Duration) -> Self {
        Self { cache_path, ttl }
    }

    /// The credential is never serialized, so it never becomes part of a key
    fn key(request: &FetchRequest, api_url: &str) -> Result<String> {
        let request = serde_json::to_string(request).context("Failed to serialize request")?;
        Ok(format!("report:{}:{}", api_url, request))
    }

    /// Cached outcome for `request`, if one exists and is still fresh
    pub fn get(&self, request: &FetchRequest, api_url: &str) -> Option<ReportOutcome> {
        let key = Self::key(request, api_url).ok()?;
        let bytes = cacache::read_sync(&self.cache_path, &key).ok()?;
        let cached: CachedReport = serde_json::from_slice(&bytes).ok()?;

        let age = now_secs().saturating_sub(cached.cached_at);
        if age >= self.ttl.as_secs() {
            debug!(age, "cached report is stale");
            return None;
        }
        debug!(age, records = cached.records.len(), "using cached report");

        Some(if cached.records.is_empty() {
            ReportOutcome::NoMatchingRecords {
                failures: Vec::new(),
                dropped: cached.dropped,
            }
        } else {
            ReportOutcome::Found(Report {
                records: cached.records,
                failures: Vec::new(),
                dropped: cached.dropped,
            })
        })
    }

    /// Store `outcome` unless some fetch failed while producing it.
    /// Returns whether anything was written.
    pub fn put(&self, request: &FetchRequest, api_url: &str, outcome: &ReportOutcome) -> Result<bool> {
        if !outcome.failures().is_empty() {
            return Ok(false);
        }
        let dropped = match outcome {
            ReportOutcome::Found(report) => report.dropped,
            ReportOutcome::NoMatchingRecords { dropped, .. } => *dropped,
        };
        let cached = CachedReport {
            records: outcome.records().to_vec(),
            dropped,
            cached_at: now_secs(),
        };
        let json = serde_json::to_vec(&cached)?;
        cacache::write_sync(&self.cache_path, Self::key(request, api_url)?, &json)
            .context("Failed to write report cache")?;
        Ok(true)
    }
}
