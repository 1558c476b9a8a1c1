use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Pull request item as returned by either the pulls listing or the issue
/// search endpoint. Every field is optional here; the normalizer decides
/// what is required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPullRequest {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub html_url: Option<String>,
    pub body: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub user: Option<RawUser>,
    // Only present on search results
    pub pull_request: Option<RawPullRequestLink>,
    pub commits: Option<u64>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub changed_files: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub login: String,
}

/// The `pull_request` object attached to issue search items
#[derive(Debug, Clone, Deserialize)]
pub struct RawPullRequestLink {
    pub html_url: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl RawPullRequest {
    pub fn login(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.login.as_str())
    }

    /// Merge timestamp from whichever shape carries it
    pub fn merge_time(&self) -> Option<DateTime<Utc>> {
        self.merged_at
            .or_else(|| self.pull_request.as_ref().and_then(|link| link.merged_at))
    }
}

/// Envelope of `GET /search/issues`
#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    pub total_count: Option<u64>,
    /// Set when the search timed out before collecting every match
    pub incomplete_results: Option<bool>,
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}
