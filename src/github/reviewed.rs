use serde_json::Value;
use tracing::debug;

use crate::github::client::{ApiError, GitHubClient};
use crate::github::paginate::{PageShape, Paginator};
use crate::github::transport::Transport;
use crate::request::RepoName;

pub const SEARCH_PATH: &str = "/search/issues";

/// Search qualifier string for PRs in `repo` reviewed by `username`
pub fn reviewed_query(repo: &RepoName, username: &str) -> String {
    format!("type:pr repo:{} reviewed-by:{}", repo, username)
}

/// Find PRs reviewed by `username` with one search per repository.
///
/// The cost is the pages of a single search result, independent of how many
/// PRs the repository holds. Search has its own, stricter rate limit; callers
/// decide whether a failure here is fatal.
pub async fn fetch_reviewed<T: Transport>(
    client: &GitHubClient<T>,
    repo: &RepoName,
    username: &str,
) -> Result<Vec<Value>, ApiError> {
    let params = vec![("q".to_string(), reviewed_query(repo, username))];
    let reviewed = Paginator::new(client, SEARCH_PATH, params, PageShape::Search)
        .collect_all()
        .await?;

    debug!(repository = %repo, reviewed = reviewed.len(), "reviewed search done");
    Ok(reviewed)
}
