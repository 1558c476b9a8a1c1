use serde_json::Value;
use tracing::debug;

use crate::github::client::{ApiError, GitHubClient};
use crate::github::paginate::{PageShape, Paginator};
use crate::github::transport::Transport;
use crate::request::RepoName;

/// List every pull request in `repo` (open, closed and merged) and keep the
/// ones submitted by `username`.
///
/// The pulls listing has no author parameter, so the author check happens
/// here. Items stay raw so any inline size fields reach the normalizer; no
/// per-PR detail request is made.
pub async fn fetch_authored<T: Transport>(
    client: &GitHubClient<T>,
    repo: &RepoName,
    username: &str,
) -> Result<Vec<Value>, ApiError> {
    let path = format!("/repos/{}/{}/pulls", repo.owner, repo.name);
    let params = vec![
        ("state".to_string(), "all".to_string()),
        ("sort".to_string(), "created".to_string()),
        ("direction".to_string(), "desc".to_string()),
    ];

    let mut paginator = Paginator::new(client, path, params, PageShape::List);
    let mut authored = Vec::new();
    let mut scanned = 0usize;
    while let Some(batch) = paginator.next_page().await? {
        scanned += batch.len();
        authored.extend(batch.into_iter().filter(|item| is_authored_by(item, username)));
    }

    debug!(repository = %repo, scanned, authored = authored.len(), "authored fetch done");
    Ok(authored)
}

/// GitHub logins are case-insensitive
fn is_authored_by(item: &Value, username: &str) -> bool {
    item.get("user")
        .and_then(|user| user.get("login"))
        .and_then(Value::as_str)
        .is_some_and(|login| login.eq_ignore_ascii_case(username))
}
