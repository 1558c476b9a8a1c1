/// Environment variable checked first for a GitHub token
pub const ENV_TOKEN_VAR: &str = "PR_LEDGER_GH_TOKEN";

/// Fallback environment variable, as set by the GitHub CLI and Actions
pub const FALLBACK_TOKEN_VAR: &str = "GITHUB_TOKEN";

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve a token from `--token`, then `PR_LEDGER_GH_TOKEN`, then
/// `GITHUB_TOKEN`. Blank values are skipped.
pub fn resolve_token(flag: Option<String>) -> Option<String> {
    resolve_token_with(flag, |name| std::env::var(name).ok())
}

/// Same as `resolve_token` with an injectable environment lookup
pub fn resolve_token_with<F>(flag: Option<String>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(flag)
        .or_else(|| non_empty(lookup(ENV_TOKEN_VAR)))
        .or_else(|| non_empty(lookup(FALLBACK_TOKEN_VAR)))
}
