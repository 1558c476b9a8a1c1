use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::filter::{DateRange, FilterOptions, RelationFilter, SortOrder};
use crate::pulls::PrState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("at least one repository is required")]
    NoRepositories,
    #[error("repository must be in format 'owner/repo', got: '{0}'")]
    InvalidRepository(String),
    #[error("repository listed more than once: '{0}'")]
    DuplicateRepository(String),
    #[error("username must not be empty")]
    EmptyUsername,
}

/// Repository coordinates parsed from "owner/name"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoName {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoName {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || RequestError::InvalidRepository(trimmed.to_string());
        let (owner, name) = trimmed.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl TryFrom<String> for RepoName {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepoName> for String {
    fn from(repo: RepoName) -> Self {
        repo.to_string()
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Typed input of the aggregation core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub repositories: Vec<RepoName>,
    pub username: String,
    /// Bearer token; never serialized
    #[serde(skip)]
    pub credential: Option<String>,
    pub date_range: DateRange,
    pub statuses: BTreeSet<PrState>,
    pub relation_filter: RelationFilter,
    pub include_stats: bool,
    pub sort_by: SortOrder,
}

impl FetchRequest {
    /// Validate repositories (non-empty, well-formed, unique) and username.
    /// Everything else starts at its default.
    pub fn new<I, S>(repositories: I, username: &str) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        let mut seen = HashSet::new();
        for repo in repositories {
            let repo: RepoName = repo.as_ref().parse()?;
            // GitHub owner and repository names are case-insensitive
            if !seen.insert(repo.to_string().to_lowercase()) {
                return Err(RequestError::DuplicateRepository(repo.to_string()));
            }
            parsed.push(repo);
        }
        if parsed.is_empty() {
            return Err(RequestError::NoRepositories);
        }

        let username = username.trim();
        if username.is_empty() {
            return Err(RequestError::EmptyUsername);
        }

        Ok(Self {
            repositories: parsed,
            username: username.to_string(),
            credential: None,
            date_range: DateRange::default(),
            statuses: PrState::all(),
            relation_filter: RelationFilter::Both,
            include_stats: true,
            sort_by: SortOrder::DateNewest,
        })
    }

    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// An empty set keeps the default of all three states
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = PrState>) -> Self {
        let statuses: BTreeSet<PrState> = statuses.into_iter().collect();
        self.statuses = if statuses.is_empty() { PrState::all() } else { statuses };
        self
    }

    pub fn with_relation_filter(mut self, relation_filter: RelationFilter) -> Self {
        self.relation_filter = relation_filter;
        self
    }

    pub fn with_stats(mut self, include_stats: bool) -> Self {
        self.include_stats = include_stats;
        self
    }

    pub fn with_sort(mut self, sort_by: SortOrder) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            date_range: self.date_range,
            statuses: self.statuses.clone(),
            relation: self.relation_filter,
            sort: self.sort_by,
        }
    }
}
