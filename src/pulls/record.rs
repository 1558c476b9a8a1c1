use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle state of a pull request after merge detection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::Merged => "merged",
        }
    }

    /// All three states, the default status filter.
    pub fn all() -> BTreeSet<PrState> {
        [PrState::Open, PrState::Closed, PrState::Merged]
            .into_iter()
            .collect()
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// How the target user is involved with a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Authored,
    Reviewed,
}

/// Non-empty set of relations. Constructed from one relation and only ever grown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relations(BTreeSet<Relation>);

impl Relations {
    pub fn single(relation: Relation) -> Self {
        Self(BTreeSet::from([relation]))
    }

    pub fn contains(&self, relation: Relation) -> bool {
        self.0.contains(&relation)
    }

    pub fn union(&self, other: &Relations) -> Relations {
        Relations(self.0.union(&other.0).copied().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = Relation> + '_ {
        self.0.iter().copied()
    }

    /// Short label for tables: "authored", "reviewed" or "authored+reviewed"
    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(|r| match r {
                Relation::Authored => "authored",
                Relation::Reviewed => "reviewed",
            })
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Size figures as reported inline by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrStats {
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
}

/// Canonical pull request record. Everything past the normalizer works on this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub number: u64,
    pub repository: String, // "owner/name"
    pub title: String,
    pub state: PrState,
    pub url: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub effective_date: DateTime<Utc>,
    pub description: String,
    pub relation: Relations,
    pub stats: Option<PrStats>,
}

impl PullRequestRecord {
    /// Dedup key
    pub fn key(&self) -> (String, u64) {
        (self.repository.clone(), self.number)
    }

    /// Return a short reference in the format "owner/repo#123"
    pub fn short_ref(&self) -> String {
        format!("{}#{}", self.repository, self.number)
    }

    /// Copy of this record carrying both relation sets and the preferred stats.
    /// `self` is the authored side, so its stats win when both have them.
    pub fn merged_with(&self, other: &PullRequestRecord) -> PullRequestRecord {
        PullRequestRecord {
            relation: self.relation.union(&other.relation),
            stats: self.stats.or(other.stats),
            ..self.clone()
        }
    }

    pub fn without_stats(&self) -> PullRequestRecord {
        PullRequestRecord {
            stats: None,
            ..self.clone()
        }
    }
}

/// Merge time if merged, otherwise creation time
pub fn effective_date(created_at: DateTime<Utc>, merged_at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    merged_at.unwrap_or(created_at)
}
