use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::pulls::{PrState, Relation, Relations};

/// Inclusive range over `effective_date`. A missing bound is open-ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, when: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| start <= when) && self.end.is_none_or(|end| when <= end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RelationFilter {
    #[value(name = "authored")]
    AuthoredOnly,
    #[value(name = "reviewed")]
    ReviewedOnly,
    #[default]
    Both,
}

impl RelationFilter {
    pub fn matches(&self, relation: &Relations) -> bool {
        match self {
            RelationFilter::AuthoredOnly => relation.contains(Relation::Authored),
            RelationFilter::ReviewedOnly => relation.contains(Relation::Reviewed),
            RelationFilter::Both => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    DateNewest,
    DateOldest,
    PrNumber,
    Status,
}

/// Everything the filter and sort engine needs. All filters are AND-combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub date_range: DateRange,
    /// Empty means every state
    pub statuses: BTreeSet<PrState>,
    pub relation: RelationFilter,
    pub sort: SortOrder,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            date_range: DateRange::default(),
            statuses: PrState::all(),
            relation: RelationFilter::Both,
            sort: SortOrder::DateNewest,
        }
    }
}
