pub mod aggregate;
pub mod normalize;
pub mod record;

pub use aggregate::{aggregate, Aggregated, RepoPulls};
pub use normalize::{normalize, NormalizeError};
pub use record::{PrState, PrStats, PullRequestRecord, Relation, Relations};
