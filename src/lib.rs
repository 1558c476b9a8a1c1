pub mod browser;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod fetch;
pub mod filter;
pub mod github;
pub mod output;
pub mod pulls;
pub mod request;

pub use fetch::{fetch_report, FetchError, FetchPhase, Report, ReportOutcome};
pub use request::{FetchRequest, RepoName, RequestError};
