pub mod authored;
pub mod client;
pub mod paginate;
pub mod reviewed;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use authored::fetch_authored;
pub use client::{ApiError, ClientConfig, GitHubClient, DEFAULT_API_URL};
pub use paginate::{PageShape, Paginator, PER_PAGE, SEARCH_RESULT_CAP};
pub use reviewed::{fetch_reviewed, reviewed_query};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
