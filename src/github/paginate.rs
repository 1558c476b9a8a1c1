use serde_json::Value;
use tracing::{debug, warn};

use crate::github::client::{ApiError, GitHubClient};
use crate::github::transport::Transport;
use crate::github::types::SearchEnvelope;

/// Items requested per page
pub const PER_PAGE: usize = 100;

/// Search never serves more than this many results, whatever `total_count` says
pub const SEARCH_RESULT_CAP: u64 = 1000;

/// Body shape of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageShape {
    /// Bare JSON array, as `GET /repos/{owner}/{repo}/pulls`
    List,
    /// `{ "total_count": n, "items": [...] }`, as `GET /search/issues`
    Search,
}

/// Walks `page=1, 2, ...` of one endpoint until the server runs out.
///
/// Each page is requested at most once. The walk ends on the first empty or
/// undersized page, or when a search has served every item it will serve:
/// `total_count`, capped at `SEARCH_RESULT_CAP`. There is no other page cap.
/// Errors end the walk immediately.
pub struct Paginator<'a, T: Transport> {
    client: &'a GitHubClient<T>,
    path: String,
    params: Vec<(String, String)>,
    shape: PageShape,
    next_page: u32,
    seen: u64,
    exhausted: bool,
}

impl<'a, T: Transport> Paginator<'a, T> {
    pub fn new(
        client: &'a GitHubClient<T>,
        path: impl Into<String>,
        params: Vec<(String, String)>,
        shape: PageShape,
    ) -> Self {
        Self {
            client,
            path: path.into(),
            params,
            shape,
            next_page: 1,
            seen: 0,
            exhausted: false,
        }
    }

    /// Fetch the next batch, or `None` once the endpoint is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>, ApiError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.next_page;
        self.next_page += 1;

        let mut params = self.params.clone();
        params.push(("per_page".to_string(), PER_PAGE.to_string()));
        params.push(("page".to_string(), page.to_string()));

        let batch = self
            .client
            .get(&self.path, &params)
            .await
            .and_then(|payload| split_page(payload, self.shape, &self.path));
        let (items, total, incomplete) = match batch {
            Ok(batch) => batch,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            }
        };

        self.seen += items.len() as u64;
        debug!(path = %self.path, page, items = items.len(), "fetched page");

        if page == 1 && self.shape == PageShape::Search {
            if incomplete {
                warn!(path = %self.path, "Search timed out server-side; results may be incomplete");
            }
            if let Some(total) = total.filter(|total| *total > SEARCH_RESULT_CAP) {
                warn!(
                    path = %self.path,
                    total,
                    "Search matched more than {} PRs; only the first {} are available",
                    SEARCH_RESULT_CAP,
                    SEARCH_RESULT_CAP
                );
            }
        }

        let served = total.map(|total| total.min(SEARCH_RESULT_CAP));
        if items.len() < PER_PAGE || served.is_some_and(|served| self.seen >= served) {
            self.exhausted = true;
        }

        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(items))
        }
    }

    /// Drain every remaining page into one vector
    pub async fn collect_all(mut self) -> Result<Vec<Value>, ApiError> {
        let mut all = Vec::new();
        while let Some(batch) = self.next_page().await? {
            all.extend(batch);
        }
        Ok(all)
    }
}

/// Items of one page, the reported total and the `incomplete_results` flag
type Page = (Vec<Value>, Option<u64>, bool);

fn split_page(payload: Value, shape: PageShape, path: &str) -> Result<Page, ApiError> {
    match shape {
        PageShape::List => match payload {
            Value::Array(items) => Ok((items, None, false)),
            other => Err(ApiError::Decode {
                url: path.to_string(),
                message: format!("expected a JSON array, got {}", type_name(&other)),
            }),
        },
        PageShape::Search => {
            let envelope: SearchEnvelope =
                serde_json::from_value(payload).map_err(|e| ApiError::Decode {
                    url: path.to_string(),
                    message: e.to_string(),
                })?;
            Ok((
                envelope.items,
                envelope.total_count,
                envelope.incomplete_results.unwrap_or(false),
            ))
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::client::ClientConfig;
    use crate::github::mock::MockTransport;
    use serde_json::json;

    fn items(n: usize, offset: usize) -> Value {
        Value::Array((0..n).map(|i| json!({ "number": offset + i })).collect())
    }

    fn client(transport: MockTransport) -> GitHubClient<MockTransport> {
        GitHubClient::with_transport(ClientConfig::default(), transport)
    }

    #[tokio::test]
    async fn test_stops_after_undersized_page() {
        // 250 items: two full pages and a page of 50
        let client = client(MockTransport::new(|req| {
            let page = MockTransport::page(req);
            let count = match page {
                1 | 2 => PER_PAGE,
                3 => 50,
                _ => panic!("page {} requested after exhaustion", page),
            };
            (200, items(count, (page - 1) * PER_PAGE).to_string())
        }));

        let all = Paginator::new(&client, "/repos/a/b/pulls", vec![], PageShape::List)
            .collect_all()
            .await
            .unwrap();
        assert_eq!(all.len(), 250);
        assert_eq!(pages(&client), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_full_last_page_needs_one_empty_page() {
        let client = client(MockTransport::new(|req| {
            let count = if MockTransport::page(req) == 1 { PER_PAGE } else { 0 };
            (200, items(count, 0).to_string())
        }));

        let all = Paginator::new(&client, "/repos/a/b/pulls", vec![], PageShape::List)
            .collect_all()
            .await
            .unwrap();
        assert_eq!(all.len(), PER_PAGE);
        assert_eq!(pages(&client), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let client = client(MockTransport::new(|_| (200, "[]".to_string())));
        let mut paginator = Paginator::new(&client, "/repos/a/b/pulls", vec![], PageShape::List);
        assert_eq!(paginator.next_page().await.unwrap(), None);
        assert_eq!(paginator.next_page().await.unwrap(), None);
        assert_eq!(pages(&client), vec![1]);
    }

    #[tokio::test]
    async fn test_error_abandons_remaining_pages() {
        let client = client(MockTransport::new(|req| match MockTransport::page(req) {
            1 => (200, items(PER_PAGE, 0).to_string()),
            _ => (500, "upstream failure".to_string()),
        }));

        let mut paginator = Paginator::new(&client, "/repos/a/b/pulls", vec![], PageShape::List);
        assert!(paginator.next_page().await.unwrap().is_some());
        assert!(paginator.next_page().await.is_err());
        assert_eq!(paginator.next_page().await.unwrap(), None);
        assert_eq!(pages(&client), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_search_stops_at_total_count() {
        let client = client(MockTransport::new(|req| {
            let page = MockTransport::page(req);
            let body = json!({ "total_count": 200, "items": items(PER_PAGE, (page - 1) * PER_PAGE) });
            (200, body.to_string())
        }));

        let all = Paginator::new(&client, "/search/issues", vec![], PageShape::Search)
            .collect_all()
            .await
            .unwrap();
        assert_eq!(all.len(), 200);
        assert_eq!(pages(&client), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_search_keeps_the_first_thousand_of_a_larger_total() {
        // Server reports 1500 matches but refuses pages past the result cap
        let client = client(MockTransport::new(|req| {
            let page = MockTransport::page(req);
            if page > 10 {
                return (
                    422,
                    r#"{"message":"Only the first 1000 search results are available"}"#.to_string(),
                );
            }
            let body = json!({
                "total_count": 1500,
                "incomplete_results": false,
                "items": items(PER_PAGE, (page - 1) * PER_PAGE)
            });
            (200, body.to_string())
        }));

        let all = Paginator::new(&client, "/search/issues", vec![], PageShape::Search)
            .collect_all()
            .await
            .unwrap();
        assert_eq!(all.len(), SEARCH_RESULT_CAP as usize);
        assert_eq!(pages(&client), (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_incomplete_search_results_are_still_returned() {
        let client = client(MockTransport::new(|_| {
            let body = json!({ "total_count": 3, "incomplete_results": true, "items": items(3, 0) });
            (200, body.to_string())
        }));

        let all = Paginator::new(&client, "/search/issues", vec![], PageShape::Search)
            .collect_all()
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(pages(&client), vec![1]);
    }

    #[tokio::test]
    async fn test_sends_fixed_page_size_and_params() {
        let client = client(MockTransport::new(|_| (200, "[]".to_string())));
        Paginator::new(
            &client,
            "/repos/a/b/pulls",
            vec![("state".to_string(), "all".to_string())],
            PageShape::List,
        )
        .collect_all()
        .await
        .unwrap();

        let sent = client.transport().requests();
        assert_eq!(MockTransport::param(&sent[0], "per_page").as_deref(), Some("100"));
        assert_eq!(MockTransport::param(&sent[0], "state").as_deref(), Some("all"));
    }

    #[tokio::test]
    async fn test_non_array_list_page_is_decode_error() {
        let client = client(MockTransport::new(|_| (200, r#"{"message": "hi"}"#.to_string())));
        let result = Paginator::new(&client, "/repos/a/b/pulls", vec![], PageShape::List)
            .collect_all()
            .await;
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }

    /// Page numbers requested so far, in order
    fn pages(client: &GitHubClient<MockTransport>) -> Vec<usize> {
        client.transport().requests().iter().map(MockTransport::page).collect()
    }
}
