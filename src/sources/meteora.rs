use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use crate::config::ApiConfig;
use crate::models::{PairPage, PairTable};
use super::{PairSource, SourceError};

/// Meteora DLMM `pair/all_with_pagination` endpoint.
pub struct MeteoraDlmm {
    client: Client,
    url: String,
    limit: u32,
    include_token_mints: String,
}

impl MeteoraDlmm {
    pub fn new(config: &ApiConfig) -> Result<Self, SourceError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            limit: config.limit,
            include_token_mints: config.include_token_mints.clone(),
        })
    }
}

#[async_trait]
impl PairSource for MeteoraDlmm {
    fn name(&self) -> &'static str {
        "Meteora DLMM"
    }

    async fn fetch_pairs(&self) -> Result<PairPage, SourceError> {
        let limit = self.limit.to_string();
        let resp = self.client.get(&self.url)
            .header("Accept", "application/json")
            .query(&[("limit", limit.as_str()), ("include_token_mints", self.include_token_mints.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!("Network error fetching pairs: {}", e);
                SourceError::Network(e.to_string())
            })?;

        let body = resp.text()
            .await
            .map_err(|e| {
                tracing::error!("Network error reading pairs body: {}", e);
                SourceError::Network(e.to_string())
            })?;

        let page = serde_json::from_str::<Value>(&body)
            .map_err(|e| SourceError::MalformedResponse(e.to_string()))
            .and_then(parse_page)
            .map_err(|e| {
                tracing::error!("{}", e);
                tracing::error!("Raw response text (first 500 chars): {}...", body_prefix(&body, 500));
                e
            })?;

        tracing::debug!("Fetched {} pairs from {} (total {})", page.table.len(), self.name(), page.total);
        Ok(page)
    }
}

/// Turns a decoded response body into a page.
///
/// `pairs` must be present; an empty (or null) list is a valid empty page.
/// `total` is passed through as reported, defaulting to 0 when absent or not
/// a number.
pub fn parse_page(data: Value) -> Result<PairPage, SourceError> {
    let Value::Object(mut data) = data else {
        return Err(SourceError::MalformedResponse("response is not a JSON object".to_string()));
    };

    let total = data.get("total").map(parse_total).unwrap_or(0);

    let pairs = data.remove("pairs")
        .ok_or_else(|| SourceError::MalformedResponse("API response missing 'pairs' key".to_string()))?;

    let records = match pairs {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => Err(SourceError::MalformedResponse(format!("pair entry is not an object: {}", other))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(SourceError::MalformedResponse(format!("'pairs' is not a list: {}", other)));
        }
    };

    Ok(PairPage::new(PairTable::from_records(records), total))
}

fn parse_total(value: &Value) -> i64 {
    value.as_i64()
        .or_else(|| value.as_f64().filter(|t| t.is_finite()).map(|t| t as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(0)
}

fn body_prefix(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use axum::{extract::RawQuery, http::StatusCode, response::Json, routing::get, Router};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    const PATH: &str = "/pair/all_with_pagination";

    /// Serves `router` on a loopback port and returns a source pointed at it.
    async fn local_source(router: Router) -> MeteoraDlmm {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = ApiConfig {
            url: format!("http://{}{}", addr, PATH),
            ..ApiConfig::default()
        };
        MeteoraDlmm::new(&config).unwrap()
    }

    #[tokio::test]
    async fn sends_fixed_query_and_parses_body() {
        let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let seen_in_handler = seen.clone();
        let router = Router::new().route(PATH, get(move |RawQuery(query): RawQuery| {
            let seen = seen_in_handler.clone();
            async move {
                *seen.lock() = query;
                Json(json!({
                    "pairs": [{"name": "A", "liquidity": "6000", "fees": {"hour_24": 12}}],
                    "total": 3
                }))
            }
        }));
        let source = local_source(router).await;

        let page = source.fetch_pairs().await.unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.table.len(), 1);
        assert_eq!(
            seen.lock().as_deref(),
            Some("limit=100&include_token_mints=So11111111111111111111111111111111111111112")
        );
    }

    #[tokio::test]
    async fn server_error_is_network_error() {
        let router = Router::new().route(PATH, get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let source = local_source(router).await;

        let err = source.fetch_pairs().await.unwrap_err();

        assert!(matches!(err, SourceError::Network(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let config = ApiConfig {
            url: format!("http://{}{}", addr, PATH),
            ..ApiConfig::default()
        };

        let err = MeteoraDlmm::new(&config).unwrap().fetch_pairs().await.unwrap_err();

        assert!(matches!(err, SourceError::Network(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn body_without_pairs_is_malformed() {
        let router = Router::new()
            .route(PATH, get(|| async { Json(json!({"total": 1})) }));
        let source = local_source(router).await;

        let err = source.fetch_pairs().await.unwrap_err();

        assert!(matches!(err, SourceError::MalformedResponse(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let router = Router::new()
            .route(PATH, get(|| async { "<html>maintenance</html>" }));
        let source = local_source(router).await;

        let err = source.fetch_pairs().await.unwrap_err();

        assert!(matches!(err, SourceError::MalformedResponse(_)), "{:?}", err);
    }

    #[test]
    fn parses_pairs_and_total() {
        let page = parse_page(json!({
            "pairs": [
                {"name": "A", "liquidity": "6000", "fees": {"hour_24": 12}},
                {"name": "B"}
            ],
            "total": 42
        }))
        .unwrap();

        assert_eq!(page.total, 42);
        assert_eq!(page.table.len(), 2);
        assert_eq!(page.table.cell("liquidity", 0), Some(&Cell::Text("6000".to_string())));
        assert_eq!(page.table.cell("liquidity", 1), Some(&Cell::Null));
    }

    #[test]
    fn empty_pairs_is_not_an_error() {
        let page = parse_page(json!({"pairs": []})).unwrap();
        assert!(page.table.is_empty());
        assert_eq!(page.total, 0);

        let page = parse_page(json!({"pairs": [], "total": 7})).unwrap();
        assert!(page.table.is_empty());
        assert_eq!(page.total, 7);
    }

    #[test]
    fn missing_pairs_is_malformed() {
        let err = parse_page(json!({"total": 3})).unwrap_err();
        assert!(matches!(err, SourceError::MalformedResponse(_)));

        let err = parse_page(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, SourceError::MalformedResponse(_)));
    }

    #[test]
    fn non_object_pair_entry_is_malformed() {
        let err = parse_page(json!({"pairs": [{"name": "A"}, 5]})).unwrap_err();
        assert!(matches!(err, SourceError::MalformedResponse(_)));
    }

    #[test]
    fn total_tolerates_odd_encodings() {
        assert_eq!(parse_page(json!({"pairs": [], "total": "12"})).unwrap().total, 12);
        assert_eq!(parse_page(json!({"pairs": [], "total": 12.0})).unwrap().total, 12);
        assert_eq!(parse_page(json!({"pairs": [], "total": null})).unwrap().total, 0);
        assert_eq!(parse_page(json!({"pairs": [], "total": -3})).unwrap().total, -3);
    }

    #[test]
    fn body_prefix_respects_char_boundaries() {
        assert_eq!(body_prefix("héllo", 2), "hé");
        assert_eq!(body_prefix("abc", 10), "abc");
    }
}
