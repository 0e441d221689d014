use super::util::with_retry;
use crate::core::{cache::Cache, fund::Fund, resolver::FundResolver};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{StatusCode, Url};
use std::sync::Arc;
use tracing::{debug, error};

/// Resolves funds one id at a time from a REST endpoint at
/// `{base_url}/funds/{id}`.
pub struct HttpFundResolver {
    base_url: Url,
    client: reqwest::Client,
    cache: Arc<Cache<String, Option<Fund>>>,
}

impl HttpFundResolver {
    pub fn new(base_url: &str, cache: Arc<Cache<String, Option<Fund>>>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fundlens/0.1")
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid fund API base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Invalid fund API base URL: {base_url}"));
        }
        Ok(Self {
            base_url,
            client,
            cache,
        })
    }

    /// `{base_url}/funds/{identifier}` with the identifier as one encoded
    /// path segment.
    fn fund_url(&self, identifier: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Invalid fund API base URL: {}", self.base_url))?
            .pop_if_empty()
            .push("funds")
            .push(identifier);
        Ok(url)
    }

    async fn fetch_fund(&self, identifier: &str) -> Result<Option<Fund>> {
        if let Some(cached) = self.cache.get(&identifier.to_string()).await {
            return Ok(cached);
        }

        let url = self.fund_url(identifier)?;
        debug!("Requesting fund record from {}", url);

        let response = with_retry(|| async { self.client.get(url.clone()).send().await }, 3, 500)
            .await
            .with_context(|| format!("Failed to send request for fund: {identifier}"))?;

        let fund = match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("Fund {identifier} not found upstream");
                None
            }
            status if status.is_success() => {
                let response_text = response
                    .text()
                    .await
                    .with_context(|| format!("Failed to get response text for fund: {identifier}"))?;
                let fund: Fund = match serde_json::from_str(&response_text) {
                    Ok(fund) => fund,
                    Err(e) => {
                        error!(
                            error = ?e,
                            response = %response_text,
                            "Failed to parse fund response"
                        );
                        return Err(e).context(format!("Failed to parse fund response for {identifier}"));
                    }
                };
                Some(fund)
            }
            status => {
                return Err(anyhow!(
                    "Fund service returned {status} for fund: {identifier}"
                ));
            }
        };

        self.cache.put(identifier.to_string(), fund.clone()).await;
        Ok(fund)
    }
}

#[async_trait]
impl FundResolver for HttpFundResolver {
    async fn resolve_funds(&self, ids: &[String]) -> Result<Vec<Fund>> {
        let results = join_all(ids.iter().map(|id| self.fetch_fund(id))).await;

        let mut funds = Vec::new();
        for result in results {
            if let Some(fund) = result? {
                funds.push(fund);
            }
        }
        Ok(funds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FUND_JSON: &str = r#"{
        "fundId": "INF179K01BB8",
        "name": "HDFC Top 100 Fund",
        "category": "equity",
        "expenseRatio": 1.05,
        "aum": 35000,
        "riskLevel": "HIGH",
        "holdings": [
            { "name": "HDFC Bank", "ticker": "HDFCBANK", "percentage": 9.8, "sector": "Financials" }
        ]
    }"#;

    async fn mount_fund(server: &MockServer, id: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/funds/{id}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_resolve_funds() {
        let server = MockServer::start().await;
        mount_fund(&server, "INF179K01BB8", 200, FUND_JSON).await;
        mount_fund(&server, "MISSING", 404, "").await;

        let cache = Arc::new(Cache::new());
        let resolver = HttpFundResolver::new(&server.uri(), cache).unwrap();

        let funds = resolver
            .resolve_funds(&ids(&["INF179K01BB8", "MISSING"]))
            .await
            .unwrap();

        assert_eq!(funds.len(), 1);
        assert_eq!(funds[0].name, "HDFC Top 100 Fund");
        assert_eq!(funds[0].holdings[0].key(), "HDFCBANK");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/funds/INF179K01BB8"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FUND_JSON))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/funds/MISSING"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(Cache::new());
        let resolver = HttpFundResolver::new(&server.uri(), Arc::clone(&cache)).unwrap();
        let request = ids(&["INF179K01BB8", "MISSING"]);

        resolver.resolve_funds(&request).await.unwrap();
        let funds = resolver.resolve_funds(&request).await.unwrap();

        assert_eq!(funds.len(), 1);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_identifier_is_one_encoded_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/funds/HDFC%2FTOP%20100%3F"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FUND_JSON))
            .expect(1)
            .mount(&server)
            .await;

        let base_url = format!("{}/api/", server.uri());
        let resolver = HttpFundResolver::new(&base_url, Arc::new(Cache::new())).unwrap();
        let funds = resolver
            .resolve_funds(&ids(&["HDFC/TOP 100?"]))
            .await
            .unwrap();

        assert_eq!(funds.len(), 1);
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = HttpFundResolver::new("not a url", Arc::new(Cache::new()))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Invalid fund API base URL"));
    }

    #[tokio::test]
    async fn test_server_error_fails_resolution() {
        let server = MockServer::start().await;
        mount_fund(&server, "INF179K01BB8", 200, FUND_JSON).await;
        mount_fund(&server, "BROKEN", 503, "unavailable").await;

        let resolver = HttpFundResolver::new(&server.uri(), Arc::new(Cache::new())).unwrap();
        let result = resolver
            .resolve_funds(&ids(&["INF179K01BB8", "BROKEN"]))
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_body_fails_resolution() {
        let server = MockServer::start().await;
        mount_fund(&server, "BAD", 200, "<html>oops</html>").await;

        let resolver = HttpFundResolver::new(&server.uri(), Arc::new(Cache::new())).unwrap();
        let err = resolver.resolve_funds(&ids(&["BAD"])).await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse fund response for BAD"));
    }
}
