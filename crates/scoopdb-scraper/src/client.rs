use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;
use crate::parse::extract_price_per_kg;
use crate::retry::retry_with_backoff;

/// HTTP client for scraping advertised per-kg prices off product pages.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx
/// responses as typed errors. Transient errors (429, network failures) are
/// automatically retried with exponential backoff up to `max_retries`
/// additional attempts.
pub struct PriceScraper {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

/// Extracts the host from a product URL for rate-limit reporting.
fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToOwned::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

impl PriceScraper {
    /// Creates a `PriceScraper` with configured timeout, `User-Agent`, and
    /// retry policy. Set `max_retries` to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches a product page and extracts its advertised per-kg price,
    /// retrying transient failures with exponential backoff.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ScrapeError::NotFound`] — HTTP 404 (not retried).
    /// - [`ScrapeError::UnexpectedStatus`] — any other non-2xx status (not retried).
    /// - [`ScrapeError::Http`] — network or TLS failure after all retries exhausted.
    /// - [`ScrapeError::PriceNotFound`] — page fetched but no plausible
    ///   `$…/kg` price present (not retried).
    pub async fn fetch_price_per_kg(&self, url: &str) -> Result<f64, ScrapeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.to_owned();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);

                    return Err(ScrapeError::RateLimited {
                        domain: extract_domain(&url),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScrapeError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScrapeError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                extract_price_per_kg(&body).ok_or(ScrapeError::PriceNotFound { url })
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scraper() -> PriceScraper {
        PriceScraper::new(5, "scoopdb-test/0.1", 0, 0).expect("client should build")
    }

    #[tokio::test]
    async fn fetches_and_parses_price_from_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p/impact-whey-isolate"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><div class=\"unit-price\">$59.95\u{200e}/kg</div></body></html>",
            ))
            .mount(&server)
            .await;

        let url = format!("{}/p/impact-whey-isolate", server.uri());
        let price = scraper()
            .fetch_price_per_kg(&url)
            .await
            .expect("scrape should succeed");
        assert!((price - 59.95).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_price_maps_to_price_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p/no-price"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>4.5 out of 5</html>"))
            .mount(&server)
            .await;

        let url = format!("{}/p/no-price", server.uri());
        let err = scraper().fetch_price_per_kg(&url).await.unwrap_err();
        assert!(matches!(err, ScrapeError::PriceNotFound { .. }));
    }

    #[tokio::test]
    async fn http_404_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/p/gone", server.uri());
        let err = scraper().fetch_price_per_kg(&url).await.unwrap_err();
        assert!(matches!(err, ScrapeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn http_429_maps_to_rate_limited_with_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p/busy"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
            .mount(&server)
            .await;

        let url = format!("{}/p/busy", server.uri());
        let err = scraper().fetch_price_per_kg(&url).await.unwrap_err();
        match err {
            ScrapeError::RateLimited {
                retry_after_secs, ..
            } => assert_eq!(retry_after_secs, 17),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn retries_429_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p/flaky"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<div>$42.00/kg</div>"))
            .mount(&server)
            .await;

        let scraper = PriceScraper::new(5, "scoopdb-test/0.1", 2, 0).expect("client should build");
        let url = format!("{}/p/flaky", server.uri());
        let price = scraper
            .fetch_price_per_kg(&url)
            .await
            .expect("retry should recover");
        assert!((price - 42.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unexpected_status_maps_to_typed_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let url = format!("{}/p/forbidden", server.uri());
        let err = scraper().fetch_price_per_kg(&url).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::UnexpectedStatus { status: 403, .. }
        ));
    }
}
