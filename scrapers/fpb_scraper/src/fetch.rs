use std::{num::NonZeroU32, path::PathBuf, sync::Arc, time::Duration};

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use tracing::{debug, info};

use crate::{config::ScraperConfig, error::ScrapeError};

#[allow(async_fn_in_trait)]
pub trait HtmlFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Plain HTTP fetcher, rate limited to the configured requests per second.
pub struct WebHtmlFetcher {
    client: reqwest::Client,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl WebHtmlFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.scraping.user_agent)
            .timeout(Duration::from_secs(config.scraping.request_timeout_secs))
            .build()?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limits.requests_per_second)
                .ok_or_else(|| ScrapeError::Config("RATE_LIMIT_RPS must be positive".to_string()))?,
        );

        Ok(Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }
}

impl HtmlFetcher for WebHtmlFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        self.rate_limiter.until_ready().await;

        info!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        debug!("Got {} bytes from {}", text.len(), url);
        Ok(text)
    }
}

/// Serves saved pages from disk; the "url" is resolved relative to `root`.
pub struct FileHtmlFetcher {
    root: PathBuf,
}

impl FileHtmlFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl HtmlFetcher for FileHtmlFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let path = self.root.join(url);
        debug!("Reading {:?}", path);
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_web_fetcher_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/calendario/clube_119/")
            .with_status(200)
            .with_body("<div class=\"day-wrapper\"></div>")
            .create_async()
            .await;

        let fetcher = WebHtmlFetcher::new(&ScraperConfig::default()).unwrap();
        let body = fetcher
            .fetch_html(&format!("{}/calendario/clube_119/", server.url()))
            .await
            .unwrap();

        assert_eq!(body, "<div class=\"day-wrapper\"></div>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_web_fetcher_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = WebHtmlFetcher::new(&ScraperConfig::default()).unwrap();
        let result = fetcher.fetch_html(&format!("{}/missing", server.url())).await;

        assert!(matches!(result, Err(ScrapeError::Status { status: 404, .. })));
    }

    #[test]
    fn test_zero_rate_limit_is_a_config_error() {
        let mut config = ScraperConfig::default();
        config.rate_limits.requests_per_second = 0;
        assert!(matches!(
            WebHtmlFetcher::new(&config),
            Err(ScrapeError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_file_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "<p>saved</p>").unwrap();

        let fetcher = FileHtmlFetcher::new(dir.path());
        assert_eq!(fetcher.fetch_html("page.html").await.unwrap(), "<p>saved</p>");
        assert!(matches!(
            fetcher.fetch_html("absent.html").await,
            Err(ScrapeError::Io(_))
        ));
    }
}
