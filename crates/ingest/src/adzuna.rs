use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use skillboard_core::config::AdzunaConfig;
use skillboard_core::RawPosting;

use crate::error::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Bounded retry with linear backoff and fixed page pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per page, including the first.
    pub max_retries: u32,
    /// Pause after every page; attempt `n` that fails waits `n` times this.
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            rate_limit_delay: Duration::from_millis(1200),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        self.rate_limit_delay * attempt
    }
}

/// What to search for and how many pages to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub location: String,
    pub results_per_page: u32,
    pub max_pages: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: "software".into(),
            location: String::new(),
            results_per_page: 50,
            max_pages: 10,
        }
    }
}

impl From<&AdzunaConfig> for SearchParams {
    fn from(config: &AdzunaConfig) -> Self {
        Self {
            query: config.query.clone(),
            location: config.location.clone(),
            results_per_page: config.results_per_page,
            max_pages: config.max_pages,
        }
    }
}

/// Outcome of a paged fetch. Pages that exhausted their retries are listed
/// in `failed_pages` and contribute nothing to `postings`.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub postings: Vec<RawPosting>,
    pub pages_fetched: u32,
    pub failed_pages: Vec<u32>,
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Option<Vec<Value>>,
}

/// Adzuna job-search client.
pub struct AdzunaClient {
    client: Client,
    app_id: String,
    app_key: String,
    base_url: String,
    country: String,
    retry: RetryPolicy,
}

impl AdzunaClient {
    pub fn new(config: &AdzunaConfig) -> Result<Self, FetchError> {
        let app_id = config
            .app_id
            .clone()
            .ok_or_else(|| FetchError::NotConfigured("ADZUNA_APP_ID not set".into()))?;
        let app_key = config
            .app_key
            .clone()
            .ok_or_else(|| FetchError::NotConfigured("ADZUNA_APP_KEY not set".into()))?;

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            app_id,
            app_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country: config.country.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries.max(1),
                rate_limit_delay: Duration::from_millis(config.rate_limit_ms),
            },
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy {
            max_retries: retry.max_retries.max(1),
            ..retry
        };
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn page_url(&self, page: u32) -> String {
        format!("{}/{}/search/{}", self.base_url, self.country, page)
    }

    /// Fetch a single result page, one attempt.
    pub async fn fetch_page(
        &self,
        params: &SearchParams,
        page: u32,
    ) -> Result<Vec<RawPosting>, FetchError> {
        let results_per_page = params.results_per_page.to_string();
        let response = self
            .client
            .get(self.page_url(page))
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("results_per_page", results_per_page.as_str()),
                ("what", params.query.as_str()),
                ("where", params.location.as_str()),
                ("content-type", "application/json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api { status, body });
        }

        let body = response.text().await?;
        let page: SearchPage = serde_json::from_str(&body)?;
        Ok(page
            .results
            .unwrap_or_default()
            .into_iter()
            .map(RawPosting::new)
            .collect())
    }

    /// Walk pages `1..=max_pages` sequentially.
    ///
    /// Each page gets up to `max_retries` attempts with linearly growing
    /// waits in between. A page that still fails is skipped and the walk
    /// continues, so the report may be partial. Every page is followed by
    /// the fixed rate-limit pause, whatever its outcome.
    pub async fn fetch_jobs(&self, params: &SearchParams) -> FetchReport {
        let report = walk_pages(self.retry, params.max_pages, move |page| {
            self.fetch_page(params, page)
        })
        .await;
        info!(
            postings = report.postings.len(),
            pages = report.pages_fetched,
            failed = report.failed_pages.len(),
            "fetch complete"
        );
        report
    }
}

async fn walk_pages<F, Fut>(retry: RetryPolicy, max_pages: u32, mut fetch_page: F) -> FetchReport
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<RawPosting>, FetchError>>,
{
    let mut report = FetchReport::default();

    for page in 1..=max_pages {
        for attempt in 1..=retry.max_retries {
            info!(page, attempt, "Fetching page {} (attempt {})", page, attempt);
            match fetch_page(page).await {
                Ok(jobs) => {
                    info!(page, count = jobs.len(), "Fetched {} jobs from page {}", jobs.len(), page);
                    report.postings.extend(jobs);
                    report.pages_fetched += 1;
                    break;
                }
                Err(e) => {
                    warn!(page, attempt, error = %e, "Error fetching page");
                    if attempt == retry.max_retries {
                        error!(page, "Failed to fetch page {} after {} attempts", page, retry.max_retries);
                        report.failed_pages.push(page);
                    } else {
                        tokio::time::sleep(retry.backoff(attempt)).await;
                    }
                }
            }
        }
        tokio::time::sleep(retry.rate_limit_delay).await;
    }

    report
}
