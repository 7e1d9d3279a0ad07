use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use skillboard_ingest::{AdzunaClient, FetchError, RetryPolicy, SearchParams};

use crate::fake_api::{config, FakeApi};

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        rate_limit_delay: Duration::from_millis(1),
    }
}

fn ids(report: &skillboard_ingest::FetchReport) -> Vec<String> {
    report.postings.iter().filter_map(|p| p.id()).collect()
}

#[tokio::test]
async fn test_fetches_all_pages_in_order() {
    let api = FakeApi::default();
    let base_url = api.clone().serve().await;
    let cfg = config(&base_url, 3);
    let client = AdzunaClient::new(&cfg).unwrap().with_retry_policy(fast_retry(3));

    let report = client.fetch_jobs(&SearchParams::from(&cfg)).await;

    assert_eq!(report.pages_fetched, 3);
    assert!(report.failed_pages.is_empty());
    assert_eq!(
        ids(&report),
        vec!["us-1-a", "us-1-b", "us-2-a", "us-2-b", "us-3-a", "us-3-b"]
    );
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let api = FakeApi::failing(&[(2, 2)]);
    let base_url = api.clone().serve().await;
    let cfg = config(&base_url, 3);
    let client = AdzunaClient::new(&cfg).unwrap().with_retry_policy(fast_retry(3));

    let report = client.fetch_jobs(&SearchParams::from(&cfg)).await;

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.postings.len(), 6);
    assert_eq!(api.calls_for(2), 3);
    assert_eq!(api.calls_for(1), 1);
}

#[tokio::test]
async fn test_exhausted_page_is_skipped() {
    let api = FakeApi::failing(&[(2, 10)]);
    let base_url = api.clone().serve().await;
    let cfg = config(&base_url, 3);
    let client = AdzunaClient::new(&cfg).unwrap().with_retry_policy(fast_retry(3));

    let report = client.fetch_jobs(&SearchParams::from(&cfg)).await;

    assert_eq!(report.failed_pages, vec![2]);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(ids(&report), vec!["us-1-a", "us-1-b", "us-3-a", "us-3-b"]);
    assert_eq!(api.calls_for(2), 3);
}

#[tokio::test]
async fn test_page_without_results_is_empty() {
    let api = FakeApi {
        empty_pages: Arc::new(HashSet::from([1])),
        ..FakeApi::default()
    };
    let base_url = api.clone().serve().await;
    let cfg = config(&base_url, 2);
    let client = AdzunaClient::new(&cfg).unwrap().with_retry_policy(fast_retry(3));

    let report = client.fetch_jobs(&SearchParams::from(&cfg)).await;

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(ids(&report), vec!["us-2-a", "us-2-b"]);
}

#[tokio::test]
async fn test_search_parameters_are_sent() {
    let api = FakeApi::default();
    let base_url = api.clone().serve().await;
    let cfg = config(&base_url, 1);
    let client = AdzunaClient::new(&cfg).unwrap().with_retry_policy(fast_retry(1));
    let params = SearchParams {
        query: "data engineer".into(),
        location: "Boston".into(),
        results_per_page: 25,
        max_pages: 1,
    };

    client.fetch_page(&params, 1).await.unwrap();

    let query = api.last_query.lock().unwrap().clone();
    assert_eq!(query.get("what").map(String::as_str), Some("data engineer"));
    assert_eq!(query.get("where").map(String::as_str), Some("Boston"));
    assert_eq!(query.get("results_per_page").map(String::as_str), Some("25"));
    assert_eq!(query.get("content-type").map(String::as_str), Some("application/json"));
}

#[tokio::test]
async fn test_bad_credentials_surface_api_error() {
    let api = FakeApi::default();
    let base_url = api.clone().serve().await;
    let mut cfg = config(&base_url, 1);
    cfg.app_key = Some("wrong".into());
    let client = AdzunaClient::new(&cfg).unwrap().with_retry_policy(fast_retry(2));

    let err = client
        .fetch_page(&SearchParams::from(&cfg), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Api { status: 401, .. }));

    let report = client.fetch_jobs(&SearchParams::from(&cfg)).await;
    assert!(report.postings.is_empty());
    assert_eq!(report.failed_pages, vec![1]);
}
