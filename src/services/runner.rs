//! Concurrent multi-site extraction runner.
//!
//! Each site run is independent and stateless; runs are executed
//! concurrently, bounded by the configured worker count. A per-run timeout
//! cancels only the run that exceeded it.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use log::warn;

use crate::error::AppError;
use crate::extractors::ExtractorRegistry;
use crate::models::{Config, SiteContext, SiteUserInfo};
use crate::pipeline::Orchestrator;
use crate::services::PageFetcher;

/// Summary of one batch of site runs.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub records: Vec<SiteUserInfo>,
    pub failures: Vec<(String, AppError)>,
    pub site_total: usize,
}

/// Service running extraction for every configured site.
pub struct StatsRunner {
    orchestrator: Orchestrator,
    run_timeout: Duration,
    delay: Duration,
    concurrency: usize,
}

impl StatsRunner {
    /// Create a runner with the standard extractor registry.
    pub fn new(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_registry(config, fetcher, Arc::new(ExtractorRegistry::standard()))
    }

    /// Create a runner with a custom registry (e.g. with extra site variants
    /// registered by the caller).
    pub fn with_registry(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        registry: Arc<ExtractorRegistry>,
    ) -> Self {
        let orchestrator =
            Orchestrator::new(registry, fetcher, config.extraction.seeding_page_cap);
        Self {
            orchestrator,
            run_timeout: Duration::from_secs(config.extraction.run_timeout_secs),
            delay: Duration::from_millis(config.extraction.request_delay_ms),
            concurrency: config.extraction.max_concurrent.max(1),
        }
    }

    /// Extract statistics for all sites concurrently, bounded by the worker
    /// count. Failures are collected per site; one bad site never aborts the
    /// batch.
    pub async fn fetch_all(&self, sites: &[SiteContext]) -> RunOutcome {
        let mut outcome = RunOutcome {
            site_total: sites.len(),
            ..RunOutcome::default()
        };

        let mut runs = stream::iter(sites)
            .map(|site| async move {
                let result = match tokio::time::timeout(
                    self.run_timeout,
                    self.orchestrator.extract(site),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(AppError::cancelled(&site.name)),
                };
                (site, result)
            })
            .buffer_unordered(self.concurrency);

        while let Some((site, result)) = runs.next().await {
            match result {
                Ok(record) => outcome.records.push(record),
                Err(error) => {
                    warn!("Failed to extract stats for {}: {}", site.name, error);
                    outcome.failures.push((site.name.clone(), error));
                }
            }

            if self.delay.as_millis() > 0 {
                tokio::time::sleep(self.delay).await;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::Result;
    use crate::models::PageRequest;

    const YEMA_LANDING: &str = "<html><head><title>YemaPT</title></head></html>";
    const YEMA_PROFILE: &str =
        r#"{"success": true, "data": {"id": 1, "name": "bob", "uploadSize": 10, "downloadSize": 5}}"#;

    /// Serves a Yema site for every request path; optionally stalls forever.
    struct StubFetcher {
        stall: bool,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, _ctx: &SiteContext, request: &PageRequest) -> Result<String> {
            if self.stall {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if request.path.is_empty() {
                Ok(YEMA_LANDING.to_string())
            } else {
                Ok(YEMA_PROFILE.to_string())
            }
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.extraction.request_delay_ms = 0;
        config.extraction.run_timeout_secs = 1;
        config
    }

    #[tokio::test]
    async fn test_fetch_all_collects_records() {
        let runner = StatsRunner::new(&test_config(), Arc::new(StubFetcher { stall: false }));
        let sites = vec![
            SiteContext::new("one", "https://one.example/"),
            SiteContext::new("two", "https://two.example/"),
        ];

        let outcome = runner.fetch_all(&sites).await;
        assert_eq!(outcome.site_total, 2);
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.records[0].ratio, 2.0);
    }

    #[tokio::test]
    async fn test_run_timeout_is_reported_as_cancelled() {
        let runner = StatsRunner::new(&test_config(), Arc::new(StubFetcher { stall: true }));
        let sites = vec![SiteContext::new("slow", "https://slow.example/")];

        let outcome = runner.fetch_all(&sites).await;
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0].1,
            AppError::Cancelled { .. }
        ));
    }
}
