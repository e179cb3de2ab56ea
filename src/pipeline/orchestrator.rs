// src/pipeline/orchestrator.rs

//! Extraction orchestrator.
//!
//! Drives the fixed pipeline for one site: classify the scheme, locate the
//! data pages, fetch and parse each role in order, aggregate paginated
//! seeding data, and derive the ratio last. Fetch is an injected,
//! possibly-failing collaborator; its failures are surfaced verbatim with
//! the role that was being fetched. Parse failures on optional roles degrade
//! to partial data.

use std::sync::Arc;

use log::{debug, warn};

use crate::error::{AppError, Result};
use crate::extractors::{ExtractorRegistry, SiteExtractor};
use crate::models::{Continuation, PagePlan, PageRequest, PageRole, SiteContext, SiteUserInfo};
use crate::services::PageFetcher;

/// Pipeline progress marker for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unclassified,
    Classified,
    PagesLocated,
    Fetching,
    Aggregating,
    Complete,
}

/// Drives extraction runs. Holds no per-run state; one instance serves any
/// number of concurrent runs.
pub struct Orchestrator {
    registry: Arc<ExtractorRegistry>,
    fetcher: Arc<dyn PageFetcher>,
    seeding_page_cap: usize,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ExtractorRegistry>,
        fetcher: Arc<dyn PageFetcher>,
        seeding_page_cap: usize,
    ) -> Self {
        Self {
            registry,
            fetcher,
            seeding_page_cap,
        }
    }

    /// Run the full pipeline for one site and produce its canonical record.
    pub async fn extract(&self, ctx: &SiteContext) -> Result<SiteUserInfo> {
        self.trace(ctx, Phase::Unclassified);
        let landing = self
            .fetch(ctx, &PageRequest::new(""), PageRole::Landing)
            .await?;

        let extractor = self
            .registry
            .classify(&landing)
            .ok_or(AppError::UnsupportedSite)?;
        self.trace(ctx, Phase::Classified);
        debug!("{}: classified as scheme '{}'", ctx.name, extractor.scheme());

        if !extractor.parse_logged_in(&landing) {
            return Err(AppError::parse(
                extractor.scheme(),
                PageRole::Landing,
                "no login marker on landing page",
            ));
        }

        let plan = extractor.locate_pages(&landing, ctx)?;
        self.trace(ctx, Phase::PagesLocated);

        let mut record = SiteUserInfo::new(&ctx.name, extractor.scheme());
        self.trace(ctx, Phase::Fetching);

        // Mandatory role: parse failures here are terminal for the run.
        let request = plan.require(PageRole::BaseInfo, extractor.scheme())?;
        let body = self.fetch(ctx, request, PageRole::BaseInfo).await?;
        extractor.parse_base_info(&body, &mut record)?;

        // Optional roles: parse failures degrade to a note on the record.
        for role in [PageRole::Traffic, PageRole::Detail] {
            if let Some(request) = plan.get(role) {
                let body = self.fetch(ctx, request, role).await?;
                let parsed = match role {
                    PageRole::Traffic => extractor.parse_traffic_info(&body, &mut record),
                    _ => extractor.parse_detail_info(&body, &mut record),
                };
                if let Err(error) = parsed {
                    degrade(&ctx.name, role, &mut record, &error);
                }
            }
        }

        self.trace(ctx, Phase::Aggregating);
        if let Some(first) = plan.get(PageRole::Seeding) {
            self.aggregate_seeding(ctx, extractor.as_ref(), first, &mut record)
                .await?;
        }
        if plan.get(PageRole::MailUnread).is_some() {
            self.collect_messages(ctx, extractor.as_ref(), &plan, &mut record)
                .await?;
        }

        for note in extractor.capability_notes() {
            record.add_note(note);
        }
        record.finalize();
        self.trace(ctx, Phase::Complete);
        Ok(record)
    }

    /// Sequentially fetch seeding pages until the continuation is exhausted
    /// or the hard page cap is reached. Page-fetch order is preserved in the
    /// aggregated list; at most `cap + 1` fetches occur.
    async fn aggregate_seeding(
        &self,
        ctx: &SiteContext,
        extractor: &dyn SiteExtractor,
        first: &PageRequest,
        record: &mut SiteUserInfo,
    ) -> Result<()> {
        let mut request = first.clone();
        for _ in 0..=self.seeding_page_cap {
            let body = self.fetch(ctx, &request, PageRole::Seeding).await?;
            let continuation = match extractor.parse_seeding_page(&body, record) {
                Ok(continuation) => continuation,
                Err(error) => {
                    degrade(&ctx.name, PageRole::Seeding, record, &error);
                    return Ok(());
                }
            };
            match continuation {
                Continuation::Done => return Ok(()),
                Continuation::Next(mut next) => {
                    // Continuation requests inherit the plan's headers (e.g.
                    // a variant's referer) unless the parser set its own.
                    if next.headers.is_empty() {
                        next.headers = first.headers.clone();
                    }
                    request = next;
                }
            }
        }
        warn!(
            "{}: seeding pagination hit the {}-page cap",
            ctx.name, self.seeding_page_cap
        );
        record.add_note(format!(
            "seeding list truncated at the {}-page cap",
            self.seeding_page_cap
        ));
        Ok(())
    }

    /// Fetch the unread-mail listing, then each linked message body.
    async fn collect_messages(
        &self,
        ctx: &SiteContext,
        extractor: &dyn SiteExtractor,
        plan: &PagePlan,
        record: &mut SiteUserInfo,
    ) -> Result<()> {
        let Some(request) = plan.get(PageRole::MailUnread) else {
            return Ok(());
        };
        let body = self.fetch(ctx, request, PageRole::MailUnread).await?;
        let links = extractor.parse_unread_links(&body);
        if links.is_empty() {
            return Ok(());
        }

        record.message_unread = links.len() as u32;
        for link in links {
            let body = self
                .fetch(ctx, &PageRequest::new(link), PageRole::MailUnread)
                .await?;
            if let Some(message) = extractor.parse_message_content(&body) {
                record.messages.push(message);
            }
        }
        Ok(())
    }

    /// Fetch one page, attaching the role to any failure.
    async fn fetch(
        &self,
        ctx: &SiteContext,
        request: &PageRequest,
        role: PageRole,
    ) -> Result<String> {
        self.fetcher
            .fetch(ctx, request)
            .await
            .map_err(|error| match error {
                cancelled @ AppError::Cancelled { .. } => cancelled,
                other => AppError::fetch(role, other),
            })
    }

    fn trace(&self, ctx: &SiteContext, phase: Phase) {
        debug!("{}: phase {:?}", ctx.name, phase);
    }
}

/// Record an optional-role parse failure as partial data, not a run failure.
fn degrade(site: &str, role: PageRole, record: &mut SiteUserInfo, error: &AppError) {
    warn!("{site}: {role} page parse degraded: {error}");
    record.add_note(format!("{role} page parse degraded: {error}"));
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::Result;
    use crate::models::PagePlan;
    use crate::utils::dates::format_datetime;

    /// Fetcher serving canned bodies keyed by request path, recording every
    /// fetched path.
    struct FakeFetcher {
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(path, body)| (path.to_string(), body.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self, path: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.as_str() == path)
                .count()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, _ctx: &SiteContext, request: &PageRequest) -> Result<String> {
            self.calls.lock().unwrap().push(request.path.clone());
            self.pages
                .get(&request.path)
                .cloned()
                .ok_or_else(|| AppError::config(format!("no canned page for '{}'", request.path)))
        }
    }

    fn orchestrator(fetcher: Arc<FakeFetcher>, cap: usize) -> Orchestrator {
        Orchestrator::new(Arc::new(ExtractorRegistry::standard()), fetcher, cap)
    }

    const YEMA_LANDING: &str = "<html><head><title>YemaPT</title></head></html>";
    const YEMA_PROFILE: &str = r#"{
        "success": true,
        "data": {
            "id": 7,
            "name": "alice",
            "level": "VIP",
            "registerTime": "2020-01-02 03:04:05",
            "uploadSize": 1000,
            "downloadSize": 0,
            "bonus": 12.5
        }
    }"#;

    #[tokio::test]
    async fn test_yema_end_to_end() {
        let fetcher = Arc::new(FakeFetcher::new(&[
            ("", YEMA_LANDING),
            ("api/consumer/fetchSelfDetail", YEMA_PROFILE),
        ]));
        let ctx = SiteContext::new("yema", "https://yemapt.example/");

        let record = orchestrator(Arc::clone(&fetcher), 50)
            .extract(&ctx)
            .await
            .unwrap();

        assert_eq!(record.scheme, "yema");
        assert_eq!(record.userid.as_deref(), Some("7"));
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(record.user_level.as_deref(), Some("VIP"));
        assert_eq!(
            format_datetime(&record.join_at.unwrap()),
            "2020-01-02 03:04:05"
        );
        assert_eq!(record.upload, 1000);
        assert_eq!(record.download, 0);
        assert_eq!(record.ratio, 1000.0);
        assert_eq!(record.bonus, Some(12.5));
        assert_eq!(record.message_unread, 0);
        assert!(record.seeding_torrents.is_empty());
        // The absent seeding capability is documented, not silently dropped.
        assert!(record.notes.iter().any(|n| n.contains("seeding")));
    }

    #[tokio::test]
    async fn test_unmatched_landing_is_unsupported_site() {
        let fetcher = Arc::new(FakeFetcher::new(&[("", "<html>mystery cms</html>")]));
        let ctx = SiteContext::new("mystery", "https://mystery.example/");

        let err = orchestrator(fetcher, 50).extract(&ctx).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedSite));
    }

    #[tokio::test]
    async fn test_fetch_failure_carries_role() {
        // Landing present, base-info page missing.
        let fetcher = Arc::new(FakeFetcher::new(&[("", YEMA_LANDING)]));
        let ctx = SiteContext::new("yema", "https://yemapt.example/");

        let err = orchestrator(fetcher, 50).extract(&ctx).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Fetch {
                role: PageRole::BaseInfo,
                ..
            }
        ));
    }

    const NEXUS_INDEX: &str = r#"<html><body>
        Powered by NexusPHP
        <a href="logout.php">Logout</a>
        <a href="userdetails.php?id=321"><b>alice</b></a>
        <div>上传量: 100 GB 下载量: 50 GB</div>
        </body></html>"#;

    const NEXUS_DETAIL: &str = r#"<html><table>
        <tr><td class="rowhead">Class</td><td class="rowfollow">Elite User</td></tr>
        <tr><td class="rowhead">Join date</td><td class="rowfollow">02-Jan-2020</td></tr>
        </table></html>"#;

    const NEXUS_SEEDING: &str = r#"<html><table>
        <tr><td>1</td><td><a href="details.php?id=9" title="Only.Torrent">x</a></td><td>2 GB</td><td>5</td></tr>
        </table></html>"#;

    const NEXUS_MAIL: &str = r#"<html><table>
        <tr><td><img alt="Unread"/></td><td><a href="viewmessage.php?id=5">hi</a></td></tr>
        </table></html>"#;

    const NEXUS_MESSAGE: &str = r#"<html><body>
        <h1>Welcome</h1>
        <table><tr><td class="text">Hello there.</td></tr></table>
        </body></html>"#;

    #[tokio::test]
    async fn test_nexus_php_end_to_end() {
        let fetcher = Arc::new(FakeFetcher::new(&[
            ("", NEXUS_INDEX),
            ("index.php", NEXUS_INDEX),
            ("userdetails.php", NEXUS_DETAIL),
            ("getusertorrentlistajax.php", NEXUS_SEEDING),
            ("messages.php", NEXUS_MAIL),
            ("viewmessage.php?id=5", NEXUS_MESSAGE),
        ]));
        let ctx = SiteContext::new("tracker", "https://tracker.example/");

        let record = orchestrator(Arc::clone(&fetcher), 50)
            .extract(&ctx)
            .await
            .unwrap();

        assert_eq!(record.scheme, "nexus-php");
        assert_eq!(record.userid.as_deref(), Some("321"));
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(record.user_level.as_deref(), Some("Elite User"));
        assert_eq!(record.upload, 100 << 30);
        assert_eq!(record.download, 50 << 30);
        assert_eq!(record.ratio, 2.0);
        assert_eq!(record.seeding_torrents.len(), 1);
        assert_eq!(record.seeding_torrents[0].name, "Only.Torrent");
        assert_eq!(record.message_unread, 1);
        assert_eq!(record.messages.len(), 1);
        assert_eq!(record.messages[0].subject.as_deref(), Some("Welcome"));
    }

    /// Extractor whose seeding parse always claims another page exists.
    struct UnboundedSeeding;

    impl crate::extractors::SiteExtractor for UnboundedSeeding {
        fn scheme(&self) -> &'static str {
            "unbounded"
        }
        fn order(&self) -> u32 {
            1
        }
        fn matches(&self, _page: &str) -> bool {
            true
        }
        fn locate_pages(&self, _page: &str, _ctx: &SiteContext) -> Result<PagePlan> {
            Ok(PagePlan {
                base_info: Some(PageRequest::new("base")),
                seeding: Some(PageRequest::new("seed")),
                ..PagePlan::default()
            })
        }
        fn parse_logged_in(&self, _page: &str) -> bool {
            true
        }
        fn parse_base_info(&self, _page: &str, _record: &mut SiteUserInfo) -> Result<()> {
            Ok(())
        }
        fn parse_seeding_page(
            &self,
            _page: &str,
            _record: &mut SiteUserInfo,
        ) -> Result<Continuation> {
            Ok(Continuation::Next(PageRequest::new("seed")))
        }
    }

    #[tokio::test]
    async fn test_seeding_cap_bounds_adversarial_continuation() {
        let mut registry = ExtractorRegistry::new();
        registry.register(Arc::new(UnboundedSeeding));

        let fetcher = Arc::new(FakeFetcher::new(&[
            ("", "anything"),
            ("base", "anything"),
            ("seed", "more"),
        ]));
        let cap = 3;
        let orchestrator = Orchestrator::new(
            Arc::new(registry),
            Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
            cap,
        );
        let ctx = SiteContext::new("adversarial", "https://bad.example/");

        let record = orchestrator.extract(&ctx).await.unwrap();

        // No more than cap + 1 seeding fetches, and the truncation is noted.
        assert_eq!(fetcher.call_count("seed"), cap + 1);
        assert!(record.notes.iter().any(|n| n.contains("page cap")));
    }
}
