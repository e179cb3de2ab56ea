//! Audiences variant of the NexusPhp family.
//!
//! Identical to the generic baseline except that the seeding-list endpoint
//! rejects requests whose `Referer` does not point at the member's detail
//! page, so only the seeding entry of the page plan is patched. Every other
//! role delegates to the wrapped baseline unchanged.

use crate::error::Result;
use crate::models::{Continuation, PagePlan, SiteContext, SiteMessage, SiteUserInfo};
use crate::utils::resolve;

use super::{NexusPhpExtractor, SITE_BASE_ORDER, SiteExtractor};

pub struct NexusAudiencesExtractor {
    base: NexusPhpExtractor,
}

impl NexusAudiencesExtractor {
    pub fn new() -> Self {
        Self {
            base: NexusPhpExtractor,
        }
    }

    /// Absolute URL of the member's detail page, preferring a hint cached
    /// from a prior run over the freshly located plan entry.
    fn detail_referer(&self, plan: &PagePlan, ctx: &SiteContext) -> Option<String> {
        if let Some(hint) = &ctx.detail_page_hint {
            return resolve(&ctx.base_url, hint);
        }
        let detail = plan.detail.as_ref()?;
        let mut path = detail.path.clone();
        if !detail.params.is_empty() {
            let query: Vec<String> = detail
                .params
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            path = format!("{}?{}", path, query.join("&"));
        }
        resolve(&ctx.base_url, &path)
    }
}

impl Default for NexusAudiencesExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteExtractor for NexusAudiencesExtractor {
    fn scheme(&self) -> &'static str {
        "nexus-audiences"
    }

    fn order(&self) -> u32 {
        SITE_BASE_ORDER + 5
    }

    fn matches(&self, page: &str) -> bool {
        page.contains("audiences.me")
    }

    fn locate_pages(&self, page: &str, ctx: &SiteContext) -> Result<PagePlan> {
        let mut plan = self.base.locate_pages(page, ctx)?;
        if let Some(referer) = self.detail_referer(&plan, ctx) {
            if let Some(seeding) = plan.seeding.as_mut() {
                seeding.headers.push(("Referer".to_string(), referer));
            }
        }
        Ok(plan)
    }

    fn parse_logged_in(&self, page: &str) -> bool {
        self.base.parse_logged_in(page)
    }

    fn parse_base_info(&self, page: &str, record: &mut SiteUserInfo) -> Result<()> {
        self.base.parse_base_info(page, record)
    }

    fn parse_traffic_info(&self, page: &str, record: &mut SiteUserInfo) -> Result<()> {
        self.base.parse_traffic_info(page, record)
    }

    fn parse_detail_info(&self, page: &str, record: &mut SiteUserInfo) -> Result<()> {
        self.base.parse_detail_info(page, record)
    }

    fn parse_seeding_page(&self, page: &str, record: &mut SiteUserInfo) -> Result<Continuation> {
        self.base.parse_seeding_page(page, record)
    }

    fn parse_unread_links(&self, page: &str) -> Vec<String> {
        self.base.parse_unread_links(page)
    }

    fn parse_message_content(&self, page: &str) -> Option<SiteMessage> {
        self.base.parse_message_content(page)
    }
}
