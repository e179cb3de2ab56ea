//! YemaPT variant: a JSON API site.
//!
//! One authenticated endpoint (`api/consumer/fetchSelfDetail`) carries
//! identity, traffic and bonus in a single payload, so the traffic and
//! detail roles are folded into base info. The platform exposes no seeding
//! list or message enumeration API and no crawlable login indicator; both
//! gaps are kept as documented partial capabilities.

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{PagePlan, PageRequest, PageRole, SiteContext, SiteUserInfo};
use crate::utils::dates::unify_datetime;

use super::{SITE_BASE_ORDER, SiteExtractor};

pub struct YemaExtractor;

#[derive(Debug, Deserialize)]
struct YemaEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<YemaProfile>,
}

/// Profile payload; unrecognized extra fields are ignored deterministically.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct YemaProfile {
    id: Option<i64>,
    name: Option<String>,
    level: Option<String>,
    register_time: Option<String>,
    upload_size: Option<u64>,
    download_size: Option<u64>,
    bonus: Option<f64>,
}

impl SiteExtractor for YemaExtractor {
    fn scheme(&self) -> &'static str {
        "yema"
    }

    fn order(&self) -> u32 {
        SITE_BASE_ORDER + 60
    }

    fn matches(&self, page: &str) -> bool {
        page.contains("<title>YemaPT</title>")
    }

    fn locate_pages(&self, _page: &str, _ctx: &SiteContext) -> Result<PagePlan> {
        Ok(PagePlan {
            base_info: Some(
                PageRequest::new("api/consumer/fetchSelfDetail")
                    .with_header("Content-Type", "application/json")
                    .with_header("Accept", "application/json, text/plain, */*"),
            ),
            traffic: None,
            detail: None,
            mail_unread: None,
            seeding: None,
        })
    }

    /// The API offers no crawlable session indicator; authenticity is
    /// pre-verified by the caller. Known weakening, not a silent bug.
    fn parse_logged_in(&self, _page: &str) -> bool {
        true
    }

    fn parse_base_info(&self, page: &str, record: &mut SiteUserInfo) -> Result<()> {
        let envelope: YemaEnvelope = serde_json::from_str(page)
            .map_err(|e| AppError::parse(self.scheme(), PageRole::BaseInfo, e))?;
        if !envelope.success {
            return Err(AppError::parse(
                self.scheme(),
                PageRole::BaseInfo,
                "response did not report success",
            ));
        }
        let profile = envelope.data.unwrap_or_default();

        record.userid = profile.id.map(|id| id.to_string());
        record.username = profile.name;
        record.user_level = profile.level;
        record.join_at = profile
            .register_time
            .as_deref()
            .and_then(unify_datetime);
        record.upload = profile.upload_size.unwrap_or(0);
        record.download = profile.download_size.unwrap_or(0);
        record.bonus = profile.bonus;
        record.message_unread = 0;
        Ok(())
    }

    fn capability_notes(&self) -> Vec<String> {
        vec![
            "YemaPT has no per-item seeding list API; seeding torrents are unavailable"
                .to_string(),
        ]
    }
}
