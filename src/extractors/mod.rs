// src/extractors/mod.rs

//! Site extractor trait and per-family implementations.
//!
//! Each private-tracker family implements [`SiteExtractor`]; per-site
//! variants are thin overlays that replace only the steps differing from
//! their family baseline (classification predicate, single page-plan roles,
//! individual parsers) and delegate the rest.

mod nexus_audiences;
mod nexus_php;
mod registry;
mod yema;

// Re-export all public types
pub use nexus_audiences::NexusAudiencesExtractor;
pub use nexus_php::NexusPhpExtractor;
pub use registry::ExtractorRegistry;
pub use yema::YemaExtractor;

use crate::error::Result;
use crate::models::{Continuation, PagePlan, SiteContext, SiteMessage, SiteUserInfo};

/// Base classification rank for family extractors. Variants register with an
/// offset from this so family-specific overlays sort before their generic
/// base.
pub const SITE_BASE_ORDER: u32 = 100;

/// Extraction contract shared by every site family.
///
/// Parsers must fail soft on missing optional fields (populate what is
/// there); only the mandatory base-info parse may return an error. None of
/// the methods perform network I/O.
pub trait SiteExtractor: Send + Sync {
    /// Unique site-family identifier.
    fn scheme(&self) -> &'static str;

    /// Classification rank; lower values are tried first.
    fn order(&self) -> u32;

    /// Classification predicate, evaluated against the landing page content.
    fn matches(&self, page: &str) -> bool;

    /// Compute the page plan for this site. Pure function of the landing
    /// page content and the static site context.
    fn locate_pages(&self, page: &str, ctx: &SiteContext) -> Result<PagePlan>;

    /// Check the landing page for a login/session marker.
    fn parse_logged_in(&self, page: &str) -> bool;

    /// Parse identity fields and, for single-endpoint sites, traffic and
    /// bonus as well.
    fn parse_base_info(&self, page: &str, record: &mut SiteUserInfo) -> Result<()>;

    /// Parse the traffic page. No-op for sites whose base info already
    /// carries traffic fields.
    fn parse_traffic_info(&self, _page: &str, _record: &mut SiteUserInfo) -> Result<()> {
        Ok(())
    }

    /// Parse the detail page. No-op for sites without one.
    fn parse_detail_info(&self, _page: &str, _record: &mut SiteUserInfo) -> Result<()> {
        Ok(())
    }

    /// Parse one page of seeding torrents, appending items to the record in
    /// document order, and return the continuation cursor.
    fn parse_seeding_page(
        &self,
        _page: &str,
        _record: &mut SiteUserInfo,
    ) -> Result<Continuation> {
        Ok(Continuation::Done)
    }

    /// Extract relative links to unread messages. Default: no enumeration.
    fn parse_unread_links(&self, _page: &str) -> Vec<String> {
        Vec::new()
    }

    /// Parse one message-body page. Default: capability absent.
    fn parse_message_content(&self, _page: &str) -> Option<SiteMessage> {
        None
    }

    /// Notes about capabilities this site permanently lacks; attached to
    /// every finished record so gaps are documented rather than silent.
    fn capability_notes(&self) -> Vec<String> {
        Vec::new()
    }
}
