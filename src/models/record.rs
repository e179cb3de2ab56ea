//! Canonical user-statistics record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One seeding torrent, as reported by the site's seeding list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedingTorrent {
    /// Torrent display name
    pub name: String,

    /// Torrent size in bytes (0 when the site omits it)
    pub size_bytes: u64,

    /// Current seeder count, where the site exposes it
    pub seeders: Option<u32>,
}

/// One site message (subject, sender, body), all fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteMessage {
    pub subject: Option<String>,
    pub sender: Option<String>,
    pub body: Option<String>,
}

/// The canonical output record of one extraction run.
///
/// Fields a site does not expose stay `None` (or 0 for counters); the record
/// is never rejected for missing optional data. `ratio` is derived by
/// [`SiteUserInfo::finalize`] and never independently settable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SiteUserInfo {
    /// Site display name (from the caller's context)
    pub site: String,

    /// Scheme of the extractor that produced this record
    pub scheme: String,

    /// Site-internal user id
    pub userid: Option<String>,

    /// Username
    pub username: Option<String>,

    /// Site-assigned rank label
    pub user_level: Option<String>,

    /// Join timestamp, unified to one canonical representation.
    /// `None` is the explicit "unknown" marker for unparsable dates.
    pub join_at: Option<NaiveDateTime>,

    /// Total uploaded bytes (0 when missing)
    pub upload: u64,

    /// Total downloaded bytes (0 when missing)
    pub download: u64,

    /// Derived share ratio, rounded to 2 decimal places
    pub ratio: f64,

    /// Site currency balance
    pub bonus: Option<f64>,

    /// Unread message count (0 if none or unsupported)
    pub message_unread: u32,

    /// Seeding torrents, in page-fetch order
    pub seeding_torrents: Vec<SeedingTorrent>,

    /// Bodies of unread messages, for sites that enumerate them
    pub messages: Vec<SiteMessage>,

    /// Human-readable annotations about partial data or absent capabilities
    pub notes: Vec<String>,
}

impl SiteUserInfo {
    /// Create an empty record for one run.
    pub fn new(site: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            scheme: scheme.into(),
            ..Self::default()
        }
    }

    /// Attach a partial-data note to the record.
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Derive the share ratio from the aggregated totals. Called last,
    /// after every page has been parsed.
    pub fn finalize(&mut self) {
        self.ratio = compute_ratio(self.upload, self.download);
    }
}

/// `round(upload / max(download, 1), 2)`.
///
/// The denominator clamp avoids division by zero; the result is not a
/// literal ratio when download is 0.
pub fn compute_ratio(upload: u64, download: u64) -> f64 {
    let denominator = download.max(1) as f64;
    (upload as f64 / denominator * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_zero_download() {
        assert_eq!(compute_ratio(1000, 0), 1000.0);
    }

    #[test]
    fn test_ratio_zero_upload() {
        assert_eq!(compute_ratio(0, 500), 0.0);
    }

    #[test]
    fn test_ratio_rounds_to_two_places() {
        // 1 / 3 = 0.3333... -> 0.33
        assert_eq!(compute_ratio(1, 3), 0.33);
        // 2 / 3 = 0.6666... -> 0.67
        assert_eq!(compute_ratio(2, 3), 0.67);
    }

    #[test]
    fn test_finalize_derives_ratio() {
        let mut record = SiteUserInfo::new("test", "scheme");
        record.upload = 150;
        record.download = 100;
        record.finalize();
        assert_eq!(record.ratio, 1.5);
    }
}
