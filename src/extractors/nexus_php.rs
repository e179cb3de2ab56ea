//! NexusPhp family baseline.
//!
//! Shared extraction behavior for the large family of NexusPhp-derived
//! trackers: identity and unread count on the index page, traffic totals in
//! the index info block, level/join date/bonus on `userdetails.php`, a
//! paginated seeding list served by `getusertorrentlistajax.php`, and unread
//! mail under `messages.php`. Site variants overlay this type and replace
//! only what differs.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    Continuation, PagePlan, PageRequest, PageRole, SeedingTorrent, SiteContext, SiteMessage,
    SiteUserInfo,
};
use crate::utils::dates::unify_datetime;
use crate::utils::size::parse_size_bytes;

use super::{SITE_BASE_ORDER, SiteExtractor};

const UPLOAD_LABELS: &[&str] = &["上传量", "上傳量", "Uploaded"];
const DOWNLOAD_LABELS: &[&str] = &["下载量", "下載量", "Downloaded"];
const BONUS_LABELS: &[&str] = &["魔力值", "魔力", "Karma", "Bonus", "Seed Points"];
const LEVEL_LABELS: &[&str] = &["等级", "等級", "Class"];
const JOIN_LABELS: &[&str] = &["加入日期", "注册日期", "Join date", "Join\u{a0}date"];

/// Generic NexusPhp extractor. Registered last so family-specific variants
/// get first claim on their own markers.
pub struct NexusPhpExtractor;

impl SiteExtractor for NexusPhpExtractor {
    fn scheme(&self) -> &'static str {
        "nexus-php"
    }

    fn order(&self) -> u32 {
        SITE_BASE_ORDER + 100
    }

    fn matches(&self, page: &str) -> bool {
        page.to_lowercase().contains("nexusphp")
    }

    fn locate_pages(&self, page: &str, _ctx: &SiteContext) -> Result<PagePlan> {
        // Without the member id nothing else is reachable.
        let userid = find_userid(page)
            .ok_or_else(|| AppError::page_map(self.scheme(), PageRole::BaseInfo))?;

        Ok(PagePlan {
            base_info: Some(PageRequest::new("index.php")),
            traffic: Some(PageRequest::new("index.php")),
            detail: Some(PageRequest::new("userdetails.php").with_param("id", &userid)),
            mail_unread: Some(
                PageRequest::new("messages.php")
                    .with_param("action", "viewmailbox")
                    .with_param("box", "1")
                    .with_param("unread", "yes"),
            ),
            seeding: Some(
                PageRequest::new("getusertorrentlistajax.php")
                    .with_param("userid", &userid)
                    .with_param("type", "seeding")
                    .with_param("page", "0"),
            ),
        })
    }

    fn parse_logged_in(&self, page: &str) -> bool {
        page.contains("logout.php")
    }

    fn parse_base_info(&self, page: &str, record: &mut SiteUserInfo) -> Result<()> {
        record.userid = find_userid(page);
        record.username = find_username(page);
        record.message_unread = find_unread_count(page);

        if record.userid.is_none() && record.username.is_none() {
            return Err(AppError::parse(
                self.scheme(),
                PageRole::BaseInfo,
                "no userdetails link on index page",
            ));
        }
        Ok(())
    }

    fn parse_traffic_info(&self, page: &str, record: &mut SiteUserInfo) -> Result<()> {
        let text = visible_text(page);
        if let Some(upload) = labeled_size(&text, UPLOAD_LABELS) {
            record.upload = upload;
        }
        if let Some(download) = labeled_size(&text, DOWNLOAD_LABELS) {
            record.download = download;
        }
        if record.bonus.is_none() {
            record.bonus = labeled_number(&text, BONUS_LABELS);
        }
        Ok(())
    }

    fn parse_detail_info(&self, page: &str, record: &mut SiteUserInfo) -> Result<()> {
        let document = Html::parse_document(page);
        for (label, value) in detail_rows(&document) {
            if record.user_level.is_none() && label_in(&label, LEVEL_LABELS) {
                record.user_level = non_empty(&value);
            } else if record.join_at.is_none() && label_in(&label, JOIN_LABELS) {
                record.join_at = unify_datetime(&value);
            } else if record.bonus.is_none() && label_in(&label, BONUS_LABELS) {
                record.bonus = leading_number(&value);
            }
        }
        Ok(())
    }

    fn parse_seeding_page(&self, page: &str, record: &mut SiteUserInfo) -> Result<Continuation> {
        let document = Html::parse_document(page);
        let row_sel = parse_selector("table tr")?;
        let name_sel = parse_selector("a[href*=\"details.php\"]")?;
        let td_sel = parse_selector("td")?;

        for row in document.select(&row_sel) {
            let Some(anchor) = row.select(&name_sel).next() else {
                continue; // header or filler row
            };
            let name = anchor
                .value()
                .attr("title")
                .map(str::to_string)
                .unwrap_or_else(|| element_text(&anchor));
            if name.is_empty() {
                continue;
            }

            let cells: Vec<String> = row.select(&td_sel).map(|td| element_text(&td)).collect();
            // Column convention: the first unit-suffixed cell is the size,
            // the first bare-integer cell after it is the seeder count.
            let size_index = cells.iter().position(|c| cell_size(c).is_some());
            let size_bytes = size_index.and_then(|i| cell_size(&cells[i])).unwrap_or(0);
            let seeders = cells
                .iter()
                .skip(size_index.map_or(0, |i| i + 1))
                .find_map(|c| c.trim().parse::<u32>().ok());

            record.seeding_torrents.push(SeedingTorrent {
                name,
                size_bytes,
                seeders,
            });
        }

        match next_page_href(&document) {
            Some(href) => Ok(Continuation::Next(PageRequest::new(href))),
            None => Ok(Continuation::Done),
        }
    }

    fn parse_unread_links(&self, page: &str) -> Vec<String> {
        let document = Html::parse_document(page);
        let Ok(row_sel) = Selector::parse("tr") else {
            return Vec::new();
        };
        let Ok(link_sel) = Selector::parse("a[href*=\"viewmessage\"]") else {
            return Vec::new();
        };

        let mut links = Vec::new();
        for row in document.select(&row_sel) {
            let html = row.html();
            if !(html.contains("Unread") || html.contains("未读") || html.contains("未讀")) {
                continue;
            }
            if let Some(href) = row
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
            {
                if !links.iter().any(|l| l == href) {
                    links.push(href.to_string());
                }
            }
        }
        links
    }

    fn parse_message_content(&self, page: &str) -> Option<SiteMessage> {
        let document = Html::parse_document(page);
        let subject = select_text(&document, "h1")
            .or_else(|| select_text(&document, "td.colhead"))
            .or_else(|| select_text(&document, "title"));
        let sender = select_text(&document, "a[href*=\"userdetails.php\"]");
        let body = select_text(&document, "td.text");

        if subject.is_none() && body.is_none() {
            return None;
        }
        Some(SiteMessage {
            subject,
            sender,
            body,
        })
    }
}

// --- Shared parsing helpers ---

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn userid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"userdetails\.php\?id=(\d+)").expect("userid regex is valid"))
}

/// Member id from the first `userdetails.php?id=` link on the page.
fn find_userid(page: &str) -> Option<String> {
    userid_regex()
        .captures(page)
        .map(|caps| caps[1].to_string())
}

fn find_username(page: &str) -> Option<String> {
    let document = Html::parse_document(page);
    let sel = Selector::parse("a[href*=\"userdetails.php\"]").ok()?;
    document
        .select(&sel)
        .next()
        .map(|a| element_text(&a))
        .and_then(|t| non_empty(&t))
}

fn find_unread_count(page: &str) -> u32 {
    let text = visible_text(page);
    let patterns = [
        r"(\d+)\s*条新(?:短讯|消息)",
        r"(?i)(\d+)\s*new\s+message",
        r"(?i)you have\s*(\d+)\s*unread",
    ];
    for pattern in patterns {
        if let Some(caps) = Regex::new(pattern).ok().and_then(|re| re.captures(&text)) {
            if let Ok(count) = caps[1].parse() {
                return count;
            }
        }
    }
    0
}

/// Whole-document text with tags stripped, for label scanning.
fn visible_text(page: &str) -> String {
    let document = Html::parse_document(page);
    document.root_element().text().collect::<Vec<_>>().join(" ")
}

/// Find `<label>: <size>` in plain text for any of the given labels.
fn labeled_size(text: &str, labels: &[&str]) -> Option<u64> {
    for label in labels {
        let pattern = format!(
            r"{}[:：]?\s*([\d.,]+\s*[KMGTP]?i?B)",
            regex::escape(label)
        );
        if let Some(caps) = Regex::new(&pattern).ok().and_then(|re| re.captures(text)) {
            return parse_size_bytes(&caps[1]);
        }
    }
    None
}

/// Find `<label>: <number>` in plain text for any of the given labels.
fn labeled_number(text: &str, labels: &[&str]) -> Option<f64> {
    for label in labels {
        let pattern = format!(r"{}[:：]?\s*([\d,]+(?:\.\d+)?)", regex::escape(label));
        if let Some(caps) = Regex::new(&pattern).ok().and_then(|re| re.captures(text)) {
            return caps[1].replace(',', "").parse().ok();
        }
    }
    None
}

/// Leading number of a cell value, tolerating locale commas and trailing text.
fn leading_number(value: &str) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\s*([\d,]+(?:\.\d+)?)").expect("leading number regex is valid")
    });
    let caps = re.captures(value)?;
    caps[1].replace(',', "").parse().ok()
}

/// (label, value) pairs from a NexusPhp `rowhead`/`rowfollow` detail table.
fn detail_rows(document: &Html) -> Vec<(String, String)> {
    let Ok(head_sel) = Selector::parse("td.rowhead") else {
        return Vec::new();
    };
    document
        .select(&head_sel)
        .filter_map(|head| {
            let value = head.next_siblings().find_map(ElementRef::wrap)?;
            Some((element_text(&head), element_text(&value)))
        })
        .collect()
}

fn next_page_href(document: &Html) -> Option<String> {
    if let Ok(sel) = Selector::parse("a.nextpage") {
        if let Some(href) = document
            .select(&sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            return Some(href.to_string());
        }
    }
    let sel = Selector::parse("a[href]").ok()?;
    document.select(&sel).find_map(|a| {
        let text = element_text(&a);
        let is_next = text.contains("下一页")
            || text.contains("下一頁")
            || text.to_lowercase().contains("next");
        if is_next {
            a.value().attr("href").map(str::to_string)
        } else {
            None
        }
    })
}

/// Size of a table cell, requiring a unit suffix so bare counters
/// (seeders, snatches) are not mistaken for byte totals.
fn cell_size(cell: &str) -> Option<u64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)^[\d,]+(?:\.\d+)?\s*[KMGTP]i?B$").expect("cell size regex is valid")
    });
    let trimmed = cell.trim();
    if re.is_match(trimmed) {
        parse_size_bytes(trimmed)
    } else {
        None
    }
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .map(|el| element_text(&el))
        .and_then(|t| non_empty(&t))
}

fn label_in(label: &str, labels: &[&str]) -> bool {
    labels.iter().any(|l| label.contains(l))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
