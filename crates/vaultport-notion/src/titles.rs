use regex::Regex;
use reqwest::blocking::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

use vaultport_engine::store::TitleFetcher;

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").unwrap());
// trailing " | Site Name" / " - Site Name" style suffixes
static TITLE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[|\-–—]\s*[^|\-–—]+$").unwrap());

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; vaultport/0.1)";

/// Fetches page titles for bare URLs by scraping the `<title>` tag.
/// Every failure mode is soft: the caller falls back to the URL itself.
pub struct HtmlTitleFetcher {
    http: Client,
}

impl HtmlTitleFetcher {
    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { http }
    }
}

impl Default for HtmlTitleFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleFetcher for HtmlTitleFetcher {
    fn fetch_title(&self, url: &str) -> Option<String> {
        let response = self.http.get(url).send().ok()?;
        if !response.status().is_success() {
            debug!(url, status = %response.status(), "title fetch refused");
            return None;
        }
        let body = response.text().ok()?;
        extract_title(&body)
    }
}

fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_TAG.captures(html)?[1].trim().to_string();
    let cleaned = TITLE_SUFFIX.replace(&raw, "").trim().to_string();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_tag() {
        let html = "<html><head><title>My Page</title></head></html>";
        assert_eq!(extract_title(html), Some("My Page".to_string()));
    }

    #[test]
    fn strips_site_name_suffix() {
        assert_eq!(
            extract_title("<title>Article Name | Some Site</title>"),
            Some("Article Name".to_string())
        );
        assert_eq!(
            extract_title("<title>Article Name - Some Site</title>"),
            Some("Article Name".to_string())
        );
    }

    #[test]
    fn missing_or_empty_title_is_none() {
        assert_eq!(extract_title("<html></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
    }

    #[test]
    fn title_tag_with_attributes_is_matched() {
        assert_eq!(
            extract_title("<TITLE data-x=\"1\">Hello</TITLE>"),
            Some("Hello".to_string())
        );
    }
}
