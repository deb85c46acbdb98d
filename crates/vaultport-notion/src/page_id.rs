use regex::Regex;
use std::sync::LazyLock;

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([a-f0-9]{8}-?[a-f0-9]{4}-?[a-f0-9]{4}-?[a-f0-9]{4}-?[a-f0-9]{12})").unwrap()
});

#[derive(Debug, thiserror::Error)]
#[error("could not extract page id from: {0}")]
pub struct PageIdError(pub String);

/// Extracts the dashed page id from any form of Notion URL.
///
/// Handles `https://www.notion.so/workspace/Page-Title-<id>`, bare-id URLs,
/// and a raw id with or without dashes. The id is the trailing 32 hex
/// characters of the last path segment.
pub fn extract_page_id(notion_url: &str) -> Result<String, PageIdError> {
    let url = notion_url
        .split(['?', '#'])
        .next()
        .unwrap_or(notion_url);
    let segment = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);

    if let Some(m) = UUID.captures(segment) {
        return Ok(dashed(&m[1].replace('-', "").to_lowercase()));
    }

    // fall back to the trailing 32 hex chars of the segment
    let hex: String = segment
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .collect();
    if hex.len() >= 32 {
        return Ok(dashed(&hex[hex.len() - 32..]));
    }

    Err(PageIdError(notion_url.to_string()))
}

fn dashed(id: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        &id[..8],
        &id[8..12],
        &id[12..16],
        &id[16..20],
        &id[20..]
    )
}
