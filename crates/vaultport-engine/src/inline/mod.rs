//! Converts one line of inline text into styled [`TextRun`]s.
//!
//! Stages run in precedence order, each consuming only text the earlier
//! stages left unclaimed: wikilink rewrite, markdown link spans, bare URLs,
//! then emphasis markers. Emphasis matching is non-nested and
//! first-match-wins; this mirrors the source format's loose conventions and
//! is a deliberate contract, not a gap to fix.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::models::TextRun;
use crate::store::{TitleCache, TitleFetcher};

static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").unwrap());
static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>\[\]()]+").unwrap());
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*[^*]+\*\*|__[^_]+__|\*[^*]+\*|_[^_]+_|`[^`]+`").unwrap());

/// Punctuation stripped from the end of a bare URL match before validation.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', '"', '\''];

/// Segments lines into rich-text runs, fetching page titles for bare URLs
/// through the injected collaborator (cached per URL for the whole run).
pub struct Segmenter<'a> {
    fetcher: &'a dyn TitleFetcher,
    titles: &'a mut TitleCache,
}

impl<'a> Segmenter<'a> {
    pub fn new(fetcher: &'a dyn TitleFetcher, titles: &'a mut TitleCache) -> Self {
        Self { fetcher, titles }
    }

    /// Produces the ordered run sequence for one line of text.
    ///
    /// Never returns an empty vector: an empty line yields a single empty
    /// unstyled run, so every block keeps non-empty rich-text content.
    pub fn segment(&mut self, line: &str) -> Vec<TextRun> {
        let text = rewrite_wikilinks(line);

        let mut runs = vec![];
        let mut last = 0;
        for caps in MD_LINK.captures_iter(&text) {
            let m = caps.get(0).unwrap();
            if m.start() > last {
                runs.extend(self.with_bare_urls(&text[last..m.start()]));
            }

            let label = &caps[1];
            match sanitize_url(&caps[2]) {
                Some(url) => runs.push(TextRun::linked(label, url)),
                // invalid target: keep the text, drop the link
                None => runs.extend(formatted(label)),
            }
            last = m.end();
        }
        if last < text.len() {
            runs.extend(self.with_bare_urls(&text[last..]));
        }

        let mut out: Vec<TextRun> = runs.into_iter().flat_map(TextRun::chunked).collect();
        if out.is_empty() {
            out.push(TextRun::plain(""));
        }
        out
    }

    /// Scans text outside markdown links for bare URLs, labelling each with
    /// its fetched page title when one is available.
    fn with_bare_urls(&mut self, text: &str) -> Vec<TextRun> {
        let mut runs = vec![];
        let mut last = 0;

        for m in BARE_URL.find_iter(text) {
            // a `(` right before means this URL is a markdown link target
            // already handled upstream
            if m.start() > 0 && text.as_bytes()[m.start() - 1] == b'(' {
                continue;
            }
            let raw = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            let Some(url) = sanitize_url(raw) else {
                continue;
            };

            if m.start() > last {
                runs.extend(formatted(&text[last..m.start()]));
            }
            let label = self.title_for(&url).unwrap_or_else(|| url.clone());
            runs.push(TextRun::linked(label, url));

            // stripped punctuation flows back into the following text
            last = m.start() + raw.len();
        }

        if runs.is_empty() {
            return formatted(text);
        }
        if last < text.len() {
            runs.extend(formatted(&text[last..]));
        }
        runs
    }

    fn title_for(&mut self, url: &str) -> Option<String> {
        if let Some(cached) = self.titles.get(url) {
            return cached.clone();
        }
        let title = self.fetcher.fetch_title(url);
        self.titles.insert(url.to_string(), title.clone());
        title
    }
}

/// Rewrites wikilinks to their visible text: `[[target|label]]` becomes
/// `label`, `[[target]]` becomes `target`. Wikilinks never keep a hyperlink.
/// Embed tokens (`![[...]]`) are left untouched so an unresolved embed
/// survives verbatim in the output.
fn rewrite_wikilinks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in WIKILINK.captures_iter(text) {
        let m = caps.get(0).unwrap();
        if m.start() > 0 && text.as_bytes()[m.start() - 1] == b'!' {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        match caps.get(2) {
            Some(label) => out.push_str(label.as_str()),
            None => out.push_str(&caps[1]),
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Validates and normalizes a URL for the target store.
///
/// Accepts only absolute `http`/`https` URLs whose host contains a dot;
/// surrounding angle brackets and quotes are stripped first. Returns `None`
/// for anything else.
pub fn sanitize_url(raw: &str) -> Option<String> {
    let url = raw
        .trim()
        .trim_matches(['<', '>'])
        .trim_matches(['"', '\'']);
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return None;
    }

    let parsed = Url::parse(url).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    let host = parsed.host_str()?;
    if !host.contains('.') {
        return None;
    }
    Some(url.to_string())
}

/// Splits text into emphasis-styled runs: `**bold**`, `__bold__`,
/// `*italic*`, `_italic_`, `` `code` ``. Non-nested, first match wins.
fn formatted(text: &str) -> Vec<TextRun> {
    let mut runs = vec![];
    let mut last = 0;

    for m in EMPHASIS.find_iter(text) {
        if m.start() > last {
            runs.push(TextRun::plain(&text[last..m.start()]));
        }
        runs.push(classify(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        runs.push(TextRun::plain(&text[last..]));
    }
    runs
}

fn classify(token: &str) -> TextRun {
    if let Some(inner) = strip_marker(token, "**").or_else(|| strip_marker(token, "__")) {
        TextRun {
            content: inner.to_string(),
            bold: true,
            ..TextRun::default()
        }
    } else if let Some(inner) = strip_marker(token, "*").or_else(|| strip_marker(token, "_")) {
        TextRun {
            content: inner.to_string(),
            italic: true,
            ..TextRun::default()
        }
    } else if let Some(inner) = strip_marker(token, "`") {
        TextRun {
            content: inner.to_string(),
            code: true,
            ..TextRun::default()
        }
    } else {
        TextRun::plain(token)
    }
}

fn strip_marker<'t>(token: &'t str, marker: &str) -> Option<&'t str> {
    token
        .strip_prefix(marker)
        .and_then(|t| t.strip_suffix(marker))
        .filter(|inner| !inner.is_empty())
}
