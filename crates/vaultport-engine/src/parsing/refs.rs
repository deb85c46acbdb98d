use regex::Regex;
use relative_path::RelativePath;
use std::path::Path;
use std::sync::LazyLock;

use crate::models::{RefSpan, UnresolvedRef};
use crate::resolve::Resolver;

static EMBED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").unwrap());
static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").unwrap());

/// Link paths ending in one of these are treated as local file references
/// rather than navigation links.
pub const FILE_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", // documents
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".bmp", // images
    ".mp4", ".mov", ".webm", ".avi", ".mkv", // video
    ".mp3", ".wav", ".ogg", ".m4a", ".flac", // audio
    ".zip", ".tar", ".gz", ".rar", ".7z", // archives
    ".txt", ".csv", ".json", ".xml", ".yaml", ".yml", // data
    ".html", ".htm", ".ipynb",
];

/// Result of scanning a note body for file references.
pub struct RefScan {
    pub spans: Vec<RefSpan>,
    pub unresolved: Vec<UnresolvedRef>,
}

/// Scans `body` with the three reference rules in precedence order:
/// embeds `![[ref]]`, then images `![alt](path)`, then generic file links
/// `[text](path)`. A byte range claimed by an earlier rule is skipped by
/// later ones, so the same token never yields two spans.
pub fn discover(
    body: &str,
    note_dir: &Path,
    note: &RelativePath,
    resolver: &Resolver,
) -> RefScan {
    let mut scan = RefScan {
        spans: vec![],
        unresolved: vec![],
    };
    let mut claimed: Vec<(usize, usize)> = vec![];

    for caps in EMBED.captures_iter(body) {
        let m = caps.get(0).unwrap();
        let reference = caps[1].trim().to_string();
        claimed.push((m.start(), m.end()));
        record(&mut scan, note, note_dir, resolver, m, reference);
    }

    for caps in IMAGE.captures_iter(body) {
        let m = caps.get(0).unwrap();
        if overlaps(&claimed, m.start(), m.end()) {
            continue;
        }
        let path = caps[2].trim().to_string();
        if is_remote(&path) {
            continue;
        }
        claimed.push((m.start(), m.end()));
        record(&mut scan, note, note_dir, resolver, m, path);
    }

    for caps in LINK.captures_iter(body) {
        let m = caps.get(0).unwrap();
        // an image token is this pattern preceded by `!`
        if m.start() > 0 && body.as_bytes()[m.start() - 1] == b'!' {
            continue;
        }
        if overlaps(&claimed, m.start(), m.end()) {
            continue;
        }
        let path = caps[2].trim().to_string();
        if is_remote(&path) || path.starts_with('#') || path.starts_with("mailto:") {
            continue;
        }
        let lower = path.to_lowercase();
        if !FILE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            continue;
        }
        claimed.push((m.start(), m.end()));
        record(&mut scan, note, note_dir, resolver, m, path);
    }

    scan.spans.sort_by_key(|s| s.start);
    scan
}

/// Collects `[[target]]` / `[[target|label]]` targets, excluding embeds
/// (`![[...]]`). Wikilinks render as plain text; the targets are kept only
/// for reporting.
pub fn internal_links(body: &str) -> Vec<String> {
    let mut links = vec![];
    for caps in WIKILINK.captures_iter(body) {
        let m = caps.get(0).unwrap();
        if m.start() > 0 && body.as_bytes()[m.start() - 1] == b'!' {
            continue;
        }
        links.push(caps[1].to_string());
    }
    links
}

fn record(
    scan: &mut RefScan,
    note: &RelativePath,
    note_dir: &Path,
    resolver: &Resolver,
    m: regex::Match<'_>,
    reference: String,
) {
    let resolved = resolver.resolve(&reference, note_dir);
    if resolved.is_none() {
        tracing::warn!(reference, note = %note, "unresolved file reference");
        scan.unresolved.push(UnresolvedRef {
            note: note.to_owned(),
            reference: reference.clone(),
        });
    }
    scan.spans.push(RefSpan {
        token: m.as_str().to_string(),
        reference,
        resolved,
        start: m.start(),
        end: m.end(),
    });
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:")
}

fn overlaps(claimed: &[(usize, usize)], start: usize, end: usize) -> bool {
    claimed.iter().any(|&(s, e)| start < e && end > s)
}
