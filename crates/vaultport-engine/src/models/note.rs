use chrono::NaiveDate;
use std::path::PathBuf;

/// Intermediate representation of one parsed note.
///
/// Produced once per input file by [`crate::parsing::NoteParser`] and
/// consumed by [`crate::builder::BlockBuilder`]; nothing retains it across
/// documents.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteIr {
    /// Filename stem with any leading date prefix removed.
    pub title: String,
    /// Date prefix (`YYYY-MM-DD`) extracted from the filename, if present.
    pub date: Option<NaiveDate>,
    /// Frontmatter key/value pairs in document order. Values stay strings.
    pub frontmatter: Vec<(String, String)>,
    /// Body text with the frontmatter block removed.
    pub body: String,
    /// File-reference spans discovered in the body, in document order.
    pub references: Vec<RefSpan>,
    /// `[[wikilink]]` targets (non-embed), for reporting only.
    pub internal_links: Vec<String>,
}

impl NoteIr {
    /// Title used for the created page: date prefix restored in front of the
    /// remaining title text.
    pub fn page_title(&self) -> String {
        match self.date {
            Some(date) => format!("{} {}", date.format("%Y-%m-%d"), self.title)
                .trim()
                .to_string(),
            None => self.title.clone(),
        }
    }
}

/// A byte range of the note body claimed by one file-reference token.
///
/// `start..end` index the exact substring of [`NoteIr::body`] holding the
/// token. Spans produced by different detection rules never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSpan {
    /// The full matched token, e.g. `![[scan.pdf]]` or `[report](report.pdf)`.
    pub token: String,
    /// The raw reference inside the token, before any decoding.
    pub reference: String,
    /// Filesystem path the reference resolved to, if any.
    pub resolved: Option<PathBuf>,
    pub start: usize,
    pub end: usize,
}

impl RefSpan {
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}
