pub mod frontmatter;
pub mod refs;

use chrono::NaiveDate;
use regex::Regex;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::models::{NoteIr, UnresolvedRef};
use crate::resolve::Resolver;

static DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read note {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("note has no usable file stem: {0}")]
    BadStem(PathBuf),
}

/// Parses wiki-style markdown notes into [`NoteIr`].
///
/// The parser owns the [`Resolver`] it consults for each discovered
/// reference and accumulates unresolved-reference records across the run,
/// to be drained for the final report.
pub struct NoteParser {
    resolver: Resolver,
    unresolved: Vec<UnresolvedRef>,
}

impl NoteParser {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            unresolved: vec![],
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Unresolved references seen so far, in discovery order.
    pub fn unresolved(&self) -> &[UnresolvedRef] {
        &self.unresolved
    }

    pub fn take_unresolved(&mut self) -> Vec<UnresolvedRef> {
        std::mem::take(&mut self.unresolved)
    }

    /// Reads and parses one note file. A document either parses completely
    /// or not at all; no partial IR is ever produced.
    pub fn parse_file(&mut self, path: &Path) -> Result<NoteIr, ParseError> {
        let content = fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ParseError::BadStem(path.to_path_buf()))?;
        let note_dir = path.parent().unwrap_or(Path::new("."));
        let note = self.note_identifier(path);
        Ok(self.parse(&content, stem, note_dir, &note))
    }

    /// Pure parse of note contents; only reference resolution touches the
    /// filesystem. `note` identifies the document in failure records.
    pub fn parse(
        &mut self,
        content: &str,
        stem: &str,
        note_dir: &Path,
        note: &RelativePath,
    ) -> NoteIr {
        let (date, title) = split_stem(stem);

        let (frontmatter, body) = match frontmatter::parse(content) {
            Some(fm) => {
                let body = content[fm.body_start..].to_string();
                (fm.entries, body)
            }
            None => (vec![], content.to_string()),
        };

        let scan = refs::discover(&body, note_dir, note, &self.resolver);
        self.unresolved.extend(scan.unresolved);

        let internal_links = refs::internal_links(&body);

        NoteIr {
            title,
            date,
            frontmatter,
            body,
            references: scan.spans,
            internal_links,
        }
    }

    fn note_identifier(&self, path: &Path) -> RelativePathBuf {
        let rel = path
            .strip_prefix(self.resolver.vault_root())
            .unwrap_or(path);
        RelativePathBuf::from(rel.to_string_lossy().replace('\\', "/"))
    }
}

/// Splits a filename stem into an optional leading date and the title.
///
/// A prefix matching `YYYY-MM-DD` that is also a valid calendar date is
/// stripped (with any following whitespace); if nothing remains the date
/// itself, formatted back, becomes the title.
fn split_stem(stem: &str) -> (Option<NaiveDate>, String) {
    if let Some(m) = DATE_PREFIX.find(stem)
        && let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d")
    {
        let rest = stem[m.end()..].trim();
        let title = if rest.is_empty() {
            date.format("%Y-%m-%d").to_string()
        } else {
            rest.to_string()
        };
        return (Some(date), title);
    }
    (None, stem.to_string())
}
