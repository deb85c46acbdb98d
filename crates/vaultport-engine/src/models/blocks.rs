use std::path::Path;

/// Maximum length, in characters, of a single rich-text run. Content longer
/// than this is split into multiple runs carrying the same style and link.
pub const MAX_RUN_LEN: usize = 2000;

/// One styled, linkable segment of text within a block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub content: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub link: Option<String>,
}

impl TextRun {
    /// An unstyled run with no link.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// A run whose content is a hyperlink label.
    pub fn linked(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            link: Some(url.into()),
            ..Self::default()
        }
    }

    /// Splits this run into chunks of at most [`MAX_RUN_LEN`] characters.
    ///
    /// Style flags and the link are preserved on every chunk. A run at or
    /// under the cap comes back unchanged as a single-element vector.
    pub fn chunked(self) -> Vec<TextRun> {
        if self.content.chars().count() <= MAX_RUN_LEN {
            return vec![self];
        }

        let template = TextRun {
            content: String::new(),
            ..self.clone()
        };
        let mut out = vec![];
        let mut chunk = String::new();
        let mut len = 0;
        for ch in self.content.chars() {
            chunk.push(ch);
            len += 1;
            if len == MAX_RUN_LEN {
                out.push(TextRun {
                    content: std::mem::take(&mut chunk),
                    ..template.clone()
                });
                len = 0;
            }
        }
        if !chunk.is_empty() {
            out.push(TextRun {
                content: chunk,
                ..template
            });
        }
        out
    }
}

/// Category of an attachment, derived from the file extension.
///
/// The category decides which typed block the target store receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    Pdf,
    File,
}

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "ico", "tiff",
];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "avi", "mkv"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "flac"];

impl AttachmentKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Audio
        } else if ext == "pdf" {
            Self::Pdf
        } else {
            Self::File
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Pdf => "pdf",
            Self::File => "file",
        }
    }
}

/// Opaque reference to a file held by the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef(String);

impl FileRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of transferring a resolved file to the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upload {
    Uploaded(FileRef),
    Failed(String),
}

/// A typed content block ready for the target page store.
///
/// Every textual variant carries an ordered, non-empty run list; `Divider`
/// carries nothing and `Code`/`Attachment` carry raw content that the output
/// boundary turns into the store's representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, runs: Vec<TextRun> },
    Paragraph { runs: Vec<TextRun> },
    Bullet { runs: Vec<TextRun> },
    Numbered { runs: Vec<TextRun> },
    Todo { checked: bool, runs: Vec<TextRun> },
    Quote { runs: Vec<TextRun> },
    Divider,
    Code { language: String, content: String },
    Attachment {
        kind: AttachmentKind,
        name: String,
        upload: Upload,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_run_is_not_split() {
        let run = TextRun::plain("hello");
        assert_eq!(run.clone().chunked(), vec![run]);
    }

    #[test]
    fn long_run_splits_preserving_style() {
        let run = TextRun {
            content: "x".repeat(MAX_RUN_LEN * 2 + 5),
            bold: true,
            link: Some("https://example.com".into()),
            ..TextRun::default()
        };
        let chunks = run.chunked();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content.len(), MAX_RUN_LEN);
        assert_eq!(chunks[2].content.len(), 5);
        for c in &chunks {
            assert!(c.bold);
            assert_eq!(c.link.as_deref(), Some("https://example.com"));
        }
    }

    #[test]
    fn chunking_respects_char_boundaries() {
        // Multi-byte chars must not be cut mid-sequence
        let run = TextRun::plain("é".repeat(MAX_RUN_LEN + 1));
        let chunks = run.chunked();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content.chars().count(), MAX_RUN_LEN);
        assert_eq!(chunks[1].content, "é");
    }

    #[test]
    fn attachment_kind_from_extension() {
        assert_eq!(
            AttachmentKind::from_path(Path::new("a/b/photo.PNG")),
            AttachmentKind::Image
        );
        assert_eq!(
            AttachmentKind::from_path(Path::new("clip.mov")),
            AttachmentKind::Video
        );
        assert_eq!(
            AttachmentKind::from_path(Path::new("song.flac")),
            AttachmentKind::Audio
        );
        assert_eq!(
            AttachmentKind::from_path(Path::new("paper.pdf")),
            AttachmentKind::Pdf
        );
        assert_eq!(
            AttachmentKind::from_path(Path::new("archive.zip")),
            AttachmentKind::File
        );
        assert_eq!(
            AttachmentKind::from_path(Path::new("no_extension")),
            AttachmentKind::File
        );
    }
}
