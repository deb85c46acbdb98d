use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::{
    AttachmentKind, Block, FailedUpload, FileRef, RefSpan, Upload, UploadReport, UploadedFile,
};

/// Reason a blob store rejected or failed a file transfer. Carried verbatim
/// into failure placeholders and the end-of-run report.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct UploadError(pub String);

/// Failure from the page store, already flattened to a message.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Identifier of a page in the target store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageId(pub String);

impl PageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Receives file bytes and hands back an opaque reference.
pub trait BlobStore {
    fn upload(&mut self, file: &Path) -> Result<FileRef, UploadError>;
}

/// Best-effort page title lookup for bare URLs. Bounded latency, never
/// fails loudly; absence of a title is the failure mode.
pub trait TitleFetcher {
    fn fetch_title(&self, url: &str) -> Option<String>;
}

/// A fetcher that never finds a title. Bare URLs keep the URL as their
/// label. Used in tests and dry runs.
pub struct NoTitles;

impl TitleFetcher for NoTitles {
    fn fetch_title(&self, _url: &str) -> Option<String> {
        None
    }
}

/// Consumer of the block builder's output.
pub trait PageStore {
    fn create_page(
        &mut self,
        parent: &PageId,
        title: &str,
        icon: Option<&str>,
    ) -> Result<PageId, StoreError>;

    /// Appends blocks in order. Implementations may batch internally; the
    /// block sequence tolerates arbitrary batching.
    fn append_blocks(&mut self, page: &PageId, blocks: &[Block]) -> Result<(), StoreError>;
}

/// Fetched titles keyed by URL. `None` caches a failed fetch so it is not
/// retried within the run.
pub type TitleCache = HashMap<String, Option<String>>;

/// Upload outcomes keyed by canonicalized file path, so each distinct file
/// is sent to the blob store at most once per run.
#[derive(Debug, Default)]
pub struct UploadCache {
    entries: HashMap<PathBuf, Upload>,
}

impl UploadCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(file: &Path) -> PathBuf {
        file.canonicalize().unwrap_or_else(|_| file.to_path_buf())
    }

    pub fn get(&self, file: &Path) -> Option<&Upload> {
        self.entries.get(&Self::key(file))
    }

    pub fn insert(&mut self, file: &Path, upload: Upload) {
        self.entries.insert(Self::key(file), upload);
    }
}

/// The attachment outcome for one reference token, ready for the block
/// builder.
#[derive(Debug, Clone)]
pub struct AttachmentOutcome {
    pub kind: AttachmentKind,
    pub name: String,
    pub upload: Upload,
}

/// Uploads every resolved reference of a note and returns the per-token
/// outcomes in span order. Unresolved spans are skipped; their tokens stay
/// literal text. Cache hits are not re-uploaded and not re-reported.
pub fn upload_references(
    references: &[RefSpan],
    page: &PageId,
    blobs: &mut dyn BlobStore,
    cache: &mut UploadCache,
    report: &mut UploadReport,
) -> Vec<(String, AttachmentOutcome)> {
    let mut outcomes: Vec<(String, AttachmentOutcome)> = vec![];

    for span in references {
        let Some(path) = &span.resolved else {
            continue;
        };
        if outcomes.iter().any(|(token, _)| token == &span.token) {
            continue;
        }

        let upload = match cache.get(path) {
            Some(upload) => upload.clone(),
            None => {
                let upload = match blobs.upload(path) {
                    Ok(file_ref) => {
                        info!(file = %path.display(), "uploaded attachment");
                        report.uploaded.push(UploadedFile {
                            file: path.clone(),
                            file_ref: file_ref.as_str().to_string(),
                            page: page.as_str().to_string(),
                        });
                        Upload::Uploaded(file_ref)
                    }
                    Err(err) => {
                        tracing::warn!(file = %path.display(), reason = %err, "upload failed");
                        report.failed.push(FailedUpload {
                            file: path.clone(),
                            reason: err.0.clone(),
                        });
                        Upload::Failed(err.0)
                    }
                };
                cache.insert(path, upload.clone());
                upload
            }
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| span.reference.clone());
        outcomes.push((
            span.token.clone(),
            AttachmentOutcome {
                kind: AttachmentKind::from_path(path),
                name,
                upload,
            },
        ));
    }

    outcomes
}
