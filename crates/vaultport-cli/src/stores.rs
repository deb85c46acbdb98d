use std::path::Path;
use tracing::info;

use vaultport_engine::store::{BlobStore, PageId, PageStore, StoreError, UploadError};
use vaultport_engine::{Block, FileRef};

/// Page store that logs what it would do and hands out fake page
/// identifiers. Used by `--dry-run`.
#[derive(Debug, Default)]
pub struct DryRunPages {
    created: usize,
}

impl DryRunPages {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageStore for DryRunPages {
    fn create_page(
        &mut self,
        _parent: &PageId,
        title: &str,
        _icon: Option<&str>,
    ) -> Result<PageId, StoreError> {
        let id = format!("dry-run-{}", self.created);
        self.created += 1;
        info!("[dry run] would create page: {title}");
        Ok(PageId(id))
    }

    fn append_blocks(&mut self, _page: &PageId, blocks: &[Block]) -> Result<(), StoreError> {
        info!("[dry run] would append {} blocks", blocks.len());
        Ok(())
    }
}

/// Blob store that logs instead of transferring. Each file still gets a
/// distinct fake reference so attachment blocks are previewed.
#[derive(Debug, Default)]
pub struct DryRunBlobs;

impl BlobStore for DryRunBlobs {
    fn upload(&mut self, file: &Path) -> Result<FileRef, UploadError> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("[dry run] would upload: {name}");
        Ok(FileRef::new(format!("dry-run-{name}")))
    }
}

/// Blob store for `--skip-files`: refuses every upload, so references fall
/// through to failure placeholders and show up in the report.
#[derive(Debug, Default)]
pub struct SkipBlobs;

impl BlobStore for SkipBlobs {
    fn upload(&mut self, _file: &Path) -> Result<FileRef, UploadError> {
        Err(UploadError("file uploads skipped".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_pages_hand_out_distinct_ids() {
        let mut pages = DryRunPages::new();
        let parent = PageId("root".into());
        let a = pages.create_page(&parent, "A", None).unwrap();
        let b = pages.create_page(&parent, "B", Some("📁")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn skip_blobs_refuse_every_upload() {
        let mut blobs = SkipBlobs;
        let err = blobs.upload(Path::new("/tmp/a.png")).unwrap_err();
        assert_eq!(err.0, "file uploads skipped");
    }
}
