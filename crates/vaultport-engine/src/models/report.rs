use relative_path::RelativePathBuf;
use std::path::PathBuf;

/// A reference token that could not be mapped to a file anywhere in the
/// vault. The token stays in the page as literal text; this record is the
/// trace of it for external reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    /// Vault-relative path of the note containing the reference.
    pub note: RelativePathBuf,
    /// The raw reference as written, e.g. `files/scan.pdf`.
    pub reference: String,
}

/// A resolved file that the blob store refused or failed to accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub file: PathBuf,
    pub reason: String,
}

/// A successfully transferred file, kept for the end-of-run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file: PathBuf,
    pub file_ref: String,
    /// Identifier of the page the file was uploaded for.
    pub page: String,
}

/// Upload outcomes accumulated over a whole run.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedFile>,
    pub failed: Vec<FailedUpload>,
}
