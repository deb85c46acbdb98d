use reqwest::blocking::{Client, multipart};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tracing::warn;

use vaultport_engine::FileRef;
use vaultport_engine::store::{BlobStore, UploadError};

use crate::{API_BASE, NOTION_VERSION};

/// Blob store backed by Notion's two-step file upload API: create an upload
/// object, then send the bytes as multipart form data.
pub struct NotionUploader {
    http: Client,
    token: String,
}

impl NotionUploader {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            token: token.into(),
        }
    }

    fn create_upload(&self, name: &str, content_type: &str) -> Result<String, UploadError> {
        let response = self
            .http
            .post(format!("{API_BASE}/file_uploads"))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({ "filename": name, "content_type": content_type }))
            .send()
            .map_err(|e| UploadError(format!("API create failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(UploadError(format!(
                "API create failed ({status}): {}",
                text.chars().take(100).collect::<String>()
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| UploadError(format!("API create failed: {e}")))?;
        body["id"]
            .as_str()
            .map(|id| id.to_string())
            .ok_or_else(|| UploadError("no file upload id returned".into()))
    }

    fn send_bytes(
        &self,
        upload_id: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), UploadError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(content_type)
            .map_err(|e| UploadError(format!("bad content type: {e}")))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{API_BASE}/file_uploads/{upload_id}/send"))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .multipart(form)
            .send()
            .map_err(|e| UploadError(format!("API send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(UploadError(format!(
                "API send failed ({status}): {}",
                text.chars().take(100).collect::<String>()
            )));
        }
        Ok(())
    }
}

impl BlobStore for NotionUploader {
    fn upload(&mut self, file: &Path) -> Result<FileRef, UploadError> {
        if !file.exists() {
            warn!(file = %file.display(), "file not found");
            return Err(UploadError("file not found".into()));
        }

        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError("file has no name".into()))?;
        let content_type = content_type_for(file);

        let upload_id = self.create_upload(&name, content_type)?;
        let bytes = fs::read(file).map_err(|e| UploadError(format!("read failed: {e}")))?;
        self.send_bytes(&upload_id, &name, content_type, bytes)?;

        Ok(FileRef::new(upload_id))
    }
}

/// MIME type from the file extension, defaulting to a byte stream.
fn content_type_for(file: &Path) -> &'static str {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tiff" => "image/tiff",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "html" | "htm" => "text/html",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        _ => "application/octet-stream",
    }
}
