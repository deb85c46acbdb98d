use reqwest::blocking::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use vaultport_engine::store::{PageId, PageStore, StoreError};
use vaultport_engine::Block;

use crate::render::render_blocks;
use crate::{API_BASE, NOTION_VERSION};

/// Blocks appended per request; the API caps children at 100 per call.
const BATCH_SIZE: usize = 100;
/// Pause between batches to stay under the API rate limit.
const BATCH_PAUSE: Duration = Duration::from_millis(300);

/// Page store backed by the Notion public API.
pub struct NotionClient {
    http: Client,
    token: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            token: token.into(),
        }
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, StoreError> {
        let response = self
            .http
            .post(format!("{API_BASE}{path}"))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .map_err(|e| StoreError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(StoreError(format!(
                "API request failed ({status}): {}",
                text.chars().take(200).collect::<String>()
            )));
        }
        response.json().map_err(|e| StoreError(e.to_string()))
    }
}

impl PageStore for NotionClient {
    fn create_page(
        &mut self,
        parent: &PageId,
        title: &str,
        icon: Option<&str>,
    ) -> Result<PageId, StoreError> {
        let mut body = json!({
            "parent": { "page_id": parent.as_str() },
            "properties": {
                "title": { "title": [{ "text": { "content": title } }] },
            },
        });
        if let Some(emoji) = icon {
            body["icon"] = json!({ "type": "emoji", "emoji": emoji });
        }

        let response = self.post("/pages", &body)?;
        let id = response["id"]
            .as_str()
            .ok_or_else(|| StoreError("page create response carried no id".into()))?;
        info!(title, "created page");
        Ok(PageId(id.to_string()))
    }

    fn append_blocks(&mut self, page: &PageId, blocks: &[Block]) -> Result<(), StoreError> {
        if blocks.is_empty() {
            return Ok(());
        }

        let rendered = render_blocks(blocks);
        let batches: Vec<&[Value]> = rendered.chunks(BATCH_SIZE).collect();
        let last = batches.len() - 1;
        for (i, batch) in batches.iter().enumerate() {
            self.post(
                &format!("/blocks/{}/children", page.as_str()),
                &json!({ "children": batch }),
            )?;
            if i < last {
                std::thread::sleep(BATCH_PAUSE);
            }
        }
        debug!(count = blocks.len(), page = page.as_str(), "appended blocks");
        Ok(())
    }
}
