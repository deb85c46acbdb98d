pub mod client;
pub mod page_id;
pub mod render;
pub mod titles;
pub mod upload;

pub use client::NotionClient;
pub use page_id::{PageIdError, extract_page_id};
pub use titles::HtmlTitleFetcher;
pub use upload::NotionUploader;

/// API version header value sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";
pub const API_BASE: &str = "https://api.notion.com/v1";
