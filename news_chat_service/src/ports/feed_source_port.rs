use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::{
    entities::feed_item::FeedItem, readers::feed_xml_reader::FeedXmlReaderError,
};

/// Fetches and parses a syndication feed
#[async_trait]
pub trait FeedSourcePort: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>, FeedSourceError>;
}

#[derive(thiserror::Error)]
pub enum FeedSourceError {
    #[error("Failed to fetch feed: {0}")]
    RequestError(String),
    #[error("Failed to parse feed: {0}")]
    ParseError(#[from] FeedXmlReaderError),
}

impl std::fmt::Debug for FeedSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
