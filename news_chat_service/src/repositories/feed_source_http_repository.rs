use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::{
    domain::{entities::feed_item::FeedItem, readers::feed_xml_reader::read_feed},
    ports::feed_source_port::{FeedSourceError, FeedSourcePort},
};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads RSS / Atom documents over HTTP
pub struct FeedSourceHttpRepository {
    client: Client,
}

impl FeedSourceHttpRepository {
    pub fn try_new() -> Result<Self, FeedSourceError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedSourceError::RequestError(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSourcePort for FeedSourceHttpRepository {
    #[tracing::instrument(name = "Fetching feed", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>, FeedSourceError> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| FeedSourceError::RequestError(e.to_string()))?
            .text()
            .await
            .map_err(|e| FeedSourceError::RequestError(e.to_string()))?;

        let items = read_feed(&body)?;

        info!("Fetched {} items", items.len());
        Ok(items)
    }
}
