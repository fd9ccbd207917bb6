use std::sync::Arc;

use common::helper::error_chain_fmt;
use tracing::{error, info, warn};

use crate::{
    domain::{
        entities::{article::Article, article_point::ArticlePoint, feed_item::FeedItem},
        services::{
            text_sanitizer::sanitize,
            vector_collection_store::{VectorCollectionStore, VectorCollectionStoreError},
        },
    },
    ports::{
        embeddings_port::{EmbeddingsError, EmbeddingsPort},
        feed_source_port::FeedSourcePort,
    },
};

pub const DEFAULT_MAX_ITEMS_PER_FEED: usize = 20;
pub const DEFAULT_MAX_ARTICLES: usize = 50;

/// Outcome of one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionReport {
    /// Articles for which an embedding was requested
    pub attempted: usize,
    pub inserted: usize,
    pub failed: usize,
}

/// Rebuilds the article collection from the configured news feeds.
///
/// The collection is emptied first. Feeds are read in order, at most `max_items_per_feed`
/// items from each and `max_articles` overall. A feed that cannot be fetched or an article
/// that cannot be embedded or stored is logged and skipped.
pub struct IngestFeedsUseCase {
    store: Arc<VectorCollectionStore>,
    embeddings: Arc<dyn EmbeddingsPort>,
    feed_source: Arc<dyn FeedSourcePort>,
    feeds: Vec<String>,
    max_items_per_feed: usize,
    max_articles: usize,
}

impl IngestFeedsUseCase {
    pub fn new(
        store: Arc<VectorCollectionStore>,
        embeddings: Arc<dyn EmbeddingsPort>,
        feed_source: Arc<dyn FeedSourcePort>,
        feeds: Vec<String>,
    ) -> Self {
        Self {
            store,
            embeddings,
            feed_source,
            feeds,
            max_items_per_feed: DEFAULT_MAX_ITEMS_PER_FEED,
            max_articles: DEFAULT_MAX_ARTICLES,
        }
    }

    pub fn with_limits(mut self, max_items_per_feed: usize, max_articles: usize) -> Self {
        self.max_items_per_feed = max_items_per_feed;
        self.max_articles = max_articles;
        self
    }

    #[tracing::instrument(name = "Ingesting news feeds", skip(self), fields(feeds = self.feeds.len()))]
    pub async fn run(&self) -> Result<IngestionReport, IngestFeedsError> {
        self.store.reset().await?;

        let mut report = IngestionReport::default();

        'feeds: for feed_url in &self.feeds {
            if report.attempted >= self.max_articles {
                break;
            }

            let items = match self.feed_source.fetch(feed_url).await {
                Ok(items) => items,
                Err(error) => {
                    warn!(%feed_url, ?error, "Skipping feed");
                    continue;
                }
            };

            for item in items.iter().take(self.max_items_per_feed) {
                if report.attempted >= self.max_articles {
                    break 'feeds;
                }
                report.attempted += 1;

                match self.ingest_item(item).await {
                    Ok(()) => report.inserted += 1,
                    Err(error) => {
                        error!(%feed_url, ?error, "Skipping article");
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            attempted = report.attempted,
            inserted = report.inserted,
            failed = report.failed,
            "Ingested {} articles",
            report.attempted
        );
        Ok(report)
    }

    async fn ingest_item(&self, item: &FeedItem) -> Result<(), ArticleProcessingError> {
        let article = Article::from_feed_item(item);
        let vector = self.embeddings.embed(&article.text).await?;

        self.store
            .upsert(ArticlePoint {
                id: article.id,
                vector,
                payload: sanitize(&article.payload()),
            })
            .await?;

        Ok(())
    }
}

#[derive(thiserror::Error)]
pub enum IngestFeedsError {
    #[error("Failed to reset the articles collection")]
    ResetError(#[from] VectorCollectionStoreError),
}

impl std::fmt::Debug for IngestFeedsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Failure of one article, never stops the ingestion
#[derive(thiserror::Error)]
pub enum ArticleProcessingError {
    #[error(transparent)]
    Embeddings(#[from] EmbeddingsError),
    #[error(transparent)]
    VectorStore(#[from] VectorCollectionStoreError),
}

impl std::fmt::Debug for ArticleProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
