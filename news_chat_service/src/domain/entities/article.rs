use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

use super::feed_item::FeedItem;

pub const DEFAULT_ARTICLE_TEXT: &str = "No content";
pub const DEFAULT_ARTICLE_TITLE: &str = "No title";

/// A news article built from a feed item, ready to be embedded
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: Uuid,
    /// Text that gets embedded: the item short content, or its title, or a placeholder
    pub text: String,
    pub title: String,
    pub link: String,
}

impl Article {
    /// Builds an article with a fresh id from a feed item
    pub fn from_feed_item(item: &FeedItem) -> Self {
        let text = non_empty(item.content_snippet.as_deref())
            .or_else(|| non_empty(item.title.as_deref()))
            .unwrap_or(DEFAULT_ARTICLE_TEXT)
            .to_string();

        Self {
            id: Uuid::new_v4(),
            text,
            title: non_empty(item.title.as_deref())
                .unwrap_or(DEFAULT_ARTICLE_TITLE)
                .to_string(),
            link: item.link.clone().unwrap_or_default(),
        }
    }

    /// Raw (not yet sanitized) payload stored next to the article vector
    pub fn payload(&self) -> Map<String, JsonValue> {
        let mut payload = Map::new();
        payload.insert("text".into(), json!(self.text));
        payload.insert("title".into(), json!(self.title));
        payload.insert("link".into(), json!(self.link));
        payload
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
