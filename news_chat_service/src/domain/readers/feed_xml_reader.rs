use common::helper::error_chain_fmt;
use once_cell::sync::Lazy;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use regex::Regex;
use tracing::debug;

use crate::domain::entities::feed_item::FeedItem;

#[derive(thiserror::Error)]
pub enum FeedXmlReaderError {
    #[error("{0}")]
    InvalidXml(String),
    #[error("The document is neither an RSS nor an Atom feed")]
    NotAFeed,
}

impl std::fmt::Debug for FeedXmlReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Item fields we are reading the text of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemField {
    Title,
    Link,
    Summary,
    Content,
}

impl ItemField {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" | b"summary" => Some(Self::Summary),
            b"content:encoded" | b"content" => Some(Self::Content),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ItemBuilder {
    title: String,
    link: String,
    summary: String,
    content: String,
}

impl ItemBuilder {
    fn field_mut(&mut self, field: ItemField) -> &mut String {
        match field {
            ItemField::Title => &mut self.title,
            ItemField::Link => &mut self.link,
            ItemField::Summary => &mut self.summary,
            ItemField::Content => &mut self.content,
        }
    }

    /// The full content is preferred over the summary, like feed readers do
    fn build(self) -> FeedItem {
        let snippet_source = if self.content.trim().is_empty() {
            self.summary
        } else {
            self.content
        };

        FeedItem {
            title: non_empty(collapse_whitespace(&self.title)),
            link: non_empty(self.link.trim().to_string()),
            content_snippet: non_empty(html_to_text(&snippet_source)),
        }
    }
}

/// Reads the items of an RSS 2.0 (`<item>`) or Atom (`<entry>`) document, in document order.
///
/// For each item: its title, its link (element text for RSS, `href` attribute for Atom)
/// and a plain text snippet of its content or summary, HTML tags removed.
#[tracing::instrument(name = "Reading feed XML", skip(xml), fields(xml_length = xml.len()))]
pub fn read_feed(xml: &str) -> Result<Vec<FeedItem>, FeedXmlReaderError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut items = vec![];
    let mut is_feed = false;
    let mut current_item: Option<ItemBuilder> = None;
    let mut current_field: Option<ItemField> = None;

    loop {
        match reader.read_event() {
            Err(e) => {
                return Err(FeedXmlReaderError::InvalidXml(format!(
                    "Error at position {}: {:?}",
                    reader.buffer_position(),
                    e
                )));
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"rss" | b"feed" | b"rdf:RDF" => is_feed = true,
                b"item" | b"entry" => {
                    current_item = Some(ItemBuilder::default());
                    current_field = None;
                }
                name => {
                    if let Some(item) = current_item.as_mut() {
                        // Only direct fields of the item, not the ones of nested elements
                        if current_field.is_none() {
                            current_field = ItemField::from_tag(name);
                        }
                        if current_field == Some(ItemField::Link) {
                            read_link_href(&e, item);
                        }
                    }
                }
            },
            Ok(Event::Empty(e)) => {
                if let (Some(item), b"link") = (current_item.as_mut(), e.name().as_ref()) {
                    read_link_href(&e, item);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" | b"entry" => {
                    if let Some(item) = current_item.take() {
                        items.push(item.build());
                    }
                    current_field = None;
                }
                name => {
                    if current_field.is_some() && ItemField::from_tag(name) == current_field {
                        current_field = None;
                    }
                }
            },
            Ok(Event::Text(e)) => {
                if let (Some(item), Some(field)) = (current_item.as_mut(), current_field) {
                    let text = e
                        .unescape()
                        .map(|text| text.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    append_chunk(item.field_mut(field), &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(item), Some(field)) = (current_item.as_mut(), current_field) {
                    append_chunk(
                        item.field_mut(field),
                        &String::from_utf8_lossy(&e.into_inner()),
                    );
                }
            }
            // Declarations, comments and processing instructions are not needed
            _ => (),
        }
    }

    if !is_feed {
        return Err(FeedXmlReaderError::NotAFeed);
    }

    debug!("Read {} feed items", items.len());
    Ok(items)
}

/// Atom links carry the URL in `href`. Only the first `alternate` (or rel-less) link is kept.
fn read_link_href(element: &BytesStart, item: &mut ItemBuilder) {
    if !item.link.is_empty() {
        return;
    }

    let mut href = None;
    let mut is_alternate = true;

    for attribute in element.attributes().flatten() {
        let value = attribute
            .unescape_value()
            .map(|value| value.into_owned())
            .unwrap_or_default();
        match attribute.key.as_ref() {
            b"href" => href = Some(value),
            b"rel" => is_alternate = value == "alternate",
            _ => (),
        }
    }

    if let (Some(href), true) = (href, is_alternate) {
        item.link = href;
    }
}

/// Removes HTML tags and entities left in a feed summary and collapses whitespace
fn html_to_text(html: &str) -> String {
    static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

    let without_tags = TAG.replace_all(html, " ").replace("&nbsp;", " ");
    let text = match quick_xml::escape::unescape(&without_tags) {
        Ok(text) => text.into_owned(),
        Err(_) => without_tags.clone(),
    };

    collapse_whitespace(&text)
}

/// Text events are trimmed, so chunks of one field (text then CDATA) are separated by a space
fn append_chunk(field: &mut String, chunk: &str) {
    if !field.is_empty() {
        field.push(' ');
    }
    field.push_str(chunk);
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
