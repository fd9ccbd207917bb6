/// The fields read from one entry of a syndication feed (RSS `<item>` or Atom `<entry>`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Plain text summary of the item, HTML removed
    pub content_snippet: Option<String>,
}
