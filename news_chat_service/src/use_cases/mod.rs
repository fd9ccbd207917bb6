pub mod answer_chat;
pub mod ingest_feeds;
