pub mod article;
pub mod article_point;
pub mod chat_exchange;
pub mod conversation_turn;
pub mod embedding;
pub mod feed_item;
