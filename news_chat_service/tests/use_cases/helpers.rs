use common::telemetry::{get_tracing_subscriber, init_tracing_subscriber};
use news_chat_service::domain::entities::conversation_turn::ConversationTurn;
use once_cell::sync::Lazy;

// Ensures that the `tracing` stack is only initialized once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // The sink is part of the subscriber type, hence the two branches
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber).expect("Failed to set up tracing");
    } else {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber).expect("Failed to set up tracing");
    };
});

pub fn init_tracing() {
    Lazy::force(&TRACING);
}

pub const COLLECTION: &str = "news_articles";

/// A conversation of `count` turns: context turns then the user question
pub fn conversation(count: usize) -> Vec<ConversationTurn> {
    let mut turns: Vec<ConversationTurn> = (1..count)
        .map(|i| ConversationTurn::system(format!("doc{}", i)))
        .collect();
    turns.push(ConversationTurn::user("hi"));
    turns
}
