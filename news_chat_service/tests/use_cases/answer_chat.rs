use std::sync::Arc;

use claims::{assert_matches, assert_ok};
use news_chat_service::{
    configuration::HistoryMode,
    domain::{
        entities::{chat_exchange::ChatExchange, conversation_turn::Role},
        services::{
            backoff::BackoffPolicy, generative_client::GenerativeClient,
            vector_collection_store::VectorCollectionStore,
        },
    },
    use_cases::answer_chat::{AnswerChatError, AnswerChatUseCase},
};

use crate::{
    fakes::{FakeEmbeddings, InMemoryVectorIndex, Reply, ScriptedGenerateContent},
    helpers::{init_tracing, COLLECTION},
};

fn use_case(
    embeddings: FakeEmbeddings,
    index: Arc<InMemoryVectorIndex>,
    api: Arc<ScriptedGenerateContent>,
) -> AnswerChatUseCase {
    AnswerChatUseCase::new(
        Arc::new(embeddings),
        Arc::new(VectorCollectionStore::new(index, COLLECTION)),
        Arc::new(GenerativeClient::new(api, BackoffPolicy::default(), 5)),
    )
}

fn sent_turns(api: &ScriptedGenerateContent) -> Vec<(Role, String)> {
    api.requests()[0]
        .contents
        .iter()
        .map(|content| {
            (
                content.role,
                content.parts[0].text.clone().unwrap_or_default(),
            )
        })
        .collect()
}

#[tokio::test]
async fn the_three_most_similar_articles_are_sent_as_context() {
    init_tracing();
    let index = Arc::new(InMemoryVectorIndex::with_texts(
        COLLECTION,
        &["doc1", "doc2", "doc3", "doc4"],
    ));
    let api = Arc::new(ScriptedGenerateContent::always(Reply::answer("Sunny.")));

    let answer = assert_ok!(
        use_case(FakeEmbeddings::default(), index, api.clone())
            .answer("weather?")
            .await
    );

    assert_eq!(answer, "Sunny.");
    assert_eq!(
        sent_turns(&api),
        vec![
            (Role::System, "doc1".to_string()),
            (Role::System, "doc2".to_string()),
            (Role::System, "doc3".to_string()),
            (Role::User, "weather?".to_string()),
        ]
    );
}

#[tokio::test]
async fn a_missing_collection_is_created_and_the_question_still_answered() {
    init_tracing();
    let index = Arc::new(InMemoryVectorIndex::default());
    let api = Arc::new(ScriptedGenerateContent::always(Reply::answer("No idea.")));

    let answer = assert_ok!(
        use_case(FakeEmbeddings::default(), index.clone(), api.clone())
            .answer("anything new?")
            .await
    );

    assert_eq!(answer, "No idea.");
    assert_eq!(index.collection_names(), vec![COLLECTION]);
    assert_eq!(sent_turns(&api), vec![(Role::User, "anything new?".to_string())]);
}

#[tokio::test]
async fn an_embedding_failure_is_returned_without_calling_the_model() {
    init_tracing();
    let api = Arc::new(ScriptedGenerateContent::always(Reply::answer("unused")));

    let result = use_case(
        FakeEmbeddings::always_failing(),
        Arc::new(InMemoryVectorIndex::default()),
        api.clone(),
    )
    .answer("hi")
    .await;

    assert_matches!(result, Err(AnswerChatError::Embeddings(_)));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn the_history_is_ignored_when_stateless() {
    init_tracing();
    let index = Arc::new(InMemoryVectorIndex::with_texts(COLLECTION, &["doc1"]));
    let api = Arc::new(ScriptedGenerateContent::always(Reply::answer("ok")));
    let history = vec![ChatExchange {
        user: "earlier".into(),
        bot: "before".into(),
    }];

    assert_ok!(
        use_case(FakeEmbeddings::default(), index, api.clone())
            .answer_with_history("now?", &history)
            .await
    );

    assert_eq!(
        sent_turns(&api),
        vec![
            (Role::System, "doc1".to_string()),
            (Role::User, "now?".to_string()),
        ]
    );
}

#[tokio::test]
async fn the_history_is_replayed_before_the_context_when_history_aware() {
    init_tracing();
    let index = Arc::new(InMemoryVectorIndex::with_texts(COLLECTION, &["doc1"]));
    let api = Arc::new(ScriptedGenerateContent::always(Reply::answer("ok")));
    let history = vec![ChatExchange {
        user: "earlier".into(),
        bot: "before".into(),
    }];

    assert_ok!(
        use_case(FakeEmbeddings::default(), index, api.clone())
            .with_history_mode(HistoryMode::HistoryAware)
            .answer_with_history("now?", &history)
            .await
    );

    assert_eq!(
        sent_turns(&api),
        vec![
            (Role::User, "earlier".to_string()),
            (Role::Model, "before".to_string()),
            (Role::System, "doc1".to_string()),
            (Role::User, "now?".to_string()),
        ]
    );
}

#[tokio::test]
async fn the_last_exchange_reaches_the_model_whole_when_the_context_is_full() {
    init_tracing();
    let index = Arc::new(InMemoryVectorIndex::with_texts(
        COLLECTION,
        &["doc1", "doc2", "doc3"],
    ));
    let api = Arc::new(ScriptedGenerateContent::always(Reply::answer("ok")));
    let history = vec![
        ChatExchange {
            user: "q1".into(),
            bot: "a1".into(),
        },
        ChatExchange {
            user: "q2".into(),
            bot: "a2".into(),
        },
    ];

    assert_ok!(
        use_case(FakeEmbeddings::default(), index, api.clone())
            .with_history_mode(HistoryMode::HistoryAware)
            .answer_with_history("now?", &history)
            .await
    );

    assert_eq!(
        sent_turns(&api),
        vec![
            (Role::User, "q2".to_string()),
            (Role::Model, "a2".to_string()),
            (Role::System, "doc1".to_string()),
            (Role::System, "doc2".to_string()),
            (Role::User, "now?".to_string()),
        ]
    );
}
