use news_chat_service::configuration::HistoryMode;
use serde_json::{json, Value as JsonValue};

use crate::{
    fakes::Reply,
    helpers::{spawn_app, spawn_app_with, TestAppOptions},
};

#[tokio::test]
async fn chat_returns_the_model_reply_and_records_the_exchange() {
    let app = spawn_app().await;
    let session_id = app.create_session().await;

    let response = app.post_chat(&session_id, "What happened today?").await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.json::<JsonValue>().await.unwrap(),
        json!({ "reply": "Here is the news." })
    );
    assert_eq!(
        app.get_history(&session_id).await.json::<JsonValue>().await.unwrap(),
        json!([{ "user": "What happened today?", "bot": "Here is the news." }])
    );
}

#[tokio::test]
async fn exchanges_are_appended_in_order() {
    let app = spawn_app().await;
    let session_id = app.create_session().await;

    app.post_chat(&session_id, "first").await;
    app.post_chat(&session_id, "second").await;

    let history = app
        .get_history(&session_id)
        .await
        .json::<JsonValue>()
        .await
        .unwrap();
    assert_eq!(history[0]["user"], "first");
    assert_eq!(history[1]["user"], "second");
}

#[tokio::test]
async fn retrieved_articles_are_sent_as_context() {
    let app = spawn_app().await;
    let session_id = app.create_session().await;

    app.post_chat(&session_id, "news?").await;

    let requests = app.generate_content.requests();
    assert_eq!(requests.len(), 1);
    let texts: Vec<String> = requests[0]
        .contents
        .iter()
        .filter_map(|content| content.parts[0].text.clone())
        .collect();
    assert_eq!(
        texts,
        vec!["Storm hits the coast", "Markets rally", "New bridge opens", "news?"]
    );
}

#[tokio::test]
async fn the_previous_exchanges_are_sent_when_history_aware() {
    let app = spawn_app_with(TestAppOptions {
        history_mode: HistoryMode::HistoryAware,
        ..Default::default()
    })
    .await;
    let session_id = app.create_session().await;

    app.post_chat(&session_id, "first").await;
    app.post_chat(&session_id, "second").await;

    let requests = app.generate_content.requests();
    let turns: Vec<(&str, String)> = requests[1]
        .contents
        .iter()
        .map(|content| {
            (
                content.role.as_str(),
                content.parts[0].text.clone().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        turns,
        vec![
            ("user", "first".to_string()),
            ("model", "Here is the news.".to_string()),
            ("system", "Storm hits the coast".to_string()),
            ("system", "Markets rally".to_string()),
            ("user", "second".to_string()),
        ]
    );
}

#[tokio::test]
async fn a_failure_of_the_model_gives_a_generic_500() {
    let app = spawn_app_with(TestAppOptions {
        reply: Reply::Status(400),
        ..Default::default()
    })
    .await;
    let session_id = app.create_session().await;

    let response = app.post_chat(&session_id, "hello").await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response.json::<JsonValue>().await.unwrap(),
        json!({ "error": "Failed to get response" })
    );
    assert_eq!(
        app.get_history(&session_id).await.json::<JsonValue>().await.unwrap(),
        json!([])
    );
}

#[tokio::test]
async fn a_failure_of_the_embeddings_gives_a_generic_500() {
    let app = spawn_app_with(TestAppOptions {
        failing_embeddings: true,
        ..Default::default()
    })
    .await;
    let session_id = app.create_session().await;

    let response = app.post_chat(&session_id, "hello").await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response.json::<JsonValue>().await.unwrap(),
        json!({ "error": "Failed to get response" })
    );
}

#[tokio::test]
async fn a_body_without_message_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(&format!("{}/chat", &app.address))
        .json(&json!({ "sessionId": "abc" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
}
