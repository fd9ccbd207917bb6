use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::helpers::spawn_app;

#[tokio::test]
async fn a_new_session_has_a_uuid_and_an_empty_history() {
    let app = spawn_app().await;

    let session_id = app.create_session().await;

    assert!(Uuid::parse_str(&session_id).is_ok());

    let response = app.get_history(&session_id).await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.json::<JsonValue>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn an_unknown_session_has_an_empty_history() {
    let app = spawn_app().await;

    let response = app.get_history("unknown").await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.json::<JsonValue>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn a_cleared_session_loses_its_history() {
    let app = spawn_app().await;
    let session_id = app.create_session().await;
    assert!(app.post_chat(&session_id, "hello").await.status().is_success());

    let response = app.delete_session(&session_id).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.json::<JsonValue>().await.unwrap(),
        json!({ "status": "cleared" })
    );
    assert_eq!(
        app.get_history(&session_id).await.json::<JsonValue>().await.unwrap(),
        json!([])
    );
}
