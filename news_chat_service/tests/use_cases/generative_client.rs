use std::{sync::Arc, time::Duration};

use claims::{assert_matches, assert_ok};
use news_chat_service::domain::services::{
    backoff::BackoffPolicy,
    generative_client::{GenerativeClient, GenerativeError, NO_ANSWER_MESSAGE, UNAVAILABLE_MESSAGE},
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    fakes::{Reply, ScriptedGenerateContent},
    helpers::{conversation, init_tracing},
};

/// The paused clock jumps straight to timer deadlines, rounded to the millisecond
fn assert_waited(waited: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    assert!(
        waited >= expected && waited < expected + Duration::from_millis(5),
        "waited {:?}, expected {:?}",
        waited,
        expected
    );
}

fn client(api: Arc<ScriptedGenerateContent>) -> GenerativeClient {
    GenerativeClient::new(api, BackoffPolicy::default(), 5)
}

#[tokio::test(start_paused = true)]
async fn an_overloaded_provider_is_retried_with_doubling_delays() {
    init_tracing();
    let api = Arc::new(ScriptedGenerateContent::new(
        vec![Reply::Overloaded, Reply::Overloaded, Reply::Overloaded],
        Reply::answer("It rained."),
    ));
    let start = Instant::now();

    let answer = assert_ok!(client(api.clone()).generate(&conversation(4)).await);

    assert_eq!(answer, "It rained.");
    assert_waited(start.elapsed(), 1000 + 2000 + 4000);

    let instants = api.request_instants();
    assert_eq!(instants.len(), 4);
    for (gap, expected_ms) in instants.windows(2).zip([1000, 2000, 4000]) {
        assert_waited(gap[1] - gap[0], expected_ms);
    }
}

#[tokio::test(start_paused = true)]
async fn a_provider_overloaded_for_every_attempt_gives_the_unavailable_message() {
    init_tracing();
    let api = Arc::new(ScriptedGenerateContent::always(Reply::Overloaded));
    let start = Instant::now();

    let answer = assert_ok!(client(api.clone()).generate(&conversation(2)).await);

    assert_eq!(answer, UNAVAILABLE_MESSAGE);
    assert_eq!(api.requests().len(), 5);
    // No wait after the last attempt
    assert_waited(start.elapsed(), 1000 + 2000 + 4000 + 8000);
}

#[tokio::test]
async fn only_the_last_five_turns_are_sent() {
    init_tracing();
    let api = Arc::new(ScriptedGenerateContent::always(Reply::answer("ok")));

    assert_ok!(client(api.clone()).generate(&conversation(8)).await);

    let requests = api.requests();
    assert_eq!(requests.len(), 1);

    let texts: Vec<String> = requests[0]
        .contents
        .iter()
        .map(|content| content.parts[0].text.clone().unwrap_or_default())
        .collect();
    assert_eq!(texts, vec!["doc4", "doc5", "doc6", "doc7", "hi"]);
}

#[tokio::test]
async fn a_non_transient_failure_is_not_retried() {
    init_tracing();
    let api = Arc::new(ScriptedGenerateContent::new(
        vec![Reply::Status(400)],
        Reply::answer("never reached"),
    ));

    let result = client(api.clone()).generate(&conversation(2)).await;

    assert_matches!(result, Err(GenerativeError::Fatal(_)));
    assert_eq!(api.requests().len(), 1);
}

#[tokio::test]
async fn an_answer_without_text_gives_the_no_answer_message() {
    init_tracing();
    let api = Arc::new(ScriptedGenerateContent::always(Reply::Empty));

    let answer = assert_ok!(client(api).generate(&conversation(2)).await);

    assert_eq!(answer, NO_ANSWER_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn a_cancelled_call_stops_waiting_between_attempts() {
    init_tracing();
    let api = Arc::new(ScriptedGenerateContent::always(Reply::Overloaded));
    let cancellation = CancellationToken::new();
    cancellation.cancel();

    let result = client(api.clone())
        .generate_with_cancellation(&conversation(2), &cancellation)
        .await;

    assert_matches!(result, Err(GenerativeError::Cancelled));
    assert_eq!(api.requests().len(), 1);
}
