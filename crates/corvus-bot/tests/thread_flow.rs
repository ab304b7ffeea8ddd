//! End-to-end thread message handling tests against a mocked provider.

mod common;

use common::{
    bot_thread, history_message, message, MockGateway, TestHarness, BOT_USER_ID, USER_ID,
};

use corvus_bot::access::DENIAL_QUOTA_EXCEEDED;
use corvus_bot::gateway::NoticeKind;
use corvus_bot::handler::{
    self, EMPTY_RESPONSE_NOTICE, GENERATION_FAILED_NOTICE, THREAD_CLOSED_NOTICE,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const THREAD_ID: i64 = 9001;

async fn harness_with_reply(reply: &str) -> (TestHarness, MockServer) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [{"type": "text", "text": reply}]
        })))
        .mount(&server)
        .await;

    let mut harness = TestHarness::new().await;
    harness.route_anthropic(&server.uri());
    (harness, server)
}

fn start_conversation(harness: &TestHarness) {
    harness.state.conversations.start(
        THREAD_ID,
        harness.state.config.chat_system_prompt.clone(),
        harness.state.config.anthropic.params.clone(),
    );
}

#[tokio::test]
async fn successful_reply_is_sent_and_usage_counted() {
    let (harness, _server) = harness_with_reply("hello from the model").await;
    start_conversation(&harness);

    let gateway = MockGateway::with_history(vec![
        history_message("alice", "how are you?"),
        history_message("corvus", "hi alice"),
        history_message("alice", "hi bot"),
    ]);

    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(USER_ID, bot_thread(THREAD_ID, 3)),
    )
    .await;

    assert_eq!(gateway.sent_texts(), vec!["hello from the model"]);
    assert!(gateway.sent_notices().is_empty());
    assert_eq!(harness.state.usage.user_daily_usage(USER_ID).await.unwrap(), 1);
}

#[tokio::test]
async fn long_reply_is_chunked_in_order() {
    // 4500 chars against a 2000-char limit: three chunks, concatenation
    // equal to the original.
    let reply = "x".repeat(4500);
    let (harness, _server) = harness_with_reply(&reply).await;
    start_conversation(&harness);

    let gateway = MockGateway::default();
    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(USER_ID, bot_thread(THREAD_ID, 1)),
    )
    .await;

    let sent = gateway.sent_texts();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].len(), 2000);
    assert_eq!(sent[1].len(), 2000);
    assert_eq!(sent[2].len(), 500);
    assert_eq!(sent.concat(), reply);
}

#[tokio::test]
async fn provider_failure_sends_error_notice_without_counting_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let mut harness = TestHarness::new().await;
    harness.route_anthropic(&server.uri());
    start_conversation(&harness);

    let gateway = MockGateway::default();
    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(USER_ID, bot_thread(THREAD_ID, 1)),
    )
    .await;

    assert!(gateway.sent_texts().is_empty());
    let notices = gateway.sent_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
    assert_eq!(notices[0].text, GENERATION_FAILED_NOTICE);
    assert_eq!(harness.state.usage.user_daily_usage(USER_ID).await.unwrap(), 0);
}

#[tokio::test]
async fn empty_reply_becomes_a_warning_notice() {
    let (harness, _server) = harness_with_reply("").await;
    start_conversation(&harness);

    let gateway = MockGateway::default();
    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(USER_ID, bot_thread(THREAD_ID, 1)),
    )
    .await;

    assert!(gateway.sent_texts().is_empty());
    let notices = gateway.sent_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Warning);
    assert_eq!(notices[0].text, EMPTY_RESPONSE_NOTICE);
}

#[tokio::test]
async fn quota_exhausted_is_denied_before_generation() {
    let (harness, server) = harness_with_reply("should never be requested").await;
    start_conversation(&harness);
    harness.state.usage.set_default_daily_limit(0).await.unwrap();

    let gateway = MockGateway::default();
    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(USER_ID, bot_thread(THREAD_ID, 1)),
    )
    .await;

    let notices = gateway.sent_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].text, DENIAL_QUOTA_EXCEEDED);
    assert!(gateway.sent_texts().is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn context_window_exceeded_closes_the_thread() {
    let (harness, server) = harness_with_reply("should never be requested").await;
    start_conversation(&harness);

    let window = harness.state.config.chat_context_window;
    let gateway = MockGateway::default();
    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(USER_ID, bot_thread(THREAD_ID, window + 1)),
    )
    .await;

    let notices = gateway.sent_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Info);
    assert_eq!(notices[0].text, THREAD_CLOSED_NOTICE);
    assert_eq!(*gateway.locked.lock().unwrap(), vec![THREAD_ID]);
    assert!(harness.state.conversations.get(THREAD_ID).is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn bot_own_messages_are_ignored() {
    let (harness, server) = harness_with_reply("should never be requested").await;
    start_conversation(&harness);

    let gateway = MockGateway::default();
    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(BOT_USER_ID, bot_thread(THREAD_ID, 2)),
    )
    .await;

    assert!(gateway.sent_texts().is_empty());
    assert!(gateway.sent_notices().is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn foreign_threads_are_ignored() {
    let (harness, _server) = harness_with_reply("should never be requested").await;
    start_conversation(&harness);

    let mut thread = bot_thread(THREAD_ID, 2);
    thread.owner_id = USER_ID;

    let gateway = MockGateway::default();
    handler::on_message_posted(&harness.state, &gateway, message(USER_ID, thread)).await;

    assert!(gateway.sent_texts().is_empty());
    assert!(gateway.sent_notices().is_empty());
}

#[tokio::test]
async fn locked_threads_are_ignored() {
    let (harness, _server) = harness_with_reply("should never be requested").await;
    start_conversation(&harness);

    let mut thread = bot_thread(THREAD_ID, 2);
    thread.locked = true;

    let gateway = MockGateway::default();
    handler::on_message_posted(&harness.state, &gateway, message(USER_ID, thread)).await;

    assert!(gateway.sent_texts().is_empty());
    assert!(gateway.sent_notices().is_empty());
}

#[tokio::test]
async fn blocked_users_are_ignored_silently() {
    let (harness, _server) = harness_with_reply("should never be requested").await;
    start_conversation(&harness);

    harness
        .state
        .access
        .enable(USER_ID, corvus_core::Privilege::Blocked)
        .await
        .unwrap();

    let gateway = MockGateway::default();
    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(USER_ID, bot_thread(THREAD_ID, 2)),
    )
    .await;

    assert!(gateway.sent_texts().is_empty());
    assert!(gateway.sent_notices().is_empty());
}

#[tokio::test]
async fn threads_without_a_conversation_are_ignored() {
    let (harness, server) = harness_with_reply("should never be requested").await;
    // No conversation started for this thread.

    let gateway = MockGateway::default();
    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(USER_ID, bot_thread(THREAD_ID, 2)),
    )
    .await;

    assert!(gateway.sent_texts().is_empty());
    assert!(gateway.sent_notices().is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn history_is_sent_oldest_first() {
    let (harness, server) = harness_with_reply("ok").await;
    start_conversation(&harness);

    let gateway = MockGateway::with_history(vec![
        history_message("alice", "third"),
        history_message("corvus", "second"),
        history_message("alice", "first"),
    ]);

    handler::on_message_posted(
        &harness.state,
        &gateway,
        message(USER_ID, bot_thread(THREAD_ID, 3)),
    )
    .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = requests[0].body_json().unwrap();
    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    // Oldest first, the bot's own turn mapped to assistant, and a trailing
    // assistant stub.
    assert_eq!(contents, vec!["first", "second", "third", ""]);
    assert_eq!(body["messages"][1]["role"], "assistant");
    assert_eq!(body["messages"][0]["role"], "user");
}
