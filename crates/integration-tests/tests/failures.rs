mod harness;

use harness::config::ConfigBuilder;
use harness::mock_llm::MockLlm;
use harness::server::TestServer;
use harness::sse::{DONE, data_frames};
use harness::{chat_request, user_turn};

#[tokio::test]
async fn provider_error_status_is_bad_gateway() {
    let mock = MockLlm::start_failing().await.unwrap();
    let config = ConfigBuilder::new().with_provider("mock", &mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.chat(&chat_request("mock", "m", "p", user_turn("hi"))).await;

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "provider_error");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("500"));
    assert!(message.contains("mock server intentional failure"));
    assert!(!message.contains("server_error"), "raw body leaked: {message}");
    assert_eq!(mock.completion_count(), 1, "no retries");
}

#[tokio::test]
async fn non_stream_answer_is_an_unexpected_shape() {
    let mock = MockLlm::start_plain_json().await.unwrap();
    let config = ConfigBuilder::new().with_provider("mock", &mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.chat(&chat_request("mock", "m", "p", user_turn("hi"))).await;

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "unexpected_shape_error");
}

#[tokio::test]
async fn unreachable_provider_is_a_network_error() {
    let config = ConfigBuilder::new()
        .with_provider("mock", "http://127.0.0.1:1/v1")
        .build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.chat(&chat_request("mock", "m", "p", user_turn("hi"))).await;

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "network_error");
}

#[tokio::test]
async fn mid_stream_failure_ends_with_one_error_frame() {
    let mock = MockLlm::start_breaking_after(2).await.unwrap();
    let config = ConfigBuilder::new().with_provider("mock", &mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.chat(&chat_request("mock", "m", "p", user_turn("hi"))).await;
    assert_eq!(resp.status(), 200, "headers were already sent");

    let frames = data_frames(&resp.text().await.unwrap());

    // role chunk and two words, then the error
    assert_eq!(frames.len(), 4, "frames: {frames:?}");
    assert!(!frames.iter().any(|f| f == DONE));

    let last: serde_json::Value = serde_json::from_str(&frames[3]).unwrap();
    assert_eq!(last["error"]["type"], "provider_error");
    assert!(last["error"]["message"].as_str().unwrap().contains("mock stream interrupted"));
}

#[tokio::test]
async fn connection_lost_mid_stream_ends_with_network_error_frame() {
    let mock = MockLlm::start_dropping_after(3).await.unwrap();
    let config = ConfigBuilder::new().with_provider("mock", &mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.chat(&chat_request("mock", "m", "p", user_turn("hi"))).await;
    assert_eq!(resp.status(), 200, "headers were already sent");

    let frames = data_frames(&resp.text().await.unwrap());

    // three relayed chunks, then the error
    assert_eq!(frames.len(), 4, "frames: {frames:?}");
    assert!(!frames.iter().any(|f| f == DONE));

    let last: serde_json::Value = serde_json::from_str(&frames[3]).unwrap();
    assert_eq!(last["error"]["type"], "network_error");
}
