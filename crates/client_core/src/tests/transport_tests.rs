use std::sync::Arc;

use super::*;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use shared::error::LaunchErrorKind;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
}

async fn handle_start_bot(
    State(state): State<StubState>,
    Json(payload): Json<serde_json::Value>,
) -> (StatusCode, String) {
    state.received.lock().await.push(payload);
    (state.status, state.body.clone())
}

async fn spawn_stub(
    status: StatusCode,
    body: &str,
) -> anyhow::Result<(String, Arc<Mutex<Vec<serde_json::Value>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status,
        body: body.to_string(),
        received: received.clone(),
    };
    let app = Router::new()
        .route("/start_bot", post(handle_start_bot))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), received))
}

fn sample_request() -> StartBotRequest {
    StartBotRequest {
        system_prompt: "You moderate the meetup".to_string(),
        sprite_folder: Some("parkingmeter".to_string()),
        name: Some("Moderator".to_string()),
    }
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    assert_eq!(
        start_bot_endpoint("http://localhost:7860").expect("url").as_str(),
        "http://localhost:7860/start_bot"
    );
    assert_eq!(
        start_bot_endpoint("https://bots.example/api/").expect("url").as_str(),
        "https://bots.example/api/start_bot"
    );
}

#[test]
fn endpoint_rejects_garbage_base() {
    let err = start_bot_endpoint("not a url").expect_err("must fail");
    assert!(err.to_string().contains("invalid bot launch service url"));
}

#[tokio::test]
async fn posts_request_body_and_parses_room() {
    let (base_url, received) = spawn_stub(
        StatusCode::OK,
        r#"{"room_url":"https://example/room/abc","token":"t0k"}"#,
    )
    .await
    .expect("spawn stub");
    let transport = HttpBotLaunchTransport::new(&base_url).expect("transport");

    let response = transport
        .start_bot(&sample_request())
        .await
        .expect("start bot");

    assert_eq!(response.room_url, "https://example/room/abc");
    assert_eq!(response.token.as_deref(), Some("t0k"));
    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0],
        serde_json::json!({
            "system_prompt": "You moderate the meetup",
            "sprite_folder": "parkingmeter",
            "name": "Moderator",
        })
    );
}

#[tokio::test]
async fn server_error_surfaces_detail() {
    let (base_url, _received) = spawn_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"detail":"Failed to spawn VM: no capacity"}"#,
    )
    .await
    .expect("spawn stub");
    let transport = HttpBotLaunchTransport::new(&base_url).expect("transport");

    let err = transport
        .start_bot(&sample_request())
        .await
        .expect_err("must fail");

    assert_eq!(
        err,
        LaunchError::Http {
            status: 500,
            detail: Some("Failed to spawn VM: no capacity".to_string()),
        }
    );
    assert_eq!(err.user_message(), "Failed to spawn VM: no capacity");
}

#[tokio::test]
async fn non_success_with_room_body_is_still_a_failure() {
    let (base_url, _received) = spawn_stub(
        StatusCode::BAD_GATEWAY,
        r#"{"room_url":"https://example/room/abc"}"#,
    )
    .await
    .expect("spawn stub");
    let transport = HttpBotLaunchTransport::new(&base_url).expect("transport");

    let err = transport
        .start_bot(&sample_request())
        .await
        .expect_err("must fail");

    assert_eq!(
        err,
        LaunchError::Http {
            status: 502,
            detail: None,
        }
    );
}

#[tokio::test]
async fn unexpected_success_body_is_malformed() {
    let (base_url, _received) = spawn_stub(StatusCode::OK, r#"{"test":true}"#)
        .await
        .expect("spawn stub");
    let transport = HttpBotLaunchTransport::new(&base_url).expect("transport");

    let err = transport
        .start_bot(&sample_request())
        .await
        .expect_err("must fail");

    assert_eq!(err.kind(), LaunchErrorKind::MalformedResponse);
}

#[tokio::test]
async fn empty_room_url_is_malformed() {
    let (base_url, _received) = spawn_stub(StatusCode::OK, r#"{"room_url":""}"#)
        .await
        .expect("spawn stub");
    let transport = HttpBotLaunchTransport::new(&base_url).expect("transport");

    let err = transport
        .start_bot(&sample_request())
        .await
        .expect_err("must fail");

    assert_eq!(err.kind(), LaunchErrorKind::MalformedResponse);
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let transport = HttpBotLaunchTransport::new(&format!("http://{addr}")).expect("transport");

    let err = transport
        .start_bot(&sample_request())
        .await
        .expect_err("must fail");

    assert_eq!(err.kind(), LaunchErrorKind::Network);
}
