//! Thread lookup integration tests

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::common::{json_request, parse_body, TestApp};

#[tokio::test]
async fn test_get_conversation_returns_history() {
    let app = TestApp::new();
    let thread = app.start_thread("student123", &["MATH.ALG.2"]).await;

    let req = json_request(
        Method::POST,
        "/chat/message",
        Some(json!({
            "conversation_id": thread.id,
            "content": "this is hard",
            "action": "chat"
        })),
    );
    app.router().oneshot(req).await.unwrap();

    let uri = format!("/chat/conversation/{}", thread.id);
    let resp = app
        .router()
        .oneshot(json_request(Method::GET, &uri, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = parse_body(resp).await;
    assert_eq!(body["id"], thread.id.as_str());
    assert_eq!(body["content_id"], "content456");

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["action"], "chat");
    assert_eq!(messages[0]["content"], "this is hard");
    assert!(messages[1].get("action").is_none());
    assert_eq!(messages[1]["feedback"]["engagement"], 0.8);
    assert!(messages[1]["content"]
        .as_str()
        .unwrap()
        .starts_with("I understand your comment."));
}

#[tokio::test]
async fn test_get_missing_conversation_returns_404() {
    let app = TestApp::new();

    let resp = app
        .router()
        .oneshot(json_request(Method::GET, "/chat/conversation/nope", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = parse_body(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "Conversation not found");
}

#[tokio::test]
async fn test_list_conversations_by_student() {
    let app = TestApp::new();
    app.start_thread("student123", &["MATH.ALG.1"]).await;
    app.start_thread("student123", &["SCIENCE.PHYS.1"]).await;
    app.start_thread("student999", &["MATH.ALG.2"]).await;

    let resp = app
        .router()
        .oneshot(json_request(
            Method::GET,
            "/chat/conversations?student_id=student123",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = parse_body(resp).await;
    let threads = body.as_array().unwrap();
    assert_eq!(threads.len(), 2);
    assert!(threads.iter().all(|t| t["student_id"] == "student123"));
}

#[tokio::test]
async fn test_list_conversations_requires_student_id() {
    let app = TestApp::new();

    let resp = app
        .router()
        .oneshot(json_request(Method::GET, "/chat/conversations", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
