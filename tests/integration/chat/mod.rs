//! Chat flow integration tests: start, message, regenerate

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use tutor_content::mock::MockContentService;

use crate::common::{json_request, parse_body, TestApp};

mod test_start_conversation {
    use super::*;

    #[tokio::test]
    async fn test_start_creates_thread_per_content() {
        let app = TestApp::new();
        let req = json_request(
            Method::POST,
            "/chat/start?student_id=student123",
            Some(json!({"usmos": ["MATH.ALG.1", "MATH.ALG.2"]})),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        let threads = body["threads"].as_array().unwrap();
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(contents.len(), 2);

        assert_eq!(contents[0]["content_id"], "content123");
        assert_eq!(contents[0]["problem"], "Solve for x: x + 5 = 10");
        assert_eq!(threads[0]["student_id"], "student123");
        assert_eq!(threads[0]["content_id"], "content123");
        assert_eq!(threads[0]["usmos"], json!(["MATH.ALG.1"]));
        assert_eq!(threads[0]["messages"], json!([]));
        assert_eq!(threads[1]["content_id"], "content456");

        assert_eq!(app.store.len(), 2);
    }

    #[tokio::test]
    async fn test_start_unknown_tags_returns_empty_lists() {
        let app = TestApp::new();
        let req = json_request(
            Method::POST,
            "/chat/start?student_id=student123",
            Some(json!({"usmos": ["HISTORY.WW2"]})),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            parse_body(resp).await,
            json!({"threads": [], "contents": []})
        );
        assert!(app.store.is_empty());
    }

    #[tokio::test]
    async fn test_start_empty_usmos_returns_400() {
        let app = TestApp::new();
        let req = json_request(
            Method::POST,
            "/chat/start?student_id=student123",
            Some(json!({"usmos": []})),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = parse_body(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("usmos list cannot be empty"));
    }

    #[tokio::test]
    async fn test_start_missing_student_id_returns_400() {
        let app = TestApp::new();
        let req = json_request(
            Method::POST,
            "/chat/start",
            Some(json!({"usmos": ["MATH.ALG.1"]})),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_start_with_empty_catalog() {
        let app = TestApp::with_content(MockContentService::empty());
        let req = json_request(
            Method::POST,
            "/chat/start?student_id=student123",
            Some(json!({"usmos": ["MATH.ALG.1"]})),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        let body = parse_body(resp).await;
        assert_eq!(body["threads"], json!([]));
    }
}

mod test_send_message {
    use super::*;

    #[tokio::test]
    async fn test_question_returns_tutor_reply() {
        let app = TestApp::new();
        let thread = app.start_thread("student123", &["MATH.ALG.1"]).await;

        let req = json_request(
            Method::POST,
            "/chat/message",
            Some(json!({
                "conversation_id": thread.id,
                "content": "How do I solve this?",
                "action": "question"
            })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body["conversation_id"], thread.id.as_str());
        let content = body["content"].as_str().unwrap();
        assert!(content.contains("Solve for x: x + 5 = 10"));
        assert!(content.contains("x = 5"));
        assert_eq!(body["feedback"]["clarity"], 0.9);
        assert!(body.get("action").is_none());
        assert!(body["timestamp"].is_string());

        let stored = app.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(stored.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_correct_answer_is_praised() {
        let app = TestApp::new();
        let thread = app.start_thread("student123", &["MATH.ALG.1"]).await;

        let req = json_request(
            Method::POST,
            "/chat/message",
            Some(json!({
                "conversation_id": thread.id,
                "content": "x = 5",
                "action": "answer"
            })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        let body = parse_body(resp).await;
        assert_eq!(body["content"], "That's correct! Well done.");
    }

    #[tokio::test]
    async fn test_unknown_action_returns_400() {
        let app = TestApp::new();
        let thread = app.start_thread("student123", &["MATH.ALG.1"]).await;

        let req = json_request(
            Method::POST,
            "/chat/message",
            Some(json!({
                "conversation_id": thread.id,
                "content": "hi",
                "action": "bogus"
            })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_body(resp).await["error"]["code"], "VALIDATION_ERROR");

        let stored = app.service.get_thread(&thread.id).await.unwrap();
        assert!(stored.messages.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_conversation_returns_404() {
        let app = TestApp::new();
        let req = json_request(
            Method::POST,
            "/chat/message",
            Some(json!({
                "conversation_id": "does-not-exist",
                "content": "hi",
                "action": "chat"
            })),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(parse_body(resp).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_regenerate_action_appends_student_message() {
        let app = TestApp::new();
        let thread = app.start_thread("student123", &["MATH.ALG.1"]).await;

        for (text, action) in [("what?", "question"), ("once more", "regenerate")] {
            let req = json_request(
                Method::POST,
                "/chat/message",
                Some(json!({
                    "conversation_id": thread.id,
                    "content": text,
                    "action": action
                })),
            );
            let resp = app.router().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let stored = app.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(stored.messages.len(), 4);
    }
}

mod test_regenerate {
    use super::*;

    #[tokio::test]
    async fn test_regenerate_replaces_last_reply() {
        let app = TestApp::new();
        let thread = app.start_thread("student123", &["MATH.ALG.1"]).await;

        let req = json_request(
            Method::POST,
            "/chat/message",
            Some(json!({
                "conversation_id": thread.id,
                "content": "x = 15",
                "action": "answer"
            })),
        );
        app.router().oneshot(req).await.unwrap();

        let req = json_request(
            Method::POST,
            "/chat/regenerate",
            Some(json!({"conversation_id": thread.id})),
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert!(body["content"]
            .as_str()
            .unwrap()
            .starts_with("Not quite. The correct answer is 'x = 5'."));

        let stored = app.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(stored.messages.len(), 2);
        assert_eq!(stored.messages[1].content(), body["content"].as_str().unwrap());
    }

    #[tokio::test]
    async fn test_regenerate_unknown_conversation_returns_404() {
        let app = TestApp::new();
        let req = json_request(
            Method::POST,
            "/chat/regenerate",
            Some(json!({"conversation_id": "does-not-exist"})),
        );

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_regenerate_missing_id_returns_400() {
        let app = TestApp::new();
        let req = json_request(Method::POST, "/chat/regenerate", Some(json!({})));

        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
