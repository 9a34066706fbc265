//! Integration tests for `contact.submit`.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use bridgia_integration_tests::{FailingNotifier, RecordingNotifier, TestApp};

#[tokio::test]
async fn test_submit_without_company() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = TestApp::spawn(notifier.clone()).await;

    let resp = app
        .post(
            "contact.submit",
            &json!({
                "name": "Jane Smith",
                "email": "jane@example.com",
                "message": "I'd like to learn more about your services."
            }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body, json!({ "success": true }));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "New Contact Form Submission from Bridgia");
    assert_eq!(
        sent[0].content,
        "New inquiry from Jane Smith (jane@example.com)\n\n\
         Message: I'd like to learn more about your services."
    );
}

#[tokio::test]
async fn test_submit_with_company_is_listed() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = TestApp::spawn(notifier.clone()).await;

    let resp = app
        .post(
            "contact.submit",
            &json!({
                "name": "Khalid",
                "email": "khalid@acme.sa",
                "company": "Acme",
                "message": "Partnership inquiry"
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(notifier.sent()[0].content.contains("(khalid@acme.sa) at Acme\n\n"));

    let cookie = app.login_as_admin("test123").await;
    let listed: Vec<Value> = app
        .client
        .get(app.url("/api/admin.getSubmissions"))
        .header("cookie", cookie)
        .send()
        .await
        .expect("Failed to list submissions")
        .json()
        .await
        .expect("Failed to parse submissions");

    assert_eq!(listed.len(), 1);
    let entry = &listed[0];
    assert_eq!(entry["name"], "Khalid");
    assert_eq!(entry["email"], "khalid@acme.sa");
    assert_eq!(entry["company"], "Acme");
    assert_eq!(entry["message"], "Partnership inquiry");
    assert!(entry["id"].is_string());
    assert!(entry["createdAt"].is_string());
}

#[tokio::test]
async fn test_submit_reports_all_invalid_fields() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = TestApp::spawn(notifier.clone()).await;

    let resp = app
        .post(
            "contact.submit",
            &json!({ "name": "  ", "email": "not-an-email", "message": "" }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["fields"]["name"], "Name is required");
    assert_eq!(body["error"]["fields"]["email"], "Invalid email");
    assert_eq!(body["error"]["fields"]["message"], "Message is required");
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_notifier_failure_keeps_submission() {
    let app = TestApp::spawn(Arc::new(FailingNotifier)).await;

    let resp = app
        .post(
            "contact.submit",
            &json!({
                "name": "Jane Smith",
                "email": "jane@example.com",
                "message": "Are you there?"
            }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(body["error"]["message"], "Internal server error");

    let cookie = app.login_as_admin("test123").await;
    let listed: Vec<Value> = app
        .client
        .get(app.url("/api/admin.getSubmissions"))
        .header("cookie", cookie)
        .send()
        .await
        .expect("Failed to list submissions")
        .json()
        .await
        .expect("Failed to parse submissions");

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["message"], "Are you there?");
}
