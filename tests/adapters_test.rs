use httpmock::prelude::*;
use serde_json::json;
use smart_shopper::adapters::openai::OpenAiClient;
use smart_shopper::adapters::resend::ResendMailer;
use smart_shopper::core::intent::parse_intent;
use smart_shopper::core::notify::Notifier;
use smart_shopper::domain::model::Email;
use smart_shopper::domain::ports::{Mailer, Storage};
use smart_shopper::{DealNotification, LocalStorage, ShopperError};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_parse_intent_uses_forced_function_call() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer sk-test")
                .body_contains(r#""tool_choice":{"type":"function","function":{"name":"extract_intent"}}"#);
            then.status(200).json_body(json!({
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_intent",
                            "type": "function",
                            "function": {
                                "name": "extract_intent",
                                "arguments": "{\"product\":\"iPhone 16\",\"timeframe\":\"in 3 months\",\"desired_price\":900,\"provide_financials\":true}"
                            }
                        }]
                    }
                }]
            }));
        })
        .await;

    let client = OpenAiClient::new(&server.base_url(), "sk-test", Duration::from_secs(5))?;
    let intent = parse_intent(&client, "gpt-4.1-mini", "I want an iPhone 16 in three months, about $900").await?;

    mock.assert_async().await;
    assert_eq!(intent.product, "iPhone 16");
    assert_eq!(intent.timeframe, "in 3 months");
    assert_eq!(intent.desired_price.as_deref(), Some("900"));
    assert!(intent.provide_financials);
    Ok(())
}

#[tokio::test]
async fn test_parse_intent_without_tool_call_fails() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "Sure!"}}]
            }));
        })
        .await;

    let client = OpenAiClient::new(&server.base_url(), "sk-test", Duration::from_secs(5))?;
    let result = parse_intent(&client, "gpt-4.1-mini", "buy stuff").await;

    assert!(matches!(result, Err(ShopperError::NoToolCall)));
    Ok(())
}

#[tokio::test]
async fn test_resend_mailer_posts_email() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/emails")
                .header("authorization", "Bearer re_test")
                .json_body(json!({
                    "from": "Notifier <onboarding@resend.dev>",
                    "to": "me@example.com",
                    "subject": "Deal found: Kindle for $79.00",
                    "html": "<p>hi</p>",
                    "text": "hi"
                }));
            then.status(200).json_body(json!({"id": "email_1"}));
        })
        .await;

    let mailer = ResendMailer::new(&server.base_url(), "re_test");
    mailer
        .send(&Email {
            from: "Notifier <onboarding@resend.dev>".to_string(),
            to: "me@example.com".to_string(),
            subject: "Deal found: Kindle for $79.00".to_string(),
            html: "<p>hi</p>".to_string(),
            text: "hi".to_string(),
        })
        .await?;

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_resend_rejection_is_notification_error() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(422).body("invalid `to` field");
        })
        .await;

    let mailer = ResendMailer::new(&server.base_url(), "re_test");
    let email = Email {
        from: "a@example.com".to_string(),
        to: "not-an-address".to_string(),
        subject: "s".to_string(),
        html: String::new(),
        text: String::new(),
    };

    match mailer.send(&email).await {
        Err(ShopperError::NotificationError { message }) => assert!(message.contains("422")),
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_notification_payload_file_is_emailed() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/emails")
                .body_contains("Great news! We found Sony WH-1000XM5 for $298.00.")
                .body_contains("https://shop.example/sony<br/>https://other.example/sony");
            then.status(200).json_body(json!({"id": "email_2"}));
        })
        .await;

    let dir = TempDir::new()?;
    let storage = LocalStorage::new(dir.path());
    let payload = json!({
        "product": "Sony WH-1000XM5",
        "price": 298,
        "links": ["https://shop.example/sony", "https://other.example/sony"],
        "user_contact": "me@example.com",
        "api_key": "sk-test"
    });
    storage
        .write_file("payload.json", payload.to_string().as_bytes())
        .await?;

    let raw = storage.read_file("payload.json").await?;
    let notification: DealNotification = serde_json::from_slice(&raw)?;

    let mailer: Arc<dyn Mailer> = Arc::new(ResendMailer::new(&server.base_url(), "re_test"));
    let notifier = Notifier::new(Some(mailer), Some("sk-test".to_string()), "Notifier <onboarding@resend.dev>");

    assert!(notifier.send(&notification, true).await);
    mock.assert_async().await;

    let mut forged = notification.clone();
    forged.api_key = Some("sk-someone-else".to_string());
    assert!(!notifier.send(&forged, true).await);
    mock.assert_hits_async(1).await;
    Ok(())
}
