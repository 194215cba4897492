use std::time::Duration;
use claim::{assert_none, assert_ok, assert_some};
use serde_json::json;
use subscribe_widget::domain::Severity;
use subscribe_widget::error::{SubmitError, WidgetError};
use subscribe_widget::session_store::InMemorySessionStore;
use subscribe_widget::widget::Controls;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};
use crate::helpers::{spawn_app, unreachable_backend_url, widget_against, Variant};

#[tokio::test]
async fn successful_subscribe_persists_the_email_and_greets_the_subscriber() {
    let mut app = spawn_app(Variant::Email).await;
    Mock::given(method("POST"))
        .and(path("/api/subscribe"))
        .and(body_json(json!({"email": "x@y.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true, "email": "x@y.com", "message": "Subscribed"
        })))
        .expect(1)
        .mount(&app.backend)
        .await;

    app.widget.edit_email("x@y.com").unwrap();
    assert_ok!(app.widget.submit_email().await);

    let view = app.widget.view();
    assert_eq!(view.controls, Controls::Subscribed);
    assert_eq!(app.persisted(), Some(json!({"email": "x@y.com"})));
    let notification = assert_some!(view.notification);
    assert_eq!(notification.severity, Severity::Success);
    assert!(notification.text.contains("x@y.com"));
}

#[tokio::test]
async fn logout_returns_to_an_empty_unsubscribed_form() {
    let mut app = spawn_app(Variant::Email).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "email": "x@y.com"})))
        .mount(&app.backend)
        .await;

    app.widget.edit_email("x@y.com").unwrap();
    app.widget.submit_email().await.unwrap();
    app.widget.logout();

    let view = app.widget.view();
    assert_none!(view.subscriber);
    assert_none!(app.persisted());
    assert_eq!(view.controls, Controls::EmailForm { draft: String::new(), is_valid: false });
}

#[tokio::test]
async fn rejected_subscribe_stays_unsubscribed_and_shows_the_reason() {
    let mut app = spawn_app(Variant::Email).await;
    Mock::given(method("POST"))
        .and(path("/api/subscribe"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"ok": false, "msg": "already taken"})))
        .expect(1)
        .mount(&app.backend)
        .await;

    app.widget.edit_email("x@y.com").unwrap();
    let outcome = app.widget.submit_email().await;

    assert!(matches!(outcome, Err(WidgetError::Submit(SubmitError::Rejected(_)))));
    let view = app.widget.view();
    assert_none!(view.subscriber);
    assert_none!(app.persisted());
    let notification = assert_some!(view.notification);
    assert_eq!(notification.severity, Severity::Error);
    assert!(notification.text.contains("already taken"));
}

#[tokio::test]
async fn network_failure_is_reported_and_keeps_the_draft() {
    let mut widget = widget_against(unreachable_backend_url(), InMemorySessionStore::new());

    widget.edit_email("x@y.com").unwrap();
    let outcome = widget.submit_email().await;

    assert!(matches!(outcome, Err(WidgetError::Submit(SubmitError::Network(_)))));
    let view = widget.view();
    let notification = assert_some!(view.notification);
    assert_eq!(notification.severity, Severity::Error);
    assert!(notification.text.starts_with("Network error:"));
    assert_eq!(view.controls, Controls::EmailForm { draft: "x@y.com".into(), is_valid: true });
}

#[tokio::test]
async fn non_json_response_is_shown_as_an_error() {
    let mut app = spawn_app(Variant::Email).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
        .expect(1)
        .mount(&app.backend)
        .await;

    app.widget.edit_email("x@y.com").unwrap();
    let outcome = app.widget.submit_email().await;

    assert!(matches!(outcome, Err(WidgetError::Submit(SubmitError::Protocol(_)))));
    let notification = assert_some!(app.widget.view().notification);
    assert_eq!(notification.severity, Severity::Error);
    assert!(!app.widget.is_subscribed());
}

#[tokio::test]
async fn invalid_email_is_refused_before_any_request() {
    let mut app = spawn_app(Variant::Email).await;
    let test_cases = vec![
        ("", "empty email"),
        ("a@b", "missing top-level domain"),
        ("a@@b.com", "double at symbol"),
        ("a b@c.com", "whitespace"),
        ("a@b.co.x", "one-character label after the last dot"),
    ];

    for (email, description) in test_cases {
        app.widget.edit_email(email).unwrap();
        let outcome = app.widget.submit_email().await;

        assert!(matches!(outcome, Err(WidgetError::Validation(_))), "{} was not refused", description);
        let notification = assert_some!(app.widget.view().notification);
        assert_eq!(notification.text, "Please enter a valid email");
        assert_eq!(notification.severity, Severity::Error);
    }
    assert_eq!(app.received_request_count().await, 0);
}

#[tokio::test]
async fn existing_subscriber_is_told_they_are_already_subscribed() {
    let mut app = spawn_app(Variant::Email).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true, "existing": true, "email": "x@y.com", "message": "Subscribed"
        })))
        .mount(&app.backend)
        .await;

    app.widget.edit_email("x@y.com").unwrap();
    let subscription = app.widget.submit_email().await.unwrap();

    assert!(subscription.existing);
    let notification = assert_some!(app.widget.view().notification);
    assert_eq!(notification.text, "x@y.com is already subscribed.");
}

#[tokio::test]
async fn subscribed_widget_refuses_further_submissions() {
    let mut app = spawn_app(Variant::Email).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "email": "x@y.com"})))
        .expect(1)
        .mount(&app.backend)
        .await;

    app.widget.edit_email("x@y.com").unwrap();
    app.widget.submit_email().await.unwrap();

    assert!(matches!(app.widget.edit_email("z@y.com"), Err(WidgetError::NotAvailable(_))));
    assert!(matches!(app.widget.submit_email().await, Err(WidgetError::NotAvailable(_))));
}

#[tokio::test]
async fn response_after_teardown_is_discarded() {
    let mut app = spawn_app(Variant::Email).await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true, "email": "x@y.com"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    app.widget.edit_email("x@y.com").unwrap();
    let liveness = app.widget.liveness();
    let (outcome, _) = tokio::join!(app.widget.submit_email(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        liveness.tear_down();
    });

    assert!(matches!(outcome, Err(WidgetError::Detached)));
    assert!(!app.widget.is_subscribed());
    assert_none!(app.persisted());
    assert_none!(app.widget.view().notification);
}
