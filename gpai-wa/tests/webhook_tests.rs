//! Integration tests for the gpai-wa webhook
//!
//! Drives the full HTTP surface with an in-memory database and test
//! doubles for the external collaborators: registration gate, manual
//! calculation flow, image fork, and the OCR confirmation round trip.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::util::ServiceExt; // for `oneshot`

use gpai_common::models::CourseEntry;
use gpai_wa::services::testing::{
    FixedExtractor, FixedStructurer, FixedSummarizer, RecordingSender,
};
use gpai_wa::{build_router, AppState};

const USER: &str = "whatsapp:+2348012345678";

fn course(name: &str, units: u32, score: u32) -> CourseEntry {
    CourseEntry::new(name, units, score).unwrap()
}

async fn setup_app() -> (axum::Router, Arc<RecordingSender>) {
    let db = gpai_common::db::init_memory_database().await.unwrap();
    let sender = Arc::new(RecordingSender::default());
    let state = AppState::with_collaborators(
        db,
        Arc::new(FixedExtractor::new("MTH101 3 85\nPHY102 2 68")),
        Arc::new(FixedStructurer::new(vec![
            course("MTH101", 3, 85),
            course("PHY102", 2, 68),
        ])),
        Arc::new(FixedSummarizer::new("Strong point: MTH101.")),
        sender.clone(),
    );
    (build_router(state), sender)
}

fn form_encode(fields: &[(&str, &str)]) -> String {
    fn encode(value: &str) -> String {
        let mut out = String::new();
        for byte in value.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    out.push(byte as char)
                }
                _ => out.push_str(&format!("%{:02X}", byte)),
            }
        }
        out
    }
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn inbound_text(from: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook/whatsapp")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_encode(&[("From", from), ("Body", body)])))
        .unwrap()
}

fn inbound_image(from: &str, media_url: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook/whatsapp")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_encode(&[
            ("From", from),
            ("Body", ""),
            ("NumMedia", "1"),
            ("MediaUrl0", media_url),
        ])))
        .unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> String {
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_module() {
    let (app, _) = setup_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "gpai-wa");
}

#[tokio::test]
async fn unregistered_user_is_prompted_to_register() {
    let (app, _) = setup_app().await;
    let body = send(&app, inbound_text(USER, "hello")).await;
    assert!(body.contains("reply with 'register'"));
}

#[tokio::test]
async fn register_command_creates_account() {
    let (app, _) = setup_app().await;
    let body = send(&app, inbound_text(USER, "Register")).await;
    assert!(body.contains("You're registered!"));

    // Now a trigger keyword starts the flow instead of onboarding
    let body = send(&app, inbound_text(USER, "calculate gpa")).await;
    assert!(body.contains("How many courses"));
}

#[tokio::test]
async fn full_manual_flow_over_the_wire() {
    let (app, _) = setup_app().await;
    send(&app, inbound_text(USER, "register")).await;
    send(&app, inbound_text(USER, "calculate gpa")).await;

    let body = send(&app, inbound_text(USER, "2")).await;
    assert!(body.contains("Course 1"));

    let body = send(&app, inbound_text(USER, "MTH101, 3, 85")).await;
    assert!(body.contains("Course 2"));

    let body = send(&app, inbound_text(USER, "PHY102, 2, 68")).await;
    assert!(body.contains("*4.60*"));
    // Enrichment message follows the GPA message in the same response
    assert!(body.contains("GPAi's Analysis"));
    assert!(body.contains("Strong point: MTH101."));
}

#[tokio::test]
async fn malformed_line_reprompts_without_losing_progress() {
    let (app, _) = setup_app().await;
    send(&app, inbound_text(USER, "register")).await;
    send(&app, inbound_text(USER, "calculate")).await;
    send(&app, inbound_text(USER, "2")).await;
    send(&app, inbound_text(USER, "MTH101, 3, 85")).await;

    let body = send(&app, inbound_text(USER, "nonsense")).await;
    assert!(body.contains("format doesn't look right"));

    // The next valid line is still course 2 of 2
    let body = send(&app, inbound_text(USER, "PHY102, 2, 68")).await;
    assert!(body.contains("*4.60*"));
}

#[tokio::test]
async fn image_forks_to_extraction_and_confirmation() {
    let (app, sender) = setup_app().await;
    send(&app, inbound_text(USER, "register")).await;

    let body = send(&app, inbound_image(USER, "https://example.com/sheet.jpg")).await;
    assert!(body.contains("Analyzing your results sheet"));

    // The spawned pipeline delivers the confirmation out-of-band
    let mut confirmation = Vec::new();
    for _ in 0..50 {
        confirmation = sender.messages_for(USER);
        if !confirmation.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(confirmation.len(), 1);
    assert!(confirmation[0].contains("Does this look correct?"));

    // "yes" commits the candidates and reports the GPA inline
    let body = send(&app, inbound_text(USER, "yes")).await;
    assert!(body.contains("Your GPA from the image is"));
    assert!(body.contains("*4.60*"));
}

#[tokio::test]
async fn ocr_decline_starts_over() {
    let (app, sender) = setup_app().await;
    send(&app, inbound_text(USER, "register")).await;
    send(&app, inbound_image(USER, "https://example.com/sheet.jpg")).await;

    for _ in 0..50 {
        if !sender.messages_for(USER).is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let body = send(&app, inbound_text(USER, "no")).await;
    assert!(body.contains("start over"));

    // Declined candidates are gone; the trigger works from Idle
    let body = send(&app, inbound_text(USER, "calculate")).await;
    assert!(body.contains("How many courses"));
}
