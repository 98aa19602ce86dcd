//! gpai-wa library - WhatsApp assistant service
//!
//! The chat-driven GPA calculator: a webhook receives inbound WhatsApp
//! messages, a per-user state machine (persisted in SQLite between
//! invocations) drives the conversation, and an out-of-band pipeline
//! turns result-sheet images into candidate courses for confirmation.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

use gpai_common::config::GpaiConfig;

pub mod api;
pub mod chat;
pub mod db;
pub mod error;
pub mod services;
pub mod twiml;

use chat::ChatEngine;
use services::{
    CourseStructurer, GeminiClient, MessageSender, Summarizer, TextExtractor, TwilioClient,
    VisionClient,
};

/// Application state shared across HTTP handlers and the worker.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub engine: Arc<ChatEngine>,
    pub extractor: Arc<dyn TextExtractor>,
    pub structurer: Arc<dyn CourseStructurer>,
    pub sender: Arc<dyn MessageSender>,
}

impl AppState {
    /// Production state: real Vision/Gemini/Twilio clients from config.
    pub fn new(db: SqlitePool, config: &GpaiConfig) -> Self {
        let gemini = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
        Self::with_collaborators(
            db,
            Arc::new(VisionClient::new(config.vision_api_key.clone())),
            gemini.clone(),
            gemini,
            Arc::new(TwilioClient::new(config.twilio.clone())),
        )
    }

    /// State with injected collaborators (tests substitute doubles).
    pub fn with_collaborators(
        db: SqlitePool,
        extractor: Arc<dyn TextExtractor>,
        structurer: Arc<dyn CourseStructurer>,
        summarizer: Arc<dyn Summarizer>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        let engine = Arc::new(ChatEngine::new(db.clone(), summarizer));
        Self {
            db,
            engine,
            extractor,
            structurer,
            sender,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/webhook/whatsapp", post(api::whatsapp_webhook))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
