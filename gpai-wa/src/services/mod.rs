//! External collaborators
//!
//! Every outside service sits behind a trait so the engine and webhook
//! handlers depend on injected collaborators, never ambient clients.
//! Production implementations: Google Cloud Vision (text extraction),
//! Gemini (structuring + summaries), Twilio (outbound WhatsApp).

use anyhow::Result;
use async_trait::async_trait;
use gpai_common::models::CourseEntry;

pub mod gemini_client;
pub mod ocr_worker;
pub mod testing;
pub mod twilio_client;
pub mod vision_client;

pub use gemini_client::GeminiClient;
pub use twilio_client::TwilioClient;
pub use vision_client::VisionClient;

/// Image reference -> raw text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image_url: &str) -> Result<String>;
}

/// Raw text -> candidate course records.
///
/// Implementations own field validation: every returned entry already
/// satisfies `CourseEntry`'s constraints, and entries that do not are
/// dropped at this boundary. An empty result means nothing usable.
#[async_trait]
pub trait CourseStructurer: Send + Sync {
    async fn structure_courses(&self, raw_text: &str) -> Result<Vec<CourseEntry>>;
}

/// Best-effort GPA commentary. Failure is swallowed by the caller.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, courses: &[CourseEntry], gpa: f64) -> Result<String>;
}

/// Outbound delivery of ordered messages to one address.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_messages(&self, to: &str, messages: &[String]) -> Result<()>;
}
