//! Out-of-band extraction pipeline
//!
//! An inbound image is acknowledged immediately; the extract-and-
//! structure work runs in a spawned task. Its completion re-enters the
//! conversation engine as an `OcrResult` input through the same
//! persist-and-notify path as an inbound message, with delivery over the
//! outbound channel since there is no webhook response left to ride on.

use gpai_common::models::User;
use tracing::{error, info, warn};

use crate::chat::OcrOutcome;
use crate::{db, AppState};

/// Fire-and-forget entry point used by the webhook handler.
pub fn spawn_extraction(state: AppState, user: User, media_url: String) {
    tokio::spawn(async move {
        if let Err(e) = run_extraction(&state, &user, &media_url).await {
            error!(user = %user.phone_number, "Extraction pipeline failed: {}", e);
        }
    });
}

/// Run the full pipeline: extract, structure, feed the result back into
/// the state machine, deliver the replies.
pub async fn run_extraction(
    state: &AppState,
    user: &User,
    media_url: &str,
) -> anyhow::Result<()> {
    let outcome = extract_candidates(state, user, media_url).await;

    let engine_outcome = state.engine.handle_ocr_result(user, outcome).await?;
    state
        .sender
        .send_messages(&user.phone_number, &engine_outcome.messages)
        .await?;
    Ok(())
}

async fn extract_candidates(state: &AppState, user: &User, media_url: &str) -> OcrOutcome {
    let raw_text = match state.extractor.extract_text(media_url).await {
        Ok(text) => text,
        Err(e) => {
            warn!(user = %user.phone_number, "Text extraction failed: {}", e);
            return OcrOutcome::UnreadableImage;
        }
    };

    match state.structurer.structure_courses(&raw_text).await {
        Ok(courses) if !courses.is_empty() => {
            info!(
                user = %user.phone_number,
                count = courses.len(),
                "Structured courses from image"
            );
            // Keep the raw payload for inspection until the user
            // resolves the confirmation
            if let Err(e) = db::users::set_ocr_buffer(&state.db, user.id, &raw_text).await {
                warn!(user = %user.phone_number, "Failed to store OCR buffer: {}", e);
            }
            OcrOutcome::Courses(courses)
        }
        Ok(_) => {
            warn!(user = %user.phone_number, "No courses structured from extracted text");
            OcrOutcome::NoCoursesFound
        }
        Err(e) => {
            warn!(user = %user.phone_number, "Structuring failed: {}", e);
            OcrOutcome::NoCoursesFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::replies;
    use crate::chat::StateStore;
    use crate::services::testing::{
        FailingSummarizer, FixedExtractor, FixedStructurer, RecordingSender,
    };
    use gpai_common::models::{ConversationState, CourseEntry};
    use std::sync::Arc;

    fn course(name: &str, units: u32, score: u32) -> CourseEntry {
        CourseEntry::new(name, units, score).unwrap()
    }

    async fn setup(
        extractor: FixedExtractor,
        structurer: FixedStructurer,
    ) -> (AppState, User, Arc<RecordingSender>) {
        let db = gpai_common::db::init_memory_database().await.unwrap();
        let user = db::users::create(&db, "whatsapp:+15551234567").await.unwrap();
        let sender = Arc::new(RecordingSender::default());
        let state = AppState::with_collaborators(
            db,
            Arc::new(extractor),
            Arc::new(structurer),
            Arc::new(FailingSummarizer),
            sender.clone(),
        );
        (state, user, sender)
    }

    #[tokio::test]
    async fn successful_pipeline_asks_for_confirmation() {
        let candidates = vec![course("MTH101", 3, 85), course("PHY102", 2, 68)];
        let (state, user, sender) = setup(
            FixedExtractor::new("MTH101 3 85\nPHY102 2 68"),
            FixedStructurer::new(candidates.clone()),
        )
        .await;

        run_extraction(&state, &user, "https://example.com/sheet.jpg")
            .await
            .unwrap();

        let sent = sender.messages_for(&user.phone_number);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Does this look correct?"));
        assert!(sent[0].contains("MTH101"));

        let store = StateStore::new(state.db.clone());
        let (conversation, _) = store.load(user.id).await.unwrap();
        assert_eq!(
            conversation,
            ConversationState::AwaitingOcrConfirmation {
                candidate_courses: candidates,
            }
        );
    }

    #[tokio::test]
    async fn unreadable_image_notifies_and_resets() {
        let (state, user, sender) = setup(
            FixedExtractor::failing(),
            FixedStructurer::new(vec![course("MTH101", 3, 85)]),
        )
        .await;

        run_extraction(&state, &user, "https://example.com/blurry.jpg")
            .await
            .unwrap();

        let sent = sender.messages_for(&user.phone_number);
        assert_eq!(sent, vec![replies::OCR_READ_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn empty_structuring_suggests_manual_entry() {
        let (state, user, sender) = setup(
            FixedExtractor::new("unrelated text"),
            FixedStructurer::new(Vec::new()),
        )
        .await;

        run_extraction(&state, &user, "https://example.com/sheet.jpg")
            .await
            .unwrap();

        let sent = sender.messages_for(&user.phone_number);
        assert_eq!(sent, vec![replies::OCR_NO_COURSES.to_string()]);

        let store = StateStore::new(state.db.clone());
        let (conversation, _) = store.load(user.id).await.unwrap();
        assert_eq!(conversation, ConversationState::Idle);
    }
}
