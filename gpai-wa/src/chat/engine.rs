//! Load-transition-persist cycle around the state machine
//!
//! One `handle_*` call per inbound event: load the state, run the pure
//! transition, reserve the next state with a conditional write, then
//! execute effects in order. Losing the conditional write means another
//! invocation for the same user got there first; the engine reloads and
//! recomputes, so two course lines can never both apply against the same
//! stale state.
//!
//! Ordering around the commit: the state write happens before the
//! semester commit, which makes a replayed final message find `Idle` and
//! keeps the commit exactly-once. If the commit itself then fails, the
//! prior state is written back (best-effort) and the user is asked to
//! resend, so success is never claimed for a commit that didn't happen.

use std::sync::Arc;

use gpai_common::gpa::format_gpa;
use gpai_common::models::{ConversationState, User};
use gpai_common::{compute_gpa, Result};
use sqlx::SqlitePool;
use tracing::{error, warn};
use uuid::Uuid;

use super::machine::{self, Effect, Input, OcrOutcome};
use super::replies;
use super::state_store::StateStore;
use crate::db;
use crate::services::Summarizer;

/// How many times a lost conditional write is retried before giving up.
const MAX_ATTEMPTS: u32 = 3;

/// What one inbound event produced.
#[derive(Debug, Default)]
pub struct EngineOutcome {
    /// Ordered outbound messages for this user.
    pub messages: Vec<String>,
    /// Media URL to hand to the extraction pipeline, if any.
    pub extraction: Option<String>,
}

/// The conversation engine. Collaborators are injected so tests can
/// substitute doubles; the engine never reaches for ambient globals.
pub struct ChatEngine {
    db: SqlitePool,
    store: StateStore,
    summarizer: Arc<dyn Summarizer>,
}

impl ChatEngine {
    pub fn new(db: SqlitePool, summarizer: Arc<dyn Summarizer>) -> Self {
        let store = StateStore::new(db.clone());
        Self { db, store, summarizer }
    }

    /// Handle an inbound text message from a registered user.
    pub async fn handle_text(&self, user: &User, body: &str) -> Result<EngineOutcome> {
        self.run(user, |state| machine::classify_text(state, body)).await
    }

    /// Handle an inbound media attachment.
    pub async fn handle_image(&self, user: &User, media_url: &str) -> Result<EngineOutcome> {
        let media_url = media_url.to_string();
        self.run(user, move |_| Input::ImageReceived {
            media_url: media_url.clone(),
        })
        .await
    }

    /// Handle completion of the out-of-band extraction pipeline. This is
    /// a first-class input: it goes through the same transition and
    /// persist path as an inbound message.
    pub async fn handle_ocr_result(&self, user: &User, outcome: OcrOutcome) -> Result<EngineOutcome> {
        self.run(user, move |_| Input::OcrResult(outcome.clone())).await
    }

    async fn run(
        &self,
        user: &User,
        build_input: impl Fn(&ConversationState) -> Input,
    ) -> Result<EngineOutcome> {
        for _ in 0..MAX_ATTEMPTS {
            let (state, version) = self.store.load(user.id).await?;
            let input = build_input(&state);
            let t = machine::transition(&state, &input);

            if !self.store.save_if_version(user.id, &t.next, version).await? {
                // Another invocation advanced the state; recompute
                continue;
            }

            return self.execute_effects(user, &state, t).await;
        }

        warn!(user = %user.phone_number, "Conversation state contention, giving up");
        Ok(EngineOutcome {
            messages: vec![replies::SAVE_FAILED.to_string()],
            extraction: None,
        })
    }

    async fn execute_effects(
        &self,
        user: &User,
        previous: &ConversationState,
        t: machine::Transition,
    ) -> Result<EngineOutcome> {
        let mut outcome = EngineOutcome {
            messages: t.replies,
            extraction: None,
        };

        for effect in t.effects {
            match effect {
                Effect::PersistSemester { source, courses, gpa } => {
                    if let Err(e) =
                        super::commit::persist_semester(&self.db, user, source, &courses, gpa).await
                    {
                        // Roll the reserved transition back so the user
                        // can resend; never claim success here.
                        if let Err(e2) = self.store.save(user.id, previous).await {
                            error!(user = %user.phone_number, "State rollback failed: {}", e2);
                        }
                        warn!(user = %user.phone_number, "Commit failed, state rolled back: {}", e);
                        return Ok(EngineOutcome {
                            messages: vec![replies::SAVE_FAILED.to_string()],
                            extraction: None,
                        });
                    }
                }
                Effect::RequestAiSummary { courses, gpa } => {
                    // Best-effort enrichment; the commit already stands
                    match self.summarizer.summarize(&courses, gpa).await {
                        Ok(summary) => outcome.messages.push(replies::ai_analysis(&summary)),
                        Err(e) => warn!(user = %user.phone_number, "AI summary unavailable: {}", e),
                    }
                }
                Effect::ClearOcrBuffer => {
                    if let Err(e) = db::users::clear_ocr_buffer(&self.db, user.id).await {
                        warn!(user = %user.phone_number, "Failed to clear OCR buffer: {}", e);
                    }
                }
                Effect::StartOcrExtraction { media_url } => {
                    outcome.extraction = Some(media_url);
                }
                Effect::SendCgpaReport => {
                    outcome.messages.push(self.cgpa_report(user.id).await?);
                }
            }
        }

        Ok(outcome)
    }

    /// CGPA is the same aggregation applied to the flattened course list
    /// of every stored semester.
    async fn cgpa_report(&self, user_id: Uuid) -> Result<String> {
        let courses = db::semesters::all_courses_for_user(&self.db, user_id).await?;
        match compute_gpa(&courses) {
            Ok(cgpa) => {
                let semesters = db::semesters::count_for_user(&self.db, user_id).await?;
                Ok(replies::cgpa_report(
                    semesters as usize,
                    courses.len(),
                    &format_gpa(cgpa),
                ))
            }
            Err(_) => Ok(replies::CGPA_EMPTY.to_string()),
        }
    }
}
