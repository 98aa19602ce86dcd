//! Inbound WhatsApp webhook
//!
//! Twilio delivers each inbound message as a form-encoded POST. The
//! handler resolves the identity, gates unregistered users behind the
//! register command, forks images to the extraction worker, and runs
//! text through the conversation engine. The reply rides back inline as
//! TwiML; worker results are delivered later over the outbound channel.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tracing::info;

use crate::chat::replies;
use crate::error::ApiError;
use crate::services::ocr_worker;
use crate::{db, twiml, AppState};

/// Inbound message fields as Twilio posts them.
#[derive(Debug, Deserialize)]
pub struct TwilioInbound {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "NumMedia", default)]
    pub num_media: Option<String>,
    #[serde(rename = "MediaUrl0", default)]
    pub media_url0: Option<String>,
}

impl TwilioInbound {
    fn media_url(&self) -> Option<&str> {
        let count: u32 = self.num_media.as_deref()?.parse().ok()?;
        if count == 0 {
            return None;
        }
        self.media_url0.as_deref()
    }
}

/// POST /webhook/whatsapp
pub async fn whatsapp_webhook(
    State(state): State<AppState>,
    Form(inbound): Form<TwilioInbound>,
) -> Result<Response, ApiError> {
    info!(from = %inbound.from, "Inbound message");

    let Some(user) = db::users::find_by_phone(&state.db, &inbound.from).await? else {
        return Ok(twiml_reply(&[onboarding_reply(&state, &inbound).await?]));
    };

    if let Some(media_url) = inbound.media_url() {
        let outcome = state.engine.handle_image(&user, media_url).await?;
        if let Some(media_url) = outcome.extraction {
            ocr_worker::spawn_extraction(state.clone(), user, media_url);
        }
        return Ok(twiml_reply(&outcome.messages));
    }

    let outcome = state.engine.handle_text(&user, &inbound.body).await?;
    Ok(twiml_reply(&outcome.messages))
}

/// Unregistered identities only get the register command; anything else
/// receives the onboarding prompt and no state machine transition runs.
async fn onboarding_reply(state: &AppState, inbound: &TwilioInbound) -> Result<String, ApiError> {
    if inbound.body.trim().to_lowercase().starts_with("register") {
        db::users::create(&state.db, &inbound.from).await?;
        info!(from = %inbound.from, "Registered new user");
        Ok(replies::REGISTER_SUCCESS.to_string())
    } else {
        Ok(replies::REGISTER_PROMPT.to_string())
    }
}

fn twiml_reply(messages: &[String]) -> Response {
    (
        [(header::CONTENT_TYPE, "text/xml")],
        twiml::messaging_response(messages),
    )
        .into_response()
}
