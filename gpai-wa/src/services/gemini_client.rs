//! Gemini client: course structuring and GPA summaries
//!
//! Two prompts against the same generateContent endpoint. Structuring
//! asks for a bare JSON array of {name, units, score} objects and
//! tolerates markdown fencing around it; entries failing CourseEntry
//! validation are dropped here, at the pipeline boundary.

use anyhow::Result;
use async_trait::async_trait;
use gpai_common::models::CourseEntry;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use super::{CourseStructurer, Summarizer};

const GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Gemini client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP request failed
    #[error("Gemini request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("Gemini API error (HTTP {0}): {1}")]
    Api(u16, String),

    /// Response carried no candidate text
    #[error("Gemini response contained no text")]
    EmptyResponse,

    /// Model output held no parseable JSON array
    #[error("No JSON array in model output")]
    NoJsonArray,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Raw course shape as the model emits it, before validation.
#[derive(Debug, Deserialize)]
struct RawCourse {
    name: String,
    units: i64,
    score: i64,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, GeminiError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(format!("{}?key={}", GENERATE_URL, self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api(status.as_u16(), detail));
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|p| p.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(GeminiError::EmptyResponse)
    }
}

/// Pull the first JSON array out of model output that may be wrapped in
/// markdown fences or prose.
fn extract_json_array(output: &str) -> std::result::Result<&str, GeminiError> {
    let start = output.find('[').ok_or(GeminiError::NoJsonArray)?;
    let end = output.rfind(']').ok_or(GeminiError::NoJsonArray)?;
    if end < start {
        return Err(GeminiError::NoJsonArray);
    }
    Ok(&output[start..=end])
}

/// Validate raw model rows into CourseEntry, dropping anything that
/// fails the field constraints.
fn validate_courses(raw: Vec<RawCourse>) -> Vec<CourseEntry> {
    raw.into_iter()
        .filter_map(|c| {
            let units = u32::try_from(c.units).ok()?;
            let score = u32::try_from(c.score).ok()?;
            match CourseEntry::new(c.name, units, score) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Dropping structured course: {}", e);
                    None
                }
            }
        })
        .collect()
}

fn structuring_prompt(raw_text: &str) -> String {
    format!(
        "You are a data extraction assistant. The following text was extracted from a \
         student's result sheet. Identify every course, its credit units, and its score. \
         Return the data as a clean JSON array of objects, where each object has \
         \"name\", \"units\", and \"score\". The final output must only be the JSON \
         array, with no extra text or markdown. Raw Text: \"{}\"",
        raw_text
    )
}

fn summary_prompt(courses: &[CourseEntry], gpa: f64) -> String {
    let listing = serde_json::to_string(courses).unwrap_or_default();
    format!(
        "You are GPAi, a friendly academic advisor. A student's GPA is {:.2}. Their \
         courses are: {}. Write a brief, encouraging summary. Mention their \
         highest-scoring course as a 'strong point'. If the GPA is below 4.0, suggest \
         a target GPA for the next semester. If it's above 4.0, commend them. Keep it \
         concise.",
        gpa, listing
    )
}

#[async_trait]
impl CourseStructurer for GeminiClient {
    async fn structure_courses(&self, raw_text: &str) -> Result<Vec<CourseEntry>> {
        let output = self.generate(&structuring_prompt(raw_text)).await?;
        let array = extract_json_array(&output)?;
        let raw: Vec<RawCourse> = serde_json::from_str(array)?;
        Ok(validate_courses(raw))
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, courses: &[CourseEntry], gpa: f64) -> Result<String> {
        Ok(self.generate(&summary_prompt(courses, gpa)).await?)
    }
}
