//! Test doubles for the collaborator traits
//!
//! Used by unit tests and the webhook integration tests; nothing here
//! talks to the network.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use gpai_common::models::CourseEntry;

use super::{CourseStructurer, MessageSender, Summarizer, TextExtractor};

/// Summarizer returning a fixed string.
pub struct FixedSummarizer {
    summary: String,
}

impl FixedSummarizer {
    pub fn new(summary: &str) -> Self {
        Self { summary: summary.to_string() }
    }
}

#[async_trait]
impl Summarizer for FixedSummarizer {
    async fn summarize(&self, _courses: &[CourseEntry], _gpa: f64) -> Result<String> {
        Ok(self.summary.clone())
    }
}

/// Summarizer that always fails (enrichment outage).
pub struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _courses: &[CourseEntry], _gpa: f64) -> Result<String> {
        Err(anyhow!("summary service unavailable"))
    }
}

/// Extractor returning fixed raw text, or failing when none is set.
pub struct FixedExtractor {
    text: Option<String>,
}

impl FixedExtractor {
    pub fn new(text: &str) -> Self {
        Self { text: Some(text.to_string()) }
    }

    pub fn failing() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl TextExtractor for FixedExtractor {
    async fn extract_text(&self, _image_url: &str) -> Result<String> {
        self.text
            .clone()
            .ok_or_else(|| anyhow!("vision service unavailable"))
    }
}

/// Structurer returning a fixed candidate list, or failing when none set.
pub struct FixedStructurer {
    courses: Option<Vec<CourseEntry>>,
}

impl FixedStructurer {
    pub fn new(courses: Vec<CourseEntry>) -> Self {
        Self { courses: Some(courses) }
    }

    pub fn failing() -> Self {
        Self { courses: None }
    }
}

#[async_trait]
impl CourseStructurer for FixedStructurer {
    async fn structure_courses(&self, _raw_text: &str) -> Result<Vec<CourseEntry>> {
        self.courses
            .clone()
            .ok_or_else(|| anyhow!("structuring service unavailable"))
    }
}

/// Sender that records every outbound message.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingSender {
    pub fn messages_for(&self, to: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(addr, _)| addr == to)
            .flat_map(|(_, msgs)| msgs.clone())
            .collect()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_messages(&self, to: &str, messages: &[String]) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), messages.to_vec()));
        Ok(())
    }
}
