//! Shared data models
//!
//! `ConversationState` serializes with a `status` tag so stored rows read
//! as `{"status":"COLLECTING_COURSES",...}`; corrupt or unknown payloads
//! are reset to `Idle` by the state store, never propagated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A single validated course record: non-empty name, units > 0,
/// score in 0..=100. Constructed only through [`CourseEntry::new`] or
/// [`CourseEntry::parse_line`]; immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub name: String,
    pub units: u32,
    pub score: u32,
}

impl CourseEntry {
    /// Validate and construct a course entry.
    pub fn new(name: impl Into<String>, units: u32, score: u32) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("course name is empty".to_string()));
        }
        if units == 0 {
            return Err(Error::InvalidInput("credit units must be greater than zero".to_string()));
        }
        if score > 100 {
            return Err(Error::InvalidInput(format!("score {} outside 0-100", score)));
        }
        Ok(Self { name, units, score })
    }

    /// Parse a "Name, Units, Score" chat reply.
    ///
    /// Splits on commas, trims each field, and requires exactly three
    /// non-empty tokens with base-10 integer units and score. Any
    /// malformed field fails the whole line.
    pub fn parse_line(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        let [name, units, score] = parts.as_slice() else {
            return Err(Error::InvalidInput(format!(
                "expected 3 comma-separated fields, got {}",
                parts.len()
            )));
        };
        let units: u32 = units
            .parse()
            .map_err(|_| Error::InvalidInput(format!("units '{}' is not a whole number", units)))?;
        let score: u32 = score
            .parse()
            .map_err(|_| Error::InvalidInput(format!("score '{}' is not a whole number", score)))?;
        Self::new(*name, units, score)
    }
}

/// A registered chat identity, keyed by WhatsApp address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Stable external address, e.g. "whatsapp:+2348012345678".
    pub phone_number: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A finalized calculation: one row per completed conversation or
/// confirmed OCR batch. `gpa` is a cache of `compute_gpa(&courses)` and
/// must always agree with it within rounding tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Human label, embeds the creation date ("Semester 2026-08-27").
    pub name: String,
    pub gpa: f64,
    pub courses: Vec<CourseEntry>,
}

/// Where a user is in the chat-driven calculation flow.
///
/// Persisted between webhook invocations; there is no in-memory session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingCourseCount,
    CollectingCourses {
        total_courses: u32,
        courses_collected: Vec<CourseEntry>,
    },
    AwaitingOcrConfirmation {
        candidate_courses: Vec<CourseEntry>,
    },
}

impl ConversationState {
    /// Start collecting toward a known course count.
    pub fn collecting(total_courses: u32) -> Self {
        Self::CollectingCourses {
            total_courses,
            courses_collected: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_happy_path() {
        let c = CourseEntry::parse_line("MTH101, 3, 85").unwrap();
        assert_eq!(c, CourseEntry { name: "MTH101".to_string(), units: 3, score: 85 });
    }

    #[test]
    fn parse_line_trims_fields() {
        let c = CourseEntry::parse_line("  PHY 102 ,2,  68 ").unwrap();
        assert_eq!(c.name, "PHY 102");
        assert_eq!(c.units, 2);
        assert_eq!(c.score, 68);
    }

    #[test]
    fn parse_line_rejects_wrong_field_count() {
        assert!(CourseEntry::parse_line("bad input").is_err());
        assert!(CourseEntry::parse_line("MTH101, 3").is_err());
        assert!(CourseEntry::parse_line("MTH101, 3, 85, extra").is_err());
    }

    #[test]
    fn parse_line_rejects_bad_numbers() {
        assert!(CourseEntry::parse_line("MTH101, three, 85").is_err());
        assert!(CourseEntry::parse_line("MTH101, 3, ninety").is_err());
        assert!(CourseEntry::parse_line("MTH101, 0, 85").is_err());
        assert!(CourseEntry::parse_line("MTH101, 3, 101").is_err());
        assert!(CourseEntry::parse_line("MTH101, -3, 85").is_err());
        assert!(CourseEntry::parse_line(", 3, 85").is_err());
    }

    #[test]
    fn state_round_trips_through_json() {
        let state = ConversationState::CollectingCourses {
            total_courses: 2,
            courses_collected: vec![CourseEntry::new("MTH101", 3, 85).unwrap()],
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"status\":\"COLLECTING_COURSES\""));
        let back: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
