//! Conversation state machine
//!
//! `transition` is the pure core of the assistant: given the persisted
//! state and one input event it decides the next state, the ordered
//! outbound replies, and the side effects for the engine to execute. It
//! never touches the database or the network, which keeps every rule in
//! this file testable without collaborators.

use gpai_common::gpa::format_gpa;
use gpai_common::models::{ConversationState, CourseEntry};
use gpai_common::compute_gpa;

use super::replies;

/// One input event. Text bodies are classified against the current state
/// by [`classify_text`]; OCR completions arrive out-of-band from the
/// extraction worker but run through the same transition function.
#[derive(Debug, Clone)]
pub enum Input {
    /// Free text in a state with no pending question.
    Text(String),
    /// Raw reply while awaiting the course count.
    CourseCountReply(String),
    /// Raw reply while collecting "Name, Units, Score" lines.
    CourseLineReply(String),
    /// Inbound media attachment.
    ImageReceived { media_url: String },
    /// Completion of the out-of-band extraction pipeline.
    OcrResult(OcrOutcome),
}

/// Outcome of the extraction pipeline. Candidates are pre-validated at
/// the structuring boundary; an empty candidate set counts as a failure.
#[derive(Debug, Clone)]
pub enum OcrOutcome {
    Courses(Vec<CourseEntry>),
    /// Text extraction got nothing usable from the image.
    UnreadableImage,
    /// Text came back but no course rows could be structured from it.
    NoCoursesFound,
}

/// Side effects the engine must perform after a transition.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Commit a finalized semester (exactly once per completed flow).
    PersistSemester {
        source: SemesterSource,
        courses: Vec<CourseEntry>,
        gpa: f64,
    },
    /// Best-effort AI summary; failure must not affect the commit.
    RequestAiSummary { courses: Vec<CourseEntry>, gpa: f64 },
    /// Drop the raw OCR scratch payload for this user.
    ClearOcrBuffer,
    /// Kick off the extraction pipeline for an inbound image.
    StartOcrExtraction { media_url: String },
    /// Compute and report the CGPA over all stored semesters.
    SendCgpaReport,
}

/// Result of one transition.
#[derive(Debug)]
pub struct Transition {
    pub next: ConversationState,
    pub replies: Vec<String>,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(state: &ConversationState, reply: impl Into<String>) -> Self {
        Self {
            next: state.clone(),
            replies: vec![reply.into()],
            effects: Vec::new(),
        }
    }
}

/// Interpret a text body according to the pending question in `state`.
pub fn classify_text(state: &ConversationState, body: &str) -> Input {
    match state {
        ConversationState::AwaitingCourseCount => Input::CourseCountReply(body.to_string()),
        ConversationState::CollectingCourses { .. } => Input::CourseLineReply(body.to_string()),
        _ => Input::Text(body.to_string()),
    }
}

/// Compute the next state, replies and effects for one input event.
pub fn transition(state: &ConversationState, input: &Input) -> Transition {
    match input {
        // OCR completions and images are state-independent: the pipeline
        // may finish while the user is anywhere in the flow.
        Input::OcrResult(outcome) => ocr_result(outcome),
        Input::ImageReceived { media_url } => Transition {
            next: state.clone(),
            replies: vec![replies::IMAGE_ACK.to_string()],
            effects: vec![Effect::StartOcrExtraction {
                media_url: media_url.clone(),
            }],
        },
        Input::Text(body) => match state {
            ConversationState::AwaitingOcrConfirmation { candidate_courses } => {
                ocr_confirmation_reply(candidate_courses, body)
            }
            _ => idle_text(state, body),
        },
        Input::CourseCountReply(raw) => course_count_reply(state, raw),
        Input::CourseLineReply(raw) => course_line_reply(state, raw),
    }
}

/// Free text against `Idle` (or any state with no pending question).
fn idle_text(state: &ConversationState, body: &str) -> Transition {
    let lowered = body.trim().to_lowercase();
    if lowered.contains("cgpa") || lowered.contains("history") {
        return Transition {
            next: state.clone(),
            replies: Vec::new(),
            effects: vec![Effect::SendCgpaReport],
        };
    }
    if lowered.contains("calculate") || lowered.contains("gpa") || lowered.contains("start") {
        Transition {
            next: ConversationState::AwaitingCourseCount,
            replies: vec![replies::ASK_COURSE_COUNT.to_string()],
            effects: Vec::new(),
        }
    } else {
        Transition::stay(state, replies::GREETING)
    }
}

fn course_count_reply(state: &ConversationState, raw: &str) -> Transition {
    match raw.trim().parse::<u32>() {
        Ok(count) if count > 0 => Transition {
            next: ConversationState::collecting(count),
            replies: vec![replies::ask_first_course(count)],
            effects: Vec::new(),
        },
        _ => Transition::stay(state, replies::INVALID_COURSE_COUNT),
    }
}

fn course_line_reply(state: &ConversationState, raw: &str) -> Transition {
    let ConversationState::CollectingCourses {
        total_courses,
        courses_collected,
    } = state
    else {
        // classify_text only emits CourseLineReply in CollectingCourses
        return idle_text(state, raw);
    };

    let course = match CourseEntry::parse_line(raw) {
        Ok(course) => course,
        // Malformed line: re-prompt, keep state and collected courses
        Err(_) => return Transition::stay(state, replies::COURSE_FORMAT_ERROR),
    };

    let name = course.name.clone();
    let mut collected = courses_collected.clone();
    collected.push(course);

    if (collected.len() as u32) < *total_courses {
        let prompt = replies::course_added(&name, collected.len() + 1);
        Transition {
            next: ConversationState::CollectingCourses {
                total_courses: *total_courses,
                courses_collected: collected,
            },
            replies: vec![prompt],
            effects: Vec::new(),
        }
    } else {
        complete(collected, SemesterSource::Manual)
    }
}

fn ocr_confirmation_reply(candidates: &[CourseEntry], body: &str) -> Transition {
    match body.trim().to_lowercase().as_str() {
        "yes" => {
            let mut t = complete(candidates.to_vec(), SemesterSource::FromImage);
            t.effects.push(Effect::ClearOcrBuffer);
            t
        }
        "no" => Transition {
            next: ConversationState::Idle,
            replies: vec![replies::OCR_DECLINED.to_string()],
            effects: vec![Effect::ClearOcrBuffer],
        },
        _ => Transition {
            next: ConversationState::AwaitingOcrConfirmation {
                candidate_courses: candidates.to_vec(),
            },
            replies: vec![replies::OCR_REASK.to_string()],
            effects: Vec::new(),
        },
    }
}

fn ocr_result(outcome: &OcrOutcome) -> Transition {
    match outcome {
        OcrOutcome::Courses(candidates) if !candidates.is_empty() => Transition {
            next: ConversationState::AwaitingOcrConfirmation {
                candidate_courses: candidates.clone(),
            },
            replies: vec![replies::ocr_confirm(candidates)],
            effects: Vec::new(),
        },
        OcrOutcome::UnreadableImage => Transition {
            next: ConversationState::Idle,
            replies: vec![replies::OCR_READ_FAILED.to_string()],
            effects: Vec::new(),
        },
        _ => Transition {
            next: ConversationState::Idle,
            replies: vec![replies::OCR_NO_COURSES.to_string()],
            effects: Vec::new(),
        },
    }
}

/// Terminal transition: compute the GPA, celebrate, and fire the commit
/// and enrichment effects. Returns to `Idle`.
fn complete(courses: Vec<CourseEntry>, source: SemesterSource) -> Transition {
    let gpa = match compute_gpa(&courses) {
        Ok(gpa) => gpa,
        // Unreachable through validated input paths (every entry has
        // units > 0), but a zero-units set must never produce a GPA.
        Err(_) => {
            return Transition {
                next: ConversationState::Idle,
                replies: vec![replies::OCR_NO_COURSES.to_string()],
                effects: Vec::new(),
            }
        }
    };
    let formatted = format_gpa(gpa);
    let message = match source {
        SemesterSource::Manual => replies::manual_complete(&formatted),
        SemesterSource::FromImage => replies::image_complete(&formatted),
    };
    Transition {
        next: ConversationState::Idle,
        replies: vec![message],
        effects: vec![
            Effect::PersistSemester {
                source,
                courses: courses.clone(),
                gpa,
            },
            Effect::RequestAiSummary { courses, gpa },
        ],
    }
}

/// Which flow produced a finalized semester; drives the record's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemesterSource {
    Manual,
    FromImage,
}

impl SemesterSource {
    /// Human label for the semester record, embedding today's date.
    pub fn semester_name(&self) -> String {
        let today = chrono::Utc::now().format("%Y-%m-%d");
        match self {
            Self::Manual => format!("Semester {}", today),
            Self::FromImage => format!("Semester (from Image) {}", today),
        }
    }
}
