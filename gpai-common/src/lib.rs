//! # GPAi Common Library
//!
//! Shared code for GPAi services including:
//! - Grade scale and GPA aggregation
//! - Database models (users, semesters, courses, conversation state)
//! - Database initialization and schema
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod gpa;
pub mod grading;
pub mod models;

pub use error::{Error, Result};
pub use gpa::{compute_gpa, EmptyUnitsError};
pub use grading::{grade_letter, grade_point};
