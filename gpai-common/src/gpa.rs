//! GPA aggregation
//!
//! One aggregator for every surface: a single semester (SGP) and a
//! flattened multi-semester course list (CGPA) go through the same
//! function over different slices.

use thiserror::Error;

use crate::grading::grade_point;
use crate::models::CourseEntry;

/// Returned when the course list carries zero total credit units.
///
/// Callers must not present a GPA in this case; it is a defined edge
/// case, not a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("total credit units is zero")]
pub struct EmptyUnitsError;

/// Compute the unit-weighted GPA of a course list, rounded half-up to
/// exactly two decimal places.
///
/// GPA = sum(grade_point(score) * units) / sum(units).
pub fn compute_gpa(courses: &[CourseEntry]) -> Result<f64, EmptyUnitsError> {
    let total_units: u32 = courses.iter().map(|c| c.units).sum();
    if total_units == 0 {
        return Err(EmptyUnitsError);
    }
    let quality_points: f64 = courses
        .iter()
        .map(|c| grade_point(c.score) * f64::from(c.units))
        .sum();
    Ok(round_half_up_2dp(quality_points / f64::from(total_units)))
}

/// Round half-up to two decimal places (4.605 -> 4.61).
fn round_half_up_2dp(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Format a GPA for user display ("4.60", "3.25").
pub fn format_gpa(gpa: f64) -> String {
    format!("{:.2}", gpa)
}
