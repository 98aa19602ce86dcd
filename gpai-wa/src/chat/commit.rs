//! Result commit protocol
//!
//! One finalized semester per completed conversation. The semester row
//! and its course rows go through a single transaction (parent first,
//! children keyed to its id), so a partial result set can never become
//! visible. A failed commit is surfaced to the engine, which rolls the
//! conversation state back so the user is never told success.

use gpai_common::models::{CourseEntry, Semester, User};
use gpai_common::Result;
use sqlx::SqlitePool;
use tracing::{error, info};

use super::machine::SemesterSource;
use crate::db;

/// Execute `PersistSemester`: write the semester and its courses.
pub async fn persist_semester(
    pool: &SqlitePool,
    user: &User,
    source: SemesterSource,
    courses: &[CourseEntry],
    gpa: f64,
) -> Result<Semester> {
    let name = source.semester_name();
    match db::semesters::create_with_courses(pool, user.id, &name, gpa, courses).await {
        Ok(semester) => {
            info!(
                user = %user.phone_number,
                semester = %semester.id,
                gpa,
                courses = courses.len(),
                "Semester committed"
            );
            Ok(semester)
        }
        Err(e) => {
            error!(user = %user.phone_number, "Semester commit failed: {}", e);
            Err(e)
        }
    }
}
