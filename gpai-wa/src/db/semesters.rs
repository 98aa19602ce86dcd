//! Semester and course persistence
//!
//! A semester and its course rows are written as one transaction: the
//! parent row first, then the children keyed to its id, in entry order.

use chrono::Utc;
use gpai_common::models::{CourseEntry, Semester};
use gpai_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Create a finalized semester with its courses as a single unit.
pub async fn create_with_courses(
    db: &SqlitePool,
    user_id: Uuid,
    name: &str,
    gpa: f64,
    courses: &[CourseEntry],
) -> Result<Semester> {
    let semester = Semester {
        id: Uuid::new_v4(),
        user_id,
        name: name.to_string(),
        gpa,
        courses: courses.to_vec(),
    };

    let mut tx = db.begin().await?;

    sqlx::query("INSERT INTO semesters (id, user_id, name, gpa, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(semester.id.to_string())
        .bind(user_id.to_string())
        .bind(&semester.name)
        .bind(gpa)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

    for (position, course) in courses.iter().enumerate() {
        sqlx::query(
            "INSERT INTO courses (id, semester_id, name, units, score, position)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(semester.id.to_string())
        .bind(&course.name)
        .bind(course.units)
        .bind(course.score)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(semester)
}

/// Number of semesters stored for a user.
pub async fn count_for_user(db: &SqlitePool, user_id: Uuid) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM semesters WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Every stored course for a user, flattened across semesters in commit
/// order. Feeds the CGPA aggregation.
pub async fn all_courses_for_user(db: &SqlitePool, user_id: Uuid) -> Result<Vec<CourseEntry>> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        "SELECT c.name, c.units, c.score
         FROM courses c
         JOIN semesters s ON s.id = c.semester_id
         WHERE s.user_id = ?
         ORDER BY s.created_at, s.id, c.position",
    )
    .bind(user_id.to_string())
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(name, units, score)| CourseEntry {
            name,
            units: units as u32,
            score: score as u32,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpai_common::compute_gpa;
    use gpai_common::db::init_memory_database;

    fn course(name: &str, units: u32, score: u32) -> CourseEntry {
        CourseEntry::new(name, units, score).unwrap()
    }

    async fn setup() -> (SqlitePool, Uuid) {
        let db = init_memory_database().await.unwrap();
        let user = crate::db::users::create(&db, "whatsapp:+15551234567")
            .await
            .unwrap();
        (db, user.id)
    }

    async fn stored_courses(db: &SqlitePool, semester_id: Uuid) -> Vec<CourseEntry> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            "SELECT name, units, score FROM courses WHERE semester_id = ? ORDER BY position",
        )
        .bind(semester_id.to_string())
        .fetch_all(db)
        .await
        .unwrap();
        rows.into_iter()
            .map(|(name, units, score)| CourseEntry {
                name,
                units: units as u32,
                score: score as u32,
            })
            .collect()
    }

    #[tokio::test]
    async fn semester_round_trips_with_course_order() {
        let (db, user_id) = setup().await;
        let courses = vec![course("MTH101", 3, 85), course("PHY102", 2, 68)];
        let gpa = compute_gpa(&courses).unwrap();

        let created = create_with_courses(&db, user_id, "Semester 2026-08-27", gpa, &courses)
            .await
            .unwrap();

        let stored = stored_courses(&db, created.id).await;
        assert_eq!(stored, courses);
        // Stored gpa is a cache of the aggregation over stored courses
        let recomputed = compute_gpa(&stored).unwrap();
        assert!((created.gpa - recomputed).abs() < 0.01);
    }

    #[tokio::test]
    async fn flattened_courses_across_semesters() {
        let (db, user_id) = setup().await;
        let first = vec![course("MTH101", 3, 85), course("PHY102", 2, 68)];
        let second = vec![course("MTH201", 3, 62)];
        create_with_courses(&db, user_id, "S1", compute_gpa(&first).unwrap(), &first)
            .await
            .unwrap();
        create_with_courses(&db, user_id, "S2", compute_gpa(&second).unwrap(), &second)
            .await
            .unwrap();

        assert_eq!(count_for_user(&db, user_id).await.unwrap(), 2);
        let all = all_courses_for_user(&db, user_id).await.unwrap();
        assert_eq!(all.len(), 3);
        // Same aggregator over the flattened list gives the CGPA:
        // (15 + 8 + 12) / 8 units = 4.375 -> 4.38
        assert_eq!(compute_gpa(&all), Ok(4.38));
    }

}
