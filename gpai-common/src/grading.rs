//! Grade scale mapping
//!
//! Fixed 5.0-scale breakpoints used everywhere a raw score is graded.
//! Scores are integers in 0..=100; range enforcement happens at input
//! parsing (`CourseEntry`), so both functions here are total.

/// Map a raw score (0..=100) to its grade point on the 5.0 scale.
///
/// Breakpoints are inclusive lower bounds: >=70 -> 5.0, >=60 -> 4.0,
/// >=50 -> 3.0, >=45 -> 2.0, >=40 -> 1.0, else 0.0.
pub fn grade_point(score: u32) -> f64 {
    match score {
        70.. => 5.0,
        60..=69 => 4.0,
        50..=59 => 3.0,
        45..=49 => 2.0,
        40..=44 => 1.0,
        _ => 0.0,
    }
}

/// Map a raw score (0..=100) to its letter grade.
pub fn grade_letter(score: u32) -> char {
    match score {
        70.. => 'A',
        60..=69 => 'B',
        50..=59 => 'C',
        45..=49 => 'D',
        40..=44 => 'E',
        _ => 'F',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints_are_crisp() {
        assert_eq!(grade_point(70), 5.0);
        assert_eq!(grade_point(69), 4.0);
        assert_eq!(grade_point(60), 4.0);
        assert_eq!(grade_point(59), 3.0);
        assert_eq!(grade_point(50), 3.0);
        assert_eq!(grade_point(49), 2.0);
        assert_eq!(grade_point(45), 2.0);
        assert_eq!(grade_point(44), 1.0);
        assert_eq!(grade_point(40), 1.0);
        assert_eq!(grade_point(39), 0.0);
        assert_eq!(grade_point(0), 0.0);
        assert_eq!(grade_point(100), 5.0);
    }

    #[test]
    fn letters_match_points() {
        assert_eq!(grade_letter(85), 'A');
        assert_eq!(grade_letter(65), 'B');
        assert_eq!(grade_letter(55), 'C');
        assert_eq!(grade_letter(47), 'D');
        assert_eq!(grade_letter(42), 'E');
        assert_eq!(grade_letter(12), 'F');
    }

    #[test]
    fn monotonic_over_passing_range() {
        // Grade points never decrease as the score rises.
        let mut prev = grade_point(0);
        for s in 1..=100 {
            let gp = grade_point(s);
            assert!(gp >= prev, "grade_point({}) dropped below grade_point({})", s, s - 1);
            prev = gp;
        }
    }

    #[test]
    fn passing_scores_land_on_scale_steps() {
        for s in 40..100 {
            let gp = grade_point(s);
            assert!(
                [1.0, 2.0, 3.0, 4.0, 5.0].contains(&gp),
                "grade_point({}) = {} off the scale",
                s,
                gp
            );
        }
        for s in 0..40 {
            assert_eq!(grade_point(s), 0.0);
        }
    }
}
