//! Service-side database repositories

pub mod semesters;
pub mod users;
