//! Errors raised by the grading engine.

use thiserror::Error;

/// A group configuration the engine refuses to score.
///
/// Returned instead of a number so a wrong grade is never displayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeError {
    #[error("group {group_id}: drop_all_but = {keep} but only {available} graded assignments")]
    KeepExceedsCandidates {
        group_id: String,
        keep: usize,
        available: usize,
    },

    #[error(
        "group {group_id}: dropping {lowest} lowest and {highest} highest of {available} graded assignments"
    )]
    DropExceedsCandidates {
        group_id: String,
        lowest: usize,
        highest: usize,
        available: usize,
    },
}

impl GradeError {
    pub fn group_id(&self) -> &str {
        match self {
            GradeError::KeepExceedsCandidates { group_id, .. }
            | GradeError::DropExceedsCandidates { group_id, .. } => group_id,
        }
    }
}
