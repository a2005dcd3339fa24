use crate::grading::types::{Submission, WorkflowState};
use std::collections::HashMap;
use tracing::{debug, warn};

/// What the engine keeps from a submission row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmissionRecord {
    pub score: Option<f64>,
    pub excused: bool,
    pub workflow_state: WorkflowState,
}

impl SubmissionRecord {
    /// The score that may count toward a grade, if any.
    pub fn contributable_score(&self) -> Option<f64> {
        if self.excused || self.workflow_state != WorkflowState::Graded {
            return None;
        }
        self.score
    }
}

/// Lookup from assignment id to its submission.
#[derive(Debug, Default)]
pub struct SubmissionIndex {
    records: HashMap<String, SubmissionRecord>,
}

impl SubmissionIndex {
    /// Indexes `submissions`; a later row for the same assignment replaces an earlier one.
    pub fn build(submissions: &[Submission]) -> Self {
        let mut records = HashMap::with_capacity(submissions.len());
        for submission in submissions {
            records.insert(
                submission.assignment_id.clone(),
                SubmissionRecord {
                    score: submission.score,
                    excused: submission.excused,
                    workflow_state: submission.workflow_state,
                },
            );
        }
        Self { records }
    }

    pub fn get(&self, assignment_id: &str) -> Option<&SubmissionRecord> {
        self.records.get(assignment_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Points the student earned on `assignment_id`, or `None` when nothing counts.
    pub fn points_for(&self, assignment_id: &str) -> Option<f64> {
        let Some(record) = self.get(assignment_id) else {
            warn!(assignment_id, "No submission found for assignment");
            return None;
        };

        let points = record.contributable_score();
        if points.is_none() {
            debug!(
                assignment_id,
                excused = record.excused,
                workflow_state = ?record.workflow_state,
                "Submission does not count toward grade"
            );
        }
        points
    }
}
