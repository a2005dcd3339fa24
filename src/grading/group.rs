//! Per-group scoring: filtering, ranking and drop rules.

use crate::error::GradeError;
use crate::grading::index::SubmissionIndex;
use crate::grading::types::{AssignmentGroup, GroupRules, NeverDropPolicy, ScoredAssignment};
use crate::grading::utility::normalized_score;
use tracing::debug;

/// Result of scoring one assignment group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupScore {
    pub points_earned: f64,
    pub total_points: f64,
    /// Drop candidates, ascending by `normalized_score`.
    pub ranked: Vec<ScoredAssignment>,
    /// Ids removed by the drop rules.
    pub dropped: Vec<String>,
}

/// Scores `group` against the submission index.
///
/// Only graded, unexcused, non-omitted assignments with a score take part.
/// Assignments in `never_drop` are never drop candidates; `policy` decides
/// whether they count toward the totals at all.
///
/// # Errors
///
/// Returns [`GradeError`] when a drop rule asks for more assignments than
/// the group has graded.
pub fn score_group(
    group: &AssignmentGroup,
    index: &SubmissionIndex,
    policy: NeverDropPolicy,
) -> Result<GroupScore, GradeError> {
    let mut candidates = Vec::new();
    let mut protected_earned = 0.0;
    let mut protected_total = 0.0;

    for assignment in &group.assignments {
        if assignment.omit_from_final_grade {
            debug!(assignment_id = %assignment.id, "Assignment omitted from final grade");
            continue;
        }

        let Some(points) = index.points_for(&assignment.id) else {
            continue;
        };

        if group.rules.never_drop.contains(&assignment.id) {
            match policy {
                NeverDropPolicy::Exclude => {
                    debug!(
                        assignment_id = %assignment.id,
                        "never_drop assignment left out of group totals"
                    );
                }
                NeverDropPolicy::Include => {
                    protected_earned += points;
                    protected_total += assignment.points_possible;
                }
            }
            continue;
        }

        candidates.push(ScoredAssignment {
            id: assignment.id.clone(),
            normalized_score: normalized_score(points, assignment.points_possible),
            points_earned: points,
            total_points: assignment.points_possible,
        });
    }

    // sort_by is stable: ties keep page order
    candidates.sort_by(|a, b| a.normalized_score.total_cmp(&b.normalized_score));

    let (keep_from, keep_to) = kept_range(&group.id, &group.rules, candidates.len())?;

    let mut points_earned = protected_earned;
    let mut total_points = protected_total;
    for kept in &candidates[keep_from..keep_to] {
        points_earned += kept.points_earned;
        total_points += kept.total_points;
    }

    let dropped: Vec<String> = candidates[..keep_from]
        .iter()
        .chain(&candidates[keep_to..])
        .map(|c| c.id.clone())
        .collect();

    debug!(
        group_id = %group.id,
        candidates = candidates.len(),
        dropped = dropped.len(),
        points_earned,
        total_points,
        "Group scored"
    );

    Ok(GroupScore {
        points_earned,
        total_points,
        ranked: candidates,
        dropped,
    })
}

/// Half-open range of the ranked candidates that survive the drop rules.
fn kept_range(
    group_id: &str,
    rules: &GroupRules,
    available: usize,
) -> Result<(usize, usize), GradeError> {
    if let Some(keep) = rules.drop_all_but {
        if keep > available {
            return Err(GradeError::KeepExceedsCandidates {
                group_id: group_id.to_string(),
                keep,
                available,
            });
        }
        return Ok((available - keep, available));
    }

    let lowest = rules.drop_lowest.unwrap_or(0);
    let highest = rules.drop_highest.unwrap_or(0);
    if lowest.checked_add(highest).is_none_or(|n| n > available) {
        return Err(GradeError::DropExceedsCandidates {
            group_id: group_id.to_string(),
            lowest,
            highest,
            available,
        });
    }

    Ok((lowest, available - highest))
}
