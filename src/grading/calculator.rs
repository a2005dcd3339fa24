use crate::grading::aggregate::aggregate;
use crate::grading::group::score_group;
use crate::grading::index::SubmissionIndex;
use crate::grading::types::{CourseEnv, GradeReport, GradingOptions, GroupReport, GroupResult};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Runs the full pipeline over a course `ENV`.
///
/// Returns `None` when the page already shows the final grade and
/// `options.force` is not set. Groups whose drop rules cannot be applied are
/// reported with their error and left out of the final grade.
#[tracing::instrument(skip_all, fields(scheme = %env.weighting_scheme(), groups = env.assignment_groups.len()))]
pub fn calculate(env: &CourseEnv, options: &GradingOptions) -> Option<GradeReport> {
    if !env.hide_final_grades && !options.force {
        info!("No need for grade unblocking");
        return None;
    }

    let index = SubmissionIndex::build(&env.submissions);
    debug!(submissions = index.len(), "Submission index built");

    let mut groups = Vec::new();
    let mut qualifying = Vec::new();
    let mut total_weight = 0.0;

    for group in &env.assignment_groups {
        if group.assignments.is_empty() {
            debug!(group_id = %group.id, "Skipping group without assignments");
            continue;
        }

        let mut report = GroupReport {
            group_id: group.id.clone(),
            name: group.name.clone(),
            group_weight: group.group_weight,
            points_earned: 0.0,
            total_points: 0.0,
            counted: false,
            error: None,
        };

        match score_group(group, &index, options.never_drop) {
            Ok(score) => {
                let result = GroupResult {
                    group_weight: group.group_weight,
                    points_earned: score.points_earned,
                    total_points: score.total_points,
                };
                report.points_earned = score.points_earned;
                report.total_points = score.total_points;

                if result.qualifies() {
                    total_weight += group.group_weight;
                    qualifying.push(result);
                    report.counted = true;
                } else {
                    debug!(group_id = %group.id, "Group has no points yet, not counted");
                }
            }
            Err(e) => {
                warn!(group_id = e.group_id(), error = %e, "Group rules cannot be applied");
                report.error = Some(e.to_string());
            }
        }

        groups.push(report);
    }

    let overall = aggregate(&qualifying, env.weighting_scheme(), total_weight);
    info!(overall = %overall, counted = qualifying.len(), "Calculated grade");

    Some(GradeReport {
        generated_at: Utc::now(),
        weighting_scheme: env.weighting_scheme(),
        never_drop: options.never_drop,
        groups,
        overall,
    })
}
