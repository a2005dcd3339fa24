//! Data types shared by the grading pipeline.
//!
//! Input records mirror the course `ENV` object the grades page embeds. Field
//! shapes on that page are loose (ids may be strings or numbers, flags may be
//! missing or null), so everything is normalized here at deserialization time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Grading state of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Graded,
    PendingReview,
    Submitted,
    Unsubmitted,
    #[serde(other)]
    Other,
}

/// One row of the page's `submissions` array.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    #[serde(deserialize_with = "id_string")]
    pub assignment_id: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excused: bool,
    pub workflow_state: WorkflowState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assignment {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points_possible: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub omit_from_final_grade: bool,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub assignment_group_id: Option<String>,
}

/// Drop rules attached to an assignment group.
///
/// `drop_all_but` wins over the `drop_lowest`/`drop_highest` pair when set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupRules {
    #[serde(default)]
    pub drop_lowest: Option<usize>,
    #[serde(default)]
    pub drop_highest: Option<usize>,
    #[serde(default)]
    pub drop_all_but: Option<usize>,
    #[serde(default, deserialize_with = "id_set")]
    pub never_drop: HashSet<String>,
}

/// A grading category such as "Homework" or "Exams".
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentGroup {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_weight: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: GroupRules,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assignments: Vec<Assignment>,
}

/// Course-level formula combining group totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingScheme {
    /// Unweighted point totals. Also used when the page reports `null`.
    #[default]
    Points,
    /// Every qualifying group counts the same.
    Equal,
    /// Groups weighted by `group_weight`.
    Percent,
}

impl fmt::Display for WeightingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeightingScheme::Points => "points",
            WeightingScheme::Equal => "equal",
            WeightingScheme::Percent => "percent",
        };
        f.write_str(name)
    }
}

/// The subset of the page `ENV` the engine consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseEnv {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hide_final_grades: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub submissions: Vec<Submission>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assignment_groups: Vec<AssignmentGroup>,
    #[serde(default)]
    pub group_weighting_scheme: Option<WeightingScheme>,
}

impl CourseEnv {
    pub fn weighting_scheme(&self) -> WeightingScheme {
        self.group_weighting_scheme.unwrap_or_default()
    }
}

/// An assignment that survived filtering, ranked by `normalized_score`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAssignment {
    pub id: String,
    pub normalized_score: f64,
    pub points_earned: f64,
    pub total_points: f64,
}

/// Per-group totals handed to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupResult {
    pub group_weight: f64,
    pub points_earned: f64,
    pub total_points: f64,
}

impl GroupResult {
    /// A group counts toward the final grade only if it offered some points.
    pub fn qualifies(&self) -> bool {
        self.total_points > 0.0 || self.points_earned > 0.0
    }
}

/// How assignments listed in a group's `never_drop` rule are totaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NeverDropPolicy {
    /// Leave them out of the group totals entirely. This is what the
    /// grades page calculation has always shown.
    #[default]
    Exclude,
    /// Add them to the totals before drops, exempt from dropping.
    Include,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GradingOptions {
    pub never_drop: NeverDropPolicy,
    /// Run even when the page does not hide the final grade.
    pub force: bool,
}

/// Final course percentage, or the sentinel shown when none can be computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "percent", rename_all = "snake_case")]
pub enum FinalGrade {
    Percent(f64),
    Undefined,
}

impl FinalGrade {
    pub fn percent(&self) -> Option<f64> {
        match self {
            FinalGrade::Percent(p) => Some(*p),
            FinalGrade::Undefined => None,
        }
    }
}

impl fmt::Display for FinalGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalGrade::Percent(p) => write!(f, "{p:.2}%"),
            FinalGrade::Undefined => f.write_str("undefined"),
        }
    }
}

/// Display row for a single assignment group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group_id: String,
    pub name: String,
    pub group_weight: f64,
    pub points_earned: f64,
    pub total_points: f64,
    /// Whether the group took part in the weighted total.
    pub counted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GroupReport {
    /// Group percentage, `None` when the group offered no points.
    pub fn percent(&self) -> Option<f64> {
        let p = self.points_earned / self.total_points * 100.0;
        p.is_finite().then_some(p)
    }

    /// Raw `earned/total` string as the grades page shows it.
    pub fn fraction(&self) -> String {
        format!("{:.2}/{:.2}", self.points_earned, self.total_points)
    }
}

/// Everything one run of the engine produces.
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub generated_at: DateTime<Utc>,
    pub weighting_scheme: WeightingScheme,
    pub never_drop: NeverDropPolicy,
    pub groups: Vec<GroupReport>,
    pub overall: FinalGrade,
}

impl GradeReport {
    pub fn has_errors(&self) -> bool {
        self.groups.iter().any(|g| g.error.is_some())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    RawId::deserialize(d).map(String::from)
}

fn optional_id_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(d)?.map(String::from))
}

fn id_set<'de, D: Deserializer<'de>>(d: D) -> Result<HashSet<String>, D::Error> {
    let ids = Option::<Vec<RawId>>::deserialize(d)?.unwrap_or_default();
    Ok(ids.into_iter().map(String::from).collect())
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_defaults_missing_excused() {
        let s: Submission = serde_json::from_str(
            r#"{"assignment_id": 42, "score": 7.5, "workflow_state": "graded"}"#,
        )
        .unwrap();

        assert_eq!(s.assignment_id, "42");
        assert_eq!(s.score, Some(7.5));
        assert!(!s.excused);
        assert_eq!(s.workflow_state, WorkflowState::Graded);
    }

    #[test]
    fn test_unknown_workflow_state() {
        let s: Submission = serde_json::from_str(
            r#"{"assignment_id": "1", "score": null, "excused": null, "workflow_state": "deleted"}"#,
        )
        .unwrap();

        assert_eq!(s.workflow_state, WorkflowState::Other);
        assert_eq!(s.score, None);
        assert!(!s.excused);
    }

    #[test]
    fn test_group_rules_never_drop_mixed_ids() {
        let rules: GroupRules =
            serde_json::from_str(r#"{"drop_lowest": 1, "never_drop": ["10", 11]}"#).unwrap();

        assert_eq!(rules.drop_lowest, Some(1));
        assert_eq!(rules.drop_all_but, None);
        assert!(rules.never_drop.contains("10"));
        assert!(rules.never_drop.contains("11"));
    }

    #[test]
    fn test_null_weighting_scheme_is_points() {
        let env: CourseEnv = serde_json::from_str(
            r#"{"hide_final_grades": true, "submissions": [], "assignment_groups": [], "group_weighting_scheme": null}"#,
        )
        .unwrap();

        assert_eq!(env.weighting_scheme(), WeightingScheme::Points);
    }

    #[test]
    fn test_unknown_weighting_scheme_rejected() {
        let result: Result<CourseEnv, _> =
            serde_json::from_str(r#"{"group_weighting_scheme": "curved"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_final_grade_display() {
        assert_eq!(FinalGrade::Percent(93.0).to_string(), "93.00%");
        assert_eq!(FinalGrade::Undefined.to_string(), "undefined");
    }

    #[test]
    fn test_group_report_display_helpers() {
        let report = GroupReport {
            group_id: "1".into(),
            name: "Homework".into(),
            group_weight: 30.0,
            points_earned: 18.0,
            total_points: 20.0,
            counted: true,
            error: None,
        };

        assert_eq!(report.fraction(), "18.00/20.00");
        assert_eq!(report.percent(), Some(90.0));
    }

    #[test]
    fn test_group_report_percent_zero_total() {
        let report = GroupReport {
            group_id: "1".into(),
            name: String::new(),
            group_weight: 0.0,
            points_earned: 0.0,
            total_points: 0.0,
            counted: false,
            error: None,
        };

        assert_eq!(report.percent(), None);
    }
}
