use crate::grading::types::{FinalGrade, GroupResult, WeightingScheme};
use crate::grading::utility::mean;

/// Combines qualifying group totals into the course percentage.
///
/// `results` should hold only qualifying groups and `total_weight` the sum of
/// their weights. Under [`WeightingScheme::Percent`] a group with zero
/// `total_points` is skipped in the sum but its weight stays in `total_weight`;
/// the grades page has always computed it that way.
pub fn aggregate(results: &[GroupResult], scheme: WeightingScheme, total_weight: f64) -> FinalGrade {
    let ratio = match scheme {
        WeightingScheme::Points => {
            let earned: f64 = results.iter().map(|r| r.points_earned).sum();
            let total: f64 = results.iter().map(|r| r.total_points).sum();
            Some(earned / total)
        }
        WeightingScheme::Equal => {
            let ratios: Vec<f64> = results
                .iter()
                .map(|r| r.points_earned / r.total_points)
                .collect();
            mean(&ratios)
        }
        WeightingScheme::Percent if results.is_empty() => None,
        WeightingScheme::Percent => {
            let mut weighted = 0.0;
            for result in results {
                if result.total_points == 0.0 {
                    continue;
                }
                weighted += result.points_earned / result.total_points * (result.group_weight / total_weight);
            }
            Some(weighted)
        }
    };

    match ratio.map(|r| r * 100.0) {
        Some(percent) if percent.is_finite() => FinalGrade::Percent(percent),
        _ => FinalGrade::Undefined,
    }
}
