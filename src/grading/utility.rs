/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Ranking key for an assignment: the fraction of its points the student earned.
///
/// Zero-point assignments rank above everything when they carry extra credit,
/// and as a perfect score when they carry nothing.
pub fn normalized_score(points_earned: f64, points_possible: f64) -> f64 {
    if points_possible > 0.0 {
        points_earned / points_possible
    } else if points_earned > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}
