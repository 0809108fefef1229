/// Normalizes a raw Gradescope score to a fraction of the configured
/// points possible. The raw score is capped at the export's own
/// ceiling first so a misconfigured autograder cannot inflate grades.
pub(crate) fn normalized_score(raw_score: f64, max_points: f64, points_possible: f64) -> f64 {
    if points_possible <= 0.0 {
        return 0.0;
    }
    raw_score.min(max_points) / points_possible
}
