//! Distance to similarity transform.
//!
//! The store reports squared Euclidean distance `d >= 0`. Scores are
//! `1 / (1 + d)`: 1.0 exactly when `d == 0`, falling towards 0 as the
//! distance grows. The threshold applies to the unrounded similarity;
//! rounding only affects the reported value.

/// Decimal places kept in reported scores
pub const SCORE_DECIMALS: i32 = 4;

/// Similarity in `(0, 1]` for a store distance.
///
/// Small negative distances from float error count as 0; NaN scores 0.
pub fn similarity_from_distance(distance: f32) -> f64 {
    if distance.is_nan() {
        return 0.0;
    }
    let d = f64::from(distance).max(0.0);
    1.0 / (1.0 + d)
}

/// Round a score to [`SCORE_DECIMALS`] places.
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score * factor).round() / factor
}
