use chrono::{DateTime, Utc};

use crate::models::attempt::{AttemptProgress, AttemptResult, Eligibility};
use crate::models::Tier;

/// Aggregates the recorded answers of one attempt into the final result.
/// The eligibility label restates how far the unlock policy let the
/// test-taker progress; it is not derived from the percentage.
pub fn compute(progress: &AttemptProgress, ended_at: DateTime<Utc>) -> AttemptResult {
    let (easy_correct, easy_total) = progress.tier_counts(Tier::Easy);
    let (medium_correct, medium_total) = progress.tier_counts(Tier::Medium);
    let (hard_correct, hard_total) = progress.tier_counts(Tier::Hard);

    let correct_sum = easy_correct + medium_correct + hard_correct;
    let total_sum = easy_total + medium_total + hard_total;
    let score_percent = if total_sum > 0 {
        100.0 * f64::from(correct_sum) / f64::from(total_sum)
    } else {
        0.0
    };

    AttemptResult {
        score_percent,
        easy_correct,
        easy_total,
        medium_correct,
        medium_total,
        hard_correct,
        hard_total,
        eligibility: Eligibility::from_unlocked(&progress.unlocked_tiers),
        started_at: progress.started_at,
        ended_at,
    }
}
