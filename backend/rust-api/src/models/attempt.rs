use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{QuestionView, Tier};

/// Identity of one attempt: a test-taker takes an exam at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttemptKey {
    pub test_taker_id: String,
    pub exam_id: String,
}

impl AttemptKey {
    pub fn new(test_taker_id: impl Into<String>, exam_id: impl Into<String>) -> Self {
        Self {
            test_taker_id: test_taker_id.into(),
            exam_id: exam_id.into(),
        }
    }

    /// Flat form used as Redis key suffix and Mongo `_id`. The `_id`
    /// uniqueness is what closes the duplicate-commit race.
    pub fn flatten(&self) -> String {
        format!("{}:{}", self.test_taker_id, self.exam_id)
    }
}

/// One submitted answer with correctness captured at submit time. The
/// snapshot is never recomputed, even if question data were to change later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub question_id: String,
    pub choice_id: String,
    pub tier: Tier,
    pub correct: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Ephemeral per-attempt scratch state. Lives in the progress store for the
/// duration of one attempt and is discarded on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptProgress {
    pub test_taker_id: String,
    pub exam_id: String,
    pub answers: Vec<RecordedAnswer>,
    /// Index into the flattened sequence of questions in `unlocked_tiers`.
    pub cursor: usize,
    /// Starts as [Easy]; grows monotonically, never shrinks within an attempt.
    pub unlocked_tiers: Vec<Tier>,
    pub started_at: DateTime<Utc>,
}

impl AttemptProgress {
    pub fn new(key: &AttemptKey, started_at: DateTime<Utc>) -> Self {
        Self {
            test_taker_id: key.test_taker_id.clone(),
            exam_id: key.exam_id.clone(),
            answers: Vec::new(),
            cursor: 0,
            unlocked_tiers: vec![Tier::Easy],
            started_at,
        }
    }

    pub fn key(&self) -> AttemptKey {
        AttemptKey::new(self.test_taker_id.clone(), self.exam_id.clone())
    }

    /// (correct, total) over the answers recorded so far for one tier.
    pub fn tier_counts(&self, tier: Tier) -> (u32, u32) {
        let mut correct = 0;
        let mut total = 0;
        for answer in self.answers.iter().filter(|a| a.tier == tier) {
            total += 1;
            if answer.correct {
                correct += 1;
            }
        }
        (correct, total)
    }
}

/// Categorical summary of how far the gating let the test-taker progress.
/// Derived from `unlocked_tiers` only, never re-derived from percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eligibility {
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    Average,
    Excellent,
}

impl Eligibility {
    pub fn from_unlocked(unlocked: &[Tier]) -> Self {
        if unlocked.contains(&Tier::Hard) {
            Eligibility::Excellent
        } else if unlocked.contains(&Tier::Medium) {
            Eligibility::Average
        } else {
            Eligibility::NeedsImprovement
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Eligibility::NeedsImprovement => "Needs Improvement",
            Eligibility::Average => "Average",
            Eligibility::Excellent => "Excellent",
        }
    }
}

/// Final tiered score of a completed attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    pub score_percent: f64,
    pub easy_correct: u32,
    pub easy_total: u32,
    pub medium_correct: u32,
    pub medium_total: u32,
    pub hard_correct: u32,
    pub hard_total: u32,
    pub eligibility: Eligibility,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Durable record, one Mongo document per (test_taker, exam). Answers are
/// embedded so the commit is a single atomic insert: readers never observe
/// answers without a result or vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub test_taker_id: String,
    pub exam_id: String,
    pub result: AttemptResult,
    pub answers: Vec<RecordedAnswer>,
}

impl AttemptRecord {
    pub fn new(progress: &AttemptProgress, result: AttemptResult) -> Self {
        Self {
            id: progress.key().flatten(),
            test_taker_id: progress.test_taker_id.clone(),
            exam_id: progress.exam_id.clone(),
            result,
            answers: progress.answers.clone(),
        }
    }
}

/// Snapshot handed back to the caller after start/resume or a submission.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptState {
    pub exam_id: String,
    pub test_taker_id: String,
    pub unlocked_tiers: Vec<Tier>,
    pub answered: usize,
    pub finished: bool,
    /// `None` while unfinished means no question remains (NoMoreQuestions).
    pub question: Option<QuestionView>,
    pub result: Option<AttemptResult>,
}
