use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::error::AttemptError;
use crate::metrics::{
    record_answer_submitted, ATTEMPTS_COMPLETED_TOTAL, ATTEMPTS_STARTED_TOTAL,
    TIERS_UNLOCKED_TOTAL,
};
use crate::models::attempt::{
    AttemptKey, AttemptProgress, AttemptRecord, AttemptState, RecordedAnswer,
};
use crate::models::{Question, QuestionView, Tier};
use crate::services::scorer;
use crate::services::stores::{AttemptStore, ProgressStore, QuestionRepository};
use crate::services::AppState;

/// Outcome of one `submit_answer` call.
#[derive(Debug, Serialize)]
pub struct SubmitOutcome {
    pub correct: bool,
    #[serde(flatten)]
    pub state: AttemptState,
}

/// Adaptive session controller. Drives the one-question-at-a-time flow,
/// applies the tier-unlock policy at tier boundaries and finishes the
/// attempt when the unlocked question set is exhausted. Purely reactive:
/// every state change happens inside a call from the test-taker.
pub struct AttemptService {
    questions: Arc<dyn QuestionRepository>,
    progress: Arc<dyn ProgressStore>,
    attempts: Arc<dyn AttemptStore>,
}

/// Questions of the unlocked tiers, ordered tier-first and stably by
/// question id within a tier.
fn flatten<'a>(questions: &'a [Question], unlocked: &[Tier]) -> Vec<&'a Question> {
    let mut flat: Vec<&Question> = questions
        .iter()
        .filter(|q| unlocked.contains(&q.tier))
        .collect();
    flat.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.id.cmp(&b.id)));
    flat
}

/// The 50% gate. Integer arithmetic avoids float comparison at the
/// boundary; a tier without answers never passes.
fn gate_passes(correct: u32, total: u32) -> bool {
    total > 0 && correct * 2 >= total
}

impl AttemptService {
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        progress: Arc<dyn ProgressStore>,
        attempts: Arc<dyn AttemptStore>,
    ) -> Self {
        Self {
            questions,
            progress,
            attempts,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.questions.clone(),
            state.progress.clone(),
            state.attempts.clone(),
        )
    }

    /// Begins a new attempt or picks up an in-flight one. Rejected with
    /// `AlreadyCompleted` once a durable result exists: no retakes, ever,
    /// short of a teacher reset.
    pub async fn start_or_resume(&self, key: &AttemptKey) -> Result<AttemptState, AttemptError> {
        self.reject_if_completed(key).await?;

        if self.questions.find_exam(&key.exam_id).await?.is_none() {
            return Err(AttemptError::ExamNotFound(key.exam_id.clone()));
        }

        let questions = self.questions.list_questions(&key.exam_id).await?;
        let mut progress = match self.progress.load(key).await? {
            Some(existing) => {
                tracing::info!(
                    "Resuming attempt: test_taker={}, exam={}, answered={}",
                    key.test_taker_id,
                    key.exam_id,
                    existing.answers.len()
                );
                existing
            }
            None => {
                ATTEMPTS_STARTED_TOTAL.inc();
                tracing::info!(
                    "Starting attempt: test_taker={}, exam={}",
                    key.test_taker_id,
                    key.exam_id
                );
                AttemptProgress::new(key, Utc::now())
            }
        };

        // An exam with no questions in the unlocked set finishes immediately.
        self.advance(&mut progress, &questions).await
    }

    /// Snapshot of the current position. `question == None` on an
    /// unfinished attempt is the NoMoreQuestions signal.
    pub async fn current_question(&self, key: &AttemptKey) -> Result<AttemptState, AttemptError> {
        self.reject_if_completed(key).await?;

        let progress = self
            .progress
            .load(key)
            .await?
            .ok_or(AttemptError::NoActiveAttempt)?;
        let questions = self.questions.list_questions(&key.exam_id).await?;
        let flat = flatten(&questions, &progress.unlocked_tiers);

        Ok(snapshot(&progress, flat.get(progress.cursor).copied(), None))
    }

    /// Records one answer against the current question. Out-of-order or
    /// replayed submissions are rejected without mutating progress.
    pub async fn submit_answer(
        &self,
        key: &AttemptKey,
        question_id: &str,
        choice_id: &str,
    ) -> Result<SubmitOutcome, AttemptError> {
        self.reject_if_completed(key).await?;

        let mut progress = self
            .progress
            .load(key)
            .await?
            .ok_or(AttemptError::NoActiveAttempt)?;
        let questions = self.questions.list_questions(&key.exam_id).await?;
        let flat = flatten(&questions, &progress.unlocked_tiers);

        let expected = flat
            .get(progress.cursor)
            .copied()
            .ok_or_else(|| AttemptError::InvalidSubmission {
                reason: "no question is awaiting an answer".to_string(),
            })?;
        if expected.id != question_id {
            return Err(AttemptError::InvalidSubmission {
                reason: format!(
                    "question {} is not the current question ({})",
                    question_id, expected.id
                ),
            });
        }
        let choice = expected
            .choices
            .iter()
            .find(|c| c.id == choice_id)
            .ok_or_else(|| AttemptError::InvalidSubmission {
                reason: format!(
                    "choice {} does not belong to question {}",
                    choice_id, expected.id
                ),
            })?;

        // correctness snapshot is taken now and never recomputed
        let correct = choice.is_correct;
        progress.answers.push(RecordedAnswer {
            question_id: expected.id.clone(),
            choice_id: choice.id.clone(),
            tier: expected.tier,
            correct,
            submitted_at: Utc::now(),
        });
        progress.cursor += 1;
        record_answer_submitted(correct);

        tracing::info!(
            "Answer recorded: test_taker={}, exam={}, question={}, tier={}, correct={}",
            key.test_taker_id,
            key.exam_id,
            expected.id,
            expected.tier.as_str(),
            correct
        );

        let state = self.advance(&mut progress, &questions).await?;
        Ok(SubmitOutcome { correct, state })
    }

    /// Administrative retake reset: removes the durable result and any
    /// in-flight progress, after which `start_or_resume` is permitted again.
    pub async fn reset(&self, key: &AttemptKey) -> Result<(), AttemptError> {
        self.attempts.clear(key).await?;
        self.progress.clear(key).await?;
        tracing::info!(
            "Attempt reset: test_taker={}, exam={}",
            key.test_taker_id,
            key.exam_id
        );
        Ok(())
    }

    async fn reject_if_completed(&self, key: &AttemptKey) -> Result<(), AttemptError> {
        if self.attempts.find(key).await?.is_some() {
            return Err(AttemptError::AlreadyCompleted);
        }
        Ok(())
    }

    /// Runs the tier-boundary loop: while the flattened unlocked sequence is
    /// exhausted, either the gate of the just-completed tier opens the next
    /// tier or the attempt finishes. Persists progress when a question
    /// remains.
    async fn advance(
        &self,
        progress: &mut AttemptProgress,
        questions: &[Question],
    ) -> Result<AttemptState, AttemptError> {
        let mut flat = flatten(questions, &progress.unlocked_tiers);

        while progress.cursor >= flat.len() {
            let completed = match progress.unlocked_tiers.last() {
                Some(tier) => *tier,
                None => return self.finish(progress).await,
            };
            let (correct, total) = progress.tier_counts(completed);

            if gate_passes(correct, total) {
                if let Some(next) = completed.next() {
                    progress.unlocked_tiers.push(next);
                    TIERS_UNLOCKED_TOTAL
                        .with_label_values(&[next.as_str()])
                        .inc();
                    tracing::info!(
                        "Tier unlocked: test_taker={}, exam={}, tier={} ({}/{} on {})",
                        progress.test_taker_id,
                        progress.exam_id,
                        next.as_str(),
                        correct,
                        total,
                        completed.as_str()
                    );
                    flat = flatten(questions, &progress.unlocked_tiers);
                    continue;
                }
            }
            // gate failed or nothing left to unlock
            return self.finish(progress).await;
        }

        self.progress.save(progress).await?;
        let current = flat.get(progress.cursor).copied();
        Ok(snapshot(progress, current, None))
    }

    /// Scores the attempt, commits the durable record exactly once and
    /// discards the ephemeral progress. A lost commit race surfaces as
    /// `DuplicateAttempt`; the winner's record stands.
    async fn finish(&self, progress: &AttemptProgress) -> Result<AttemptState, AttemptError> {
        let result = scorer::compute(progress, Utc::now());
        let record = AttemptRecord::new(progress, result.clone());

        match self.attempts.commit(&record).await {
            Ok(()) => {
                ATTEMPTS_COMPLETED_TOTAL
                    .with_label_values(&[result.eligibility.as_str()])
                    .inc();
                tracing::info!(
                    "Attempt finished: test_taker={}, exam={}, score={:.1}%, eligibility={}",
                    progress.test_taker_id,
                    progress.exam_id,
                    result.score_percent,
                    result.eligibility.as_str()
                );
            }
            Err(AttemptError::DuplicateAttempt) => {
                tracing::warn!(
                    "Concurrent commit lost: test_taker={}, exam={}",
                    progress.test_taker_id,
                    progress.exam_id
                );
                self.progress.clear(&progress.key()).await?;
                return Err(AttemptError::DuplicateAttempt);
            }
            Err(e) => return Err(e),
        }

        self.progress.clear(&progress.key()).await?;
        Ok(snapshot(progress, None, Some(result)))
    }
}

fn snapshot(
    progress: &AttemptProgress,
    current: Option<&Question>,
    result: Option<crate::models::attempt::AttemptResult>,
) -> AttemptState {
    AttemptState {
        exam_id: progress.exam_id.clone(),
        test_taker_id: progress.test_taker_id.clone(),
        unlocked_tiers: progress.unlocked_tiers.clone(),
        answered: progress.answers.len(),
        finished: result.is_some(),
        question: current.map(QuestionView::presented),
        result,
    }
}
