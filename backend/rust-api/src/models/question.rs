use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AnswerChoice, Question, Tier};

/// Option count the generator collaborator is contracted to produce.
pub const QUESTION_CHOICE_COUNT: usize = 4;

/// Raw choice as produced by the text-generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedChoice {
    pub text: String,
    pub is_correct: bool,
}

/// Raw question record from the generator. Must pass [`validate`] before it
/// is allowed into the question repository.
///
/// [`validate`]: GeneratedQuestion::validate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub text: String,
    pub tier: Tier,
    pub answer_choices: Vec<GeneratedChoice>,
}

impl GeneratedQuestion {
    /// Boundary contract: non-empty text, exactly `QUESTION_CHOICE_COUNT`
    /// non-empty choices, exactly one of them marked correct.
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        if self.answer_choices.len() != QUESTION_CHOICE_COUNT {
            return Err(format!(
                "expected {} answer choices, got {}",
                QUESTION_CHOICE_COUNT,
                self.answer_choices.len()
            ));
        }
        if self.answer_choices.iter().any(|c| c.text.trim().is_empty()) {
            return Err("answer choice text is empty".to_string());
        }
        let correct_count = self.answer_choices.iter().filter(|c| c.is_correct).count();
        if correct_count != 1 {
            return Err(format!(
                "expected exactly one correct choice, got {}",
                correct_count
            ));
        }
        Ok(())
    }

    /// Converts a validated record into a stored question with fresh ids.
    pub fn into_question(self, exam_id: &str, topic: &str) -> Question {
        Question {
            id: Uuid::new_v4().to_string(),
            exam_id: exam_id.to_string(),
            text: self.text,
            tier: self.tier,
            topic: topic.to_string(),
            choices: self
                .answer_choices
                .into_iter()
                .map(|c| AnswerChoice {
                    id: Uuid::new_v4().to_string(),
                    text: c.text,
                    is_correct: c.is_correct,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(correct_flags: &[bool]) -> GeneratedQuestion {
        GeneratedQuestion {
            text: "What is the capital of France?".to_string(),
            tier: Tier::Easy,
            answer_choices: correct_flags
                .iter()
                .enumerate()
                .map(|(i, &is_correct)| GeneratedChoice {
                    text: format!("option {}", i),
                    is_correct,
                })
                .collect(),
        }
    }

    #[test]
    fn well_formed_record_passes() {
        assert!(record(&[false, true, false, false]).validate().is_ok());
    }

    #[test]
    fn zero_correct_choices_rejected() {
        let err = record(&[false, false, false, false]).validate().unwrap_err();
        assert!(err.contains("exactly one correct"));
    }

    #[test]
    fn multiple_correct_choices_rejected() {
        let err = record(&[true, true, false, false]).validate().unwrap_err();
        assert!(err.contains("got 2"));
    }

    #[test]
    fn wrong_option_count_rejected() {
        let err = record(&[true, false]).validate().unwrap_err();
        assert!(err.contains("answer choices"));
    }

    #[test]
    fn empty_text_rejected() {
        let mut rec = record(&[true, false, false, false]);
        rec.text = "   ".to_string();
        assert!(rec.validate().is_err());
    }

    #[test]
    fn conversion_assigns_ids_and_topic() {
        let question = record(&[true, false, false, false]).into_question("exam-1", "geography");
        assert_eq!(question.exam_id, "exam-1");
        assert_eq!(question.topic, "geography");
        assert!(!question.id.is_empty());
        assert_eq!(question.choices.len(), QUESTION_CHOICE_COUNT);
        assert_eq!(question.choices.iter().filter(|c| c.is_correct).count(), 1);
    }
}
