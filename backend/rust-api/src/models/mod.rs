use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod attempt;
pub mod question;

/// Question difficulty. The total order drives both delivery order and the
/// unlock ladder: Easy opens Medium, Medium opens Hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Easy => Some(Tier::Medium),
            Tier::Medium => Some(Tier::Hard),
            Tier::Hard => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerChoice {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

/// Immutable during an attempt. Exactly one choice is correct; the generator
/// boundary enforces that before a question ever reaches storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    pub exam_id: String,
    pub text: String,
    pub tier: Tier,
    pub topic: String,
    pub choices: Vec<AnswerChoice>,
}

/// Choice as presented to a test-taker. Never carries the correctness flag.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceView {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub tier: Tier,
    pub topic: String,
    pub choices: Vec<ChoiceView>,
}

impl QuestionView {
    /// Presentation copy of a question. Choice order is shuffled per
    /// presentation; bookkeeping stays keyed by choice id.
    pub fn presented(question: &Question) -> Self {
        let mut choices: Vec<ChoiceView> = question
            .choices
            .iter()
            .map(|c| ChoiceView {
                id: c.id.clone(),
                text: c.text.clone(),
            })
            .collect();
        choices.shuffle(&mut rand::rng());

        Self {
            id: question.id.clone(),
            text: question.text.clone(),
            tier: question.tier,
            topic: question.topic.clone(),
            choices,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartAttemptRequest {
    #[validate(length(min = 1, max = 255))]
    pub test_taker_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_id: String,
    pub choice_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_order_is_easy_medium_hard() {
        assert!(Tier::Easy < Tier::Medium);
        assert!(Tier::Medium < Tier::Hard);
        let mut all = vec![Tier::Hard, Tier::Easy, Tier::Medium];
        all.sort();
        assert_eq!(all, Tier::ALL.to_vec());
    }

    #[test]
    fn tier_ladder_stops_at_hard() {
        assert_eq!(Tier::Easy.next(), Some(Tier::Medium));
        assert_eq!(Tier::Medium.next(), Some(Tier::Hard));
        assert_eq!(Tier::Hard.next(), None);
    }

    #[test]
    fn question_view_hides_correctness() {
        let question = Question {
            id: "q1".into(),
            exam_id: "e1".into(),
            text: "2 + 2?".into(),
            tier: Tier::Easy,
            topic: "arithmetic".into(),
            choices: vec![
                AnswerChoice {
                    id: "c1".into(),
                    text: "4".into(),
                    is_correct: true,
                },
                AnswerChoice {
                    id: "c2".into(),
                    text: "5".into(),
                    is_correct: false,
                },
            ],
        };

        let view = QuestionView::presented(&question);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["choices"][0].get("is_correct").is_none());
        assert_eq!(view.choices.len(), 2);
    }
}
