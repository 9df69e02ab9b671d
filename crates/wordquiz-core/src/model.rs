//! Core data model types for wordquiz.
//!
//! A [`Question`] arrives fresh from the backend on every fetch and is never
//! mutated afterwards; an [`AnswerAttempt`] is derived locally from it and sent
//! back exactly once.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a question. The backend uses the underlying word id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub i64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A multiple-choice question as served by `GET /api/multiple-choice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Word id the question was generated from.
    pub id: QuestionId,
    /// The prompt shown to the user.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Answer choices, in display order.
    pub options: Vec<String>,
    /// The option that counts as correct.
    pub correct_answer: String,
}

impl Question {
    /// Whether `option` is one of this question's choices.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// A graded answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerAttempt {
    pub question_id: QuestionId,
    pub selected_option: String,
    pub is_correct: bool,
}

impl AnswerAttempt {
    /// Grade `selected` against `question` by exact string equality.
    pub fn grade(question: &Question, selected: impl Into<String>) -> Self {
        let selected_option = selected.into();
        let is_correct = selected_option == question.correct_answer;
        Self {
            question_id: question.id,
            selected_option,
            is_correct,
        }
    }
}

/// Request body for `POST /api/learn`.
#[derive(Debug, Clone, Serialize)]
pub struct LearnRecord {
    pub word_id: QuestionId,
    pub is_correct: bool,
}

impl From<&AnswerAttempt> for LearnRecord {
    fn from(attempt: &AnswerAttempt) -> Self {
        Self {
            word_id: attempt.question_id,
            is_correct: attempt.is_correct,
        }
    }
}

/// What the backend reported after recording an answer.
///
/// The body is optional in the contract, so every field defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AnswerReceipt {
    #[serde(default)]
    pub score_change: Option<i64>,
}

/// Human-readable feedback after an answer has been recorded.
pub fn feedback_message(is_correct: bool, correct_answer: &str) -> String {
    if is_correct {
        "Correct!".to_string()
    } else {
        format!("Incorrect. The correct answer is: {correct_answer}")
    }
}

/// Running tally of answers the backend accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizStats {
    pub answered: u32,
    pub correct: u32,
}

impl QuizStats {
    pub fn record(&mut self, is_correct: bool) {
        self.answered += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    pub fn incorrect(&self) -> u32 {
        self.answered - self.correct
    }

    /// Fraction of correct answers, 0.0 when nothing was answered.
    pub fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.answered)
        }
    }
}
