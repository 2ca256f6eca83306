//! Training-mode quiz: a small state machine over the question bank.

mod bank;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::inference::Disease;

pub use bank::{Question, questions};

/// Questions drawn per quiz, capped by the bank size.
pub const QUIZ_LENGTH: usize = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("Cannot {action} now: {state}")]
    InvalidTransition { action: &'static str, state: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Quiz {
    #[default]
    NotStarted,
    InProgress {
        disease: Disease,
        questions: Vec<&'static Question>,
        index: usize,
        score: usize,
        answered: bool,
    },
    Finished {
        disease: Disease,
        score: usize,
        total: usize,
    },
}

/// Outcome of one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub correct: bool,
    pub answer: &'static str,
    pub reason: &'static str,
}

/// What a client is shown for the current quiz state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuizView {
    NotStarted,
    InProgress {
        disease: Disease,
        /// 1-based position of the current question.
        number: usize,
        total: usize,
        question: &'static str,
        options: &'static [&'static str],
        score: usize,
        answered: bool,
    },
    Finished {
        disease: Disease,
        score: usize,
        total: usize,
    },
}

impl Quiz {
    fn state_name(&self) -> &'static str {
        match self {
            Self::NotStarted => "quiz not started",
            Self::InProgress { answered: false, .. } => "question not answered yet",
            Self::InProgress { answered: true, .. } => "question already answered",
            Self::Finished { .. } => "quiz finished",
        }
    }

    fn reject(&self, action: &'static str) -> QuizError {
        QuizError::InvalidTransition {
            action,
            state: self.state_name(),
        }
    }

    /// Start a fresh quiz, discarding whatever state came before.
    pub fn start<R: Rng + ?Sized>(&mut self, disease: Disease, rng: &mut R) {
        let bank = questions(disease);
        let mut drawn: Vec<&'static Question> =
            bank.choose_multiple(rng, QUIZ_LENGTH.min(bank.len())).collect();
        drawn.shuffle(rng);

        *self = Self::InProgress {
            disease,
            questions: drawn,
            index: 0,
            score: 0,
            answered: false,
        };
    }

    pub fn submit(&mut self, choice: &str) -> Result<Feedback, QuizError> {
        match self {
            Self::InProgress {
                questions,
                index,
                score,
                answered,
                ..
            } if !*answered => {
                let question = questions[*index];
                let correct = choice == question.answer;
                if correct {
                    *score += 1;
                }
                *answered = true;
                Ok(Feedback {
                    correct,
                    answer: question.answer,
                    reason: question.reason,
                })
            }
            _ => Err(self.reject("answer")),
        }
    }

    pub fn next(&mut self) -> Result<(), QuizError> {
        match self {
            Self::InProgress {
                disease,
                questions,
                index,
                score,
                answered,
            } if *answered => {
                if *index + 1 >= questions.len() {
                    *self = Self::Finished {
                        disease: *disease,
                        score: *score,
                        total: questions.len(),
                    };
                } else {
                    *index += 1;
                    *answered = false;
                }
                Ok(())
            }
            _ => Err(self.reject("advance")),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::NotStarted;
    }

    pub fn view(&self) -> QuizView {
        match self {
            Self::NotStarted => QuizView::NotStarted,
            Self::InProgress {
                disease,
                questions,
                index,
                score,
                answered,
            } => {
                let question = questions[*index];
                QuizView::InProgress {
                    disease: *disease,
                    number: index + 1,
                    total: questions.len(),
                    question: question.text,
                    options: question.options,
                    score: *score,
                    answered: *answered,
                }
            }
            Self::Finished { disease, score, total } => QuizView::Finished {
                disease: *disease,
                score: *score,
                total: *total,
            },
        }
    }
}
