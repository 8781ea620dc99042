//! Quiz and question data model with strict wire decoders
//!
//! This module defines the identifiers and payload types the engine
//! receives from the backend. Every endpoint response has a typed decoder
//! here; nothing in the engine ever works with loosely shaped JSON. The
//! payloads are validated once at the fetch boundary, with limits from
//! [`crate::constants`], before play begins.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use garde::Validate;
use serde::{Deserialize, Serialize};

/// A unique identifier for a quiz
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::From,
)]
#[serde(transparent)]
pub struct QuizId(pub(crate) u64);

/// A unique identifier for a question within a quiz
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::From,
)]
#[serde(transparent)]
pub struct QuestionId(pub(crate) u64);

/// A unique identifier for an answer option
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::From,
)]
#[serde(transparent)]
pub struct AnswerId(pub(crate) u64);

/// A unique identifier for a quiz category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::From,
)]
#[serde(transparent)]
pub struct CategoryId(pub(crate) u64);

impl Display for QuizId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for AnswerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for QuizId {
    type Err = ParseIntError;

    /// Parses a quiz ID from its decimal string form
    ///
    /// # Errors
    ///
    /// Returns a `ParseIntError` if the string is not a decimal number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// An opaque server-issued token binding an anonymous player to one quiz
/// attempt
///
/// Created by the guest start call and referenced by every subsequent
/// guest submission. The engine treats it as a black box; it is persisted
/// to storage only so a page reload does not orphan an in-flight session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From)]
#[serde(transparent)]
pub struct SessionId(pub(crate) String);

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl SessionId {
    /// Creates a session ID from any string-like token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

/// A single answer option of a question
///
/// `is_correct` is only ever populated on the registered-user wire; the
/// guest variants of the question endpoints withhold it so that a browser
/// cannot read correctness before answering. The asymmetry is deliberate
/// and preserved as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Unique identifier of this answer option
    #[garde(skip)]
    pub id: AnswerId,
    /// Display text of the option
    #[garde(length(max = crate::constants::quiz::MAX_ANSWER_LENGTH))]
    pub text: String,
    /// Whether this option is the correct one; absent on the guest wire
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

/// A question with its ordered answer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier of this question
    #[garde(skip)]
    pub id: QuestionId,
    /// The prompt text shown to the player
    #[garde(length(max = crate::constants::quiz::MAX_QUESTION_LENGTH))]
    pub text: String,
    /// Whether a photo is attached to this question
    #[garde(skip)]
    #[serde(default)]
    pub has_photo: bool,
    /// The ordered answer options
    #[garde(length(min = 1, max = crate::constants::quiz::MAX_ANSWER_COUNT), dive)]
    pub answers: Vec<Answer>,
}

impl Question {
    /// Returns the answer at the given selection index, if in range
    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }
}

/// Quiz metadata as fetched from the backend
///
/// Immutable for the duration of a session once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Unique identifier of this quiz
    #[garde(skip)]
    pub id: QuizId,
    /// Display name of the quiz
    #[garde(length(max = crate::constants::quiz::MAX_NAME_LENGTH))]
    pub name: String,
    /// The category this quiz belongs to
    #[garde(skip)]
    pub category_id: CategoryId,
    /// Whether a photo is attached to this quiz
    #[garde(skip)]
    #[serde(default)]
    pub has_photo: bool,
}

/// Response of the guest session-creation endpoint
///
/// The start call returns the session token together with the quiz
/// metadata, so the guest flow never fetches the quiz separately.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedSession {
    /// The server-issued session token
    pub session_id: SessionId,
    /// Quiz metadata for the started attempt
    #[serde(rename = "quizResponse")]
    pub quiz: Quiz,
}

/// Server-confirmed verdict for one question of a completed guest attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionVerdict {
    /// The question this verdict is about
    pub question_id: QuestionId,
    /// Whether the submitted answer was correct
    pub correct: bool,
}

/// Response of the final guest submit call
///
/// This is the only source of truth for a guest's score; the local
/// reconciler is never consulted on that path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedQuiz {
    /// Authoritative score for the attempt
    pub score: usize,
    /// Per-question correctness as confirmed by the server
    #[serde(default)]
    pub results: Vec<QuestionVerdict>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn question(answers: usize) -> Question {
        Question {
            id: QuestionId(7),
            text: "Largest planet?".to_owned(),
            has_photo: false,
            answers: (0..answers)
                .map(|i| Answer {
                    id: AnswerId(100 + i as u64),
                    text: format!("option {i}"),
                    is_correct: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_guest_wire_withholds_correctness() {
        let json = r#"{"id":7,"text":"Largest planet?","answers":[
            {"id":101,"text":"Jupiter"},{"id":102,"text":"Mars"}]}"#;
        let question: Question = serde_json::from_str(json).unwrap();

        assert!(question.answers.iter().all(|a| a.is_correct.is_none()));
    }

    #[test]
    fn test_registered_wire_carries_correctness() {
        let json = r#"{"id":7,"text":"Largest planet?","answers":[
            {"id":101,"text":"Jupiter","isCorrect":true},
            {"id":102,"text":"Mars","isCorrect":false}]}"#;
        let question: Question = serde_json::from_str(json).unwrap();

        assert_eq!(question.answers[0].is_correct, Some(true));
        assert_eq!(question.answers[1].is_correct, Some(false));
    }

    #[test]
    fn test_started_session_decoding() {
        let json = r#"{"sessionId":"abc","quizResponse":
            {"id":42,"name":"Space","categoryId":3,"hasPhoto":true}}"#;
        let started: StartedSession = serde_json::from_str(json).unwrap();

        assert_eq!(started.session_id, SessionId::new("abc"));
        assert_eq!(started.quiz.id, QuizId(42));
        assert!(started.quiz.has_photo);
    }

    #[test]
    fn test_completed_quiz_decoding_without_results() {
        let completed: CompletedQuiz = serde_json::from_str(r#"{"score":2}"#).unwrap();

        assert_eq!(completed.score, 2);
        assert!(completed.results.is_empty());
    }

    #[test]
    fn test_question_validation_rejects_too_many_answers() {
        let question = question(crate::constants::quiz::MAX_ANSWER_COUNT + 1);
        assert!(question.validate().is_err());
    }

    #[test]
    fn test_question_validation_rejects_no_answers() {
        let question = question(0);
        assert!(question.validate().is_err());
    }

    #[test]
    fn test_question_validation_accepts_normal_question() {
        let question = question(4);
        assert!(question.validate().is_ok());
    }

    #[test]
    fn test_answer_lookup_by_index() {
        let question = question(3);

        assert_eq!(question.answer(2).map(|a| a.id), Some(AnswerId(102)));
        assert!(question.answer(3).is_none());
    }

    #[test]
    fn test_quiz_id_from_str() {
        assert_eq!(QuizId::from_str("42").unwrap(), QuizId(42));
        assert!(QuizId::from_str("quiz").is_err());
    }
}
