//! Local score reconciliation for registered-user attempts
//!
//! The reconciler compares the tracked selections against the `is_correct`
//! flags embedded in the fetched questions. It is pure, synchronous, and
//! total: for any inputs it produces a score in `[0, question_count]`.
//! Guest attempts never use it for the final score; the server-confirmed
//! result is authoritative there.

use std::collections::HashMap;

use itertools::Itertools;

use super::model::{Question, QuestionId};

/// Counts the correctly answered questions
///
/// A question contributes one point when a selection is recorded for it
/// and the selected answer carries `is_correct == Some(true)`. Unanswered
/// questions, out-of-range indices, and answers without a correctness flag
/// contribute nothing.
pub fn score(questions: &[Question], selections: &HashMap<QuestionId, usize>) -> usize {
    questions
        .iter()
        .filter(|question| {
            selections
                .get(&question.id)
                .and_then(|index| question.answer(*index))
                .is_some_and(|answer| answer.is_correct == Some(true))
        })
        .count()
}

/// Per-question correctness in question order
///
/// `Some(true)`/`Some(false)` for answered questions, `None` for
/// unanswered ones. Used for the end-of-quiz breakdown shown to
/// registered users.
pub fn breakdown(
    questions: &[Question],
    selections: &HashMap<QuestionId, usize>,
) -> Vec<Option<bool>> {
    questions
        .iter()
        .map(|question| {
            selections
                .get(&question.id)
                .and_then(|index| question.answer(*index))
                .map(|answer| answer.is_correct == Some(true))
        })
        .collect_vec()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::quiz::model::{Answer, AnswerId};

    fn question(id: u64, correct_index: usize) -> Question {
        Question {
            id: QuestionId(id),
            text: format!("question {id}"),
            has_photo: false,
            answers: (0..4)
                .map(|i| Answer {
                    id: AnswerId(id * 10 + i as u64),
                    text: format!("option {i}"),
                    is_correct: Some(i == correct_index),
                })
                .collect(),
        }
    }

    fn three_questions() -> Vec<Question> {
        vec![question(1, 0), question(2, 1), question(3, 2)]
    }

    #[test]
    fn test_empty_selections_score_zero() {
        let questions = three_questions();
        assert_eq!(score(&questions, &HashMap::new()), 0);
    }

    #[test]
    fn test_score_counts_only_correct_selections() {
        let questions = three_questions();
        let selections = HashMap::from([
            (QuestionId(1), 0), // correct
            (QuestionId(2), 0), // wrong
        ]);

        assert_eq!(score(&questions, &selections), 1);
    }

    #[test]
    fn test_score_is_bounded_by_question_count() {
        let questions = three_questions();
        let selections = HashMap::from([
            (QuestionId(1), 0),
            (QuestionId(2), 1),
            (QuestionId(3), 2),
            // Selection for a question that is not part of the quiz
            (QuestionId(9), 0),
        ]);

        assert_eq!(score(&questions, &selections), questions.len());
    }

    #[test]
    fn test_out_of_range_index_scores_nothing() {
        let questions = three_questions();
        let selections = HashMap::from([(QuestionId(1), 17)]);

        assert_eq!(score(&questions, &selections), 0);
    }

    #[test]
    fn test_missing_correctness_flags_score_nothing() {
        // Guest-shaped payload: no is_correct anywhere
        let mut questions = three_questions();
        for question in &mut questions {
            for answer in &mut question.answers {
                answer.is_correct = None;
            }
        }
        let selections = HashMap::from([(QuestionId(1), 0), (QuestionId(2), 1)]);

        assert_eq!(score(&questions, &selections), 0);
    }

    #[test]
    fn test_breakdown_marks_unanswered_as_none() {
        let questions = three_questions();
        let selections = HashMap::from([
            (QuestionId(1), 0), // correct
            (QuestionId(2), 0), // wrong
        ]);

        assert_eq!(
            breakdown(&questions, &selections),
            vec![Some(true), Some(false), None]
        );
    }
}
