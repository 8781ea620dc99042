//! In-progress answer selection tracking
//!
//! This module holds the player's choices for the current session: a map
//! from question to chosen answer index, plus the set of questions whose
//! answer has been finalized and is therefore locked against further
//! edits. The tracker is a pure in-memory structure; all network effects
//! belong to the session layer.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::model::QuestionId;

/// Outcome of recording a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// The selection was stored (or overwrote a previous one)
    Accepted,
    /// The question is already submitted; the selection was discarded
    Rejected,
}

/// Tracks selections and submissions for one quiz session
///
/// A player may change a selection freely before submitting, but once a
/// question is submitted it is locked: further `select` calls become
/// no-ops and further `submit` calls fail. The session state machine is
/// the only owner of this structure.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SelectionTracker {
    /// Chosen answer index per question
    selected: HashMap<QuestionId, usize>,
    /// Questions whose answer has been finalized
    submitted: HashSet<QuestionId>,
}

impl SelectionTracker {
    /// Records or overwrites the chosen answer index for a question
    ///
    /// Selecting on an already-submitted question is a no-op rather than
    /// an error; the UI should never issue it, but
    /// the tracker must stay consistent if it does.
    pub fn select(&mut self, question: QuestionId, answer_index: usize) -> Recorded {
        if self.submitted.contains(&question) {
            return Recorded::Rejected;
        }
        self.selected.insert(question, answer_index);
        Recorded::Accepted
    }

    /// Returns the recorded answer index for a question, if any
    pub fn get(&self, question: QuestionId) -> Option<usize> {
        self.selected.get(&question).copied()
    }

    /// Locks a question against further edits
    ///
    /// Returns `false` if the question was already submitted, so a second
    /// submission can be rejected without observable effect.
    pub fn submit(&mut self, question: QuestionId) -> bool {
        self.submitted.insert(question)
    }

    /// Whether a question has been submitted
    pub fn is_submitted(&self, question: QuestionId) -> bool {
        self.submitted.contains(&question)
    }

    /// The selection map for the current session
    pub fn selections(&self) -> &HashMap<QuestionId, usize> {
        &self.selected
    }

    /// Number of questions with a recorded selection
    pub fn answered_count(&self) -> usize {
        self.selected.len()
    }

    /// Clears all selections and submissions
    pub fn clear(&mut self) {
        self.selected.clear();
        self.submitted.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const Q1: QuestionId = QuestionId(1);
    const Q2: QuestionId = QuestionId(2);

    #[test]
    fn test_select_records_and_overwrites() {
        let mut tracker = SelectionTracker::default();

        assert_eq!(tracker.select(Q1, 0), Recorded::Accepted);
        assert_eq!(tracker.get(Q1), Some(0));

        assert_eq!(tracker.select(Q1, 2), Recorded::Accepted);
        assert_eq!(tracker.get(Q1), Some(2));
        assert_eq!(tracker.answered_count(), 1);
    }

    #[test]
    fn test_unanswered_question_has_no_selection() {
        let tracker = SelectionTracker::default();
        assert_eq!(tracker.get(Q1), None);
    }

    #[test]
    fn test_submit_locks_question() {
        let mut tracker = SelectionTracker::default();

        tracker.select(Q1, 1);
        assert!(tracker.submit(Q1));
        assert!(tracker.is_submitted(Q1));

        // Locked: the selection must survive any further select calls
        assert_eq!(tracker.select(Q1, 0), Recorded::Rejected);
        assert_eq!(tracker.get(Q1), Some(1));
    }

    #[test]
    fn test_submit_is_at_most_once() {
        let mut tracker = SelectionTracker::default();

        tracker.select(Q1, 0);
        assert!(tracker.submit(Q1));
        assert!(!tracker.submit(Q1));
    }

    #[test]
    fn test_submission_does_not_leak_across_questions() {
        let mut tracker = SelectionTracker::default();

        tracker.select(Q1, 0);
        tracker.submit(Q1);

        assert!(!tracker.is_submitted(Q2));
        assert_eq!(tracker.select(Q2, 3), Recorded::Accepted);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut tracker = SelectionTracker::default();

        tracker.select(Q1, 0);
        tracker.select(Q2, 1);
        tracker.submit(Q1);
        tracker.clear();

        assert_eq!(tracker.answered_count(), 0);
        assert!(!tracker.is_submitted(Q1));
        assert_eq!(tracker.select(Q1, 2), Recorded::Accepted);
    }
}
