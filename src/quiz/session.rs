//! Quiz session state machine
//!
//! This module orchestrates one quiz attempt from start to completion for
//! both registered and guest players. The machine owns the selection
//! tracker, the question cursor, and (for guests) the server-issued
//! session token. Network calls are dispatched through the
//! [`Transport`](crate::transport::Transport) seam and their outcomes are
//! fed back through the `receive_*` methods, so the optimistic-update
//! policy and the strict completion ordering are explicit and testable.
//!
//! Local mutations are optimistic: selections and answer submissions are
//! applied before their network echo resolves, and a failed echo is
//! logged, never rolled back. The one place strict ordering is enforced
//! is guest completion: the machine sits in [`State::Submitting`] until
//! the server-confirmed result arrives, because no locally reconciled
//! score exists on that path.

use std::fmt::Debug;

use garde::Validate;
use once_cell_serde::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use web_time::{Duration, SystemTime};

use crate::{
    Method, constants,
    transport::{Storage, Transport},
};

use super::{
    model::{
        AnswerId, CompletedQuiz, Question, QuestionId, QuestionVerdict, Quiz, QuizId, SessionId,
        StartedSession,
    },
    scoring,
    selection::{Recorded, SelectionTracker},
};

/// Which variant of the play flow a session uses
///
/// The two flows differ in path prefix, in where quiz metadata comes
/// from, and in who is authoritative for the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    /// Authenticated user; correctness flags arrive with the questions
    /// and the final score is reconciled locally
    Registered,
    /// Anonymous player bound to a server-issued session token; the final
    /// score comes only from the server
    Guest,
}

/// Network requests issued by the session state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Request {
    /// Fetch quiz metadata (registered flow)
    FetchQuiz {
        /// The quiz to fetch
        quiz: QuizId,
    },
    /// Fetch the question list for a quiz
    FetchQuestions {
        /// The quiz whose questions are fetched
        quiz: QuizId,
        /// Flow variant, which selects the path prefix
        flow: Flow,
        /// Zero-based page index
        page: usize,
        /// Page size, capped so one page covers the whole quiz
        size: usize,
    },
    /// Create a guest session for a quiz attempt
    StartSession {
        /// The quiz to start
        quiz: QuizId,
    },
    /// Persist or submit a guest answer against the session
    RecordAnswer {
        /// The guest session token
        session: SessionId,
        /// The quiz being played
        quiz: QuizId,
        /// The answered question
        question: QuestionId,
        /// Identity of the chosen answer (never its index)
        answer: AnswerId,
    },
    /// Registered-user per-answer submission, fire-and-forget
    FillQuiz {
        /// The quiz being played
        quiz: QuizId,
        /// The answered question
        question: QuestionId,
        /// Identity of the chosen answer
        answer: AnswerId,
    },
    /// Final guest submission, returning the authoritative result
    SubmitQuiz {
        /// The guest session token
        session: SessionId,
        /// Optional contact email attached to the attempt
        email: Option<String>,
    },
}

impl Request {
    /// The HTTP method of this request
    pub fn method(&self) -> Method {
        match self {
            Self::FetchQuiz { .. } | Self::FetchQuestions { .. } => Method::Get,
            Self::StartSession { .. }
            | Self::RecordAnswer { .. }
            | Self::FillQuiz { .. }
            | Self::SubmitQuiz { .. } => Method::Post,
        }
    }

    /// The REST path (with query string) of this request
    pub fn path(&self) -> String {
        match self {
            Self::FetchQuiz { quiz } => format!("/quizzes/{quiz}"),
            Self::FetchQuestions {
                quiz,
                flow,
                page,
                size,
            } => {
                let prefix = match flow {
                    Flow::Registered => "",
                    Flow::Guest => "/guest",
                };
                format!("{prefix}/quizzes/{quiz}/questions?page={page}&size={size}")
            }
            Self::StartSession { quiz } => format!("/guest/quiz/{quiz}/start"),
            Self::RecordAnswer {
                session,
                quiz,
                question,
                answer,
            } => format!(
                "/guest/session/{session}/quiz/{quiz}/answer?questionId={question}&answerId={answer}"
            ),
            Self::FillQuiz {
                quiz,
                question,
                answer,
            } => format!("/quiz/fill-quiz/{quiz}?questionId={question}&answerId={answer}"),
            Self::SubmitQuiz { session, email } => match email {
                Some(email) => format!("/guest/session/{session}/submit?email={email}"),
                None => format!("/guest/session/{session}/submit"),
            },
        }
    }
}

/// The phase of a quiz attempt
///
/// The machine moves linearly through these states; `Loading` and
/// `Submitting` are the in-flight refinements of the start and complete
/// transitions, during which no play operations are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum State {
    /// No attempt in progress
    #[default]
    NotStarted,
    /// Start issued; awaiting quiz, questions and (guests) the session token
    Loading,
    /// Attempt in progress; selections and submissions are accepted
    Started,
    /// Guest final submission in flight; awaiting the server result
    Submitting,
    /// Attempt finished; the score is available
    Completed,
}

/// Which fetch a surfaced failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum FetchStage {
    /// Quiz metadata fetch
    #[display("quiz")]
    Quiz,
    /// Question list fetch
    #[display("questions")]
    Questions,
    /// Guest session creation
    #[display("session")]
    Session,
    /// Final guest submission
    #[display("completion")]
    Completion,
}

/// A fetch failure surfaced to the user
///
/// Stored on the session rather than returned, since the failing call
/// resolves asynchronously; the UI shows it and no automatic retry is
/// attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("failed to load {stage}: {message}")]
pub struct FetchError {
    /// The fetch that failed
    pub stage: FetchStage,
    /// Human-readable failure description
    pub message: String,
}

/// Guard violations reported by the session operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Error {
    /// `start` was called on a session that already left `NotStarted`
    #[error("quiz already started")]
    AlreadyStarted,
    /// A play operation was called outside `Started`
    #[error("quiz is not in progress")]
    NotStarted,
    /// The question is not part of this quiz
    #[error("unknown question")]
    UnknownQuestion,
    /// The answer index is outside the question's option list
    #[error("answer index out of range")]
    AnswerOutOfRange,
    /// `submit_answer` was called without a recorded selection
    #[error("no answer selected for this question")]
    NoSelection,
    /// The question was already submitted; it is locked
    #[error("answer already submitted for this question")]
    AlreadySubmitted,
    /// `next` was called while the current question is unsubmitted
    #[error("current question has not been submitted")]
    NotSubmitted,
    /// `next` was called on the last question; `complete` must be used
    #[error("already at the last question")]
    EndOfQuiz,
    /// `complete` was called on a completing or completed session
    #[error("quiz already completed")]
    AlreadyCompleted,
    /// A guest operation needs a session token that is not available
    #[error("guest session is not available")]
    SessionUnavailable,
    /// A response was fed to the machine in a state that cannot accept it
    #[error("unexpected response for the current state")]
    UnexpectedResponse,
}

/// End-of-quiz summary
///
/// For registered users the verdicts come from the local reconciler; for
/// guests they are the server-confirmed results reordered to question
/// order. `None` marks an unanswered question.
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Number of correctly answered questions
    pub score: usize,
    /// Total number of questions in the quiz
    pub total: usize,
    /// Time spent between start and completion
    #[serde_as(as = "Option<serde_with::DurationMilliSeconds<u64>>")]
    pub duration: Option<Duration>,
    /// Per-question correctness in question order
    pub verdicts: Vec<Option<bool>>,
}

/// One quiz attempt for a single player
///
/// Exclusive owner of the selection map, the submission record and the
/// cursor; no other component writes them.
#[derive(Serialize, Deserialize)]
pub struct QuizSession {
    /// The quiz this attempt is for
    quiz_id: QuizId,
    /// Registered or guest flow
    flow: Flow,
    /// Current phase of the attempt
    state: State,
    /// Quiz metadata, present once loaded
    quiz: Option<Quiz>,
    /// The ordered question list, present once loaded
    questions: Vec<Question>,
    /// Selections and submission locks
    tracker: SelectionTracker,
    /// Zero-based cursor into `questions`, monotonically non-decreasing
    current_index: usize,
    /// Guest session token, absent for registered users
    session: Option<SessionId>,
    /// Final score, meaningful only in `Completed`
    score: Option<usize>,
    /// Server-confirmed verdicts (guest flow)
    verdicts: Vec<QuestionVerdict>,
    /// Latest surfaced fetch failure
    error: Option<FetchError>,
    /// When the attempt entered `Started`
    started_at: Option<SystemTime>,
    /// When the attempt entered `Completed`
    completed_at: Option<SystemTime>,
    /// End-of-quiz summary (computed once when needed)
    #[serde(skip)]
    summary: OnceCell<Summary>,
}

impl Debug for QuizSession {
    /// Custom debug implementation that avoids printing the question list
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz_id)
            .field("flow", &self.flow)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl QuizSession {
    /// Creates a fresh, not-yet-started session for a quiz
    pub fn new(quiz_id: QuizId, flow: Flow) -> Self {
        Self {
            quiz_id,
            flow,
            state: State::NotStarted,
            quiz: None,
            questions: Vec::new(),
            tracker: SelectionTracker::default(),
            current_index: 0,
            session: None,
            score: None,
            verdicts: Vec::new(),
            error: None,
            started_at: None,
            completed_at: None,
            summary: OnceCell::new(),
        }
    }

    /// Creates a registered-user session
    pub fn registered(quiz_id: QuizId) -> Self {
        Self::new(quiz_id, Flow::Registered)
    }

    /// Creates a guest session
    pub fn guest(quiz_id: QuizId) -> Self {
        Self::new(quiz_id, Flow::Guest)
    }

    /// Reads a previously persisted guest session token, if any
    ///
    /// Best-effort only: the token is stored so a page reload does not
    /// orphan an in-flight attempt, but nothing guarantees the server
    /// still accepts it.
    pub fn persisted_session<S: Storage>(storage: &S) -> Option<SessionId> {
        storage
            .get(constants::storage::GUEST_SESSION)
            .map(SessionId::new)
    }

    // Accessors

    /// The current phase of the attempt
    pub fn state(&self) -> State {
        self.state
    }

    /// The flow this session was created with
    pub fn flow(&self) -> Flow {
        self.flow
    }

    /// Quiz metadata, once loaded
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    /// The ordered question list, once loaded
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The zero-based cursor into the question list
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question at the cursor, if the attempt is loaded
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// The recorded answer index for a question
    pub fn selection(&self, question: QuestionId) -> Option<usize> {
        self.tracker.get(question)
    }

    /// Whether a question's answer has been finalized
    pub fn is_submitted(&self, question: QuestionId) -> bool {
        self.tracker.is_submitted(question)
    }

    /// The final score; `None` until the attempt is `Completed`
    pub fn score(&self) -> Option<usize> {
        match self.state {
            State::Completed => self.score,
            _ => None,
        }
    }

    /// The latest surfaced fetch failure
    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Time elapsed since the attempt started
    ///
    /// Frozen at the completion timestamp once the attempt is done.
    pub fn elapsed(&self) -> Option<Duration> {
        let started = self.started_at?;
        let end = self.completed_at.unwrap_or_else(SystemTime::now);
        end.duration_since(started).ok()
    }

    /// The end-of-quiz summary; `None` until the attempt is `Completed`
    pub fn summary(&self) -> Option<&Summary> {
        if self.state != State::Completed {
            return None;
        }
        Some(self.summary.get_or_init(|| Summary {
            score: self.score.unwrap_or(0),
            total: self.questions.len(),
            duration: self.elapsed(),
            verdicts: match self.flow {
                Flow::Registered => {
                    scoring::breakdown(&self.questions, self.tracker.selections())
                }
                Flow::Guest => self
                    .questions
                    .iter()
                    .map(|question| {
                        self.verdicts
                            .iter()
                            .find(|verdict| verdict.question_id == question.id)
                            .map(|verdict| verdict.correct)
                    })
                    .collect(),
            },
        }))
    }

    // Transitions

    /// Starts the attempt, dispatching the load calls
    ///
    /// Registered users fetch quiz metadata and questions; guests create
    /// a session (which carries the quiz metadata in its response) and
    /// fetch questions through the guest prefix. The machine stays in
    /// `Loading` until every piece has arrived, so a failed guest session
    /// creation fails the whole transition instead of leaving an attempt
    /// that can never submit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyStarted`] unless the session is in
    /// `NotStarted`.
    pub fn start<T: Transport>(&mut self, transport: &T) -> Result<(), Error> {
        if self.state != State::NotStarted {
            return Err(Error::AlreadyStarted);
        }
        self.error = None;
        match self.flow {
            Flow::Registered => transport.dispatch(
                &Request::FetchQuiz {
                    quiz: self.quiz_id,
                }
                .into(),
            ),
            Flow::Guest => transport.dispatch(
                &Request::StartSession {
                    quiz: self.quiz_id,
                }
                .into(),
            ),
        }
        transport.dispatch(
            &Request::FetchQuestions {
                quiz: self.quiz_id,
                flow: self.flow,
                page: 0,
                size: constants::quiz::MAX_QUESTIONS_PAGE_SIZE,
            }
            .into(),
        );
        self.state = State::Loading;
        Ok(())
    }

    /// Feeds in the quiz metadata response (registered flow)
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedResponse`] outside `Loading`.
    pub fn receive_quiz(&mut self, quiz: Quiz) -> Result<(), Error> {
        if self.state != State::Loading || self.flow != Flow::Registered {
            return Err(Error::UnexpectedResponse);
        }
        if let Err(report) = quiz.validate() {
            self.fail_load(FetchStage::Quiz, report.to_string());
            return Ok(());
        }
        self.quiz = Some(quiz);
        self.try_begin();
        Ok(())
    }

    /// Feeds in the guest session-creation response
    ///
    /// Persists the token best-effort so a reload can recover it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedResponse`] outside `Loading` or on a
    /// registered session.
    pub fn receive_started<S: Storage>(
        &mut self,
        started: StartedSession,
        storage: &S,
    ) -> Result<(), Error> {
        if self.state != State::Loading || self.flow != Flow::Guest {
            return Err(Error::UnexpectedResponse);
        }
        if let Err(report) = started.quiz.validate() {
            self.fail_load(FetchStage::Session, report.to_string());
            return Ok(());
        }
        storage.put(constants::storage::GUEST_SESSION, &started.session_id.0);
        self.session = Some(started.session_id);
        self.quiz = Some(started.quiz);
        self.try_begin();
        Ok(())
    }

    /// Feeds in the question list response
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedResponse`] outside `Loading`.
    pub fn receive_questions(&mut self, page: crate::Page<Question>) -> Result<(), Error> {
        if self.state != State::Loading {
            return Err(Error::UnexpectedResponse);
        }
        if page.content.is_empty() {
            self.fail_load(FetchStage::Questions, "quiz has no questions".to_owned());
            return Ok(());
        }
        for question in &page.content {
            if let Err(report) = question.validate() {
                self.fail_load(FetchStage::Questions, report.to_string());
                return Ok(());
            }
        }
        self.questions = page.content;
        self.try_begin();
        Ok(())
    }

    /// Surfaces a failed load call
    ///
    /// Any failure during `Loading` fails the whole start transition: the
    /// machine returns to `NotStarted` with the error stored for display.
    /// Failures reported in other states are stale and ignored.
    pub fn receive_load_failure(&mut self, stage: FetchStage, message: impl Into<String>) {
        if self.state != State::Loading {
            return;
        }
        self.fail_load(stage, message.into());
    }

    fn fail_load(&mut self, stage: FetchStage, message: String) {
        tracing::warn!(%stage, %message, "quiz load failed");
        self.error = Some(FetchError { stage, message });
        // Partial payloads are dropped so a later start begins clean
        self.quiz = None;
        self.questions.clear();
        self.session = None;
        self.state = State::NotStarted;
    }

    fn try_begin(&mut self) {
        let ready = self.quiz.is_some()
            && !self.questions.is_empty()
            && (self.flow == Flow::Registered || self.session.is_some());
        if ready {
            self.state = State::Started;
            self.started_at = Some(SystemTime::now());
        }
    }

    /// Records or overwrites the chosen answer for a question
    ///
    /// The local selection is applied immediately. Guests additionally
    /// get a best-effort call persisting the choice against the session;
    /// its failure is swallowed and never rolls the selection back.
    /// Selecting on a submitted question is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotStarted`] outside `Started`,
    /// [`Error::UnknownQuestion`] for a question not in this quiz, and
    /// [`Error::AnswerOutOfRange`] for an index past the option list.
    pub fn select<T: Transport>(
        &mut self,
        question: QuestionId,
        answer_index: usize,
        transport: &T,
    ) -> Result<(), Error> {
        if self.state != State::Started {
            return Err(Error::NotStarted);
        }
        let answer = self
            .questions
            .iter()
            .find(|q| q.id == question)
            .ok_or(Error::UnknownQuestion)?
            .answer(answer_index)
            .ok_or(Error::AnswerOutOfRange)?
            .id;

        if self.tracker.select(question, answer_index) == Recorded::Rejected {
            return Ok(());
        }

        if let (Flow::Guest, Some(session)) = (self.flow, &self.session) {
            transport.dispatch(
                &Request::RecordAnswer {
                    session: session.clone(),
                    quiz: self.quiz_id,
                    question,
                    answer,
                }
                .into(),
            );
        }
        Ok(())
    }

    /// Finalizes the answer for a question, locking it against edits
    ///
    /// Guests dispatch the authoritative submit (session token, question
    /// and the answer's identity); registered users dispatch the
    /// fire-and-forget fill call. In both flows the question is locked
    /// immediately, regardless of how the network call resolves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadySubmitted`] on a second call (with no
    /// duplicate dispatch), [`Error::NoSelection`] without a recorded
    /// selection, and [`Error::SessionUnavailable`] if a guest token is
    /// missing.
    pub fn submit_answer<T: Transport>(
        &mut self,
        question: QuestionId,
        transport: &T,
    ) -> Result<(), Error> {
        if self.state != State::Started {
            return Err(Error::NotStarted);
        }
        if self.tracker.is_submitted(question) {
            return Err(Error::AlreadySubmitted);
        }
        let index = self.tracker.get(question).ok_or(Error::NoSelection)?;
        let answer = self
            .questions
            .iter()
            .find(|q| q.id == question)
            .ok_or(Error::UnknownQuestion)?
            .answer(index)
            .ok_or(Error::AnswerOutOfRange)?
            .id;

        match self.flow {
            Flow::Guest => {
                let session = self.session.clone().ok_or(Error::SessionUnavailable)?;
                transport.dispatch(
                    &Request::RecordAnswer {
                        session,
                        quiz: self.quiz_id,
                        question,
                        answer,
                    }
                    .into(),
                );
            }
            Flow::Registered => {
                transport.dispatch(
                    &Request::FillQuiz {
                        quiz: self.quiz_id,
                        question,
                        answer,
                    }
                    .into(),
                );
            }
        }

        self.tracker.submit(question);
        Ok(())
    }

    /// Feeds in the backend acknowledgement of an answer call
    ///
    /// The submission is already locked locally; a rejection is logged
    /// and otherwise ignored.
    pub fn receive_answer_ack(&self, question: QuestionId, accepted: bool) {
        if !accepted {
            tracing::warn!(%question, "backend rejected an answer submission");
        }
    }

    /// Surfaces a failed answer or selection call
    ///
    /// The optimistic local state stands; the failure is only logged.
    pub fn receive_answer_failure(&self, question: QuestionId, message: &str) {
        tracing::warn!(%question, %message, "answer persistence failed");
    }

    /// Advances the cursor to the next question
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSubmitted`] while the current question is not
    /// finalized, and [`Error::EndOfQuiz`] at the last question, where
    /// the caller must invoke [`Self::complete`] instead.
    pub fn next(&mut self) -> Result<usize, Error> {
        if self.state != State::Started {
            return Err(Error::NotStarted);
        }
        let current = self.current_question().ok_or(Error::UnknownQuestion)?;
        if !self.tracker.is_submitted(current.id) {
            return Err(Error::NotSubmitted);
        }
        if self.current_index + 1 >= self.questions.len() {
            return Err(Error::EndOfQuiz);
        }
        self.current_index += 1;
        Ok(self.current_index)
    }

    /// Finishes the attempt
    ///
    /// Registered users reconcile the score locally and complete at once.
    /// Guests dispatch the final submit and move to `Submitting`; only
    /// [`Self::receive_completion`] enters `Completed`, so no premature
    /// "completed with no score" state exists. Unanswered questions are
    /// allowed and simply score nothing; the cursor is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyCompleted`] once completion is in flight
    /// or done (no re-submission to the server), and
    /// [`Error::SessionUnavailable`] if a guest token is missing.
    pub fn complete<T: Transport>(
        &mut self,
        email: Option<&str>,
        transport: &T,
    ) -> Result<(), Error> {
        match self.state {
            State::Submitting | State::Completed => return Err(Error::AlreadyCompleted),
            State::Started => {}
            State::NotStarted | State::Loading => return Err(Error::NotStarted),
        }
        match self.flow {
            Flow::Registered => {
                self.score = Some(scoring::score(&self.questions, self.tracker.selections()));
                self.completed_at = Some(SystemTime::now());
                self.state = State::Completed;
            }
            Flow::Guest => {
                let session = self.session.clone().ok_or(Error::SessionUnavailable)?;
                transport.dispatch(
                    &Request::SubmitQuiz {
                        session,
                        email: email.map(str::to_owned),
                    }
                    .into(),
                );
                self.state = State::Submitting;
            }
        }
        Ok(())
    }

    /// Feeds in the server-confirmed result of a guest attempt
    ///
    /// The server score is authoritative even if correctness flags were
    /// (incorrectly) present in the fetched questions; it is clamped to
    /// the question count. The persisted token is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedResponse`] outside `Submitting`.
    pub fn receive_completion<S: Storage>(
        &mut self,
        completed: CompletedQuiz,
        storage: &S,
    ) -> Result<(), Error> {
        if self.state != State::Submitting {
            return Err(Error::UnexpectedResponse);
        }
        self.score = Some(completed.score.min(self.questions.len()));
        self.verdicts = completed.results;
        self.completed_at = Some(SystemTime::now());
        self.state = State::Completed;
        self.session = None;
        storage.remove(constants::storage::GUEST_SESSION);
        Ok(())
    }

    /// Surfaces a failed final guest submission
    ///
    /// The one retryable action failure: the machine returns to
    /// `Started` with the error stored, and the caller may call
    /// [`Self::complete`] again.
    pub fn receive_completion_failure(&mut self, message: impl Into<String>) {
        if self.state != State::Submitting {
            return;
        }
        let message = message.into();
        tracing::warn!(%message, "final quiz submission failed");
        self.error = Some(FetchError {
            stage: FetchStage::Completion,
            message,
        });
        self.state = State::Started;
    }

    /// Returns the session to `NotStarted`, clearing all attempt state
    ///
    /// Discards the selection map, submission record, cursor, score and
    /// (guests) the session token, both in memory and in storage.
    pub fn reset<S: Storage>(&mut self, storage: &S) {
        self.state = State::NotStarted;
        self.quiz = None;
        self.questions.clear();
        self.tracker.clear();
        self.current_index = 0;
        self.session = None;
        self.score = None;
        self.verdicts.clear();
        self.error = None;
        self.started_at = None;
        self.completed_at = None;
        self.summary = OnceCell::new();
        storage.remove(constants::storage::GUEST_SESSION);
    }
}
