//! Configuration constants for the Qurio client engine
//!
//! This module contains the limits and fixed keys used throughout the
//! engine: payload validation bounds, paging caps for play-time fetches,
//! and the local-storage keys shared with earlier versions of the client.

/// Quiz and question configuration constants
pub mod quiz {
    /// Page size used when fetching questions at play time; the backend
    /// never serves more than this, so one page is treated as the whole quiz
    pub const MAX_QUESTIONS_PAGE_SIZE: usize = 50;
    /// Maximum length of a quiz display name in characters
    pub const MAX_NAME_LENGTH: usize = 200;
    /// Maximum length of a question prompt in characters
    pub const MAX_QUESTION_LENGTH: usize = 500;
    /// Maximum number of answer options per question
    pub const MAX_ANSWER_COUNT: usize = 8;
    /// Maximum length of answer text in characters
    pub const MAX_ANSWER_LENGTH: usize = 200;
}

/// Poll configuration constants
pub mod poll {
    /// Page size used when fetching the poll list
    pub const PAGE_SIZE: usize = 20;
    /// Maximum length of a poll title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum number of options per poll
    pub const MAX_OPTION_COUNT: usize = 10;
    /// Maximum length of a poll option label in characters
    pub const MAX_OPTION_LENGTH: usize = 200;
}

/// Photo prefetch configuration constants
pub mod photo {
    /// How many questions around the cursor get their photos prefetched
    pub const PREFETCH_RADIUS: usize = 1;
}

/// Local-storage keys for best-effort persisted client state
///
/// The keys are fixed for compatibility with state written by earlier
/// clients; none of them are authoritative.
pub mod storage {
    /// Server-issued guest session token for an in-flight quiz attempt
    pub const GUEST_SESSION: &str = "guestQuizSessionId";
    /// JSON array of poll IDs this browser has voted on
    pub const VOTED_POLLS: &str = "votedPolls";
    /// JSON map of poll ID to whether its results panel is expanded
    pub const SHOW_RESULTS: &str = "showResults";
}
