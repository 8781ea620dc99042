//! Poll tallies and the vote-once ledger
//!
//! This module projects server-authoritative vote counts into display
//! percentages and gates voting client-side: one vote per poll per
//! browser, remembered in best-effort storage. The gate is a UI
//! convenience only; rejecting duplicate votes for real is the backend's
//! job. After a vote the poll list is always refetched so percentages are
//! never computed from a stale pre-vote snapshot.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Method, Page, constants,
    transport::{Storage, Transport},
};

/// A unique identifier for a poll
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::From,
)]
#[serde(transparent)]
pub struct PollId(pub(crate) u64);

/// A unique identifier for a poll option
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::From,
)]
#[serde(transparent)]
pub struct PollOptionId(pub(crate) u64);

impl Display for PollId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for PollOptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One option of a poll with its server-authoritative vote count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    /// Unique identifier of this option
    #[garde(skip)]
    pub id: PollOptionId,
    /// Display text of the option
    #[garde(length(max = crate::constants::poll::MAX_OPTION_LENGTH))]
    pub text: String,
    /// Number of votes this option has received
    #[garde(skip)]
    #[serde(rename = "result")]
    pub votes: u64,
}

/// A poll with its ordered options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    /// Unique identifier of this poll
    #[garde(skip)]
    pub id: PollId,
    /// Title shown above the options
    #[garde(length(max = crate::constants::poll::MAX_TITLE_LENGTH))]
    pub title: String,
    /// The ordered options
    #[garde(length(max = crate::constants::poll::MAX_OPTION_COUNT), dive)]
    pub options: Vec<PollOption>,
}

impl Poll {
    /// Total number of votes across all options
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|option| option.votes).sum()
    }
}

/// Network requests issued by the poll board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Request {
    /// Fetch a page of the poll list with current vote counts
    FetchPolls {
        /// Zero-based page index
        page: usize,
        /// Page size
        size: usize,
    },
    /// Cast a vote for one option of a poll (no body)
    CastVote {
        /// The poll voted on
        poll: PollId,
        /// The chosen option
        option: PollOptionId,
    },
}

impl Request {
    /// The HTTP method of this request
    pub fn method(&self) -> Method {
        match self {
            Self::FetchPolls { .. } => Method::Get,
            Self::CastVote { .. } => Method::Post,
        }
    }

    /// The REST path (with query string) of this request
    pub fn path(&self) -> String {
        match self {
            Self::FetchPolls { page, size } => format!("/polls?page={page}&size={size}"),
            Self::CastVote { poll, option } => {
                format!("/polls?pollId={poll}&pollOptionId={option}")
            }
        }
    }
}

/// Rejections of a vote attempt
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VoteError {
    /// This browser has already voted on the poll; no request is issued
    #[error("already voted on this poll")]
    AlreadyVoted,
    /// The poll is not part of the current projection
    #[error("unknown poll")]
    UnknownPoll,
    /// The option does not belong to the poll
    #[error("unknown poll option")]
    UnknownOption,
}

/// Computes the percentage share of each option of a poll
///
/// Shares are rounded to whole percents and sum to 100 up to rounding
/// when any votes exist; with zero total votes every share is 0 rather
/// than a division artifact.
pub fn percentages(poll: &Poll) -> Vec<(PollOptionId, u8)> {
    let total = poll.total_votes();
    poll.options
        .iter()
        .map(|option| {
            let share = if total == 0 {
                0
            } else {
                ((option.votes as f64) * 100.0 / (total as f64)).round() as u8
            };
            (option.id, share)
        })
        .collect_vec()
}

/// Client-side projection of the poll list with the vote-once ledger
///
/// Owns the voted-polls set and the show-results map, both persisted
/// best-effort; vote counts themselves always come from the server via
/// [`PollBoard::apply`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PollBoard {
    /// The current projection of the poll list
    polls: Vec<Poll>,
    /// Polls this browser has voted on
    voted: HashSet<PollId>,
    /// Whether the results panel is expanded per poll
    show_results: HashMap<PollId, bool>,
    /// Latest surfaced fetch failure
    error: Option<String>,
}

impl PollBoard {
    /// Creates a board, recovering the persisted ledger from storage
    ///
    /// Corrupted or missing persisted values fall back to empty; the
    /// ledger is best-effort by contract.
    pub fn load<S: Storage>(storage: &S) -> Self {
        let voted = storage
            .get(constants::storage::VOTED_POLLS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        let show_results = storage
            .get(constants::storage::SHOW_RESULTS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            polls: Vec::new(),
            voted,
            show_results,
            error: None,
        }
    }

    /// The current projection of the poll list
    pub fn polls(&self) -> &[Poll] {
        &self.polls
    }

    /// Looks up a poll by ID
    pub fn poll(&self, poll: PollId) -> Option<&Poll> {
        self.polls.iter().find(|p| p.id == poll)
    }

    /// The latest surfaced fetch failure
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether this browser has voted on a poll
    pub fn has_voted(&self, poll: PollId) -> bool {
        self.voted.contains(&poll)
    }

    /// Whether the results panel for a poll is expanded
    pub fn shows_results(&self, poll: PollId) -> bool {
        self.show_results.get(&poll).copied().unwrap_or(false)
    }

    /// Percentage shares for a poll in the current projection
    pub fn percentages(&self, poll: PollId) -> Option<Vec<(PollOptionId, u8)>> {
        self.poll(poll).map(percentages)
    }

    /// Dispatches a refetch of the poll list
    pub fn refresh<T: Transport>(&self, transport: &T) {
        transport.dispatch(
            &Request::FetchPolls {
                page: 0,
                size: constants::poll::PAGE_SIZE,
            }
            .into(),
        );
    }

    /// Replaces the projection with a freshly fetched page
    ///
    /// Polls failing validation are dropped individually rather than
    /// failing the whole page.
    pub fn apply(&mut self, page: Page<Poll>) {
        self.error = None;
        self.polls = page
            .content
            .into_iter()
            .filter(|poll| match poll.validate() {
                Ok(()) => true,
                Err(report) => {
                    tracing::warn!(poll = %poll.id, %report, "dropping invalid poll payload");
                    false
                }
            })
            .collect_vec();
    }

    /// Surfaces a failed poll list fetch
    pub fn receive_fetch_failure(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "poll list fetch failed");
        self.error = Some(message);
    }

    /// Casts a vote for one option of a poll
    ///
    /// Rejected client-side, with no request issued, when this browser
    /// has already voted on the poll. Otherwise the vote is dispatched,
    /// the ledger is updated and persisted, the results panel is
    /// expanded, and a refetch is dispatched so the displayed counts are
    /// never the stale pre-vote snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`VoteError::AlreadyVoted`], [`VoteError::UnknownPoll`] or
    /// [`VoteError::UnknownOption`]; in every error case no request is
    /// issued and the tallies are left unchanged.
    pub fn vote<T: Transport, S: Storage>(
        &mut self,
        poll: PollId,
        option: PollOptionId,
        transport: &T,
        storage: &S,
    ) -> Result<(), VoteError> {
        if self.has_voted(poll) {
            return Err(VoteError::AlreadyVoted);
        }
        let known = self.poll(poll).ok_or(VoteError::UnknownPoll)?;
        if !known.options.iter().any(|o| o.id == option) {
            return Err(VoteError::UnknownOption);
        }

        transport.dispatch(&Request::CastVote { poll, option }.into());

        self.voted.insert(poll);
        self.persist_voted(storage);
        self.show_results.insert(poll, true);
        self.persist_show_results(storage);

        self.refresh(transport);
        Ok(())
    }

    /// Surfaces a failed vote call
    ///
    /// The ledger already recorded the vote and the refetched counts
    /// remain authoritative, so the failure is only logged.
    pub fn receive_vote_failure(&self, poll: PollId, message: &str) {
        tracing::warn!(%poll, %message, "vote call failed");
    }

    /// Toggles the results panel for a poll and persists the choice
    pub fn toggle_results<S: Storage>(&mut self, poll: PollId, storage: &S) {
        let expanded = self.show_results.entry(poll).or_insert(false);
        *expanded = !*expanded;
        self.persist_show_results(storage);
    }

    fn persist_voted<S: Storage>(&self, storage: &S) {
        let ids = self.voted.iter().sorted().collect_vec();
        match serde_json::to_string(&ids) {
            Ok(raw) => storage.put(constants::storage::VOTED_POLLS, &raw),
            Err(error) => tracing::warn!(%error, "failed to persist voted polls"),
        }
    }

    fn persist_show_results<S: Storage>(&self, storage: &S) {
        match serde_json::to_string(&self.show_results) {
            Ok(raw) => storage.put(constants::storage::SHOW_RESULTS, &raw),
            Err(error) => tracing::warn!(%error, "failed to persist results visibility"),
        }
    }
}
