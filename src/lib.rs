//! # Qurio Client Engine
//!
//! This library provides the client-side engine for the Qurio quiz and
//! polling platform: quiz session state machines for registered and
//! guest play, local score reconciliation, photo object-URL lifecycle
//! management, and poll tally projection with vote-once gating.
//!
//! The engine is sans-IO. All business authority (authentication,
//! persistence, scoring for guests, vote tallying) lives in the REST
//! backend; the engine models outbound calls as [`Request`] values
//! dispatched through [`transport::Transport`] and consumes their
//! outcomes through explicit `receive_*` methods on each component.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

use derive_where::derive_where;
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod photo;
pub mod poll;
pub mod quiz;
pub mod transport;

/// HTTP method of a [`Request`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    /// An idempotent fetch
    Get,
    /// A state-changing call
    Post,
}

/// Aggregate of every network request the engine can issue
///
/// Each component defines its own request enum; this wrapper is what
/// crosses the [`transport::Transport`] seam, so a host application has a
/// single type to route onto its HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::From)]
pub enum Request {
    /// Quiz session requests
    Quiz(quiz::session::Request),
    /// Poll requests
    Poll(poll::Request),
    /// Photo requests
    Photo(photo::Request),
}

impl Request {
    /// The HTTP method of this request
    pub fn method(&self) -> Method {
        match self {
            Self::Quiz(request) => request.method(),
            Self::Poll(request) => request.method(),
            Self::Photo(request) => request.method(),
        }
    }

    /// The REST path (with query string) of this request
    ///
    /// Relative to the backend base URL, which is the host's concern.
    pub fn path(&self) -> String {
        match self {
            Self::Quiz(request) => request.path(),
            Self::Poll(request) => request.path(),
            Self::Photo(request) => request.path(),
        }
    }
}

/// One page of a paged backend listing
///
/// Play-time fetches cap the page size so that a single page is treated
/// as the complete listing; `total_elements` is kept for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[derive_where(Default)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items of this page
    pub content: Vec<T>,
    /// Exact total count across all pages
    #[serde(default)]
    pub total_elements: u64,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::quiz::model::{AnswerId, QuestionId, QuizId, SessionId};

    #[test]
    fn test_request_methods() {
        let fetch: Request = quiz::session::Request::FetchQuiz { quiz: QuizId(1) }.into();
        assert_eq!(fetch.method(), Method::Get);

        let vote: Request = poll::Request::CastVote {
            poll: poll::PollId(1),
            option: poll::PollOptionId(2),
        }
        .into();
        assert_eq!(vote.method(), Method::Post);

        let photo: Request = photo::Request::FetchPhoto {
            key: photo::PhotoKey::quiz(QuizId(1)),
        }
        .into();
        assert_eq!(photo.method(), Method::Get);
    }

    #[test]
    fn test_request_paths_follow_the_backend_contract() {
        let submit: Request = quiz::session::Request::SubmitQuiz {
            session: SessionId::new("abc"),
            email: None,
        }
        .into();
        assert_eq!(submit.path(), "/guest/session/abc/submit");

        let answer: Request = quiz::session::Request::RecordAnswer {
            session: SessionId::new("abc"),
            quiz: QuizId(42),
            question: QuestionId(7),
            answer: AnswerId(101),
        }
        .into();
        assert_eq!(
            answer.path(),
            "/guest/session/abc/quiz/42/answer?questionId=7&answerId=101"
        );

        let polls: Request = poll::Request::FetchPolls { page: 0, size: 20 }.into();
        assert_eq!(polls.path(), "/polls?page=0&size=20");
    }

    #[test]
    fn test_page_decoding() {
        let json = r#"{"content":[1,2,3],"totalElements":7}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();

        assert_eq!(page.content, vec![1, 2, 3]);
        assert_eq!(page.total_elements, 7);
    }

    #[test]
    fn test_page_default_is_empty() {
        let page: Page<String> = Page::default();
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 0);
    }
}
