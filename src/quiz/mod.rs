//! Quiz-taking engine
//!
//! This module contains the data model for quizzes and questions, the
//! in-memory selection tracker, the pure scoring reconciler, and the
//! session state machine that ties them together for both registered and
//! guest play.

pub mod model;
pub mod scoring;
pub mod selection;
pub mod session;
