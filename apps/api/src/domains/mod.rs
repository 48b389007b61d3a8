//! Internship domain suggestions.
//!
//! A lighter companion to CV matching: the visitor describes their background
//! and interests, pastes part of a CV, and gets back a short list of
//! internship domains worth exploring.

pub mod handlers;
pub mod prompts;
pub mod suggester;
