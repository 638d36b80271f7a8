//! Scribe: language-model writing suggestions as inline word diffs.
//!
//! Picks the selection (or the paragraph under the caret), sends it to a
//! text-generation API, paints the answer as a word-level diff over the
//! original, and keeps exactly one suggestion pending until it is accepted or
//! invalidated.

pub mod commands;
pub mod config;
pub mod diff;
pub mod document;
pub mod editor;
pub mod llm;
pub mod preview;
pub mod prompts;
pub mod session;
pub mod suggestion;
pub mod target;
