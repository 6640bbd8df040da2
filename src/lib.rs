//! keigo-sensei: HTTP backend for a Japanese honorific-language tutoring chat.
//!
//! Users submit Japanese sentences; the service classifies the politeness
//! register, scores it 0-100, and returns feedback and improved phrasings.
//! Gemini is the primary judge; every external failure degrades to a
//! deterministic heuristic (analysis/scoring) or a static pool (topics)
//! so the learner always gets an answer.

pub mod analysis;
pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod heuristic;
pub mod http;
pub mod prompts;
pub mod schemas;
pub mod session;
pub mod topics;

pub use config::Config;
pub use error::{KeigoError, Result};
