//! ideaforge: turn a business idea into a set of business documents.
//!
//! One idea fans out into seven concurrent generation requests (proposal,
//! business plan, market research, roadmap, milestones, financial
//! projection, technical PRD). Each document can then be refined with the
//! model, edited by hand, and saved as plain text.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;

pub mod client;
pub mod documents;
pub mod prompts;

pub mod orchestrator;
pub mod session;

pub mod download;
pub mod shell;
