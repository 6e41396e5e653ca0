//! # SiteSage Core
//!
//! Domain types, traits, and error definitions for SiteSage, a service that
//! answers questions about a single website from its crawled text.
//! This crate has **no framework dependencies**; it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Collaborators at the edge of the system (the LLM backend, the crawler)
//! are defined as traits. Implementations live in their respective crates.
//! This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod corpus;
pub mod error;
pub mod message;
pub mod provider;
pub mod question;

// Re-export key types at crate root for ergonomics
pub use corpus::{CorpusEntry, PageMap, SiteCorpus};
pub use error::{AskError, CrawlError, Error, ProviderError, QuestionError, Result};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use question::{MAX_QUESTION_CHARS, Question};
