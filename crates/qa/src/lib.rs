//! Question answering over a crawled site.
//!
//! The pipeline for one question:
//!
//! 1. **Validate** the raw question ([`sitesage_core::Question`])
//! 2. **Budget** the corpus so its serialized form fits the model's context
//!    ([`BudgetEnforcer`])
//! 3. **Prompt** the LLM with the trimmed site data ([`prompt`])
//! 4. **Assemble** the answer with usage and provenance ([`assemble`])
//!
//! [`QaService`] owns the corpus and runs the pipeline per request.

pub mod answer;
pub mod budget;
pub mod prompt;
pub mod service;

pub use answer::{AnswerResult, AnswerUsage, LlmReply, assemble};
pub use budget::{BudgetEnforcer, Eviction, Trimmed, serialized_size};
pub use service::{QaService, QaSettings};
