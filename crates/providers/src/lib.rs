//! LLM Provider implementations for SiteSage.
//!
//! All providers implement the `sitesage_core::Provider` trait. Every
//! supported backend speaks the OpenAI chat-completions protocol; [`select`]
//! picks the endpoint, key and model from configuration.

pub mod openai_compat;
pub mod select;

pub use openai_compat::OpenAiCompatProvider;
pub use select::{Selection, build_from_config, model_for};
