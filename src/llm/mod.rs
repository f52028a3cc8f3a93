//! LLM integration module.
//!
//! Provides an OpenAI-compatible client for LLM API calls, the
//! [`CompletionModel`] seam the pipeline is written against, and the
//! prompts used for outline and chapter generation.

mod client;
mod prompts;

pub use client::{check_request, CompletionModel, LlmClient, LlmResponse, Message, Role, TokenUsage};
pub use prompts::Prompts;
