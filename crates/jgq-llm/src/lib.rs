//! # JGQ LLM
//!
//! Chat-completion adapters for the workflow roles.
//!
//! Groq is reached through its OpenAI-compatible API, Ollama through
//! `/api/chat`. Both run at temperature 0.

pub mod factory;
pub mod groq;
pub mod ollama;

pub use factory::{chat_model, role_clients};
pub use groq::GroqClient;
pub use ollama::OllamaChatClient;
