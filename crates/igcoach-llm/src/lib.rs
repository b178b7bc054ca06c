//! Client for OpenAI-compatible chat-completion endpoints.

pub mod client;
pub mod error;
pub mod types;

pub use client::ChatClient;
pub use error::LlmError;
pub use types::{ChatCompletionRequest, ChatCompletionResponse, Message};
