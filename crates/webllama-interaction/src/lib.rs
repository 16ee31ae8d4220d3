//! Interaction layer for WebLlama: the OpenRouter chat-completion client
//! and the fixed prompt templates it sends.

pub mod openrouter_api_agent;
pub mod prompts;
pub mod supported_models;

pub use openrouter_api_agent::{
    API_KEY_ENV, API_KEY_PREFIX, OpenRouterApiAgent, validate_api_key,
};
pub use supported_models::SUPPORTED_MODELS;
