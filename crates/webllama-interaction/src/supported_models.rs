//! Supported OpenRouter model IDs.
//!
//! WebLlama talks to OpenRouter, so any chat-completion model routed there
//! works; the list below is what the model picker offers out of the box.
//!
//! # Supported Models (as of 2026-08)
//!
//! | Model ID | Notes |
//! |----------|-------|
//! | `meta-llama/llama-3.3-70b-instruct` | Default; strong code generation |
//! | `meta-llama/llama-3.1-8b-instruct` | Fast, budget-friendly |
//! | `meta-llama/llama-4-maverick` | Latest Llama flagship |
//! | `mistralai/mistral-small-3.1-24b-instruct` | Good quality/speed balance |
//! | `qwen/qwen-2.5-coder-32b-instruct` | Code-specialized |
//! | `deepseek/deepseek-chat-v3-0324` | Strong general model |
//!
//! Reference: <https://openrouter.ai/models>
//!
//! # How to Update
//!
//! When a listed model is deprecated upstream:
//!
//! 1. Update `SUPPORTED_MODELS` below
//! 2. Update `DEFAULT_MODEL` in `webllama-core/src/lib.rs` if the default
//!    changes
//! 3. Update the table above

/// Models offered by the interactive model picker.
pub const SUPPORTED_MODELS: &[&str] = &[
    "meta-llama/llama-3.3-70b-instruct",
    "meta-llama/llama-3.1-8b-instruct",
    "meta-llama/llama-4-maverick",
    "mistralai/mistral-small-3.1-24b-instruct",
    "qwen/qwen-2.5-coder-32b-instruct",
    "deepseek/deepseek-chat-v3-0324",
];
