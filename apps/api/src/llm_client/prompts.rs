// Shared prompt constants.
// Each module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System persona prepended to every plain follow-up chat call.
pub const CHAT_PERSONA_SYSTEM: &str = "You are a helpful assistant.";
