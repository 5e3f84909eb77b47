pub mod endpoints;
pub mod ollama;
pub mod prompts;
pub mod relay;
