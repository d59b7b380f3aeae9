pub mod client;
pub mod extract;
pub mod invoker;
pub mod structured;

pub use client::{
    GeminiClient, GenerationParams, GenerativeModel, InlineImage, ModelError, ModelInfo, Prompt,
};
pub use invoker::FallbackInvoker;
pub use structured::{generate_structured, AiError, StructuredRequest};
