//! Prompt templates for the consultation flow.

pub mod template;

pub use template::PromptTemplate;
