//! LLM gateway adapters

pub mod openai;
