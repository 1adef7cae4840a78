//! Per-agent conversational context and working memory

pub mod entities;
pub mod memory;
