//! Plan domain: ordered task decomposition and the plan-text parser

pub mod entities;
pub mod parser;
