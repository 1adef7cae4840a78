//! Agent-facing text grammars: the executor's tool-call format and the
//! validator's verdict format

pub mod action;
pub mod verdict;
