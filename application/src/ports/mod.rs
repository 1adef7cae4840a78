//! Port definitions
//!
//! Ports define how the application layer communicates with the outside
//! world. Implementations (adapters) live in the infrastructure layer.

pub mod llm_gateway;
pub mod sandbox;
pub mod tool;
