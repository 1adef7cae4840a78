//! Task domain: the unit of work and the uniform result envelope

pub mod entities;
pub mod result;
