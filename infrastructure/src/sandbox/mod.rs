//! Sandboxed execution
//!
//! | Part | Role |
//! |------|------|
//! | [`vm`] | Docker-backed isolated environment with resource limits |
//! | [`client`] | security gate plus VM lifecycle behind one facade |

pub mod client;
pub mod vm;
