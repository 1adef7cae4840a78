//! Static security gate for sandboxed code
//!
//! | Part | Role |
//! |------|------|
//! | [`policy`] | allow/deny rule sets and resource limits |
//! | [`manager`] | pattern-based code validation against the policy |

pub mod manager;
pub mod policy;
