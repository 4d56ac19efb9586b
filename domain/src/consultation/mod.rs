//! Consultation domain
//!
//! The orchestrator session aggregate, its value objects, the approval
//! gate over proposed roles and parsing of the model's panel proposal.

pub mod approval_gate;
pub mod parsing;
pub mod session;
pub mod value_objects;
