//! Application layer - Dispatch pipeline and policy
//! 
//! This layer contains:
//! - Errors: Domain-specific errors
//! - Messaging: Parsing, rate limiting, access gate, resolution, dispatch, membership events

pub mod errors;
pub mod messaging;
