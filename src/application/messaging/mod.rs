//! Message handling - Dispatch pipeline, access policy and membership events

pub mod access;
pub mod dispatcher;
pub mod hooks;
pub mod membership;
pub mod parser;
pub mod rate_limit;
pub mod resolver;

pub use access::{AccessDecision, AccessGate, DenyReason};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use hooks::RegistrationGate;
pub use membership::{MembershipHandler, MembershipOutcome};
pub use parser::MessageParser;
pub use rate_limit::RateLimiter;
pub use resolver::{CommandResolver, Resolution};
