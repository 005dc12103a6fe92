//! Domain layer - Core business objects and collaborator contracts
//! 
//! This layer contains:
//! - Entities: Inbound messages, command specs, users, groups
//! - Traits: Abstractions for transport, storage, hooks and plugins

pub mod entities;
pub mod traits;
