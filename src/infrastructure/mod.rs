//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage / Database: User and group persistence
//! - Plugins: Manifest loading, registry and hot reload
//! - Groups: Participant cache and feature announcements
//! - Incident: Error records for triage
//! - Adapters: Platform integrations (console)

pub mod adapters;
pub mod config;
pub mod database;
pub mod groups;
pub mod incident;
pub mod plugins;
pub mod storage;
