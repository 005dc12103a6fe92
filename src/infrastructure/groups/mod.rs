//! Group-side collaborators for membership events

pub mod cache;
pub mod features;

pub use cache::ParticipantCache;
pub use features::FeatureAnnouncer;
