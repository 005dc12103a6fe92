//! Domain traits - Abstractions for infrastructure implementations

pub mod hooks;
pub mod plugin;
pub mod store;
pub mod transport;

pub use hooks::{FeatureFanOut, IncidentSink, ParticipantSync, PassThrough, PreProcessHook};
pub use plugin::{CommandHandler, PluginLoader};
pub use store::{GroupStore, UserStore};
pub use transport::Transport;
