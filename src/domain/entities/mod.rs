//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod group;
pub mod message;
pub mod user;

pub use command::{CommandSpec, PluginOutcome};
pub use group::{GroupSettings, MembershipAction, MembershipEvent};
pub use message::InboundMessage;
pub use user::{SenderPrivileges, UserRecord};
