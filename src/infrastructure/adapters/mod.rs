//! Platform adapters

pub mod console;

pub use console::{parse_directive, ConsoleAdapter, ConsoleDirective};
