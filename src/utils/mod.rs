//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command execution with error handling
//! - `template` - String template rendering
//! - `validation` - Input validation helpers

pub mod command;
pub mod template;
pub mod validation;
