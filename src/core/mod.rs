// Public modules
pub mod addon;
pub mod component;
pub mod error;
pub mod file_format;
pub mod filemask;
pub mod import;
pub mod language;
pub mod project;
pub mod store;
pub mod vcs;

// Internal modules - not part of public API
pub(crate) mod config;
pub(crate) mod local_files;
pub mod paths;
pub mod slugify;

// Public modules for CLI access
pub mod defaults;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use config::read_json_spec_to_string;
