//! Configuration system for the kiln material baker.
//!
//! Settings persist to disk as a RON file. CLI overrides are applied via clap,
//! and missing sections or fields fall back to their defaults so older files
//! keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AtlasConfig, BakeConfig, CONFIG_FILE_NAME, Config, DebugConfig, FixedResolution, NamingConfig,
    PassFlags, UvOffset,
};
pub use error::ConfigError;
