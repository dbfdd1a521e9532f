//! # Common Components
//!
//! Shared utilities used by the library and both binaries.
//!
//! ## Modules
//!
//! - [`error`]: the [`StegoError`](error::StegoError) type
//! - [`config`]: TOML configuration loading
//! - [`logging`]: `env_logger` setup for the binaries

pub mod config;
pub mod error;
pub mod logging;
