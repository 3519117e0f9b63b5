//! # crate-data configuration
//!
//! Typed settings for the HTTP server, logging and the three database
//! backends. Values come from built-in defaults, an optional TOML file and
//! the deployment environment variables, in that order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crate_data_config::ConfigLoader;
//!
//! let config = ConfigLoader::load(None)?;
//! println!("listening on {}", config.server.bind_address());
//! # Ok::<(), crate_data_config::ConfigError>(())
//! ```

pub mod components;
mod config;
mod error;
mod loader;

pub use components::*;
pub use config::AppConfig;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE};
