//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)          process environment
//!     → loader.rs (parse)         → loader.rs (overlay CTXLOG_* vars)
//!     → validation.rs (semantic checks)
//!     → LoggingConfig (validated, immutable)
//!     → passed explicitly to init / Builder
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded and never held in a global
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, from_env, load_config, ConfigError};
pub use schema::{ConsoleConfig, LoggingConfig, RemoteConfig};
pub use validation::{validate_config, ValidationError};
