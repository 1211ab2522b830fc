//! Configuration for the updater.
//!
//! Two pieces of configuration drive a run:
//!
//! - [`UpdateConfig`] - the settings document (`config.json`): server, size cap,
//!   hashing and timeouts. Loaded once; never a hard failure.
//! - [`InstallLayout`] - where the installation lives and which files in it
//!   matter (executable, version marker, downloaded package).
//!
//! # Examples
//!
//! ```rust,no_run
//! use arc_updater::config::{InstallLayout, UpdateConfig};
//!
//! let layout = InstallLayout::new(".");
//! let config = UpdateConfig::load_or_default(&layout.config_path());
//! println!("Checking {}", config.version_url());
//! ```

mod layout;
mod parser;
mod update;

pub use layout::InstallLayout;
pub use parser::{ConfigFormat, parse_config, parse_config_str};
pub use update::UpdateConfig;
