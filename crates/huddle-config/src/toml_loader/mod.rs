//! Config file handling: the default location, the commented template
//! written on first run, and parse-then-validate loading.

mod loader;
mod paths;
mod template;


pub use loader::{load_default, load_from_path};
pub use paths::{create_default_config, default_config_path};
pub use template::default_config_toml;
