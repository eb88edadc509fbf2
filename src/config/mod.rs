mod error;
mod handlers;
mod numeric;
mod parser;
mod store;

pub use error::ConfigError;
pub use handlers::{ConfigLogic, Dispatch, DispatchSummary, HandlerRegistry, SectionKey};
pub use numeric::{parse_numeric, Numeric};
pub use parser::{parse_str, MalformedLine, ParsedConfig, Sections};
pub use store::ConfigStore;

use std::path::PathBuf;

/// Default file used by the CLI when no `--file` is given.
///
/// Uses `~/.config/inistore/config.ini` on Linux, or the platform equivalent
/// via `dirs::config_dir()`. Falls back to the current directory if the
/// platform has no config dir.
pub fn default_config_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config_dir.join("inistore").join("config.ini")
}
