//! Process configuration, constructed once at startup and passed by
//! reference into the corpus, resolver, and renderer.

use std::env;
use std::path::PathBuf;

use nix::unistd::Uid;

/// Default guide directory when `HOWTO_DIR` is unset.
pub const DEFAULT_HOWTO_DIR: &str = "/var/lib/howto/guides";

/// Runtime configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned (flat) for guide files.
    pub howto_dir: PathBuf,
    /// Directory holding YAML context files for templated guides.
    pub context_dir: Option<PathBuf>,
    /// Whether the caller may see admin-only guides. Opaque boolean; the
    /// probe lives here, nothing else consults the OS.
    pub privileged: bool,
    /// Rendering width override; `None` detects the terminal width.
    pub width: Option<u16>,
}

impl Config {
    /// Build the configuration from the environment and the privilege
    /// probe (effective uid).
    #[must_use]
    pub fn from_env() -> Self {
        let howto_dir = env::var_os("HOWTO_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_HOWTO_DIR), PathBuf::from);
        let context_dir = env::var_os("HOWTO_CONTEXT_DIR").map(PathBuf::from);
        Self {
            howto_dir,
            context_dir,
            privileged: Uid::effective().is_root(),
            width: None,
        }
    }
}
