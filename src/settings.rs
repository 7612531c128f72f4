//! Defaults of the scanner itself.
//!
//! Layered as compiled defaults < TOML settings file < `KCONFIG_*` environment
//! variables, and converted into a [`ScanOptions`] record.

use std::path::{Path, PathBuf};
use std::time::Duration;

use confique::Config;

use crate::error::KConfigError;
use crate::types::{ScanOptions, SearchPath};

#[derive(Config, Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directories scanned for config documents, lowest priority first.
    #[config(
        default = ["/oem", "/usr/local/cloud-config", "/run/initramfs/live"],
        env = "KCONFIG_DIRECTORIES",
        parse_env = confique::env::parse::list_by_comma
    )]
    pub directories: Vec<PathBuf>,

    /// File holding the kernel command line.
    #[config(default = "/proc/cmdline", env = "KCONFIG_BOOT_CMDLINE")]
    pub boot_cmdline: PathBuf,

    /// Merge the boot command line on top of the scanned documents.
    #[config(default = false, env = "KCONFIG_MERGE_BOOT_LINE")]
    pub merge_boot_line: bool,

    /// Escalate header conflicts and remote failures to errors.
    #[config(default = false, env = "KCONFIG_STRICT")]
    pub strict_validation: bool,

    /// Descend into subdirectories of the scanned directories.
    #[config(default = false, env = "KCONFIG_RECURSIVE")]
    pub recursive: bool,

    /// Header emitted when no document carries one.
    #[config(default = "#kairos-config", env = "KCONFIG_HEADER")]
    pub header: String,

    /// Timeout in seconds for fetching a `config_url`.
    #[config(default = 30, env = "KCONFIG_FETCH_TIMEOUT")]
    pub fetch_timeout_secs: u64,
}

impl Settings {
    /// Load settings from the environment and an optional TOML file.
    /// Environment variables take precedence over the file.
    pub fn load(file: Option<&Path>) -> Result<Self, KConfigError> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    pub fn scan_options(&self) -> ScanOptions {
        let header = Some(self.header.clone()).filter(|h| !h.is_empty());
        ScanOptions {
            directories: self.directories.iter().cloned().map(SearchPath::Path).collect(),
            merge_boot_line: self.merge_boot_line,
            boot_cmdline_file: self.boot_cmdline.clone(),
            strict_validation: self.strict_validation,
            recursive: self.recursive,
            header,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            ..ScanOptions::default()
        }
    }
}
