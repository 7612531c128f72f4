//! Shared types: the tree alias, scan options, search paths and actions.

use std::path::PathBuf;
use std::time::Duration;

use crate::header::DEFAULT_HEADER;

/// An ordered YAML mapping. Insertion order is kept through merge and
/// serialization.
pub type ConfigTree = serde_yaml::Mapping;

/// Root keys a boot cmdline is allowed to set by default.
pub const DEFAULT_BOOT_ROOTS: &[&str] = &["options"];

/// Default location of the kernel command line.
pub const DEFAULT_BOOT_CMDLINE: &str = "/proc/cmdline";

/// Where to look for config documents.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Per-user config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".kairos")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit path.
    Path(PathBuf),
}

impl From<PathBuf> for SearchPath {
    fn from(path: PathBuf) -> Self {
        SearchPath::Path(path)
    }
}

impl From<&std::path::Path> for SearchPath {
    fn from(path: &std::path::Path) -> Self {
        SearchPath::Path(path.to_path_buf())
    }
}

impl From<&str> for SearchPath {
    fn from(path: &str) -> Self {
        SearchPath::Path(PathBuf::from(path))
    }
}

/// Everything one scan needs to know. Built by
/// [`ScanBuilder`](crate::ScanBuilder) or filled in directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Directories to scan, lowest priority first.
    pub directories: Vec<SearchPath>,
    /// Merge the boot cmdline on top of the scanned documents.
    pub merge_boot_line: bool,
    /// File holding the boot cmdline.
    pub boot_cmdline_file: PathBuf,
    /// Inline boot cmdline. Takes precedence over `boot_cmdline_file`.
    pub boot_line: Option<String>,
    /// Root keys the boot cmdline may set.
    pub boot_roots: Vec<String>,
    /// Escalate header conflicts and remote failures to errors.
    pub strict_validation: bool,
    /// Demote warnings of this scan to debug events.
    pub suppress_logs: bool,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Only merge files whose first line is a recognized header.
    pub require_header: bool,
    /// Header emitted when no source carries one. `None` emits no header.
    pub header: Option<String>,
    /// Timeout for fetching a `config_url`.
    pub fetch_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            merge_boot_line: false,
            boot_cmdline_file: PathBuf::from(DEFAULT_BOOT_CMDLINE),
            boot_line: None,
            boot_roots: DEFAULT_BOOT_ROOTS.iter().map(|r| r.to_string()).collect(),
            strict_validation: false,
            suppress_logs: false,
            recursive: false,
            require_header: false,
            header: Some(DEFAULT_HEADER.to_string()),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// A file the scan discarded, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// A query operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanAction {
    /// Print the merged document.
    Show { json: bool },
    /// Print the value at a dotted path.
    Get { key: String },
    /// Print a boot override from the `options` root.
    Options { key: String },
    /// Print every leaf as `key = value`.
    List,
    /// Print the files that contain a dotted path.
    Find { key: String },
    /// Print bundle targets.
    Bundles,
}
