//! Clap adapter for kconfig.
//!
//! This module is the **optional integration layer** between the
//! framework-agnostic scanner and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! [`ScanArgs`] carries the global scan flags and the query subcommands. It can
//! be flattened into any clap `#[derive(Parser)]` struct. The bridges to the
//! core are [`ScanArgs::apply()`], which layers the flags over a
//! [`ScanOptions`], and [`ScanArgs::into_action()`], which yields a
//! [`ScanAction`](crate::ScanAction) for
//! [`ScanBuilder::handle()`](crate::ScanBuilder::handle).

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::{ScanAction, ScanOptions, SearchPath};

/// Clap-derived scan flags and subcommands.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan (repeatable, replaces the configured directories).
    #[arg(long = "dir", value_name = "DIR", global = true)]
    pub dirs: Vec<PathBuf>,

    /// Merge the kernel boot command line on top of the scanned files.
    #[arg(long, global = true)]
    pub boot_line: bool,

    /// Read the boot command line from FILE instead of /proc/cmdline.
    #[arg(long, value_name = "FILE", global = true)]
    pub cmdline: Option<PathBuf>,

    /// Fail on header conflicts and remote fetch errors.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (TOML).
    #[arg(long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub action: Option<ScanSubcommand>,
}

/// Available query subcommands.
#[derive(Debug, Subcommand)]
pub enum ScanSubcommand {
    /// Print the merged document.
    Show {
        /// Print JSON instead of YAML.
        #[arg(long)]
        json: bool,
    },
    /// Print the value at a dotted key path.
    Get {
        /// Dotted key path (e.g. "install.device").
        key: String,
    },
    /// Print a boot override from the `options` section.
    Options {
        /// Key under `options`.
        key: String,
    },
    /// Show every leaf value as `key = value`.
    List,
    /// List the files that contain a dotted key path.
    Find {
        /// Dotted key path (e.g. "install.device").
        key: String,
    },
    /// List bundle targets.
    Bundles,
}

impl ScanArgs {
    /// Layer the command-line flags over `options`.
    ///
    /// Flags only ever switch things on; `--dir` replaces the directory list.
    pub fn apply(&self, mut options: ScanOptions) -> ScanOptions {
        if !self.dirs.is_empty() {
            options.directories = self.dirs.iter().cloned().map(SearchPath::Path).collect();
        }
        if self.boot_line {
            options.merge_boot_line = true;
        }
        if let Some(cmdline) = &self.cmdline {
            options.boot_cmdline_file = cmdline.clone();
        }
        if self.strict {
            options.strict_validation = true;
        }
        options
    }

    /// Convert clap-parsed args into a framework-agnostic `ScanAction`.
    ///
    /// Bare `kconfig` (no subcommand) maps to `ScanAction::Show`.
    pub fn into_action(self) -> ScanAction {
        match self.action {
            None => ScanAction::Show { json: false },
            Some(ScanSubcommand::Show { json }) => ScanAction::Show { json },
            Some(ScanSubcommand::Get { key }) => ScanAction::Get { key },
            Some(ScanSubcommand::Options { key }) => ScanAction::Options { key },
            Some(ScanSubcommand::List) => ScanAction::List,
            Some(ScanSubcommand::Find { key }) => ScanAction::Find { key },
            Some(ScanSubcommand::Bundles) => ScanAction::Bundles,
        }
    }
}
