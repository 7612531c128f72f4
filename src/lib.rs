//! Discover, merge and query the layered YAML configuration of a machine.
//!
//! A provisioned machine collects configuration from several places: YAML
//! documents dropped into well-known directories, the kernel boot command
//! line, and remote documents referenced by URL. kconfig finds all of them,
//! merges them into one document and answers questions about the result.
//!
//! ```ignore
//! let config = Scanner::builder()
//!     .directories(["/oem", "/usr/local/cloud-config"])
//!     .merge_boot_line(true)
//!     .load()?;
//!
//! let device = config.query("install.device")?;
//! ```
//!
//! That single call reads every file of both directories, deep-merges them in
//! order, follows a `config_url` if one is set, overlays the `options.*` keys
//! of `/proc/cmdline` and hands back a [`KConfig`].
//!
//! # Layer precedence
//!
//! ```text
//! Files                 directories in order, files sorted within each
//!        ↑ replaced by
//! Remote document       config_url (one hop)
//!        ↑ overridden by
//! Boot command line     options.key=value, allow-listed roots only
//! ```
//!
//! Every layer is **sparse**. Mappings merge key by key at any depth; scalars
//! and sequences of a later layer replace earlier ones. Key order is kept:
//! existing keys stay where they were, new keys are appended.
//!
//! # Headers
//!
//! A document may start with a marker line such as `#kairos-config` or
//! `#cloud-config`. The header is not YAML data: it is split off before
//! parsing and written back as the literal first line of the merged output.
//! When sources disagree the first header seen wins. [`has_header`] checks a
//! text for one.
//!
//! # Best effort by default
//!
//! Scanning is greedy. Files that cannot be read or parsed, or whose top
//! level is not a mapping, are skipped and recorded in
//! [`KConfig::skipped()`]. Missing directories are ignored since the default
//! list names places that only exist on some machines.
//!
//! [`strict_validation(true)`](ScanBuilder::strict_validation) turns header
//! conflicts, remote fetch failures and an unreadable boot command line into
//! errors. Unparsable files are still skipped.
//!
//! # Boot command line
//!
//! Tokens of the form `dotted.key=value` (values optionally quoted) are
//! expanded into nested mappings. Only roots listed in
//! [`boot_roots()`](ScanBuilder::boot_roots) survive, `options` by default,
//! so kernel flags like `console=tty1` never leak into the configuration.
//! Values stay strings.
//!
//! # Remote documents
//!
//! A top-level `config_url` is fetched through a [`Fetcher`]. With the
//! `remote` feature (on by default) [`HttpFetcher`] does blocking HTTP(S) with
//! a timeout; any other transport can be plugged in with
//! [`fetcher()`](ScanBuilder::fetcher). The fetched document replaces the local
//! tree.
//!
//! # Querying
//!
//! - [`KConfig::query`]: YAML of the value at a dotted path.
//! - [`KConfig::options`]: a boot override as plain text.
//! - [`KConfig::decode`] and [`KConfig::decode_strict`]: typed views via serde.
//! - [`KConfig::bundles`]: the reserved `bundles` list.
//! - [`find_yaml_with_key`]: which files on disk define a key.
//!
//! # Core library, no CLI framework required
//!
//! Everything above works through [`ScanBuilder`] and [`ScanAction`]. The
//! `cli` module (behind the `clap` feature) adds [`ScanArgs`], a clap derive
//! struct that maps the `kconfig` command line onto a `ScanAction`.
//!
//! # Logging
//!
//! The library emits [`tracing`](https://docs.rs/tracing) events and never
//! installs a subscriber. [`suppress_logs(true)`](ScanBuilder::suppress_logs)
//! demotes a scan's warnings to `debug`.
//!
//! # Error handling
//!
//! All fallible operations return [`KConfigError`]. Messages name the file,
//! URL or key involved.

pub mod error;
pub mod types;

mod bootline;
mod builder;
mod bundle;
#[cfg(feature = "clap")]
mod cli;
mod diag;
mod document;
mod file;
mod header;
pub(crate) mod merge;
mod ops;
mod query;
mod remote;
mod resolve;
pub mod settings;
mod validate;

#[cfg(test)]
mod fixtures;

pub use bootline::{BootToken, parse_boot_line, tokenize};
pub use builder::{ScanBuilder, Scanner};
pub use bundle::Bundle;
#[cfg(feature = "clap")]
pub use cli::{ScanArgs, ScanSubcommand};
pub use document::{KConfig, ParsedDocument, parse_document};
pub use error::KConfigError;
pub use header::{DEFAULT_HEADER, KNOWN_HEADERS, attach_header, has_header, split_header};
pub use merge::{deep_merge, merge_all, merge_scoped};
pub use ops::ScanResult;
pub use query::{Lookup, find_yaml_with_key, flatten, query, scalar_to_string, tree_get};
#[cfg(feature = "remote")]
pub use remote::HttpFetcher;
pub use remote::Fetcher;
pub use resolve::{ResolveInput, resolve};
pub use settings::Settings;
pub use types::{ConfigTree, ScanAction, ScanOptions, SearchPath, SkippedFile};
