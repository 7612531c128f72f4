use std::path::PathBuf;
use std::time::Duration;

use crate::diag::scan_warn;
use crate::document::KConfig;
use crate::error::KConfigError;
use crate::file;
use crate::ops::{self, ScanResult};
use crate::query;
use crate::remote::Fetcher;
use crate::resolve::{self, ResolveInput};
use crate::types::{ScanAction, ScanOptions, SearchPath};

/// Entry point for scanning configuration.
pub struct Scanner;

impl Scanner {
    pub fn builder() -> ScanBuilder {
        ScanBuilder::new(ScanOptions::default())
    }

    /// Start from an existing options record.
    pub fn from_options(options: ScanOptions) -> ScanBuilder {
        ScanBuilder::new(options)
    }

    /// Scan with `options` and the default fetcher.
    pub fn scan(options: &ScanOptions) -> Result<KConfig, KConfigError> {
        Self::from_options(options.clone()).load()
    }
}

/// Builder for one scan.
///
/// Collects a [`ScanOptions`] record plus an optional [`Fetcher`]. Nothing is
/// read until [`load()`](Self::load) or [`handle()`](Self::handle).
pub struct ScanBuilder {
    options: ScanOptions,
    fetcher: Option<Box<dyn Fetcher>>,
}

impl ScanBuilder {
    fn new(options: ScanOptions) -> Self {
        Self {
            options,
            fetcher: None,
        }
    }

    /// Replace the directories to scan.
    ///
    /// Directories are listed in **priority-ascending** order: files of the
    /// last directory override files of the first.
    pub fn directories<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<SearchPath>,
    {
        self.options.directories = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Append one directory with the highest priority so far.
    pub fn add_directory(mut self, dir: impl Into<SearchPath>) -> Self {
        self.options.directories.push(dir.into());
        self
    }

    /// Merge the boot cmdline on top of the scanned files (default: `false`).
    pub fn merge_boot_line(mut self, merge: bool) -> Self {
        self.options.merge_boot_line = merge;
        self
    }

    /// Read the boot cmdline from `path` (default: `/proc/cmdline`).
    pub fn boot_cmdline_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.boot_cmdline_file = path.into();
        self
    }

    /// Use `line` as the boot cmdline instead of reading a file.
    /// Only merged when [`merge_boot_line`](Self::merge_boot_line) is on.
    pub fn boot_line(mut self, line: impl Into<String>) -> Self {
        self.options.boot_line = Some(line.into());
        self
    }

    /// Root keys the boot cmdline may set (default: `["options"]`).
    pub fn boot_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.boot_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable strict validation (default: `false`).
    ///
    /// In strict mode header conflicts, remote failures and an unreadable boot
    /// cmdline file are errors instead of warnings. Unparsable files are
    /// skipped either way.
    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.options.strict_validation = strict;
        self
    }

    /// Demote this scan's warnings to debug events (default: `false`).
    pub fn suppress_logs(mut self, suppress: bool) -> Self {
        self.options.suppress_logs = suppress;
        self
    }

    /// Header emitted when no source carries one (default: `#kairos-config`).
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.options.header = Some(header.into());
        self
    }

    /// Emit no header unless a source carries one.
    pub fn no_header(mut self) -> Self {
        self.options.header = None;
        self
    }

    /// Descend into subdirectories (default: `false`).
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.options.recursive = recursive;
        self
    }

    /// Only merge files that start with a recognized header (default: `false`).
    pub fn require_header(mut self, require: bool) -> Self {
        self.options.require_header = require;
        self
    }

    /// Timeout for the `config_url` fetch (default: 30s).
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.options.fetch_timeout = timeout;
        self
    }

    /// Use a custom fetcher for `config_url`.
    pub fn fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// The accumulated options.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Read the boot cmdline, if it is to be merged.
    fn effective_boot_line(&self) -> Result<Option<String>, KConfigError> {
        let o = &self.options;
        if !o.merge_boot_line {
            return Ok(None);
        }
        if let Some(line) = &o.boot_line {
            return Ok(Some(line.clone()));
        }
        match file::read_boot_line(&o.boot_cmdline_file) {
            Ok(line) => Ok(Some(line)),
            Err(e) if o.strict_validation => Err(e),
            Err(e) => {
                scan_warn!(o.suppress_logs, error = %e, "boot cmdline not merged");
                Ok(None)
            }
        }
    }

    /// The fetcher to use: the custom one, else HTTP when available.
    fn into_fetcher(self) -> Option<Box<dyn Fetcher>> {
        let timeout = self.options.fetch_timeout;
        self.fetcher.or_else(|| default_fetcher(timeout))
    }

    /// Build the `ResolveInput` from current builder state.
    fn build_input(&self) -> Result<ResolveInput, KConfigError> {
        let o = &self.options;
        let dirs = file::expand_search_paths(&o.directories);
        let paths = file::collect_files(&dirs, o.recursive)?;
        let (files, skipped) = file::read_files(&paths);
        for skip in &skipped {
            scan_warn!(o.suppress_logs, path = %skip.path.display(), reason = %skip.reason, "skipping file");
        }

        Ok(ResolveInput {
            files,
            skipped,
            boot_line: self.effective_boot_line()?,
            boot_roots: o.boot_roots.clone(),
            header: o.header.clone(),
            require_header: o.require_header,
            strict: o.strict_validation,
            suppress_logs: o.suppress_logs,
        })
    }

    /// Scan, merge and resolve.
    pub fn load(self) -> Result<KConfig, KConfigError> {
        let input = self.build_input()?;
        let fetcher = self.into_fetcher();
        resolve::resolve(input, fetcher.as_deref())
    }

    /// Handle a `ScanAction` and print the result to stdout.
    pub fn handle_and_print(self, action: &ScanAction) -> Result<(), KConfigError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    /// Handle a `ScanAction` (show / get / options / list / find / bundles).
    pub fn handle(self, action: &ScanAction) -> Result<ScanResult, KConfigError> {
        match action {
            ScanAction::Show { json } => {
                let config = self.load()?;
                ops::show(&config, *json)
            }
            ScanAction::Get { key } => {
                let config = self.load()?;
                ops::get_value(&config, key)
            }
            ScanAction::Options { key } => {
                let config = self.load()?;
                ops::option_value(&config, key)
            }
            ScanAction::List => {
                let config = self.load()?;
                Ok(ops::list_values(&config))
            }
            ScanAction::Find { key } => {
                let paths = query::find_yaml_with_key(key, &self.options.directories)?;
                Ok(ScanResult::Paths(paths))
            }
            ScanAction::Bundles => {
                let config = self.load()?;
                Ok(ScanResult::Bundles(config.bundles()?))
            }
        }
    }
}

#[cfg(feature = "remote")]
fn default_fetcher(timeout: Duration) -> Option<Box<dyn Fetcher>> {
    Some(Box::new(crate::remote::HttpFetcher::new(timeout)))
}

#[cfg(not(feature = "remote"))]
fn default_fetcher(_timeout: Duration) -> Option<Box<dyn Fetcher>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{MapFetcher, ProviderConfig, REMOTE_BUNDLES};
    use crate::header::{DEFAULT_HEADER, has_header};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    fn header_check(config: &KConfig) {
        let text = config.to_string();
        let (ok, header) = has_header(&text, DEFAULT_HEADER);
        assert!(ok);
        assert_eq!(header, DEFAULT_HEADER);
    }

    // --- builder state ---

    #[test]
    fn defaults() {
        let builder = Scanner::builder();
        assert_eq!(builder.options(), &ScanOptions::default());
        assert!(builder.fetcher.is_none());
    }

    #[test]
    fn setters_fill_options() {
        let builder = Scanner::builder()
            .directories(["/oem", "/usr/local/cloud-config"])
            .add_directory(SearchPath::Cwd)
            .merge_boot_line(true)
            .boot_cmdline_file("/tmp/cmdline")
            .strict_validation(true)
            .suppress_logs(true)
            .recursive(true)
            .require_header(true)
            .boot_roots(["options", "install"])
            .fetch_timeout(Duration::from_secs(5))
            .no_header();
        let o = builder.options();
        assert_eq!(
            o.directories,
            vec![
                SearchPath::from("/oem"),
                SearchPath::from("/usr/local/cloud-config"),
                SearchPath::Cwd,
            ]
        );
        assert!(o.merge_boot_line);
        assert_eq!(o.boot_cmdline_file, PathBuf::from("/tmp/cmdline"));
        assert!(o.strict_validation && o.suppress_logs && o.recursive && o.require_header);
        assert_eq!(o.boot_roots, vec!["options".to_string(), "install".to_string()]);
        assert_eq!(o.fetch_timeout, Duration::from_secs(5));
        assert_eq!(o.header, None);
    }

    #[test]
    fn boot_line_ignored_unless_merged() {
        let builder = Scanner::builder().boot_line("options.foo=bar");
        assert_eq!(builder.effective_boot_line().unwrap(), None);
        let builder = builder.merge_boot_line(true);
        assert_eq!(
            builder.effective_boot_line().unwrap().as_deref(),
            Some("options.foo=bar")
        );
    }

    #[test]
    fn custom_fetcher_is_preferred() {
        let builder = Scanner::builder().fetcher(MapFetcher::default().with("https://a/b", "x: 1\n"));
        let fetcher = builder.into_fetcher().unwrap();
        assert_eq!(fetcher.fetch("https://a/b").unwrap(), b"x: 1\n".to_vec());
    }

    // --- end to end ---

    #[test]
    fn reads_boot_cmdline_file() {
        let dir = TempDir::new().unwrap();
        let cmdline = dir.path().join("cmdline");
        fs::write(&cmdline, "zz.foo=\"baa\" options.foo=bar").unwrap();

        let config = Scanner::builder()
            .merge_boot_line(true)
            .boot_cmdline_file(&cmdline)
            .suppress_logs(true)
            .load()
            .unwrap();
        assert_eq!(config.options("foo").as_deref(), Some("bar"));
        assert_eq!(config.query("options").unwrap(), "foo: bar\n");
        assert_eq!(config.query("options.foo").unwrap(), "bar\n");
        header_check(&config);
    }

    #[test]
    fn reads_multiple_config_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "test.yaml", "#kairos-config\nbaz: bar\nkairos:\n  network_token: foo\n");
        write(&dir, "b.yaml", "b: f\nc: d\n");

        let config = Scanner::builder()
            .directories([dir.path()])
            .suppress_logs(true)
            .load()
            .unwrap();
        let provider: ProviderConfig = config.decode().unwrap();
        assert_eq!(provider.kairos.network_token, "foo");
        assert_eq!(config.data()["b"].as_str(), Some("f"));
        assert_eq!(config.data()["c"].as_str(), Some("d"));
        assert_eq!(config.data()["baz"].as_str(), Some("bar"));
        header_check(&config);
    }

    #[test]
    fn greedy_scan_merges_around_tab_indented_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "test.yaml", "#kairos-config\nbaz: bar\nkairos:\n  network_token: foo\n");
        write(&dir, "b.yaml", "\nfooz:\n\t\t\t");
        write(&dir, "more-kairos.yaml", "\nkairos:\n  other_key: test\n");

        let config = Scanner::builder()
            .directories([dir.path()])
            .suppress_logs(true)
            .strict_validation(false)
            .load()
            .unwrap();
        let provider: ProviderConfig = config.decode().unwrap();
        assert_eq!(provider.kairos.network_token, "foo");
        assert_eq!(provider.kairos.other_key, "test");
        assert_eq!(config.data()["baz"].as_str(), Some("bar"));
        assert_eq!(config.skipped().len(), 1);
        assert!(config.skipped()[0].path.ends_with("b.yaml"));
        assert_eq!(config.sources().len(), 2);
        header_check(&config);
    }

    #[test]
    fn greedy_scan_keeps_valid_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "test.yaml", "#kairos-config\nbaz: bar\nkairos:\n  network_token: foo\n");
        write(&dir, "b.yaml", "zz.foo=\"baa\" options.foo=bar");

        let config = Scanner::builder()
            .directories([dir.path()])
            .suppress_logs(true)
            .strict_validation(false)
            .load()
            .unwrap();
        let provider: ProviderConfig = config.decode().unwrap();
        assert_eq!(provider.kairos.network_token, "foo");
        assert_eq!(config.skipped().len(), 1);
        header_check(&config);
    }

    #[test]
    fn merges_with_boot_line() {
        let dir = TempDir::new().unwrap();
        write(&dir, "test.yaml", "#kairos-config\nbaz: bar\nkairos:\n  network_token: foo\n");
        write(&dir, "b.yaml", "bb:\n  nothing: foo\n");
        let cmdline = dir.path().join("cmdline");
        fs::write(&cmdline, "zz.foo=\"baa\" options.foo=bar").unwrap();

        // The cmdline file lives in the scanned directory; as YAML it is a
        // plain scalar and gets skipped like any other non-mapping file.
        let config = Scanner::builder()
            .directories([dir.path()])
            .merge_boot_line(true)
            .boot_cmdline_file(&cmdline)
            .suppress_logs(true)
            .load()
            .unwrap();
        assert_eq!(config.options("foo").as_deref(), Some("bar"));
        let provider: ProviderConfig = config.decode().unwrap();
        assert_eq!(provider.kairos.network_token, "foo");
        assert!(!config.data().contains_key("zz"));
        assert!(config.data().contains_key("bb"));
        header_check(&config);
    }

    #[test]
    fn missing_cmdline_file_tolerated_unless_strict() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("cmdline");

        let config = Scanner::builder()
            .merge_boot_line(true)
            .boot_cmdline_file(&missing)
            .suppress_logs(true)
            .load()
            .unwrap();
        assert!(config.data().is_empty());

        let result = Scanner::builder()
            .merge_boot_line(true)
            .boot_cmdline_file(&missing)
            .strict_validation(true)
            .load();
        assert!(matches!(result, Err(KConfigError::BootLineIo { .. })));
    }

    #[test]
    fn reads_config_from_url() {
        let dir = TempDir::new().unwrap();
        let local = "\nconfig_url: \"https://example.com/test.yaml\"\n";
        write(&dir, "test.yaml", local);

        let config = Scanner::builder()
            .directories([dir.path()])
            .fetcher(MapFetcher::default().with("https://example.com/test.yaml", REMOTE_BUNDLES))
            .suppress_logs(true)
            .strict_validation(false)
            .load()
            .unwrap();
        let bundles = config.bundles().unwrap();
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].targets[0], "package:utils/edgevpn");
        assert_ne!(config.to_string(), local);
        header_check(&config);
    }

    #[test]
    fn later_directory_overrides_earlier() {
        let low = TempDir::new().unwrap();
        let high = TempDir::new().unwrap();
        write(&low, "a.yaml", "install:\n  device: /dev/sda\n  auto: true\n");
        write(&high, "a.yaml", "install:\n  device: /dev/vda\n");

        let config = Scanner::builder()
            .directories([low.path(), high.path()])
            .load()
            .unwrap();
        assert_eq!(config.query("install.device").unwrap(), "/dev/vda\n");
        assert_eq!(config.query("install.auto").unwrap(), "true\n");
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let config = Scanner::builder()
            .directories([dir.path().join("missing")])
            .load()
            .unwrap();
        assert!(config.data().is_empty());
    }

    #[test]
    fn scan_from_options() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "a: 1\n");
        let options = ScanOptions {
            directories: vec![SearchPath::from(dir.path())],
            ..ScanOptions::default()
        };
        let config = Scanner::scan(&options).unwrap();
        assert_eq!(config.data()["a"].as_i64(), Some(1));
    }

    // --- handle ---

    fn scanner(dir: &TempDir) -> ScanBuilder {
        Scanner::builder()
            .directories([dir.path()])
            .boot_line("options.foo=bar")
            .merge_boot_line(true)
            .suppress_logs(true)
    }

    #[test]
    fn handle_show() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "a: 1\n");
        let result = scanner(&dir).handle(&ScanAction::Show { json: false }).unwrap();
        assert_eq!(
            result,
            ScanResult::Document("#kairos-config\na: 1\noptions:\n  foo: bar\n".into())
        );
    }

    #[test]
    fn handle_get() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "a:\n  b: 1\n");
        let result = scanner(&dir)
            .handle(&ScanAction::Get { key: "a".into() })
            .unwrap();
        assert_eq!(result.to_string(), "b: 1");
    }

    #[test]
    fn handle_get_missing() {
        let dir = TempDir::new().unwrap();
        let result = scanner(&dir).handle(&ScanAction::Get { key: "nope".into() });
        assert!(matches!(result, Err(KConfigError::KeyNotFound(_))));
    }

    #[test]
    fn handle_options() {
        let dir = TempDir::new().unwrap();
        let result = scanner(&dir)
            .handle(&ScanAction::Options { key: "foo".into() })
            .unwrap();
        assert_eq!(result.to_string(), "bar");
    }

    #[test]
    fn handle_list() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "a: 1\n");
        let result = scanner(&dir).handle(&ScanAction::List).unwrap();
        assert_eq!(result.to_string(), "a = 1\noptions.foo = bar");
    }

    #[test]
    fn handle_find() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "a: 1\n");
        write(&dir, "b.yaml", "b: 1\n");
        let result = scanner(&dir).handle(&ScanAction::Find { key: "b".into() }).unwrap();
        let ScanResult::Paths(paths) = result else {
            panic!("expected paths");
        };
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("b.yaml"));
    }

    #[test]
    fn handle_bundles() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "bundles:\n  - targets:\n      - package:utils/edgevpn\n");
        let result = scanner(&dir).handle(&ScanAction::Bundles).unwrap();
        assert_eq!(result.to_string(), "package:utils/edgevpn");
    }
}
