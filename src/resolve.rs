//! Core scan pipeline: parse, merge, resolve remote, apply the boot line.
//!
//! Operates on pre-read data (`ResolveInput`) with no filesystem access,
//! making the whole pipeline testable with synthetic inputs. Steps:
//!
//! 1. Parse each file; unparsable ones are skipped
//! 2. Drop files without a header (if a header is required)
//! 3. Pick the document header: first seen wins
//! 4. Deep-merge the trees (later overrides earlier)
//! 5. Expand `config_url` through the fetcher
//! 6. Deep-merge the boot line on top, restricted to the boot roots
//! 7. Fall back to the configured header if no source had one

use std::path::PathBuf;

use crate::bootline;
use crate::diag::scan_warn;
use crate::document::{KConfig, ParsedDocument, parse_document};
use crate::error::KConfigError;
use crate::header;
use crate::merge::{merge_all, merge_scoped};
use crate::remote::{self, Fetcher};
use crate::types::{DEFAULT_BOOT_ROOTS, SkippedFile};

/// All pre-read data needed to produce a [`KConfig`]. No I/O happens here.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveInput {
    /// File contents in merge order: first = lowest priority, last = highest.
    pub files: Vec<(PathBuf, String)>,
    /// Files already discarded while reading.
    pub skipped: Vec<SkippedFile>,
    /// Raw boot cmdline to merge last. `None` means no boot line merge.
    pub boot_line: Option<String>,
    /// Root keys the boot line may set.
    pub boot_roots: Vec<String>,
    /// Header used when no source has one.
    pub header: Option<String>,
    /// Only merge files whose first line is a recognized header.
    pub require_header: bool,
    pub strict: bool,
    pub suppress_logs: bool,
}

impl Default for ResolveInput {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            skipped: Vec::new(),
            boot_line: None,
            boot_roots: DEFAULT_BOOT_ROOTS.iter().map(|r| r.to_string()).collect(),
            header: Some(header::DEFAULT_HEADER.to_string()),
            require_header: false,
            strict: false,
            suppress_logs: false,
        }
    }
}

/// Produce the merged document from pre-read inputs.
pub fn resolve(input: ResolveInput, fetcher: Option<&dyn Fetcher>) -> Result<KConfig, KConfigError> {
    let quiet = input.suppress_logs;
    let recognized = header::recognized_headers(input.header.as_deref());
    let mut skipped = input.skipped;
    let mut sources = Vec::new();
    let mut trees = Vec::new();
    let mut first_header: Option<String> = None;

    // 1-3: Parse, filter, pick the header
    for (path, content) in input.files {
        let parsed = match parse_document(&content, &recognized) {
            Ok(parsed) => parsed,
            Err(e) => {
                let err = KConfigError::ParseError {
                    path: path.clone(),
                    source: e,
                };
                scan_warn!(quiet, error = %err, "skipping file");
                skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if input.require_header && parsed.header.is_none() {
            tracing::debug!(path = %path.display(), "skipping file without header");
            skipped.push(SkippedFile {
                path,
                reason: "no recognized header".into(),
            });
            continue;
        }

        if let Some(found) = parsed.header {
            match &first_header {
                None => first_header = Some(found),
                Some(first) if *first != found => {
                    let conflict = KConfigError::HeaderConflict {
                        first: first.clone(),
                        second: found,
                        path: path.clone(),
                    };
                    if input.strict {
                        return Err(conflict);
                    }
                    scan_warn!(quiet, "{conflict}");
                }
                Some(_) => {}
            }
        }

        tracing::debug!(path = %path.display(), "merging file");
        sources.push(path);
        trees.push(parsed.tree);
    }

    // 4: Merge in order
    let merged = ParsedDocument {
        header: first_header,
        tree: merge_all(trees),
    };

    // 5: Remote indirection
    let resolved = remote::resolve_remote(merged, fetcher, input.strict, quiet, &recognized)?;

    // 6: Boot line on top, scoped
    let tree = match &input.boot_line {
        Some(line) => {
            let boot = bootline::parse_boot_line(line, &input.boot_roots);
            merge_scoped(resolved.tree, boot, &input.boot_roots)
        }
        None => resolved.tree,
    };

    // 7: Default header
    let header = resolved.header.or(input.header);

    Ok(KConfig::new(header, tree).with_diagnostics(sources, skipped))
}
