use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::dump::IndexDump;
use super::source::{FsSourceReader, SourceReader};
use crate::domain::{QueryError, RenderRecord, SourceFileKey};
use crate::index::{AddressIndex, LineTable};
use crate::resolver::{FileResolver, Resolution};

/// Listing of one file produced by [`QueryEngine::render_directory`]
#[derive(Debug)]
pub struct DirectoryEntry {
    /// Path the listing was attempted for
    pub path: PathBuf,
    pub outcome: Result<Vec<RenderRecord>, QueryError>,
}

/// Read-only queries over a built [`AddressIndex`]
///
/// Every query resolves its input path through a [`FileResolver`] first.
/// Resolution failures are returned as [`QueryError`]s and never affect
/// other queries.
pub struct QueryEngine<'a, S = FsSourceReader> {
    index: &'a AddressIndex,
    resolver: FileResolver<'a>,
    source: S,
}

impl<'a> QueryEngine<'a> {
    /// Engine reading source text from the filesystem
    #[must_use]
    pub fn new(index: &'a AddressIndex) -> Self {
        Self::with_source_reader(index, FsSourceReader)
    }
}

impl<'a, S: SourceReader> QueryEngine<'a, S> {
    pub fn with_source_reader(index: &'a AddressIndex, source: S) -> Self {
        Self { index, resolver: FileResolver::new(index.keys()), source }
    }

    #[must_use]
    pub fn index(&self) -> &'a AddressIndex {
        self.index
    }

    /// Resolve a requested path to the key it refers to
    ///
    /// # Errors
    /// [`QueryError::FileNotReferenced`] or [`QueryError::AmbiguousFile`]
    pub fn resolve(&self, path: &Path) -> Result<&'a SourceFileKey, QueryError> {
        match self.resolver.resolve(path) {
            Resolution::Resolved(key) => {
                debug!("{} resolved to {key}", path.display());
                Ok(key)
            }
            Resolution::NotReferenced => {
                Err(QueryError::FileNotReferenced(path.display().to_string()))
            }
            Resolution::Ambiguous { candidates } => {
                Err(QueryError::AmbiguousFile { path: path.display().to_string(), candidates })
            }
        }
    }

    /// Per-line table of the file `path` refers to
    ///
    /// # Errors
    /// Fails if `path` does not resolve to exactly one indexed file
    pub fn lines_for_file(&self, path: &Path) -> Result<&'a LineTable, QueryError> {
        let key = self.resolve(path)?;
        self.index
            .get(key)
            .ok_or_else(|| QueryError::FileNotReferenced(path.display().to_string()))
    }

    /// Addresses recorded for one line, in index order
    ///
    /// A line without entries yields an empty list, not an error.
    ///
    /// # Errors
    /// Fails if `path` does not resolve to exactly one indexed file
    pub fn addresses_for_file_line(&self, path: &Path, line: u64) -> Result<Vec<u64>, QueryError> {
        let table = self.lines_for_file(path)?;
        Ok(table.get(line).unwrap_or_default().iter().map(|entry| entry.address).collect())
    }

    /// Annotated listing of a source file
    ///
    /// One primary record per physical line (with the first mapped address,
    /// if any), each followed by a satellite record for every further entry
    /// of that line. The path is resolved before the source is read.
    ///
    /// # Errors
    /// Fails if `path` does not resolve, or if its text cannot be read
    pub fn render_file(&self, path: &Path) -> Result<Vec<RenderRecord>, QueryError> {
        let table = self.lines_for_file(path)?;
        let text = self.source.read_lines(path).map_err(|source| {
            QueryError::SourceUnavailable { path: path.display().to_string(), source }
        })?;

        let mut records = Vec::with_capacity(text.len());
        for (line_number, source_text) in (1u64..).zip(text) {
            match table.get(line_number) {
                Some([first, rest @ ..]) => {
                    records.push(RenderRecord::primary(line_number, *first, source_text));
                    records.extend(rest.iter().copied().map(RenderRecord::satellite));
                }
                _ => records.push(RenderRecord::unmapped(line_number, source_text)),
            }
        }
        Ok(records)
    }

    /// Listings for every indexed file, recreated under `root`
    ///
    /// Each key's recorded directory and filename are joined onto `root`
    /// (an absolute recorded directory replaces `root`). A file that fails
    /// to resolve or read is reported in its own entry and the walk goes on.
    pub fn render_directory<'q>(
        &'q self,
        root: &'q Path,
    ) -> impl Iterator<Item = DirectoryEntry> + 'q {
        // Shorten 'a to 'q so the iterator only captures 'q
        let engine: &'q QueryEngine<'q, S> = self;
        engine.index.keys().map(move |key| {
            let path = root.join(&key.directory).join(&key.filename);
            let outcome = engine.render_file(&path);
            if let Err(ref err) = outcome {
                warn!("Skipping {}: {err}", path.display());
            }
            DirectoryEntry { path, outcome }
        })
    }

    /// Full structural export of the index
    #[must_use]
    pub fn dump_all(&self) -> IndexDump {
        IndexDump::from_index(self.index)
    }
}
