//! Reading source text for listings

use std::fs;
use std::io;
use std::path::Path;

/// Supplies the text of a source file, one string per line
///
/// Line terminators are not included. Implementations other than
/// [`FsSourceReader`] exist mostly for tests.
pub trait SourceReader {
    /// # Errors
    /// Returns an error if the file cannot be read
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Reads sources from the local filesystem
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so
/// listings of Latin-1 sources still work.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect())
    }
}

impl<T: SourceReader + ?Sized> SourceReader for &T {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        (**self).read_lines(path)
    }
}
