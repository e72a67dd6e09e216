//! Match a user-supplied source path against the files recorded in a binary.
//!
//! Candidates are the recorded files whose filename equals the requested
//! basename. A unique candidate is trusted outright. When several share it,
//! trailing components of their recorded directories are compared one level
//! at a time, from the innermost outwards, until a single candidate is left.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::{normalized_components, SourceFileKey};

/// Outcome of resolving a requested path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Resolved(&'a SourceFileKey),
    /// No recorded file matches the basename, or none matches the directories
    NotReferenced,
    /// The requested directories ran out with this many candidates left
    Ambiguous { candidates: usize },
}

/// Basename lookup over a fixed set of source file keys
#[derive(Debug, Default)]
pub struct FileResolver<'a> {
    by_basename: HashMap<String, Vec<&'a SourceFileKey>>,
}

impl<'a> FileResolver<'a> {
    pub fn new(keys: impl IntoIterator<Item = &'a SourceFileKey>) -> Self {
        let mut by_basename: HashMap<String, Vec<&'a SourceFileKey>> = HashMap::new();
        for key in keys {
            by_basename.entry(key.filename.clone()).or_default().push(key);
        }
        Self { by_basename }
    }

    /// Every known key whose recorded filename is exactly `basename`
    #[must_use]
    pub fn candidates(&self, basename: &str) -> &[&'a SourceFileKey] {
        self.by_basename.get(basename).map_or(&[][..], Vec::as_slice)
    }

    /// Resolve `requested` to exactly one key
    ///
    /// Each round takes the last remaining component of the requested
    /// directory and keeps the candidates whose own last remaining directory
    /// component is equal to it. Components are compared whole, never as
    /// substrings.
    #[must_use]
    pub fn resolve(&self, requested: &Path) -> Resolution<'a> {
        let Some(basename) = requested.file_name() else {
            return Resolution::NotReferenced;
        };

        let candidates = self.candidates(&basename.to_string_lossy());
        match candidates {
            [] => return Resolution::NotReferenced,
            [only] => return Resolution::Resolved(*only),
            _ => {}
        }

        let mut requested_dir = requested.parent().map(normalized_components).unwrap_or_default();
        let mut survivors: Vec<(&'a SourceFileKey, Vec<String>)> =
            candidates.iter().map(|key| (*key, key.directory_components())).collect();

        loop {
            let Some(component) = requested_dir.pop() else {
                return Resolution::Ambiguous { candidates: survivors.len() };
            };

            survivors.retain_mut(|(_, directory)| directory.pop().as_deref() == Some(&*component));

            match survivors.as_slice() {
                [] => return Resolution::NotReferenced,
                [(key, _)] => return Resolution::Resolved(*key),
                _ => {}
            }
        }
    }
}
