//! Signature replacement over in-memory buffers and files on disk.
//!
//! The buffer-level operation is a single left-to-right pass: find every
//! non-overlapping occurrence of the source signature, then rebuild the
//! buffer with the target signature spliced in at each match. The file-level
//! operation reads the whole input, patches it, and writes the result
//! atomically; the input file is never modified.

use crate::signature::Signature;
use memchr::memmem;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The replacement operation: every occurrence of `source` becomes `target`.
///
/// Scanning is non-overlapping - the cursor advances past a whole match
/// before searching resumes, so a matched region is never re-matched.
#[derive(Debug, Clone)]
pub struct Patcher {
    source: Signature,
    target: Signature,
}

/// Result of patching a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchOutcome carries the rebuilt buffer and the match count"]
pub struct PatchOutcome {
    /// The rebuilt buffer.
    pub data: Vec<u8>,
    /// Byte offset of each match in the *input* buffer, ascending.
    pub offsets: Vec<usize>,
}

impl PatchOutcome {
    pub fn replacements(&self) -> usize {
        self.offsets.len()
    }
}

impl Patcher {
    pub fn new(source: Signature, target: Signature) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> &Signature {
        &self.source
    }

    pub fn target(&self) -> &Signature {
        &self.target
    }

    /// Byte offsets of every occurrence of the source signature in `input`.
    pub fn scan(&self, input: &[u8]) -> Vec<usize> {
        find_occurrences(input, &self.source)
    }

    /// Replace every occurrence, preserving all other bytes in order.
    ///
    /// The output length is known up front (input length plus the per-match
    /// length delta), so the buffer is allocated exactly once.
    pub fn patch(&self, input: &[u8]) -> PatchOutcome {
        let offsets = self.scan(input);

        let capacity =
            input.len() + offsets.len() * self.target.len() - offsets.len() * self.source.len();
        let mut data = Vec::with_capacity(capacity);

        let mut cursor = 0;
        for &offset in &offsets {
            data.extend_from_slice(&input[cursor..offset]);
            data.extend_from_slice(self.target.as_bytes());
            cursor = offset + self.source.len();
        }
        data.extend_from_slice(&input[cursor..]);

        PatchOutcome { data, offsets }
    }
}

/// Byte offsets of every non-overlapping occurrence of `signature` in
/// `input`, scanned left to right.
pub fn find_occurrences(input: &[u8], signature: &Signature) -> Vec<usize> {
    memmem::find_iter(input, signature.as_bytes()).collect()
}

/// Report from patching one file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub replacements: usize,
}

/// Read `input` whole, patch it, and write the result to `output`.
///
/// The output goes through a tempfile in the destination directory, is
/// synced, then renamed into place, so a crash never leaves a half-written
/// file behind. The input file is left untouched.
pub fn patch_file(
    input: &Path,
    output: &Path,
    patcher: &Patcher,
) -> Result<FileReport, PatchError> {
    let content = fs::read(input).map_err(|source| PatchError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;

    let outcome = patcher.patch(&content);

    atomic_write(output, &outcome.data)?;

    Ok(FileReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        replacements: outcome.replacements(),
    })
}

/// Read `input` whole and return the offsets of every occurrence, without
/// writing anything.
pub fn scan_file(input: &Path, signature: &Signature) -> Result<Vec<usize>, PatchError> {
    let content = fs::read(input).map_err(|source| PatchError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;

    Ok(find_occurrences(&content, signature))
}

/// Default output path for an input: `_fixed` appended to the file stem,
/// extension preserved (`city_new.bin` becomes `city_new_fixed.bin`).
pub fn fixed_output_path(input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push("_fixed");
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), PatchError> {
    let write_err = |source| PatchError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    // A bare filename has an empty parent; the tempfile must still land on
    // the same filesystem as the destination.
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    temp.write_all(content).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
