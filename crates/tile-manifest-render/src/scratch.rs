// crates/tile-manifest-render/src/scratch.rs
// ============================================================================
// Module: Scratch Config File
// Description: Uniquely named `.yml` file holding one render request.
// Purpose: Own the renderer config file for exactly one render call.
// Dependencies: tempfile, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! The renderer only accepts config files with a `.yml` extension. The file
//! is allocated with that suffix up front, so no rename is needed, and it is
//! deleted when the [`ScratchConfigFile`] drops. [`ScratchConfigFile::remove`]
//! deletes eagerly and reports failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::Builder;
use tempfile::NamedTempFile;
use thiserror::Error;
use tile_manifest_core::ManifestValue;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name prefix for scratch config files.
const SCRATCH_PREFIX: &str = "ops-manifest-config-";
/// Extension required by the renderer.
const SCRATCH_SUFFIX: &str = ".yml";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scratch file failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScratchFileError {
    /// The file could not be allocated.
    #[error("unable to create scratch config file: {0}")]
    Create(String),
    /// The config could not be serialized or written.
    #[error("unable to write scratch config file {path}: {message}")]
    Write {
        /// File path.
        path: PathBuf,
        /// Failure text.
        message: String,
    },
    /// The file could not be deleted.
    #[error("unable to remove scratch config file {path}: {message}")]
    Remove {
        /// File path.
        path: PathBuf,
        /// Failure text.
        message: String,
    },
}

// ============================================================================
// SECTION: Scratch File
// ============================================================================

/// Temporary renderer config file, deleted on drop.
#[derive(Debug)]
pub struct ScratchConfigFile {
    /// Underlying temp file handle.
    file: NamedTempFile,
}

impl ScratchConfigFile {
    /// Allocates a scratch file in `dir` (system temp dir when `None`) and
    /// writes `document` to it as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ScratchFileError`] when allocation, serialization, or the
    /// write fails. Any partially written file is removed.
    pub fn create(dir: Option<&Path>, document: &ManifestValue) -> Result<Self, ScratchFileError> {
        let mut builder = Builder::new();
        builder.prefix(SCRATCH_PREFIX).suffix(SCRATCH_SUFFIX);
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|err| ScratchFileError::Create(err.to_string()))?;

        let mut scratch = Self {
            file,
        };
        scratch.write_document(document)?;
        Ok(scratch)
    }

    /// Returns the on-disk path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Deletes the file now.
    ///
    /// # Errors
    ///
    /// Returns [`ScratchFileError::Remove`] when deletion fails.
    pub fn remove(self) -> Result<(), ScratchFileError> {
        let path = self.file.path().to_path_buf();
        self.file.close().map_err(|err| ScratchFileError::Remove {
            path,
            message: err.to_string(),
        })
    }

    /// Serializes and flushes the document.
    fn write_document(&mut self, document: &ManifestValue) -> Result<(), ScratchFileError> {
        let path = self.file.path().to_path_buf();
        let write_error = |message: String| ScratchFileError::Write {
            path: path.clone(),
            message,
        };
        let text = serde_yaml::to_string(document).map_err(|err| write_error(err.to_string()))?;
        let handle = self.file.as_file_mut();
        handle.write_all(text.as_bytes()).map_err(|err| write_error(err.to_string()))?;
        handle.flush().map_err(|err| write_error(err.to_string()))
    }
}
