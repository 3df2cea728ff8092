use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Whole-file replacement with verification of the text being replaced.
///
/// A patch is applied to text read earlier; the edit refuses to write if
/// the file changed in between.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "FileEdit does nothing until apply() is called"]
pub struct FileEdit {
    pub file: PathBuf,
    pub new_text: String,
    /// `None` writes unconditionally, creating the file if needed.
    pub expected_before: Option<ContentCheck>,
}

/// How the current file contents are checked before writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentCheck {
    ExactMatch(String),
    /// xxh3 hash of the expected contents
    Hash(u64),
}

impl ContentCheck {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            ContentCheck::ExactMatch(expected) => text == expected,
            ContentCheck::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Exact text for small files, a hash above 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            ContentCheck::Hash(xxh3_64(text.as_bytes()))
        } else {
            ContentCheck::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{file} changed since it was read; refusing to overwrite")]
    ContentMismatch { file: PathBuf },

    #[error("file I/O error on {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file} is not valid UTF-8: {source}")]
    Utf8 {
        file: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/unchanged"]
pub enum EditResult {
    Applied { file: PathBuf, bytes_written: usize },
    /// The file already holds the new text.
    Unchanged { file: PathBuf },
}

impl FileEdit {
    pub fn new(
        file: impl Into<PathBuf>,
        expected_before: &str,
        new_text: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            new_text: new_text.into(),
            expected_before: Some(ContentCheck::from_text(expected_before)),
        }
    }

    /// Write `new_text` to `file` whatever it currently holds.
    pub fn create(file: impl Into<PathBuf>, new_text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            new_text: new_text.into(),
            expected_before: None,
        }
    }

    /// Check the current contents, then replace them atomically.
    ///
    /// Uses tempfile + fsync + rename, then bumps the mtime so watchers
    /// and build tools notice the change.
    pub fn apply(&self) -> Result<EditResult, EditError> {
        let current = match fs::read(&self.file) {
            Ok(bytes) => Some(String::from_utf8(bytes).map_err(|source| EditError::Utf8 {
                file: self.file.clone(),
                source,
            })?),
            Err(err) if err.kind() == ErrorKind::NotFound && self.expected_before.is_none() => None,
            Err(source) => return Err(self.io_error(source)),
        };

        if current.as_deref() == Some(self.new_text.as_str()) {
            return Ok(EditResult::Unchanged {
                file: self.file.clone(),
            });
        }
        if let (Some(check), Some(current)) = (&self.expected_before, &current) {
            if !check.matches(current) {
                return Err(EditError::ContentMismatch {
                    file: self.file.clone(),
                });
            }
        }

        atomic_write(&self.file, self.new_text.as_bytes()).map_err(|e| self.io_error(e))?;
        filetime::set_file_mtime(&self.file, filetime::FileTime::now())
            .map_err(|e| self.io_error(e))?;

        Ok(EditResult::Applied {
            file: self.file.clone(),
            bytes_written: self.new_text.len(),
        })
    }

    fn io_error(&self, source: std::io::Error) -> EditError {
        EditError::Io {
            file: self.file.clone(),
            source,
        }
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or nothing changes.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Same directory, so the rename stays on one filesystem.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
