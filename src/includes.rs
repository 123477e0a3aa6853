//! External file resolution for file-bodied resources (`spec.md` §5).
//!
//! Lookup order is the resource script's own directory first, then the
//! configured include directories in order; a miss is a hard error.

use std::path::{Path, PathBuf};

use crate::error::{CompileError, Result};

pub struct FileResolver<'a> {
    source_dir: PathBuf,
    include_directories: &'a [PathBuf],
}

impl<'a> FileResolver<'a> {
    pub fn new(source_path: &Path, include_directories: &'a [PathBuf]) -> Self {
        let source_dir = source_path.parent().map(Path::to_path_buf).unwrap_or_default();
        FileResolver { source_dir, include_directories }
    }

    /// Resolves `relative` to an actual file on disk, searching the source
    /// directory before the configured include directories (`spec.md` §5).
    /// An absolute path is used as-is.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let candidate = Path::new(relative);
        if candidate.is_absolute() {
            return if candidate.exists() {
                Ok(candidate.to_path_buf())
            } else {
                Err(CompileError::FileNotFound(relative.to_string()))
            };
        }
        let joined = self.source_dir.join(candidate);
        if joined.exists() {
            return Ok(joined);
        }
        for dir in self.include_directories {
            let joined = dir.join(candidate);
            if joined.exists() {
                return Ok(joined);
            }
        }
        Err(CompileError::FileNotFound(relative.to_string()))
    }

    /// Resolves and reads the file's contents in one step.
    pub fn read(&self, relative: &str) -> Result<Vec<u8>> {
        let path = self.resolve(relative)?;
        Ok(std::fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_hard_error() {
        let dirs = Vec::new();
        let resolver = FileResolver::new(Path::new("/nonexistent/dir/script.rc"), &dirs);
        assert!(resolver.resolve("nope.ico").is_err());
    }

    #[test]
    fn source_dir_is_searched_before_include_dirs() {
        let tmp = std::env::temp_dir().join("rescomp_includes_test_source_dir_order");
        std::fs::create_dir_all(&tmp).unwrap();
        let file = tmp.join("shared.ico");
        std::fs::write(&file, b"source-dir-version").unwrap();

        let include_dir = std::env::temp_dir().join("rescomp_includes_test_include_dir_order");
        std::fs::create_dir_all(&include_dir).unwrap();
        std::fs::write(include_dir.join("shared.ico"), b"include-dir-version").unwrap();

        let dirs = vec![include_dir.clone()];
        let resolver = FileResolver::new(&tmp.join("script.rc"), &dirs);
        let resolved = resolver.resolve("shared.ico").unwrap();
        assert_eq!(resolved, file);

        std::fs::remove_dir_all(&tmp).ok();
        std::fs::remove_dir_all(&include_dir).ok();
    }
}
