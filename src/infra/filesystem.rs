//! Filesystem operations
//!
//! Async file and directory helpers that report failures as
//! [`FilesystemError`] with the offending path.

use std::path::Path;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub async fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| FilesystemError::CreateDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

/// Write content to a file, creating parent directories as needed
pub async fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| FilesystemError::WriteFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

/// Read content from a file
pub async fn read_file(path: &Path) -> Result<String, FilesystemError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FilesystemError::ReadFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

/// Replace `path` with `content` atomically
///
/// The content is written to a sibling temporary file which is then renamed
/// over the target, so readers never observe a partially written file.
pub async fn replace_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    write_file(&tmp, content).await?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| FilesystemError::WriteFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/c.txt");

        write_file(&path, "hello").await.unwrap();
        assert_eq!(read_file(&path).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_replace_file_overwrites_and_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cackle.toml");
        write_file(&path, "old").await.unwrap();

        replace_file(&path, "new").await.unwrap();

        assert_eq!(read_file(&path).await.unwrap(), "new");
        assert!(!temp.path().join(".cackle.toml.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.txt");

        let err = read_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }
}
