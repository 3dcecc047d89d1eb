//! Upload storage
//!
//! Uploaded files are written under a single directory using sanitized
//! names, so a client-supplied name can never escape it.

use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Spreadsheet extensions accepted for the recipients file
pub const RECIPIENT_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Extensions accepted for the attachment
pub const ATTACHMENT_EXTENSIONS: &[&str] =
    &["pdf", "jpg", "jpeg", "png", "gif", "doc", "docx", "txt"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file name {0:?} is invalid")]
    InvalidName(String),

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether `file_name` ends in one of `allowed` (case-insensitive)
pub fn allowed_extension(file_name: &str, allowed: &[&str]) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Reduces a client-supplied file name to a safe basename
///
/// Keeps ASCII letters, digits, `.`, `_` and `-`; whitespace becomes `_`.
/// Directory parts and leading dots are dropped. Returns an empty string
/// when nothing usable is left.
pub fn secure_filename(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Directory holding uploaded files
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the directory if missing
    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Writes an upload and returns where it was stored
    ///
    /// A file with the same sanitized name is overwritten.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, UploadError> {
        let safe = secure_filename(file_name);
        if safe.is_empty() {
            return Err(UploadError::InvalidName(file_name.to_string()));
        }

        self.ensure_dir().await?;
        let path = self.dir.join(&safe);
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extension() {
        assert!(allowed_extension("contacts.xlsx", RECIPIENT_EXTENSIONS));
        assert!(allowed_extension("CONTACTS.XLS", RECIPIENT_EXTENSIONS));
        assert!(!allowed_extension("contacts.csv", RECIPIENT_EXTENSIONS));
        assert!(!allowed_extension("xlsx", RECIPIENT_EXTENSIONS));
        assert!(allowed_extension("flyer.final.PDF", ATTACHMENT_EXTENSIONS));
        assert!(!allowed_extension("run.exe", ATTACHMENT_EXTENSIONS));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Contacts.xlsx"), "My_Contacts.xlsx");
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\list.xls"), "list.xls");
        assert_eq!(secure_filename(".hidden.txt"), "hidden.txt");
        assert_eq!(secure_filename("résumé.pdf"), "rsum.pdf");
        assert_eq!(secure_filename("../.."), "");
    }

    #[tokio::test]
    async fn test_save_creates_directory() {
        let root = tempfile::tempdir().unwrap();
        let store = UploadStore::new(root.path().join("uploads"));

        let path = store.save("../list one.xlsx", b"data").await.unwrap();

        assert_eq!(path, root.path().join("uploads").join("list_one.xlsx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_save_rejects_unusable_name() {
        let root = tempfile::tempdir().unwrap();
        let store = UploadStore::new(root.path());

        let err = store.save("///", b"data").await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidName(_)));
    }
}
