//! Document attachments for chat messages and file summaries
//!
//! Only PDF, Word and plain-text documents up to 10 MB are accepted. Checks
//! run before any bytes leave the machine; an oversized file is rejected
//! from its metadata without being read.

use std::path::Path;

use bytes::Bytes;

use crate::error::{Result, SynopsisError};

/// Accepted file extensions (lowercase, with dot)
pub const ALLOWED_EXTENSIONS: [&str; 4] = [".pdf", ".doc", ".docx", ".txt"];

/// Accepted MIME types
pub const ALLOWED_MIME_TYPES: [&str; 4] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "text/plain",
];

/// Upload size cap
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// A validated file ready for multipart upload
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub content: Bytes,
}

impl Attachment {
    /// Read and validate a file from disk
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::Attachment`] for a disallowed type or a file
    /// larger than `max_bytes`, and [`SynopsisError::Io`] if it cannot be
    /// read.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                SynopsisError::Attachment(format!("Not a file: {}", path.display()))
            })?;
        let content_type = guess_content_type(&file_name);

        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(SynopsisError::Attachment(format!("Not a file: {}", path.display())).into());
        }
        validate(&file_name, Some(&content_type), metadata.len(), max_bytes)?;

        let content = Bytes::from(std::fs::read(path)?);
        // The file may have grown between stat and read.
        validate(&file_name, Some(&content_type), content.len() as u64, max_bytes)?;

        tracing::debug!(file = %file_name, bytes = content.len(), "Attachment loaded");
        Ok(Self {
            file_name,
            content_type,
            content,
        })
    }

    /// Build from in-memory bytes (validated the same way)
    pub fn from_bytes(
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
        max_bytes: u64,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let content = content.into();
        let content_type = guess_content_type(&file_name);
        validate(&file_name, Some(&content_type), content.len() as u64, max_bytes)?;
        Ok(Self {
            file_name,
            content_type,
            content,
        })
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Lowercased extension including the dot, e.g. `.pdf`
pub fn extension_of(file_name: &str) -> Option<String> {
    file_name
        .rfind('.')
        .filter(|&idx| idx + 1 < file_name.len())
        .map(|idx| file_name[idx..].to_lowercase())
}

fn format_limit(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else {
        format!("{} bytes", bytes)
    }
}

fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Check name, declared MIME type and size against the allow-list
///
/// The extension must be allowed. A declared MIME type, when specific, must
/// be allowed too; `application/octet-stream` is treated as undeclared.
pub fn validate(
    file_name: &str,
    content_type: Option<&str>,
    size: u64,
    max_bytes: u64,
) -> Result<()> {
    let extension_ok = extension_of(file_name)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    let mime_ok = match content_type {
        None | Some("application/octet-stream") => true,
        Some(mime) => ALLOWED_MIME_TYPES.contains(&mime),
    };

    if !extension_ok || !mime_ok {
        return Err(SynopsisError::Attachment(
            "Only PDF, DOC, DOCX and TXT files are supported".to_string(),
        )
        .into());
    }

    if size > max_bytes {
        return Err(SynopsisError::Attachment(format!(
            "File must not be larger than {}",
            format_limit(max_bytes)
        ))
        .into());
    }

    Ok(())
}
