//! Error types for the docx2discord library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Docx2DiscordError`] is **fatal**: the conversion or delivery cannot
//!   proceed at all (bad input file, corrupt archive, invalid webhook).
//!   Returned as `Err(Docx2DiscordError)` from the top-level functions.
//!
//! * [`GroupError`] is **non-fatal**: a single message group failed to be
//!   delivered. Stored inside [`crate::delivery::DeliveryReport`] so callers
//!   see exactly which groups went out and which did not.
//!
//! Transcription itself has no error type: a malformed document degrades to
//! fewer or placeholder blocks, it never fails the run.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docx2discord library.
///
/// Per-group delivery failures use [`GroupError`] and are stored in
/// [`crate::delivery::DeliveryReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Docx2DiscordError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("DOCX file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were read, but they are not a ZIP container.
    #[error("Input is not a valid DOCX file: '{source_name}'\nFirst bytes: {magic:?}")]
    NotADocx { source_name: String, magic: Vec<u8> },

    // ── Document errors ───────────────────────────────────────────────────
    /// The archive or one of its XML parts cannot be parsed.
    #[error("DOCX is corrupt: {detail}")]
    CorruptDocx { detail: String },

    /// The injected image store could not persist an embedded image.
    #[error("Failed to store embedded image '{name}': {source}")]
    ImageStoreFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── Delivery errors ───────────────────────────────────────────────────
    /// The webhook URL is unusable before any request is made.
    #[error("Invalid webhook URL: {reason}")]
    InvalidWebhook { reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single message group.
///
/// `index` is 1-based so it reads naturally next to `total` ("3/7").
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum GroupError {
    /// The group's image file could not be opened; the group was skipped.
    #[error("Group {index}/{total}: failed to open image '{path}': {detail}")]
    ImageUnreadable {
        index: usize,
        total: usize,
        path: PathBuf,
        detail: String,
    },

    /// The webhook answered with a non-success status; delivery stopped.
    #[error("Group {index}/{total}: HTTP {status}: {body}")]
    HttpStatus {
        index: usize,
        total: usize,
        status: u16,
        body: String,
    },

    /// The request never got a response; delivery stopped.
    #[error("Group {index}/{total}: request failed: {detail}")]
    Transport {
        index: usize,
        total: usize,
        detail: String,
    },
}

impl GroupError {
    /// Whether this failure stops the remaining groups from being sent.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, GroupError::ImageUnreadable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display() {
        let e = GroupError::HttpStatus {
            index: 3,
            total: 7,
            status: 404,
            body: "Unknown Webhook".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("3/7"), "got: {msg}");
        assert!(msg.contains("404"));
        assert!(msg.contains("Unknown Webhook"));
    }

    #[test]
    fn image_unreadable_is_not_fatal() {
        let e = GroupError::ImageUnreadable {
            index: 1,
            total: 2,
            path: PathBuf::from("/tmp/img_0.png"),
            detail: "No such file".into(),
        };
        assert!(!e.is_fatal());
        assert!(e.to_string().contains("/tmp/img_0.png"));
    }

    #[test]
    fn transport_is_fatal() {
        let e = GroupError::Transport {
            index: 1,
            total: 1,
            detail: "connection refused".into(),
        };
        assert!(e.is_fatal());
    }

    #[test]
    fn not_a_docx_display() {
        let e = Docx2DiscordError::NotADocx {
            source_name: "notes.txt".into(),
            magic: b"hell".to_vec(),
        };
        assert!(e.to_string().contains("notes.txt"));
    }
}
