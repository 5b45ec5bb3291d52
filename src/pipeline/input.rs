//! Input resolution: turn a user-supplied path or URL into DOCX bytes.
//!
//! A DOCX file is a ZIP container, so both branches check for the local-file
//! header magic (`PK\x03\x04`) before returning. Callers then get a
//! meaningful error instead of a ZIP parser failure deep in the converter.

use crate::error::Docx2DiscordError;
use std::path::PathBuf;
use tracing::{debug, info};

/// ZIP local-file header.
pub const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// The resolved input document.
#[derive(Debug)]
pub struct ResolvedInput {
    /// File name (local) or last URL segment, for messages and logs.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to DOCX bytes.
///
/// If the input is a URL, download it. If it is a local file, validate it
/// exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, Docx2DiscordError> {
    let resolved = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };
    check_magic(&resolved.name, &resolved.bytes)?;
    Ok(resolved)
}

/// Reject anything that is not a ZIP container.
pub fn check_magic(name: &str, bytes: &[u8]) -> Result<(), Docx2DiscordError> {
    if bytes.len() < ZIP_MAGIC.len() || &bytes[..4] != ZIP_MAGIC {
        return Err(Docx2DiscordError::NotADocx {
            source_name: name.to_string(),
            magic: bytes.iter().take(4).copied().collect(),
        });
    }
    Ok(())
}

async fn read_local(path_str: &str) -> Result<ResolvedInput, Docx2DiscordError> {
    if path_str.trim().is_empty() {
        return Err(Docx2DiscordError::InvalidInput {
            input: path_str.to_string(),
        });
    }
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Docx2DiscordError::PermissionDenied { path });
        }
        Err(_) => return Err(Docx2DiscordError::FileNotFound { path }),
    };

    debug!("Read local DOCX: {} ({} bytes)", path.display(), bytes.len());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.to_string());
    Ok(ResolvedInput { name, bytes })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Docx2DiscordError> {
    info!("Downloading DOCX from: {}", url);

    let parsed = reqwest::Url::parse(url).map_err(|_| Docx2DiscordError::InvalidInput {
        input: url.to_string(),
    })?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Docx2DiscordError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(parsed.clone()).send().await.map_err(|e| {
        if e.is_timeout() {
            Docx2DiscordError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Docx2DiscordError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Docx2DiscordError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Docx2DiscordError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(ResolvedInput {
        name: filename_from_url(&parsed),
        bytes: bytes.to_vec(),
    })
}

/// Last non-empty path segment, or `downloaded.docx`.
fn filename_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back().map(str::to_string))
        .filter(|last| !last.is_empty())
        .unwrap_or_else(|| "downloaded.docx".to_string())
}
