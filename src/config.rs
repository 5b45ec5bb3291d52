//! Configuration types for conversion and delivery.
//!
//! Conversion behaviour is controlled through [`ConversionConfig`] and
//! webhook delivery through [`DeliveryConfig`], each built via its builder.
//! Keeping every knob in one struct makes it trivial to log a run's settings
//! and to share them between the CLI and library callers.

use crate::error::Docx2DiscordError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Discord rejects message content longer than this many characters.
pub const DISCORD_CONTENT_LIMIT: usize = 2000;

/// Default grouping budget, leaving headroom under [`DISCORD_CONTENT_LIMIT`].
pub const DEFAULT_CHUNK_LIMIT: usize = 1900;

/// Configuration for a DOCX-to-Markdown conversion.
///
/// # Example
/// ```rust
/// use docx2discord::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .title_link("https://example.org/post")
///     .chunk_limit(1500)
///     .build()
///     .unwrap();
/// assert!(config.promote_title);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Link target for the promoted title. Default: None.
    pub title_link: Option<String>,

    /// Re-render the first text block as a level-1 title. Default: true.
    pub promote_title: bool,

    /// Character budget per message group. Range: 1–2000. Default: 1900.
    ///
    /// Discord caps message content at 2000 characters; the default leaves
    /// room for the blank-line separators between packed blocks.
    pub chunk_limit: usize,

    /// Paragraph style name converted to a horizontal rule. Default: "Horizontal Line".
    pub hr_style_name: String,

    /// Directory to keep extracted images in. Default: None (scoped temp dir).
    ///
    /// With `None` the images live in a temporary directory owned by the
    /// returned [`crate::output::ConversionOutput`] and are removed with it.
    pub image_dir: Option<PathBuf>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            title_link: None,
            promote_title: true,
            chunk_limit: DEFAULT_CHUNK_LIMIT,
            hr_style_name: "Horizontal Line".to_string(),
            image_dir: None,
            download_timeout_secs: 120,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn title_link(mut self, link: impl Into<String>) -> Self {
        let link = link.into();
        // An empty link means "no link", same as not setting it.
        self.config.title_link = if link.trim().is_empty() {
            None
        } else {
            Some(link.trim().to_string())
        };
        self
    }

    pub fn promote_title(mut self, v: bool) -> Self {
        self.config.promote_title = v;
        self
    }

    pub fn chunk_limit(mut self, limit: usize) -> Self {
        self.config.chunk_limit = limit;
        self
    }

    pub fn hr_style_name(mut self, name: impl Into<String>) -> Self {
        self.config.hr_style_name = name.into();
        self
    }

    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.image_dir = Some(dir.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Docx2DiscordError> {
        let c = &self.config;
        if c.chunk_limit == 0 || c.chunk_limit > DISCORD_CONTENT_LIMIT {
            return Err(Docx2DiscordError::InvalidConfig(format!(
                "Chunk limit must be 1–{DISCORD_CONTENT_LIMIT}, got {}",
                c.chunk_limit
            )));
        }
        if c.hr_style_name.trim().is_empty() {
            return Err(Docx2DiscordError::InvalidConfig(
                "Horizontal-line style name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Delivery ─────────────────────────────────────────────────────────────

/// How message groups are posted to the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Plain messages; image groups become file attachments with a caption. (default)
    #[default]
    Sequential,
    /// Every group wrapped in a titled rich embed.
    Embed,
}

/// Configuration for posting message groups to a Discord webhook.
#[derive(Clone)]
pub struct DeliveryConfig {
    /// Webhook URL (http or https).
    pub webhook_url: String,

    /// Delivery variant. Default: [`DeliveryMode::Sequential`].
    pub mode: DeliveryMode,

    /// Title shown on every embed in [`DeliveryMode::Embed`].
    pub embed_title: String,

    /// Sidebar colour of embeds. Default: 0x00BFFF.
    pub embed_color: u32,

    /// Caption sent with an image whose group has no text.
    pub attachment_caption: String,

    /// Per-request timeout in seconds. Default: 30.
    pub timeout_secs: u64,

    /// Optional per-group progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for DeliveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("webhook_url", &redact_webhook(&self.webhook_url))
            .field("mode", &self.mode)
            .field("embed_title", &self.embed_title)
            .field("embed_color", &format!("{:#08x}", self.embed_color))
            .field("attachment_caption", &self.attachment_caption)
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn DeliveryProgressCallback>"),
            )
            .finish()
    }
}

/// Hide the token segment of a webhook URL.
fn redact_webhook(url: &str) -> String {
    match url.rsplit_once('/') {
        Some((head, _token)) => format!("{head}/***"),
        None => "***".to_string(),
    }
}

impl DeliveryConfig {
    /// Create a new builder targeting `webhook_url`.
    pub fn builder(webhook_url: impl Into<String>) -> DeliveryConfigBuilder {
        DeliveryConfigBuilder {
            config: Self {
                webhook_url: webhook_url.into(),
                mode: DeliveryMode::default(),
                embed_title: "📄 Word → Discord".to_string(),
                embed_color: 0x00BFFF,
                attachment_caption: "📎 Image attachment".to_string(),
                timeout_secs: 30,
                progress_callback: None,
            },
        }
    }
}

/// Builder for [`DeliveryConfig`].
pub struct DeliveryConfigBuilder {
    config: DeliveryConfig,
}

impl DeliveryConfigBuilder {
    pub fn mode(mut self, mode: DeliveryMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn embed_title(mut self, title: impl Into<String>) -> Self {
        self.config.embed_title = title.into();
        self
    }

    pub fn embed_color(mut self, color: u32) -> Self {
        self.config.embed_color = color & 0xFF_FF_FF;
        self
    }

    pub fn attachment_caption(mut self, caption: impl Into<String>) -> Self {
        self.config.attachment_caption = caption.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating the webhook URL.
    pub fn build(self) -> Result<DeliveryConfig, Docx2DiscordError> {
        let url = self.config.webhook_url.trim();
        if url.is_empty() {
            return Err(Docx2DiscordError::InvalidWebhook {
                reason: "webhook URL is empty".into(),
            });
        }
        match reqwest::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(Docx2DiscordError::InvalidWebhook {
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                })
            }
            Err(e) => {
                return Err(Docx2DiscordError::InvalidWebhook {
                    reason: e.to_string(),
                })
            }
        }
        Ok(self.config)
    }
}
