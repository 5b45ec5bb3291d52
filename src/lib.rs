//! # docx2discord
//!
//! Convert Word documents into Discord-flavored Markdown and, optionally,
//! post the result to a Discord webhook.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DOCX
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Convert    WordprocessingML → HTML, images → ImageStore
//!  ├─ 3. Normalize  dash paragraphs → <hr />, table styling
//!  ├─ 4. Parse      html5ever → DocumentNode tree
//!  ├─ 5. Transcribe headings, paragraphs, lists, rules, tables, images
//!  ├─ 6. Group      pack blocks into ≤ 1900-character messages
//!  └─ 7. Deliver    (optional) sequential or embed webhook posts
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docx2discord::{convert, deliver, ConversionConfig, DeliveryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .title_link("https://example.org/post")
//!         .build()?;
//!     let output = convert("notes.docx", &config).await?;
//!     println!("{}", output.markdown);
//!
//!     let delivery = DeliveryConfig::builder("https://discord.com/api/webhooks/…").build()?;
//!     let report = deliver(&output.groups, &delivery).await?;
//!     eprintln!("{}/{} groups sent", report.sent, report.total);
//!     Ok(())
//! }
//! ```
//!
//! `output` owns the temporary directory holding the extracted images, so
//! keep it alive until delivery has finished.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docx2discord` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docx2discord = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod delivery;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, DeliveryConfig, DeliveryConfigBuilder, DeliveryMode};
pub use convert::{convert, convert_from_bytes, convert_sync, convert_to_file, convert_with_store, markdown_from_html};
pub use delivery::{deliver, deliver_with, DeliveryReport, DiscordWebhook, WebhookTransport};
pub use error::{Docx2DiscordError, GroupError};
pub use model::{DocumentNode, HeadingLevel, ImageMap, MarkdownBlock, MessageGroup, NodeKind};
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::images::{DirImageStore, EmbeddedImage, ImageStore, TempImageStore};
pub use progress::{DeliveryProgressCallback, NoopProgressCallback, ProgressCallback};
