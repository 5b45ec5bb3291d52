//! Progress-callback trait for per-group delivery events.
//!
//! Inject an [`Arc<dyn DeliveryProgressCallback>`] via
//! [`crate::config::DeliveryConfigBuilder::progress_callback`] to receive
//! events as the delivery client works through the message groups.
//!
//! # Example
//!
//! ```rust
//! use docx2discord::{DeliveryConfig, DeliveryProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     sent: Arc<AtomicUsize>,
//! }
//!
//! impl DeliveryProgressCallback for CountingCallback {
//!     fn on_group_sent(&self, index: usize, total: usize, text_len: usize) {
//!         self.sent.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Group {}/{} sent ({} chars)", index, total, text_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     sent: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = DeliveryConfig::builder("https://discord.com/api/webhooks/1/abc")
//!     .progress_callback(counter as Arc<dyn DeliveryProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the delivery client as it sends each message group.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Indices are 1-based.
pub trait DeliveryProgressCallback: Send + Sync {
    /// Called once before the first group is sent.
    fn on_delivery_start(&self, total_groups: usize) {
        let _ = total_groups;
    }

    /// Called after the webhook accepted a group.
    ///
    /// # Arguments
    /// * `index`: 1-indexed group number
    /// * `total`: total groups
    /// * `text_len`: character count of the group's text
    fn on_group_sent(&self, index: usize, total: usize, text_len: usize) {
        let _ = (index, total, text_len);
    }

    /// Called when a group is skipped or rejected.
    fn on_group_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after delivery finished or was aborted.
    fn on_delivery_complete(&self, total_groups: usize, sent: usize) {
        let _ = (total_groups, sent);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DeliveryProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DeliveryConfig`].
pub type ProgressCallback = Arc<dyn DeliveryProgressCallback>;
