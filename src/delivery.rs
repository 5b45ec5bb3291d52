//! Discord webhook delivery.
//!
//! Message groups are posted one at a time, in order, over a
//! [`WebhookTransport`]. [`DiscordWebhook`] is the reqwest-backed transport;
//! tests substitute a scripted fake.
//!
//! Failure handling follows two rules:
//!
//! * an image file that cannot be read skips its group and delivery goes on;
//! * a non-2xx response or a transport failure stops the remaining groups.
//!
//! Every failure is recorded as a [`GroupError`] in the returned
//! [`DeliveryReport`]; nothing is retried.

use crate::config::{DeliveryConfig, DeliveryMode};
use crate::error::{Docx2DiscordError, GroupError};
use crate::model::MessageGroup;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest response-body fragment kept in a [`GroupError::HttpStatus`].
pub const ERROR_BODY_LIMIT: usize = 150;

/// Discord's cap on an embed description.
pub const EMBED_DESCRIPTION_LIMIT: usize = 2048;

// ── Transport seam ───────────────────────────────────────────────────────

/// A file sent alongside a message.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// One webhook request: the JSON payload plus an optional file.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub payload: Value,
    pub attachment: Option<Attachment>,
}

/// Status and body of a webhook response.
#[derive(Debug, Clone)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one message to a webhook.
///
/// `Err` means no response was received; its string describes why.
pub trait WebhookTransport: Send + Sync {
    fn post(&self, message: OutgoingMessage) -> impl Future<Output = Result<WebhookResponse, String>> + Send;
}

/// reqwest-backed transport for a Discord webhook URL.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl DiscordWebhook {
    pub fn new(webhook_url: &str, timeout_secs: u64) -> Result<Self, Docx2DiscordError> {
        let url = reqwest::Url::parse(webhook_url.trim()).map_err(|e| Docx2DiscordError::InvalidWebhook {
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Docx2DiscordError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { client, url })
    }
}

impl WebhookTransport for DiscordWebhook {
    async fn post(&self, message: OutgoingMessage) -> Result<WebhookResponse, String> {
        let request = self.client.post(self.url.clone());
        let request = match message.attachment {
            Some(att) => {
                let file = reqwest::multipart::Part::bytes(att.bytes).file_name(att.filename);
                let form = reqwest::multipart::Form::new()
                    .text("payload_json", message.payload.to_string())
                    .part("file", file);
                request.multipart(form)
            }
            None => request.json(&message.payload),
        };
        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(WebhookResponse { status, body })
    }
}

// ── Delivery ─────────────────────────────────────────────────────────────

/// Outcome of a delivery run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeliveryReport {
    /// Number of groups handed in.
    pub total: usize,
    /// Groups the webhook accepted.
    pub sent: usize,
    /// Groups with nothing to send.
    pub skipped_empty: usize,
    pub errors: Vec<GroupError>,
    /// True when a fatal error stopped the remaining groups.
    pub aborted: bool,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Post `groups` to the configured Discord webhook.
pub async fn deliver(groups: &[MessageGroup], config: &DeliveryConfig) -> Result<DeliveryReport, Docx2DiscordError> {
    let webhook = DiscordWebhook::new(&config.webhook_url, config.timeout_secs)?;
    Ok(deliver_with(&webhook, groups, config).await)
}

/// Post `groups` through `transport`.
pub async fn deliver_with<T: WebhookTransport>(
    transport: &T,
    groups: &[MessageGroup],
    config: &DeliveryConfig,
) -> DeliveryReport {
    let total = groups.len();
    let mut report = DeliveryReport {
        total,
        ..DeliveryReport::default()
    };
    info!("Delivering {} message groups ({:?} mode)", total, config.mode);
    if let Some(ref cb) = config.progress_callback {
        cb.on_delivery_start(total);
    }

    for (i, group) in groups.iter().enumerate() {
        let index = i + 1;
        if group.image.is_none() && group.text.trim().is_empty() {
            debug!("Group {}/{} is empty; skipped", index, total);
            report.skipped_empty += 1;
            continue;
        }

        let attachment = match &group.image {
            Some(path) => match read_attachment(path).await {
                Ok(att) => Some(att),
                Err(e) => {
                    let err = GroupError::ImageUnreadable {
                        index,
                        total,
                        path: path.clone(),
                        detail: e.to_string(),
                    };
                    warn!("{}", err);
                    record(&mut report, config, index, err);
                    continue;
                }
            },
            None => None,
        };

        let payload = build_payload(group, attachment.as_ref(), config);
        match transport.post(OutgoingMessage { payload, attachment }).await {
            Ok(resp) if resp.is_success() => {
                report.sent += 1;
                debug!("Group {}/{} sent (HTTP {})", index, total, resp.status);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_group_sent(index, total, group.text.chars().count());
                }
            }
            Ok(resp) => {
                let err = GroupError::HttpStatus {
                    index,
                    total,
                    status: resp.status,
                    body: resp.body.chars().take(ERROR_BODY_LIMIT).collect(),
                };
                warn!("{}; aborting delivery", err);
                record(&mut report, config, index, err);
                report.aborted = true;
                break;
            }
            Err(detail) => {
                let err = GroupError::Transport { index, total, detail };
                warn!("{}; aborting delivery", err);
                record(&mut report, config, index, err);
                report.aborted = true;
                break;
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_delivery_complete(total, report.sent);
    }
    info!(
        "Delivery finished: {}/{} sent, {} errors{}",
        report.sent,
        total,
        report.errors.len(),
        if report.aborted { " (aborted)" } else { "" }
    );
    report
}

fn record(report: &mut DeliveryReport, config: &DeliveryConfig, index: usize, err: GroupError) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_group_error(index, report.total, &err.to_string());
    }
    report.errors.push(err);
}

async fn read_attachment(path: &Path) -> std::io::Result<Attachment> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(Attachment { filename, bytes })
}

/// JSON body for `group` in the configured mode.
fn build_payload(group: &MessageGroup, attachment: Option<&Attachment>, config: &DeliveryConfig) -> Value {
    match config.mode {
        DeliveryMode::Sequential => {
            let content = if attachment.is_some() && group.text.trim().is_empty() {
                config.attachment_caption.as_str()
            } else {
                group.text.as_str()
            };
            json!({ "content": content })
        }
        DeliveryMode::Embed => {
            let mut embed = json!({
                "title": config.embed_title,
                "description": truncate_description(&group.text),
                "color": config.embed_color,
            });
            if let Some(att) = attachment {
                embed["image"] = json!({ "url": format!("attachment://{}", att.filename) });
            }
            json!({ "embeds": [embed] })
        }
    }
}

/// Keep text up to the embed cap; longer text keeps 2045 characters + `...`.
fn truncate_description(text: &str) -> String {
    if text.chars().count() <= EMBED_DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let mut out: String = text.chars().take(EMBED_DESCRIPTION_LIMIT - 3).collect();
    out.push_str("...");
    out
}
