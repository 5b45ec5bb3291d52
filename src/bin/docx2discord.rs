//! CLI binary for docx2discord.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` / `DeliveryConfig`, prints the preview and optionally
//! posts it to a webhook.

use anyhow::{Context, Result};
use clap::Parser;
use docx2discord::convert::write_atomic;
use docx2discord::{
    convert, deliver, ConversionConfig, DeliveryConfig, DeliveryMode, DeliveryProgressCallback, DeliveryReport,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per group.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} groups  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Sending");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl DeliveryProgressCallback for CliProgressCallback {
    fn on_delivery_start(&self, total_groups: usize) {
        self.bar.set_length(total_groups as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Posting {total_groups} message groups…"))
        ));
    }

    fn on_group_sent(&self, index: usize, total: usize, text_len: usize) {
        self.bar.println(format!(
            "  {} Group {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{text_len:>5} chars")),
        ));
        self.bar.set_position(index as u64);
    }

    fn on_group_error(&self, index: usize, total: usize, error: &str) {
        // Keep long error messages to one terminal line.
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!("  {} Group {:>3}/{:<3}  {}", red("✗"), index, total, red(&msg)));
        self.bar.set_position(index as u64);
    }

    fn on_delivery_complete(&self, _total_groups: usize, _sent: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Preview Markdown on stdout
  docx2discord notes.docx

  # Write the preview to a file
  docx2discord notes.docx -o notes.md

  # Link the promoted title and post to a webhook
  docx2discord notes.docx --title-link https://example.org/post \
      --webhook https://discord.com/api/webhooks/ID/TOKEN

  # Post every group as an embed
  docx2discord notes.docx --mode embed --embed-title "Weekly notes"

  # Convert from URL, keep the extracted images
  docx2discord https://example.org/notes.docx --image-dir ./images

  # Show the intermediate HTML or the full structured output
  docx2discord notes.docx --html
  docx2discord notes.docx --json > notes.json

ENVIRONMENT VARIABLES:
  DISCORD_WEBHOOK_URL     Webhook to post to (same as --webhook)
  RUST_LOG                Override the log filter (e.g. docx2discord=debug)
"#;

/// Convert Word documents to Discord Markdown and post them to a webhook.
#[derive(Parser, Debug)]
#[command(
    name = "docx2discord",
    version,
    about = "Convert Word documents to Discord Markdown and post them to a webhook",
    long_about = "Convert a .docx file (local path or URL) into Discord-flavoured Markdown: \
headings, paragraphs with links, nested lists, rules, monospace tables and images. \
The result is packed into message-sized groups and can be posted to a Discord webhook \
as plain messages or embeds.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local .docx file path or HTTP/HTTPS URL.
    input: String,

    /// Write the Markdown preview to this file instead of stdout.
    #[arg(short, long, env = "DOCX2DISCORD_OUTPUT")]
    output: Option<PathBuf>,

    /// Link target for the promoted title.
    #[arg(long, env = "DOCX2DISCORD_TITLE_LINK")]
    title_link: Option<String>,

    /// Keep the first block as-is instead of promoting it to a title.
    #[arg(long, env = "DOCX2DISCORD_NO_TITLE")]
    no_title: bool,

    /// Character budget per message group (1–2000).
    #[arg(long, env = "DOCX2DISCORD_LIMIT", default_value_t = 1900,
          value_parser = clap::value_parser!(u16).range(1..=2000))]
    limit: u16,

    /// Paragraph style converted to a horizontal rule.
    #[arg(long, env = "DOCX2DISCORD_HR_STYLE", default_value = "Horizontal Line")]
    hr_style: String,

    /// Keep extracted images in this directory.
    #[arg(long, env = "DOCX2DISCORD_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// Print the normalized HTML instead of Markdown.
    #[arg(long, conflicts_with = "json")]
    html: bool,

    /// Output structured JSON (ConversionOutput) instead of Markdown.
    #[arg(long, env = "DOCX2DISCORD_JSON")]
    json: bool,

    /// Discord webhook URL; when set, the groups are posted.
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    webhook: Option<String>,

    /// Delivery mode.
    #[arg(long, env = "DOCX2DISCORD_MODE", value_enum, default_value = "sequential")]
    mode: ModeArg,

    /// Title shown on every embed (embed mode).
    #[arg(long, env = "DOCX2DISCORD_EMBED_TITLE")]
    embed_title: Option<String>,

    /// Disable progress bar.
    #[arg(long, env = "DOCX2DISCORD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCX2DISCORD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCX2DISCORD_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCX2DISCORD_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-request webhook timeout in seconds.
    #[arg(long, env = "DOCX2DISCORD_WEBHOOK_TIMEOUT", default_value_t = 30)]
    webhook_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ModeArg {
    Sequential,
    Embed,
}

impl From<ModeArg> for DeliveryMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Sequential => DeliveryMode::Sequential,
            ModeArg::Embed => DeliveryMode::Embed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs while delivering.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.webhook.is_some();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Convert ──────────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let output = convert(&cli.input, &config).await.context("Conversion failed")?;

    let rendered = if cli.json {
        serde_json::to_string_pretty(&output).context("Failed to serialise output")?
    } else if cli.html {
        output.html.clone()
    } else {
        output.markdown.clone()
    };

    if let Some(ref output_path) = cli.output {
        write_atomic(output_path, &rendered)
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        if !cli.quiet {
            eprintln!("{}  →  {}", green("✔"), bold(&output_path.display().to_string()));
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure a trailing newline on stdout.
        if !rendered.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "Converted {} blocks into {} groups ({} images, {} tables) in {}ms",
            output.stats.blocks,
            output.stats.groups,
            output.stats.images,
            output.stats.tables,
            output.stats.duration_ms
        );
    }

    // ── Deliver ──────────────────────────────────────────────────────────
    let Some(ref webhook) = cli.webhook else {
        return Ok(());
    };

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn DeliveryProgressCallback>)
    } else {
        None
    };
    let delivery = build_delivery_config(&cli, webhook, progress_cb)?;

    // `output` owns the image directory; it stays alive until delivery ends.
    let report = deliver(&output.groups, &delivery)
        .await
        .context("Delivery failed")?;
    print_report(&report, cli.quiet);

    if !report.is_complete() {
        anyhow::bail!(
            "{} of {} groups were not delivered",
            report.total - report.sent - report.skipped_empty,
            report.total
        );
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .promote_title(!cli.no_title)
        .chunk_limit(cli.limit as usize)
        .hr_style_name(cli.hr_style.clone())
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref link) = cli.title_link {
        builder = builder.title_link(link.clone());
    }
    if let Some(ref dir) = cli.image_dir {
        builder = builder.image_dir(dir.clone());
    }

    builder.build().context("Invalid configuration")
}

/// Map CLI args to `DeliveryConfig`.
fn build_delivery_config(cli: &Cli, webhook: &str, progress: Option<ProgressCallback>) -> Result<DeliveryConfig> {
    let mut builder = DeliveryConfig::builder(webhook)
        .mode(cli.mode.clone().into())
        .timeout_secs(cli.webhook_timeout);

    if let Some(ref title) = cli.embed_title {
        builder = builder.embed_title(title.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid webhook configuration")
}

/// Summary line plus one line per failed group.
fn print_report(report: &DeliveryReport, quiet: bool) {
    if report.is_complete() {
        if !quiet {
            eprintln!(
                "{} {} groups delivered",
                green("✔"),
                bold(&report.sent.to_string())
            );
        }
        return;
    }

    eprintln!(
        "{} {}/{} groups delivered{}",
        if report.sent == 0 { red("✘") } else { cyan("⚠") },
        bold(&report.sent.to_string()),
        report.total,
        if report.aborted { red("  (aborted)") } else { String::new() },
    );
    for err in &report.errors {
        eprintln!("  {} {}", red("✗"), err);
    }
}
