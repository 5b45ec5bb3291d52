//! Conversion entry points.
//!
//! [`convert`] is the primary API: resolve a path or URL, convert the DOCX,
//! and return HTML, Markdown blocks and message groups in one
//! [`ConversionOutput`]. [`convert_from_bytes`] and [`convert_with_store`]
//! skip input resolution, and [`markdown_from_html`] runs only the
//! transcription half on HTML produced elsewhere.

use crate::config::ConversionConfig;
use crate::error::Docx2DiscordError;
use crate::model::{ImageMap, MarkdownBlock};
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::images::{DirImageStore, ImageStore, TempImageStore};
use crate::pipeline::table::TABLE_FENCE;
use crate::pipeline::transcribe::TitleRule;
use crate::pipeline::{chunk, classify, docx, html, input, normalize, transcribe};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a DOCX file or URL.
///
/// # Arguments
/// * `input_str`: Local file path or HTTP/HTTPS URL to a `.docx`
/// * `config`: Conversion configuration
///
/// # Errors
/// Returns `Err(Docx2DiscordError)` when the input cannot be read, is not a
/// DOCX package, or an extracted image cannot be stored. Unresolvable image
/// references and odd document structure never fail the conversion.
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Docx2DiscordError> {
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    debug!("Resolved '{}' ({} bytes)", resolved.name, resolved.bytes.len());

    // XML parsing and image writes are blocking work.
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_from_bytes(&resolved.bytes, &config))
        .await
        .map_err(|e| Docx2DiscordError::Internal(format!("conversion task failed: {e}")))?
}

/// Convert DOCX bytes already in memory.
///
/// Images go to `config.image_dir` when set, otherwise into a temporary
/// directory owned by the returned output.
pub fn convert_from_bytes(bytes: &[u8], config: &ConversionConfig) -> Result<ConversionOutput, Docx2DiscordError> {
    input::check_magic("<bytes>", bytes)?;
    match &config.image_dir {
        Some(dir) => {
            let mut store = DirImageStore::new(dir).map_err(|source| Docx2DiscordError::ImageStoreFailed {
                name: dir.display().to_string(),
                source,
            })?;
            convert_with_store(bytes, config, &mut store)
        }
        None => {
            let mut store = TempImageStore::new().map_err(|source| Docx2DiscordError::ImageStoreFailed {
                name: "temporary directory".into(),
                source,
            })?;
            let mut output = convert_with_store(bytes, config, &mut store)?;
            output.scratch = Some(store);
            Ok(output)
        }
    }
}

/// Convert DOCX bytes, saving embedded images through `store`.
pub fn convert_with_store<S: ImageStore + ?Sized>(
    bytes: &[u8],
    config: &ConversionConfig,
    store: &mut S,
) -> Result<ConversionOutput, Docx2DiscordError> {
    let start = Instant::now();

    let converted = docx::convert_docx(bytes, &config.hr_style_name, store)?;
    let html = normalize::normalize_html(&converted.html);
    let blocks = transcribe_normalized(&html, &converted.images, config);
    let groups = chunk::group_blocks(&blocks, config.chunk_limit);
    let markdown = groups
        .iter()
        .map(|g| g.text.as_str())
        .collect::<Vec<_>>()
        .join(chunk::GROUP_SEPARATOR);

    let stats = ConversionStats {
        blocks: blocks.len(),
        groups: groups.len(),
        images: converted.images.len(),
        tables: blocks.iter().filter(|b| b.text.starts_with(TABLE_FENCE)).count(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Conversion complete: {} blocks, {} groups, {} images, {}ms",
        stats.blocks, stats.groups, stats.images, stats.duration_ms
    );

    Ok(ConversionOutput {
        html,
        blocks,
        groups,
        markdown,
        images: converted.images,
        stats,
        scratch: None,
    })
}

/// Transcribe an HTML string into Markdown blocks.
///
/// The HTML is normalized first, so dash-only paragraphs become rules here
/// too. `images` resolves `<img src>` references.
pub fn markdown_from_html(html: &str, images: &ImageMap, config: &ConversionConfig) -> Vec<MarkdownBlock> {
    transcribe_normalized(&normalize::normalize_html(html), images, config)
}

fn transcribe_normalized(html: &str, images: &ImageMap, config: &ConversionConfig) -> Vec<MarkdownBlock> {
    let root = html::parse_html(html);
    let blocks = classify::classify(&root);
    debug!("Classified {} top-level blocks", blocks.len());
    let title = TitleRule {
        enabled: config.promote_title,
        link: config.title_link.as_deref(),
    };
    transcribe::transcribe(&blocks, images, title)
}

/// Convert a DOCX and write the Markdown preview to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Docx2DiscordError> {
    let output = convert(input_str, config).await?;
    write_atomic(output_path.as_ref(), &output.markdown).await?;
    Ok(output.stats)
}

/// Write `contents` to `path` through a sibling temp file.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), Docx2DiscordError> {
    let fail = |source| Docx2DiscordError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }
    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, contents).await.map_err(fail)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(fail)?;
    Ok(())
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Docx2DiscordError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Docx2DiscordError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_from_html_end_to_end() {
        let html = r#"<h1>Intro</h1><p>See <a href="https://y">here</a>.</p><p>-----</p><ul><li>a<ul><li>b</li></ul></li></ul><table><tr><td>A</td><td>B</td></tr><tr><td>1</td><td>22</td></tr></table>"#;
        let config = ConversionConfig::builder().title_link("https://x").build().unwrap();
        let blocks = markdown_from_html(html, &ImageMap::new(), &config);
        let texts: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "# [**Intro**](https://x)",
                "See [here](https://y).",
                transcribe::HR_MARKER,
                "- a",
                "  - b",
                "```\n| A | B  |\n| 1 | 22 |\n```",
            ]
        );
    }

    #[test]
    fn test_formatting_and_breaks_keep_words_apart() {
        let config = ConversionConfig::builder().promote_title(false).build().unwrap();
        let texts = |html: &str| -> Vec<String> {
            markdown_from_html(html, &ImageMap::new(), &config)
                .into_iter()
                .map(|b| b.text)
                .collect()
        };
        assert_eq!(texts("<p><strong>Hello </strong>world</p>"), vec!["Hello world"]);
        assert_eq!(texts("<p>first<br />second</p>"), vec!["first second"]);
        assert_eq!(texts("<p>a <em>b</em> c</p>"), vec!["a b c"]);
    }

    #[test]
    fn test_title_promotion_disabled() {
        let config = ConversionConfig::builder().promote_title(false).build().unwrap();
        let blocks = markdown_from_html("<h2>Part</h2>", &ImageMap::new(), &config);
        assert_eq!(blocks[0].text, "## **Part**");
    }

    #[test]
    fn test_convert_from_bytes_rejects_non_zip() {
        let err = convert_from_bytes(b"%PDF-1.7", &ConversionConfig::default()).unwrap_err();
        assert!(matches!(err, Docx2DiscordError::NotADocx { .. }));
    }

    #[tokio::test]
    async fn test_write_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/doc.md");
        write_atomic(&path, "# **T**").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# **T**");
        assert!(!path.with_extension("md.tmp").exists());
    }
}
