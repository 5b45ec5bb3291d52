//! End-to-end tests for docx2discord.
//!
//! Every test builds a real `.docx` package in memory with the `zip` writer,
//! so nothing here needs fixtures on disk or network access. Delivery runs
//! against a recording fake transport.
//!
//! Run with:
//!   cargo test --test pipeline -- --nocapture

use docx2discord::delivery::{OutgoingMessage, WebhookResponse};
use docx2discord::pipeline::transcribe::{HR_MARKER, IMAGE_PLACEHOLDER};
use docx2discord::{
    convert, convert_from_bytes, deliver_with, ConversionConfig, DeliveryConfig, DeliveryMode, Docx2DiscordError,
    WebhookTransport,
};
use std::io::{Cursor, Write};
use std::sync::Mutex;
use zip::write::FileOptions;

// ── Test helpers ─────────────────────────────────────────────────────────────

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR-fake";

const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
  <w:style w:type="paragraph" w:styleId="HorizontalLine"><w:name w:val="Horizontal Line"/></w:style>
  <w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/></w:style>
</w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="3">
    <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/></w:lvl>
    <w:lvl w:ilvl="1"><w:numFmt w:val="bullet"/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="7"><w:abstractNumId w:val="3"/></w:num>
</w:numbering>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
  <Relationship Id="rId10" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://docs.example" TargetMode="External"/>
  <Relationship Id="rId20" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#;

fn para(style: Option<&str>, inner: &str) -> String {
    let ppr = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
        .unwrap_or_default();
    format!("<w:p>{ppr}{inner}</w:p>")
}

fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

fn list_item(level: u32, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="{level}"/><w:numId w:val="7"/></w:numPr></w:pPr>{}</w:p>"#,
        run(text)
    )
}

fn cell(text: &str) -> String {
    format!("<w:tc><w:tcPr/>{}</w:tc>", para(None, &run(text)))
}

fn drawing(rel_id: &str) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline><wp:extent cx="100" cy="100"/><wp:docPr id="1" name="Picture 1" descr="Sales chart"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
    )
}

/// A document exercising every block kind.
fn sample_body() -> String {
    [
        para(Some("Title"), &run("Weekly Notes")),
        para(Some("Heading2"), &run("Summary")),
        para(
            None,
            &format!(r#"{}<w:hyperlink r:id="rId10">{}</w:hyperlink>{}"#, run("See "), run("docs"), run(".")),
        ),
        para(None, &run("-----")),
        list_item(0, "First"),
        list_item(1, "Nested"),
        list_item(0, "Second"),
        para(Some("HorizontalLine"), ""),
        format!(
            "<w:tbl><w:tblPr/><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl>",
            cell("Name"),
            cell("Qty"),
            cell("Apple"),
            cell("12")
        ),
        para(None, &format!("{}{}", run("Chart below:"), drawing("rId20"))),
        para(None, &run("The end")),
    ]
    .concat()
}

fn build_docx(body: &str) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W_NS}><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );
    let parts: [(&str, &[u8]); 5] = [
        ("word/document.xml", document.as_bytes()),
        ("word/styles.xml", STYLES_XML.as_bytes()),
        ("word/numbering.xml", NUMBERING_XML.as_bytes()),
        ("word/_rels/document.xml.rels", RELS_XML.as_bytes()),
        ("word/media/image1.png", PNG_BYTES),
    ];
    for (name, data) in parts {
        zip.start_file(name, opts).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn expected_blocks() -> Vec<&'static str> {
    vec![
        "# [**Weekly Notes**](https://example.org/post)",
        "## **Summary**",
        "See [docs](https://docs.example).",
        HR_MARKER,
        "- First",
        "  - Nested",
        "- Second",
        HR_MARKER,
        "```\n| Name  | Qty |\n| Apple | 12  |\n```",
        "Chart below:",
        IMAGE_PLACEHOLDER,
        "The end",
    ]
}

fn linked_config() -> ConversionConfig {
    ConversionConfig::builder()
        .title_link("https://example.org/post")
        .build()
        .unwrap()
}

/// Records each message and answers 204.
#[derive(Default)]
struct RecordingWebhook {
    messages: Mutex<Vec<OutgoingMessage>>,
}

impl WebhookTransport for RecordingWebhook {
    async fn post(&self, message: OutgoingMessage) -> Result<WebhookResponse, String> {
        self.messages.lock().unwrap().push(message);
        Ok(WebhookResponse {
            status: 204,
            body: String::new(),
        })
    }
}

// ── Conversion ───────────────────────────────────────────────────────────────

#[test]
fn test_full_document_blocks() {
    let output = convert_from_bytes(&build_docx(&sample_body()), &linked_config()).unwrap();
    let texts: Vec<&str> = output.blocks.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(texts, expected_blocks());

    // Only the image block carries a file.
    for (i, block) in output.blocks.iter().enumerate() {
        assert_eq!(block.image.is_some(), i == 10, "block {i}: {:?}", block.text);
    }
    let image = output.blocks[10].image.as_ref().unwrap();
    assert_eq!(std::fs::read(image).unwrap(), PNG_BYTES);

    assert_eq!(output.stats.blocks, 12);
    assert_eq!(output.stats.images, 1);
    assert_eq!(output.stats.tables, 1);
}

#[test]
fn test_full_document_groups() {
    let output = convert_from_bytes(&build_docx(&sample_body()), &linked_config()).unwrap();
    let blocks = expected_blocks();
    let groups: Vec<&str> = output.groups.iter().map(|g| g.text.as_str()).collect();
    let packed = blocks[..8].join("\n\n");
    assert_eq!(
        groups,
        vec![packed.as_str(), blocks[8], blocks[9], blocks[10], blocks[11]]
    );
    assert!(output.groups[3].image.is_some());
    assert_eq!(output.markdown, groups.join("\n\n"));
}

#[test]
fn test_html_preview_is_normalized() {
    let output = convert_from_bytes(&build_docx(&sample_body()), &linked_config()).unwrap();
    assert!(output.html.contains("<h1>Weekly Notes</h1>"));
    assert_eq!(output.html.matches("<hr />").count(), 2, "html: {}", output.html);
    assert!(output.html.contains(r#"<table style="border-collapse:collapse;width:100%;">"#));
    assert!(output.html.contains("<th style="));
    assert!(output.html.contains(r#"<img src="data:image/png;base64,"#));
    assert!(output.html.contains(r#"alt="Sales chart""#));
}

#[test]
fn test_temporary_images_removed_with_output() {
    let output = convert_from_bytes(&build_docx(&sample_body()), &ConversionConfig::default()).unwrap();
    assert!(output.images_are_temporary());
    let image = output.groups[3].image.clone().unwrap();
    assert!(image.exists());
    drop(output);
    assert!(!image.exists(), "image should be cleaned up with the output");
}

#[test]
fn test_image_dir_keeps_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConversionConfig::builder().image_dir(dir.path().join("imgs")).build().unwrap();
    let output = convert_from_bytes(&build_docx(&sample_body()), &config).unwrap();
    assert!(!output.images_are_temporary());
    let image = output.groups[3].image.clone().unwrap();
    drop(output);
    assert!(image.exists());
    assert!(image.starts_with(dir.path().join("imgs")));
}

#[test]
fn test_no_title_promotion() {
    let config = ConversionConfig::builder().promote_title(false).build().unwrap();
    let output = convert_from_bytes(&build_docx(&sample_body()), &config).unwrap();
    assert_eq!(output.blocks[0].text, "# **Weekly Notes**");
}

#[test]
fn test_small_budget_splits_text_groups() {
    let config = ConversionConfig::builder().chunk_limit(40).build().unwrap();
    let output = convert_from_bytes(&build_docx(&sample_body()), &config).unwrap();
    for group in &output.groups {
        let single_block = output.blocks.iter().any(|b| b.text == group.text);
        assert!(
            group.text.chars().count() <= 40 || single_block,
            "group over budget: {:?}",
            group.text
        );
    }
    let rejoined: Vec<&str> = output.groups.iter().flat_map(|g| g.text.split("\n\n")).collect();
    let blocks: Vec<&str> = output.blocks.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(rejoined, blocks);
}

#[test]
fn test_empty_document() {
    let output = convert_from_bytes(&build_docx(""), &ConversionConfig::default()).unwrap();
    assert!(output.blocks.is_empty());
    assert!(output.groups.is_empty());
    assert_eq!(output.markdown, "");
}

#[tokio::test]
async fn test_convert_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.docx");
    std::fs::write(&path, build_docx(&sample_body())).unwrap();

    let output = convert(path.to_str().unwrap(), &linked_config()).await.unwrap();
    assert_eq!(output.blocks.len(), 12);
}

#[tokio::test]
async fn test_convert_rejects_non_docx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.docx");
    std::fs::write(&path, b"<html>not a docx</html>").unwrap();

    let err = convert(path.to_str().unwrap(), &ConversionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Docx2DiscordError::NotADocx { .. }), "got: {err}");
}

#[test]
fn test_zip_without_document_part() {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("hello.txt", FileOptions::default()).unwrap();
    zip.write_all(b"hi").unwrap();
    let bytes = zip.finish().unwrap().into_inner();

    let err = convert_from_bytes(&bytes, &ConversionConfig::default()).unwrap_err();
    assert!(matches!(err, Docx2DiscordError::CorruptDocx { .. }));
}

// ── Delivery ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sequential_delivery_of_converted_document() {
    let output = convert_from_bytes(&build_docx(&sample_body()), &linked_config()).unwrap();
    let webhook = RecordingWebhook::default();
    let config = DeliveryConfig::builder("https://discord.com/api/webhooks/1/token")
        .build()
        .unwrap();

    let report = deliver_with(&webhook, &output.groups, &config).await;
    assert!(report.is_complete());
    assert_eq!(report.sent, 5);

    let messages = webhook.messages.lock().unwrap();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[1].payload["content"], output.groups[1].text.as_str());
    let attachment = messages[3].attachment.as_ref().unwrap();
    assert_eq!(attachment.bytes, PNG_BYTES);
    assert!(attachment.filename.ends_with(".png"));
    assert_eq!(messages[3].payload["content"], IMAGE_PLACEHOLDER);
}

#[tokio::test]
async fn test_embed_delivery_references_attachment() {
    let output = convert_from_bytes(&build_docx(&sample_body()), &linked_config()).unwrap();
    let webhook = RecordingWebhook::default();
    let config = DeliveryConfig::builder("https://discord.com/api/webhooks/1/token")
        .mode(DeliveryMode::Embed)
        .build()
        .unwrap();

    deliver_with(&webhook, &output.groups, &config).await;

    let messages = webhook.messages.lock().unwrap();
    let embed = &messages[3].payload["embeds"][0];
    let filename = &messages[3].attachment.as_ref().unwrap().filename;
    assert_eq!(embed["image"]["url"], format!("attachment://{filename}").as_str());
    assert_eq!(embed["title"], config.embed_title.as_str());
}
