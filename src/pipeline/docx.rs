//! DOCX → HTML conversion.
//!
//! Reads the WordprocessingML parts of the package and emits a small, regular
//! HTML dialect that the rest of the pipeline understands:
//!
//! | Word construct | HTML |
//! |---|---|
//! | `Heading 1..6` / `Title` paragraph style | `<h1>`…`<h6>` / `<h1>` |
//! | the configured horizontal-line style | `<hr />` |
//! | numbered / bulleted paragraph (`w:numPr`) | nested `<ol>` / `<ul>` by `w:ilvl` |
//! | bold / italic / strike runs | `<strong>` / `<em>` / `<s>` |
//! | `w:br` | `<br />` |
//! | `w:hyperlink` | `<a href>` (external target or `#anchor`) |
//! | `w:tbl` | `<table><tr><td>` |
//! | DrawingML / VML image | `<img src="data:…;base64,…">` |
//!
//! Every embedded image is handed to the injected [`ImageStore`] exactly once
//! and recorded in the returned [`ImageMap`] under its `data:` URI. A
//! top-level paragraph holding an image is split around it so the image
//! becomes its own `<img>` block.
//!
//! Text boxes and `mc:Fallback` alternates are skipped: the first duplicates
//! body text, the second duplicates the preferred `mc:Choice` content.

use crate::error::Docx2DiscordError;
use crate::model::ImageMap;
use crate::pipeline::images::{EmbeddedImage, ImageStore};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Output of the conversion collaborator.
#[derive(Debug, Clone)]
pub struct ConvertedHtml {
    pub html: String,
    pub images: ImageMap,
}

/// Convert a DOCX package to HTML, storing embedded images through `store`.
///
/// `hr_style_name` is the paragraph style name (case-insensitive) that maps
/// to a horizontal rule.
pub fn convert_docx<S: ImageStore + ?Sized>(
    bytes: &[u8],
    hr_style_name: &str,
    store: &mut S,
) -> Result<ConvertedHtml, Docx2DiscordError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| Docx2DiscordError::CorruptDocx {
        detail: format!("not a readable ZIP archive: {e}"),
    })?;

    let document_xml = read_part(&mut archive, "word/document.xml")?.ok_or_else(|| {
        Docx2DiscordError::CorruptDocx {
            detail: "word/document.xml is missing".into(),
        }
    })?;
    let rels = read_part(&mut archive, "word/_rels/document.xml.rels")?
        .map(|xml| parse_relationships(&xml))
        .transpose()?
        .unwrap_or_default();
    let styles = read_part(&mut archive, "word/styles.xml")?
        .map(|xml| parse_style_names(&xml))
        .transpose()?
        .unwrap_or_default();
    let numbering = read_part(&mut archive, "word/numbering.xml")?
        .map(|xml| parse_numbering(&xml))
        .transpose()?
        .unwrap_or_default();

    let blocks = parse_body(&document_xml, &rels)?;
    debug!("Parsed {} top-level body blocks", blocks.len());

    let mut images = ImageMap::new();
    let sources = extract_images(&mut archive, &rels, &blocks, store, &mut images)?;

    let writer = HtmlWriter {
        styles: &styles,
        numbering: &numbering,
        hr_style_name: hr_style_name.trim().to_lowercase(),
        sources: &sources,
    };
    let mut html = String::with_capacity(document_xml.len() / 4);
    writer.write_blocks(&blocks, true, &mut html);

    info!("Converted DOCX to {} bytes of HTML with {} images", html.len(), images.len());
    Ok(ConvertedHtml { html, images })
}

// ── Package parts ────────────────────────────────────────────────────────

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

fn read_part(archive: &mut Archive<'_>, name: &str) -> Result<Option<String>, Docx2DiscordError> {
    match read_binary(archive, name)? {
        Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        None => Ok(None),
    }
}

fn read_binary(archive: &mut Archive<'_>, name: &str) -> Result<Option<Vec<u8>>, Docx2DiscordError> {
    let Ok(mut file) = archive.by_name(name) else {
        return Ok(None);
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| Docx2DiscordError::CorruptDocx {
            detail: format!("failed to read '{name}': {e}"),
        })?;
    Ok(Some(bytes))
}

fn xml_error(part: &str, e: impl std::fmt::Display) -> Docx2DiscordError {
    Docx2DiscordError::CorruptDocx {
        detail: format!("error parsing {part}: {e}"),
    }
}

/// Value of the attribute named `key` (qualified, e.g. `w:val`).
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes().flatten().find(|a| a.key.as_ref() == key).map(|a| {
        a.unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).into_owned())
    })
}

/// Toggle properties (`w:b`, `w:i`, …) are on unless `w:val` says otherwise.
fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(attr(e, b"w:val").as_deref(), Some("0" | "false" | "off"))
}

#[derive(Debug, Clone)]
struct Relationship {
    target: String,
    external: bool,
}

type Relationships = HashMap<String, Relationship>;

fn parse_relationships(xml: &str) -> Result<Relationships, Docx2DiscordError> {
    let mut rels = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e) | Event::Start(e)) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                    let external = attr(&e, b"TargetMode").is_some_and(|m| m.eq_ignore_ascii_case("External"));
                    rels.insert(id, Relationship { target, external });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("document.xml.rels", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(rels)
}

/// `styleId` → lower-cased display name (`Heading1` → `heading 1`).
fn parse_style_names(xml: &str) -> Result<HashMap<String, String>, Docx2DiscordError> {
    let mut names = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:style" => {
                current = attr(&e, b"w:styleId");
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:name" => {
                if let (Some(id), Some(name)) = (current.as_ref(), attr(&e, b"w:val")) {
                    names.insert(id.clone(), name.to_lowercase());
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:style" => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("styles.xml", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(names)
}

/// List formats from `numbering.xml`.
#[derive(Debug, Default)]
struct Numbering {
    /// `numId` → `abstractNumId`
    nums: HashMap<String, String>,
    /// `abstractNumId` → `ilvl` → `numFmt`
    formats: HashMap<String, HashMap<u32, String>>,
}

impl Numbering {
    /// Unknown numbering defaults to a bulleted list.
    fn is_ordered(&self, num_id: &str, ilvl: u32) -> bool {
        self.nums
            .get(num_id)
            .and_then(|abs| self.formats.get(abs))
            .and_then(|levels| levels.get(&ilvl))
            .is_some_and(|fmt| fmt != "bullet" && fmt != "none")
    }
}

fn parse_numbering(xml: &str) -> Result<Numbering, Docx2DiscordError> {
    let mut numbering = Numbering::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut abstract_id: Option<String> = None;
    let mut level: Option<u32> = None;
    let mut num_id: Option<String> = None;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:abstractNum" => abstract_id = attr(&e, b"w:abstractNumId"),
                b"w:lvl" if abstract_id.is_some() => {
                    level = attr(&e, b"w:ilvl").and_then(|v| v.parse().ok());
                }
                b"w:num" => num_id = attr(&e, b"w:numId"),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:numFmt" => {
                    if let (Some(abs), Some(lvl), Some(fmt)) = (abstract_id.as_ref(), level, attr(&e, b"w:val")) {
                        numbering.formats.entry(abs.clone()).or_default().insert(lvl, fmt);
                    }
                }
                b"w:abstractNumId" => {
                    if let (Some(num), Some(abs)) = (num_id.as_ref(), attr(&e, b"w:val")) {
                        numbering.nums.insert(num.clone(), abs);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:abstractNum" => abstract_id = None,
                b"w:lvl" => level = None,
                b"w:num" => num_id = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("numbering.xml", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(numbering)
}

// ── Body model ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
struct Run {
    text: String,
    bold: bool,
    italic: bool,
    strike: bool,
}

#[derive(Debug)]
enum Inline {
    Run(Run),
    Link { href: Option<String>, runs: Vec<Run> },
    Image { rel_id: String, alt: Option<String> },
}

#[derive(Debug, Default)]
struct Paragraph {
    style_id: Option<String>,
    num_id: Option<String>,
    ilvl: u32,
    inlines: Vec<Inline>,
}

/// rows → cells → blocks
type Table = Vec<Vec<Vec<Block>>>;

#[derive(Debug)]
enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Default)]
struct Drawing {
    rel_id: Option<String>,
    alt: Option<String>,
}

/// Event-driven walk of `word/document.xml`.
struct BodyParser<'a> {
    rels: &'a Relationships,
    root: Vec<Block>,
    tables: Vec<Table>,
    para: Option<Paragraph>,
    run: Option<Run>,
    link: Option<(Option<String>, Vec<Run>)>,
    drawing: Option<Drawing>,
    in_ppr: bool,
    in_rpr: bool,
    in_text: bool,
    skip_depth: usize,
}

fn parse_body(xml: &str, rels: &Relationships) -> Result<Vec<Block>, Docx2DiscordError> {
    let mut parser = BodyParser {
        rels,
        root: Vec::new(),
        tables: Vec::new(),
        para: None,
        run: None,
        link: None,
        drawing: None,
        in_ppr: false,
        in_rpr: false,
        in_text: false,
        skip_depth: 0,
    };

    let mut reader = Reader::from_str(xml);
    // Whitespace inside w:t is significant (xml:space="preserve").
    reader.trim_text(false);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.start(&e),
            Ok(Event::Empty(e)) => parser.empty(&e),
            Ok(Event::Text(e)) => {
                if parser.in_text && parser.skip_depth == 0 {
                    let text = e.unescape().unwrap_or_default();
                    if let Some(run) = parser.run.as_mut() {
                        run.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => parser.end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("document.xml", e)),
            _ => {}
        }
        buf.clear();
    }

    // Unclosed tables in a truncated document still keep their content.
    while let Some(table) = parser.tables.pop() {
        parser.push_block(Block::Table(table));
    }
    Ok(parser.root)
}

impl BodyParser<'_> {
    fn start(&mut self, e: &BytesStart<'_>) {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return;
        }
        match e.name().as_ref() {
            b"mc:Fallback" | b"w:txbxContent" => self.skip_depth = 1,
            b"w:p" => self.para = Some(Paragraph::default()),
            b"w:pPr" => self.in_ppr = true,
            b"w:r" if self.para.is_some() => self.run = Some(Run::default()),
            b"w:rPr" => self.in_rpr = true,
            b"w:t" => self.in_text = true,
            b"w:hyperlink" => {
                let href = attr(e, b"r:id")
                    .and_then(|id| self.rels.get(&id))
                    .map(|rel| rel.target.clone())
                    .or_else(|| attr(e, b"w:anchor").map(|a| format!("#{a}")));
                self.link = Some((href, Vec::new()));
            }
            b"w:drawing" | b"w:pict" => {
                self.flush_run_text();
                self.drawing = Some(Drawing::default());
            }
            b"w:tbl" => self.tables.push(Vec::new()),
            b"w:tr" => {
                if let Some(table) = self.tables.last_mut() {
                    table.push(Vec::new());
                }
            }
            b"w:tc" => {
                if let Some(row) = self.tables.last_mut().and_then(|t| t.last_mut()) {
                    row.push(Vec::new());
                }
            }
            _ => self.property(e),
        }
    }

    fn empty(&mut self, e: &BytesStart<'_>) {
        if self.skip_depth == 0 {
            self.property(e);
        }
    }

    /// Elements that only carry attributes, whether written empty or not.
    fn property(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"w:pStyle" if self.in_ppr => {
                if let Some(p) = self.para.as_mut() {
                    p.style_id = attr(e, b"w:val");
                }
            }
            b"w:ilvl" if self.in_ppr => {
                if let Some(p) = self.para.as_mut() {
                    p.ilvl = attr(e, b"w:val").and_then(|v| v.parse().ok()).unwrap_or(0);
                }
            }
            b"w:numId" if self.in_ppr => {
                if let Some(p) = self.para.as_mut() {
                    p.num_id = attr(e, b"w:val");
                }
            }
            b"w:b" if self.in_rpr => {
                if let Some(r) = self.run.as_mut() {
                    r.bold = toggle_on(e);
                }
            }
            b"w:i" if self.in_rpr => {
                if let Some(r) = self.run.as_mut() {
                    r.italic = toggle_on(e);
                }
            }
            b"w:strike" | b"w:dstrike" if self.in_rpr => {
                if let Some(r) = self.run.as_mut() {
                    r.strike = toggle_on(e);
                }
            }
            b"w:tab" if !self.in_ppr => {
                if let Some(r) = self.run.as_mut() {
                    r.text.push('\t');
                }
            }
            b"w:br" | b"w:cr" => {
                let page_break = attr(e, b"w:type").is_some_and(|t| t == "page");
                if let (Some(r), false) = (self.run.as_mut(), page_break) {
                    r.text.push('\n');
                }
            }
            b"a:blip" => {
                if let Some(d) = self.drawing.as_mut() {
                    if let Some(id) = attr(e, b"r:embed") {
                        d.rel_id = Some(id);
                    }
                }
            }
            b"v:imagedata" => {
                if let Some(d) = self.drawing.as_mut() {
                    if let Some(id) = attr(e, b"r:id") {
                        d.rel_id = Some(id);
                    }
                }
            }
            b"wp:docPr" => {
                if let Some(d) = self.drawing.as_mut() {
                    d.alt = attr(e, b"descr").filter(|s| !s.is_empty()).or_else(|| attr(e, b"title"));
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }
        match name {
            b"w:t" => self.in_text = false,
            b"w:rPr" => self.in_rpr = false,
            b"w:pPr" => self.in_ppr = false,
            b"w:r" => {
                if let Some(run) = self.run.take() {
                    self.push_run(run);
                }
            }
            b"w:hyperlink" => {
                if let (Some((href, runs)), Some(p)) = (self.link.take(), self.para.as_mut()) {
                    p.inlines.push(Inline::Link { href, runs });
                }
            }
            b"w:drawing" | b"w:pict" => {
                if let Some(Drawing { rel_id: Some(rel_id), alt }) = self.drawing.take() {
                    if let Some(p) = self.para.as_mut() {
                        p.inlines.push(Inline::Image { rel_id, alt });
                    }
                }
            }
            b"w:p" => {
                if let Some(p) = self.para.take() {
                    self.push_block(Block::Paragraph(p));
                }
            }
            b"w:tbl" => {
                if let Some(table) = self.tables.pop() {
                    self.push_block(Block::Table(table));
                }
            }
            _ => {}
        }
    }

    /// Emit the text gathered so far so a following image keeps its position.
    fn flush_run_text(&mut self) {
        if let Some(run) = self.run.as_mut() {
            if !run.text.is_empty() {
                let part = Run {
                    text: std::mem::take(&mut run.text),
                    ..run.clone()
                };
                self.push_run(part);
            }
        }
    }

    fn push_run(&mut self, run: Run) {
        if run.text.is_empty() {
            return;
        }
        if let Some((_, runs)) = self.link.as_mut() {
            runs.push(run);
        } else if let Some(p) = self.para.as_mut() {
            p.inlines.push(Inline::Run(run));
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.tables.last_mut().and_then(|t| t.last_mut()).and_then(|r| r.last_mut()) {
            Some(cell) => cell.push(block),
            None => self.root.push(block),
        }
    }
}

// ── Images ───────────────────────────────────────────────────────────────

/// Store every referenced image once; returns `rel_id` → `data:` URI.
fn extract_images<S: ImageStore + ?Sized>(
    archive: &mut Archive<'_>,
    rels: &Relationships,
    blocks: &[Block],
    store: &mut S,
    images: &mut ImageMap,
) -> Result<HashMap<String, String>, Docx2DiscordError> {
    let mut rel_ids = Vec::new();
    collect_image_rels(blocks, &mut rel_ids);

    let mut sources = HashMap::new();
    for rel_id in rel_ids {
        if sources.contains_key(&rel_id) {
            continue;
        }
        let Some(rel) = rels.get(&rel_id) else {
            warn!("Image relationship '{}' not found; image skipped", rel_id);
            continue;
        };
        if rel.external {
            warn!("Linked (external) image '{}' is not embedded; skipped", rel.target);
            continue;
        }
        let part = resolve_part_path(&rel.target);
        let Some(bytes) = read_binary(archive, &part)? else {
            warn!("Image part '{}' missing from package; skipped", part);
            continue;
        };
        let content_type = content_type_for(&part);
        let path = store
            .save(EmbeddedImage { content_type, bytes: &bytes })
            .map_err(|source| Docx2DiscordError::ImageStoreFailed {
                name: part.clone(),
                source,
            })?;
        let uri = format!("data:{content_type};base64,{}", STANDARD.encode(&bytes));
        images.insert(uri.clone(), path);
        sources.insert(rel_id, uri);
    }
    Ok(sources)
}

fn collect_image_rels(blocks: &[Block], out: &mut Vec<String>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => {
                for inline in &p.inlines {
                    if let Inline::Image { rel_id, .. } = inline {
                        out.push(rel_id.clone());
                    }
                }
            }
            Block::Table(rows) => {
                for cell in rows.iter().flatten() {
                    collect_image_rels(cell, out);
                }
            }
        }
    }
}

/// Relationship targets are relative to `word/` unless absolute.
fn resolve_part_path(target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(abs) => abs.to_string(),
        None => format!("word/{target}"),
    };
    let mut parts: Vec<&str> = Vec::new();
    for seg in joined.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn content_type_for(part: &str) -> &'static str {
    let ext = part.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
}

// ── HTML writer ──────────────────────────────────────────────────────────

enum Role {
    Heading(u8),
    Rule,
    ListItem { ordered: bool, level: usize },
    Plain,
}

struct HtmlWriter<'a> {
    styles: &'a HashMap<String, String>,
    numbering: &'a Numbering,
    hr_style_name: String,
    sources: &'a HashMap<String, String>,
}

impl HtmlWriter<'_> {
    fn role(&self, p: &Paragraph) -> Role {
        let style_id = p.style_id.as_deref().unwrap_or("");
        let name = self
            .styles
            .get(style_id)
            .cloned()
            .unwrap_or_else(|| style_id.to_lowercase());

        if !name.is_empty() && name == self.hr_style_name {
            return Role::Rule;
        }
        if name == "title" {
            return Role::Heading(1);
        }
        let level = name
            .strip_prefix("heading")
            .map(str::trim)
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=6).contains(n));
        if let Some(level) = level {
            return Role::Heading(level);
        }
        match p.num_id.as_deref() {
            Some(num) if num != "0" => Role::ListItem {
                ordered: self.numbering.is_ordered(num, p.ilvl),
                level: p.ilvl as usize,
            },
            _ => Role::Plain,
        }
    }

    fn write_blocks(&self, blocks: &[Block], top_level: bool, out: &mut String) {
        let mut lists: Vec<bool> = Vec::new();
        for block in blocks {
            match block {
                Block::Paragraph(p) => match self.role(p) {
                    Role::ListItem { ordered, level } => {
                        open_list_item(&mut lists, ordered, level, out);
                        self.write_inlines(&p.inlines, out);
                    }
                    role => {
                        close_lists(&mut lists, out);
                        match role {
                            Role::Rule => out.push_str("<hr />"),
                            Role::Heading(n) => self.write_paragraph(&format!("h{n}"), p, top_level, out),
                            _ => self.write_paragraph("p", p, top_level, out),
                        }
                    }
                },
                Block::Table(rows) => {
                    close_lists(&mut lists, out);
                    self.write_table(rows, out);
                }
            }
        }
        close_lists(&mut lists, out);
    }

    /// At top level, images are lifted out of the paragraph into their own block.
    fn write_paragraph(&self, tag: &str, p: &Paragraph, top_level: bool, out: &mut String) {
        let mut buf = String::new();
        for inline in &p.inlines {
            match inline {
                Inline::Image { .. } if top_level => {
                    let mut img = String::new();
                    self.write_inline(inline, &mut img);
                    if !img.is_empty() {
                        push_element(tag, &mut buf, out);
                        out.push_str(&img);
                    }
                }
                _ => self.write_inline(inline, &mut buf),
            }
        }
        push_element(tag, &mut buf, out);
    }

    fn write_table(&self, rows: &Table, out: &mut String) {
        out.push_str("<table>");
        for row in rows {
            out.push_str("<tr>");
            for cell in row {
                out.push_str("<td>");
                self.write_blocks(cell, false, out);
                out.push_str("</td>");
            }
            out.push_str("</tr>");
        }
        out.push_str("</table>");
    }

    fn write_inlines(&self, inlines: &[Inline], out: &mut String) {
        for inline in inlines {
            self.write_inline(inline, out);
        }
    }

    fn write_inline(&self, inline: &Inline, out: &mut String) {
        match inline {
            Inline::Run(run) => write_run(run, out),
            Inline::Link { href, runs } => {
                if let Some(href) = href {
                    out.push_str("<a href=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(href));
                    out.push_str("\">");
                }
                for run in runs {
                    write_run(run, out);
                }
                if href.is_some() {
                    out.push_str("</a>");
                }
            }
            Inline::Image { rel_id, alt } => {
                let Some(src) = self.sources.get(rel_id) else {
                    return;
                };
                out.push_str("<img src=\"");
                out.push_str(src);
                out.push('"');
                if let Some(alt) = alt {
                    out.push_str(" alt=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(alt));
                    out.push('"');
                }
                out.push_str(" />");
            }
        }
    }
}

/// Write `<tag>buf</tag>` when `buf` holds anything, then clear it.
fn push_element(tag: &str, buf: &mut String, out: &mut String) {
    if buf.is_empty() {
        return;
    }
    out.push_str(&format!("<{tag}>{buf}</{tag}>"));
    buf.clear();
}

fn write_run(run: &Run, out: &mut String) {
    let mut open = String::new();
    let mut close = String::new();
    for (on, tag) in [(run.bold, "strong"), (run.italic, "em"), (run.strike, "s")] {
        if on {
            open.push_str(&format!("<{tag}>"));
            close.insert_str(0, &format!("</{tag}>"));
        }
    }
    out.push_str(&open);
    let escaped = html_escape::encode_text(&run.text);
    out.push_str(&escaped.replace('\n', "<br />"));
    out.push_str(&close);
}

/// Open the `<li>` for a list paragraph at `level`, opening or closing
/// nested lists as needed. Every list on the stack has an open `<li>`
/// between items.
fn open_list_item(lists: &mut Vec<bool>, ordered: bool, level: usize, out: &mut String) {
    while lists.len() > level + 1 {
        close_top_list(lists, out);
    }
    if lists.len() == level + 1 {
        out.push_str("</li>");
    }
    let mut needs_item = false;
    while lists.len() < level + 1 {
        if needs_item {
            out.push_str("<li>");
        }
        let depth_ordered = if lists.len() == level { ordered } else { false };
        out.push_str(if depth_ordered { "<ol>" } else { "<ul>" });
        lists.push(depth_ordered);
        needs_item = true;
    }
    out.push_str("<li>");
}

fn close_top_list(lists: &mut Vec<bool>, out: &mut String) {
    if let Some(ordered) = lists.pop() {
        out.push_str("</li>");
        out.push_str(if ordered { "</ol>" } else { "</ul>" });
    }
}

fn close_lists(lists: &mut Vec<bool>, out: &mut String) {
    while !lists.is_empty() {
        close_top_list(lists, out);
    }
}
