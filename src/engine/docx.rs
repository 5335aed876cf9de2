use super::{Extraction, ExtractionMethod, Extractor, Table};
use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraphs and table cells of `word/document.xml`, in document order.
/// Every `w:tbl` also comes back as a table grid.
pub struct DocxExtractor;

impl Extractor for DocxExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::DocxStructure
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut archive = zip::ZipArchive::new(file)
            .with_context(|| format!("{} is not a DOCX (zip) archive", path.display()))?;
        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .with_context(|| format!("{} has no {DOCUMENT_PART}", path.display()))?
            .read_to_string(&mut xml)
            .with_context(|| format!("reading {DOCUMENT_PART}"))?;
        parse_document_xml(&xml)
    }
}

#[derive(Default)]
struct TableBuilder {
    rows: Table,
    row: Vec<Option<String>>,
    cell: Option<String>,
    // Open paragraphs when the table started; a table inside a text box
    // sits one paragraph deeper than its cells' own paragraphs.
    para_depth: usize,
}

/// An open `w:p`. Paragraphs nest when a text box (`w:txbxContent`) sits
/// inside a run.
#[derive(Default)]
struct Paragraph {
    text: String,
    // A nested paragraph closed here; separate it from the next run.
    pending_space: bool,
}

impl Paragraph {
    fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if std::mem::take(&mut self.pending_space)
            && !self.text.ends_with(char::is_whitespace)
            && !s.starts_with(char::is_whitespace)
        {
            self.text.push(' ');
        }
        self.text.push_str(s);
    }

    fn push_nested(&mut self, nested: &str) {
        let nested = nested.trim();
        if nested.is_empty() {
            return;
        }
        self.pending_space = true;
        self.push_str(nested);
        self.pending_space = true;
    }
}

/// Walks the WordprocessingML body. Text of a paragraph inside a table cell
/// goes to that cell; a finished row becomes one line of output text.
/// Text-box paragraphs are folded into the paragraph that anchors them.
pub fn parse_document_xml(xml: &str) -> Result<Extraction> {
    let mut reader = Reader::from_str(xml);

    let mut text = String::new();
    let mut tables: Vec<Table> = Vec::new();
    let mut open_tables: Vec<TableBuilder> = Vec::new();
    let mut paragraphs: Vec<Paragraph> = Vec::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().context("malformed document.xml")? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => open_tables.push(TableBuilder {
                    para_depth: paragraphs.len(),
                    ..TableBuilder::default()
                }),
                b"w:tc" => {
                    if let Some(table) = open_tables.last_mut() {
                        table.cell = Some(String::new());
                    }
                }
                b"w:p" => paragraphs.push(Paragraph::default()),
                b"w:t" => in_run_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => {
                    if let Some(p) = paragraphs.last_mut() {
                        p.push_str("\t");
                    }
                }
                b"w:br" | b"w:cr" => {
                    if let Some(p) = paragraphs.last_mut() {
                        p.push_str("\n");
                    }
                }
                b"w:tc" => {
                    if let Some(table) = open_tables.last_mut() {
                        table.row.push(None);
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                let raw = t.unescape().context("bad text escape in document.xml")?;
                if let Some(p) = paragraphs.last_mut() {
                    p.push_str(&raw);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => {
                    let Some(finished) = paragraphs.pop() else {
                        continue;
                    };
                    let finished = finished.text;
                    let depth = paragraphs.len();
                    let cell = open_tables
                        .last_mut()
                        .filter(|t| t.para_depth == depth)
                        .and_then(|t| t.cell.as_mut());
                    if let Some(cell) = cell {
                        if !cell.is_empty() && !finished.is_empty() {
                            cell.push(' ');
                        }
                        cell.push_str(&finished);
                    } else if let Some(parent) = paragraphs.last_mut() {
                        parent.push_nested(&finished);
                    } else {
                        text.push_str(&finished);
                        text.push('\n');
                    }
                }
                b"w:tc" => {
                    if let Some(table) = open_tables.last_mut() {
                        let cell = table.cell.take().unwrap_or_default();
                        table.row.push(Some(cell.trim().to_string()));
                    }
                }
                b"w:tr" => {
                    if let Some(table) = open_tables.last_mut() {
                        let row = std::mem::take(&mut table.row);
                        let line = row
                            .iter()
                            .flatten()
                            .map(String::as_str)
                            .collect::<Vec<_>>()
                            .join(" ");
                        match paragraphs.last_mut() {
                            Some(parent) if table.para_depth > 0 => parent.push_nested(&line),
                            _ => {
                                text.push_str(&line);
                                text.push('\n');
                            }
                        }
                        table.rows.push(row);
                    }
                }
                b"w:tbl" => {
                    if let Some(table) = open_tables.pop() {
                        if !table.rows.is_empty() {
                            tables.push(table.rows);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(Extraction::new(text, tables))
}
