use policy_ingest::engine::{Extractor, ExtractionMethod, docx::{DocxExtractor, parse_document_xml}};
use std::io::Write;

const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Policy Schedule</w:t></w:r></w:p>
    <w:tbl>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Benefit</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>Limit</w:t></w:r></w:p></w:tc>
      </w:tr>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Dental</w:t></w:r></w:p><w:p><w:r><w:t>(basic)</w:t></w:r></w:p></w:tc>
        <w:tc/>
      </w:tr>
    </w:tbl>
    <w:p><w:r><w:t xml:space="preserve">Exclusions: </w:t></w:r><w:r><w:t>war &amp; terrorism</w:t></w:r></w:p>
    <w:p><w:r><w:t>Line one</w:t><w:br/><w:t>Line two</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

fn cell(s: &str) -> Option<String> {
    Some(s.to_string())
}

#[test]
fn paragraphs_and_tables_in_document_order() {
    let extraction = parse_document_xml(BODY).unwrap();
    assert_eq!(
        extraction.text,
        "Policy Schedule\nBenefit Limit\nDental (basic)\nExclusions: war & terrorism\nLine one\nLine two\n"
    );
    assert_eq!(
        extraction.tables,
        vec![vec![
            vec![cell("Benefit"), cell("Limit")],
            vec![cell("Dental (basic)"), None],
        ]]
    );
}

#[test]
fn malformed_xml_is_an_error() {
    assert!(parse_document_xml("<w:document><w:body></w:p></w:document>").is_err());
}

#[test]
fn reads_docx_archive_from_disk() {
    let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
    {
        let mut zip = zip::ZipWriter::new(file.as_file());
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(BODY.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    let extractor = DocxExtractor;
    assert_eq!(extractor.method(), ExtractionMethod::DocxStructure);
    let extraction = extractor.extract(file.path()).unwrap();
    assert!(extraction.text.starts_with("Policy Schedule\n"));
    assert_eq!(extraction.tables.len(), 1);
}

#[test]
fn non_zip_input_fails() {
    let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
    file.write_all(b"not a zip archive").unwrap();
    assert!(DocxExtractor.extract(file.path()).is_err());
}

fn wrap(body: &str) -> String {
    format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:v="urn:schemas-microsoft-com:vml"><w:body>{body}</w:body></w:document>"#
    )
}

#[test]
fn text_box_paragraph_folds_into_its_anchor() {
    let xml = wrap(
        "<w:p><w:r><w:t>Before box</w:t></w:r>\
         <w:r><w:pict><v:textbox><w:txbxContent>\
         <w:p><w:r><w:t>Boxed note</w:t></w:r></w:p>\
         </w:txbxContent></v:textbox></w:pict></w:r>\
         <w:r><w:t>after box</w:t></w:r></w:p>\
         <w:p><w:r><w:t>Next</w:t></w:r></w:p>",
    );
    let extraction = parse_document_xml(&xml).unwrap();
    assert_eq!(extraction.text, "Before box Boxed note after box\nNext\n");
}

#[test]
fn table_inside_text_box_keeps_its_grid() {
    let xml = wrap(
        "<w:p><w:r><w:t>Summary</w:t></w:r>\
         <w:r><w:pict><v:textbox><w:txbxContent>\
         <w:tbl><w:tr>\
         <w:tc><w:p><w:r><w:t>Copay</w:t></w:r></w:p></w:tc>\
         <w:tc><w:p><w:r><w:t>$20</w:t></w:r></w:p></w:tc>\
         </w:tr></w:tbl>\
         </w:txbxContent></v:textbox></w:pict></w:r></w:p>",
    );
    let extraction = parse_document_xml(&xml).unwrap();
    assert_eq!(extraction.text, "Summary Copay $20\n");
    assert_eq!(extraction.tables, vec![vec![vec![cell("Copay"), cell("$20")]]]);
}
