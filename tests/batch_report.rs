use anyhow::{Context, Result};
use policy_ingest::{
    config::Config,
    engine::{Extraction, ExtractionChain, ExtractionMethod, Extractor},
    pipeline::Pipeline,
    report::SavedDocument,
    util::list_inputs,
};
use std::path::Path;

/// Returns the file contents as text, so fixtures decide what "extraction" yields.
struct FileContents(ExtractionMethod);

impl Extractor for FileContents {
    fn method(&self) -> ExtractionMethod {
        self.0
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let text = std::fs::read_to_string(path).context("reading fixture")?;
        Ok(Extraction::new(text, Vec::new()))
    }
}

fn pipeline() -> Pipeline {
    Pipeline::with_chains(
        &Config::default(),
        ExtractionChain::new(vec![Box::new(FileContents(ExtractionMethod::NativeText))]),
        ExtractionChain::new(vec![Box::new(FileContents(ExtractionMethod::DocxStructure))]),
    )
    .unwrap()
}

fn dataset() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("b_policy.pdf"),
        "Schedule of Benefits. Deductible: $500 per year. Exclusions: flood damage.",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("a_terms.docx"),
        "Definitions: Insured means the policy holder.",
    )
    .unwrap();
    std::fs::write(dir.path().join("c_blank.pdf"), "   ").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    dir
}

#[test]
fn lists_supported_files_sorted() {
    let dir = dataset();
    let names: Vec<String> = list_inputs(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a_terms.docx", "b_policy.pdf", "c_blank.pdf"]);
}

#[test]
fn batch_records_successes_and_failures() {
    let dir = dataset();
    let inputs = list_inputs(dir.path()).unwrap();
    let p = pipeline();
    let outcome = p.process_batch(&inputs, &p.default_params());

    assert_eq!(outcome.documents.len(), 2);
    let report = &outcome.report;
    assert_eq!(report.documents_attempted, 3);
    assert_eq!(report.documents_processed, 2);
    assert!(report.finished.is_some());
    assert_eq!(report.method_counts[&ExtractionMethod::NativeText], 1);
    assert_eq!(report.method_counts[&ExtractionMethod::DocxStructure], 1);

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("c_blank.pdf"));
    assert_eq!(report.failures[0].kind, "no_text_extracted");

    let policy = report
        .documents
        .iter()
        .find(|d| d.source == "b_policy.pdf")
        .unwrap();
    assert_eq!(policy.sections, vec!["cost_sharing", "coverage", "exclusions"]);
    assert_eq!(policy.chunks, 1);

    let summary = report.render_summary();
    assert!(summary.starts_with("Processed 2/3 documents (1 failed, 2 chunks)"));
    assert!(summary.contains("native_text: 1"));
    assert!(summary.contains("c_blank.pdf"));
}

#[test]
fn serialized_shapes() {
    let dir = dataset();
    let p = pipeline();
    let doc = p
        .process_document(&dir.path().join("b_policy.pdf"), &p.default_params())
        .unwrap();

    let doc_json = serde_json::to_value(&doc).unwrap();
    assert!(doc_json.get("cleanedText").is_some());
    assert!(doc_json.get("extractedSections").is_some());
    assert_eq!(doc_json["chunkMetadata"]["chunk_count"], 1);
    assert_eq!(doc_json["metadata"]["extraction_method"], "native_text");
    assert_eq!(doc_json["metadata"]["file_type"], "pdf");
    assert_eq!(doc_json["chunks"][0]["chunkId"], 0);
    assert_eq!(doc_json["chunks"][0]["chunkType"], "hybrid");

    let saved = serde_json::to_value(SavedDocument::from(&doc)).unwrap();
    for key in [
        "file_path",
        "cleaned_text",
        "extracted_sections",
        "tables",
        "metadata",
        "chunks",
    ] {
        assert!(saved.get(key).is_some(), "missing {key}");
    }

    let outcome = p.process_batch(&[dir.path().join("b_policy.pdf")], &p.default_params());
    let report_json = serde_json::to_value(&outcome.report).unwrap();
    assert_eq!(report_json["method_counts"]["native_text"], 1);
}
