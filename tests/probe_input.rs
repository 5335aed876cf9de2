use policy_ingest::{
    config::Config,
    error::ProcessError,
    probe::{FileType, probe_input},
};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::Path;

fn temp_with(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn file_type_from_extension() {
    assert_eq!(FileType::from_path(Path::new("a.pdf")), Some(FileType::Pdf));
    assert_eq!(FileType::from_path(Path::new("B.PDF")), Some(FileType::Pdf));
    assert_eq!(FileType::from_path(Path::new("c.DocX")), Some(FileType::Docx));
    assert_eq!(FileType::from_path(Path::new("d.doc")), None);
    assert_eq!(FileType::from_path(Path::new("noext")), None);
}

#[test]
fn unsupported_type_is_rejected() {
    let cfg = Config::default();
    let f = temp_with(".txt", b"hello");
    let err = probe_input(&cfg, f.path()).unwrap_err();
    assert!(matches!(err, ProcessError::UnsupportedFileType(ref e) if e == ".txt"));
    assert_eq!(err.kind(), "unsupported_file_type");
}

#[test]
fn missing_file_is_rejected() {
    let cfg = Config::default();
    let err = probe_input(&cfg, Path::new("/definitely/not/here.pdf")).unwrap_err();
    assert!(matches!(err, ProcessError::InputRejected(_)));
}

#[test]
fn oversized_file_is_rejected() {
    let mut cfg = Config::default();
    cfg.limits.max_input_file_bytes = 4;
    let f = temp_with(".pdf", b"%PDF-1.7 too big");
    let err = probe_input(&cfg, f.path()).unwrap_err();
    assert!(err.to_string().contains("max_input_file_bytes"));
}

#[test]
fn probe_reports_size_and_hash() {
    let cfg = Config::default();
    let bytes = b"PK fake docx bytes";
    let f = temp_with(".docx", bytes);
    let probe = probe_input(&cfg, f.path()).unwrap();
    assert_eq!(probe.file_type, FileType::Docx);
    assert_eq!(probe.file_bytes, bytes.len() as u64);
    assert_eq!(probe.sha256, format!("{:x}", Sha256::digest(bytes)));
}
