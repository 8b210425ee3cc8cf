//! File-level import tests.

use std::fs;

use booklend_importer::{ImportError, RosterImporter};

#[test]
fn test_import_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kelas.txt");
    fs::write(&path, "Year 2 Bestari\n1. Ali\n2. Siti\n\nYear 3\n- Muthu\n").unwrap();

    let result = RosterImporter::new().import_file(&path).unwrap();
    assert_eq!(result.rows.len(), 3);
    assert_eq!(result.rows[1].class_name, "BESTARI");
    assert_eq!(result.rows[2].year, 3);
    assert_eq!(result.rows[2].class_name, "NONE");
}

#[test]
fn test_import_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.csv");
    fs::write(&path, "Name,Year,Class\nAli,4,Cerdik\nSiti,4,Cerdik\n").unwrap();

    let result = RosterImporter::new().import_file(&path).unwrap();
    assert_eq!(result.rows.len(), 2);
    assert!(result.rows.iter().all(|r| r.year == 4 && r.has_class()));
}

#[test]
fn test_document_needs_extractor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.png");
    fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

    let err = RosterImporter::new().import_file(&path).unwrap_err();
    assert!(matches!(err, ImportError::NoExtractor(mime) if mime == "image/png"));
}

#[test]
fn test_unsupported_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let importer = RosterImporter::new();

    let err = importer.import_file(&dir.path().join("roster.docx")).unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFile(_)));

    let err = importer.import_file(&dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, ImportError::Io { .. }));
}
