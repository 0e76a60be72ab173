/*!
 * Tests for file and encoding utilities
 */

use std::path::PathBuf;

use locflow::file_utils::FileManager;
use crate::common;

#[test]
fn test_generateOutputPath_shouldInsertLocale() {
    let path = FileManager::generate_output_path("/tmp/input/doc.txt", "/tmp/output", "fr");
    assert_eq!(path, PathBuf::from("/tmp/output/doc.fr.txt"));

    let no_extension = FileManager::generate_output_path("README", "out", "de-DE");
    assert_eq!(no_extension, PathBuf::from("out/README.de-DE"));
}

#[test]
fn test_collectInputs_directory_shouldFilterAndSort() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "b.txt", b"b").unwrap();
    common::create_test_file(dir.path(), "a.TXT", b"a").unwrap();
    common::create_test_file(dir.path(), "c.srt", b"c").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    common::create_test_file(&dir.path().join("nested"), "d.text", b"d").unwrap();

    let files = FileManager::collect_inputs(dir.path(), &["txt", ".text"]).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["a.TXT", "b.txt", "nested/d.text"]);
}

#[test]
fn test_collectInputs_singleFile_shouldReturnIt() {
    let dir = common::create_temp_dir().unwrap();
    let file = common::create_test_file(dir.path(), "notes.md", b"x").unwrap();
    assert_eq!(FileManager::collect_inputs(&file, &["txt"]).unwrap(), vec![file]);
}

#[test]
fn test_collectInputs_missingPath_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    assert!(FileManager::collect_inputs(dir.path().join("nope"), &["txt"]).is_err());
}

#[test]
fn test_decodeBytes_withBom_shouldOverrideDefault() {
    let decoded = FileManager::decode_bytes(b"\xEF\xBB\xBFcaf\xC3\xA9", "windows-1252").unwrap();
    assert_eq!(decoded.text, "café");
    assert_eq!(decoded.encoding, "UTF-8");
    assert!(decoded.has_bom);

    let utf16 = FileManager::decode_bytes(&[0xFF, 0xFE, b'h', 0, b'i', 0], "UTF-8").unwrap();
    assert_eq!(utf16.text, "hi");
    assert_eq!(utf16.encoding, "UTF-16LE");
}

#[test]
fn test_decodeBytes_withoutBom_shouldUseDefault() {
    let decoded = FileManager::decode_bytes(b"caf\xE9", "latin1").unwrap();
    assert_eq!(decoded.text, "café");
    assert!(!decoded.has_bom);
    assert!(FileManager::decode_bytes(b"x", "no-such-charset").is_err());
}

#[test]
fn test_encodeText_shouldHonourEncodingAndBom() {
    assert_eq!(FileManager::encode_text("é", "windows-1252", false).unwrap(), vec![0xE9]);
    assert_eq!(
        FileManager::encode_text("a", "UTF-8", true).unwrap(),
        vec![0xEF, 0xBB, 0xBF, b'a']
    );
    assert_eq!(
        FileManager::encode_text("a", "UTF-16BE", true).unwrap(),
        vec![0xFE, 0xFF, 0, b'a']
    );
    assert_eq!(FileManager::encode_text("a", "UTF-16BE", false).unwrap(), vec![0, b'a']);
    assert_eq!(FileManager::encode_text("€", "iso-8859-2", false).unwrap(), b"&#8364;".to_vec());
}

#[test]
fn test_writeOutput_shouldCreateParents() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("a/b/out.txt");
    FileManager::write_output(&path, b"done").unwrap();
    assert!(FileManager::file_exists(&path));
    assert_eq!(std::fs::read(&path).unwrap(), b"done");
}
