//! STRINGTABLE bundling and duplicate-id rules (`spec.md` §4.5 "StringTable").

use std::path::PathBuf;

use rescomp::{CompileError, CompileOptions, Compiler};

fn compile(source: &str) -> Result<rescomp::CompileOutput, CompileError> {
    let compiler = Compiler::new(CompileOptions::new());
    compiler.compile(source.as_bytes(), &PathBuf::from("test.rc"))
}

#[test]
fn entries_in_the_same_bundle_share_one_resource() {
    let bytes = compile(r#"STRINGTABLE { 0, "zero" 1, "one" }"#).unwrap().bytes;
    // sentinel (32) + one RT_STRING header, no second bundle.
    assert!(bytes.len() > 32);
    let data_size = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    // 16 length-prefixed slots, two of them non-empty ("zero"=4, "one"=3).
    assert_eq!(data_size, 2 * 16 + 4 + 3);
}

#[test]
fn ids_sixteen_apart_land_in_different_bundles() {
    let bytes = compile(r#"STRINGTABLE { 0, "a" 16, "b" }"#).unwrap().bytes;
    // sentinel + two full resource headers (32 each) + two 34-byte payloads
    // (16 slots * 2 bytes + 2 bytes of text each), each padded to 4.
    assert!(bytes.len() >= 32 + 32 + 34 + 32 + 34);
}

#[test]
fn duplicate_id_within_one_statement_is_a_hard_error() {
    let err = compile(r#"STRINGTABLE { 1, "first" 1, "second" }"#).unwrap_err();
    assert!(matches!(err, CompileError::DuplicateStringId(1)));
}

#[test]
fn duplicate_id_across_separate_statements_is_a_hard_error() {
    let source = r#"
        STRINGTABLE { 1, "first" }
        STRINGTABLE { 1, "second" }
    "#;
    let err = compile(source).unwrap_err();
    assert!(matches!(err, CompileError::DuplicateStringId(1)));
}

#[test]
fn same_id_under_different_languages_is_not_a_duplicate() {
    let source = r#"
        LANGUAGE 0x09, 0x01
        STRINGTABLE { 1, "english" }
        LANGUAGE 0x07, 0x01
        STRINGTABLE { 1, "german" }
    "#;
    let output = compile(source).unwrap();
    assert!(output.bytes.len() > 64);
}
