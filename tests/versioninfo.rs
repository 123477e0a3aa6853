//! VERSIONINFO emission driven end-to-end from source text (`spec.md`
//! §4.5 "VersionInfo").

use std::path::PathBuf;

use rescomp::{CompileOptions, Compiler};

fn compile(source: &str) -> Vec<u8> {
    let compiler = Compiler::new(CompileOptions::new());
    compiler.compile(source.as_bytes(), &PathBuf::from("test.rc")).unwrap().bytes
}

#[test]
fn fixed_file_info_packs_the_four_part_versions() {
    let source = r#"1 VERSIONINFO
    FILEVERSION 1, 2, 3, 4
    PRODUCTVERSION 5, 6, 7, 8
    { }"#;
    let bytes = compile(source);
    let header_size = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
    let payload_start = 32 + header_size as usize;
    // root block header: length:u16, value_length:u16, type:u16 (6 bytes),
    // then "VS_VERSION_INFO\0" (16 UTF-16 units = 32 bytes), aligned to 4.
    let fixed_start = payload_start + 6 + 32;
    let signature = u32::from_le_bytes(bytes[fixed_start..fixed_start + 4].try_into().unwrap());
    assert_eq!(signature, 0xFEEF_04BD);
    let file_version_ms = u32::from_le_bytes(bytes[fixed_start + 8..fixed_start + 12].try_into().unwrap());
    assert_eq!(file_version_ms, (1u32 << 16) | 2);
    let file_version_ls = u32::from_le_bytes(bytes[fixed_start + 12..fixed_start + 16].try_into().unwrap());
    assert_eq!(file_version_ls, (3u32 << 16) | 4);
}

#[test]
fn nested_string_block_is_reachable_after_fixed_info() {
    let source = r#"1 VERSIONINFO {
        BLOCK "StringFileInfo" {
            BLOCK "040904B0" {
                VALUE "ProductName", "Widget"
            }
        }
    }"#;
    let bytes = compile(source);
    assert!(bytes.len() > 96);
}

#[test]
fn mixed_string_and_number_value_does_not_abort_the_compile() {
    let source = r#"1 VERSIONINFO {
        BLOCK "StringFileInfo" {
            BLOCK "040904B0" {
                VALUE "Mixed", "text", 1
            }
        }
    }"#;
    let output = Compiler::new(CompileOptions::new()).compile(source.as_bytes(), &PathBuf::from("test.rc")).unwrap();
    assert!(!output.diagnostics.is_empty());
}
