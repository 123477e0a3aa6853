//! ACCELERATORS table emission (`spec.md` §4.5 "Accelerators").

use std::path::PathBuf;

use rescomp::{CompileOptions, Compiler};

fn compile(source: &str) -> Vec<u8> {
    let compiler = Compiler::new(CompileOptions::new());
    compiler.compile(source.as_bytes(), &PathBuf::from("test.rc")).unwrap().bytes
}

/// The fixed-width on-disk accelerator-table-entry layout: `flags:u16,
/// ansi:u16, id:u16, padding:u16` (`spec.md` §4.5).
fn entry_at(payload: &[u8], index: usize) -> (u16, u16, u16) {
    let base = index * 8;
    let flags = u16::from_le_bytes(payload[base..base + 2].try_into().unwrap());
    let ansi = u16::from_le_bytes(payload[base + 2..base + 4].try_into().unwrap());
    let id = u16::from_le_bytes(payload[base + 4..base + 6].try_into().unwrap());
    (flags, ansi, id)
}

#[test]
fn control_char_accelerator_and_last_entry_flag() {
    let bytes = compile("1 ACCELERATORS { \"^C\", 100, VIRTKEY }");
    let data_size = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    assert_eq!(data_size, 8);
    let payload = &bytes[64..64 + data_size as usize];
    let (_, ansi, id) = entry_at(payload, 0);
    assert_eq!(ansi, 3); // '^C' -> 0x43 - 0x40
    assert_eq!(id, 100);
}

#[test]
fn numeric_event_sets_ascii_entry() {
    let bytes = compile("1 ACCELERATORS { 65, 200 }");
    let data_size = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    let payload = &bytes[64..64 + data_size as usize];
    let (_, ansi, id) = entry_at(payload, 0);
    assert_eq!(ansi, 65);
    assert_eq!(id, 200);
}

#[test]
fn virtkey_and_ascii_together_is_rejected() {
    let compiler = Compiler::new(CompileOptions::new());
    let source = "1 ACCELERATORS { \"a\", 1, VIRTKEY, ASCII }";
    assert!(compiler.compile(source.as_bytes(), &PathBuf::from("test.rc")).is_err());
}

#[test]
fn virtkey_and_ascii_together_on_a_numeric_event_is_also_rejected() {
    let compiler = Compiler::new(CompileOptions::new());
    let source = "1 ACCELERATORS { 65, 1, VIRTKEY, ASCII }";
    assert!(compiler.compile(source.as_bytes(), &PathBuf::from("test.rc")).is_err());
}

#[test]
fn control_char_accelerator_under_virtkey_warns_its_not_equivalent() {
    let compiler = Compiler::new(CompileOptions::new());
    let source = "1 ACCELERATORS { \"^C\", 100, VIRTKEY }";
    let output = compiler.compile(source.as_bytes(), &PathBuf::from("test.rc")).unwrap();
    assert!(!output.diagnostics.is_empty());
}
