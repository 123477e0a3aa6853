//! MENU / MENUEX emission driven end-to-end from source text (`spec.md`
//! §4.5 "Menu / MenuEx").

use std::path::PathBuf;

use rescomp::{CompileOptions, Compiler};

fn compile(source: &str) -> Vec<u8> {
    let compiler = Compiler::new(CompileOptions::new());
    compiler.compile(source.as_bytes(), &PathBuf::from("test.rc")).unwrap().bytes
}

const MF_POPUP: u16 = 0x10;
const MF_END: u16 = 0x80;

#[test]
fn nested_popup_last_item_sets_end_bit_at_each_level() {
    let source = r#"1 MENU {
        POPUP "File" {
            MENUITEM "New", 101
            MENUITEM "Exit", 102
        }
    }"#;
    let bytes = compile(source);
    let header_size = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
    let payload_start = 32 + header_size as usize;
    // Classic MENU payload starts directly with the popup item: flags:u16.
    let popup_flags = u16::from_le_bytes(bytes[payload_start..payload_start + 2].try_into().unwrap());
    assert_eq!(popup_flags & MF_POPUP, MF_POPUP);
    assert_eq!(popup_flags & MF_END, MF_END); // only item at the top level
}

#[test]
fn empty_popup_is_a_hard_error() {
    let compiler = Compiler::new(CompileOptions::new());
    let source = r#"1 MENU { POPUP "Empty" { } }"#;
    assert!(compiler.compile(source.as_bytes(), &PathBuf::from("test.rc")).is_err());
}

#[test]
fn menuex_item_carries_help_id_on_popups() {
    let source = r#"1 MENUEX {
        POPUP "File", 1, 0, 0, 77 {
            MENUITEM "Exit", 102
        }
    }"#;
    let bytes = compile(source);
    let header_size = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
    let payload_start = 32 + header_size as usize;
    // MENUEX header: version:u16, header_len:u16, help_id:u32 (8 bytes),
    // then item: type:u32, state:u32, id:u32, flags:u16, help_id:u32 (popup).
    let item_start = payload_start + 8;
    let help_id = u32::from_le_bytes(bytes[item_start + 14..item_start + 18].try_into().unwrap());
    assert_eq!(help_id, 77);
}
