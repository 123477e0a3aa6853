//! DIALOG / DIALOGEX emission (`spec.md` §4.5 "Dialog").

use std::path::PathBuf;

use rescomp::{CompileOptions, Compiler};

fn compile(source: &str) -> Vec<u8> {
    let compiler = Compiler::new(CompileOptions::new());
    compiler.compile(source.as_bytes(), &PathBuf::from("test.rc")).unwrap().bytes
}

const WS_CHILD: u32 = 0x4000_0000;
const WS_VISIBLE: u32 = 0x1000_0000;
const DS_SETFONT: u32 = 0x40;

#[test]
fn classic_dialog_with_one_control_has_no_signature_word() {
    let source = r#"1 DIALOG 0, 0, 200, 100
    STYLE 0x10
    CAPTION "Hi"
    {
        LTEXT "label", 100, 1, 1, 50, 10
    }"#;
    let bytes = compile(source);
    let header_size = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
    let payload_start = 32 + header_size as usize;
    let style = u32::from_le_bytes(bytes[payload_start..payload_start + 4].try_into().unwrap());
    assert_eq!(style, 0x10);
    let count = u16::from_le_bytes(bytes[payload_start + 8..payload_start + 10].try_into().unwrap());
    assert_eq!(count, 1);
}

#[test]
fn font_statement_sets_ds_setfont_bit() {
    let source = r#"1 DIALOG 0, 0, 200, 100
    FONT 8, "MS Shell Dlg"
    { }"#;
    let bytes = compile(source);
    let header_size = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
    let payload_start = 32 + header_size as usize;
    let style = u32::from_le_bytes(bytes[payload_start..payload_start + 4].try_into().unwrap());
    assert_eq!(style & DS_SETFONT, DS_SETFONT);
}

#[test]
fn predefined_control_gets_implicit_child_and_visible_styles() {
    let source = r#"1 DIALOG 0, 0, 200, 100 {
        LTEXT "label", 100, 1, 1, 50, 10
    }"#;
    let bytes = compile(source);
    let header_size = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
    let payload_start = 32 + header_size as usize;
    // header (14 bytes for classic: style,exstyle,count,x,y,w,h) + menu(2) + class(2) + title(2)
    let control_start = payload_start + 4 + 4 + 2 + 2 * 4 + 2 + 2 + 2;
    let control_start = (control_start + 3) & !3; // controls are 4-byte aligned
    let control_style = u32::from_le_bytes(bytes[control_start..control_start + 4].try_into().unwrap());
    assert_eq!(control_style & (WS_CHILD | WS_VISIBLE), WS_CHILD | WS_VISIBLE);
}

#[test]
fn class_ordinal_stickiness_forces_later_menu_value_to_an_ordinal() {
    // MENU resolves to an ordinal first; the CLASS value that follows would
    // independently classify as a Name (decimal parse aborts on the 'a'),
    // but stickiness forces it to the digit-leading ordinal parse instead.
    let source = r#"1 DIALOGEX 0, 0, 200, 100
    MENU 10
    CLASS 5abc
    { }"#;
    let bytes = compile(source);
    let header_size = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
    let payload_start = 32 + header_size as usize;
    // DIALOGEX fixed part: version(2) + signature(2) + help_id(4) + exstyle(4)
    // + style(4) + count(2) + x,y,w,h(2*4) = 26 bytes, then menu, then class.
    let menu_start = payload_start + 26;
    let class_start = menu_start + 4;
    assert_eq!(&bytes[class_start..class_start + 4], &[0xFF, 0xFF, 0x05, 0x00]);
}

#[test]
fn dialogex_carries_help_id_and_signature() {
    let source = r#"1 DIALOGEX 0, 0, 200, 100, 42 { }"#;
    let bytes = compile(source);
    let header_size = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
    let payload_start = 32 + header_size as usize;
    let signature = u16::from_le_bytes(bytes[payload_start + 2..payload_start + 4].try_into().unwrap());
    assert_eq!(signature, 0xFFFF);
    let help_id = u32::from_le_bytes(bytes[payload_start + 4..payload_start + 8].try_into().unwrap());
    assert_eq!(help_id, 42);
}
