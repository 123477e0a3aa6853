//! Raw-data resource emission: sentinel header, wrap/long-promotion
//! arithmetic, and the zero-is-a-name rule (`spec.md` §8, scenarios 1-6).

use std::path::PathBuf;

use rescomp::{CompileOptions, Compiler};

fn compile(source: &str) -> Vec<u8> {
    let compiler = Compiler::new(CompileOptions::new());
    compiler.compile(source.as_bytes(), &PathBuf::from("test.rc")).unwrap().bytes
}

#[test]
fn empty_input_is_exactly_the_sentinel() {
    let bytes = compile("");
    assert_eq!(bytes.len(), 32);
    assert_eq!(&bytes[4..8], &32u32.to_le_bytes());
    assert!(bytes[8..].iter().all(|&b| b == 0));
}

#[test]
fn empty_rcdata_body_has_zero_data_size() {
    let bytes = compile("1 RCDATA { }");
    // sentinel (32) + header (32) exactly, no payload bytes.
    assert_eq!(bytes.len(), 64);
    let data_size = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    assert_eq!(data_size, 0);
}

#[test]
fn mixed_numbers_and_strings_concatenate_and_pad_to_four() {
    let bytes = compile("1 RCDATA { 1, \"2\", L\"3\" }");
    let data_size = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    assert_eq!(data_size, 5);
    let payload = &bytes[64..64 + 5];
    assert_eq!(payload, &[0x01, 0x00, b'2', b'3', 0x00]);
    // padded to a multiple of 4 after the header.
    assert_eq!((bytes.len() - 64) % 4, 0);
}

#[test]
fn u16_overflow_wraps() {
    let bytes = compile("1 RCDATA { 65535 + 1 }");
    let data_size = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    assert_eq!(data_size, 2);
    assert_eq!(&bytes[64..66], &[0x00, 0x00]);
}

#[test]
fn long_suffix_promotes_to_four_bytes() {
    let bytes = compile("1 RCDATA { 65535 + 1L }");
    let data_size = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    assert_eq!(data_size, 4);
    assert_eq!(&bytes[64..68], &[0x00, 0x00, 0x01, 0x00]);
}

#[test]
fn user_defined_type_keyword_is_emitted_verbatim() {
    let bytes = compile("1 MYTYPE { \"x\" }");
    // type field starts right after data_size/header_size, at offset 40.
    let expected_type: Vec<u8> = "MYTYPE\0".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    assert_eq!(&bytes[40..40 + expected_type.len()], expected_type.as_slice());
}

#[test]
fn zero_id_and_type_are_treated_as_the_name_zero() {
    let bytes = compile("0 0 { \"hello\" }");
    // Both type and name are Name("0") -> each is 6 bytes (4 "0" as one
    // UTF-16 unit plus a trailing NUL unit), so header_size = 8 + 6 + 6 = 20,
    // aligned to 20 (already a multiple of 4) + 16 trailing = 36.
    let header_size = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
    assert_eq!(header_size % 4, 0);
    let data_size = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    assert_eq!(data_size, 5);
    let payload_start = 32 + header_size as usize;
    assert_eq!(&bytes[payload_start..payload_start + 5], b"hello");
}
