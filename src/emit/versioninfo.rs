//! VERSIONINFO emission (`spec.md` §4.5 "VersionInfo", §6).
//!
//! Each block is `length:u16, value_length:u16, type:u16 (0=binary,
//! 1=text), key:utf16-null-terminated, pad-to-4, values, children`. The
//! root block's key is `VS_VERSION_INFO` and its value is the fixed
//! `VS_FIXEDFILEINFO` struct; its children are the caller's `BLOCK`s.

use crate::ast::{TopLevel, VersionBlock, VersionInfoResource, VersionValue};
use crate::diagnostics::Reason;
use crate::error::Result;
use crate::nameord::NameOrOrdinal;
use crate::resource_type::RT_VERSION;
use crate::token::Span;

use super::{characteristics_of, language_id_of, version_of, write_resource, EmitContext, ResBuf};

const VS_FFI_SIGNATURE: u32 = 0xFEEF_04BD;
const VS_FFI_STRUC_VERSION: u32 = 0x0001_0000;

pub fn emit(stmt: &TopLevel, ctx: &mut EmitContext, out: &mut Vec<u8>) -> Result<()> {
    let TopLevel::VersionInfo(resource) = stmt else { unreachable!() };
    let payload = build_root(resource, ctx.diagnostics);
    write_resource(
        out,
        &NameOrOrdinal::Ordinal(RT_VERSION),
        &resource.id,
        resource.attrs.memory_flags.unwrap_or(0x30),
        language_id_of(&resource.attrs, ctx),
        version_of(&resource.attrs),
        characteristics_of(&resource.attrs),
        &payload,
    );
    Ok(())
}

fn build_root(resource: &VersionInfoResource, diagnostics: &mut crate::diagnostics::Diagnostics) -> Vec<u8> {
    let fixed = build_fixed_file_info(resource);
    let mut after = ResBuf::new();
    push_key(&mut after, "VS_VERSION_INFO");
    after.align4();
    after.bytes(&fixed);
    for block in &resource.blocks {
        after.bytes(&build_block(block, diagnostics));
    }
    let after = after.into_vec();
    let mut out = ResBuf::new();
    out.u16((6 + after.len()) as u16);
    out.u16(fixed.len() as u16);
    out.u16(0); // binary
    out.bytes(&after);
    out.into_vec()
}

fn build_fixed_file_info(resource: &VersionInfoResource) -> Vec<u8> {
    let mut buf = ResBuf::new();
    buf.u32(VS_FFI_SIGNATURE);
    buf.u32(VS_FFI_STRUC_VERSION);
    buf.u32(pack_version(resource.file_version[0], resource.file_version[1]));
    buf.u32(pack_version(resource.file_version[2], resource.file_version[3]));
    buf.u32(pack_version(resource.product_version[0], resource.product_version[1]));
    buf.u32(pack_version(resource.product_version[2], resource.product_version[3]));
    buf.u32(resource.file_flags_mask);
    buf.u32(resource.file_flags);
    buf.u32(resource.file_os);
    buf.u32(resource.file_type);
    buf.u32(resource.file_subtype);
    buf.u32(0); // dwFileDateMS
    buf.u32(0); // dwFileDateLS
    buf.into_vec()
}

fn pack_version(high: u16, low: u16) -> u32 {
    ((high as u32) << 16) | low as u32
}

fn build_block(block: &VersionBlock, diagnostics: &mut crate::diagnostics::Diagnostics) -> Vec<u8> {
    let mut after = ResBuf::new();
    push_key(&mut after, &block.key);
    after.align4();
    let (type_code, value_bytes, value_length) = value_payload(&block.values, diagnostics);
    after.bytes(&value_bytes);
    for child in &block.children {
        after.bytes(&build_block(child, diagnostics));
    }
    let after = after.into_vec();
    let mut out = ResBuf::new();
    out.u16((6 + after.len()) as u16);
    out.u16(value_length);
    out.u16(type_code);
    out.bytes(&after);
    out.into_vec()
}

fn push_key(buf: &mut ResBuf, key: &str) {
    for unit in key.encode_utf16() {
        buf.u16(unit);
    }
    buf.u16(0);
}

/// Builds the `value_length`/`type`/bytes triple for a `VALUE` statement's
/// right-hand side. A value that mixes strings and numbers cannot be given
/// an unambiguous on-disk length (`spec.md` §4.5, §7) — rather than
/// reproduce the reference's miscompile, numbers are rendered as their
/// decimal text and the whole value is written as text, with a warning.
fn value_payload(values: &[VersionValue], diagnostics: &mut crate::diagnostics::Diagnostics) -> (u16, Vec<u8>, u16) {
    if values.is_empty() {
        return (1, Vec::new(), 0);
    }
    let all_numeric = values.iter().all(|v| matches!(v, VersionValue::Num(_)));
    if all_numeric {
        let mut buf = ResBuf::new();
        for v in values {
            if let VersionValue::Num(n) = v {
                buf.u16(n.as_u16());
            }
        }
        let bytes = buf.into_vec();
        let len = bytes.len() as u16;
        return (0, bytes, len);
    }

    let all_text = values.iter().all(|v| matches!(v, VersionValue::Str(_)));
    if !all_text {
        diagnostics.warn(Span::default(), Reason::VersionInfoMixedValueLength);
    }

    let mut units: Vec<u16> = Vec::new();
    for v in values {
        match v {
            VersionValue::Str(s) => units.extend(string_value_units(s)),
            VersionValue::Num(n) => units.extend(n.value.to_string().encode_utf16()),
        }
    }
    units.push(0);
    let mut buf = ResBuf::new();
    for unit in &units {
        buf.u16(*unit);
    }
    (1, buf.into_vec(), units.len() as u16)
}

fn string_value_units(value: &crate::strings::StringValue) -> Vec<u16> {
    match value {
        crate::strings::StringValue::Wide(units) => units.clone(),
        crate::strings::StringValue::Narrow(bytes) => bytes.iter().map(|&b| b as u16).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CommonAttrs;
    use crate::diagnostics::Diagnostics;
    use crate::numbers::Number;
    use crate::options::CompileOptions;
    use std::path::PathBuf;

    fn bare_resource() -> VersionInfoResource {
        VersionInfoResource {
            id: NameOrOrdinal::Ordinal(1),
            attrs: CommonAttrs::default(),
            file_version: [1, 0, 0, 0],
            product_version: [1, 0, 0, 0],
            file_flags_mask: 0,
            file_flags: 0,
            file_os: 0,
            file_type: 0,
            file_subtype: 0,
            blocks: Vec::new(),
            span: Default::default(),
        }
    }

    #[test]
    fn root_block_carries_fixed_file_info_as_binary_value() {
        let mut diags = Diagnostics::new();
        let resource = bare_resource();
        let bytes = build_root(&resource, &mut diags);
        let value_length = u16::from_le_bytes([bytes[2], bytes[3]]);
        assert_eq!(value_length, 52);
        let type_code = u16::from_le_bytes([bytes[4], bytes[5]]);
        assert_eq!(type_code, 0);
    }

    #[test]
    fn mixed_values_warn_and_fall_back_to_text() {
        let mut diags = Diagnostics::new();
        let values = vec![
            VersionValue::Str(crate::strings::StringValue::Narrow(b"1".to_vec())),
            VersionValue::Num(Number::new(2, false)),
        ];
        let (type_code, _, _) = value_payload(&values, &mut diags);
        assert_eq!(type_code, 1);
        assert!(!diags.is_empty());
    }

    #[test]
    fn full_resource_emits_without_error() {
        let stmt = TopLevel::VersionInfo(bare_resource());
        let options = CompileOptions::new();
        let code_pages = crate::codepage::CodePageTable::new(options.default_code_page);
        let dirs = Vec::new();
        let resolver = crate::includes::FileResolver::new(&PathBuf::from("x.rc"), &dirs);
        let mut diags = Diagnostics::new();
        let mut ctx = EmitContext::new(&options, &code_pages, &resolver, &mut diags);
        let mut out = Vec::new();
        emit(&stmt, &mut ctx, &mut out).unwrap();
        assert!(out.len() > 64);
    }
}
