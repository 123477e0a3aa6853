//! RCDATA / user-defined raw-data emission, and the generic external-file
//! resource path (`spec.md` §4.5 "Raw data", §4.6).

use crate::ast::{RawDataItem, TopLevel};
use crate::error::{CompileError, Result};
use crate::nameord::NameOrOrdinal;
use crate::resource_type::{memory_flags, Resource};

use super::{characteristics_of, language_id_of, version_of, write_resource, EmitContext, ResBuf};

/// Emits the concatenation of a raw-data item list (`spec.md` §4.5): each
/// number writes 2 or 4 bytes per its `is_long` flag, each string writes its
/// already-transcoded bytes with no terminator.
pub fn raw_data_bytes(items: &[RawDataItem]) -> Vec<u8> {
    let mut buf = ResBuf::new();
    for item in items {
        match item {
            RawDataItem::Number(n) => {
                if n.is_long {
                    buf.u32(n.value);
                } else {
                    buf.u16(n.as_u16());
                }
            }
            RawDataItem::Narrow(s) | RawDataItem::Wide(s) => {
                buf.bytes(&match s {
                    crate::strings::StringValue::Narrow(bytes) => bytes.clone(),
                    crate::strings::StringValue::Wide(units) => {
                        units.iter().flat_map(|u| u.to_le_bytes()).collect()
                    }
                });
            }
        }
    }
    buf.into_vec()
}

fn resource_type_value(resource_type: &Resource, numeric_type: Option<u16>, type_name: Option<&str>) -> NameOrOrdinal {
    if let Some(n) = numeric_type {
        return NameOrOrdinal::Ordinal(n);
    }
    use Resource::*;
    let builtin = match resource_type {
        RcData => Some(crate::resource_type::RT_RCDATA),
        Bitmap => Some(crate::resource_type::RT_BITMAP),
        Html => Some(crate::resource_type::RT_HTML),
        MessageTable => Some(crate::resource_type::RT_MESSAGETABLE),
        Toolbar => Some(crate::resource_type::RT_TOOLBAR),
        PlugPlay => Some(crate::resource_type::RT_PLUGPLAY),
        Vxd => Some(crate::resource_type::RT_VXD),
        Font => Some(crate::resource_type::RT_FONT),
        DlgInclude => Some(crate::resource_type::RT_DLGINCLUDE),
        _ => None,
    };
    match builtin {
        Some(n) => NameOrOrdinal::Ordinal(n),
        None => match type_name {
            Some(name) => NameOrOrdinal::from_name_text(name),
            None => NameOrOrdinal::from_name_text(&format!("{resource_type:?}").to_ascii_uppercase()),
        },
    }
}

pub fn emit_raw_data(stmt: &TopLevel, ctx: &mut EmitContext, out: &mut Vec<u8>) -> Result<()> {
    let TopLevel::ResourceRawData { id, resource_type, numeric_type, type_name, attrs, items, .. } = stmt else {
        unreachable!()
    };
    let data = raw_data_bytes(items);
    write_resource(
        out,
        &resource_type_value(resource_type, *numeric_type, type_name.as_deref()),
        id,
        attrs.memory_flags.unwrap_or_else(|| memory_flags::default_for(resource_type)),
        language_id_of(attrs, ctx),
        version_of(attrs),
        characteristics_of(attrs),
        &data,
    );
    Ok(())
}

pub fn emit_external(stmt: &TopLevel, ctx: &mut EmitContext, out: &mut Vec<u8>) -> Result<()> {
    let TopLevel::ResourceExternal { id, resource_type, numeric_type, type_name, attrs, filename_expr, .. } = stmt else {
        unreachable!()
    };
    let flags = attrs.memory_flags.unwrap_or_else(|| memory_flags::default_for(resource_type));
    let language_id = language_id_of(attrs, ctx);
    let version = version_of(attrs);
    let characteristics = characteristics_of(attrs);

    match resource_type {
        Resource::Icon | Resource::Cursor => {
            let bytes = ctx.resolver.read(filename_expr)?;
            super::icon::emit_icon_or_cursor_group(
                &bytes,
                *resource_type == Resource::Cursor,
                id,
                flags,
                language_id,
                version,
                characteristics,
                ctx,
                out,
            )
        }
        Resource::Bitmap => {
            let bytes = ctx.resolver.read(filename_expr)?;
            let data = strip_bitmap_file_header(&bytes)?;
            write_resource(out, &NameOrOrdinal::Ordinal(crate::resource_type::RT_BITMAP), id, flags, language_id, version, characteristics, &data);
            Ok(())
        }
        _ => {
            let bytes = ctx.resolver.read(filename_expr)?;
            write_resource(out, &resource_type_value(resource_type, *numeric_type, type_name.as_deref()), id, flags, language_id, version, characteristics, &bytes);
            Ok(())
        }
    }
}

/// Validates and strips the 14-byte `BITMAPFILEHEADER` from a `.bmp` file
/// (`spec.md` §4.5, "Bitmap"). Rejects the input if the declared
/// `biClrUsed`-times-entry-size palette would exceed the remaining bytes,
/// rather than reproducing the reference's over-read miscompile.
fn strip_bitmap_file_header(bytes: &[u8]) -> Result<Vec<u8>> {
    const FILE_HEADER_LEN: usize = 14;
    if bytes.len() < FILE_HEADER_LEN + 4 {
        return Err(CompileError::Malformed("bitmap file too small to contain a BITMAPFILEHEADER".to_string()));
    }
    let dib_header_size = u32::from_le_bytes(bytes[FILE_HEADER_LEN..FILE_HEADER_LEN + 4].try_into().unwrap()) as usize;
    if dib_header_size != 12 && dib_header_size < 40 {
        return Err(CompileError::Malformed(format!(
            "bitmap DIB header size {dib_header_size} is neither 12 nor >= 40"
        )));
    }
    let remainder = &bytes[FILE_HEADER_LEN..];
    if dib_header_size >= 40 && remainder.len() >= 36 {
        let bit_count = u16::from_le_bytes(remainder[14..16].try_into().unwrap());
        let colors_used = u32::from_le_bytes(remainder[32..36].try_into().unwrap()) as usize;
        if bit_count <= 8 {
            let palette_entries = if colors_used != 0 { colors_used } else { 1usize << bit_count };
            let palette_bytes = palette_entries * 4;
            if dib_header_size + palette_bytes > remainder.len() {
                return Err(CompileError::Malformed(
                    "bitmap declares a palette larger than the remaining file data".to_string(),
                ));
            }
        }
    }
    Ok(remainder.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbers::Number;

    #[test]
    fn raw_data_mixes_numbers_and_strings() {
        let items = vec![
            RawDataItem::Number(Number::new(1, false)),
            RawDataItem::Narrow(crate::strings::StringValue::Narrow(b"2".to_vec())),
            RawDataItem::Wide(crate::strings::StringValue::Wide(vec!['3' as u16])),
        ];
        let bytes = raw_data_bytes(&items);
        assert_eq!(bytes, vec![0x01, 0x00, b'2', b'3', 0x00]);
    }

    #[test]
    fn wrap_add_promoted_to_long_writes_four_bytes() {
        let items = vec![RawDataItem::Number(Number::new(0x1_0000, true))];
        assert_eq!(raw_data_bytes(&items), vec![0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn bitmap_strip_removes_14_byte_file_header() {
        let mut bytes = vec![0u8; 14];
        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 32]); // rest of BITMAPINFOHEADER
        let stripped = strip_bitmap_file_header(&bytes).unwrap();
        assert_eq!(stripped.len(), bytes.len() - 14);
    }

    #[test]
    fn bitmap_too_small_is_rejected() {
        assert!(strip_bitmap_file_header(&[0u8; 4]).is_err());
    }
}
