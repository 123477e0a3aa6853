//! Icon / cursor directory splitting into `RT_ICON`/`RT_CURSOR` sub-resources
//! plus a `RT_GROUP_ICON`/`RT_GROUP_CURSOR` directory (`spec.md` §4.5).

use scroll::{Pread, Pwrite, SizeWith};

use crate::error::{CompileError, Result};
use crate::nameord::NameOrOrdinal;
use crate::resource_type::{RT_CURSOR, RT_GROUP_CURSOR, RT_GROUP_ICON, RT_ICON};

use super::{write_resource, EmitContext};

/// Shared memory flags for icon/cursor sub-resources: `MOVEABLE |
/// DISCARDABLE | SHARED` (`spec.md` §4.5).
const SUBRESOURCE_FLAGS: u16 = 0x1010;

#[derive(Debug, Clone, Copy, Pread, Pwrite, SizeWith)]
#[repr(C)]
struct IcoDirHeader {
    reserved: u16,
    kind: u16,
    count: u16,
}

#[derive(Debug, Clone, Copy, Pread)]
#[repr(C)]
struct IcoDirEntry {
    width: u8,
    height: u8,
    color_count: u8,
    reserved: u8,
    planes_or_hotspot_x: u16,
    bit_count_or_hotspot_y: u16,
    bytes_in_res: u32,
    image_offset: u32,
}

#[derive(Debug, Clone, Copy, Pwrite, SizeWith)]
#[repr(C)]
struct GroupDirEntry {
    width: u8,
    height: u8,
    color_count: u8,
    reserved: u8,
    planes_or_hotspot_x: u16,
    bit_count_or_hotspot_y: u16,
    bytes_in_res: u32,
    id: u16,
}

/// Reads an `.ico`/`.cur` directory and emits one `RT_ICON`/`RT_CURSOR`
/// sub-resource per entry, followed by the `RT_GROUP_ICON`/
/// `RT_GROUP_CURSOR` resource whose payload mirrors the source directory
/// but substitutes a 16-bit id for each entry's 32-bit file offset
/// (`spec.md` §4.5, §8 scenario 7).
#[allow(clippy::too_many_arguments)]
pub fn emit_icon_or_cursor_group(
    file_bytes: &[u8],
    is_cursor: bool,
    group_name: &NameOrOrdinal,
    group_flags: u16,
    language_id: u16,
    version: u32,
    characteristics: u32,
    ctx: &mut EmitContext,
    out: &mut Vec<u8>,
) -> Result<()> {
    let header: IcoDirHeader = file_bytes
        .pread_with(0, scroll::LE)
        .map_err(|_| CompileError::Malformed("icon/cursor file too small for a directory header".to_string()))?;
    let expected_kind = if is_cursor { 2 } else { 1 };
    if header.kind != expected_kind {
        return Err(CompileError::Malformed(format!(
            "icon/cursor directory type mismatch: expected {expected_kind}, found {}",
            header.kind
        )));
    }

    let mut group_entries = Vec::with_capacity(header.count as usize);
    let mut offset = 6usize;
    for _ in 0..header.count {
        let entry: IcoDirEntry = file_bytes
            .pread_with(offset, scroll::LE)
            .map_err(|_| CompileError::Malformed("icon/cursor directory entry truncated".to_string()))?;
        offset += 16;

        let start = entry.image_offset as usize;
        let end = start
            .checked_add(entry.bytes_in_res as usize)
            .ok_or_else(|| CompileError::Malformed("icon/cursor entry byte count overflows file size".to_string()))?;
        let image = file_bytes
            .get(start..end)
            .ok_or_else(|| CompileError::Malformed("icon/cursor entry data offset out of file bounds".to_string()))?;

        let sub_id = ctx.next_icon_id();
        write_resource(
            out,
            &NameOrOrdinal::Ordinal(if is_cursor { RT_CURSOR } else { RT_ICON }),
            &NameOrOrdinal::Ordinal(sub_id),
            SUBRESOURCE_FLAGS,
            language_id,
            version,
            characteristics,
            image,
        );

        group_entries.push(GroupDirEntry {
            width: entry.width,
            height: entry.height,
            color_count: entry.color_count,
            reserved: entry.reserved,
            planes_or_hotspot_x: entry.planes_or_hotspot_x,
            bit_count_or_hotspot_y: entry.bit_count_or_hotspot_y,
            bytes_in_res: entry.bytes_in_res,
            id: sub_id,
        });
    }

    let mut payload = vec![0u8; 6 + group_entries.len() * 14];
    payload.pwrite_with(IcoDirHeader { reserved: 0, kind: expected_kind, count: header.count }, 0, scroll::LE).unwrap();
    let mut w = 6;
    for entry in &group_entries {
        payload.pwrite_with(*entry, w, scroll::LE).unwrap();
        w += 14;
    }

    write_resource(
        out,
        &NameOrOrdinal::Ordinal(if is_cursor { RT_GROUP_CURSOR } else { RT_GROUP_ICON }),
        group_name,
        group_flags,
        language_id,
        version,
        characteristics,
        &payload,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::options::CompileOptions;
    use std::path::PathBuf;

    fn one_entry_ico(image: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // ICON
        bytes.extend_from_slice(&1u16.to_le_bytes()); // count
        bytes.extend_from_slice(&[1, 1, 0, 0]); // width, height, colors, reserved
        bytes.extend_from_slice(&1u16.to_le_bytes()); // planes
        bytes.extend_from_slice(&32u16.to_le_bytes()); // bit count
        bytes.extend_from_slice(&(image.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&22u32.to_le_bytes()); // offset: 6 + 16
        bytes.extend_from_slice(image);
        bytes
    }

    #[test]
    fn single_entry_icon_emits_subresource_then_group() {
        let ico = one_entry_ico(b"fakeimg");
        let options = CompileOptions::new();
        let code_pages = crate::codepage::CodePageTable::new(options.default_code_page);
        let dirs = Vec::new();
        let resolver = crate::includes::FileResolver::new(&PathBuf::from("x.rc"), &dirs);
        let mut diags = Diagnostics::new();
        let mut ctx = EmitContext::new(&options, &code_pages, &resolver, &mut diags);
        let mut out = Vec::new();
        emit_icon_or_cursor_group(&ico, false, &NameOrOrdinal::Ordinal(1), 0x1030, 0x0409, 0, 0, &mut ctx, &mut out).unwrap();
        // one RT_ICON sub-resource header+data+pad, then the group resource.
        assert!(out.len() > 32);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let ico = one_entry_ico(b"x");
        let options = CompileOptions::new();
        let code_pages = crate::codepage::CodePageTable::new(options.default_code_page);
        let dirs = Vec::new();
        let resolver = crate::includes::FileResolver::new(&PathBuf::from("x.rc"), &dirs);
        let mut diags = Diagnostics::new();
        let mut ctx = EmitContext::new(&options, &code_pages, &resolver, &mut diags);
        let mut out = Vec::new();
        assert!(emit_icon_or_cursor_group(&ico, true, &NameOrOrdinal::Ordinal(1), 0, 0, 0, 0, &mut ctx, &mut out).is_err());
    }
}
