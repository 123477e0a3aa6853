//! ACCELERATORS table emission (`spec.md` §4.5).
//!
//! Payload is an array of 8-byte entries `{flags, event, idvalue, pad=0}`;
//! the last entry's flags have bit `0x80` (`end of table`) set.

use scroll::{Pwrite, SizeWith};

use crate::ast::TopLevel;
use crate::error::Result;
use crate::nameord::NameOrOrdinal;
use crate::resource_type::RT_ACCELERATOR;

use super::{characteristics_of, language_id_of, version_of, write_resource, EmitContext};

const FVIRTKEY: u16 = 0x01;
const FNOINVERT: u16 = 0x02;
const FSHIFT: u16 = 0x04;
const FCONTROL: u16 = 0x08;
const FALT: u16 = 0x10;
const FLAST_ENTRY: u16 = 0x80;

#[derive(Debug, Clone, Copy, Pwrite, SizeWith)]
#[repr(C)]
struct AccelEntry {
    flags: u16,
    event: u16,
    id_value: u16,
    pad: u16,
}

pub fn emit(stmt: &TopLevel, ctx: &mut EmitContext, out: &mut Vec<u8>) -> Result<()> {
    let TopLevel::Accelerators { id, attrs, entries, .. } = stmt else { unreachable!() };

    let mut payload = vec![0u8; entries.len() * 8];
    let mut w = 0;
    let last = entries.len().saturating_sub(1);
    for (i, entry) in entries.iter().enumerate() {
        let mut flags = 0u16;
        if entry.virtkey {
            flags |= FVIRTKEY;
        }
        if entry.shift {
            flags |= FSHIFT;
        }
        if entry.control {
            flags |= FCONTROL;
        }
        if entry.alt {
            flags |= FALT;
        }
        if entry.noinvert {
            flags |= FNOINVERT;
        }
        if i == last {
            flags |= FLAST_ENTRY;
        }
        payload
            .pwrite_with(
                AccelEntry { flags, event: entry.event, id_value: entry.id_value.as_u16(), pad: 0 },
                w,
                scroll::LE,
            )
            .unwrap();
        w += 8;
    }

    write_resource(
        out,
        &NameOrOrdinal::Ordinal(RT_ACCELERATOR),
        id,
        attrs.memory_flags.unwrap_or(0x30),
        language_id_of(attrs, ctx),
        version_of(attrs),
        characteristics_of(attrs),
        &payload,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AcceleratorEntry, CommonAttrs};
    use crate::diagnostics::Diagnostics;
    use crate::nameord::NameOrOrdinal;
    use crate::numbers::Number;
    use crate::options::CompileOptions;
    use std::path::PathBuf;

    #[test]
    fn last_entry_has_end_bit_set() {
        let entries = vec![
            AcceleratorEntry {
                event: 3,
                id_value: Number::new(1, false),
                virtkey: true,
                ascii: false,
                shift: false,
                control: false,
                alt: false,
                noinvert: false,
                span: Default::default(),
            },
            AcceleratorEntry {
                event: 4,
                id_value: Number::new(2, false),
                virtkey: false,
                ascii: false,
                shift: false,
                control: false,
                alt: false,
                noinvert: false,
                span: Default::default(),
            },
        ];
        let stmt = TopLevel::Accelerators {
            id: NameOrOrdinal::Ordinal(1),
            attrs: CommonAttrs::default(),
            entries,
            span: Default::default(),
        };
        let options = CompileOptions::new();
        let code_pages = crate::codepage::CodePageTable::new(options.default_code_page);
        let dirs = Vec::new();
        let resolver = crate::includes::FileResolver::new(&PathBuf::from("x.rc"), &dirs);
        let mut diags = Diagnostics::new();
        let mut ctx = EmitContext::new(&options, &code_pages, &resolver, &mut diags);
        let mut out = Vec::new();
        emit(&stmt, &mut ctx, &mut out).unwrap();
        // header (32 bytes, name ordinal => header_size 32) then 2 entries of 8 bytes.
        let payload = &out[32 + 32..32 + 32 + 16];
        let first_flags = u16::from_le_bytes([payload[0], payload[1]]);
        let second_flags = u16::from_le_bytes([payload[8], payload[9]]);
        assert_eq!(first_flags & FLAST_ENTRY, 0);
        assert_eq!(second_flags & FLAST_ENTRY, FLAST_ENTRY);
    }
}
