//! Per-resource-type binary emitters and the `.res` container writer
//! (`spec.md` §4.5/§6).
//!
//! Each emitter writes the on-disk resource header followed by its
//! payload; every field is little-endian, grounded in the teacher's
//! `scroll`-based `Pwrite`/`SizeWith` writer idiom (`src/pe/writer.rs`,
//! `src/pe/resource.rs`) for the handful of genuinely fixed-width binary
//! structs (icon directory entries, accelerator table entries), and plain
//! explicit little-endian pushes for the variable-width resource header
//! (name/type fields are not fixed size, so a single derived struct cannot
//! describe them).

mod accelerators;
mod dialog;
mod icon;
mod menu;
mod raw;
mod stringtable;
mod versioninfo;

use crate::ast::TopLevel;
use crate::error::Result;
use crate::nameord::NameOrOrdinal;

/// An append-only byte sink building up one `.res` stream. Exposes the
/// small set of primitive writes every emitter needs; all fields are
/// little-endian (`spec.md` §6).
#[derive(Debug, Default)]
pub struct ResBuf {
    bytes: Vec<u8>,
}

impl ResBuf {
    pub fn new() -> Self {
        ResBuf { bytes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    pub fn u16(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn bytes(&mut self, b: &[u8]) {
        self.bytes.extend_from_slice(b);
    }

    /// Writes a [`NameOrOrdinal`] in its on-disk form (`spec.md` §3/§6):
    /// `Ordinal` = `0xFFFF` then the 16-bit value; `Name` = UTF-16LE code
    /// units followed by a single `0x0000`.
    pub fn name_or_ordinal(&mut self, value: &NameOrOrdinal) {
        match value {
            NameOrOrdinal::Ordinal(n) => {
                self.u16(0xFFFF);
                self.u16(*n);
            }
            NameOrOrdinal::Name(units) => {
                for unit in units {
                    self.u16(*unit);
                }
                self.u16(0);
            }
        }
    }

    /// Pads the buffer up to the next 4-byte boundary with zero bytes.
    pub fn align4(&mut self) {
        let pad = (4 - (self.bytes.len() % 4)) % 4;
        for _ in 0..pad {
            self.bytes.push(0);
        }
    }
}

/// Rounds `n` up to the next multiple of 4.
pub fn align4_len(n: usize) -> usize {
    (n + 3) & !3
}

/// Cross-resource emitter state: the icon/cursor sub-resource id counter
/// and the per-line code-page table threaded through by the driver
/// (`spec.md` §5/§9, "Global mutable state").
pub struct EmitContext<'a> {
    pub options: &'a crate::options::CompileOptions,
    pub code_pages: &'a crate::codepage::CodePageTable,
    pub resolver: &'a crate::includes::FileResolver<'a>,
    pub diagnostics: &'a mut crate::diagnostics::Diagnostics,
    next_icon_id: u16,
}

impl<'a> EmitContext<'a> {
    pub fn new(
        options: &'a crate::options::CompileOptions,
        code_pages: &'a crate::codepage::CodePageTable,
        resolver: &'a crate::includes::FileResolver<'a>,
        diagnostics: &'a mut crate::diagnostics::Diagnostics,
    ) -> Self {
        EmitContext { options, code_pages, resolver, diagnostics, next_icon_id: 1 }
    }

    /// Assigns and returns the next free 16-bit icon/cursor sub-resource id,
    /// a global counter shared across the whole compilation (`spec.md`
    /// §4.5, "Icon / Cursor").
    fn next_icon_id(&mut self) -> u16 {
        let id = self.next_icon_id;
        self.next_icon_id = self.next_icon_id.wrapping_add(1);
        id
    }
}

/// Writes the mandatory empty sentinel header that precedes every `.res`
/// stream (`spec.md` §6): 32 zero-valued bytes except `header_size = 32`.
pub fn write_sentinel(out: &mut Vec<u8>) {
    let mut header = ResBuf::new();
    write_resource_header(&mut header, &NameOrOrdinal::Ordinal(0), &NameOrOrdinal::Ordinal(0), 0, 0, 0, 0, 0, 0);
    out.extend_from_slice(&header.into_vec());
}

/// Writes one resource header (`spec.md` §3/§6): `data_size`, `header_size`,
/// type, name, padding to 4 bytes, `data_version=0`, `memory_flags`,
/// `language_id`, `version`, `characteristics`.
#[allow(clippy::too_many_arguments)]
fn write_resource_header(
    out: &mut ResBuf,
    resource_type: &NameOrOrdinal,
    name: &NameOrOrdinal,
    data_size: u32,
    memory_flags: u16,
    language_id: u16,
    version: u32,
    characteristics: u32,
    data_version: u32,
) {
    let mut type_and_name = ResBuf::new();
    type_and_name.name_or_ordinal(resource_type);
    type_and_name.name_or_ordinal(name);
    let unpadded = 8 + type_and_name.len();
    // `header_size` covers everything up to and including the name field,
    // aligned to 4 bytes, plus the 16 fixed trailing bytes that follow
    // (data_version, memory_flags, language_id, version, characteristics)
    // (`spec.md` §3/§6).
    let header_size = (align4_len(unpadded) + 16) as u32;

    out.u32(data_size);
    out.u32(header_size);
    out.bytes(&type_and_name.into_vec());
    out.align4();
    out.u32(data_version);
    out.u16(memory_flags);
    out.u16(language_id);
    out.u32(version);
    out.u32(characteristics);
}

/// Appends one complete resource (header + payload + trailing padding) to
/// `out`.
#[allow(clippy::too_many_arguments)]
fn write_resource(
    out: &mut Vec<u8>,
    resource_type: &NameOrOrdinal,
    name: &NameOrOrdinal,
    memory_flags: u16,
    language_id: u16,
    version: u32,
    characteristics: u32,
    data: &[u8],
) {
    let mut header = ResBuf::new();
    write_resource_header(&mut header, resource_type, name, data.len() as u32, memory_flags, language_id, version, characteristics, 0);
    out.extend_from_slice(&header.into_vec());
    out.extend_from_slice(data);
    let pad = align4_len(data.len()) - data.len();
    out.extend(std::iter::repeat(0u8).take(pad));
}

/// Emits a whole parsed resource script's top-level statements into one
/// concatenated `.res` byte stream, preceded by the mandatory sentinel
/// header (`spec.md` §2, "Data flow").
pub fn emit_all(statements: &[TopLevel], ctx: &mut EmitContext) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_sentinel(&mut out);
    for stmt in statements {
        emit_statement(stmt, ctx, &mut out)?;
    }
    // STRINGTABLE bundles are collected across every statement in the tree
    // (`spec.md` §4.5/§9) rather than emitted one statement at a time, so
    // they are handled once here instead of inside `emit_statement`.
    stringtable::emit_all(statements, ctx, &mut out)?;
    Ok(out)
}

fn emit_statement(stmt: &TopLevel, ctx: &mut EmitContext, out: &mut Vec<u8>) -> Result<()> {
    match stmt {
        TopLevel::Language { .. } | TopLevel::Invalid { .. } => Ok(()),
        TopLevel::ResourceRawData { .. } => raw::emit_raw_data(stmt, ctx, out),
        TopLevel::ResourceExternal { .. } => raw::emit_external(stmt, ctx, out),
        TopLevel::StringTable { .. } => Ok(()),
        TopLevel::Accelerators { .. } => accelerators::emit(stmt, ctx, out),
        TopLevel::Dialog(_) => dialog::emit(stmt, ctx, out),
        TopLevel::Menu { .. } => menu::emit(stmt, ctx, out),
        TopLevel::VersionInfo(_) => versioninfo::emit(stmt, ctx, out),
        TopLevel::DlgInclude { id, attrs, filename, .. } => {
            let mut data = Vec::new();
            data.extend_from_slice(filename.as_bytes());
            data.push(0);
            write_resource(
                out,
                &type_for_numeric(crate::resource_type::RT_DLGINCLUDE),
                id,
                attrs.memory_flags.unwrap_or(0),
                language_id_of(attrs, ctx),
                version_of(attrs),
                characteristics_of(attrs),
                &data,
            );
            Ok(())
        }
    }
}

fn type_for_numeric(n: u16) -> NameOrOrdinal {
    NameOrOrdinal::Ordinal(n)
}

fn language_id_of(attrs: &crate::ast::CommonAttrs, ctx: &EmitContext) -> u16 {
    let (primary, sub) = attrs.language.unwrap_or(ctx.options.default_language_id);
    encode_language_id(primary, sub)
}

/// `primary_language:u10 | (sublanguage:u6 << 10)` packed into one `u16`
/// (`spec.md` §6, "Language id encoding").
pub fn encode_language_id(primary: u16, sublanguage: u16) -> u16 {
    (primary & 0x3FF) | (sublanguage << 10)
}

fn version_of(attrs: &crate::ast::CommonAttrs) -> u32 {
    attrs.version.map(|n| n.value).unwrap_or(0)
}

fn characteristics_of(attrs: &crate::ast::CommonAttrs) -> u32 {
    attrs.characteristics.map(|n| n.value).unwrap_or(0)
}
