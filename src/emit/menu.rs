//! MENU / MENUEX tree emission (`spec.md` §4.5 "Menu / MenuEx", §6).
//!
//! Classic `MENU` items are `flags:u16, id:u16, text` (popups omit the id
//! and are followed by their nested items); `MENUEX` items are
//! `type:u32, state:u32, id:u32, flags:u16, [help_id:u32 if popup], text`.
//! In both forms the last item at a given nesting level has `MF_END` set.

use crate::ast::{MenuItem, TopLevel};
use crate::error::Result;
use crate::nameord::NameOrOrdinal;
use crate::resource_type::RT_MENU;

use super::{characteristics_of, language_id_of, version_of, write_resource, EmitContext, ResBuf};

const MF_POPUP: u16 = 0x10;
const MF_END: u16 = 0x80;

pub fn emit(stmt: &TopLevel, ctx: &mut EmitContext, out: &mut Vec<u8>) -> Result<()> {
    let TopLevel::Menu { id, attrs, is_ex, items, .. } = stmt else { unreachable!() };

    let mut buf = ResBuf::new();
    if *is_ex {
        buf.u16(1); // version
        buf.u16(4); // header length
        buf.u32(0); // help_id
    }
    write_items(&mut buf, items, *is_ex);

    write_resource(
        out,
        &NameOrOrdinal::Ordinal(RT_MENU),
        id,
        attrs.memory_flags.unwrap_or(0x1030),
        language_id_of(attrs, ctx),
        version_of(attrs),
        characteristics_of(attrs),
        &buf.into_vec(),
    );
    Ok(())
}

fn write_items(buf: &mut ResBuf, items: &[MenuItem], is_ex: bool) {
    let last = items.len().saturating_sub(1);
    for (i, item) in items.iter().enumerate() {
        let is_last = i == last;
        if is_ex {
            write_item_ex(buf, item, is_last);
        } else {
            write_item_classic(buf, item, is_last);
        }
    }
}

fn write_item_classic(buf: &mut ResBuf, item: &MenuItem, is_last: bool) {
    match item {
        MenuItem::Separator => {
            let flags = if is_last { MF_END } else { 0 };
            buf.u16(flags);
            buf.u16(0);
            buf.u16(0);
        }
        MenuItem::Item { text, id, flags, .. } => {
            let mut flags = *flags;
            if is_last {
                flags |= MF_END;
            }
            buf.u16(flags);
            buf.u16(id.as_u16());
            write_text(buf, text);
        }
        MenuItem::Popup { text, flags, children, .. } => {
            let mut flags = *flags | MF_POPUP;
            if is_last {
                flags |= MF_END;
            }
            buf.u16(flags);
            write_text(buf, text);
            write_items(buf, children, false);
        }
    }
}

fn write_item_ex(buf: &mut ResBuf, item: &MenuItem, is_last: bool) {
    match item {
        MenuItem::Separator => {
            buf.u32(0);
            buf.u32(0);
            buf.u32(0);
            buf.u16(if is_last { MF_END } else { 0 });
            buf.u16(0);
            buf.align4();
        }
        MenuItem::Item { text, id, flags, menu_type, state, .. } => {
            buf.u32(*menu_type);
            buf.u32(*state);
            buf.u32(id.value);
            buf.u16(if is_last { flags | MF_END } else { *flags });
            write_text(buf, text);
            buf.align4();
        }
        MenuItem::Popup { text, id, flags, menu_type, state, help_id, children } => {
            buf.u32(*menu_type);
            buf.u32(*state);
            buf.u32(id.value);
            let item_flags = (if is_last { flags | MF_END } else { *flags }) | MF_POPUP;
            buf.u16(item_flags);
            if let Some(help_id) = help_id {
                buf.u32(*help_id);
            }
            write_text(buf, text);
            buf.align4();
            write_items(buf, children, true);
        }
    }
}

fn write_text(buf: &mut ResBuf, text: &crate::strings::StringValue) {
    match text {
        crate::strings::StringValue::Wide(units) => {
            for unit in units {
                buf.u16(*unit);
            }
        }
        crate::strings::StringValue::Narrow(bytes) => {
            for b in bytes {
                buf.u16(*b as u16);
            }
        }
    }
    buf.u16(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CommonAttrs;
    use crate::diagnostics::Diagnostics;
    use crate::numbers::Number;
    use crate::options::CompileOptions;
    use crate::strings::StringValue;
    use std::path::PathBuf;

    fn ctx_parts() -> (CompileOptions, crate::codepage::CodePageTable, Vec<std::path::PathBuf>) {
        let options = CompileOptions::new();
        let code_pages = crate::codepage::CodePageTable::new(options.default_code_page);
        (options, code_pages, Vec::new())
    }

    #[test]
    fn classic_menu_last_item_sets_end_bit() {
        let items = vec![
            MenuItem::Item {
                text: StringValue::Narrow(b"A".to_vec()),
                id: Number::new(1, false),
                flags: 0,
                menu_type: 0,
                state: 0,
                help_id: None,
            },
            MenuItem::Item {
                text: StringValue::Narrow(b"B".to_vec()),
                id: Number::new(2, false),
                flags: 0,
                menu_type: 0,
                state: 0,
                help_id: None,
            },
        ];
        let stmt = TopLevel::Menu {
            id: NameOrOrdinal::Ordinal(1),
            attrs: CommonAttrs::default(),
            is_ex: false,
            items,
            span: Default::default(),
        };
        let (options, code_pages, dirs) = ctx_parts();
        let resolver = crate::includes::FileResolver::new(&PathBuf::from("x.rc"), &dirs);
        let mut diags = Diagnostics::new();
        let mut ctx = EmitContext::new(&options, &code_pages, &resolver, &mut diags);
        let mut out = Vec::new();
        emit(&stmt, &mut ctx, &mut out).unwrap();
        let payload = &out[64..];
        let first_flags = u16::from_le_bytes([payload[0], payload[1]]);
        assert_eq!(first_flags & MF_END, 0);
    }

    #[test]
    fn popup_sets_popup_bit() {
        let items = vec![MenuItem::Popup {
            text: StringValue::Narrow(b"File".to_vec()),
            id: Number::new(0, false),
            flags: 0,
            menu_type: 0,
            state: 0,
            help_id: None,
            children: vec![MenuItem::Item {
                text: StringValue::Narrow(b"Exit".to_vec()),
                id: Number::new(1, false),
                flags: 0,
                menu_type: 0,
                state: 0,
                help_id: None,
            }],
        }];
        let stmt = TopLevel::Menu {
            id: NameOrOrdinal::Ordinal(1),
            attrs: CommonAttrs::default(),
            is_ex: false,
            items,
            span: Default::default(),
        };
        let (options, code_pages, dirs) = ctx_parts();
        let resolver = crate::includes::FileResolver::new(&PathBuf::from("x.rc"), &dirs);
        let mut diags = Diagnostics::new();
        let mut ctx = EmitContext::new(&options, &code_pages, &resolver, &mut diags);
        let mut out = Vec::new();
        emit(&stmt, &mut ctx, &mut out).unwrap();
        let payload = &out[64..];
        let flags = u16::from_le_bytes([payload[0], payload[1]]);
        assert_eq!(flags & MF_POPUP, MF_POPUP);
    }
}
