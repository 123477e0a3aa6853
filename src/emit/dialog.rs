//! DIALOG / DIALOGEX emission (`spec.md` §4.5, §6).

use crate::ast::{DialogControl, DialogResource, TopLevel};
use crate::error::Result;
use crate::nameord::NameOrOrdinal;
use crate::resource_type::RT_DIALOG;

use super::{characteristics_of, language_id_of, version_of, write_resource, EmitContext, ResBuf};

const DIALOGEX_VERSION: u16 = 1;
const DIALOGEX_SIGNATURE: u16 = 0xFFFF;
const DS_SETFONT: u32 = 0x40;

pub fn emit(stmt: &TopLevel, ctx: &mut EmitContext, out: &mut Vec<u8>) -> Result<()> {
    let TopLevel::Dialog(dialog) = stmt else { unreachable!() };
    let payload = build_dialog_payload(dialog)?;
    write_resource(
        out,
        &NameOrOrdinal::Ordinal(RT_DIALOG),
        &dialog.id,
        dialog.attrs.memory_flags.unwrap_or(0x1030),
        language_id_of(&dialog.attrs, ctx),
        version_of(&dialog.attrs),
        characteristics_of(&dialog.attrs),
        &payload,
    );
    Ok(())
}

fn build_dialog_payload(dialog: &DialogResource) -> Result<Vec<u8>> {
    let mut buf = ResBuf::new();
    let title_units = dialog_title_units(dialog);

    if dialog.is_ex {
        buf.u16(DIALOGEX_VERSION);
        buf.u16(DIALOGEX_SIGNATURE);
        buf.u32(dialog.help_id.map(|n| n.value).unwrap_or(0));
        buf.u32(dialog.exstyle.value);
        buf.u32(dialog.style.value);
    } else {
        buf.u32(dialog.style.value);
        buf.u32(dialog.exstyle.value);
    }
    buf.u16(dialog.controls.len() as u16);
    buf.u16(dialog.x.as_u16());
    buf.u16(dialog.y.as_u16());
    buf.u16(dialog.width.as_u16());
    buf.u16(dialog.height.as_u16());

    match &dialog.menu {
        Some(m) => buf.name_or_ordinal(m),
        None => buf.u16(0),
    }
    match &dialog.class {
        Some(c) => buf.name_or_ordinal(c),
        None => buf.u16(0),
    }
    match title_units {
        Some(units) => {
            for unit in &units {
                buf.u16(*unit);
            }
            buf.u16(0);
        }
        None => buf.u16(0),
    }

    if dialog.style.value & DS_SETFONT != 0 {
        if let Some(font) = &dialog.font {
            buf.u16(font.point_size.as_u16());
            if dialog.is_ex {
                buf.u16(font.weight.map(|n| n.as_u16()).unwrap_or(400));
                buf.u16(font.italic.unwrap_or(false) as u16);
                buf.u16(font.charset.map(|n| n.as_u16()).unwrap_or(1));
            }
            for unit in typeface_units(&font.typeface) {
                buf.u16(unit);
            }
            buf.u16(0);
        }
    }

    for control in &dialog.controls {
        buf.align4();
        write_control(&mut buf, control, dialog.is_ex);
    }

    Ok(buf.into_vec())
}

fn dialog_title_units(dialog: &DialogResource) -> Option<Vec<u16>> {
    dialog.caption.as_ref().map(|c| match c {
        crate::strings::StringValue::Wide(units) => units.clone(),
        crate::strings::StringValue::Narrow(bytes) => bytes.iter().map(|&b| b as u16).collect(),
    })
}

fn typeface_units(value: &crate::strings::StringValue) -> Vec<u16> {
    match value {
        crate::strings::StringValue::Wide(units) => units.clone(),
        crate::strings::StringValue::Narrow(bytes) => bytes.iter().map(|&b| b as u16).collect(),
    }
}

fn write_control(buf: &mut ResBuf, control: &DialogControl, is_ex: bool) {
    if is_ex {
        buf.u32(control.help_id.map(|n| n.value).unwrap_or(0));
        buf.u32(control.exstyle.value);
        buf.u32(control.style.value);
    } else {
        buf.u32(control.style.value);
        buf.u32(control.exstyle.value);
    }
    buf.u16(control.x.as_u16());
    buf.u16(control.y.as_u16());
    buf.u16(control.width.as_u16());
    buf.u16(control.height.as_u16());
    if is_ex {
        buf.u32(control.id.value);
    } else {
        buf.u16(control.id.as_u16());
    }
    buf.name_or_ordinal(&control.class);
    match &control.text {
        Some(NameOrOrdinal::Name(units)) => {
            for unit in units {
                buf.u16(*unit);
            }
            buf.u16(0);
        }
        Some(ordinal @ NameOrOrdinal::Ordinal(_)) => buf.name_or_ordinal(ordinal),
        None => buf.u16(0),
    }
    let extra = super::raw::raw_data_bytes(&control.extra_data);
    buf.u16(extra.len() as u16);
    buf.bytes(&extra);
}
