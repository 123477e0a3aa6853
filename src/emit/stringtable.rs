//! STRINGTABLE bundle emission (`spec.md` §4.5, §9 "String-table
//! representation").
//!
//! Strings are grouped into bundles of 16 by `id >> 4`; each bundle becomes
//! one `RT_STRING` resource whose name is `bundle_index + 1` and whose
//! payload is 16 length-prefixed UTF-16 strings, empty slots writing a
//! zero length. The bundle map is built across *every* `STRINGTABLE`
//! statement in the tree, not just one at a time: two statements under the
//! same language whose ids share a bundle index contribute to the same
//! emitted resource, and two statements under different languages may both
//! use the same bundle index without colliding (`spec.md` §4.5/§9).

use std::collections::BTreeMap;

use crate::ast::{CommonAttrs, TopLevel};
use crate::error::Result;
use crate::nameord::NameOrOrdinal;
use crate::resource_type::RT_STRING;
use crate::strings::StringValue;

use super::{characteristics_of, language_id_of, version_of, write_resource, EmitContext, ResBuf};

/// Collects every `STRINGTABLE` statement's entries into one global
/// `(language_id, bundle_index) -> 16-slot` map and emits each bundle once.
pub fn emit_all(statements: &[TopLevel], ctx: &mut EmitContext, out: &mut Vec<u8>) -> Result<()> {
    let mut bundles: BTreeMap<(u16, u16), [Option<&StringValue>; 16]> = BTreeMap::new();
    let mut attrs_by_language: BTreeMap<u16, &CommonAttrs> = BTreeMap::new();

    for stmt in statements {
        let TopLevel::StringTable { attrs, entries, .. } = stmt else { continue };
        let language_id = language_id_of(attrs, ctx);
        attrs_by_language.entry(language_id).or_insert(attrs);
        for (id, value) in entries {
            let bundle = id >> 4;
            let slot = (id & 0xF) as usize;
            bundles.entry((language_id, bundle)).or_insert([None; 16])[slot] = Some(value);
        }
    }

    for ((language_id, bundle_index), slots) in bundles {
        let attrs = attrs_by_language[&language_id];
        let version = version_of(attrs);
        let characteristics = characteristics_of(attrs);
        let flags = attrs.memory_flags.unwrap_or(0x1030);

        let mut payload = ResBuf::new();
        for slot in slots {
            match slot {
                Some(value) => {
                    let units = string_value_units(value);
                    payload.u16(units.len() as u16);
                    for unit in units {
                        payload.u16(unit);
                    }
                    if ctx.options.null_terminate_string_table_strings {
                        payload.u16(0);
                    }
                }
                None => payload.u16(0),
            }
        }
        write_resource(
            out,
            &NameOrOrdinal::Ordinal(RT_STRING),
            &NameOrOrdinal::Ordinal(bundle_index + 1),
            flags,
            language_id,
            version,
            characteristics,
            &payload.into_vec(),
        );
    }
    Ok(())
}

fn string_value_units(value: &StringValue) -> Vec<u16> {
    match value {
        StringValue::Wide(units) => units.clone(),
        StringValue::Narrow(bytes) => bytes.iter().map(|&b| b as u16).collect(),
    }
}
