//! Resource-type classification and memory flags (`spec.md` §3/§4.5).
//!
//! The numeric `RT_*` constants are the same Windows resource-type table
//! the teacher crate's `pe::resource` module already carries for parsing a
//! PE's embedded resource directory; they are reused verbatim here since
//! they describe the identical on-disk type space (`DESIGN.md`).

/// Windows resource type identifier for cursors.
pub const RT_CURSOR: u16 = 1;
/// Windows resource type identifier for bitmaps.
pub const RT_BITMAP: u16 = 2;
/// Windows resource type identifier for icons.
pub const RT_ICON: u16 = 3;
/// Windows resource type identifier for menus.
pub const RT_MENU: u16 = 4;
/// Windows resource type identifier for dialog boxes.
pub const RT_DIALOG: u16 = 5;
/// Windows resource type identifier for string tables.
pub const RT_STRING: u16 = 6;
/// Windows resource type identifier for font directories.
pub const RT_FONTDIR: u16 = 7;
/// Windows resource type identifier for fonts.
pub const RT_FONT: u16 = 8;
/// Windows resource type identifier for accelerators.
pub const RT_ACCELERATOR: u16 = 9;
/// Windows resource type identifier for raw data.
pub const RT_RCDATA: u16 = 10;
/// Windows resource type identifier for message tables.
pub const RT_MESSAGETABLE: u16 = 11;
/// Windows resource type identifier for group cursors.
pub const RT_GROUP_CURSOR: u16 = 12;
/// Windows resource type identifier for group icons.
pub const RT_GROUP_ICON: u16 = 14;
/// Windows resource type identifier for version information.
pub const RT_VERSION: u16 = 16;
/// Windows resource type identifier for dialog includes.
pub const RT_DLGINCLUDE: u16 = 17;
/// Windows resource type identifier for Plug and Play resources.
pub const RT_PLUGPLAY: u16 = 19;
/// Windows resource type identifier for VxD resources.
pub const RT_VXD: u16 = 20;
/// Windows resource type identifier for HTML resources.
pub const RT_HTML: u16 = 23;
/// Windows resource type identifier for manifests.
pub const RT_MANIFEST: u16 = 24;
/// Windows resource type identifier for toolbars (non-predefined in the
/// classic RT_* table, but given a stable id here for `TOOLBAR` statements).
pub const RT_TOOLBAR: u16 = 241;

/// Any numeric resource type at or above this value is forced to
/// `Resource::UserDefined` (`spec.md` §3).
pub const USER_DEFINED_THRESHOLD: u16 = 256;

/// Semantic classification of a resource-statement type keyword
/// (`spec.md` §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Accelerators,
    Bitmap,
    Cursor,
    Dialog,
    DialogEx,
    DlgInclude,
    DlgInit,
    Font,
    Html,
    Icon,
    Menu,
    MenuEx,
    MessageTable,
    PlugPlay,
    RcData,
    StringTable,
    Toolbar,
    /// A numeric type ≥ 256, or a name-typed resource with no predefined
    /// keyword.
    UserDefined,
    VersionInfo,
    Vxd,
}

impl Resource {
    /// Classifies a type keyword read from source text (already uppercased,
    /// per how type keywords are tokenized via `whitespace_delimiter_only`).
    pub fn from_keyword(keyword: &str) -> Option<Resource> {
        Some(match keyword.to_ascii_uppercase().as_str() {
            "ACCELERATORS" => Resource::Accelerators,
            "BITMAP" => Resource::Bitmap,
            "CURSOR" => Resource::Cursor,
            "DIALOG" => Resource::Dialog,
            "DIALOGEX" => Resource::DialogEx,
            "DLGINCLUDE" => Resource::DlgInclude,
            "DLGINIT" => Resource::DlgInit,
            "FONT" => Resource::Font,
            "HTML" => Resource::Html,
            "ICON" => Resource::Icon,
            "MENU" => Resource::Menu,
            "MENUEX" => Resource::MenuEx,
            "MESSAGETABLE" => Resource::MessageTable,
            "PLUGPLAY" => Resource::PlugPlay,
            "RCDATA" => Resource::RcData,
            "STRINGTABLE" => Resource::StringTable,
            "TOOLBAR" => Resource::Toolbar,
            "VERSIONINFO" => Resource::VersionInfo,
            "VXD" => Resource::Vxd,
            _ => return None,
        })
    }

    /// Classifies a numeric resource type, per the `RT_*` table and the
    /// "type 6 (STRING) is a hard error" / "≥256 forces UserDefined" rules
    /// in `spec.md` §3. Returns `Err` for the STRING type, which cannot be
    /// used as a resource type directly.
    pub fn from_numeric(value: u16) -> Result<Resource, &'static str> {
        if value >= USER_DEFINED_THRESHOLD {
            return Ok(Resource::UserDefined);
        }
        Ok(match value {
            RT_CURSOR => Resource::Cursor,
            RT_BITMAP => Resource::Bitmap,
            RT_ICON => Resource::Icon,
            RT_MENU => Resource::Menu,
            RT_DIALOG => Resource::Dialog,
            RT_STRING => return Err("STRING (6) cannot be used as a resource type directly"),
            RT_FONTDIR | RT_FONT => Resource::Font,
            RT_ACCELERATOR => Resource::Accelerators,
            RT_RCDATA => Resource::RcData,
            RT_MESSAGETABLE => Resource::MessageTable,
            RT_GROUP_CURSOR | RT_GROUP_ICON => Resource::Icon,
            RT_VERSION => Resource::VersionInfo,
            RT_DLGINCLUDE => Resource::DlgInclude,
            RT_PLUGPLAY => Resource::PlugPlay,
            RT_VXD => Resource::Vxd,
            RT_HTML => Resource::Html,
            RT_MANIFEST => Resource::UserDefined,
            _ => Resource::UserDefined,
        })
    }

    /// Whether this resource kind requires its id to be an ordinal
    /// (`spec.md` §4.3: "only FONT").
    pub fn requires_ordinal_id(&self) -> bool {
        matches!(self, Resource::Font)
    }
}

/// 16-bit memory-flags bitfield (`spec.md` §3).
pub mod memory_flags {
    pub const MOVEABLE: u16 = 0x10;
    pub const SHARED: u16 = 0x20;
    pub const PURE: u16 = 0x20;
    pub const PRELOAD: u16 = 0x40;
    pub const DISCARDABLE: u16 = 0x1000;

    /// Default memory flags per resource kind (`spec.md` §4.5).
    pub fn default_for(resource: &super::Resource) -> u16 {
        use super::Resource::*;
        match resource {
            Icon | Cursor => MOVEABLE | DISCARDABLE,
            RcData | Bitmap | Html | Accelerators | UserDefined => MOVEABLE | SHARED,
            StringTable | Font | Dialog | DialogEx => MOVEABLE | SHARED | DISCARDABLE,
            _ => MOVEABLE | SHARED,
        }
    }

    /// Applies a single attribute keyword's effect to an existing flags
    /// value, per the fixed rule set in `spec.md` §3: `DISCARDABLE` implies
    /// `MOVEABLE|SHARED`; `FIXED` clears `MOVEABLE|DISCARDABLE`, etc.
    pub fn apply_keyword(flags: u16, keyword: &str) -> Option<u16> {
        Some(match keyword.to_ascii_uppercase().as_str() {
            "PRELOAD" => flags | PRELOAD,
            "LOADONCALL" => flags & !PRELOAD,
            "MOVEABLE" => flags | MOVEABLE,
            "FIXED" => flags & !(MOVEABLE | DISCARDABLE),
            "SHARED" | "PURE" => flags | SHARED,
            "NONSHARED" | "IMPURE" => flags & !SHARED,
            "DISCARDABLE" => flags | DISCARDABLE | MOVEABLE | SHARED,
            _ => return None,
        })
    }
}
