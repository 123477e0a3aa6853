//! Arena-owned syntax tree (`spec.md` §3/§9).
//!
//! Ownership is strictly tree-shaped: every node lives in a per-parse
//! `Vec`-backed arena and is referenced by index, never by pointer, so the
//! whole tree is freed as one unit when the arena is dropped
//! (`spec.md` §9, "Shared nested trees").

use crate::nameord::NameOrOrdinal;
use crate::numbers::Number;
use crate::resource_type::Resource;
use crate::strings::StringValue;
use crate::token::Span;

/// An index into a [`MenuTree`]'s or [`VersionInfoTree`]'s node arena.
pub type NodeId = usize;

/// A raw-data element: either a numeric literal or a string, carried
/// verbatim for `RCDATA`/user-defined payload emission (`spec.md` §4.5).
#[derive(Debug, Clone)]
pub enum RawDataItem {
    Number(Number),
    Narrow(StringValue),
    Wide(StringValue),
}

/// Common resource-statement attributes parsed between the type keyword and
/// the body (`spec.md` GLOSSARY, "Common resource attribute").
#[derive(Debug, Clone, Default)]
pub struct CommonAttrs {
    pub memory_flags: Option<u16>,
    pub language: Option<(u16, u16)>,
    pub version: Option<Number>,
    pub characteristics: Option<Number>,
}

/// Top-level statement.
#[derive(Debug, Clone)]
pub enum TopLevel {
    /// `<id> <type> <attrs> <filename-or-expr>` with no body — an external
    /// file resource (icon/cursor/bitmap/rcdata-from-file/etc).
    ResourceExternal {
        id: NameOrOrdinal,
        resource_type: Resource,
        numeric_type: Option<u16>,
        /// The source's own type-keyword text, carried for
        /// `Resource::UserDefined` resources with no predefined keyword
        /// (`spec.md` §3, "Resource") — `None` whenever `resource_type` has
        /// a builtin on-disk type value or `numeric_type` is set.
        type_name: Option<String>,
        attrs: CommonAttrs,
        filename_expr: String,
        span: Span,
    },
    /// `<id> <type> <attrs> { raw-data-list }` — RCDATA or user-defined
    /// in-source data.
    ResourceRawData {
        id: NameOrOrdinal,
        resource_type: Resource,
        numeric_type: Option<u16>,
        /// See `ResourceExternal::type_name`.
        type_name: Option<String>,
        attrs: CommonAttrs,
        items: Vec<RawDataItem>,
        span: Span,
    },
    StringTable { attrs: CommonAttrs, entries: Vec<(u16, StringValue)>, span: Span },
    Accelerators { id: NameOrOrdinal, attrs: CommonAttrs, entries: Vec<AcceleratorEntry>, span: Span },
    Dialog(DialogResource),
    Menu { id: NameOrOrdinal, attrs: CommonAttrs, is_ex: bool, items: Vec<MenuItem>, span: Span },
    VersionInfo(VersionInfoResource),
    DlgInclude { id: NameOrOrdinal, attrs: CommonAttrs, filename: String, span: Span },
    /// A top-level `LANGUAGE primary, sublanguage` statement, which sets
    /// the default language for subsequent resources lacking their own.
    Language { primary: u16, sublanguage: u16, span: Span },
    /// A dangling identifier at end-of-file, tolerated rather than erroring
    /// (`spec.md` §4.3, "Recovery").
    Invalid { context_tokens: Vec<Span>, span: Span },
}

#[derive(Debug, Clone)]
pub struct AcceleratorEntry {
    pub event: u16,
    pub id_value: Number,
    pub virtkey: bool,
    pub ascii: bool,
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub noinvert: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DialogResource {
    pub id: NameOrOrdinal,
    pub attrs: CommonAttrs,
    pub is_ex: bool,
    pub help_id: Option<Number>,
    pub x: Number,
    pub y: Number,
    pub width: Number,
    pub height: Number,
    pub style: Number,
    pub exstyle: Number,
    pub caption: Option<StringValue>,
    pub class: Option<NameOrOrdinal>,
    pub menu: Option<NameOrOrdinal>,
    pub font: Option<DialogFont>,
    pub controls: Vec<DialogControl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DialogFont {
    pub point_size: Number,
    pub typeface: StringValue,
    /// DIALOGEX-only extensions; absent for classic DIALOG.
    pub weight: Option<Number>,
    pub italic: Option<bool>,
    pub charset: Option<Number>,
}

#[derive(Debug, Clone)]
pub struct DialogControl {
    pub control_keyword: String,
    pub text: Option<NameOrOrdinal>,
    pub id: Number,
    pub class: NameOrOrdinal,
    pub x: Number,
    pub y: Number,
    pub width: Number,
    pub height: Number,
    pub style: Number,
    pub exstyle: Number,
    pub help_id: Option<Number>,
    pub extra_data: Vec<RawDataItem>,
    pub span: Span,
    /// Set if this control's statement ended without a trailing comma
    /// before the next control, matching a known style-miscompile pattern
    /// (`spec.md` §4.3/§7).
    pub missing_trailing_comma: bool,
}

#[derive(Debug, Clone)]
pub enum MenuItem {
    Item { text: StringValue, id: Number, flags: u16, menu_type: u32, state: u32, help_id: Option<u32> },
    Separator,
    Popup { text: StringValue, id: Number, flags: u16, menu_type: u32, state: u32, help_id: Option<u32>, children: Vec<MenuItem> },
}

#[derive(Debug, Clone)]
pub struct VersionInfoResource {
    pub id: NameOrOrdinal,
    pub attrs: CommonAttrs,
    pub file_version: [u16; 4],
    pub product_version: [u16; 4],
    pub file_flags_mask: u32,
    pub file_flags: u32,
    pub file_os: u32,
    pub file_type: u32,
    pub file_subtype: u32,
    pub blocks: Vec<VersionBlock>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VersionBlock {
    pub key: String,
    pub values: Vec<VersionValue>,
    pub children: Vec<VersionBlock>,
}

#[derive(Debug, Clone)]
pub enum VersionValue {
    Str(StringValue),
    Num(Number),
}

/// A primary-expression or binary-expression tree, evaluated on demand by
/// `crate::parser::expr`. Kept distinct from the already-evaluated `Number`
/// fields above, which are the result of evaluating one of these.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Number),
    Binary { left: Box<Expr>, op: crate::numbers::BinaryOp, right: Box<Expr> },
    Grouped(Box<Expr>),
    Not(Box<Expr>),
    Invalid(Span),
}
