//! Recursive-descent parser (`spec.md` §4.3).
//!
//! Grammar branches on the *resource type* keyword discovered per
//! statement, so there is no single context-free grammar to state upfront:
//! each resource kind has its own optional-statement and body grammar,
//! implemented in its own submodule the way the teacher crate splits one
//! binary format's concerns across `pe/header.rs`, `pe/section_table.rs`,
//! etc.

mod accelerators;
mod dialog;
mod expr;
mod menu;
mod versioninfo;

use crate::ast::{CommonAttrs, RawDataItem, TopLevel};
use crate::codepage::{CodePage, CodePageTable};
use crate::diagnostics::{Diagnostic, Diagnostics, Reason};
use crate::error::{CompileError, Result};
use crate::lexer::{LexMode, Lexer};
use crate::nameord::NameOrOrdinal;
use crate::options::CompileOptions;
use crate::resource_type::{memory_flags, Resource};
use crate::strings::{eval_narrow_string, eval_wide_string, StringValue};
use crate::token::{Token, TokenKind};

/// Parenthesized-expression nesting limit (`spec.md` §4.3).
pub const MAX_PAREN_DEPTH: usize = 200;
/// MENU item nesting limit (`spec.md` §4.3).
pub const MAX_MENU_DEPTH: usize = 512;
/// VERSIONINFO block nesting limit (`spec.md` §4.3).
pub const MAX_VERSIONINFO_DEPTH: usize = 512;
/// Controls per DIALOG/DIALOGEX (`spec.md` §4.3).
pub const MAX_CONTROLS: usize = 65_535;

/// Accumulated defaults set by standalone top-level `LANGUAGE`/`VERSION`/
/// `CHARACTERISTICS` statements, inherited by any later resource that does
/// not specify its own (`spec.md` §8, round-trip property).
#[derive(Debug, Clone, Default)]
struct PendingDefaults {
    language: Option<(u16, u16)>,
    version: Option<crate::numbers::Number>,
    characteristics: Option<crate::numbers::Number>,
}

pub struct Parser<'a> {
    source: &'a [u8],
    lexer: Lexer<'a>,
    code_pages: CodePageTable,
    diagnostics: Diagnostics,
    options: &'a CompileOptions,
    defaults: PendingDefaults,
}

/// Parses a whole resource script, returning its top-level statements, any
/// accumulated diagnostics, and the resolved per-line code-page table (the
/// emitter needs the latter to transcode strings the same way the parser
/// did).
pub fn parse<'a>(source: &'a [u8], options: &'a CompileOptions) -> Result<(Vec<TopLevel>, Diagnostics, CodePageTable)> {
    let mut parser = Parser {
        source,
        lexer: Lexer::new(source),
        code_pages: CodePageTable::new(options.default_code_page),
        diagnostics: Diagnostics::new(),
        options,
        defaults: PendingDefaults::default(),
    };
    let body = parser.parse_top_level()?;
    check_duplicate_string_ids(&body, options)?;
    Ok((body, parser.diagnostics, parser.code_pages))
}

/// Duplicate string-table ids are a hard error *across* `STRINGTABLE`
/// statements, not just within one (`spec.md` §4.5, "StringTable"). Two
/// statements may reuse the same id without conflict if they carry
/// different `LANGUAGE`s, since language partitions which bundle a string
/// actually lands in — so the check groups entries by their resolved
/// language id before looking for a repeat.
fn check_duplicate_string_ids(body: &[TopLevel], options: &CompileOptions) -> Result<()> {
    let mut seen: std::collections::HashMap<(u16, u16), std::collections::HashSet<u16>> = std::collections::HashMap::new();
    for stmt in body {
        let TopLevel::StringTable { attrs, entries, .. } = stmt else { continue };
        let (primary, sub) = attrs.language.unwrap_or(options.default_language_id);
        let ids = seen.entry((primary, sub)).or_default();
        for (id, _) in entries {
            if !ids.insert(*id) {
                return Err(CompileError::DuplicateStringId(*id));
            }
        }
    }
    Ok(())
}

impl<'a> Parser<'a> {
    fn parse_top_level(&mut self) -> Result<Vec<TopLevel>> {
        let mut out = Vec::new();
        loop {
            self.absorb_pragmas();
            let before = self.lexer.pos();
            let first = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
            if first.kind == TokenKind::Eof {
                break;
            }
            if first.kind != TokenKind::Literal {
                // A dangling/unexpected token at top level is tolerated only
                // at true end-of-file; mid-file it's a hard error.
                return Err(CompileError::ExpectedToken("a statement".to_string(), first.span));
            }
            let word = first.text(self.source).to_ascii_uppercase();
            match word.as_slice() {
                b"LANGUAGE" => {
                    let (primary, sub) = self.parse_language_params()?;
                    self.defaults.language = Some((primary, sub));
                    out.push(TopLevel::Language { primary, sublanguage: sub, span: first.span });
                }
                b"VERSION" => {
                    let n = self.parse_number_expr(false)?;
                    self.defaults.version = Some(n);
                }
                b"CHARACTERISTICS" => {
                    let n = self.parse_number_expr(false)?;
                    self.defaults.characteristics = Some(n);
                }
                b"STRINGTABLE" => {
                    let stmt = self.parse_string_table(first.span)?;
                    out.push(stmt);
                }
                _ => {
                    self.lexer.restore(before);
                    match self.parse_id_led_statement()? {
                        Some(stmt) => out.push(stmt),
                        None => break,
                    }
                }
            }
        }
        Ok(out)
    }

    /// Drains and applies any `#pragma code_page` directives the lexer has
    /// buffered since the last call.
    fn absorb_pragmas(&mut self) {
        for (line, pragma) in self.lexer.take_pragmas() {
            let id = match pragma {
                crate::lexer::PragmaCodePage::Default => self.options.default_code_page.id(),
                crate::lexer::PragmaCodePage::Id(id) => id,
            };
            match CodePage::from_id(id) {
                Ok(cp) => self.code_pages.apply_pragma(line, cp),
                Err(_) if self.options.warn_instead_of_error_on_invalid_code_page => {
                    self.diagnostics.warn(
                        crate::token::Span::new(0, 0, line),
                        Reason::Other(format!("unsupported code page {id}, keeping the previous one")),
                    );
                }
                Err(_) => {
                    self.diagnostics.push(Diagnostic::error(
                        crate::token::Span::new(0, 0, line),
                        Reason::Other(format!("unsupported code page {id}")),
                    ));
                }
            }
        }
    }

    fn parse_language_params(&mut self) -> Result<(u16, u16)> {
        let primary = self.parse_number_expr(false)?;
        self.expect_comma()?;
        let sub = self.parse_number_expr(false)?;
        if primary.is_long || sub.is_long {
            self.diagnostics.warn(
                crate::token::Span::default(),
                Reason::LanguageLongSuffixTruncated,
            );
        }
        Ok((primary.as_u16(), sub.as_u16()))
    }

    /// Implements `spec.md` §4.3 steps 1–5 for an `<id> <type> <attrs>
    /// <body>` statement. Returns `Ok(None)` only at a true end-of-file
    /// (never reached in practice since the caller already checked, but
    /// kept for symmetry with the top-level loop).
    fn parse_id_led_statement(&mut self) -> Result<Option<TopLevel>> {
        let id_tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
        if id_tok.kind == TokenKind::Eof {
            return Ok(None);
        }
        let id_text = String::from_utf8_lossy(id_tok.text(self.source)).to_string();

        let type_tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
        if type_tok.kind != TokenKind::Literal {
            return Err(CompileError::ExpectedToken("a resource type keyword".to_string(), type_tok.span));
        }
        let type_text = String::from_utf8_lossy(type_tok.text(self.source)).to_string();

        let (resource, numeric_type, type_name) = self.classify_type(&type_text, type_tok)?;

        if resource.requires_ordinal_id() && !id_text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(CompileError::Malformed(format!("{type_text} requires an ordinal id, got {id_text:?}")));
        }
        let id = NameOrOrdinal::from_literal(&id_text);

        let mut attrs = self.parse_common_attrs(&resource)?;
        self.apply_defaults(&mut attrs);

        let span = id_tok.span.join(type_tok.span);
        let stmt = match resource {
            Resource::Accelerators => self.parse_accelerators(id, attrs, span)?,
            Resource::Dialog | Resource::DialogEx => self.parse_dialog(id, attrs, resource == Resource::DialogEx, span)?,
            Resource::Menu | Resource::MenuEx => self.parse_menu(id, attrs, resource == Resource::MenuEx, span)?,
            Resource::VersionInfo => self.parse_version_info(id, attrs, span)?,
            Resource::DlgInclude => self.parse_dlginclude(id, attrs, span)?,
            Resource::StringTable => unreachable!("STRINGTABLE is keyword-led, not id-led"),
            _ => self.parse_generic_resource(id, resource, numeric_type, type_name, attrs, span)?,
        };
        Ok(Some(stmt))
    }

    fn apply_defaults(&self, attrs: &mut CommonAttrs) {
        if attrs.language.is_none() {
            attrs.language = self.defaults.language;
        }
        if attrs.version.is_none() {
            attrs.version = self.defaults.version;
        }
        if attrs.characteristics.is_none() {
            attrs.characteristics = self.defaults.characteristics;
        }
    }

    fn classify_type(&self, type_text: &str, type_tok: Token) -> Result<(Resource, Option<u16>, Option<String>)> {
        if let Some(resource) = Resource::from_keyword(type_text) {
            return Ok((resource, None, None));
        }
        if let Some(n) = crate::numbers::parse_number_literal(type_text) {
            let value = n.as_u16();
            if value == crate::resource_type::RT_STRING {
                return Err(CompileError::Malformed(
                    "STRING (6) cannot be used as a resource type directly".to_string(),
                ));
            }
            let resource = Resource::from_numeric(value)
                .map_err(|e| CompileError::Malformed(e.to_string()))?;
            return Ok((resource, Some(value), None));
        }
        // Name-typed resource with no predefined keyword: the source's own
        // type text is the on-disk type name (`spec.md` §3, "Resource").
        let _ = type_tok;
        Ok((Resource::UserDefined, None, Some(type_text.to_string())))
    }

    /// Parses the contiguous run of common resource attributes between the
    /// type keyword and the body (`spec.md` GLOSSARY).
    fn parse_common_attrs(&mut self, resource: &Resource) -> Result<CommonAttrs> {
        let mut attrs = CommonAttrs { memory_flags: Some(memory_flags::default_for(resource)), ..Default::default() };
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
            if tok.kind != TokenKind::Literal {
                self.lexer.restore(before);
                break;
            }
            let word = tok.text(self.source).to_ascii_uppercase();
            match word.as_slice() {
                b"LANGUAGE" => {
                    let (primary, sub) = self.parse_language_params()?;
                    attrs.language = Some((primary, sub));
                }
                b"VERSION" => {
                    attrs.version = Some(self.parse_number_expr(false)?);
                }
                b"CHARACTERISTICS" => {
                    attrs.characteristics = Some(self.parse_number_expr(false)?);
                }
                _ => {
                    let word_str = String::from_utf8_lossy(&word).to_string();
                    match memory_flags::apply_keyword(attrs.memory_flags.unwrap_or(0), &word_str) {
                        Some(flags) => attrs.memory_flags = Some(flags),
                        None => {
                            self.lexer.restore(before);
                            break;
                        }
                    }
                }
            }
        }
        Ok(attrs)
    }

    fn parse_dlginclude(&mut self, id: NameOrOrdinal, attrs: CommonAttrs, span: crate::token::Span) -> Result<TopLevel> {
        let filename = self.parse_filename_expr()?;
        Ok(TopLevel::DlgInclude { id, attrs, filename, span })
    }

    /// A filename position accepts an unquoted token, a quoted narrow/wide
    /// string, or a number expression reduced to its *source text* rather
    /// than evaluated (`spec.md` §4.6).
    fn parse_filename_expr(&mut self) -> Result<String> {
        let before = self.lexer.pos();
        let tok = self.lexer.next(LexMode::Normal);
        match tok.kind {
            TokenKind::QuotedAsciiString | TokenKind::QuotedWideString => {
                Ok(self.string_value(tok)?.to_lossy_string())
            }
            _ => {
                self.lexer.restore(before);
                let mut text = String::new();
                loop {
                    let before = self.lexer.pos();
                    let tok = self.lexer.next(LexMode::NormalExpectOperator);
                    match tok.kind {
                        TokenKind::Literal | TokenKind::Number | TokenKind::Operator => {
                            text.push_str(&String::from_utf8_lossy(tok.text(self.source)));
                        }
                        _ => {
                            self.lexer.restore(before);
                            break;
                        }
                    }
                }
                if text.is_empty() {
                    return Err(CompileError::ExpectedToken("a filename".to_string(), tok.span));
                }
                Ok(text)
            }
        }
    }

    fn parse_generic_resource(
        &mut self,
        id: NameOrOrdinal,
        resource: Resource,
        numeric_type: Option<u16>,
        type_name: Option<String>,
        attrs: CommonAttrs,
        span: crate::token::Span,
    ) -> Result<TopLevel> {
        let before = self.lexer.pos();
        let open = self.lexer.next(LexMode::Normal);
        if self.is_open_brace(open) {
            let items = self.parse_raw_data_items()?;
            return Ok(TopLevel::ResourceRawData { id, resource_type: resource, numeric_type, type_name, attrs, items, span });
        }
        self.lexer.restore(before);
        let filename_expr = self.parse_filename_expr()?;
        Ok(TopLevel::ResourceExternal { id, resource_type: resource, numeric_type, type_name, attrs, filename_expr, span })
    }

    fn parse_raw_data_items(&mut self) -> Result<Vec<RawDataItem>> {
        let mut items = Vec::new();
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::Normal);
            if self.is_close_brace(tok) {
                break;
            }
            if tok.kind == TokenKind::Eof {
                return Err(CompileError::UnterminatedRawData(tok.span));
            }
            match tok.kind {
                TokenKind::QuotedAsciiString | TokenKind::QuotedWideString => {
                    let value = self.string_value(tok)?;
                    items.push(match value {
                        StringValue::Narrow(_) => RawDataItem::Narrow(value),
                        StringValue::Wide(_) => RawDataItem::Wide(value),
                    });
                }
                _ => {
                    self.lexer.restore(before);
                    let n = self.parse_number_expr(false)?;
                    items.push(RawDataItem::Number(n));
                }
            }
            let before_comma = self.lexer.pos();
            let comma = self.lexer.next(LexMode::Normal);
            if comma.kind != TokenKind::Comma {
                self.lexer.restore(before_comma);
            }
        }
        Ok(items)
    }

    fn parse_string_table(&mut self, span: crate::token::Span) -> Result<TopLevel> {
        let attrs_resource = Resource::StringTable;
        let mut attrs = self.parse_common_attrs(&attrs_resource)?;
        self.apply_defaults(&mut attrs);
        self.expect_open_brace()?;
        let mut entries = Vec::new();
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::Normal);
            if self.is_close_brace(tok) {
                break;
            }
            self.lexer.restore(before);
            let id = self.parse_number_expr(false)?.as_u16();
            let before_comma = self.lexer.pos();
            let comma = self.lexer.next(LexMode::Normal);
            if comma.kind != TokenKind::Comma {
                self.lexer.restore(before_comma);
            }
            let str_tok = self.lexer.next(LexMode::Normal);
            if !matches!(str_tok.kind, TokenKind::QuotedAsciiString | TokenKind::QuotedWideString) {
                return Err(CompileError::ExpectedToken("a quoted string".to_string(), str_tok.span));
            }
            let value = self.string_value(str_tok)?;
            if value.code_unit_len() > self.options.max_string_literal_code_units {
                return Err(CompileError::Malformed(format!(
                    "string table entry {id} exceeds the configured {}-code-unit limit",
                    self.options.max_string_literal_code_units
                )));
            }
            entries.push((id, value));
        }
        Ok(TopLevel::StringTable { attrs, entries, span })
    }

    fn is_open_brace(&self, tok: Token) -> bool {
        tok.kind == TokenKind::OpenBrace || (tok.kind == TokenKind::Literal && tok.text(self.source).eq_ignore_ascii_case(b"BEGIN"))
    }

    fn is_close_brace(&self, tok: Token) -> bool {
        tok.kind == TokenKind::CloseBrace || (tok.kind == TokenKind::Literal && tok.text(self.source).eq_ignore_ascii_case(b"END"))
    }

    fn expect_open_brace(&mut self) -> Result<()> {
        let tok = self.lexer.next(LexMode::Normal);
        if self.is_open_brace(tok) {
            Ok(())
        } else {
            Err(CompileError::ExpectedToken("{ or BEGIN".to_string(), tok.span))
        }
    }

    fn expect_comma(&mut self) -> Result<()> {
        let tok = self.lexer.next(LexMode::Normal);
        if tok.kind == TokenKind::Comma {
            Ok(())
        } else {
            Err(CompileError::ExpectedToken(",".to_string(), tok.span))
        }
    }

    /// Consumes a comma if one is next, reporting whether it did.
    fn try_comma(&mut self) -> bool {
        let before = self.lexer.pos();
        let tok = self.lexer.next(LexMode::Normal);
        if tok.kind == TokenKind::Comma {
            true
        } else {
            self.lexer.restore(before);
            false
        }
    }

    /// Reads a CLASS/MENU-style value: a quoted string becomes a `Name`;
    /// anything else is read as a bareword/number and classified the usual
    /// way (`spec.md` §4.3).
    fn parse_name_or_ordinal_value(&mut self) -> Result<NameOrOrdinal> {
        self.parse_name_or_ordinal_value_impl(false)
    }

    /// Implements the DIALOGEX CLASS/MENU "ordinal stickiness" rule
    /// (`spec.md` §4.3): once one of these has already resolved to an
    /// ordinal in this resource, later ones reuse the digit-leading
    /// ordinal parse directly rather than being independently re-derived
    /// (which could abort to a Name on a non-digit codepoint, or treat a
    /// zero value as a Name).
    fn parse_name_or_ordinal_value_sticky(&mut self, force_ordinal: bool) -> Result<NameOrOrdinal> {
        self.parse_name_or_ordinal_value_impl(force_ordinal)
    }

    fn parse_name_or_ordinal_value_impl(&mut self, force_ordinal: bool) -> Result<NameOrOrdinal> {
        let tok = self.lexer.next(LexMode::Normal);
        match tok.kind {
            TokenKind::QuotedAsciiString | TokenKind::QuotedWideString => {
                let value = self.string_value(tok)?;
                Ok(NameOrOrdinal::from_name_text(&value.to_lossy_string()))
            }
            TokenKind::Literal | TokenKind::Number => {
                let text = String::from_utf8_lossy(tok.text(self.source)).to_string();
                if force_ordinal {
                    let value = crate::numbers::parse_number_literal(&text).map(|n| n.value as u16).unwrap_or(0);
                    Ok(NameOrOrdinal::Ordinal(value))
                } else {
                    Ok(NameOrOrdinal::from_literal(&text))
                }
            }
            _ => Err(CompileError::ExpectedToken("a name or ordinal".to_string(), tok.span)),
        }
    }

    /// Decodes and evaluates a quoted-string token into its final
    /// [`StringValue`], honoring the input/output code pages active at the
    /// token's line.
    fn string_value(&mut self, tok: Token) -> Result<StringValue> {
        let bytes = tok.text(self.source);
        let wide = tok.kind == TokenKind::QuotedWideString;
        let strip_front = if wide { 2 } else { 1 };
        let body = &bytes[strip_front..bytes.len().saturating_sub(1)];
        let input_page = self.code_pages.input_at(tok.line());
        let output_page = self.code_pages.output_at(tok.line());
        let decoded = input_page.decode(body);
        if wide {
            eval_wide_string(&decoded)
        } else {
            eval_narrow_string(&decoded, input_page, output_page)
        }
    }
}
