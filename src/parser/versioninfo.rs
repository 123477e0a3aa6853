//! VERSIONINFO grammar (`spec.md` §4.3/§4.5).

use crate::ast::{CommonAttrs, TopLevel, VersionBlock, VersionInfoResource, VersionValue};
use crate::error::{CompileError, Result};
use crate::lexer::LexMode;
use crate::nameord::NameOrOrdinal;
use crate::token::{Span, TokenKind};

use super::{Parser, MAX_VERSIONINFO_DEPTH};

impl<'a> Parser<'a> {
    pub(super) fn parse_version_info(&mut self, id: NameOrOrdinal, attrs: CommonAttrs, span: Span) -> Result<TopLevel> {
        let mut file_version = [0u16; 4];
        let mut product_version = [0u16; 4];
        let mut file_flags_mask = 0u32;
        let mut file_flags = 0u32;
        let mut file_os = 0u32;
        let mut file_type = 0u32;
        let mut file_subtype = 0u32;

        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
            if tok.kind != TokenKind::Literal {
                self.lexer.restore(before);
                break;
            }
            let word = tok.text(self.source).to_ascii_uppercase();
            match word.as_slice() {
                b"FILEVERSION" => file_version = self.parse_four_part_version()?,
                b"PRODUCTVERSION" => product_version = self.parse_four_part_version()?,
                b"FILEFLAGSMASK" => file_flags_mask = self.parse_number_expr(false)?.value,
                b"FILEFLAGS" => file_flags = self.parse_number_expr(false)?.value,
                b"FILEOS" => file_os = self.parse_number_expr(false)?.value,
                b"FILETYPE" => file_type = self.parse_number_expr(false)?.value,
                b"FILESUBTYPE" => file_subtype = self.parse_number_expr(false)?.value,
                _ => {
                    self.lexer.restore(before);
                    break;
                }
            }
        }

        self.expect_open_brace()?;
        let blocks = self.parse_version_blocks(0)?;

        Ok(TopLevel::VersionInfo(VersionInfoResource {
            id,
            attrs,
            file_version,
            product_version,
            file_flags_mask,
            file_flags,
            file_os,
            file_type,
            file_subtype,
            blocks,
            span,
        }))
    }

    fn parse_four_part_version(&mut self) -> Result<[u16; 4]> {
        let mut parts = [0u16; 4];
        parts[0] = self.parse_number_expr(false)?.as_u16();
        for slot in parts.iter_mut().skip(1) {
            if !self.try_comma() {
                break;
            }
            *slot = self.parse_number_expr(false)?.as_u16();
        }
        Ok(parts)
    }

    fn parse_version_blocks(&mut self, depth: usize) -> Result<Vec<VersionBlock>> {
        if depth > MAX_VERSIONINFO_DEPTH {
            return Err(CompileError::NestingTooDeep("VERSIONINFO block", MAX_VERSIONINFO_DEPTH));
        }
        let mut blocks = Vec::new();
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
            if self.is_close_brace(tok) {
                break;
            }
            if tok.kind == TokenKind::Eof {
                return Err(CompileError::UnexpectedEof);
            }
            let word = tok.text(self.source).to_ascii_uppercase();
            match word.as_slice() {
                b"BLOCK" => {
                    let key_tok = self.lexer.next(LexMode::Normal);
                    if !matches!(key_tok.kind, TokenKind::QuotedAsciiString | TokenKind::QuotedWideString) {
                        return Err(CompileError::ExpectedToken("a quoted BLOCK key".to_string(), key_tok.span));
                    }
                    let key = self.string_value(key_tok)?.to_lossy_string();
                    self.expect_open_brace()?;
                    let children = self.parse_version_blocks(depth + 1)?;
                    blocks.push(VersionBlock { key, values: Vec::new(), children });
                }
                b"VALUE" => {
                    let key_tok = self.lexer.next(LexMode::Normal);
                    if !matches!(key_tok.kind, TokenKind::QuotedAsciiString | TokenKind::QuotedWideString) {
                        return Err(CompileError::ExpectedToken("a quoted VALUE key".to_string(), key_tok.span));
                    }
                    let key = self.string_value(key_tok)?.to_lossy_string();
                    let values = self.parse_version_values()?;
                    blocks.push(VersionBlock { key, values, children: Vec::new() });
                }
                _ => return Err(CompileError::ExpectedToken("BLOCK or VALUE".to_string(), tok.span)),
            }
            self.lexer_eat_stray_comma();
            let _ = before;
        }
        Ok(blocks)
    }

    /// Parses the comma-led value list following a `VALUE "key"` statement.
    /// A quoted string immediately following the key with no comma
    /// separating them matches the reference's padding miscompile
    /// (`spec.md` §4.5/§7); we warn rather than reproduce it.
    fn parse_version_values(&mut self) -> Result<Vec<VersionValue>> {
        let mut values = Vec::new();
        let had_comma = self.try_comma();
        if !had_comma {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::Normal);
            if matches!(tok.kind, TokenKind::QuotedAsciiString | TokenKind::QuotedWideString) {
                self.diagnostics.push(crate::diagnostics::Diagnostic::warning(
                    tok.span,
                    crate::diagnostics::Reason::VersionInfoPaddingMiscompile,
                ));
            } else {
                self.lexer.restore(before);
                return Ok(values);
            }
            self.lexer.restore(before);
        }
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::Normal);
            match tok.kind {
                TokenKind::QuotedAsciiString | TokenKind::QuotedWideString => {
                    values.push(VersionValue::Str(self.string_value(tok)?));
                }
                _ => {
                    self.lexer.restore(before);
                    let n = self.parse_number_expr(false)?;
                    if values.iter().any(|v| matches!(v, VersionValue::Str(_))) {
                        self.diagnostics.push(crate::diagnostics::Diagnostic::warning(
                            tok.span,
                            crate::diagnostics::Reason::VersionInfoMixedValueLength,
                        ));
                    }
                    values.push(VersionValue::Num(n));
                }
            }
            if !self.try_comma() {
                break;
            }
        }
        Ok(values)
    }

    fn lexer_eat_stray_comma(&mut self) {
        let before = self.lexer.pos();
        let tok = self.lexer.next(LexMode::Normal);
        if tok.kind != TokenKind::Comma {
            self.lexer.restore(before);
        }
    }
}
