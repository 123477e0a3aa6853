//! ACCELERATORS grammar and the accelerator-key algorithm (`spec.md` §4.5).

use crate::ast::{AcceleratorEntry, CommonAttrs, TopLevel};
use crate::error::{CompileError, Result};
use crate::lexer::LexMode;
use crate::nameord::NameOrOrdinal;
use crate::numbers::Number;
use crate::strings::StringValue;
use crate::token::{Span, TokenKind};

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_accelerators(&mut self, id: NameOrOrdinal, attrs: CommonAttrs, span: Span) -> Result<TopLevel> {
        self.expect_open_brace()?;
        let mut entries = Vec::new();
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::Normal);
            if self.is_close_brace(tok) {
                break;
            }
            if tok.kind == TokenKind::Eof {
                return Err(CompileError::UnexpectedEof);
            }
            self.lexer.restore(before);
            entries.push(self.parse_accelerator_entry()?);
        }
        Ok(TopLevel::Accelerators { id, attrs, entries, span })
    }

    fn parse_accelerator_entry(&mut self) -> Result<AcceleratorEntry> {
        let start = self.lexer.next(LexMode::Normal);
        match start.kind {
            TokenKind::QuotedAsciiString | TokenKind::QuotedWideString => {
                let value = self.string_value(start)?;
                self.finish_string_accelerator(value, start.span)
            }
            TokenKind::Number => {
                let text = String::from_utf8_lossy(start.text(self.source)).to_string();
                let event = crate::numbers::parse_number_literal(&text)
                    .ok_or_else(|| CompileError::Malformed(format!("invalid accelerator event {text:?}")))?
                    .as_u16();
                self.expect_comma()?;
                let id_value = self.parse_number_expr(false)?;
                let mut virtkey = false;
                let mut ascii = false;
                let mut shift = false;
                let mut control = false;
                let mut alt = false;
                let mut noinvert = false;
                while self.try_comma() {
                    match self.read_accel_option()?.as_str() {
                        "VIRTKEY" => virtkey = true,
                        "ASCII" => ascii = true,
                        "SHIFT" => shift = true,
                        "CONTROL" => control = true,
                        "ALT" => alt = true,
                        "NOINVERT" => noinvert = true,
                        other => return Err(CompileError::Malformed(format!("unknown accelerator option {other}"))),
                    }
                }
                if virtkey && ascii {
                    return Err(CompileError::Malformed("VIRTKEY and ASCII are mutually exclusive".to_string()));
                }
                Ok(AcceleratorEntry { event, id_value, virtkey, ascii, shift, control, alt, noinvert, span: start.span })
            }
            _ => Err(CompileError::ExpectedToken("a string or number accelerator event".to_string(), start.span)),
        }
    }

    fn read_accel_option(&mut self) -> Result<String> {
        let tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
        Ok(String::from_utf8_lossy(tok.text(self.source)).to_ascii_uppercase())
    }

    /// Finishes parsing an accelerator entry whose event is a quoted string,
    /// applying the accelerator-key algorithm from `spec.md` §4.5 once all
    /// flags (in particular `VIRTKEY`) are known.
    fn finish_string_accelerator(&mut self, value: StringValue, span: Span) -> Result<AcceleratorEntry> {
        self.expect_comma()?;
        let id_value = self.parse_number_expr(false)?;
        let mut virtkey = false;
        let mut ascii = false;
        let mut shift = false;
        let mut control = false;
        let mut alt = false;
        let mut noinvert = false;
        while self.try_comma() {
            let word = self.read_accel_option()?;
            match word.as_str() {
                "VIRTKEY" => virtkey = true,
                "ASCII" => ascii = true,
                "SHIFT" => shift = true,
                "CONTROL" => control = true,
                "ALT" => alt = true,
                "NOINVERT" => noinvert = true,
                other => return Err(CompileError::Malformed(format!("unknown accelerator option {other:?}"))),
            }
        }
        if virtkey && ascii {
            return Err(CompileError::Malformed("VIRTKEY and ASCII are mutually exclusive".to_string()));
        }
        let event = accelerator_key_event(&value, virtkey)?;
        if virtkey && is_control_char_accelerator(&value) {
            self.diagnostics.warn(span, crate::diagnostics::Reason::AccelControlCharNotEquivalentUnderVirtkey);
        }
        Ok(AcceleratorEntry { event, id_value, virtkey, ascii, shift, control, alt, noinvert, span })
    }
}

/// Implements the accelerator-key string algorithm (`spec.md` §4.5):
///
/// - `"^X"` (X ∈ A-Z, case-insensitive) → `X - 0x40` (a control-character
///   code 1..26); `"^^"` → the literal `^`; any other `^<c>` errors.
/// - A one-codepoint string becomes that codepoint, uppercased when
///   `VIRTKEY` is set.
/// - A two-codepoint string packs as `(first << 8) | second`.
/// - Three-or-more codepoint strings error unless the third is `\0`, which
///   terminates the string at two codepoints.
fn accelerator_key_event(value: &StringValue, virtkey: bool) -> Result<u16> {
    let codepoints = string_value_codepoints(value);
    match codepoints.as_slice() {
        ['^', c] => {
            if *c == '^' {
                return Ok('^' as u16);
            }
            let upper = c.to_ascii_uppercase();
            if !upper.is_ascii_uppercase() {
                return Err(CompileError::Malformed(format!("invalid control accelerator ^{c}")));
            }
            Ok((upper as u16) - 0x40)
        }
        [single] => {
            let c = if virtkey { single.to_ascii_uppercase() } else { *single };
            Ok(surrogate_pack(c))
        }
        [first, second] => Ok(((*first as u16) << 8) | (*second as u16)),
        [first, second, third, rest @ ..] if *third == '\0' && rest.is_empty() => {
            Ok(((*first as u16) << 8) | (*second as u16))
        }
        _ => Err(CompileError::Malformed("accelerator string literal too long".to_string())),
    }
}

/// True for a `"^X"`-style control-character event (`"^^"` excepted, since
/// that produces a literal caret rather than a control code).
fn is_control_char_accelerator(value: &StringValue) -> bool {
    matches!(string_value_codepoints(value).as_slice(), ['^', c] if *c != '^')
}

fn string_value_codepoints(value: &StringValue) -> Vec<char> {
    value.to_lossy_string().chars().collect()
}

/// Codepoints ≥ 0x10000 follow a fixed surrogate-based transform
/// (`spec.md` §4.5); everything below fits directly in a `u16`.
fn surrogate_pack(c: char) -> u16 {
    let value = c as u32;
    if value <= 0xFFFF {
        value as u16
    } else {
        let v = value - 0x10000;
        0xD800 | ((v >> 10) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn narrow(s: &str) -> StringValue {
        StringValue::Narrow(s.as_bytes().to_vec())
    }

    #[test]
    fn control_accelerator() {
        assert_eq!(accelerator_key_event(&narrow("^C"), false).unwrap(), 3);
    }

    #[test]
    fn caret_caret_is_literal_caret() {
        assert_eq!(accelerator_key_event(&narrow("^^"), false).unwrap(), '^' as u16);
    }

    #[test]
    fn single_char_virtkey_uppercases() {
        assert_eq!(accelerator_key_event(&narrow("a"), true).unwrap(), 'A' as u16);
    }

    #[test]
    fn two_char_packs_high_low() {
        let event = accelerator_key_event(&narrow("AB"), false).unwrap();
        assert_eq!(event, (('A' as u16) << 8) | ('B' as u16));
    }

    #[test]
    fn three_char_with_nul_terminator_is_ok() {
        let event = accelerator_key_event(&narrow("AB\0"), false).unwrap();
        assert_eq!(event, (('A' as u16) << 8) | ('B' as u16));
    }

    #[test]
    fn three_plain_chars_errors() {
        assert!(accelerator_key_event(&narrow("ABC"), false).is_err());
    }
}
