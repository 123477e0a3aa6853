//! The code-page-aware tokenizer (`spec.md` §4.1).
//!
//! Driven by a [`LexMode`] supplied by the parser for each [`Lexer::next`]
//! call. The lexer is a cheap value type (`spec.md` §9, "Lookahead in the
//! parser") — its position is a single integer pair the parser can snapshot
//! and restore for one-token lookahead.

use crate::token::{Span, Token, TokenKind};

/// Lex mode, selected per-call by the parser (`spec.md` §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    /// Every run of non-whitespace is a single literal token; used to read
    /// an id or the type keyword of a statement.
    WhitespaceDelimiterOnly,
    /// Recognizes numbers, quoted strings, operators, punctuation, and
    /// literals. A leading `+` is rejected (unsupported unary plus).
    Normal,
    /// Like `Normal`, but `+`/`-` immediately following a primary
    /// expression are always binary operators rather than part of a number
    /// literal.
    NormalExpectOperator,
}

/// A `#pragma code_page(...)` directive consumed inline by the tokenizer.
/// `N` may be a decimal id or the `DEFAULT` keyword (`spec.md` §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PragmaCodePage {
    Default,
    Id(u32),
}

/// A cheap snapshot of lexer position, restorable for one-token lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerPos {
    pos: u32,
    line: u32,
}

const SUB: u8 = 0x1A;

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: u32,
    line: u32,
    /// Pragmas encountered so far, in source order, with the line they take
    /// effect from.
    pragmas: Vec<(u32, PragmaCodePage)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Lexer { source, pos: 0, line: 1, pragmas: Vec::new() }
    }

    pub fn pos(&self) -> LexerPos {
        LexerPos { pos: self.pos, line: self.line }
    }

    pub fn restore(&mut self, pos: LexerPos) {
        self.pos = pos.pos;
        self.line = pos.line;
    }

    /// Drains the pragmas observed so far (caller applies them to a
    /// [`crate::codepage::CodePageTable`]).
    pub fn take_pragmas(&mut self) -> Vec<(u32, PragmaCodePage)> {
        std::mem::take(&mut self.pragmas)
    }

    fn byte_at(&self, pos: u32) -> Option<u8> {
        self.source.get(pos as usize).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    fn peek_at(&self, offset: u32) -> Option<u8> {
        self.byte_at(self.pos + offset)
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn at_eof(&self) -> bool {
        self.pos as usize >= self.source.len()
    }

    /// Skips whitespace, comments, and inline `#pragma code_page` directives.
    /// `0x1A` anywhere terminates the remainder of the file (`spec.md` §4.1).
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                None => return,
                Some(SUB) => {
                    self.pos = self.source.len() as u32;
                    return;
                }
                Some(b) if is_whitespace(b) => {
                    self.advance();
                }
                Some(b';') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'#') => {
                    if !self.try_consume_pragma() {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    /// Attempts to consume a `#pragma code_page(N)` directive starting at
    /// the current position. Returns `false` (consuming nothing) if the
    /// text at this position isn't such a directive, so the caller can fall
    /// through to normal tokenizing of a stray `#`.
    fn try_consume_pragma(&mut self) -> bool {
        let start = self.pos();
        self.advance(); // '#'
        self.skip_inline_whitespace();
        if !self.consume_literal_ci("pragma") {
            self.restore(start);
            return false;
        }
        self.skip_inline_whitespace();
        if !self.consume_literal_ci("code_page") {
            self.restore(start);
            return false;
        }
        self.skip_inline_whitespace();
        if self.peek() != Some(b'(') {
            self.restore(start);
            return false;
        }
        self.advance();
        self.skip_inline_whitespace();
        let value_start = self.pos;
        while let Some(b) = self.peek() {
            if b == b')' {
                break;
            }
            self.advance();
        }
        let value_text = String::from_utf8_lossy(&self.source[value_start as usize..self.pos as usize])
            .trim()
            .to_string();
        if self.peek() == Some(b')') {
            self.advance();
        }
        let line = self.line;
        let pragma = if value_text.eq_ignore_ascii_case("default") {
            PragmaCodePage::Default
        } else {
            match value_text.parse::<u32>() {
                Ok(id) => PragmaCodePage::Id(id),
                Err(_) => PragmaCodePage::Id(0), // invalid id; caller surfaces the diagnostic
            }
        };
        self.pragmas.push((line, pragma));
        true
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b' ' || b == b'\t' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn consume_literal_ci(&mut self, literal: &str) -> bool {
        let bytes = literal.as_bytes();
        for (i, &expected) in bytes.iter().enumerate() {
            match self.peek_at(i as u32) {
                Some(actual) if actual.eq_ignore_ascii_case(&expected) => {}
                _ => return false,
            }
        }
        for _ in 0..bytes.len() {
            self.advance();
        }
        true
    }

    /// Produces the next token under `mode`.
    pub fn next(&mut self, mode: LexMode) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let line = self.line;
        if self.at_eof() {
            return Token::new(TokenKind::Eof, Span::new(start, start, line));
        }

        match mode {
            LexMode::WhitespaceDelimiterOnly => self.scan_whitespace_delimited(),
            LexMode::Normal => self.scan_normal(false),
            LexMode::NormalExpectOperator => self.scan_normal(true),
        }
    }

    fn scan_whitespace_delimited(&mut self) -> Token {
        let start = self.pos;
        let line = self.line;
        while let Some(b) = self.peek() {
            if is_whitespace(b) || b == b';' || b == SUB {
                break;
            }
            self.advance();
        }
        Token::new(TokenKind::Literal, Span::new(start, self.pos, line))
    }

    fn scan_normal(&mut self, expect_operator: bool) -> Token {
        let start = self.pos;
        let line = self.line;
        let b = self.peek().unwrap();

        match b {
            b'"' => self.scan_quoted(start, line, false),
            b'L' | b'l' if self.peek_at(1) == Some(b'"') => {
                self.advance();
                self.scan_quoted(start, line, true)
            }
            b',' => {
                self.advance();
                Token::new(TokenKind::Comma, Span::new(start, self.pos, line))
            }
            b'(' => {
                self.advance();
                Token::new(TokenKind::OpenParen, Span::new(start, self.pos, line))
            }
            b')' => {
                self.advance();
                Token::new(TokenKind::CloseParen, Span::new(start, self.pos, line))
            }
            b'{' => {
                self.advance();
                Token::new(TokenKind::OpenBrace, Span::new(start, self.pos, line))
            }
            b'}' => {
                self.advance();
                Token::new(TokenKind::CloseBrace, Span::new(start, self.pos, line))
            }
            b'|' | b'&' => {
                self.advance();
                Token::new(TokenKind::Operator, Span::new(start, self.pos, line))
            }
            b'+' if expect_operator => {
                self.advance();
                Token::new(TokenKind::Operator, Span::new(start, self.pos, line))
            }
            b'+' => {
                // Unary plus is never supported (spec.md §9, Open Questions);
                // tokenized as Invalid so the parser can attach a
                // compatibility note.
                self.advance();
                Token::new(TokenKind::Invalid, Span::new(start, self.pos, line))
            }
            b'-' | b'~' if !expect_operator && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start, line)
            }
            b'-' => {
                self.advance();
                Token::new(TokenKind::Operator, Span::new(start, self.pos, line))
            }
            b'~' => {
                self.advance();
                Token::new(TokenKind::Operator, Span::new(start, self.pos, line))
            }
            b if b.is_ascii_digit() => self.scan_number(start, line),
            _ => self.scan_bareword(start, line),
        }
    }

    fn scan_number(&mut self, start: u32, line: u32) -> Token {
        if matches!(self.peek(), Some(b'-') | Some(b'~')) {
            self.advance();
        }
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x') | Some(b'X')) {
            self.advance();
            self.advance();
            while self.peek().is_some_and(|b| b.is_ascii_hexdigit()) {
                self.advance();
            }
        } else {
            while self.peek().is_some_and(|b| b.is_ascii_digit() || is_superscript_digit(b_to_char(b))) {
                self.advance();
            }
            // Tolerate (and let the evaluator reject) a trailing e/E exponent run.
            if matches!(self.peek(), Some(b'e') | Some(b'E')) && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
                self.advance();
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.advance();
                }
            }
        }
        if matches!(self.peek(), Some(b'L') | Some(b'l')) {
            self.advance();
        }
        Token::new(TokenKind::Number, Span::new(start, self.pos, line))
    }

    fn scan_bareword(&mut self, start: u32, line: u32) -> Token {
        while let Some(b) = self.peek() {
            if is_whitespace(b) || b == b';' || matches!(b, b',' | b'(' | b')' | b'{' | b'}' | b'"' | b'+' | b'|' | b'&' | SUB) {
                break;
            }
            // '-' and '~' don't terminate a bareword by themselves (identifiers
            // rarely contain them, but we don't want to misparse e.g. `FOO-BAR`
            // ordinal-like tokens); only a genuine operator position stops us.
            self.advance();
        }
        if self.pos == start {
            // A byte we didn't otherwise recognize (e.g. stray punctuation).
            self.advance();
            return Token::new(TokenKind::Invalid, Span::new(start, self.pos, line));
        }
        Token::new(TokenKind::Literal, Span::new(start, self.pos, line))
    }

    fn scan_quoted(&mut self, start: u32, line: u32, wide: bool) -> Token {
        // Opening quote already at self.pos.
        self.advance();
        loop {
            match self.peek() {
                None => break, // unterminated; caller inspects span/kind
                Some(SUB) => break,
                Some(b'"') => {
                    // A doubled quote embeds a literal quote and continues the
                    // string; a lone quote closes it.
                    if self.peek_at(1) == Some(b'"') {
                        self.advance();
                        self.advance();
                        continue;
                    }
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    if self.peek().is_some() {
                        self.advance();
                    }
                }
                Some(b'\n') => break, // a closing quote may not occur on a different line
                Some(_) => {
                    self.advance();
                }
            }
        }
        let kind = if wide { TokenKind::QuotedWideString } else { TokenKind::QuotedAsciiString };
        Token::new(kind, Span::new(start, self.pos, line))
    }
}

fn b_to_char(b: u8) -> char {
    b as char
}

fn is_superscript_digit(_c: char) -> bool {
    // Superscript 1/2/3 are multi-byte in UTF-8/Windows-1252 and handled at
    // the string/number evaluation layer, which works on decoded `&str`
    // rather than raw bytes; the byte-level lexer only needs to delimit the
    // ASCII digit run, so this is always false here.
    false
}

fn is_whitespace(b: u8) -> bool {
    // Any non-illegal control character outside string literals counts as
    // whitespace (`spec.md` §4.1), which in practice is every ASCII
    // whitespace byte plus other C0 control codes save 0x1A (handled
    // separately) and the structural bytes handled elsewhere.
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str, mode: LexMode) -> Vec<(TokenKind, String)> {
        let mut lexer = Lexer::new(src.as_bytes());
        let mut out = Vec::new();
        loop {
            let tok = lexer.next(mode);
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push((tok.kind, String::from_utf8_lossy(tok.text(src.as_bytes())).to_string()));
        }
        out
    }

    #[test]
    fn whitespace_delimited_reads_whole_run() {
        let toks = tokens("FOO BAR", LexMode::WhitespaceDelimiterOnly);
        assert_eq!(toks, vec![(TokenKind::Literal, "FOO".into()), (TokenKind::Literal, "BAR".into())]);
    }

    #[test]
    fn semicolon_splits_even_mid_run() {
        // "RC;DATA" - the semicolon starts a comment, splitting "RC" from
        // whatever follows even though there's no whitespace.
        let toks = tokens("RC;DATA\nEND", LexMode::WhitespaceDelimiterOnly);
        assert_eq!(toks, vec![(TokenKind::Literal, "RC".into()), (TokenKind::Literal, "END".into())]);
    }

    #[test]
    fn pragma_is_consumed_without_emitting_a_token() {
        let mut lexer = Lexer::new(b"#pragma code_page(65001)\nFOO");
        let tok = lexer.next(LexMode::Normal);
        assert_eq!(tok.kind, TokenKind::Literal);
        assert_eq!(tok.text(b"#pragma code_page(65001)\nFOO"), b"FOO");
        let pragmas = lexer.take_pragmas();
        assert_eq!(pragmas, vec![(2, PragmaCodePage::Id(65001))]);
    }

    #[test]
    fn number_then_operator() {
        let toks = tokens("1 + 2", LexMode::Normal);
        assert_eq!(
            toks,
            vec![
                (TokenKind::Number, "1".into()),
                (TokenKind::Operator, "+".into()),
                (TokenKind::Number, "2".into()),
            ]
        );
    }

    #[test]
    fn negative_number_bundled_in_normal_mode() {
        let toks = tokens("-1", LexMode::Normal);
        assert_eq!(toks, vec![(TokenKind::Number, "-1".into())]);
    }

    #[test]
    fn minus_after_primary_is_an_operator() {
        let mut lexer = Lexer::new(b"1-1");
        let first = lexer.next(LexMode::Normal);
        assert_eq!(first.kind, TokenKind::Number);
        let second = lexer.next(LexMode::NormalExpectOperator);
        assert_eq!(second.kind, TokenKind::Operator);
    }

    #[test]
    fn snapshot_and_restore_round_trips() {
        let mut lexer = Lexer::new(b"FOO BAR");
        let before = lexer.pos();
        let _ = lexer.next(LexMode::WhitespaceDelimiterOnly);
        lexer.restore(before);
        let tok = lexer.next(LexMode::WhitespaceDelimiterOnly);
        assert_eq!(tok.text(b"FOO BAR"), b"FOO");
    }

    #[test]
    fn quoted_string_with_doubled_quote() {
        // Span includes the surrounding quotes; callers strip them before
        // evaluating escapes.
        let toks = tokens("\"a\"\"b\"", LexMode::Normal);
        assert_eq!(toks, vec![(TokenKind::QuotedAsciiString, "\"a\"\"b\"".into())]);
    }

    #[test]
    fn leading_plus_is_invalid() {
        let toks = tokens("+1", LexMode::Normal);
        assert_eq!(toks[0].0, TokenKind::Invalid);
    }
}
