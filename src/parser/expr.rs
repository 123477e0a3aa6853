//! Number-expression evaluation (`spec.md` §4.4).
//!
//! A pure reduction over a run of tokens; carries no ambient state beyond
//! the parenthesis-nesting counter, which is checked against the
//! hard-coded limit in [`super::MAX_PAREN_DEPTH`].

use crate::diagnostics::{Diagnostic, Reason};
use crate::error::{CompileError, Result};
use crate::lexer::LexMode;
use crate::numbers::{parse_number_literal, BinaryOp, Number};
use crate::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    /// Parses and evaluates a number expression: a left-associative chain of
    /// `+ - | &` over primaries, where a primary is a number literal, a
    /// parenthesized sub-expression, or (when `allow_not` is set, i.e. inside
    /// a style/exstyle field) a `NOT <primary>`.
    pub(super) fn parse_number_expr(&mut self, allow_not: bool) -> Result<Number> {
        let mut value = self.parse_primary(allow_not, 0)?;
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::NormalExpectOperator);
            if tok.kind != TokenKind::Operator {
                self.lexer.restore(before);
                break;
            }
            let op_text = tok.text(self.source);
            let op_char = op_text[0] as char;
            let Some(op) = BinaryOp::from_char(op_char) else {
                self.lexer.restore(before);
                break;
            };
            let rhs = self.parse_primary(allow_not, 0)?;
            value = op.apply(value, rhs);
        }
        Ok(value)
    }

    fn parse_primary(&mut self, allow_not: bool, depth: usize) -> Result<Number> {
        if depth > super::MAX_PAREN_DEPTH {
            return Err(CompileError::NestingTooDeep("parenthesized expression", super::MAX_PAREN_DEPTH));
        }
        let tok = self.lexer.next(LexMode::Normal);
        match tok.kind {
            TokenKind::Number => {
                let text = String::from_utf8_lossy(tok.text(self.source)).to_string();
                parse_number_literal(&text)
                    .ok_or_else(|| CompileError::Malformed(format!("invalid number literal {text:?}")))
            }
            TokenKind::OpenParen => {
                let value = self.parse_number_expr_inner(allow_not, depth + 1)?;
                let close = self.lexer.next(LexMode::Normal);
                if close.kind != TokenKind::CloseParen {
                    return Err(CompileError::ExpectedToken(")".to_string(), close.span));
                }
                Ok(value)
            }
            TokenKind::Literal if allow_not && tok.text(self.source).eq_ignore_ascii_case(b"NOT") => {
                let inner = self.parse_primary(allow_not, depth)?;
                Ok(inner.not())
            }
            TokenKind::Literal if tok.text(self.source).eq_ignore_ascii_case(b"NOT") => {
                self.diagnostics.push(Diagnostic::warning(
                    tok.span,
                    Reason::Other("NOT is only valid inside a style/exstyle expression".to_string()),
                ));
                let inner = self.parse_primary(allow_not, depth)?;
                Ok(inner.not())
            }
            _ => Err(CompileError::ExpectedToken("a number".to_string(), tok.span)),
        }
    }

    /// Like [`Self::parse_number_expr`] but tracks nesting depth through
    /// parens for the 200-level limit (`spec.md` §4.3).
    fn parse_number_expr_inner(&mut self, allow_not: bool, depth: usize) -> Result<Number> {
        let mut value = self.parse_primary(allow_not, depth)?;
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::NormalExpectOperator);
            if tok.kind != TokenKind::Operator {
                self.lexer.restore(before);
                break;
            }
            let op_char = tok.text(self.source)[0] as char;
            let Some(op) = BinaryOp::from_char(op_char) else {
                self.lexer.restore(before);
                break;
            };
            let rhs = self.parse_primary(allow_not, depth)?;
            value = op.apply(value, rhs);
        }
        Ok(value)
    }
}
