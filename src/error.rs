//! Hard-failure error type for the compiler.
//!
//! These are the conditions under which a parse or emit is aborted outright
//! (`spec.md` §7, "Propagation"). Recoverable, non-aborting conditions are
//! reported through [`crate::diagnostics::Diagnostic`] instead.

use std::result;

use quick_error::quick_error;

use crate::token::Span;

quick_error! {
    #[derive(Debug)]
    pub enum CompileError {
        Io(err: std::io::Error) {
            from()
            display("I/O error: {}", err)
        }
        UnterminatedString(span: Span) {
            display("unterminated string literal at {:?}", span)
        }
        UnterminatedRawData(span: Span) {
            display("unterminated raw-data block at {:?}", span)
        }
        UnexpectedEof {
            display("unexpected end of file")
        }
        ExpectedToken(expected: String, span: Span) {
            display("expected {} at {:?}", expected, span)
        }
        NestingTooDeep(kind: &'static str, limit: usize) {
            display("{} nested more than {} levels deep", kind, limit)
        }
        InvalidCodePage(id: String) {
            display("invalid or unsupported code page: {}", id)
        }
        DuplicateStringId(id: u16) {
            display("string table id {} defined more than once for this language", id)
        }
        TooManyControls(limit: usize) {
            display("dialog has more than {} controls", limit)
        }
        FileNotFound(path: String) {
            display("file not found: {}", path)
        }
        Scroll(err: scroll::Error) {
            from()
            display("binary layout error: {}", err)
        }
        Malformed(msg: String) {
            display("malformed input: {}", msg)
        }
    }
}

pub type Result<T> = result::Result<T, CompileError>;
