//! A Windows Resource Script (`.rc`) to `.res` compiler front-end and code
//! generator (`spec.md` §1, "Purpose & Scope").
//!
//! [`Compiler::compile`] is the single entry point: it tokenizes, parses,
//! and emits a resource script's bytes into a binary `.res` stream,
//! bit-exact with the reference Microsoft compiler's documented behavior
//! (including its quirks — see [`diagnostics`] for the ones this
//! implementation chooses to diagnose rather than silently reproduce).

pub mod ast;
pub mod codepage;
pub mod compiler;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod includes;
pub mod lexer;
pub mod nameord;
pub mod numbers;
pub mod options;
pub mod parser;
pub mod resource_type;
pub mod strings;
pub mod token;

pub use compiler::{CompileOutput, Compiler};
pub use error::{CompileError, Result};
pub use options::CompileOptions;
