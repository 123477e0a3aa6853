//! The single-threaded compile driver (`spec.md` §5; expanded "AMBIENT
//! MODULES" section).
//!
//! `Compiler::compile` is the crate's one entry point: it runs the parser
//! over the source text, then the emitter over the resulting tree, and
//! returns the concatenated `.res` bytes alongside any diagnostics
//! collected along the way. No state survives past one `compile` call.

use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::emit::{self, EmitContext};
use crate::error::Result;
use crate::includes::FileResolver;
use crate::options::CompileOptions;
use crate::parser;

/// The result of a successful compile: the `.res` bytes and whatever
/// compatibility diagnostics were accumulated while producing them
/// (`spec.md` §7 — diagnostics never block emission).
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub bytes: Vec<u8>,
    pub diagnostics: Vec<crate::diagnostics::Diagnostic>,
}

/// Owns nothing across calls; each `compile` starts a fresh parse and a
/// fresh [`EmitContext`] (`spec.md` §5, "Global mutable state" — the icon
/// counter and code-page table are scoped to one compilation, never a
/// process-level global).
#[derive(Debug, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Compiler { options }
    }

    /// Compiles resource-script source text already read from `source_path`
    /// (used to resolve external-file resources and as the initial
    /// include-search directory).
    pub fn compile(&self, source: &[u8], source_path: &Path) -> Result<CompileOutput> {
        let (statements, mut diagnostics, code_pages) = parser::parse(source, &self.options)?;
        let resolver = FileResolver::new(source_path, &self.options.include_directories);
        let mut ctx = EmitContext::new(&self.options, &code_pages, &resolver, &mut diagnostics);
        let bytes = emit::emit_all(&statements, &mut ctx)?;
        Ok(CompileOutput { bytes, diagnostics: diagnostics_into_vec(diagnostics) })
    }

    /// Reads `path` from disk and compiles it (`spec.md` §6, "External
    /// Interfaces").
    pub fn compile_file(&self, path: &Path) -> Result<CompileOutput> {
        let source = std::fs::read(path)?;
        self.compile(&source, path)
    }
}

fn diagnostics_into_vec(diagnostics: Diagnostics) -> Vec<crate::diagnostics::Diagnostic> {
    diagnostics.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn empty_source_emits_only_the_sentinel() {
        let compiler = Compiler::new(CompileOptions::new());
        let output = compiler.compile(b"", &PathBuf::from("empty.rc")).unwrap();
        assert_eq!(output.bytes.len(), 32);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn single_rcdata_resource_round_trips_through_compile() {
        let compiler = Compiler::new(CompileOptions::new());
        let source = b"1 RCDATA { 1, \"2\" }";
        let output = compiler.compile(source, &PathBuf::from("test.rc")).unwrap();
        assert!(output.bytes.len() > 32);
    }

    #[test]
    fn unterminated_string_is_a_hard_error() {
        let compiler = Compiler::new(CompileOptions::new());
        let source = b"1 RCDATA { \"unterminated";
        assert!(compiler.compile(source, &PathBuf::from("test.rc")).is_err());
    }
}
