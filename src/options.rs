//! Compile-time configuration (`spec.md` §6).
//!
//! CLI argument parsing is explicitly out of scope (`spec.md` §1); this
//! struct is the library's configuration surface, built with plain
//! chainable builder methods in the style of the teacher crate's other
//! options types.

use crate::codepage::CodePage;

/// Configuration for a single compile (`spec.md` §6).
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Language id pair used when a resource specifies none.
    pub default_language_id: (u16, u16),
    /// Code page active before any `#pragma code_page` takes effect.
    pub default_code_page: CodePage,
    /// Upper bound on a single quoted string literal's code-unit count
    /// before it is rejected.
    pub max_string_literal_code_units: usize,
    /// Whether STRINGTABLE strings are emitted with a trailing NUL unit.
    pub null_terminate_string_table_strings: bool,
    /// If true, an unsupported `#pragma code_page` id is downgraded from a
    /// hard error to a warning, keeping the previously active code page.
    pub warn_instead_of_error_on_invalid_code_page: bool,
    /// Directories searched, in order, for external-file resources, ahead
    /// of the resource script's own directory.
    pub include_directories: Vec<std::path::PathBuf>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            default_language_id: (0x09, 0x01),
            default_code_page: CodePage::Windows1252,
            max_string_literal_code_units: 4097,
            null_terminate_string_table_strings: false,
            warn_instead_of_error_on_invalid_code_page: false,
            include_directories: Vec::new(),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_language_id(mut self, primary: u16, sublanguage: u16) -> Self {
        self.default_language_id = (primary, sublanguage);
        self
    }

    pub fn default_code_page(mut self, code_page: CodePage) -> Self {
        self.default_code_page = code_page;
        self
    }

    pub fn max_string_literal_code_units(mut self, max: usize) -> Self {
        self.max_string_literal_code_units = max;
        self
    }

    pub fn null_terminate_string_table_strings(mut self, yes: bool) -> Self {
        self.null_terminate_string_table_strings = yes;
        self
    }

    pub fn warn_instead_of_error_on_invalid_code_page(mut self, yes: bool) -> Self {
        self.warn_instead_of_error_on_invalid_code_page = yes;
        self
    }

    pub fn include_directory<P: Into<std::path::PathBuf>>(mut self, dir: P) -> Self {
        self.include_directories.push(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let opts = CompileOptions::new();
        assert_eq!(opts.default_code_page, CodePage::Windows1252);
        assert!(!opts.null_terminate_string_table_strings);
    }

    #[test]
    fn builder_methods_chain() {
        let opts = CompileOptions::new()
            .default_language_id(0x04, 0x09)
            .max_string_literal_code_units(100)
            .include_directory("/usr/include");
        assert_eq!(opts.default_language_id, (0x04, 0x09));
        assert_eq!(opts.max_string_literal_code_units, 100);
        assert_eq!(opts.include_directories, vec![std::path::PathBuf::from("/usr/include")]);
    }
}
