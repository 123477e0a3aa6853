//! Code-page registry (`spec.md` §2/§3/§6).
//!
//! Maps the numeric code-page identifiers the `.rc` grammar accepts onto an
//! [`encoding_rs::Encoding`], using the same `codepage` + `encoding_rs`
//! pairing this corpus reaches for elsewhere to resolve numeric Windows
//! code-page ids (see `DESIGN.md`). Tracks, per source line, the input and
//! output code page active at that point, per the `#pragma code_page`
//! semantics in `spec.md` §4.1.

use std::collections::BTreeMap;

use encoding_rs::Encoding;

use crate::error::{CompileError, Result};

/// A resolved code page: `Windows1252` or `Utf8`, the only two the grammar
/// is specified to support (plus the `DEFAULT` alias, which resolves to
/// whatever the command-line default was).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    Windows1252,
    Utf8,
}

impl CodePage {
    pub const WINDOWS_1252_ID: u32 = 1252;
    pub const UTF8_ID: u32 = 65001;

    /// Parses a numeric code-page id from a `#pragma code_page(N)` or the
    /// command-line default. `DEFAULT` is handled by the caller (it needs
    /// access to the configured default, which this module doesn't own).
    pub fn from_id(id: u32) -> Result<Self> {
        match id {
            Self::WINDOWS_1252_ID => Ok(CodePage::Windows1252),
            Self::UTF8_ID => Ok(CodePage::Utf8),
            other => Err(CompileError::InvalidCodePage(other.to_string())),
        }
    }

    pub fn id(self) -> u32 {
        match self {
            CodePage::Windows1252 => Self::WINDOWS_1252_ID,
            CodePage::Utf8 => Self::UTF8_ID,
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            CodePage::Windows1252 => {
                codepage::to_encoding(Self::WINDOWS_1252_ID as u16).unwrap_or(encoding_rs::WINDOWS_1252)
            }
            CodePage::Utf8 => encoding_rs::UTF_8,
        }
    }

    /// Decodes source bytes (as they appear in the `.rc` text) into a Rust
    /// `String`, using this code page as the *input* page. Malformed
    /// sequences are replaced per the encoding's standard lossy behavior
    /// (`spec.md` §4.2: "invalid decoded codepoints are replaced with
    /// U+FFFD").
    pub fn decode(self, bytes: &[u8]) -> String {
        let (cow, _, _) = self.encoding().decode(bytes);
        cow.into_owned()
    }

    /// Re-encodes a decoded narrow string for the *output* code page. Under
    /// Windows-1252 unmappable characters become `?`; under UTF-8 nothing is
    /// unmappable. (`spec.md` §4.2.)
    pub fn encode_narrow(self, text: &str) -> Vec<u8> {
        match self {
            CodePage::Utf8 => text.as_bytes().to_vec(),
            CodePage::Windows1252 => {
                let (cow, _, _) = encoding_rs::WINDOWS_1252.encode(text);
                cow.into_owned()
            }
        }
    }
}

impl Default for CodePage {
    fn default() -> Self {
        CodePage::Windows1252
    }
}

/// Per-line input/output code-page table built up while tokenizing.
///
/// The first `#pragma code_page` in a file updates only the input page;
/// subsequent ones update both (`spec.md` §3). Lines not explicitly set
/// inherit the most recently set pair.
#[derive(Debug, Clone)]
pub struct CodePageTable {
    default_input: CodePage,
    default_output: CodePage,
    overrides: BTreeMap<u32, (CodePage, CodePage)>,
    seen_pragma: bool,
}

impl CodePageTable {
    pub fn new(default: CodePage) -> Self {
        CodePageTable {
            default_input: default,
            default_output: default,
            overrides: BTreeMap::new(),
            seen_pragma: false,
        }
    }

    /// Applies a `#pragma code_page(N)` encountered at `line`. Per
    /// `spec.md` §4.1, a pragma inside an included file is silently ignored
    /// (with a warning) by the caller before this is invoked; this method
    /// only implements the first-pragma-updates-input-only rule.
    pub fn apply_pragma(&mut self, line: u32, page: CodePage) {
        let (input, output) = if !self.seen_pragma {
            self.seen_pragma = true;
            (page, self.current(line).1)
        } else {
            (page, page)
        };
        self.overrides.insert(line, (input, output));
    }

    /// Returns the (input, output) code page active at `line`: the most
    /// recent override at or before `line`, or the configured default.
    pub fn current(&self, line: u32) -> (CodePage, CodePage) {
        self.overrides
            .range(..=line)
            .next_back()
            .map(|(_, pair)| *pair)
            .unwrap_or((self.default_input, self.default_output))
    }

    pub fn input_at(&self, line: u32) -> CodePage {
        self.current(line).0
    }

    pub fn output_at(&self, line: u32) -> CodePage {
        self.current(line).1
    }
}
