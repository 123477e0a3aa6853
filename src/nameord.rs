//! The `NameOrOrdinal` classifier (`spec.md` §3, `spec.md` §4.2).

use crate::numbers::parse_number_literal;

/// Maximum number of UTF-16 code units a Name may hold on disk
/// (`spec.md` §3/§8).
pub const MAX_NAME_CODE_UNITS: usize = 256;

/// A value that may be either an uppercase UTF-16 identifier (≤256 code
/// units) or a 16-bit ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOrOrdinal {
    Ordinal(u16),
    /// UTF-16 code units, already uppercased and truncated to 256 units.
    /// Truncation may leave an unpaired high surrogate; that is intentional
    /// (`spec.md` §3).
    Name(Vec<u16>),
}

impl NameOrOrdinal {
    /// Classifies a raw source literal per the derivation rules in
    /// `spec.md` §3:
    ///
    /// - If it begins with a digit, attempt an integer parse (decimal, or
    ///   hex under a `0x`/`0X` prefix). Overflow wraps modulo 2^16.
    /// - A base-16 parse that terminates on a non-hex digit still yields an
    ///   ordinal (hex "terminates" rather than "aborts"); a base-10 parse
    ///   that hits a non-digit codepoint aborts and falls through to Name.
    /// - If the resulting integer is exactly 0, treat the literal as a Name
    ///   (the exact uppercased ASCII source text) rather than `Ordinal(0)`.
    /// - Otherwise, `Ordinal(value)`.
    pub fn from_literal(text: &str) -> NameOrOrdinal {
        if let Some(first) = text.chars().next() {
            if first.is_ascii_digit() {
                let is_hex = text.starts_with("0x") || text.starts_with("0X");
                let ordinal = if is_hex {
                    parse_hex_ordinal(&text[2..])
                } else {
                    match parse_decimal_ordinal(text) {
                        Some(value) => value,
                        None => return NameOrOrdinal::from_name_text(text),
                    }
                };
                if ordinal == 0 {
                    return NameOrOrdinal::from_name_text(text);
                }
                return NameOrOrdinal::Ordinal(ordinal);
            }
        }
        NameOrOrdinal::from_name_text(text)
    }

    /// Builds a Name directly from already-decoded source text: uppercases
    /// ASCII, replaces invalid codepoints with U+FFFD (callers pass already
    /// lossily-decoded text so this is mostly a formality), and truncates
    /// to 256 UTF-16 code units.
    pub fn from_name_text(text: &str) -> NameOrOrdinal {
        let upper: String = text.chars().map(|c| c.to_ascii_uppercase()).collect();
        let mut units: Vec<u16> = upper.encode_utf16().collect();
        units.truncate(MAX_NAME_CODE_UNITS);
        NameOrOrdinal::Name(units)
    }

    pub fn is_ordinal(&self) -> bool {
        matches!(self, NameOrOrdinal::Ordinal(_))
    }

    /// Number of bytes this value occupies on disk, per `spec.md` §6:
    /// `Ordinal` is always 4 bytes (`FFFF` + value); `Name` is
    /// `2 * (code_units + 1)` bytes (UTF-16LE plus a trailing NUL unit).
    pub fn byte_len(&self) -> usize {
        match self {
            NameOrOrdinal::Ordinal(_) => 4,
            NameOrOrdinal::Name(units) => 2 * (units.len() + 1),
        }
    }
}

fn parse_hex_ordinal(rest: &str) -> u16 {
    match parse_number_literal(&format!("0x{rest}")) {
        Some(n) => n.value as u16,
        None => 0,
    }
}

fn parse_decimal_ordinal(text: &str) -> Option<u16> {
    // Base-10 classification aborts (becomes a Name) on any non-digit
    // codepoint, unlike hex which simply terminates. We re-derive this by
    // checking every codepoint up front: `parse_number_literal` would
    // happily stop early and return a partial value, which is wrong for the
    // base-10 "abort" rule.
    for c in text.chars() {
        if !(c.is_ascii_digit() || c == '¹' || c == '²' || c == '³') {
            return None;
        }
    }
    let n = parse_number_literal(text)?;
    Some(n.value as u16)
}
