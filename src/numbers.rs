//! Number literals and the binary-expression evaluator (`spec.md` §3/§4.2/§4.4).

/// A 32-bit number together with whether it carries an `L`/`l` long suffix.
/// Operators wrap on overflow modulo 2^32; `is_long` is the disjunction of
/// the operands' `is_long` (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Number {
    pub value: u32,
    pub is_long: bool,
}

impl Number {
    pub fn new(value: u32, is_long: bool) -> Self {
        Number { value, is_long }
    }

    /// The low 16 bits, used when a non-long number is written as 2-byte data.
    pub fn as_u16(self) -> u16 {
        self.value as u16
    }

    pub fn wrapping_add(self, rhs: Number) -> Number {
        Number::new(self.value.wrapping_add(rhs.value), self.is_long || rhs.is_long)
    }

    pub fn wrapping_sub(self, rhs: Number) -> Number {
        Number::new(self.value.wrapping_sub(rhs.value), self.is_long || rhs.is_long)
    }

    pub fn or(self, rhs: Number) -> Number {
        Number::new(self.value | rhs.value, self.is_long || rhs.is_long)
    }

    pub fn and(self, rhs: Number) -> Number {
        Number::new(self.value & rhs.value, self.is_long || rhs.is_long)
    }

    pub fn not(self) -> Number {
        Number::new(!self.value, self.is_long)
    }

    pub fn negate(self) -> Number {
        Number::new(self.value.wrapping_neg(), self.is_long)
    }
}

/// Parses a decimal or `0x`-prefixed hex number literal, honoring the
/// trailing `L`/`l` long suffix and the reference's digit-limit quirks
/// (`spec.md` §4.2):
///
/// - Hex literals only consider the first four hex digits; anything after
///   that (even further hex digits) terminates the literal's numeric part,
///   and any remaining text is left for the caller (who, per the
///   `NameOrOrdinal` rules, may turn the whole thing into a Name instead).
/// - Decimal literals reject a trailing `e`/`E` followed by a digit
///   (matches reference diagnostic RC2021).
/// - A leading unary `-` or `~` is part of the literal, not a separate
///   operator token, and applies two's-complement negation / bitwise
///   complement to the parsed magnitude.
///
/// Returns `None` if `text` does not start with a digit (after an optional
/// leading sign), i.e. it isn't a number literal at all.
pub fn parse_number_literal(text: &str) -> Option<Number> {
    let mut chars = text.chars().peekable();
    let mut negate = false;
    let mut invert = false;
    match chars.peek() {
        Some('-') => {
            negate = true;
            chars.next();
        }
        Some('~') => {
            invert = true;
            chars.next();
        }
        _ => {}
    }
    let rest: String = chars.collect();
    if !rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let (magnitude, is_long) = if rest.len() > 1 && (rest.starts_with("0x") || rest.starts_with("0X")) {
        parse_hex_literal(&rest[2..])
    } else {
        parse_decimal_literal(&rest)?
    };

    let mut number = Number::new(magnitude, is_long);
    if negate {
        number = number.negate();
    }
    if invert {
        number = number.not();
    }
    Some(number)
}

fn parse_hex_literal(rest: &str) -> (u32, bool) {
    let mut value: u32 = 0;
    let mut chars = rest.chars().peekable();
    let mut consumed = 0usize;
    while let Some(&c) = chars.peek() {
        if consumed >= 4 || !c.is_ascii_hexdigit() {
            break;
        }
        value = (value << 4) | c.to_digit(16).unwrap();
        consumed += 1;
        chars.next();
    }
    // Hex digits past the fourth don't contribute to the value, but they
    // still need to be skipped (not folded into `value`) before checking
    // for the `L`/`l` suffix that may follow them.
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_hexdigit() {
            break;
        }
        chars.next();
    }
    let remainder: String = chars.collect();
    let is_long = remainder.starts_with('L') || remainder.starts_with('l');
    (value, is_long)
}

/// Returns `None` for a trailing `e`/`E` immediately followed by a digit
/// (reference diagnostic RC2021); any other non-digit stops the scan and
/// succeeds, leaving the remainder available for the `L`/`l` suffix check.
fn parse_decimal_literal(rest: &str) -> Option<(u32, bool)> {
    let mut value: u32 = 0;
    let mut chars = rest.chars().peekable();
    loop {
        match chars.peek().copied() {
            Some(c) if c.is_ascii_digit() => {
                value = value.wrapping_mul(10).wrapping_add(c.to_digit(10).unwrap());
                chars.next();
            }
            // Unicode superscript 1/2/3 count as digits 1/2/3 (spec.md §3).
            Some('¹') => {
                value = value.wrapping_mul(10).wrapping_add(1);
                chars.next();
            }
            Some('²') => {
                value = value.wrapping_mul(10).wrapping_add(2);
                chars.next();
            }
            Some('³') => {
                value = value.wrapping_mul(10).wrapping_add(3);
                chars.next();
            }
            Some(c) if c == 'e' || c == 'E' => {
                let mut ahead = chars.clone();
                ahead.next();
                if matches!(ahead.peek(), Some(d) if d.is_ascii_digit()) {
                    return None;
                }
                break;
            }
            _ => break,
        }
    }
    let remainder: String = chars.collect();
    let is_long = remainder.starts_with('L') || remainder.starts_with('l');
    Some((value, is_long))
}

/// The four binary operators the grammar supports, all left-associative
/// with equal precedence (`spec.md` §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Or,
    And,
}

impl BinaryOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(BinaryOp::Add),
            '-' => Some(BinaryOp::Sub),
            '|' => Some(BinaryOp::Or),
            '&' => Some(BinaryOp::And),
            _ => None,
        }
    }

    pub fn apply(self, lhs: Number, rhs: Number) -> Number {
        match self {
            BinaryOp::Add => lhs.wrapping_add(rhs),
            BinaryOp::Sub => lhs.wrapping_sub(rhs),
            BinaryOp::Or => lhs.or(rhs),
            BinaryOp::And => lhs.and(rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_literal() {
        let n = parse_number_literal("123").unwrap();
        assert_eq!(n.value, 123);
        assert!(!n.is_long);
    }

    #[test]
    fn decimal_long_suffix() {
        let n = parse_number_literal("123L").unwrap();
        assert_eq!(n.value, 123);
        assert!(n.is_long);
    }

    #[test]
    fn hex_literal_only_first_four_digits() {
        let n = parse_number_literal("0x1234567").unwrap();
        assert_eq!(n.value, 0x1234);
    }

    #[test]
    fn hex_literal_long_suffix_past_the_fourth_digit() {
        let n = parse_number_literal("0x1234567L").unwrap();
        assert_eq!(n.value, 0x1234);
        assert!(n.is_long);
    }

    #[test]
    fn decimal_e_followed_by_digit_is_rejected() {
        assert!(parse_number_literal("123e5").is_none());
    }

    #[test]
    fn decimal_trailing_e_with_no_following_digit_is_accepted() {
        let n = parse_number_literal("123e").unwrap();
        assert_eq!(n.value, 123);
    }

    #[test]
    fn negative_literal_two_complement() {
        let n = parse_number_literal("-1").unwrap();
        assert_eq!(n.value, 0xFFFF_FFFF);
    }

    #[test]
    fn bitwise_not_literal() {
        let n = parse_number_literal("~0").unwrap();
        assert_eq!(n.value, 0xFFFF_FFFF);
    }

    #[test]
    fn wrap_add_overflow() {
        let a = Number::new(0xFFFF, false);
        let b = Number::new(1, false);
        let sum = a.wrapping_add(b);
        assert_eq!(sum.as_u16(), 0);
        assert!(!sum.is_long);
    }

    #[test]
    fn wrap_add_long_promotion() {
        let a = Number::new(0xFFFF, false);
        let b = Number::new(1, true);
        let sum = a.wrapping_add(b);
        assert_eq!(sum.value, 0x1_0000);
        assert!(sum.is_long);
    }

    #[test]
    fn superscript_digits_count_as_one_two_three() {
        let n = parse_number_literal("1²").unwrap();
        assert_eq!(n.value, 12);
    }
}
