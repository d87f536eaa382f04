/*!
Number parsing.

A decimal literal is converted to either a 64-bit integer or an IEEE 754
binary value through three paths:

- integers and small decimals take a fast path of exact machine arithmetic,
- most floats take the Eisel-Lemire 128-bit product path,
- literals with more than 19 significant digits, and products the 128-bit
  precision can't settle, fall back to an arbitrary-precision fixed-point
  decimal.

All three paths produce results bit-identical to a correctly rounded
conversion; the tests check this differentially against the standard
library's conversion rather than by construction.

Grammar checks happen inline while scanning: no leading zero ahead of more
digits, a mandatory digit after the decimal point and after an exponent
marker, and a structural or whitespace byte after the literal. Explicit
exponents beyond the representable range are clamped to a saturating
sentinel, so `1e99999` quietly becomes infinity rather than an error.
*/

mod lemire;
mod slow;
mod tables;

use crate::error::{Error, Result};

use self::lemire::BiasedFp;

/// A parsed numeric literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Double(f64),
}

/// Decimal exponents stop accumulating here; anything this large already
/// saturates to zero or infinity.
const EXPONENT_SATURATION: i64 = 1_000_000_000_000_000;

/// Literal bytes the accumulator holds exactly.
const MAX_EXACT_DIGITS: usize = 19;

/**
Parse the number starting at `offset`.

The byte at `offset` is the literal's first byte (`-` or a digit); the
literal ends at the first byte that isn't part of the number grammar, which
must be structural or whitespace.
*/
pub(crate) fn parse_number(input: &[u8], offset: usize) -> Result<Number> {
    let bytes = &input[offset..];

    let mut idx = 0usize;
    let negative = bytes.first() == Some(&b'-');
    if negative {
        idx += 1;
    }

    // integer part
    let start_digits = idx;
    let mut mantissa = 0u64;
    while let Some(d) = digit_at(bytes, idx) {
        mantissa = mantissa.wrapping_mul(10).wrapping_add(d as u64);
        idx += 1;
    }

    let int_digits = &bytes[start_digits..idx];
    if int_digits.is_empty() {
        return Err(Error::MalformedNumber {
            offset,
            reason: "a digit is required",
        });
    }
    if int_digits.len() > 1 && int_digits[0] == b'0' {
        return Err(Error::MalformedNumber {
            offset,
            reason: "leading zeros are not allowed",
        });
    }

    // fraction
    let mut exponent = 0i64;
    let mut frac_digits: &[u8] = &[];
    let mut is_float = false;
    if bytes.get(idx) == Some(&b'.') {
        is_float = true;
        idx += 1;

        let frac_start = idx;
        while let Some(d) = digit_at(bytes, idx) {
            mantissa = mantissa.wrapping_mul(10).wrapping_add(d as u64);
            idx += 1;
        }

        frac_digits = &bytes[frac_start..idx];
        if frac_digits.is_empty() {
            return Err(Error::MalformedNumber {
                offset,
                reason: "a digit is required after the decimal point",
            });
        }
        exponent -= frac_digits.len() as i64;
    }

    // exponent
    if matches!(bytes.get(idx), Some(b'e' | b'E')) {
        is_float = true;
        idx += 1;

        let exp_negative = match bytes.get(idx) {
            Some(b'-') => {
                idx += 1;
                true
            }
            Some(b'+') => {
                idx += 1;
                false
            }
            _ => false,
        };

        let exp_start = idx;
        let mut exp_number = 0i64;
        while let Some(d) = digit_at(bytes, idx) {
            // clamp instead of overflowing; the value saturates downstream
            if exp_number < EXPONENT_SATURATION {
                exp_number = exp_number * 10 + d as i64;
            }
            idx += 1;
        }

        if idx == exp_start {
            return Err(Error::MalformedNumber {
                offset,
                reason: "a digit is required after the exponent",
            });
        }

        exponent += if exp_negative { -exp_number } else { exp_number };
    }

    // the literal must be delimited from whatever follows
    if let Some(&b) = bytes.get(idx) {
        if !is_structural_or_whitespace(b) {
            return Err(Error::MalformedNumber {
                offset,
                reason: "a number must be followed by whitespace or punctuation",
            });
        }
    }

    if !is_float {
        return parse_integer(int_digits, mantissa, negative, offset);
    }

    Ok(Number::Double(parse_float::<f64>(
        int_digits,
        frac_digits,
        mantissa,
        exponent,
        negative,
    )))
}

#[inline]
fn digit_at(bytes: &[u8], idx: usize) -> Option<u8> {
    match bytes.get(idx) {
        Some(&b) if b.is_ascii_digit() => Some(b - b'0'),
        _ => None,
    }
}

/**
The integer path: at most 19 digits fit a `u64` accumulator; exactly 19 is
checked against the signed range, minding that `-9223372036854775808` has no
positive counterpart.
*/
#[inline]
fn parse_integer(int_digits: &[u8], mantissa: u64, negative: bool, offset: usize) -> Result<Number> {
    if int_digits.len() > MAX_EXACT_DIGITS {
        return Err(Error::NumberOutOfRange { offset });
    }

    if int_digits.len() == MAX_EXACT_DIGITS && mantissa > i64::MAX as u64 + negative as u64 {
        return Err(Error::NumberOutOfRange { offset });
    }

    let value = if negative {
        (mantissa as i64).wrapping_neg()
    } else {
        mantissa as i64
    };

    Ok(Number::Int(value))
}

/**
The float paths, generic over the IEEE target width.
*/
fn parse_float<F: IeeeFloat>(
    int_digits: &[u8],
    frac_digits: &[u8],
    mut mantissa: u64,
    mut exponent: i64,
    negative: bool,
) -> F {
    // the slow path re-reads the digits at full precision
    let base_exponent = exponent;

    let mut digit_count = int_digits.len() + frac_digits.len();
    let mut truncated = false;

    if digit_count > MAX_EXACT_DIGITS {
        // `0.000...` prefixes carry no significant digits
        let leading = int_digits
            .iter()
            .chain(frac_digits)
            .take_while(|&&b| b == b'0')
            .count();
        digit_count -= leading;

        if digit_count > MAX_EXACT_DIGITS {
            // keep the 19 most significant digits; the dropped tail shifts
            // the exponent and may matter for rounding later
            truncated = true;
            mantissa = 0;
            let kept = int_digits
                .iter()
                .chain(frac_digits)
                .skip(leading)
                .take(MAX_EXACT_DIGITS);
            for &b in kept {
                mantissa = mantissa * 10 + (b - b'0') as u64;
            }
            exponent += (digit_count - MAX_EXACT_DIGITS) as i64;
        }
    }

    // fast path: both operands are exactly representable
    if (F::MIN_EXPONENT_FAST_PATH..=F::MAX_EXPONENT_FAST_PATH).contains(&exponent)
        && mantissa <= F::MAX_MANTISSA_FAST_PATH
        && !truncated
    {
        let mut value = F::from_u64(mantissa);
        if exponent < 0 {
            value = value / F::exact_power_of_ten(-exponent);
        } else {
            value = value * F::exact_power_of_ten(exponent);
        }
        return if negative { -value } else { value };
    }

    let mut fp = lemire::compute_float::<F>(exponent, mantissa);
    if truncated && fp.e >= 0 {
        // the dropped tail could push the value across a rounding boundary;
        // if nudging the significand by one changes the result, the answer
        // isn't settled
        if fp != lemire::compute_float::<F>(exponent, mantissa + 1) {
            fp = BiasedFp::INVALID;
        }
    }

    if fp.e < 0 {
        fp = slow::parse_long_mantissa::<F>(int_digits, frac_digits, base_exponent);
    }

    F::from_bits_parts(fp.f, fp.e, negative)
}

#[inline]
fn is_structural_or_whitespace(b: u8) -> bool {
    const fn table() -> [bool; 256] {
        let mut t = [false; 256];
        t[b'{' as usize] = true;
        t[b'}' as usize] = true;
        t[b'[' as usize] = true;
        t[b']' as usize] = true;
        t[b':' as usize] = true;
        t[b',' as usize] = true;
        t[b' ' as usize] = true;
        t[b'\t' as usize] = true;
        t[b'\n' as usize] = true;
        t[b'\r' as usize] = true;
        t
    }
    static STRUCTURAL_OR_WHITESPACE: [bool; 256] = table();

    STRUCTURAL_OR_WHITESPACE[b as usize]
}

/**
The IEEE 754 constants and packing the conversion paths are generic over.

The `f32` mirror exists so narrower consumers share the exact same
algorithm; every constant is the canonical correct-rounding bound for its
width.
*/
pub(crate) trait IeeeFloat:
    Copy
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + std::ops::Neg<Output = Self>
{
    const MANTISSA_EXPLICIT_BITS: i32;
    const MINIMUM_EXPONENT: i32;
    const INFINITE_POWER: i32;
    const SMALLEST_POWER_OF_TEN: i64;
    const LARGEST_POWER_OF_TEN: i64;
    const MIN_EXPONENT_ROUND_TO_EVEN: i64;
    const MAX_EXPONENT_ROUND_TO_EVEN: i64;
    const MIN_EXPONENT_FAST_PATH: i64;
    const MAX_EXPONENT_FAST_PATH: i64;
    const MAX_MANTISSA_FAST_PATH: u64;

    fn from_u64(v: u64) -> Self;
    fn exact_power_of_ten(e: i64) -> Self;
    fn from_bits_parts(mantissa: u64, power2: i32, negative: bool) -> Self;
}

impl IeeeFloat for f64 {
    const MANTISSA_EXPLICIT_BITS: i32 = 52;
    const MINIMUM_EXPONENT: i32 = -1023;
    const INFINITE_POWER: i32 = 0x7FF;
    const SMALLEST_POWER_OF_TEN: i64 = -342;
    const LARGEST_POWER_OF_TEN: i64 = 308;
    const MIN_EXPONENT_ROUND_TO_EVEN: i64 = -4;
    const MAX_EXPONENT_ROUND_TO_EVEN: i64 = 23;
    const MIN_EXPONENT_FAST_PATH: i64 = -22;
    const MAX_EXPONENT_FAST_PATH: i64 = 22;
    const MAX_MANTISSA_FAST_PATH: u64 = 2u64 << 52;

    #[inline]
    fn from_u64(v: u64) -> Self {
        v as f64
    }

    #[inline]
    fn exact_power_of_ten(e: i64) -> Self {
        tables::POWER_OF_TEN_F64[e as usize]
    }

    #[inline]
    fn from_bits_parts(mantissa: u64, power2: i32, negative: bool) -> Self {
        let mut bits = mantissa | ((power2 as u64) << Self::MANTISSA_EXPLICIT_BITS);
        if negative {
            bits |= 1u64 << 63;
        }
        f64::from_bits(bits)
    }
}

impl IeeeFloat for f32 {
    const MANTISSA_EXPLICIT_BITS: i32 = 23;
    const MINIMUM_EXPONENT: i32 = -127;
    const INFINITE_POWER: i32 = 0xFF;
    const SMALLEST_POWER_OF_TEN: i64 = -65;
    const LARGEST_POWER_OF_TEN: i64 = 38;
    const MIN_EXPONENT_ROUND_TO_EVEN: i64 = -17;
    const MAX_EXPONENT_ROUND_TO_EVEN: i64 = 10;
    const MIN_EXPONENT_FAST_PATH: i64 = -10;
    const MAX_EXPONENT_FAST_PATH: i64 = 10;
    const MAX_MANTISSA_FAST_PATH: u64 = 2u64 << 23;

    #[inline]
    fn from_u64(v: u64) -> Self {
        v as f32
    }

    #[inline]
    fn exact_power_of_ten(e: i64) -> Self {
        tables::POWER_OF_TEN_F32[e as usize]
    }

    #[inline]
    fn from_bits_parts(mantissa: u64, power2: i32, negative: bool) -> Self {
        let mut bits = (mantissa as u32) | ((power2 as u32) << Self::MANTISSA_EXPLICIT_BITS);
        if negative {
            bits |= 1u32 << 31;
        }
        f32::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(literal: &str) -> i64 {
        match parse_number(literal.as_bytes(), 0).unwrap() {
            Number::Int(v) => v,
            other => panic!("expected an integer from {}, got {:?}", literal, other),
        }
    }

    fn double(literal: &str) -> f64 {
        match parse_number(literal.as_bytes(), 0).unwrap() {
            Number::Double(v) => v,
            other => panic!("expected a double from {}, got {:?}", literal, other),
        }
    }

    fn check_double(literal: &str) {
        let expected: f64 = literal.parse().unwrap();
        assert_eq!(
            expected.to_bits(),
            double(literal).to_bits(),
            "literal {}",
            literal
        );
    }

    // drive the f32 mirror directly; `parse_number` itself only emits f64
    fn check_f32(literal: &str) {
        let expected: f32 = literal.parse().unwrap();

        let bytes = literal.trim_start_matches('-').as_bytes();
        let negative = literal.starts_with('-');
        let (int_part, rest) = match bytes.iter().position(|&b| b == b'.' || b == b'e') {
            Some(i) => (&bytes[..i], &bytes[i..]),
            None => (bytes, &[][..]),
        };
        let parse_exp = |digits: &[u8]| -> i64 {
            std::str::from_utf8(digits).unwrap().parse().unwrap()
        };
        let (frac_part, exp): (&[u8], i64) = match rest.first() {
            Some(b'.') => {
                let rest = &rest[1..];
                match rest.iter().position(|&b| b == b'e') {
                    Some(i) => (&rest[..i], parse_exp(&rest[i + 1..])),
                    None => (rest, 0),
                }
            }
            Some(b'e') => (&[][..], parse_exp(&rest[1..])),
            _ => (&[][..], 0),
        };

        let mut mantissa = 0u64;
        for &b in int_part.iter().chain(frac_part) {
            mantissa = mantissa.wrapping_mul(10).wrapping_add((b - b'0') as u64);
        }

        let got = parse_float::<f32>(
            int_part,
            frac_part,
            mantissa,
            exp - frac_part.len() as i64,
            negative,
        );
        assert_eq!(expected.to_bits(), got.to_bits(), "literal {}", literal);
    }

    #[test]
    fn integers_parse_exactly() {
        assert_eq!(0, int("0"));
        assert_eq!(0, int("-0"));
        assert_eq!(1, int("1"));
        assert_eq!(-1, int("-1"));
        assert_eq!(42, int("42"));
        assert_eq!(i64::MAX, int("9223372036854775807"));
        assert_eq!(i64::MIN, int("-9223372036854775808"));
        assert_eq!(999_999_999_999_999_999, int("999999999999999999"));
    }

    #[test]
    fn integers_outside_the_signed_range_fail() {
        for literal in [
            "9223372036854775808",
            "-9223372036854775809",
            "18446744073709551615",
            "12345678901234567890123",
        ] {
            assert!(
                matches!(
                    parse_number(literal.as_bytes(), 0),
                    Err(Error::NumberOutOfRange { .. })
                ),
                "literal {}",
                literal
            );
        }
    }

    #[test]
    fn doubles_on_the_fast_path() {
        for literal in ["1.0", "0.5", "3.141592653589793", "-2.5", "1e15", "123.456", "1e22", "1e-22"] {
            check_double(literal);
        }
    }

    #[test]
    fn doubles_on_the_lemire_path() {
        for literal in [
            "1e23",
            "-1e23",
            "2.2250738585072014e-308",
            "1.7976931348623157e308",
            "1234567890123456789e-25",
            "2.718281828459045235360287471352662497757",
            "1e-307",
            "8.98846567431158e307",
        ] {
            check_double(literal);
        }
    }

    #[test]
    fn doubles_on_the_slow_path() {
        // 20+ significant digits force the arbitrary-precision path when
        // the nudged product disagrees
        for literal in [
            "12345678901234567890.12345678901234567890",
            "8.886928281463880569e16",
            "9007199254740993.00000000000000000000000001",
            "2.22507385850720113605740979670913197593481954635164564e-308",
            "0.000000000000000000000000000000000000000000000000000000000000001",
        ] {
            check_double(literal);
        }

        // hundreds of digits, at and past the digit budget
        let mut long = String::from("1.");
        for _ in 0..850 {
            long.push('7');
        }
        check_double(&long);

        let mut long = String::from("0.");
        for _ in 0..820 {
            long.push('0');
        }
        long.push_str("125e800");
        check_double(&long);
    }

    #[test]
    fn exponent_boundaries_saturate() {
        assert_eq!(f64::INFINITY, double("1e309"));
        assert_eq!(f64::INFINITY, double("1e400"));
        assert_eq!(f64::NEG_INFINITY, double("-1e400"));
        assert_eq!(0.0, double("1e-400"));
        assert_eq!(-0.0, double("-1e-400"));
        assert!(double("-1e-400").is_sign_negative());

        // a preposterous exponent clamps instead of wrapping
        assert_eq!(f64::INFINITY, double("1e99999999999999999999"));
        assert_eq!(0.0, double("1e-99999999999999999999"));

        for literal in [
            "1e308", "-1e308", "1e309", "1e310", "1e-308", "1e-324", "4.9e-324", "5e-324",
            "1e-342", "1e-343",
        ] {
            check_double(literal);
        }
    }

    #[test]
    fn the_subnormal_transition_is_exact() {
        for literal in [
            "2.2250738585072014e-308",
            "2.2250738585072013e-308",
            "2.2250738585072011e-308",
            "2.225073858507201e-308",
            "4.4501477170144023e-308",
        ] {
            check_double(literal);
        }
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        assert!(double("-0.0").is_sign_negative());
        assert_eq!(0, int("-0"));
    }

    #[test]
    fn significant_digit_counts_across_the_paths() {
        // 1, 19, 20 and 800+ digit literals (the fast, Lemire and slow
        // boundaries)
        check_double("7.0");
        check_double("1234567890123456789.0");
        check_double("12345678901234567891.0");
        check_double("9999999999999999999999999999999999999999.0");

        let mut huge = String::new();
        for i in 0..801 {
            huge.push((b'1' + (i % 9) as u8) as char);
        }
        huge.push_str(".0");
        check_double(&huge);
    }

    #[test]
    fn malformed_literals_fail() {
        for literal in ["01", "-01", "00", "1.", ".5", "1e", "1e+", "-", "1.e5", "--1", "1x"] {
            assert!(
                matches!(
                    parse_number(literal.as_bytes(), 0),
                    Err(Error::MalformedNumber { .. })
                ),
                "literal {}",
                literal
            );
        }
    }

    #[test]
    fn numbers_end_at_structural_bytes() {
        assert_eq!(Ok(Number::Int(5)), parse_number(b"5,", 0));
        assert_eq!(Ok(Number::Int(5)), parse_number(b"5}", 0));
        assert_eq!(Ok(Number::Int(5)), parse_number(b"5 ", 0));
        assert_eq!(Ok(Number::Int(7)), parse_number(b"[5,7]", 3));
    }

    #[test]
    fn the_f32_mirror_is_correctly_rounded() {
        for literal in [
            "1.0",
            "0.1",
            "3.4028234663852886e38",
            "3.4028236e38",
            "1e39",
            "1.1754943508222875e-38",
            "1e-45",
            "1.4e-45",
            "7e-46",
            "16777217",
            "16777219",
            "0.000001",
        ] {
            check_f32(literal);
        }
    }

    #[test]
    fn random_literals_match_the_reference() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..5000 {
            let digits = rng.gen_range(1..25);
            let mut literal = String::new();
            literal.push(char::from(b'1' + rng.gen_range(0..9) as u8));
            for _ in 0..digits {
                literal.push(char::from(b'0' + rng.gen_range(0..10) as u8));
            }
            literal.push('.');
            for _ in 0..rng.gen_range(1..25) {
                literal.push(char::from(b'0' + rng.gen_range(0..10) as u8));
            }
            literal.push('e');
            if rng.gen_bool(0.5) {
                literal.push('-');
            }
            literal.push_str(&rng.gen_range(0..320).to_string());

            check_double(&literal);
        }
    }
}
