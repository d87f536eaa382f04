/*
Every malformed input must surface a typed error from `parse`, never a
panic, and never a partially valid document. The error variants pin down
which stage rejected the input, and the instance must stay reusable
afterwards.
*/

use super::*;

#[test]
fn err_leading_zero_number() {
    assert!(matches!(
        parse_err(b"{\"a\":01}"),
        Error::MalformedNumber { offset: 5, .. }
    ));
}

#[test]
fn err_truncated_array() {
    assert!(matches!(parse_err(b"[1,2,"), Error::Structural { offset: 5, .. }));
}

#[test]
fn err_unpaired_high_surrogate() {
    assert!(matches!(
        parse_err(b"\"\\ud800\""),
        Error::InvalidEscape { offset: 1, .. }
    ));
}

#[test]
fn err_invalid_utf8() {
    assert_eq!(
        Error::InvalidUtf8 { offset: 6 },
        parse_err(b"{\"a\":\"\xff\"}")
    );

    // overlong, surrogate, and beyond-U+10FFFF encodings all gate the parse
    assert!(matches!(
        parse_err(b"\"\xc0\xaf\""),
        Error::InvalidUtf8 { .. }
    ));
    assert!(matches!(
        parse_err(b"\"\xed\xa0\x80\""),
        Error::InvalidUtf8 { .. }
    ));
    assert!(matches!(
        parse_err(b"\"\xf4\x90\x80\x80\""),
        Error::InvalidUtf8 { .. }
    ));
}

#[test]
fn err_unescaped_control_character() {
    assert_eq!(
        Error::UnescapedControlCharacter {
            offset: 6,
            found: 0x01,
        },
        parse_err(b"{\"a\":\"\x01\"}")
    );

    assert!(matches!(
        parse_err(b"\"tab\tinside\""),
        Error::UnescapedControlCharacter { found: b'\t', .. }
    ));
}

#[test]
fn err_unterminated_string() {
    assert!(matches!(
        parse_err(b"\"never closed"),
        Error::UnterminatedString { .. }
    ));

    assert!(matches!(
        parse_err(b"{\"a\":\"this string is not finished}"),
        Error::UnterminatedString { .. }
    ));
}

#[test]
fn err_escape_parity_at_the_closing_quote() {
    // a string ending in n backslashes closes iff n is even
    for n in 0..6 {
        let mut input = b"{\"k\":\"v".to_vec();
        input.extend(std::iter::repeat(b'\\').take(n));
        input.extend_from_slice(b"\"}");

        if n % 2 == 0 {
            let expected: String = std::iter::repeat('\\').take(n / 2).collect();
            let value = parse_value(&input);
            assert_eq!(
                serde_json::json!({ "k": format!("v{}", expected) }),
                value,
                "n = {}",
                n
            );
        } else {
            // the quote is escaped, so the string swallows the `}` and
            // runs off the end of the input
            assert!(
                matches!(parse_err(&input), Error::UnterminatedString { .. }),
                "n = {}",
                n
            );
        }
    }
}

#[test]
fn err_invalid_escapes() {
    assert!(matches!(
        parse_err(b"\"bad \\q escape\""),
        Error::InvalidEscape { found: b'q', .. }
    ));
    assert!(matches!(
        parse_err(b"\"\\u12\""),
        Error::InvalidEscape { .. }
    ));
    assert!(matches!(
        parse_err(b"\"\\ud83dno low half\""),
        Error::InvalidEscape { .. }
    ));
    assert!(matches!(
        parse_err(b"\"\\ude00\""),
        Error::InvalidEscape { .. }
    ));
}

#[test]
fn err_malformed_numbers() {
    for input in [
        &b"[1.]"[..],
        b"[.5]",
        b"[1e]",
        b"[1e+]",
        b"[-]",
        b"[00]",
        b"[1.2.3]",
        b"{\"a\":1x}",
    ] {
        let err = parse_err(input);
        assert!(
            matches!(err, Error::MalformedNumber { .. } | Error::Structural { .. }),
            "input {:?} gave {:?}",
            String::from_utf8_lossy(input),
            err
        );
    }
}

#[test]
fn err_integers_outside_i64() {
    assert!(matches!(
        parse_err(b"[9223372036854775808]"),
        Error::NumberOutOfRange { offset: 1 }
    ));
    assert!(matches!(
        parse_err(b"[-9223372036854775809]"),
        Error::NumberOutOfRange { .. }
    ));
    assert!(matches!(
        parse_err(b"[18446744073709551615]"),
        Error::NumberOutOfRange { .. }
    ));
}

#[test]
fn err_structural_violations() {
    // missing `:`
    assert!(matches!(parse_err(b"{\"a\" 1}"), Error::Structural { .. }));
    // missing `,`
    assert!(matches!(parse_err(b"[1 2]"), Error::Structural { .. }));
    // non-string key
    assert!(matches!(parse_err(b"{1:2}"), Error::Structural { .. }));
    // keys after values
    assert!(matches!(parse_err(b"{\"a\":1,2}"), Error::Structural { .. }));
    // mismatched closers
    assert!(matches!(parse_err(b"{\"a\":1]"), Error::Structural { .. }));
    assert!(matches!(parse_err(b"[1,2}"), Error::Structural { .. }));
    // trailing commas
    assert!(matches!(parse_err(b"[1,]"), Error::Structural { .. }));
    assert!(matches!(parse_err(b"{\"a\":1,}"), Error::Structural { .. }));
    // unclosed scopes
    assert!(matches!(parse_err(b"{\"a\":{"), Error::Structural { .. }));
    // nothing at all
    assert!(matches!(parse_err(b""), Error::Structural { .. }));
    assert!(matches!(parse_err(b"   \n  "), Error::Structural { .. }));
}

#[test]
fn err_trailing_tokens() {
    assert!(matches!(
        parse_err(b"{} {}"),
        Error::Structural { offset: 3, .. }
    ));
    assert!(matches!(parse_err(b"1 2"), Error::Structural { .. }));
    assert!(matches!(parse_err(b"\"a\" \"b\""), Error::Structural { .. }));
    assert!(matches!(parse_err(b"[1,2]]"), Error::Structural { .. }));
}

#[test]
fn err_broken_atoms() {
    assert!(matches!(parse_err(b"[tru]"), Error::Structural { .. }));
    assert!(matches!(parse_err(b"[truee]"), Error::Structural { .. }));
    assert!(matches!(parse_err(b"[nul]"), Error::Structural { .. }));
    assert!(matches!(parse_err(b"[falsy]"), Error::Structural { .. }));
    assert!(matches!(parse_err(b"[+1]"), Error::Structural { .. }));
}

#[test]
fn err_control_characters_outside_strings() {
    assert!(matches!(parse_err(b"[\x07]"), Error::Structural { .. }));
}

#[test]
fn err_nesting_beyond_the_depth_budget() {
    let mut input = String::new();
    for _ in 0..200 {
        input.push('[');
    }

    let mut parser = Parser::new(1024, 128);
    assert!(matches!(
        parser.parse(input.as_bytes()),
        Err(Error::CapacityExceeded {
            requested: 129,
            limit: 128,
        })
    ));
}

#[test]
fn err_input_beyond_the_capacity_budget() {
    let mut parser = Parser::new(16, 8);

    assert_eq!(
        Err(Error::CapacityExceeded {
            requested: 17,
            limit: 16,
        })
        .map(|_: crate::Document| ()),
        parser.parse(b"[1,2,3,4,5,6,7,8]").map(|_| ())
    );

    // within capacity still works
    assert!(parser.parse(b"[1,2,3]").is_ok());
}
