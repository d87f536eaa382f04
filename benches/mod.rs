#![cfg(unstable)]
#![feature(test)]
extern crate test;

use acorn_json::Parser;

use std::fmt::Write;

// A synthetic structured-event document in the ~10kb range, heavy on
// strings and mixed-type fields
fn event_document() -> String {
    let mut s = String::new();

    s.push_str("{\"@t\":\"2024-11-05T01:23:45.6789012Z\",\"@mt\":\"request handled in {Elapsed} ms\",");
    s.push_str("\"Elapsed\":12.875,\"StatusCode\":200,\"ok\":true,\"Context\":null,");

    s.push_str("\"Items\":[");
    for i in 0..40 {
        if i > 0 {
            s.push(',');
        }
        write!(
            s,
            "{{\"id\":{},\"name\":\"item-{}\",\"score\":{}.{},\"tags\":[\"a\",\"b\\u58c1c\"]}}",
            i,
            i,
            i * 37,
            i % 10
        )
        .unwrap();
    }
    s.push_str("],");

    s.push_str("\"Stacktrace\":\"");
    for frame in 0..60 {
        write!(
            s,
            "   at Some.Namespace.Type`1.Method[T](T arg) in C:\\\\src\\\\file{}.cs:line {}\\r\\n",
            frame, frame * 13
        )
        .unwrap();
    }
    s.push_str("\"}");

    s
}

#[bench]
fn parse_10kb_event(b: &mut test::Bencher) {
    let input = event_document();
    let mut parser = Parser::default();

    b.bytes = input.len() as u64;
    b.iter(|| {
        let document = parser.parse(input.as_bytes()).unwrap();
        test::black_box(document.root().size())
    })
}

#[bench]
fn parse_10kb_event_field_lookup(b: &mut test::Bencher) {
    let input = event_document();
    let mut parser = Parser::default();

    b.bytes = input.len() as u64;
    b.iter(|| {
        let document = parser.parse(input.as_bytes()).unwrap();
        test::black_box(
            document
                .root()
                .get("Elapsed")
                .and_then(|elapsed| elapsed.as_double()),
        )
    })
}

#[bench]
fn parse_10kb_event_serde_json(b: &mut test::Bencher) {
    let input = event_document();

    b.bytes = input.len() as u64;
    b.iter(|| {
        let v: serde_json::Value = serde_json::from_str(&input).unwrap();
        v
    })
}

#[bench]
fn parse_numbers(b: &mut test::Bencher) {
    let mut input = String::from("[");
    for i in 0..1000 {
        if i > 0 {
            input.push(',');
        }
        write!(input, "{}.{}e{}", i, i * 7919 % 100000, i % 300).unwrap();
    }
    input.push(']');

    let mut parser = Parser::default();

    b.bytes = input.len() as u64;
    b.iter(|| {
        let document = parser.parse(input.as_bytes()).unwrap();
        test::black_box(document.root().size())
    })
}
