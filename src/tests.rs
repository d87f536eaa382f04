use crate::{Document, Error, Parser};

mod some;

fn with_parser<T>(input: &[u8], f: impl FnOnce(Document) -> T) -> T {
    let mut parser = Parser::new(input.len().max(64), 128);

    f(parser.parse(input).expect("a valid document"))
}

fn parse_value(input: &[u8]) -> serde_json::Value {
    with_parser(input, |document| document.to_value())
}

fn parse_err(input: &[u8]) -> Error {
    let mut parser = Parser::new(input.len().max(64), 128);

    match parser.parse(input) {
        Ok(document) => panic!(
            "expected an error from {:?}, got {:?}",
            String::from_utf8_lossy(input),
            document.to_value()
        ),
        Err(e) => e,
    }
}

mod invalid;
