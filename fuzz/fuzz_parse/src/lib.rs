pub fn parse(input: &[u8]) {
    // Make sure we don't panic when reading documents
    let mut parser = acorn_json::Parser::new(input.len().max(64), 128);

    match parser.parse(input) {
        Ok(document) => {
            // If both parsers accept the document then they must agree;
            // serde_json can still reject documents we accept (its
            // recursion limit, its integer widths), so only compare on
            // mutual success
            if let Ok(expected) = serde_json::from_slice::<serde_json::Value>(input) {
                assert_eq!(expected, document.to_value());
            }
        }
        Err(e) => {
            // errors must carry an offset within (or one past) the input
            assert!(e.offset() <= input.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{fs, io::Read};

    #[test]
    fn inputs() {
        if let Ok(inputs) = fs::read_dir("../in") {
            for input in inputs {
                let input = input.expect("invalid file").path();

                println!("input: {:?}", input);

                let mut f = fs::File::open(input).expect("failed to open");
                let mut input = Vec::new();
                f.read_to_end(&mut input).expect("failed to read file");

                // Just make sure we never panic
                parse(&input);
            }
        }
    }

    #[test]
    fn crashes() {
        if let Ok(crashes) = fs::read_dir("../../target/fuzz_parse/crashes") {
            for crash in crashes {
                let crash = crash.expect("invalid file").path();

                println!("repro: {:?}", crash);

                let mut f = fs::File::open(crash).expect("failed to open");
                let mut crash = Vec::new();
                f.read_to_end(&mut crash).expect("failed to read file");

                // Just make sure we never panic
                parse(&crash);
            }
        }
    }
}
