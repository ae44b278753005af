use anyhow::Context;
use std::io::{BufRead, BufReader, Read};

/// Open a file for buffered reading, `stdin` for standard input.
///
/// ```
/// use std::io::BufRead;
/// let reader = phylodist::libs::io::reader("tests/nwk/example.nwk").unwrap();
/// assert_eq!(reader.lines().count(), 1);
///
/// assert!(phylodist::libs::io::reader("tests/nwk/missing.nwk").is_err());
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = std::fs::File::open(input)
            .with_context(|| format!("could not open {}", input))?;
        Box::new(BufReader::new(file))
    };

    Ok(reader)
}

/// Whole content of a file, `stdin` for standard input.
pub fn read_to_string(input: &str) -> anyhow::Result<String> {
    let mut content = String::new();
    reader(input)?
        .read_to_string(&mut content)
        .with_context(|| format!("could not read {}", input))?;
    Ok(content)
}
