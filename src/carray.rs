//! Transcribes an opaque model blob (a TFLite file, in practice) into C
//! source so firmware can link it in, and parses such source back so a
//! generated file can be checked against the original bytes.
//!
//! The emitted pair follows the usual embedding layout: a `#pragma once`
//! header with `extern` declarations, and a source file holding the array as
//! decimal byte literals plus a `<name>_len` constant.

use crate::error::ArrayError;

/// Byte literals emitted per source line before wrapping.
pub const DEFAULT_BYTES_PER_LINE: usize = 12;

/// Generator for a named C byte array.
#[derive(Debug, Clone)]
pub struct CArray {
    name: String,
    bytes_per_line: usize,
}

impl CArray {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes_per_line: DEFAULT_BYTES_PER_LINE,
        }
    }

    /// Overrides the wrap width. Zero is clamped to one literal per line.
    pub fn with_bytes_per_line(mut self, bytes_per_line: usize) -> Self {
        self.bytes_per_line = bytes_per_line.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contents of the `<name>.h` companion file.
    pub fn header(&self) -> String {
        format!(
            "#pragma once\n\nextern const unsigned char {name}[];\nextern const unsigned int {name}_len;\n",
            name = self.name
        )
    }

    /// Contents of the `<name>.c` file: the array initializer and the
    /// length constant. A zero-length input yields an empty initializer.
    pub fn source(&self, bytes: &[u8]) -> String {
        // Worst case four chars per literal plus the surrounding boilerplate.
        let mut out = String::with_capacity(bytes.len() * 4 + 128);
        out.push_str(&format!("#include \"{}.h\"\n\n", self.name));
        out.push_str(&format!("const unsigned char {}[] = {{", self.name));

        for (i, b) in bytes.iter().enumerate() {
            if i % self.bytes_per_line == 0 {
                out.push_str("\n  ");
            } else {
                out.push(' ');
            }
            out.push_str(&b.to_string());
            if i + 1 != bytes.len() {
                out.push(',');
            }
        }

        if bytes.is_empty() {
            out.push_str("};\n");
        } else {
            out.push_str("\n};\n");
        }
        out.push_str(&format!(
            "const unsigned int {}_len = {};\n",
            self.name,
            bytes.len()
        ));
        out
    }
}

/// Extracts the byte values from the first `{ ... }` initializer in `source`.
///
/// Tolerates arbitrary whitespace and a trailing comma; anything between the
/// braces that is not a decimal u8 literal is rejected.
pub fn parse_bytes(source: &str) -> Result<Vec<u8>, ArrayError> {
    let open = source.find('{').ok_or(ArrayError::MissingArray)?;
    let rest = &source[open + 1..];
    let close = rest.find('}').ok_or(ArrayError::MissingArray)?;
    let body = &rest[..close];

    let mut bytes = Vec::new();
    for token in body.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let value: u8 = token.parse().map_err(|_| ArrayError::InvalidByte {
            token: token.to_string(),
        })?;
        bytes.push(value);
    }
    Ok(bytes)
}

/// Like [`parse_bytes`], but also requires the `<name>_len` constant and
/// cross-checks it against the number of parsed bytes.
pub fn parse_verified(source: &str) -> Result<Vec<u8>, ArrayError> {
    let bytes = parse_bytes(source)?;
    let declared = parse_declared_len(source)?;
    if declared != bytes.len() {
        return Err(ArrayError::LengthMismatch {
            declared,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

fn parse_declared_len(source: &str) -> Result<usize, ArrayError> {
    // `const unsigned int <name>_len = N;`
    let marker = source.find("_len").ok_or(ArrayError::MissingLength)?;
    let after = &source[marker + "_len".len()..];
    let eq = after.find('=').ok_or(ArrayError::MissingLength)?;
    let tail = &after[eq + 1..];
    let end = tail.find(';').unwrap_or(tail.len());
    tail[..end]
        .trim()
        .parse()
        .map_err(|_| ArrayError::MissingLength)
}
