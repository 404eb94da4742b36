// SPDX-License-Identifier: Apache-2.0

//! Lexical tokenizer shared by the parser, the validator, and the iterator.
//!
//! Tokens are sub-slices of the input. The tokenizer never validates token
//! contents and never allocates; deciding whether `tru` or `01` is acceptable
//! is left to the consumers.

/// Byte classes used by the scanner.
const SPACE: u8 = 1;
const DELIMITER: u8 = 2;

const fn byte_classes() -> [u8; 256] {
    let mut table = [0u8; 256];
    table[b' ' as usize] = SPACE | DELIMITER;
    table[b'\t' as usize] = SPACE | DELIMITER;
    table[b'\n' as usize] = SPACE | DELIMITER;
    table[b'\r' as usize] = SPACE | DELIMITER;
    table[b'[' as usize] = DELIMITER;
    table[b']' as usize] = DELIMITER;
    table[b'{' as usize] = DELIMITER;
    table[b'}' as usize] = DELIMITER;
    table[b':' as usize] = DELIMITER;
    table[b',' as usize] = DELIMITER;
    table[b'"' as usize] = DELIMITER;
    table
}

static BYTE_CLASSES: [u8; 256] = byte_classes();

#[inline]
pub(crate) fn is_space(byte: u8) -> bool {
    BYTE_CLASSES[byte as usize] & SPACE != 0
}

#[inline]
fn is_delimiter(byte: u8) -> bool {
    BYTE_CLASSES[byte as usize] & DELIMITER != 0
}

/// Splits JSON text into tokens.
///
/// Yields one of:
/// * a single structural character: `{` `}` `[` `]` `:` `,`
/// * a quoted string literal including both quotes (or running to the end of
///   input when the closing quote is missing)
/// * a maximal run of anything else, up to whitespace, a structural character,
///   or a quote
///
/// ```
/// let tokens: Vec<&str> = jsonspan::tokenize(r#"{"a": [1, true]}"#).collect();
/// assert_eq!(tokens, ["{", "\"a\"", ":", "[", "1", ",", "true", "]", "}"]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    offset: usize,
    start: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            offset: 0,
            start: 0,
        }
    }

    /// The complete input this tokenizer scans.
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Byte position just past the last token returned.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte position where the last returned token starts.
    pub fn token_start(&self) -> usize {
        self.start
    }

    /// Returns the input between `start` and the current position.
    pub(crate) fn span_from(&self, start: usize) -> &'a str {
        self.input.get(start..self.offset).unwrap_or_default()
    }

    /// Returns true when nothing but whitespace remains.
    pub fn is_exhausted(&self) -> bool {
        self.input
            .as_bytes()
            .get(self.offset..)
            .map_or(true, |rest| rest.iter().all(|&b| is_space(b)))
    }

    /// Finds the end of a string literal whose opening quote is at `open`.
    fn scan_string(bytes: &[u8], open: usize) -> usize {
        let mut end = open + 1;
        loop {
            let Some(found) = bytes.get(end..).and_then(|rest| memchr::memchr(b'"', rest)) else {
                return bytes.len();
            };
            end += found + 1;
            let quote = end - 1;
            let backslashes = bytes[open + 1..quote]
                .iter()
                .rev()
                .take_while(|&&b| b == b'\\')
                .count();
            if backslashes % 2 == 0 {
                return end;
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.input.as_bytes();
        let mut i = self.offset;
        while i < bytes.len() && is_space(bytes[i]) {
            i += 1;
        }
        let first = *bytes.get(i)?;

        let end = match first {
            b'{' | b'}' | b'[' | b']' | b':' | b',' => i + 1,
            b'"' => Self::scan_string(bytes, i),
            _ => {
                let mut j = i + 1;
                while j < bytes.len() && !is_delimiter(bytes[j]) {
                    j += 1;
                }
                j
            }
        };

        self.start = i;
        self.offset = end;
        // Token boundaries always fall on ASCII bytes, so the slice is on char boundaries.
        self.input.get(i..end)
    }
}
