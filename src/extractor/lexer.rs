// src/extractor/lexer.rs
//! Byte-preserving masking of comments and literals, plus brace bookkeeping.
//!
//! Every structural regex runs over the masked text so that braces, keywords and
//! call-like tokens inside strings or comments are never mistaken for code. The
//! masked text has exactly the same byte length as the input, so offsets found in
//! it index the original text unchanged.

/// Original text, its masked twin, and the structural brace positions.
#[derive(Debug, Clone)]
pub struct SourceView<'a> {
    pub text: &'a str,
    pub masked: String,
    pub braces: BraceMap,
}

impl<'a> SourceView<'a> {
    pub fn new(text: &'a str) -> Self {
        let masked = mask_literals(text);
        let braces = BraceMap::build(&masked);
        Self {
            text,
            masked,
            braces,
        }
    }
}

/// Replaces comment bodies and string/char literal contents with spaces.
/// Newlines and the delimiting quotes are kept.
pub fn mask_literals(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out[i] = b' ';
                out[i + 1] = b' ';
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        out[i] = b' ';
                        out[i + 1] = b' ';
                        i += 2;
                        break;
                    }
                    blank(&mut out, bytes, i);
                    i += 1;
                }
            }
            b'"' if bytes[i..].starts_with(b"\"\"\"") => {
                i += 3;
                while i < bytes.len() {
                    if bytes[i..].starts_with(b"\"\"\"") {
                        i += 3;
                        break;
                    }
                    blank(&mut out, bytes, i);
                    i += 1;
                }
            }
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() {
                    let b = bytes[i];
                    if b == b'\\' {
                        blank(&mut out, bytes, i);
                        if i + 1 < bytes.len() {
                            blank(&mut out, bytes, i + 1);
                        }
                        i += 2;
                        continue;
                    }
                    if b == quote || b == b'\n' {
                        i += 1;
                        break;
                    }
                    blank(&mut out, bytes, i);
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    // Only ASCII bytes were rewritten and whole multi-byte sequences were blanked,
    // so the result is still valid UTF-8.
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Offset of the `)` closing the `(` at `open` in masked text, or `None` if unbalanced.
pub fn matching_paren(masked: &str, open: usize) -> Option<usize> {
    let bytes = masked.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'{' | b';' => return None,
            _ => {}
        }
    }
    None
}

fn blank(out: &mut [u8], bytes: &[u8], i: usize) {
    if bytes[i] != b'\n' {
        out[i] = b' ';
    }
}

/// Positions of structural `{` and `}` with the nesting depth in effect after each.
#[derive(Debug, Clone, Default)]
pub struct BraceMap {
    /// `(offset, depth after this brace)`, ascending by offset.
    marks: Vec<(usize, i32)>,
}

impl BraceMap {
    pub fn build(masked: &str) -> Self {
        let mut marks = Vec::new();
        let mut depth = 0;
        for (i, b) in masked.bytes().enumerate() {
            match b {
                b'{' => {
                    depth += 1;
                    marks.push((i, depth));
                }
                b'}' => {
                    depth -= 1;
                    marks.push((i, depth));
                }
                _ => {}
            }
        }
        Self { marks }
    }

    /// Nesting depth at `offset`, counting braces strictly before it.
    pub fn depth_at(&self, offset: usize) -> i32 {
        let idx = self.marks.partition_point(|(pos, _)| *pos < offset);
        if idx == 0 { 0 } else { self.marks[idx - 1].1 }
    }

    /// Offset of the `}` closing the `{` at `open`, or `None` if it never closes.
    pub fn matching_close(&self, open: usize) -> Option<usize> {
        let start = self.marks.partition_point(|(pos, _)| *pos < open);
        let (pos, opened_depth) = *self.marks.get(start)?;
        if pos != open {
            return None;
        }
        self.marks[start + 1..]
            .iter()
            .find(|(_, depth)| *depth == opened_depth - 1)
            .map(|(pos, _)| *pos)
    }
}
