//! Depth-tracking brace scanner
//!
//! Bounds braced declarations in TypeScript-like source text. String
//! literals and comments are tracked so braces inside them do not affect
//! nesting.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Code,
    Str,
    Comment,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    /// Nesting level outside any brace at this byte
    level: usize,
    region: Region,
}

/// Per-byte nesting annotation of a source text
#[derive(Debug)]
pub struct BraceMap<'a> {
    text: &'a str,
    marks: Vec<Mark>,
}

impl<'a> BraceMap<'a> {
    pub fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut marks = Vec::with_capacity(bytes.len());
        let mut level = 0usize;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            match b {
                b'{' => {
                    marks.push(Mark { level, region: Region::Code });
                    level += 1;
                    i += 1;
                }
                b'}' => {
                    level = level.saturating_sub(1);
                    marks.push(Mark { level, region: Region::Code });
                    i += 1;
                }
                b'"' | b'\'' | b'`' => {
                    let end = string_end(bytes, i);
                    for _ in i..end {
                        marks.push(Mark { level, region: Region::Str });
                    }
                    i = end;
                }
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    let end = bytes[i..]
                        .iter()
                        .position(|&c| c == b'\n')
                        .map_or(bytes.len(), |p| i + p);
                    for _ in i..end {
                        marks.push(Mark { level, region: Region::Comment });
                    }
                    i = end;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let end = bytes[i + 2..]
                        .windows(2)
                        .position(|w| w == b"*/")
                        .map_or(bytes.len(), |p| i + 2 + p + 2);
                    for _ in i..end {
                        marks.push(Mark { level, region: Region::Comment });
                    }
                    i = end;
                }
                _ => {
                    marks.push(Mark { level, region: Region::Code });
                    i += 1;
                }
            }
        }

        Self { text, marks }
    }

    /// Whether the byte at `idx` is code rather than a string or comment
    pub fn is_code(&self, idx: usize) -> bool {
        self.marks
            .get(idx)
            .map_or(false, |mark| mark.region == Region::Code)
    }

    /// Index of the brace closing the one opened at `open`
    ///
    /// Returns `None` when `open` is not a code `{` or the brace is never
    /// closed before end of input.
    pub fn matching(&self, open: usize) -> Option<usize> {
        let bytes = self.text.as_bytes();
        if bytes.get(open) != Some(&b'{') || !self.is_code(open) {
            return None;
        }
        let level = self.marks[open].level;

        (open + 1..bytes.len()).find(|&j| {
            bytes[j] == b'}' && self.marks[j].region == Region::Code && self.marks[j].level == level
        })
    }

    /// Contents strictly between the brace at `open` and its match
    pub fn body(&self, open: usize) -> Option<&'a str> {
        let close = self.matching(open)?;
        Some(&self.text[open + 1..close])
    }
}

/// Byte index one past the end of the string literal starting at `start`
fn string_end(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            b'\n' if quote != b'`' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// The depth-zero text of a braced body
///
/// The contents of nested braced regions and comments are blanked with
/// spaces, keeping byte offsets and line breaks, so patterns matched against
/// the result only see the body's own entries. The nested braces themselves
/// stay, so `key: {` remains recognisable.
pub fn top_level(body: &str) -> String {
    let map = BraceMap::new(body);
    let blanked: Vec<u8> = body
        .bytes()
        .zip(&map.marks)
        .map(|(b, mark)| {
            let keep = mark.level == 0 && mark.region != Region::Comment;
            if keep || b == b'\n' {
                b
            } else {
                b' '
            }
        })
        .collect();

    // Blanking only replaces whole regions bounded by ASCII delimiters, so
    // multi-byte sequences are either kept intact or fully replaced.
    String::from_utf8(blanked).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matching_handles_nesting() {
        let text = "a = { b: { c: 1 }, d: 2 } tail";
        let map = BraceMap::new(text);
        let open = text.find('{').unwrap();

        assert_eq!(map.body(open), Some(" b: { c: 1 }, d: 2 "));
    }

    #[test]
    fn test_braces_in_strings_and_comments_are_ignored() {
        let text = "{ a: '}', // }\n /* { */ b: \"{\" }";
        let map = BraceMap::new(text);

        assert_eq!(map.matching(0), Some(text.len() - 1));
    }

    #[test]
    fn test_unclosed_brace_has_no_match() {
        let map = BraceMap::new("{ a: { b }");
        assert_eq!(map.matching(0), None);
    }

    #[test]
    fn test_brace_inside_comment_is_not_an_opening() {
        let text = "// {\n{ }";
        let map = BraceMap::new(text);

        assert!(!map.is_code(3));
        assert_eq!(map.matching(3), None);
        assert_eq!(map.matching(5), Some(7));
    }

    #[test]
    fn test_top_level_blanks_nested_regions() {
        let body = " id: string\n meta: { inner: number }\n // note: string\n name: string ";
        let flat = top_level(body);

        assert_eq!(flat.len(), body.len());
        assert!(flat.contains("id: string"));
        assert!(flat.contains("name: string"));
        assert!(!flat.contains("inner"));
        assert!(!flat.contains("note"));
        assert!(flat.contains("meta: {"));
        assert_eq!(flat.lines().count(), body.lines().count());
    }

    #[test]
    fn test_top_level_keeps_multibyte_text() {
        let body = " título: string { ñ } ";
        let flat = top_level(body);
        assert!(flat.contains("título: string"));
        assert!(!flat.contains('ñ'));
    }
}
