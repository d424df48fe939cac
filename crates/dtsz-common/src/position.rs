//! Offset to line/column conversion for diagnostics.
//!
//! AST nodes carry byte offsets. The reporter prints `file:line:column`, so
//! diagnostics are mapped through a `LineMap` built once per source file.

use serde::Serialize;

/// A 0-indexed line and column. Columns count UTF-16 code units, the way
/// `tsc` reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// Starting offset of every line in a source file.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<u32>,
}

impl LineMap {
    pub fn build(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0u32];
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'\n' => line_starts.push((i + 1) as u32),
                // A lone `\r` ends a line; `\r\n` is handled by the `\n`
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push((i + 1) as u32),
                _ => {}
            }
        }
        LineMap { line_starts }
    }

    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let character = source
            .get(line_start.min(end)..end)
            .unwrap_or("")
            .chars()
            .map(|ch| ch.len_utf16() as u32)
            .sum();
        Position::new(line as u32, character)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a 0-indexed line without its terminator.
    pub fn line_text<'a>(&self, line: usize, source: &'a str) -> Option<&'a str> {
        let start = *self.line_starts.get(line)? as usize;
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(source.len(), |&next| next as usize);
        source
            .get(start..end)
            .map(|text| text.trim_end_matches(['\n', '\r']))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_map_simple() {
        let source = "line1\nline2\nline3";
        let map = LineMap::build(source);

        assert_eq!(map.line_count(), 3);
        assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
        assert_eq!(map.offset_to_position(4, source), Position::new(0, 4));
        assert_eq!(map.offset_to_position(6, source), Position::new(1, 0));
        assert_eq!(map.offset_to_position(12, source), Position::new(2, 0));
    }

    #[test]
    fn test_line_map_mixed_line_endings() {
        let source = "a\r\nb\rc";
        let map = LineMap::build(source);

        assert_eq!(map.line_count(), 3);
        assert_eq!(map.offset_to_position(3, source), Position::new(1, 0));
        assert_eq!(map.offset_to_position(5, source), Position::new(2, 0));
        assert_eq!(map.line_text(0, source), Some("a"));
        assert_eq!(map.line_text(1, source), Some("b"));
        assert_eq!(map.line_text(2, source), Some("c"));
        assert_eq!(map.line_text(3, source), None);
    }

    #[test]
    fn test_utf16_columns() {
        let source = "let \u{1F680} = B";
        let map = LineMap::build(source);
        // The rocket is 4 bytes and 2 UTF-16 units
        assert_eq!(map.offset_to_position(8, source).character, 6);
    }
}
