//! Source-position handler: maps emitted code offsets back to
//! `(file, line, column, macro-substitution)` tuples for diagnostics.
//!
//! Modelled on [`cranelift_codegen::cursor`]'s forward-cursor idiom: the
//! stream is append-only during assembly and read back through a cursor
//! during diagnostics/listing, never randomly indexed.

use core::fmt;

/// An interned source file name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FileId(u32);

/// An interned macro-substitution chain description (e.g. the name of the
/// macro currently being expanded, for "in expansion of macro `FOO`"
/// diagnostics). Opaque to this module; owned by the caller's macro
/// expander, which lives outside this crate's scope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MacroId(u32);

/// A fully resolved source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePos {
    /// Source file, or `None` for a position with no known file (e.g. a
    /// position synthesized by the assembler itself).
    pub file: Option<String>,
    /// 1-based line number. Required to round-trip up to 2^48.
    pub line: u64,
    /// 1-based column number. Required to round-trip up to 2^32.
    pub column: u32,
    /// Name of the macro whose expansion produced this position, if any.
    pub macro_name: Option<String>,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None => write!(f, "<unknown>:{}:{}", self.line, self.column),
        }
    }
}

impl Default for SourcePos {
    fn default() -> Self {
        SourcePos {
            file: None,
            line: 0,
            column: 0,
            macro_name: None,
        }
    }
}

/// An append-only, delta-compressed stream of `(offset, SourcePos)` pairs.
///
/// Records are encoded as a leading flags byte (did the file change? did
/// the macro change, relative to the previous entry?) followed by a
/// varint offset delta and zigzag-varint line/column deltas. Unchanged
/// file/macro references are not re-emitted, and the interning tables
/// (`files`/`macros`) make repeated references cheap regardless.
pub struct SourcePosHandler {
    files: Vec<String>,
    macros: Vec<String>,
    bytes: Vec<u8>,
    len: usize,
    last_offset: u32,
    last_file: Option<FileId>,
    last_macro: Option<MacroId>,
    last_line: u64,
    last_column: u32,
}

impl SourcePosHandler {
    /// Create an empty handler.
    pub fn new() -> Self {
        SourcePosHandler {
            files: Vec::new(),
            macros: Vec::new(),
            bytes: Vec::new(),
            len: 0,
            last_offset: 0,
            last_file: None,
            last_macro: None,
            last_line: 0,
            last_column: 0,
        }
    }

    /// Number of pushed entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the stream empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn intern_file(&mut self, name: &str) -> FileId {
        if let Some(pos) = self.files.iter().position(|f| f == name) {
            return FileId(pos as u32);
        }
        self.files.push(name.to_string());
        FileId((self.files.len() - 1) as u32)
    }

    fn intern_macro(&mut self, name: &str) -> MacroId {
        if let Some(pos) = self.macros.iter().position(|m| m == name) {
            return MacroId(pos as u32);
        }
        self.macros.push(name.to_string());
        MacroId((self.macros.len() - 1) as u32)
    }

    /// Push a new entry. `offset` must be monotonically non-decreasing
    /// relative to the previously pushed offset; repeated `(line, column)`
    /// pairs at the same offset are explicitly supported (multiple
    /// diagnostics can anchor to one line).
    pub fn push(&mut self, offset: u32, pos: &SourcePos) {
        debug_assert!(
            offset >= self.last_offset || self.len == 0,
            "source position offsets must be non-decreasing"
        );

        let file_id = pos.file.as_deref().map(|f| self.intern_file(f));
        let macro_id = pos.macro_name.as_deref().map(|m| self.intern_macro(m));

        let file_changed = file_id != self.last_file;
        let macro_changed = macro_id != self.last_macro;

        let mut flags = 0u8;
        if file_changed {
            flags |= 0b01;
        }
        if macro_changed {
            flags |= 0b10;
        }
        self.bytes.push(flags);

        write_uvarint(&mut self.bytes, (offset - self.last_offset) as u64);

        if file_changed {
            write_uvarint(&mut self.bytes, file_id.map_or(0, |f| u64::from(f.0) + 1));
        }
        if macro_changed {
            write_uvarint(&mut self.bytes, macro_id.map_or(0, |m| u64::from(m.0) + 1));
        }

        write_svarint(&mut self.bytes, pos.line as i64 - self.last_line as i64);
        write_svarint(
            &mut self.bytes,
            i64::from(pos.column) - i64::from(self.last_column),
        );

        self.last_offset = offset;
        self.last_file = file_id;
        self.last_macro = macro_id;
        self.last_line = pos.line;
        self.last_column = pos.column;
        self.len += 1;
    }

    /// Start a forward cursor over this stream.
    pub fn cursor(&self) -> SourcePosCursor<'_> {
        SourcePosCursor {
            handler: self,
            byte_pos: 0,
            cur_offset: 0,
            cur_file: None,
            cur_macro: None,
            cur_line: 0,
            cur_column: 0,
            remaining: self.len,
        }
    }
}

impl Default for SourcePosHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward-only cursor reading a [`SourcePosHandler`] stream back out.
pub struct SourcePosCursor<'a> {
    handler: &'a SourcePosHandler,
    byte_pos: usize,
    cur_offset: u32,
    cur_file: Option<FileId>,
    cur_macro: Option<MacroId>,
    cur_line: u64,
    cur_column: u32,
    remaining: usize,
}

impl<'a> Iterator for SourcePosCursor<'a> {
    type Item = (u32, SourcePos);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let bytes = &self.handler.bytes;
        let flags = bytes[self.byte_pos];
        self.byte_pos += 1;

        let delta = read_uvarint(bytes, &mut self.byte_pos);
        self.cur_offset += delta as u32;

        if flags & 0b01 != 0 {
            let raw = read_uvarint(bytes, &mut self.byte_pos);
            self.cur_file = if raw == 0 {
                None
            } else {
                Some(FileId((raw - 1) as u32))
            };
        }
        if flags & 0b10 != 0 {
            let raw = read_uvarint(bytes, &mut self.byte_pos);
            self.cur_macro = if raw == 0 {
                None
            } else {
                Some(MacroId((raw - 1) as u32))
            };
        }

        let line_delta = read_svarint(bytes, &mut self.byte_pos);
        self.cur_line = (self.cur_line as i64 + line_delta) as u64;
        let col_delta = read_svarint(bytes, &mut self.byte_pos);
        self.cur_column = (self.cur_column as i64 + col_delta) as u32;

        let pos = SourcePos {
            file: self.cur_file.map(|f| self.handler.files[f.0 as usize].clone()),
            line: self.cur_line,
            column: self.cur_column,
            macro_name: self
                .cur_macro
                .map(|m| self.handler.macros[m.0 as usize].clone()),
        };
        Some((self.cur_offset, pos))
    }
}

fn write_uvarint(out: &mut Vec<u8>, mut v: u64) {
    loop {
        let mut byte = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if v == 0 {
            break;
        }
    }
}

fn read_uvarint(bytes: &[u8], pos: &mut usize) -> u64 {
    let mut result: u64 = 0;
    let mut shift = 0;
    loop {
        let byte = bytes[*pos];
        *pos += 1;
        result |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    result
}

fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

fn zigzag_decode(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

fn write_svarint(out: &mut Vec<u8>, v: i64) {
    write_uvarint(out, zigzag_encode(v));
}

fn read_svarint(bytes: &[u8], pos: &mut usize) -> i64 {
    zigzag_decode(read_uvarint(bytes, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(file: &str, line: u64, column: u32) -> SourcePos {
        SourcePos {
            file: Some(file.to_string()),
            line,
            column,
            macro_name: None,
        }
    }

    #[test]
    fn round_trip_basic_sequence() {
        let mut h = SourcePosHandler::new();
        h.push(0, &pos("a.s", 1, 1));
        h.push(4, &pos("a.s", 1, 10));
        h.push(8, &pos("a.s", 2, 1));
        h.push(12, &pos("b.s", 1, 1));

        let got: Vec<_> = h.cursor().collect();
        assert_eq!(
            got,
            vec![
                (0, pos("a.s", 1, 1)),
                (4, pos("a.s", 1, 10)),
                (8, pos("a.s", 2, 1)),
                (12, pos("b.s", 1, 1)),
            ]
        );
    }

    #[test]
    fn repeated_offset_multiple_diagnostics() {
        let mut h = SourcePosHandler::new();
        h.push(0, &pos("a.s", 5, 1));
        h.push(0, &pos("a.s", 5, 2));
        let got: Vec<_> = h.cursor().collect();
        assert_eq!(got[0].0, 0);
        assert_eq!(got[1].0, 0);
        assert_eq!(got[1].1.column, 2);
    }

    #[test]
    fn large_line_and_column_round_trip() {
        let mut h = SourcePosHandler::new();
        let big_line = (1u64 << 47) + 12345;
        let big_col = (1u32 << 31) + 7;
        h.push(0, &pos("huge.s", big_line, big_col));
        let got: Vec<_> = h.cursor().collect();
        assert_eq!(got[0].1.line, big_line);
        assert_eq!(got[0].1.column, big_col);
    }

    #[test]
    fn macro_substitution_tracked() {
        let mut h = SourcePosHandler::new();
        let mut p = pos("a.s", 3, 1);
        p.macro_name = Some("FOO".to_string());
        h.push(0, &p);
        h.push(4, &pos("a.s", 4, 1));
        let got: Vec<_> = h.cursor().collect();
        assert_eq!(got[0].1.macro_name.as_deref(), Some("FOO"));
        assert_eq!(got[1].1.macro_name, None);
    }
}
