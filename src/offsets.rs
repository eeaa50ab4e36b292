//! Conversion between the byte offsets used throughout the crate and the UTF-16 code unit
//! offsets a browser editor reports (`selectionStart`, `setSelectionRange`).

/// Where one non-ASCII character sits, in both units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WideChar {
    byte_start: usize,
    byte_end: usize,
    utf16_start: usize,
    utf16_end: usize,
}

/// Offset tables for one text.
///
/// Only non-ASCII characters are recorded; between two of them both offsets advance together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Utf16Offsets {
    wide: Vec<WideChar>,
    byte_len: usize,
    utf16_len: usize,
}

impl Utf16Offsets {
    pub fn new(text: &str) -> Self {
        let mut wide = Vec::new();
        let mut utf16 = 0;
        for (byte, c) in text.char_indices() {
            if !c.is_ascii() {
                wide.push(WideChar {
                    byte_start: byte,
                    byte_end: byte + c.len_utf8(),
                    utf16_start: utf16,
                    utf16_end: utf16 + c.len_utf16(),
                });
            }
            utf16 += c.len_utf16();
        }
        Utf16Offsets {
            wide,
            byte_len: text.len(),
            utf16_len: utf16,
        }
    }

    /// The UTF-16 offset of a byte offset. A byte offset inside a character maps to the end
    /// of that character.
    pub fn to_utf16(&self, byte: usize) -> usize {
        if byte >= self.byte_len {
            return self.utf16_len;
        }
        let idx = self.wide.partition_point(|w| w.byte_end <= byte);
        if let Some(w) = self.wide.get(idx).filter(|w| w.byte_start < byte) {
            return w.utf16_end;
        }
        match idx.checked_sub(1).map(|i| self.wide[i]) {
            Some(w) => w.utf16_end + (byte - w.byte_end),
            None => byte,
        }
    }

    /// The byte offset of a UTF-16 offset. An offset inside a surrogate pair maps to the end
    /// of that character.
    pub fn to_byte(&self, utf16: usize) -> usize {
        if utf16 >= self.utf16_len {
            return self.byte_len;
        }
        let idx = self.wide.partition_point(|w| w.utf16_end <= utf16);
        if let Some(w) = self.wide.get(idx).filter(|w| w.utf16_start < utf16) {
            return w.byte_end;
        }
        match idx.checked_sub(1).map(|i| self.wide[i]) {
            Some(w) => w.byte_end + (utf16 - w.utf16_end),
            None => utf16,
        }
    }
}
