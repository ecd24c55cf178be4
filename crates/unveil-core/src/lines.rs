//! Byte-line model of a content stream.
//!
//! Lines are opaque byte runs separated by a single delimiter byte. No
//! decoding happens here, so any byte content survives `split` → `join`.

/// Delimiter used by every operation in this workspace.
pub const DELIMITER: u8 = b'\n';

/// An ordered, 0-indexed sequence of byte-lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSequence {
    lines: Vec<Vec<u8>>,
}

impl LineSequence {
    /// Split on [`DELIMITER`].
    pub fn split(buffer: &[u8]) -> Self {
        Self::split_on(buffer, DELIMITER)
    }

    /// Split on an arbitrary delimiter byte.
    ///
    /// A buffer with `n` delimiters always yields `n + 1` lines, so an empty
    /// buffer is one empty line and a trailing delimiter yields a trailing
    /// empty line.
    pub fn split_on(buffer: &[u8], delimiter: u8) -> Self {
        let lines = buffer
            .split(|b| *b == delimiter)
            .map(|line| line.to_vec())
            .collect();
        Self { lines }
    }

    pub fn from_lines(lines: Vec<Vec<u8>>) -> Self {
        Self { lines }
    }

    pub fn join(&self) -> Vec<u8> {
        join_lines(&self.lines, DELIMITER)
    }

    pub fn join_with(&self, delimiter: u8) -> Vec<u8> {
        join_lines(&self.lines, delimiter)
    }

    /// Join only the first `count` lines. `count` past the end keeps all lines.
    pub fn join_prefix(&self, count: usize) -> Vec<u8> {
        let count = count.min(self.lines.len());
        join_lines(&self.lines[..count], DELIMITER)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.lines.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().map(Vec::as_slice)
    }
}

/// Join byte runs with a delimiter, without a trailing delimiter.
pub fn join_lines<L: AsRef<[u8]>>(lines: &[L], delimiter: u8) -> Vec<u8> {
    let total: usize = lines.iter().map(|l| l.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total + lines.len().saturating_sub(1));
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.extend_from_slice(line.as_ref());
    }
    out
}
