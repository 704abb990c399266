//! Line-grouped output framing for the token and lexical-error listings.

use std::io::{self, Write};

/// Groups entries by source line under a `N.\t` prefix.
///
/// Entries attributed to the same line are appended to one output line; a
/// fresh prefix is emitted whenever the line number changes. Line numbers are
/// expected in non-decreasing order, matching the scanner's textual-order
/// output.
pub struct LineFramedWriter<W: Write> {
    inner: W,
    last_line: u32,
}

impl<W: Write> LineFramedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            last_line: 0,
        }
    }

    /// Writes one entry attributed to `line`.
    pub fn entry(&mut self, line: u32, content: &str) -> io::Result<()> {
        if line != self.last_line {
            if self.last_line != 0 {
                self.inner.write_all(b"\n")?;
            }
            write!(self.inner, "{line}.\t")?;
            self.last_line = line;
        }
        self.inner.write_all(content.as_bytes())?;
        self.inner.flush()
    }

    /// True when no entry has been written yet.
    pub fn is_empty(&self) -> bool {
        self.last_line == 0
    }

    /// Terminates the listing with `tail` and hands back the underlying
    /// writer.
    pub fn finish(mut self, tail: &str) -> io::Result<W> {
        self.inner.write_all(tail.as_bytes())?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(entries: &[(u32, &str)], tail: &str) -> String {
        let mut w = LineFramedWriter::new(Vec::new());
        for (line, content) in entries {
            w.entry(*line, content).unwrap();
        }
        String::from_utf8(w.finish(tail).unwrap()).unwrap()
    }

    #[test]
    fn groups_entries_by_line() {
        let out = collect(
            &[(1, "(ID, a) "), (1, "(SYMBOL, ;) "), (3, "(NUM, 42) ")],
            "\n",
        );
        assert_eq!(out, "1.\t(ID, a) (SYMBOL, ;) \n3.\t(NUM, 42) \n");
    }

    #[test]
    fn empty_listing_is_just_the_tail() {
        let out = collect(&[], "There is no lexical error.");
        assert_eq!(out, "There is no lexical error.");
    }

    #[test]
    fn is_empty_tracks_first_entry() {
        let mut w = LineFramedWriter::new(Vec::new());
        assert!(w.is_empty());
        w.entry(2, "x ").unwrap();
        assert!(!w.is_empty());
    }
}
