//! Comment-aware line reader
//!
//! Wraps any seekable buffered source and yields only meaningful lines:
//! comments are stripped, surrounding whitespace is trimmed and lines left
//! empty are skipped. The reader can be marked and rewound so callers can
//! scan ahead without consuming input.

use crate::types::{DecoderError, RawLine, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Saved reader position, restored with [`LineReader::seek`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    offset: u64,
    line: usize,
}

/// Line reader over a buffered, seekable source
pub struct LineReader<R> {
    inner: R,
    comment_marker: char,
    /// Number of physical lines consumed so far
    line: usize,
    buf: String,
}

impl LineReader<BufReader<File>> {
    /// Open a file for line reading
    pub fn open(path: &Path, comment_marker: char) -> Result<Self> {
        log::info!("Opening signal log: {:?}", path);

        if !path.exists() {
            return Err(DecoderError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("signal log not found: {:?}", path),
            )));
        }

        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), comment_marker))
    }
}

impl<R: BufRead + Seek> LineReader<R> {
    pub fn new(inner: R, comment_marker: char) -> Self {
        Self {
            inner,
            comment_marker,
            line: 0,
            buf: String::new(),
        }
    }

    /// Return the next non-empty line, or `None` at end of input
    pub fn next_line(&mut self) -> Result<Option<RawLine>> {
        loop {
            self.buf.clear();
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = strip_comment(&self.buf, self.comment_marker);
            if !text.is_empty() {
                return Ok(Some(RawLine::new(self.line, text)));
            }
        }
    }

    /// Remember the current position
    pub fn mark(&mut self) -> Result<Mark> {
        Ok(Mark {
            offset: self.inner.stream_position()?,
            line: self.line,
        })
    }

    /// Rewind (or fast-forward) to a previously taken mark
    pub fn seek(&mut self, mark: Mark) -> Result<()> {
        self.inner.seek(SeekFrom::Start(mark.offset))?;
        self.line = mark.line;
        Ok(())
    }

    /// Number of physical lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line
    }
}

/// Drop everything from the first comment marker and trim the rest
pub fn strip_comment(line: &str, marker: char) -> &str {
    match line.find(marker) {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}
