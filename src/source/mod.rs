/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;
mod location;

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use tracing::debug;

pub use error::LoadError;
pub use location::Location;

/// Seekable byte input of the parser.
///
/// The bytes are either borrowed from the caller, who keeps ownership
/// and must outlive the source, or owned by the source itself and
/// released with it. Reading is one byte at a time with look-ahead,
/// and the position can be rewound to parse the same document again.
#[derive(Clone, Debug)]
pub struct Source<'a> {
    name: Option<String>,
    data: Cow<'a, [u8]>,
    pos: usize,
    location: Location,
}

impl<'a> Source<'a> {
    /// Wraps a caller owned buffer.
    pub fn borrowed(bytes: &'a [u8]) -> Source<'a> {
        Source {
            name: None,
            data: Cow::Borrowed(bytes),
            pos: 0,
            location: Location::new(),
        }
    }

    /// Takes ownership of the buffer.
    pub fn owned(bytes: Vec<u8>) -> Source<'static> {
        Source {
            name: None,
            data: Cow::Owned(bytes),
            pos: 0,
            location: Location::new(),
        }
    }

    /// Reads the whole file into an owned source named after the path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Source<'static>, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::File {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), size = bytes.len(), "loaded file");
        Ok(Source::owned(bytes).with_name(path.display().to_string()))
    }

    /// Drains the reader into an owned source.
    pub fn from_reader(mut reader: impl Read) -> Result<Source<'static>, LoadError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        debug!(size = bytes.len(), "loaded stream");
        Ok(Source::owned(bytes))
    }

    /// Sets the name shown in diagnostics, usually a file path.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the bytes are released together with this source.
    pub fn is_owned(&self) -> bool {
        matches!(self.data, Cow::Owned(_))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Seeks back to the first byte.
    pub fn rewind(&mut self) {
        self.pos = 0;
        self.location = Location::new();
    }

    /// Location of the next byte to be read.
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.pos
            .checked_add(offset)
            .and_then(|at| self.data.get(at))
            .copied()
    }

    /// Consumes and returns the next byte, `None` at the end of input.
    pub fn next_byte(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        self.location.advance(c);
        Some(c)
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.data[self.pos..].starts_with(prefix)
    }

    /// Consumes up to `count` bytes.
    pub fn skip(&mut self, count: usize) {
        for _ in 0..count {
            if self.next_byte().is_none() {
                break;
            }
        }
    }

    /// The whole line containing the given location, without the newline.
    pub fn line_at(&self, location: Location) -> &[u8] {
        let at = location.bytes.min(self.data.len());
        let start = self.data[..at]
            .iter()
            .rposition(|&c| c == b'\n')
            .map_or(0, |pos| pos + 1);
        let end = self.data[at..]
            .iter()
            .position(|&c| c == b'\n')
            .map_or(self.data.len(), |pos| at + pos);
        let line = &self.data[start..end];
        line.strip_suffix(b"\r").unwrap_or(line)
    }
}

#[cfg(test)]
mod tests;
