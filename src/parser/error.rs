/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;

use thiserror::Error;

use crate::Location;

/// Details of a parse failure.
///
/// Besides the message, the diagnostic remembers where the parser
/// stopped and the text of that line, so it can be shown with a caret
/// under the offending column.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub location: Location,
    pub line: String,
    pub source_name: Option<String>,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = &self.source_name {
            write!(f, "{}, ", name)?;
        }
        write!(f, "{}: {}", self.location, self.message)?;
        if !self.line.is_empty() {
            let caret: String = self
                .line
                .bytes()
                .take(self.location.column)
                .map(|c| if c == b'\t' { '\t' } else { ' ' })
                .collect();
            write!(f, "\n    {}\n    {}^", self.line, caret)?;
        }
        Ok(())
    }
}

/// Error returned from [XmlParser::parse()](crate::XmlParser::parse).
///
/// The categories correspond to who is to blame: the document syntax,
/// the document content with respect to the grammar, or the handler
/// callbacks rejecting the content.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseError {
    /// Parse was called before loading a document.
    #[error("no document loaded")]
    NotLoaded,

    /// Malformed markup, or a document ending in the middle of a key.
    #[error("syntax error at {0}")]
    Syntax(Diagnostic),

    /// Well formed markup which the grammar does not allow.
    #[error("grammar violation at {0}")]
    Grammar(Diagnostic),

    /// A key callback, the closed key hook, or the text hook failed.
    #[error("rejected at {0}")]
    Handler(Diagnostic),
}

impl ParseError {
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ParseError::NotLoaded => None,
            ParseError::Syntax(diagnostic)
            | ParseError::Grammar(diagnostic)
            | ParseError::Handler(diagnostic) => Some(diagnostic),
        }
    }

    pub fn message(&self) -> &str {
        match self.diagnostic() {
            Some(diagnostic) => &diagnostic.message,
            None => description::NOT_LOADED,
        }
    }

    pub fn location(&self) -> Option<Location> {
        self.diagnostic().map(|diagnostic| diagnostic.location)
    }
}

/// Failure signalled by a handler callback.
///
/// The message ends up in the [ParseError::Handler] diagnostic. An
/// error without a message is reported with a generic text naming the
/// key.
#[derive(Clone, Debug, Default, Eq, PartialEq, Error)]
#[error("{}", .message.as_deref().unwrap_or(description::HANDLER_ABORT))]
pub struct HandlerError {
    message: Option<String>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError {
            message: Some(message.into()),
        }
    }

    /// Stops the parse without a specific message.
    pub fn abort() -> Self {
        HandlerError { message: None }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        HandlerError::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        HandlerError::new(message)
    }
}

pub(super) mod description {
    pub(crate) const NOT_LOADED: &str = "no document loaded";
    pub(crate) const HANDLER_ABORT: &str = "handler aborted";
    pub(in super::super) const UNEXPECTED_EOF: &str = "unexpected end of document";
    pub(in super::super) const NO_KEYS: &str = "document has no keys";
    pub(in super::super) const TEXT_OUTSIDE_KEY: &str = "text is not allowed outside of keys";
    pub(in super::super) const CLOSING_SYNTAX: &str = "closing key must end with '>'";
    pub(in super::super) const EMPTY_KEY_MISSING_END: &str = "expected '>' after '/'";
    pub(in super::super) const UNTERMINATED_COMMENT: &str = "comment is never closed";
    pub(in super::super) const MALFORMED_COMMENT: &str = "malformed comment start";
    pub(in super::super) const COMMENTS_NOT_ALLOWED: &str = "comments are not allowed";
    pub(in super::super) const HEADER_NOT_ALLOWED: &str = "XML header is not allowed";
    pub(in super::super) const HEADER_MISPLACED: &str =
        "XML header must come first and only once";
    pub(in super::super) const HEADER_BAD_END: &str = "XML header must end with '?>'";
    pub(in super::super) const HEADER_NO_VERSION: &str = "XML header has no version";
    pub(in super::super) const INVALID_UTF8: &str = "invalid UTF-8 sequence";
}
