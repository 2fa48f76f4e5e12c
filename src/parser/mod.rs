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
mod values;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::Grammar;
use crate::GrammarBuilder;
use crate::GrammarError;
use crate::LoadError;
use crate::Location;
use crate::NodeStack;
use crate::ParserNode;
use crate::Source;

pub use error::Diagnostic;
pub use error::HandlerError;
pub use error::ParseError;
use error::description;
pub use values::parse_integer_list;
pub use values::parse_integers;

/// Consumer side of the parser.
///
/// Every method has a default, so a handler only implements the hooks
/// it cares about. Keys declared with a typed callback call that
/// callback instead of [key_callback()](Self::key_callback).
pub trait KeyHandler {
    /// Called for a validated key which has no bound callback.
    fn key_callback(
        &mut self,
        _node: &mut ParserNode,
        _stack: NodeStack<'_>,
    ) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Called when any key is closed, unless it is ignored.
    ///
    /// This is the place to check that a key got all the children it
    /// needs.
    fn closed_key(&mut self, _node: &ParserNode, _stack: NodeStack<'_>) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Whether text between keys is accepted and passed to [text()](Self::text).
    fn allow_text(&self) -> bool {
        false
    }

    /// Receives the text inside `node`, leading and trailing whitespace removed.
    fn text(&mut self, _node: &ParserNode, _text: &str) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Resets the consumer state, called at the start of every parse.
    fn cleanup(&mut self) {}

    /// Which bytes can appear in key and property names.
    fn is_valid_name_char(&self, c: u8) -> bool {
        c.is_ascii_alphanumeric() || c == b'_'
    }

    /// Comment start and end markers, `None` forbids comments.
    ///
    /// Comments may appear between keys and between the tokens of a tag.
    fn comment_delimiters(&self) -> Option<(&'static str, &'static str)> {
        Some(("<!--", "-->"))
    }
}

/// A handler which declares its own grammar.
///
/// Implementors are parsed with [XmlParser::new()], which builds the
/// grammar by calling [declare()](Self::declare) once.
pub trait DeclareGrammar: KeyHandler + Sized {
    fn declare(grammar: &mut GrammarBuilder<Self>);
}

/// Tunables of the parser.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParserOptions {
    /// Accept a leading `<?xml version="1.0"?>` header.
    pub allow_header: bool,
    /// Reject keys nested deeper than this.
    pub max_depth: Option<usize>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            allow_header: true,
            max_depth: None,
        }
    }
}

/// Parser state between two tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    NeedKey,
    NeedKeyName,
    NeedPropertyName,
    NeedPropertyOperator,
    NeedPropertyValue,
    Error,
}

enum ErrorClass {
    Syntax,
    Grammar,
    Handler,
}

macro_rules! parser_error {
    ($parser:ident, $source:ident, $class:ident, $($arg:tt)*) => {
        return Err($parser.fail($source, ErrorClass::$class, format!($($arg)*)))
    };
}

fn printable(c: u8) -> String {
    (c as char).escape_default().to_string()
}

/// Validating parser of XML key documents.
///
/// The parser reads a document, checks every key against the
/// [Grammar] and calls the handler for each key in document order:
/// the key callback once the opening tag and its properties are
/// validated, and [KeyHandler::closed_key()] when it is closed. The
/// first problem stops the parse.
///
/// ```
/// use keyxml::{DeclareGrammar, GrammarBuilder, HandlerError, KeyHandler};
/// use keyxml::{NodeStack, ParserNode, XmlParser};
///
/// #[derive(Default)]
/// struct Fonts {
///     files: Vec<String>,
/// }
///
/// impl Fonts {
///     fn on_font(&mut self, node: &mut ParserNode, _: NodeStack<'_>) -> Result<(), HandlerError> {
///         self.files.push(node.get("file").unwrap_or_default().to_string());
///         Ok(())
///     }
/// }
///
/// impl KeyHandler for Fonts {}
///
/// impl DeclareGrammar for Fonts {
///     fn declare(grammar: &mut GrammarBuilder<Self>) {
///         grammar.bare_key("fonts").key("font", Self::on_font).prop("file", true).end().end();
///     }
/// }
///
/// let mut parser = XmlParser::new(Fonts::default()).unwrap();
/// parser.load_buffer(b"<fonts><font file='helvr12.bdf'/></fonts>");
/// parser.parse().unwrap();
/// assert_eq!(parser.handler().files, ["helvr12.bdf"]);
/// ```
pub struct XmlParser<'a, H> {
    grammar: Arc<Grammar<H>>,
    handler: H,
    options: ParserOptions,
    source: Option<Source<'a>>,
    stack: Vec<ParserNode>,
    state: State,
    seen_key: bool,
    seen_header: bool,
}

impl<'a, H: DeclareGrammar> XmlParser<'a, H> {
    /// Creates a parser with the grammar declared by the handler type.
    pub fn new(handler: H) -> Result<Self, GrammarError> {
        let mut builder = GrammarBuilder::new();
        H::declare(&mut builder);
        let grammar = builder.build()?;
        Ok(Self::with_grammar(Arc::new(grammar), handler))
    }
}

impl<'a, H: KeyHandler> XmlParser<'a, H> {
    /// Creates a parser sharing an already built grammar.
    pub fn with_grammar(grammar: Arc<Grammar<H>>, handler: H) -> Self {
        XmlParser {
            grammar,
            handler,
            options: ParserOptions::default(),
            source: None,
            stack: Vec::new(),
            state: State::NeedKey,
            seen_key: false,
            seen_header: false,
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn grammar(&self) -> &Arc<Grammar<H>> {
        &self.grammar
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Replaces the document to parse.
    pub fn load_source(&mut self, source: Source<'a>) {
        self.stack.clear();
        self.state = State::NeedKey;
        self.source = Some(source);
    }

    /// Parses a buffer which stays owned by the caller.
    pub fn load_buffer(&mut self, bytes: &'a [u8]) {
        self.load_source(Source::borrowed(bytes));
    }

    /// Parses a buffer which the parser takes over.
    pub fn load_owned(&mut self, bytes: Vec<u8>) {
        self.load_source(Source::owned(bytes));
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let source = Source::from_file(path)?;
        self.load_source(source);
        Ok(())
    }

    pub fn load_reader(&mut self, reader: impl Read) -> Result<(), LoadError> {
        let source = Source::from_reader(reader)?;
        self.load_source(source);
        Ok(())
    }

    /// Releases the document.
    pub fn close(&mut self) {
        if let Some(source) = self.source.take() {
            debug!(source = source.name().unwrap_or("buffer"), "closed");
        }
        self.stack.clear();
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// Where the parser stopped.
    pub fn location(&self) -> Option<Location> {
        self.source.as_ref().map(Source::location)
    }

    /// The innermost open key.
    ///
    /// After a failed parse this is the key the failure happened in.
    pub fn active_node(&self) -> Option<&ParserNode> {
        self.stack.last()
    }

    /// The key enclosing `node`, `None` for a top level key.
    pub fn parent_node(&self, node: &ParserNode) -> Option<&ParserNode> {
        self.node_stack().parent(node)
    }

    pub fn node_stack(&self) -> NodeStack<'_> {
        NodeStack::new(&self.stack)
    }

    /// Parses the loaded document from its beginning.
    ///
    /// The handler is reset with [KeyHandler::cleanup()] first, so the
    /// same parser can be used for several documents or several passes.
    pub fn parse(&mut self) -> Result<(), ParseError> {
        let Some(mut source) = self.source.take() else {
            return Err(ParseError::NotLoaded);
        };
        source.rewind();
        self.stack.clear();
        self.state = State::NeedKey;
        self.seen_key = false;
        self.seen_header = false;
        self.handler.cleanup();

        let result = self.run(&mut source);
        match &result {
            Ok(()) => debug!(
                source = source.name().unwrap_or("buffer"),
                bytes = source.len(),
                "parsed"
            ),
            Err(err) => warn!("{}", err),
        }
        self.source = Some(source);
        result
    }

    fn fail(&mut self, source: &Source<'_>, class: ErrorClass, message: String) -> ParseError {
        self.state = State::Error;
        let location = source.location();
        let diagnostic = Diagnostic {
            message,
            location,
            line: String::from_utf8_lossy(source.line_at(location)).into_owned(),
            source_name: source.name().map(str::to_string),
        };
        match class {
            ErrorClass::Syntax => ParseError::Syntax(diagnostic),
            ErrorClass::Grammar => ParseError::Grammar(diagnostic),
            ErrorClass::Handler => ParseError::Handler(diagnostic),
        }
    }

    fn run(&mut self, source: &mut Source<'a>) -> Result<(), ParseError> {
        let mut closing = false;
        let mut header = false;
        let mut property = String::new();

        loop {
            skip_spaces(source);
            if self.skip_comment(source)? {
                continue;
            }
            let Some(c) = source.peek() else {
                break;
            };

            match self.state {
                State::NeedKey => {
                    if c != b'<' {
                        self.read_text(source, c)?;
                        continue;
                    }
                    source.next_byte();
                    match source.peek() {
                        Some(b'/') => {
                            source.next_byte();
                            closing = true;
                        }
                        Some(b'?') => {
                            if !self.options.allow_header {
                                parser_error!(self, source, Syntax, "{}", description::HEADER_NOT_ALLOWED);
                            }
                            if self.seen_key || self.seen_header {
                                parser_error!(self, source, Syntax, "{}", description::HEADER_MISPLACED);
                            }
                            source.next_byte();
                            header = true;
                        }
                        None => {
                            parser_error!(self, source, Syntax, "{}", description::UNEXPECTED_EOF);
                        }
                        _ => (),
                    }
                    self.state = State::NeedKeyName;
                }

                State::NeedKeyName => {
                    let name = self.read_token(source, "key name")?;
                    if closing {
                        let open = self.stack.last().map(|node| node.name().to_string());
                        match open {
                            None => {
                                parser_error!(
                                    self,
                                    source,
                                    Syntax,
                                    "closing key '{}' without an open key",
                                    name
                                );
                            }
                            Some(open) if !open.eq_ignore_ascii_case(&name) => {
                                parser_error!(
                                    self,
                                    source,
                                    Syntax,
                                    "expected closing key '{}', found '{}'",
                                    open,
                                    name
                                );
                            }
                            Some(_) => (),
                        }
                    } else if header {
                        if !name.eq_ignore_ascii_case("xml") {
                            parser_error!(self, source, Syntax, "unknown processing instruction '{}'", name);
                        }
                        self.seen_header = true;
                        self.stack.push(ParserNode::new_header(name));
                    } else {
                        self.open_node(source, name)?;
                    }
                    self.state = State::NeedPropertyName;
                }

                State::NeedPropertyName => {
                    if closing {
                        if c != b'>' {
                            parser_error!(self, source, Syntax, "{}", description::CLOSING_SYNTAX);
                        }
                        source.next_byte();
                        closing = false;
                        self.close_node(source)?;
                        self.state = State::NeedKey;
                        continue;
                    }
                    if header {
                        if c == b'?' {
                            source.next_byte();
                            if source.peek() != Some(b'>') {
                                parser_error!(self, source, Syntax, "{}", description::HEADER_BAD_END);
                            }
                            source.next_byte();
                            header = false;
                            self.finish_header(source)?;
                            self.state = State::NeedKey;
                            continue;
                        }
                        if c == b'/' || c == b'>' {
                            parser_error!(self, source, Syntax, "{}", description::HEADER_BAD_END);
                        }
                    } else if c == b'/' || c == b'>' {
                        source.next_byte();
                        let empty = c == b'/';
                        if empty {
                            if source.peek() != Some(b'>') {
                                parser_error!(
                                    self,
                                    source,
                                    Syntax,
                                    "{}",
                                    description::EMPTY_KEY_MISSING_END
                                );
                            }
                            source.next_byte();
                        }
                        self.activate_node(source, empty)?;
                        self.state = State::NeedKey;
                        continue;
                    }
                    property = self.read_token(source, "property name")?;
                    self.state = State::NeedPropertyOperator;
                }

                State::NeedPropertyOperator => {
                    if c != b'=' {
                        parser_error!(
                            self,
                            source,
                            Syntax,
                            "expected '=' after property '{}', found '{}'",
                            property,
                            printable(c)
                        );
                    }
                    source.next_byte();
                    self.state = State::NeedPropertyValue;
                }

                State::NeedPropertyValue => {
                    let value = self.read_value(source, &property)?;
                    let name = std::mem::take(&mut property);
                    let inserted = self
                        .stack
                        .last_mut()
                        .is_some_and(|node| node.insert(name.clone(), value));
                    if !inserted {
                        parser_error!(self, source, Syntax, "duplicate property '{}'", name);
                    }
                    self.state = State::NeedPropertyName;
                }

                State::Error => break,
            }
        }

        if self.state != State::NeedKey {
            let open = self.stack.last().map(|node| node.name().to_string());
            match open {
                Some(name) => {
                    parser_error!(self, source, Syntax, "unexpected end of document inside key '{}'", name);
                }
                None => {
                    parser_error!(self, source, Syntax, "{}", description::UNEXPECTED_EOF);
                }
            }
        }
        if let Some(node) = self.stack.last() {
            let name = node.name().to_string();
            parser_error!(self, source, Syntax, "key '{}' is never closed", name);
        }
        if !self.seen_key {
            parser_error!(self, source, Syntax, "{}", description::NO_KEYS);
        }
        Ok(())
    }

    fn skip_comment(&mut self, source: &mut Source<'a>) -> Result<bool, ParseError> {
        let Some((open, close)) = self.handler.comment_delimiters() else {
            if source.starts_with(b"<!--") {
                parser_error!(self, source, Syntax, "{}", description::COMMENTS_NOT_ALLOWED);
            }
            return Ok(false);
        };
        if open.is_empty() || !source.starts_with(open.as_bytes()) {
            if open.starts_with("<!") && source.starts_with(b"<!") {
                parser_error!(self, source, Syntax, "{}", description::MALFORMED_COMMENT);
            }
            return Ok(false);
        }
        source.skip(open.len());
        loop {
            if source.starts_with(close.as_bytes()) {
                source.skip(close.len());
                return Ok(true);
            }
            if source.next_byte().is_none() {
                parser_error!(self, source, Syntax, "{}", description::UNTERMINATED_COMMENT);
            }
        }
    }

    fn read_token(&mut self, source: &mut Source<'a>, what: &str) -> Result<String, ParseError> {
        let mut bytes = Vec::new();
        while let Some(c) = source.peek() {
            if !self.handler.is_valid_name_char(c) {
                break;
            }
            bytes.push(c);
            source.next_byte();
        }
        match source.peek() {
            None => {
                parser_error!(self, source, Syntax, "{}", description::UNEXPECTED_EOF);
            }
            Some(c) if bytes.is_empty() => {
                parser_error!(self, source, Syntax, "invalid character '{}' in {}", printable(c), what);
            }
            Some(c) if c.is_ascii_whitespace() || matches!(c, b'>' | b'=' | b'/' | b'?') => (),
            Some(c) => {
                parser_error!(self, source, Syntax, "invalid character '{}' in {}", printable(c), what);
            }
        }
        match String::from_utf8(bytes) {
            Ok(token) => Ok(token),
            Err(_) => Err(self.fail(source, ErrorClass::Syntax, description::INVALID_UTF8.to_string())),
        }
    }

    fn read_value(&mut self, source: &mut Source<'a>, property: &str) -> Result<String, ParseError> {
        let quote = match source.peek() {
            Some(c @ (b'"' | b'\'')) => c,
            _ => {
                parser_error!(self, source, Syntax, "value of property '{}' must be quoted", property);
            }
        };
        source.next_byte();
        let mut bytes = Vec::new();
        loop {
            match source.next_byte() {
                None => {
                    parser_error!(self, source, Syntax, "value of property '{}' is never closed", property);
                }
                Some(c) if c == quote => break,
                Some(c) => bytes.push(c),
            }
        }
        match String::from_utf8(bytes) {
            Ok(value) => Ok(value),
            Err(_) => Err(self.fail(source, ErrorClass::Syntax, description::INVALID_UTF8.to_string())),
        }
    }

    fn read_text(&mut self, source: &mut Source<'a>, c: u8) -> Result<(), ParseError> {
        if !self.handler.allow_text() {
            parser_error!(self, source, Syntax, "expected '<' to start a key, found '{}'", printable(c));
        }
        if self.stack.is_empty() {
            parser_error!(self, source, Syntax, "{}", description::TEXT_OUTSIDE_KEY);
        }
        let mut bytes = Vec::new();
        while let Some(c) = source.peek() {
            if c == b'<' {
                break;
            }
            bytes.push(c);
            source.next_byte();
        }
        let Ok(text) = String::from_utf8(bytes) else {
            parser_error!(self, source, Syntax, "{}", description::INVALID_UTF8);
        };
        let Some(node) = self.stack.last() else {
            return Ok(());
        };
        if node.is_ignored() {
            return Ok(());
        }
        if let Err(err) = self.handler.text(node, text.trim_end()) {
            let message = match err.message() {
                Some(message) => message.to_string(),
                None => format!("text rejected inside key '{}'", node.name()),
            };
            parser_error!(self, source, Handler, "{}", message);
        }
        Ok(())
    }

    fn open_node(&mut self, source: &Source<'a>, name: String) -> Result<(), ParseError> {
        let depth = self.stack.len();
        if let Some(max_depth) = self.options.max_depth
            && depth >= max_depth
        {
            parser_error!(
                self,
                source,
                Grammar,
                "key '{}' is nested deeper than {} levels",
                name,
                max_depth
            );
        }
        let parent = self
            .stack
            .last()
            .and_then(ParserNode::layout)
            .unwrap_or(Grammar::<H>::ROOT);
        let Some(layout) = self.grammar.child(parent, &name) else {
            let parent = self.stack.last().map(|node| node.name().to_string());
            match parent {
                Some(parent) => {
                    parser_error!(self, source, Grammar, "unexpected key '{}' inside key '{}'", name, parent);
                }
                None => {
                    parser_error!(self, source, Grammar, "unexpected top level key '{}'", name);
                }
            }
        };
        self.seen_key = true;
        self.stack.push(ParserNode::new(name, depth, Some(layout)));
        Ok(())
    }

    fn check_properties(&self) -> Result<(), String> {
        let Some(node) = self.stack.last() else {
            return Ok(());
        };
        let Some(id) = node.layout() else {
            return Ok(());
        };
        let layout = self.grammar.layout(id);
        for prop in layout.properties() {
            if prop.is_required() && !node.contains(prop.name()) {
                return Err(format!(
                    "missing required property '{}' in key '{}'",
                    prop.name(),
                    node.name()
                ));
            }
        }
        if !layout.accepts_any_property()
            && let Some((name, _)) = node.values().find(|(name, _)| layout.property(name).is_none())
        {
            return Err(format!(
                "unexpected property '{}' in key '{}'",
                name,
                node.name()
            ));
        }
        Ok(())
    }

    fn activate_node(&mut self, source: &Source<'a>, empty: bool) -> Result<(), ParseError> {
        if let Err(message) = self.check_properties() {
            parser_error!(self, source, Grammar, "{}", message);
        }

        let parent_ignored = self
            .stack
            .len()
            .checked_sub(2)
            .is_some_and(|depth| self.stack[depth].is_ignored());
        let Some((node, ancestors)) = self.stack.split_last_mut() else {
            return Ok(());
        };
        if parent_ignored {
            node.set_ignore(true);
        }
        trace!(key = node.name(), depth = node.depth(), ignored = node.is_ignored(), "key opened");

        if !node.is_ignored() {
            let callback = node
                .layout()
                .and_then(|id| self.grammar.layout(id).callback());
            let stack = NodeStack::new(ancestors);
            let result = match callback {
                Some(callback) => callback(&mut self.handler, node, stack),
                None => self.handler.key_callback(node, stack),
            };
            if let Err(err) = result {
                let message = match err.message() {
                    Some(message) => message.to_string(),
                    None => format!("callback failed for key '{}'", node.name()),
                };
                parser_error!(self, source, Handler, "{}", message);
            }
        }

        if empty {
            self.close_node(source)?;
        }
        Ok(())
    }

    fn close_node(&mut self, source: &Source<'a>) -> Result<(), ParseError> {
        let Some((node, ancestors)) = self.stack.split_last() else {
            return Ok(());
        };
        if !node.is_ignored()
            && let Err(err) = self.handler.closed_key(node, NodeStack::new(ancestors))
        {
            let message = match err.message() {
                Some(message) => message.to_string(),
                None => format!("missing data when closing key '{}'", node.name()),
            };
            parser_error!(self, source, Handler, "{}", message);
        }
        trace!(key = node.name(), depth = node.depth(), "key closed");
        self.stack.pop();
        Ok(())
    }

    fn finish_header(&mut self, source: &Source<'a>) -> Result<(), ParseError> {
        let Some(node) = self.stack.pop() else {
            return Ok(());
        };
        debug_assert!(node.is_header());
        match node.get("version") {
            Some("1.0") => Ok(()),
            Some(version) => {
                parser_error!(self, source, Syntax, "unsupported XML version '{}'", version);
            }
            None => {
                parser_error!(self, source, Syntax, "{}", description::HEADER_NO_VERSION);
            }
        }
    }
}

fn skip_spaces(source: &mut Source<'_>) {
    while source.peek().is_some_and(|c| c.is_ascii_whitespace()) {
        source.next_byte();
    }
}
