/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Validating parser for XML based game data files.
//!
//! A consumer declares which keys may appear where, with which
//! properties, and binds a typed callback to each key. The parser
//! walks the document, rejects anything the grammar does not allow,
//! and calls the consumer in document order.

mod grammar;
mod node;
mod parser;
mod source;

pub mod schema;

pub use source::LoadError;
pub use source::Location;
pub use source::Source;

pub use grammar::Grammar;
pub use grammar::GrammarBuilder;
pub use grammar::GrammarError;
pub use grammar::KeyCallback;
pub use grammar::KeyLayout;
pub use grammar::LayoutId;
pub use grammar::PropertyLayout;

pub use node::NodeStack;
pub use node::ParserNode;

pub use parser::DeclareGrammar;
pub use parser::Diagnostic;
pub use parser::HandlerError;
pub use parser::KeyHandler;
pub use parser::ParseError;
pub use parser::ParserOptions;
pub use parser::State;
pub use parser::XmlParser;
pub use parser::parse_integer_list;
pub use parser::parse_integers;
