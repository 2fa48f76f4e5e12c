/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Grammars described by documents.
//!
//! Besides declaring a grammar in code with [GrammarBuilder], a grammar
//! can be written down as a document and loaded at run time:
//!
//! ```text
//! <grammar>
//!   <global_property name="id"/>
//!   <key name="group">
//!     <property name="title" required="true"/>
//!     <recursive name="group"/>
//!     <key name="item">
//!       <any_properties/>
//!     </key>
//!   </key>
//! </grammar>
//! ```
//!
//! The description is itself parsed with [XmlParser]. Loaded keys have
//! no bound callbacks, so documents are dispatched to
//! [KeyHandler::key_callback()].

mod error;

use std::path::Path;

use tracing::debug;

use crate::DeclareGrammar;
use crate::Grammar;
use crate::GrammarBuilder;
use crate::HandlerError;
use crate::KeyHandler;
use crate::NodeStack;
use crate::ParserNode;
use crate::Source;
use crate::XmlParser;

pub use error::SchemaError;

/// Handler of grammar description documents.
///
/// Each description key is turned into the matching [GrammarBuilder]
/// call as soon as it is validated, and a closed `key` ends the scope
/// it opened.
pub struct SchemaLoader<H> {
    builder: GrammarBuilder<H>,
}

fn is_required(node: &ParserNode) -> Result<bool, HandlerError> {
    match node.get("required") {
        None => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(value) => Err(HandlerError::new(format!(
            "property 'required' must be 'true' or 'false', not '{}'",
            value
        ))),
    }
}

impl<H> SchemaLoader<H> {
    pub fn new() -> Self {
        SchemaLoader {
            builder: GrammarBuilder::new(),
        }
    }

    /// Finishes the grammar declared by the parsed description.
    pub fn build(self) -> Result<Grammar<H>, SchemaError> {
        let grammar = self.builder.build()?;
        if grammar.is_empty() {
            return Err(SchemaError::NoKeys);
        }
        Ok(grammar)
    }

    fn on_global_property(&mut self, node: &mut ParserNode, _: NodeStack<'_>) -> Result<(), HandlerError> {
        let required = is_required(node)?;
        self.builder
            .global_prop(node.get("name").unwrap_or_default(), required);
        Ok(())
    }

    fn on_key(&mut self, node: &mut ParserNode, _: NodeStack<'_>) -> Result<(), HandlerError> {
        self.builder.bare_key(node.get("name").unwrap_or_default());
        Ok(())
    }

    fn on_property(&mut self, node: &mut ParserNode, _: NodeStack<'_>) -> Result<(), HandlerError> {
        let required = is_required(node)?;
        self.builder
            .prop(node.get("name").unwrap_or_default(), required);
        Ok(())
    }

    fn on_any_properties(&mut self, _: &mut ParserNode, _: NodeStack<'_>) -> Result<(), HandlerError> {
        self.builder.any_props();
        Ok(())
    }

    fn on_recursive(&mut self, node: &mut ParserNode, _: NodeStack<'_>) -> Result<(), HandlerError> {
        self.builder.recursive(node.get("name").unwrap_or_default());
        Ok(())
    }
}

impl<H> Default for SchemaLoader<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> KeyHandler for SchemaLoader<H> {
    fn closed_key(&mut self, node: &ParserNode, _: NodeStack<'_>) -> Result<(), HandlerError> {
        if node.is_named("key") {
            self.builder.end();
        }
        Ok(())
    }

    fn cleanup(&mut self) {
        self.builder = GrammarBuilder::new();
    }
}

impl<H> DeclareGrammar for SchemaLoader<H> {
    fn declare(grammar: &mut GrammarBuilder<Self>) {
        grammar
            .bare_key("grammar")
                .key("global_property", Self::on_global_property)
                    .prop("name", true)
                    .prop("required", false)
                .end()
                .key("key", Self::on_key)
                    .prop("name", true)
                    .recursive("key")
                    .key("property", Self::on_property)
                        .prop("name", true)
                        .prop("required", false)
                    .end()
                    .key("any_properties", Self::on_any_properties)
                    .end()
                    .key("recursive", Self::on_recursive)
                        .prop("name", true)
                    .end()
                .end()
            .end();
    }
}

fn load_source<H>(source: Source<'_>) -> Result<Grammar<H>, SchemaError> {
    let name = source.name().unwrap_or("buffer").to_string();
    let mut parser = XmlParser::new(SchemaLoader::<H>::new())?;
    parser.load_source(source);
    parser.parse()?;
    let grammar = parser.into_handler().build()?;
    debug!(source = name.as_str(), layouts = grammar.len(), "grammar loaded");
    Ok(grammar)
}

/// Loads a grammar from a description held in memory.
pub fn load_schema<H>(bytes: &[u8]) -> Result<Grammar<H>, SchemaError> {
    load_source(Source::borrowed(bytes))
}

/// Loads a grammar from a description file.
pub fn load_schema_file<H>(path: impl AsRef<Path>) -> Result<Grammar<H>, SchemaError> {
    load_source(Source::from_file(path)?)
}

#[cfg(test)]
mod tests;
