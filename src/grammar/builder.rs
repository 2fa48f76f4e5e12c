/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::Grammar;
use super::GrammarError;
use super::KeyCallback;
use super::KeyLayout;
use super::LayoutId;
use super::PropertyLayout;

/// Declares a [Grammar] key by key.
///
/// The builder keeps a stack of open key scopes: [key()](Self::key)
/// opens a new key under the current one, properties and child keys
/// declared after it belong to it, and [end()](Self::end) closes it.
///
/// ```
/// use keyxml::GrammarBuilder;
/// # use keyxml::{HandlerError, NodeStack, ParserNode};
/// # struct Theme;
/// # impl Theme {
/// #     fn on_color(&mut self, _: &mut ParserNode, _: NodeStack<'_>) -> Result<(), HandlerError> { Ok(()) }
/// # }
/// let mut builder = GrammarBuilder::<Theme>::new();
/// builder
///     .bare_key("palette")
///         .key("color", Theme::on_color)
///             .prop("name", true)
///             .prop("rgb", true)
///         .end()
///     .end();
/// let grammar = builder.build().unwrap();
/// assert_eq!(grammar.len(), 3);
/// ```
///
/// Names are case insensitive and stored in lowercase. Mistakes are
/// remembered and reported by [build()](Self::build), so the calls
/// can be chained without checking each one.
pub struct GrammarBuilder<H> {
    layouts: Vec<KeyLayout<H>>,
    scopes: Vec<LayoutId>,
    globals: Vec<PropertyLayout>,
    error: Option<GrammarError>,
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .bytes()
            .any(|c| c.is_ascii_whitespace() || matches!(c, b'<' | b'>' | b'=' | b'/' | b'"' | b'\''))
}

impl<H> GrammarBuilder<H> {
    pub fn new() -> Self {
        GrammarBuilder {
            layouts: vec![KeyLayout::new(String::new(), Vec::new(), None)],
            scopes: vec![Grammar::<H>::ROOT],
            globals: Vec::new(),
            error: None,
        }
    }

    fn fail(&mut self, error: GrammarError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn current(&self) -> LayoutId {
        // scopes always starts with the root
        self.scopes[self.scopes.len() - 1]
    }

    fn open(&mut self, name: &str, callback: Option<KeyCallback<H>>) -> &mut Self {
        if !is_valid_name(name) {
            self.fail(GrammarError::InvalidName(name.to_string()));
        }
        let name = name.to_ascii_lowercase();
        let parent = self.current();
        let id = LayoutId(self.layouts.len());
        self.layouts
            .push(KeyLayout::new(name.clone(), self.globals.clone(), callback));
        let parent_layout = &mut self.layouts[parent.0];
        if parent_layout.children.contains_key(&name) {
            let error = GrammarError::DuplicateKey {
                parent: parent_layout.name.clone(),
                key: name,
            };
            self.fail(error);
        } else {
            parent_layout.children.insert(name, id);
        }
        self.scopes.push(id);
        self
    }

    /// Opens a key handled by the given callback.
    ///
    /// The key inherits the global properties declared so far.
    pub fn key(&mut self, name: &str, callback: KeyCallback<H>) -> &mut Self {
        self.open(name, Some(callback))
    }

    /// Opens a key handled by [KeyHandler::key_callback()](crate::KeyHandler::key_callback).
    pub fn bare_key(&mut self, name: &str) -> &mut Self {
        self.open(name, None)
    }

    /// Allows the current key to contain itself under `name`.
    ///
    /// The child entry refers to the very same layout, so nesting can be
    /// arbitrarily deep.
    pub fn recursive(&mut self, name: &str) -> &mut Self {
        let current = self.current();
        if current == Grammar::<H>::ROOT {
            self.fail(GrammarError::RecursiveOutsideKey(name.to_string()));
            return self;
        }
        if !is_valid_name(name) {
            self.fail(GrammarError::InvalidName(name.to_string()));
            return self;
        }
        let name = name.to_ascii_lowercase();
        let layout = &mut self.layouts[current.0];
        if layout.children.contains_key(&name) {
            let error = GrammarError::DuplicateKey {
                parent: layout.name.clone(),
                key: name,
            };
            self.fail(error);
        } else {
            layout.children.insert(name, current);
        }
        self
    }

    /// Declares a property of the current key.
    pub fn prop(&mut self, name: &str, required: bool) -> &mut Self {
        let current = self.current();
        if current == Grammar::<H>::ROOT {
            self.fail(GrammarError::PropertyOutsideKey(name.to_string()));
            return self;
        }
        if !is_valid_name(name) {
            self.fail(GrammarError::InvalidName(name.to_string()));
            return self;
        }
        let layout = &mut self.layouts[current.0];
        if layout.property(name).is_some() {
            let error = GrammarError::DuplicateProperty {
                key: layout.name.clone(),
                property: name.to_ascii_lowercase(),
            };
            self.fail(error);
        } else {
            layout.properties.push(PropertyLayout {
                name: name.to_ascii_lowercase(),
                required,
            });
        }
        self
    }

    /// Declares a property for every key opened from now on.
    ///
    /// Keys declared before this call are not affected.
    pub fn global_prop(&mut self, name: &str, required: bool) -> &mut Self {
        if !is_valid_name(name) {
            self.fail(GrammarError::InvalidName(name.to_string()));
            return self;
        }
        if self
            .globals
            .iter()
            .any(|prop| prop.name.eq_ignore_ascii_case(name))
        {
            self.fail(GrammarError::DuplicateGlobalProperty(
                name.to_ascii_lowercase(),
            ));
        } else {
            self.globals.push(PropertyLayout {
                name: name.to_ascii_lowercase(),
                required,
            });
        }
        self
    }

    /// Lets the current key carry properties which are not declared.
    ///
    /// Required properties are still enforced.
    pub fn any_props(&mut self) -> &mut Self {
        let current = self.current();
        if current == Grammar::<H>::ROOT {
            self.fail(GrammarError::PropertyOutsideKey("*".to_string()));
        } else {
            self.layouts[current.0].any_props = true;
        }
        self
    }

    /// Closes the current key.
    pub fn end(&mut self) -> &mut Self {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        } else {
            self.fail(GrammarError::EndWithoutKey);
        }
        self
    }

    /// Name of the key being declared, `None` at the top level.
    pub fn current_key(&self) -> Option<&str> {
        match self.current() {
            id if id == Grammar::<H>::ROOT => None,
            id => Some(self.layouts[id.0].name.as_str()),
        }
    }

    /// Finishes the declaration.
    pub fn build(self) -> Result<Grammar<H>, GrammarError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.scopes.len() > 1 {
            let open = self.current();
            return Err(GrammarError::UnclosedKey(self.layouts[open.0].name.clone()));
        }
        Ok(Grammar {
            layouts: self.layouts,
        })
    }
}

impl<H> Default for GrammarBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}
