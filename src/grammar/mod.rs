/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod builder;
mod error;

use std::collections::HashMap;
use std::fmt::Debug;

use crate::HandlerError;
use crate::NodeStack;
use crate::ParserNode;

pub use builder::GrammarBuilder;
pub use error::GrammarError;

/// Typed callback bound to a declared key.
///
/// The first argument is the handler owned by the parser, the second
/// one is the node whose opening tag was just validated, and the stack
/// holds its ancestors.
pub type KeyCallback<H> = fn(&mut H, &mut ParserNode, NodeStack<'_>) -> Result<(), HandlerError>;

/// Index of a key layout inside its [Grammar].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LayoutId(usize);

impl LayoutId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyLayout {
    name: String,
    required: bool,
}

impl PropertyLayout {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Declared shape of one key: its properties and legal children.
pub struct KeyLayout<H> {
    name: String,
    properties: Vec<PropertyLayout>,
    children: HashMap<String, LayoutId>,
    any_props: bool,
    callback: Option<KeyCallback<H>>,
}

impl<H> KeyLayout<H> {
    fn new(name: String, properties: Vec<PropertyLayout>, callback: Option<KeyCallback<H>>) -> Self {
        KeyLayout {
            name,
            properties,
            children: HashMap::new(),
            any_props: false,
            callback,
        }
    }

    /// Lowercase name of the key, empty for the grammar root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[PropertyLayout] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyLayout> {
        self.properties
            .iter()
            .find(|prop| prop.name.eq_ignore_ascii_case(name))
    }

    pub fn accepts_any_property(&self) -> bool {
        self.any_props
    }

    pub fn callback(&self) -> Option<KeyCallback<H>> {
        self.callback
    }

    pub fn child(&self, name: &str) -> Option<LayoutId> {
        self.children.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, LayoutId)> {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

impl<H> Debug for KeyLayout<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLayout")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("children", &self.children)
            .field("any_props", &self.any_props)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Immutable tree of legal keys for one kind of document.
///
/// Layouts live in an arena and refer to each other by [LayoutId], so
/// a key declared as recursive simply points back to itself. The root
/// layout has no name and its children are the legal top level keys.
pub struct Grammar<H> {
    layouts: Vec<KeyLayout<H>>,
}

impl<H> Grammar<H> {
    pub const ROOT: LayoutId = LayoutId(0);

    pub fn root(&self) -> &KeyLayout<H> {
        &self.layouts[Self::ROOT.0]
    }

    pub fn layout(&self, id: LayoutId) -> &KeyLayout<H> {
        &self.layouts[id.0]
    }

    /// Looks up a child key of `parent`, ignoring case.
    pub fn child(&self, parent: LayoutId, name: &str) -> Option<LayoutId> {
        self.layout(parent).child(name)
    }

    /// Number of distinct layouts, the root included.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }
}

impl<H> Debug for Grammar<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.layouts.iter()).finish()
    }
}

#[cfg(test)]
mod tests;
