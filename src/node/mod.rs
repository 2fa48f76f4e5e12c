/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use crate::LayoutId;

/// A key which is currently open in the document.
///
/// Nodes are created when the opening tag name is read and dropped
/// when the key is closed, so a handler only ever sees the chain of
/// keys from the document root to the one being processed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParserNode {
    name: String,
    values: Vec<(String, String)>,
    ignore: bool,
    depth: usize,
    layout: Option<LayoutId>,
    header: bool,
}

impl ParserNode {
    pub(crate) fn new(name: String, depth: usize, layout: Option<LayoutId>) -> Self {
        ParserNode {
            name,
            values: Vec::new(),
            ignore: false,
            depth,
            layout,
            header: false,
        }
    }

    pub(crate) fn new_header(name: String) -> Self {
        ParserNode {
            header: true,
            ..ParserNode::new(name, 0, None)
        }
    }

    pub(crate) fn is_header(&self) -> bool {
        self.header
    }

    /// Stores a property value, returns false if the name is already used.
    pub(crate) fn insert(&mut self, name: String, value: String) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.values.push((name, value));
        true
    }

    /// Name of the key as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compares the key name ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Nesting level, zero for the top level keys.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Grammar layout the key was matched against.
    pub fn layout(&self) -> Option<LayoutId> {
        self.layout
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Properties in document order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    /// Suppresses callbacks for this key and everything inside it.
    ///
    /// The content is still parsed and checked against the grammar.
    pub fn set_ignore(&mut self, ignore: bool) {
        self.ignore = ignore;
    }
}

/// View of the open keys, from the top level down.
///
/// Inside a callback the view holds the ancestors of the node being
/// processed, so [active()](Self::active) is its parent there.
#[derive(Clone, Copy, Debug)]
pub struct NodeStack<'a> {
    nodes: &'a [ParserNode],
}

impl<'a> NodeStack<'a> {
    pub(crate) fn new(nodes: &'a [ParserNode]) -> Self {
        NodeStack { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The innermost open key.
    pub fn active(&self) -> Option<&'a ParserNode> {
        self.nodes.last()
    }

    /// The key enclosing `node`, `None` for a top level key.
    pub fn parent(&self, node: &ParserNode) -> Option<&'a ParserNode> {
        let depth = node.depth().checked_sub(1)?;
        self.nodes.get(depth)
    }

    pub fn get(&self, depth: usize) -> Option<&'a ParserNode> {
        self.nodes.get(depth)
    }

    pub fn iter(&self) -> std::slice::Iter<'a, ParserNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests;
