/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use pretty_assertions::assert_eq;

use super::*;

struct Dummy;

impl Dummy {
    fn on_layout(&mut self, _node: &mut ParserNode, _stack: NodeStack<'_>) -> Result<(), HandlerError> {
        Ok(())
    }
}

fn names(props: &[PropertyLayout]) -> Vec<(&str, bool)> {
    props
        .iter()
        .map(|prop| (prop.name(), prop.is_required()))
        .collect()
}

fn top<'g>(grammar: &'g Grammar<Dummy>, name: &str) -> &'g KeyLayout<Dummy> {
    grammar.layout(grammar.child(Grammar::<Dummy>::ROOT, name).unwrap())
}

#[test]
fn nesting() {
    let mut builder = GrammarBuilder::<Dummy>::new();
    builder
        .key("Layout_Info", Dummy::on_layout)
            .prop("Resolution", false)
            .bare_key("dialog")
                .prop("name", true)
                .any_props()
            .end()
        .end();
    let grammar = builder.build().unwrap();
    assert_eq!(grammar.len(), 3);
    assert!(!grammar.is_empty());

    let info = grammar.child(Grammar::<Dummy>::ROOT, "LAYOUT_INFO").unwrap();
    let layout = grammar.layout(info);
    assert_eq!(layout.name(), "layout_info");
    assert!(layout.callback().is_some());
    assert!(!layout.accepts_any_property());
    assert_eq!(names(layout.properties()), vec![("resolution", false)]);

    let dialog = grammar.child(info, "Dialog").unwrap();
    let layout = grammar.layout(dialog);
    assert!(layout.callback().is_none());
    assert!(layout.accepts_any_property());
    assert!(layout.property("NAME").unwrap().is_required());
    assert_eq!(info.index(), 1);
    assert_eq!(dialog.index(), 2);
    assert_eq!(grammar.root().children().collect::<Vec<_>>(), vec![("layout_info", info)]);
    assert_eq!(grammar.layout(info).children().collect::<Vec<_>>(), vec![("dialog", dialog)]);
    assert_eq!(grammar.layout(dialog).children().count(), 0);
    assert_eq!(grammar.child(dialog, "dialog"), None);
    assert_eq!(grammar.child(Grammar::<Dummy>::ROOT, "dialog"), None);
}

#[test]
fn recursion() {
    let mut builder = GrammarBuilder::<Dummy>::new();
    builder
        .bare_key("group")
            .recursive("group")
            .bare_key("item")
            .end()
        .end();
    let grammar = builder.build().unwrap();
    // the recursive edge must not create a new layout
    assert_eq!(grammar.len(), 3);
    let group = grammar.child(Grammar::<Dummy>::ROOT, "group").unwrap();
    assert_eq!(grammar.child(group, "group"), Some(group));
    let nested = grammar.child(group, "GROUP").unwrap();
    assert!(grammar.child(nested, "item").is_some());
}

#[test]
fn global_properties() {
    let mut builder = GrammarBuilder::<Dummy>::new();
    builder
        .bare_key("first")
        .end()
        .global_prop("id", true)
        .bare_key("second")
            .prop("x", false)
        .end()
        .global_prop("debug", false)
        .bare_key("third")
        .end();
    let grammar = builder.build().unwrap();
    assert!(top(&grammar, "first").properties().is_empty());
    assert_eq!(
        names(top(&grammar, "second").properties()),
        vec![("id", true), ("x", false)]
    );
    assert_eq!(
        names(top(&grammar, "third").properties()),
        vec![("id", true), ("debug", false)]
    );
}

#[test]
fn duplicate_keys() {
    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.bare_key("a").end().bare_key("A").end();
    assert_eq!(
        builder.build().unwrap_err(),
        GrammarError::DuplicateKey {
            parent: String::new(),
            key: "a".to_string()
        }
    );

    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.bare_key("a").recursive("a").recursive("a").end();
    assert_eq!(
        builder.build().unwrap_err(),
        GrammarError::DuplicateKey {
            parent: "a".to_string(),
            key: "a".to_string()
        }
    );
}

#[test]
fn declaration_mistakes() {
    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.bare_key("a").prop("x", true).prop("X", false).end();
    assert_eq!(
        builder.build().unwrap_err(),
        GrammarError::DuplicateProperty {
            key: "a".to_string(),
            property: "x".to_string()
        }
    );

    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.global_prop("x", true).global_prop("x", true);
    assert_eq!(
        builder.build().unwrap_err(),
        GrammarError::DuplicateGlobalProperty("x".to_string())
    );

    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.prop("x", true);
    assert_eq!(
        builder.build().unwrap_err(),
        GrammarError::PropertyOutsideKey("x".to_string())
    );

    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.recursive("x");
    assert_eq!(
        builder.build().unwrap_err(),
        GrammarError::RecursiveOutsideKey("x".to_string())
    );

    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.bare_key("a").end().end();
    assert_eq!(builder.build().unwrap_err(), GrammarError::EndWithoutKey);

    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.bare_key("a").bare_key("b");
    assert_eq!(builder.current_key(), Some("b"));
    assert_eq!(
        builder.build().unwrap_err(),
        GrammarError::UnclosedKey("b".to_string())
    );

    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.bare_key("two words").end();
    assert_eq!(
        builder.build().unwrap_err(),
        GrammarError::InvalidName("two words".to_string())
    );
}

#[test]
fn first_error_wins() {
    let mut builder = GrammarBuilder::<Dummy>::new();
    builder.end().prop("x", true);
    assert_eq!(builder.build().unwrap_err(), GrammarError::EndWithoutKey);
}
