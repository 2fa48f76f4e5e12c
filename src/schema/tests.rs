/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::io::Write;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::GrammarError;
use crate::ParseError;

const MENU: &str = r#"<?xml version="1.0"?>
<!-- menus of the launcher -->
<grammar>
  <global_property name="id"/>
  <key name="menu">
    <property name="title" required="true"/>
    <recursive name="menu"/>
    <key name="item">
      <property name="action" required="TRUE"/>
      <any_properties/>
    </key>
  </key>
  <key name="shortcut">
    <property name="key" required="false"/>
  </key>
</grammar>
"#;

#[derive(Default)]
struct Collector {
    keys: Vec<(String, usize)>,
}

impl KeyHandler for Collector {
    fn key_callback(&mut self, node: &mut ParserNode, _stack: NodeStack<'_>) -> Result<(), HandlerError> {
        self.keys.push((node.name().to_string(), node.depth()));
        Ok(())
    }
}

fn parse(grammar: &Arc<Grammar<Collector>>, doc: &str) -> Result<Vec<(String, usize)>, ParseError> {
    let mut parser = XmlParser::with_grammar(Arc::clone(grammar), Collector::default());
    parser.load_buffer(doc.as_bytes());
    parser.parse()?;
    Ok(parser.into_handler().keys)
}

#[test]
fn layouts() {
    let grammar: Grammar<Collector> = load_schema(MENU.as_bytes()).unwrap();
    // root, menu, item, shortcut
    assert_eq!(grammar.len(), 4);

    let menu = grammar.child(Grammar::<Collector>::ROOT, "menu").unwrap();
    assert_eq!(grammar.child(menu, "menu"), Some(menu));
    let layout = grammar.layout(menu);
    assert!(layout.callback().is_none());
    assert!(layout.property("id").is_some());
    assert!(layout.property("title").unwrap().is_required());

    let item = grammar.layout(grammar.child(menu, "item").unwrap());
    assert!(item.accepts_any_property());
    assert!(item.property("action").unwrap().is_required());

    let shortcut = grammar.child(Grammar::<Collector>::ROOT, "shortcut").unwrap();
    assert!(!grammar.layout(shortcut).property("key").unwrap().is_required());
}

#[test]
fn validation() {
    let grammar = Arc::new(load_schema(MENU.as_bytes()).unwrap());

    let keys = parse(
        &grammar,
        "<menu title='Main' id='m'><menu title='Games'><item action='run' icon='x.png'/></menu></menu><shortcut key='F1'/>",
    )
    .unwrap();
    assert_eq!(
        keys,
        vec![
            ("menu".to_string(), 0),
            ("menu".to_string(), 1),
            ("item".to_string(), 2),
            ("shortcut".to_string(), 0),
        ]
    );

    let err = parse(&grammar, "<menu><item action='run'/></menu>").unwrap_err();
    assert_eq!(err.message(), "missing required property 'title' in key 'menu'");

    let err = parse(&grammar, "<shortcut><item action='run'/></shortcut>").unwrap_err();
    assert_eq!(err.message(), "unexpected key 'item' inside key 'shortcut'");

    let err = parse(&grammar, "<shortcut modifier='alt'/>").unwrap_err();
    assert_eq!(err.message(), "unexpected property 'modifier' in key 'shortcut'");
}

#[test]
fn bad_descriptions() {
    let err = load_schema::<Collector>(b"<grammar><key name='a' required='maybe'/></grammar>").unwrap_err();
    assert!(matches!(err, SchemaError::Parse(ParseError::Grammar(_))));

    let err = load_schema::<Collector>(b"<grammar><key name='a'><property name='b' required='maybe'/></key></grammar>")
        .unwrap_err();
    match err {
        SchemaError::Parse(ParseError::Handler(diagnostic)) => assert_eq!(
            diagnostic.message,
            "property 'required' must be 'true' or 'false', not 'maybe'"
        ),
        other => panic!("unexpected result {:?}", other),
    }

    let err = load_schema::<Collector>(b"<grammar><keys name='a'/></grammar>").unwrap_err();
    assert!(matches!(err, SchemaError::Parse(ParseError::Grammar(_))));

    let err = load_schema::<Collector>(b"<grammar><key name='a'/><key name='A'/></grammar>").unwrap_err();
    assert!(matches!(
        err,
        SchemaError::Grammar(GrammarError::DuplicateKey { .. })
    ));

    let err = load_schema::<Collector>(b"<grammar><key name='a b'/></grammar>").unwrap_err();
    assert!(matches!(
        err,
        SchemaError::Grammar(GrammarError::InvalidName(_))
    ));

    let err = load_schema::<Collector>(b"<grammar/>").unwrap_err();
    assert!(matches!(err, SchemaError::NoKeys));
    assert_eq!(err.to_string(), "grammar declares no keys");
}

#[test]
fn files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MENU.as_bytes()).unwrap();
    let grammar: Grammar<Collector> = load_schema_file(file.path()).unwrap();
    assert_eq!(grammar.len(), 4);

    let dir = tempfile::tempdir().unwrap();
    let err = load_schema_file::<Collector>(dir.path().join("missing.xml")).unwrap_err();
    assert!(matches!(err, SchemaError::Load(_)));
}
