/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::*;

#[test]
fn values() {
    let mut node = ParserNode::new("Color".to_string(), 0, None);
    assert!(node.is_empty());
    assert!(node.is_named("COLOR"));
    assert!(node.insert("Name".to_string(), "red".to_string()));
    assert!(node.insert("rgb".to_string(), "255, 0, 0".to_string()));
    assert!(!node.insert("NAME".to_string(), "blue".to_string()));
    assert_eq!(node.len(), 2);
    assert_eq!(node.get("name"), Some("red"));
    assert_eq!(node.get("RGB"), Some("255, 0, 0"));
    assert!(!node.contains("alpha"));
    assert_eq!(
        node.values().collect::<Vec<_>>(),
        vec![("Name", "red"), ("rgb", "255, 0, 0")]
    );

    assert!(!node.is_ignored());
    node.set_ignore(true);
    assert!(node.is_ignored());
}

#[test]
fn stack() {
    let nodes = vec![
        ParserNode::new("a".to_string(), 0, None),
        ParserNode::new("b".to_string(), 1, None),
        ParserNode::new("c".to_string(), 2, None),
    ];
    let stack = NodeStack::new(&nodes);
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.active().unwrap().name(), "c");
    assert_eq!(stack.parent(&nodes[2]).unwrap().name(), "b");
    assert_eq!(stack.parent(&nodes[1]).unwrap().name(), "a");
    assert!(stack.parent(&nodes[0]).is_none());
    assert_eq!(stack.get(1).unwrap().depth(), 1);
    assert_eq!(stack.iter().map(|node| node.name()).collect::<String>(), "abc");

    let empty = NodeStack::new(&[]);
    assert!(empty.is_empty());
    assert!(empty.active().is_none());
}
