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

use super::*;

#[test]
fn reading() {
    let mut source = Source::borrowed(b"ab\ncd");
    assert!(!source.is_owned());
    assert_eq!(source.len(), 5);
    assert_eq!(source.peek(), Some(b'a'));
    assert_eq!(source.peek_at(1), Some(b'b'));
    assert_eq!(source.peek_at(5), None);
    assert_eq!(source.peek_at(usize::MAX), None);
    assert_eq!(source.next_byte(), Some(b'a'));
    assert_eq!(source.next_byte(), Some(b'b'));
    assert_eq!(source.next_byte(), Some(b'\n'));
    assert_eq!(
        source.location(),
        Location {
            bytes: 3,
            lines: 1,
            column: 0
        }
    );
    assert!(source.starts_with(b"cd"));
    source.skip(10);
    assert_eq!(source.next_byte(), None);
    assert_eq!(source.location().column, 2);

    source.rewind();
    assert_eq!(source.location(), Location::new());
    assert_eq!(source.peek(), Some(b'a'));
}

#[test]
fn line_excerpts() {
    let mut source = Source::borrowed(b"first\r\nsecond line\nthird");
    assert_eq!(source.line_at(source.location()), b"first");
    source.skip(9);
    assert_eq!(source.line_at(source.location()), b"second line");
    source.skip(100);
    assert_eq!(source.line_at(source.location()), b"third");
    assert_eq!(source.location().line_number(), 3);
}

#[test]
fn ownership() {
    let source = Source::owned(b"<a/>".to_vec()).with_name("memory");
    assert!(source.is_owned());
    assert_eq!(source.name(), Some("memory"));

    let source = Source::from_reader(&b"<b/>"[..]).unwrap();
    assert!(source.is_owned());
    assert_eq!(source.name(), None);
    assert_eq!(source.len(), 4);
}

#[test]
fn files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"<theme/>").unwrap();
    let source = Source::from_file(file.path()).unwrap();
    assert!(source.is_owned());
    assert_eq!(source.len(), 8);
    assert_eq!(source.name(), Some(file.path().display().to_string().as_str()));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.xml");
    match Source::from_file(&missing) {
        Err(LoadError::File { path, .. }) => assert_eq!(path, missing),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn location_display() {
    let location = Location {
        bytes: 12,
        lines: 2,
        column: 4,
    };
    assert_eq!(location.to_string(), "line 3, column 5");
}
