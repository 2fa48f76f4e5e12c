/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

fn split_number(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|&(pos, c)| !(c.is_ascii_digit() || (pos == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(pos, _)| pos);
    s.split_at(end)
}

/// Parses exactly `count` comma separated integers from a property value.
///
/// Whitespace is allowed around the numbers and the commas. Returns
/// `None` if there are fewer or more numbers than requested, or if
/// anything else follows the last one.
///
/// ```
/// use keyxml::parse_integer_list;
/// assert_eq!(parse_integer_list("255, 0, 128", 3), Some(vec![255, 0, 128]));
/// assert_eq!(parse_integer_list("1, 2", 3), None);
/// ```
pub fn parse_integer_list(value: &str, count: usize) -> Option<Vec<i32>> {
    let mut numbers = Vec::new();
    let mut rest = value;
    for i in 0..count {
        let (number, tail) = split_number(rest.trim_start());
        numbers.push(number.parse::<i32>().ok()?);
        rest = tail.trim_start();
        if i + 1 < count {
            rest = rest.strip_prefix(',')?;
        }
    }
    if rest.trim_start().is_empty() {
        Some(numbers)
    } else {
        None
    }
}

/// Fixed size variant of [parse_integer_list()].
///
/// ```
/// use keyxml::parse_integers;
/// let [x, y] = parse_integers::<2>(" 10 , 20 ").unwrap();
/// assert_eq!((x, y), (10, 20));
/// ```
pub fn parse_integers<const N: usize>(value: &str) -> Option<[i32; N]> {
    parse_integer_list(value, N)?.try_into().ok()
}
