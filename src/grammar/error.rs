/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use thiserror::Error;

/// Mistake in a grammar declaration.
///
/// These are authoring errors of the consumer, reported by
/// [GrammarBuilder::build()](super::GrammarBuilder::build). Only the
/// first mistake is kept since later ones are usually its echoes.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum GrammarError {
    #[error("key '{key}' is declared twice inside '{parent}'")]
    DuplicateKey { parent: String, key: String },

    #[error("property '{property}' is declared twice in key '{key}'")]
    DuplicateProperty { key: String, property: String },

    #[error("global property '{0}' is declared twice")]
    DuplicateGlobalProperty(String),

    #[error("invalid name '{0}' in grammar declaration")]
    InvalidName(String),

    #[error("property '{0}' is declared outside of any key")]
    PropertyOutsideKey(String),

    #[error("recursive key '{0}' is declared outside of any key")]
    RecursiveOutsideKey(String),

    #[error("end of key declared without an open key")]
    EndWithoutKey,

    #[error("declaration of key '{0}' is never ended")]
    UnclosedKey(String),
}
