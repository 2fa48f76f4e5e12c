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

use crate::GrammarError;
use crate::LoadError;
use crate::ParseError;

/// Failure to load a grammar description.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The description document itself is malformed.
    #[error("invalid grammar description: {0}")]
    Parse(#[from] ParseError),

    /// The description is well formed but declares an impossible grammar.
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),

    #[error("grammar declares no keys")]
    NoKeys,
}
