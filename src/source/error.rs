/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain the bytes of a document.
///
/// Loading never touches the parser state beyond replacing the
/// source, so the caller can simply report this and move on.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read stream: {0}")]
    Stream(#[from] std::io::Error),
}
