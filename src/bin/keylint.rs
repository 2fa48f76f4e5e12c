/*
** This file is a part of keyxml (validating XML key parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** keyxml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::collections::BTreeMap;
use std::io::stdin;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use keyxml::HandlerError;
use keyxml::KeyHandler;
use keyxml::NodeStack;
use keyxml::ParserNode;
use keyxml::ParserOptions;
use keyxml::Source;
use keyxml::XmlParser;
use keyxml::schema::load_schema_file;

/// Checks documents against a grammar description.
#[derive(Parser)]
#[command(name = "keylint", version)]
struct Args {
    /// Overall statistics
    #[arg(short, long)]
    stat: bool,

    /// Key counts
    #[arg(short, long)]
    count: bool,

    /// Accept text inside keys
    #[arg(short, long)]
    text: bool,

    /// Reject keys nested deeper than this
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<usize>,

    /// Grammar description document
    grammar: PathBuf,

    /// Documents to check, standard input if none
    files: Vec<PathBuf>,
}

struct Linter {
    allow_text: bool,
    nr_keys: usize,
    max_depth: usize,
    text_size: usize,
    key_counts: BTreeMap<String, usize>,
}

impl Linter {
    fn new(allow_text: bool) -> Self {
        Linter {
            allow_text,
            nr_keys: 0,
            max_depth: 0,
            text_size: 0,
            key_counts: BTreeMap::new(),
        }
    }

    fn report(&self, args: &Args) {
        if args.stat {
            println!("Keys: {}, max depth: {}", self.nr_keys, self.max_depth);
            if self.allow_text {
                println!("Total size of text: {} bytes.", self.text_size);
            }
        }
        if args.count {
            println!("Key counts:");
            for (key, count) in &self.key_counts {
                println!("  {}: {}", key, count);
            }
        }
    }
}

impl KeyHandler for Linter {
    fn key_callback(&mut self, node: &mut ParserNode, _stack: NodeStack<'_>) -> Result<(), HandlerError> {
        self.nr_keys += 1;
        self.max_depth = self.max_depth.max(node.depth() + 1);
        *self
            .key_counts
            .entry(node.name().to_ascii_lowercase())
            .or_insert(0) += 1;
        Ok(())
    }

    fn allow_text(&self) -> bool {
        self.allow_text
    }

    fn text(&mut self, _node: &ParserNode, text: &str) -> Result<(), HandlerError> {
        self.text_size += text.len();
        Ok(())
    }

    fn cleanup(&mut self) {
        self.nr_keys = 0;
        self.max_depth = 0;
        self.text_size = 0;
        self.key_counts.clear();
    }
}

fn lint(parser: &mut XmlParser<'_, Linter>, args: &Args) -> bool {
    match parser.parse() {
        Ok(()) => {
            parser.handler().report(args);
            true
        }
        Err(err) => {
            eprintln!("{}", err);
            false
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .with_writer(std::io::stderr)
        .init();

    let grammar = match load_schema_file::<Linter>(&args.grammar) {
        Ok(grammar) => Arc::new(grammar),
        Err(err) => {
            eprintln!("{}: {}", args.grammar.display(), err);
            return ExitCode::FAILURE;
        }
    };
    let options = ParserOptions {
        max_depth: args.max_depth,
        ..Default::default()
    };
    let mut parser = XmlParser::with_grammar(grammar, Linter::new(args.text)).with_options(options);

    if args.files.is_empty() {
        match Source::from_reader(stdin().lock()) {
            Ok(source) => parser.load_source(source.with_name("stdin")),
            Err(err) => {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            }
        }
        if !lint(&mut parser, &args) {
            return ExitCode::FAILURE;
        }
    } else {
        for file in &args.files {
            if let Err(err) = parser.load_file(file) {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            }
            if !lint(&mut parser, &args) {
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
