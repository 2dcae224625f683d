use std::{fs, io::Read, path::PathBuf, process};

use ansi_term::Colour;
use clap::{ArgAction, Parser};
use snafu::prelude::*;

use chained::{
    config,
    error::{DocumentSnafu, IOSnafu},
    new_ref, path,
    version::{BUILD_TIME, VERSION},
    Chain, ChainConfig, ChainErrorReporter, Link, Result, Value,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Chain Paths
    ///
    /// One or more paths to evaluate against the document, e.g. `a.H3[1].deeper`.
    #[arg(required = true)]
    paths: Vec<String>,
    /// JSON Document
    ///
    /// Path to the document to wrap. Standard input is read if this is
    /// missing.
    #[arg(long, short)]
    file: Option<PathBuf>,
    /// Symbolize Keys
    ///
    /// Turn every object key in the document into a symbol before wrapping.
    #[arg(long, short, action=ArgAction::SetTrue)]
    symbolize: bool,
    /// Configuration File
    ///
    /// A JSON file with `passthrough_methods` and `exclusions` to install
    /// before anything is wrapped.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// JSON Output
    ///
    /// Print each result as JSON instead of its inspect form.
    #[arg(long, short, action=ArgAction::SetTrue)]
    json: bool,
    /// Uber Errors
    ///
    /// Include the source location that raised each error.
    #[arg(long, short, action=ArgAction::SetTrue)]
    uber: bool,
}

fn load(args: &Args) -> Result<Value> {
    let src = match &args.file {
        Some(file) => fs::read_to_string(file).context(IOSnafu {
            message: file.display().to_string(),
        })?,
        None => {
            let mut src = String::new();
            std::io::stdin()
                .read_to_string(&mut src)
                .context(IOSnafu {
                    message: "standard input",
                })?;
            src
        }
    };

    let json: serde_json::Value = serde_json::from_str(&src).context(DocumentSnafu)?;
    let value = Value::from(json);

    Ok(if args.symbolize {
        value.symbolize_keys()
    } else {
        value
    })
}

fn main() {
    pretty_env_logger::init();
    color_backtrace::install();

    let args = Args::parse();
    log::debug!("chained {VERSION}, built {BUILD_TIME}");

    if let Some(file) = &args.config {
        match ChainConfig::from_path(file) {
            Ok(config) => config::install(config),
            Err(e) => {
                eprintln!("{}", ChainErrorReporter(&e, args.uber));
                process::exit(1);
            }
        }
    }

    let value = match load(&args) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{}", ChainErrorReporter(&e, args.uber));
            process::exit(1);
        }
    };

    // Excluded documents can still be walked, just not wrapped.
    let root = match Chain::new(value.clone()) {
        Ok(chain) => Link::from(chain),
        Err(_) => Link::Raw(new_ref!(Value, value)),
    };

    let mut failed = false;
    for src in &args.paths {
        match path::evaluate(&root, src) {
            Ok(link) => {
                let shown = if args.json {
                    serde_json::to_string_pretty(&link).unwrap_or_else(|e| e.to_string())
                } else {
                    link.inspect()
                };
                let marker = if link.is_chained() {
                    Colour::Green.paint("chained")
                } else {
                    Colour::Yellow.paint("raw")
                };
                println!("{} => {shown} ({marker})", Colour::Cyan.paint(src.as_str()));
            }
            Err(e) => {
                failed = true;
                eprintln!("{}", ChainErrorReporter(&e, args.uber));
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
