//! Command-line interface for typeshift
//!
//! Usage:
//!   typeshift `<source>` `<destination>` [--mode `<mode>`] [--config `<file>`] [--placeholder `<name>`] [--verbose]
//!                                           - Convert a file or mirror a directory tree
//!   typeshift tokens `<path>`               - Dump the token stream of a file as JSON

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use typeshift::shift::config::Loader;
use typeshift::shift::lexing::tokenize;
use typeshift::shift::pipeline::{Mode, Pipeline};

fn main() {
    let matches = Command::new("typeshift")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between typed and untyped script sources, keeping their layout")
        .arg_required_else_help(true)
        .args_conflicts_with_subcommands(true)
        .subcommand_negates_reqs(true)
        .arg(
            Arg::new("source")
                .help("Source file or directory")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("destination")
                .help("Destination file or directory")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .short('m')
                .help("Which files to convert: auto, strip or annotate")
                .default_value("auto"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("placeholder")
                .long("placeholder")
                .short('p')
                .help("Type name inserted when annotating (default: any)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every file, including skipped ones")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream of a file as JSON")
                .arg(
                    Arg::new("path")
                        .help("File to tokenize")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    if let Some(("tokens", sub)) = matches.subcommand() {
        let path = sub
            .get_one::<String>("path")
            .expect("path is a required argument");
        handle_tokens_command(path);
        return;
    }

    setup_logging(matches.get_flag("verbose"));
    handle_convert_command(&matches);
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .compact()
        .init();
}

/// Handle the default conversion command
fn handle_convert_command(matches: &ArgMatches) {
    let source = matches
        .get_one::<String>("source")
        .expect("source is a required argument");
    let destination = matches
        .get_one::<String>("destination")
        .expect("destination is a required argument");
    let mode: Mode = matches
        .get_one::<String>("mode")
        .expect("mode has a default value")
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        });

    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(placeholder) = matches.get_one::<String>("placeholder") {
        loader = loader
            .set_override("annotate.placeholder", placeholder.as_str())
            .unwrap_or_else(|e| {
                eprintln!("Invalid placeholder: {}", e);
                std::process::exit(1);
            });
    }
    let config = loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    let pipeline = Pipeline::new(&config, mode);
    if let Err(e) = pipeline.run(Path::new(source), Path::new(destination)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Handle the tokens command
fn handle_tokens_command(path: &str) {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    });
    let tokens = tokenize(&source).unwrap_or_else(|e| {
        eprintln!("Error tokenizing {}: {}", path, e);
        std::process::exit(1);
    });
    let json = serde_json::to_string_pretty(&tokens).unwrap_or_else(|e| {
        eprintln!("Error formatting tokens: {}", e);
        std::process::exit(1);
    });
    println!("{}", json);
}
