//! clj-style developer tools
//!
//! Command-line views of the parsing layer:
//! - Dump the CST of a file, as an s-expression or JSON
//! - List the flattened node sequence the `ns` extractor walks
//! - Print the `ns` descriptor of a file as JSON

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use clj_style_core::{dump, flatten, look_for_ignore_file, parse, parse_ns};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "clj-style-devtools")]
#[command(about = "Developer tools for clj-style", version)]
#[command(author = "Standard Clojure Style Team")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the concrete syntax tree of a file
    Cst {
        /// Clojure source file, or `-` for stdin
        path: PathBuf,

        /// Emit the tree as JSON instead of the s-expression dump
        #[arg(long)]
        json: bool,
    },

    /// Print the flattened node sequence, one node per line
    Flat {
        /// Clojure source file, or `-` for stdin
        path: PathBuf,
    },

    /// Print the ns descriptor as JSON (`null` when there is no ns form)
    Ns {
        /// Clojure source file, or `-` for stdin
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    clj_style_core::init_tracing(level);

    match cli.command {
        Commands::Cst { path, json } => {
            let source = read_source(&path)?;
            let root = parse(&source);
            if json {
                println!("{}", serde_json::to_string_pretty(&root)?);
            } else {
                println!("{}", dump(&root));
            }
        }
        Commands::Flat { path } => {
            let source = read_source(&path)?;
            let root = parse(&source);
            for node in flatten(&root) {
                let name = node.name().map_or("_", |rule| rule.as_str());
                match node.text_if_present() {
                    Some(text) => println!(
                        "{:>5} {:<10} {}..{} {:?}",
                        node.id(),
                        name,
                        node.start(),
                        node.end(),
                        text
                    ),
                    None => println!("{:>5} {:<10} {}..{}", node.id(), name, node.start(), node.end()),
                }
            }
        }
        Commands::Ns { path } => {
            let source = read_source(&path)?;
            let root = parse(&source);
            let nodes = flatten(&root);
            if look_for_ignore_file(&nodes) {
                info!("{} opts out of formatting", path.display());
            }
            let ns = parse_ns(&nodes);
            println!("{}", serde_json::to_string_pretty(&ns)?);
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        debug!("Read {} bytes from stdin", source.len());
        return Ok(source);
    }
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!("Read {} bytes from {}", source.len(), path.display());
    Ok(source)
}
