//! musetag CLI tool
//!
//! Command-line interface for inspecting MuseTag-annotated manuscripts with musetag-core.
//!
//! ## Commands
//!
//! - `parse <path>`: the full parse result as JSON
//! - `clean <path>`: the clean narrative text, optionally rendered to HTML
//! - `outline <path>`: the document outline
//! - `entities <path>`: entities in display order with their relations
//! - `timeline <path>`: dated temporal entities in chronological order
//! - `hierarchy <path>`: the parent/child relation forest
//!
//! Every command reads `-` as standard input and accepts `--config <musetag.toml>`.

use clap::{Parser, Subcommand};
use musetag_core::{
    config::{get_content, ConfigProvider, ParserConfig, TomlConfigProvider},
    views::{display_order, hierarchy_forest, timeline, HierarchyNode},
    MuseTagError, MuseTagParser,
};
use std::{
    io::Read,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "musetag")]
#[command(author, version, about = "A tool for inspecting MuseTag-annotated manuscripts", long_about = None)]
struct Cli {
    /// Parser configuration file (TOML). Defaults apply when absent.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full parse result (clean text, entities, outline) as JSON
    Parse {
        /// Manuscript to parse, or `-` for standard input
        path: PathBuf,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the clean narrative text
    Clean {
        /// Manuscript to parse, or `-` for standard input
        path: PathBuf,

        /// Render the clean text from markdown to HTML
        #[arg(long)]
        html: bool,
    },

    /// Print the document outline
    Outline {
        /// Manuscript to parse, or `-` for standard input
        path: PathBuf,
    },

    /// List entities by importance, with type, occurrences and relations
    Entities {
        /// Manuscript to parse, or `-` for standard input
        path: PathBuf,
    },

    /// List dated temporal entities in chronological order
    Timeline {
        /// Manuscript to parse, or `-` for standard input
        path: PathBuf,
    },

    /// Print the parent/child relation forest
    Hierarchy {
        /// Manuscript to parse, or `-` for standard input
        path: PathBuf,
    },
}

impl Commands {
    fn path(&self) -> &Path {
        match self {
            Commands::Parse { path, .. }
            | Commands::Clean { path, .. }
            | Commands::Outline { path }
            | Commands::Entities { path }
            | Commands::Timeline { path }
            | Commands::Hierarchy { path } => path,
        }
    }
}

fn read_input(path: &Path) -> Result<String, MuseTagError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        get_content(path)
    }
}

fn print_hierarchy(node: &HierarchyNode, depth: usize) {
    let marker = if node.cycle { " (cycle)" } else { "" };
    println!(
        "{}{}{} @{}",
        "  ".repeat(depth),
        node.name,
        marker,
        node.focus_position
    );
    for child in &node.children {
        print_hierarchy(child, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TomlConfigProvider::new(path.clone()).get_config()?,
        None => ParserConfig::default(),
    };
    let parser = MuseTagParser::new(config);
    let text = read_input(cli.command.path())?;

    match cli.command {
        Commands::Parse { pretty, .. } => {
            let result = parser.parse(&text);
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{json}");
        }

        Commands::Clean { html, .. } => {
            let clean = parser.clean_text(&text);
            if html {
                let mut rendered = String::new();
                pulldown_cmark::html::push_html(&mut rendered, pulldown_cmark::Parser::new(&clean));
                print!("{rendered}");
            } else {
                print!("{clean}");
            }
        }

        Commands::Outline { .. } => {
            for entry in parser.outline(&text) {
                println!(
                    "{}{} @{}",
                    "  ".repeat(entry.level.saturating_sub(1)),
                    entry.text,
                    entry.position
                );
            }
        }

        Commands::Entities { .. } => {
            let result = parser.parse(&text);
            for entity in display_order(&result.entities) {
                println!(
                    "{} [{}, {}] {} explicit, {} implicit",
                    entity.name,
                    entity.kind,
                    entity.hierarchy_level,
                    entity.explicit_occurrences().count(),
                    entity.implicit_occurrences().count()
                );
                if !entity.aliases.is_empty() {
                    println!("  aliases: {}", entity.aliases.join(", "));
                }
                for parent in &entity.parents {
                    println!("  child of {} @{}", parent.name, parent.position);
                }
                for child in &entity.children {
                    println!("  parent of {} @{}", child.name, child.position);
                }
            }
        }

        Commands::Timeline { .. } => {
            let result = parser.parse(&text);
            for entry in timeline(&result.entities) {
                println!("{:>5.1}%  {}  {}", entry.offset * 100.0, entry.date, entry.name);
            }
        }

        Commands::Hierarchy { .. } => {
            let result = parser.parse(&text);
            for root in hierarchy_forest(&result.entities) {
                print_hierarchy(&root, 0);
            }
        }
    }

    Ok(())
}
