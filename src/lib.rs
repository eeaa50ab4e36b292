//! # musetag-core
//!
//! A Rust library for parsing MuseTag, an inline annotation language for narrative prose.
//!
//! ## Overview
//!
//! Writers annotate a manuscript in place (`@@Della`, `@@@(comb).Object.ChildOf(@@Della)`,
//! `@@(1905-12-24 12:00)`) and keep writing. musetag-core reads the raw text and produces three
//! independent results:
//!
//! - **Clean text**: the narrative as a reader sees it, annotations removed or expanded.
//! - **Document outline**: markdown headings plus hidden `@@.(# Heading)` markers, in order.
//! - **Entity graph**: every character, place, event, object or date the text declares, with
//!   per-occurrence and cumulative properties, aliases, and parent/child relations.
//!
//! Parsing never fails. Text that does not match the grammar stays literal prose.
//!
//! ## Architecture
//!
//! - **[`syntax`]**: the annotation grammar (`Scanner`, modifier chains, temporal literals)
//! - **[`render`]**: clean text (`CleanTextRenderer`)
//! - **[`outline`]**: the document outline (`OutlineExtractor`)
//! - **[`resolver`]**: the declared-name table and fuzzy target resolution
//! - **[`graph`]**: the two-pass `GraphBuilder` and the `EntityGraph` relation linker
//! - **[`properties`]**: the data model (`Entity`, `Occurrence`, `ParseResult`, ...)
//! - **[`views`]**: read-only views for front ends (display order, hierarchy, timeline)
//! - **[`config`]**: `ParserConfig`, loaded from TOML
//! - **[`offsets`]**: byte offset to UTF-16 offset conversion for browser editors
//!
//! ## Quick Start
//!
//! ```rust
//! use musetag_core::{parse, properties::EntityKind};
//!
//! let result = parse("@@Della counted it three times. @@@(comb).Object.ChildOf(@@Della)");
//!
//! assert_eq!(result.clean_text, "Della counted it three times. ");
//! let comb = result.entity("comb").unwrap();
//! assert_eq!(comb.kind, EntityKind::Object);
//! assert!(comb.has_parent("Della"));
//! ```
//!
//! ### Configuration
//!
//! ```rust
//! use musetag_core::{config::ParserConfig, MuseTagParser};
//!
//! let config = ParserConfig::from_toml_str(
//!     r#"
//! marker = "§"
//!
//! [relations]
//! RulerOf = "parent"
//! "#,
//! )?;
//! let result = MuseTagParser::new(config).parse("§§Emperor.RulerOf(§§Empire)");
//! assert!(result.entity("Empire").unwrap().has_parent("Emperor"));
//! # Ok::<(), musetag_core::MuseTagError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `bin`: the `musetag` command line tool
//! - `wasm`: browser bindings through `wasm-bindgen`

pub mod config;
pub mod error;
pub mod graph;
pub mod offsets;
pub mod outline;
pub mod parser;
pub mod properties;
pub mod render;
pub mod resolver;
pub mod syntax;
pub mod views;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::*;
pub use outline::document_outline;
pub use parser::{parse, MuseTagParser};
pub use render::clean_text;
