//! The MuseTag annotation grammar.
//!
//! An annotation is a marker run (`@@` main, `@@@` secondary, `@@@@` minor), a name, and a
//! chain of modifiers:
//!
//! ```text
//! @@Jim_Young.Age(32).Says[ hello]     bare name, hidden and visible arguments
//! @@(Jim, Della).Place                 hidden name, comma-grouped declaration
//! @@(1905-12-24 12:00)                 temporal declaration
//! @@.(# Chapter One)                   hidden heading, outline only
//! ```
//!
//! - [`scanner`] finds annotations in raw text ([`Scanner`], [`Annotation`]).
//! - [`modifier`] splits modifier chains and holds the reserved modifier names.
//! - [`temporal`] recognises and parses date-time literals.
//!
//! Text that does not match the grammar is literal prose. Nothing here fails.

pub mod modifier;
pub mod scanner;
pub mod temporal;

pub use modifier::{
    is_shout_case, parse_chain, Argument, Modifier, RelationTable, HIERARCHICAL_SUGAR,
    TYPE_MARKERS,
};
pub use scanner::{scan, Annotation, Head, Scanner};
pub use temporal::{is_temporal_token, parse_date_time};

/// The default marker character.
pub const DEFAULT_MARKER: char = '@';
