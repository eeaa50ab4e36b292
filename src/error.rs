use std::{fmt, io};

use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[cfg(feature = "wasm")]
use serde_wasm_bindgen::Error as WasmError;

/// Errors raised at the fallible edges of the crate.
///
/// Parsing itself never fails: malformed annotations degrade to literal text. These variants
/// cover configuration loading, file access and (de)serialization of parse results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum MuseTagError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MuseTagError {
    fn from(src: toml::de::Error) -> MuseTagError {
        MuseTagError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for MuseTagError {
    fn from(src: toml::ser::Error) -> MuseTagError {
        MuseTagError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for MuseTagError {
    fn from(src: JsonError) -> MuseTagError {
        MuseTagError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for MuseTagError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => MuseTagError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => MuseTagError::PermissionDenied,
            _ => MuseTagError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for MuseTagError {
    fn from(x: fmt::Error) -> Self {
        MuseTagError::Custom(format!("{x}"))
    }
}

impl From<RegexError> for MuseTagError {
    fn from(x: RegexError) -> Self {
        MuseTagError::Serialization(format!("Regex parse failed: {x}"))
    }
}

#[cfg(feature = "wasm")]
impl From<WasmError> for MuseTagError {
    fn from(wasm_error: WasmError) -> Self {
        MuseTagError::Serialization(format!("Serde-wasm-bindgen error: {wasm_error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_io_error_kinds_map_to_variants() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(MuseTagError::from(missing), MuseTagError::NotFound(_)));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(MuseTagError::from(denied), MuseTagError::PermissionDenied);

        let other = io::Error::new(io::ErrorKind::Interrupted, "again");
        assert!(matches!(MuseTagError::from(other), MuseTagError::Io(_)));
    }

    #[test]
    fn test_toml_error_is_serialization() {
        let err = toml::from_str::<toml::Table>("marker = ").unwrap_err();
        let converted = MuseTagError::from(err);
        assert!(matches!(converted, MuseTagError::Serialization(_)));
        assert!(converted.to_string().contains("Toml deserialization error"));
    }
}
