//! WASM bindings for musetag-core
//!
//! Exposes the parser to a browser editor. Every keystroke can re-parse the whole document;
//! the results are handed back as plain JavaScript values.
//!
//! ## Usage
//!
//! ```javascript,ignore
//! import init, { MuseTagWasm, cleanMusetag } from './musetag_core.js';
//!
//! await init();
//! const parser = new MuseTagWasm(null);
//! const result = parser.parse(editor.value);
//! preview.textContent = result.cleanText;
//! for (const [name, entity] of Object.entries(result.entities)) {
//!     console.log(name, entity.type, entity.hierarchyLevel);
//! }
//! ```
//!
//! # Serialization
//!
//! `serde_wasm_bindgen::to_value()` turns a `BTreeMap` into a JavaScript `Map`, which breaks
//! `Object.entries(result.entities)` and `result.entities[name]`. All values here go through
//! [`Serializer::json_compatible`] so maps arrive as plain objects, and dates as ISO strings.
//!
//! # Positions
//!
//! The parser works in byte offsets. JavaScript strings index UTF-16 code units, so every
//! position crossing this boundary is converted: results carry UTF-16 offsets that can be fed
//! to `setSelectionRange`, and `entitiesInContext` takes a `selectionStart` value.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::console;

use crate::{
    config::ParserConfig,
    error::MuseTagError,
    offsets::Utf16Offsets,
    parser::MuseTagParser,
    properties::ParseResult,
    render::clean_text,
    views::{entities_in_context, hierarchy_forest, timeline},
};

use serde_wasm_bindgen::Serializer;

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&MuseTagError::from(e).to_string()))
}

/// Route `tracing` output to the browser console. Call once after `init()`.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    tracing_wasm::set_as_global_default();
}

/// Parse with the default configuration. Returns `{cleanText, entities, outline}` with
/// `entities` a plain object keyed by canonical name.
#[wasm_bindgen(js_name = parseMusetag)]
pub fn parse_musetag(text: &str) -> Result<JsValue, JsValue> {
    let mut result = crate::parser::parse(text);
    let offsets = Utf16Offsets::new(text);
    result.map_positions(|p| offsets.to_utf16(p));
    to_js(&result)
}

#[wasm_bindgen(js_name = cleanMusetag)]
pub fn clean_musetag(text: &str) -> String {
    clean_text(text)
}

/// A configured parser that keeps the last result around for the view queries.
#[wasm_bindgen]
pub struct MuseTagWasm {
    parser: MuseTagParser,
    last: std::cell::RefCell<ParseResult>,
    last_offsets: std::cell::RefCell<Utf16Offsets>,
}

#[wasm_bindgen]
impl MuseTagWasm {
    /// Create a parser from an optional TOML configuration string.
    ///
    /// # JavaScript Example
    /// ```javascript,ignore
    /// const parser = new MuseTagWasm('marker = "§"');
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(config_toml: Option<String>) -> Result<MuseTagWasm, JsValue> {
        let config = match config_toml {
            Some(toml) => ParserConfig::from_toml_str(&toml).map_err(|e| {
                let msg = format!("Failed to read parser configuration: {e}");
                console::error_1(&msg.clone().into());
                JsValue::from_str(&msg)
            })?,
            None => ParserConfig::default(),
        };
        Ok(MuseTagWasm {
            parser: MuseTagParser::new(config),
            last: Default::default(),
            last_offsets: Default::default(),
        })
    }

    /// Parse `text` and remember the result for [MuseTagWasm::hierarchy],
    /// [MuseTagWasm::timeline] and [MuseTagWasm::entities_in_context].
    pub fn parse(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.parser.parse(text);
        let offsets = Utf16Offsets::new(text);
        let mut converted = result.clone();
        converted.map_positions(|p| offsets.to_utf16(p));
        let value = to_js(&converted)?;
        self.last.replace(result);
        self.last_offsets.replace(offsets);
        Ok(value)
    }

    #[wasm_bindgen(js_name = cleanText)]
    pub fn clean_text(&self, text: &str) -> String {
        self.parser.clean_text(text)
    }

    /// The relation forest of the last parse, as nested `{name, focusPosition, cycle, children}`.
    pub fn hierarchy(&self) -> Result<JsValue, JsValue> {
        let offsets = self.last_offsets.borrow();
        let mut forest = hierarchy_forest(&self.last.borrow().entities);
        for root in &mut forest {
            root.map_positions(&|p| offsets.to_utf16(p));
        }
        to_js(&forest)
    }

    /// Dated temporal entities of the last parse as `{name, date, offset}`.
    pub fn timeline(&self) -> Result<JsValue, JsValue> {
        to_js(&timeline(&self.last.borrow().entities))
    }

    /// Names of entities mentioned around the UTF-16 `position` in `text`, using the last
    /// parse.
    #[wasm_bindgen(js_name = entitiesInContext)]
    pub fn entities_in_context(&self, text: &str, position: usize) -> Result<JsValue, JsValue> {
        let names = entities_in_context(
            text,
            Utf16Offsets::new(text).to_byte(position),
            &self.last.borrow().entities,
            self.parser.config().marker,
        );
        to_js(&names)
    }
}
