//! JSON input with number literals kept exactly as written.
//!
//! `serde_json::Number` normalizes exponents (`1.5e3` reads back as
//! `1.5e+3`), so every field value is also captured as its raw source text.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{GenError, GenResult};
use crate::types::json_kind;

/// One `"descriptor": value` pair of a document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entry {
    pub key: String,
    pub value: Value,
    /// Source text of a numeric value.
    pub literal: Option<String>,
}

pub(crate) type Document = Vec<Entry>;

/// Object entries in input order. A repeated key keeps its first position
/// and its last value, as `serde_json::Map` with `preserve_order` does.
struct RawEntries(Vec<(String, Box<RawValue>)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawEntries, A::Error> {
                let mut entries: Vec<(String, Box<RawValue>)> = Vec::new();
                while let Some((key, raw)) = map.next_entry::<String, Box<RawValue>>()? {
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = raw,
                        None => entries.push((key, raw)),
                    }
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn syntax(e: serde_json::Error) -> GenError {
    GenError::syntax(format!("input is not valid JSON: {e}"))
}

fn opens_with(raw: &RawValue, c: char) -> bool {
    raw.get().trim_start().starts_with(c)
}

fn kind_of(raw: &RawValue) -> GenResult<&'static str> {
    let value: Value = serde_json::from_str(raw.get()).map_err(syntax)?;
    Ok(json_kind(&value))
}

/// Splits the input into documents: one object or an array of objects.
pub(crate) fn parse(text: &str) -> GenResult<Vec<Document>> {
    let root: Box<RawValue> = serde_json::from_str(text).map_err(syntax)?;
    if opens_with(&root, '{') {
        return Ok(vec![document(&root)?]);
    }
    if !opens_with(&root, '[') {
        return Err(GenError::type_mismatch(format!(
            "input must be an object or an array of objects, got {}",
            kind_of(&root)?
        )));
    }

    let items: Vec<Box<RawValue>> = serde_json::from_str(root.get()).map_err(syntax)?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            if opens_with(item, '{') {
                document(item)
            } else {
                Err(GenError::type_mismatch(format!(
                    "document[{idx}] must be an object, got {}",
                    kind_of(item)?
                )))
            }
        })
        .collect()
}

fn document(raw: &RawValue) -> GenResult<Document> {
    let RawEntries(entries) = serde_json::from_str(raw.get()).map_err(syntax)?;
    entries
        .into_iter()
        .map(|(key, raw)| {
            let value: Value = serde_json::from_str(raw.get()).map_err(syntax)?;
            let literal = value.is_number().then(|| raw.get().trim().to_string());
            Ok(Entry { key, value, literal })
        })
        .collect()
}
