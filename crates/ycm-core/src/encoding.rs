//! Text normalization for payloads sent to the completion server.
//!
//! Editor buffers, file names and server replies arrive as a mix of text and
//! raw bytes. Everything is funneled through [`Data`] and normalized to text
//! before it is serialized, so the server always receives UTF-8 JSON.
//!
//! Bytes are decoded as UTF-8. Invalid sequences become U+FFFD rather than an
//! error, which keeps [`normalize_to_text`] total and idempotent.

use std::borrow::Cow;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::Result;

/// A non-container, non-string value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned values above `i64::MAX`.
    UInt(u64),
    Float(f64),
}

/// A structured payload. Maps keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Map(Vec<(Data, Data)>),
    Seq(Vec<Data>),
    Text(String),
    Bytes(Vec<u8>),
    Scalar(Scalar),
}

impl Data {
    pub fn null() -> Self {
        Data::Scalar(Scalar::Null)
    }

    /// True when no `Bytes` remain anywhere in the tree.
    #[cfg(test)]
    fn is_normalized(&self) -> bool {
        match self {
            Data::Bytes(_) => false,
            Data::Text(_) | Data::Scalar(_) => true,
            Data::Seq(items) => items.iter().all(Data::is_normalized),
            Data::Map(entries) => entries
                .iter()
                .all(|(k, v)| k.is_normalized() && v.is_normalized()),
        }
    }

    /// Look up a map entry by text key.
    #[cfg(test)]
    fn get(&self, key: &str) -> Option<&Data> {
        let Data::Map(entries) = self else {
            return None;
        };
        entries.iter().find_map(|(k, v)| match k {
            Data::Text(t) if t == key => Some(v),
            _ => None,
        })
    }
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Return a structurally identical copy of `data` with every byte string
/// decoded to text. Map keys and values, and sequence elements, are
/// normalized recursively. Text and scalars are copied unchanged.
pub fn normalize_to_text(data: &Data) -> Data {
    match data {
        Data::Bytes(bytes) => Data::Text(decode(bytes).into_owned()),
        Data::Text(text) => Data::Text(text.clone()),
        Data::Scalar(scalar) => Data::Scalar(scalar.clone()),
        Data::Seq(items) => Data::Seq(items.iter().map(normalize_to_text).collect()),
        Data::Map(entries) => Data::Map(
            entries
                .iter()
                .map(|(k, v)| (normalize_to_text(k), normalize_to_text(v)))
                .collect(),
        ),
    }
}

/// Single-level conversion to text: bytes are decoded, text is returned as
/// is, and anything else is rendered as its JSON text.
pub fn to_text_if_needed(data: &Data) -> String {
    match data {
        Data::Text(text) => text.clone(),
        Data::Bytes(bytes) => decode(bytes).into_owned(),
        other => other.to_string(),
    }
}

/// Normalize `data` and serialize it as compact JSON. Non-ASCII characters
/// are written literally, not as `\u` escapes.
pub fn to_utf8_json(data: &Data) -> Result<String> {
    Ok(serde_json::to_string(&normalize_to_text(data))?)
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::UInt(u) => serializer.serialize_u64(*u),
            // JSON has no NaN or infinity.
            Scalar::Float(f) if !f.is_finite() => serializer.serialize_unit(),
            Scalar::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Data::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&to_text_if_needed(k), v)?;
                }
                map.end()
            }
            Data::Seq(items) => serializer.collect_seq(items),
            Data::Text(text) => serializer.serialize_str(text),
            Data::Bytes(bytes) => serializer.serialize_str(&decode(bytes)),
            Data::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<serde_json::Value> for Data {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Data::null(),
            Value::Bool(b) => Data::Scalar(Scalar::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Data::Scalar(Scalar::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Data::Scalar(Scalar::UInt(u))
                } else {
                    Data::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => Data::Text(s),
            Value::Array(items) => Data::Seq(items.into_iter().map(Data::from).collect()),
            Value::Object(map) => Data::Map(
                map.into_iter()
                    .map(|(k, v)| (Data::Text(k), Data::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::Text(s.to_owned())
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Data::Text(s)
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Data::Bytes(bytes)
    }
}

impl From<&[u8]> for Data {
    fn from(bytes: &[u8]) -> Self {
        Data::Bytes(bytes.to_vec())
    }
}

impl From<bool> for Data {
    fn from(b: bool) -> Self {
        Data::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Data {
    fn from(i: i64) -> Self {
        Data::Scalar(Scalar::Int(i))
    }
}

impl From<u64> for Data {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Data::Scalar(Scalar::Int(i)),
            Err(_) => Data::Scalar(Scalar::UInt(u)),
        }
    }
}

impl From<f64> for Data {
    fn from(f: f64) -> Self {
        Data::Scalar(Scalar::Float(f))
    }
}

impl From<Vec<Data>> for Data {
    fn from(items: Vec<Data>) -> Self {
        Data::Seq(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: Vec<(&str, Data)>) -> Data {
        Data::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Data::from(k), v))
                .collect(),
        )
    }

    fn bytes(b: &[u8]) -> Data {
        Data::from(b)
    }

    #[test]
    fn decodes_nested_bytes_and_keeps_structure() {
        let input = map(vec![
            ("a", bytes(b"bytes")),
            ("b", Data::Seq(vec!["x".into(), bytes(b"y")])),
        ]);
        let expected = map(vec![
            ("a", "bytes".into()),
            ("b", Data::Seq(vec!["x".into(), "y".into()])),
        ]);

        let out = normalize_to_text(&input);
        assert_eq!(out, expected);
        assert!(out.is_normalized());
        assert!(!input.is_normalized());
    }

    #[test]
    fn normalization_is_idempotent() {
        let input = map(vec![
            ("a", bytes(b"bytes")),
            ("b", Data::Seq(vec!["x".into(), bytes(b"y"), 3i64.into()])),
        ]);
        let once = normalize_to_text(&input);
        let twice = normalize_to_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn byte_keys_are_decoded() {
        let input = Data::Map(vec![(bytes(b"key"), bytes(b"value"))]);
        let out = normalize_to_text(&input);
        assert_eq!(out.get("key"), Some(&Data::from("value")));
    }

    #[test]
    fn scalars_pass_through() {
        let input = Data::Seq(vec![Data::null(), true.into(), 7i64.into(), 1.5f64.into()]);
        assert_eq!(normalize_to_text(&input), input);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let out = normalize_to_text(&bytes(&[b'o', 0xff, b'k']));
        assert_eq!(out, Data::from("o\u{fffd}k"));
    }

    #[test]
    fn map_order_is_preserved() {
        let input = map(vec![("z", 1i64.into()), ("a", 2i64.into()), ("m", 3i64.into())]);
        let json = to_utf8_json(&input).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn json_keeps_non_ascii_literal() {
        let input = map(vec![("k", "café".into())]);
        let json = to_utf8_json(&input).unwrap();
        assert_eq!(json, r#"{"k":"café"}"#);
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn json_decodes_utf8_bytes() {
        let input = map(vec![("k", bytes("naïve".as_bytes()))]);
        assert_eq!(to_utf8_json(&input).unwrap(), r#"{"k":"naïve"}"#);
    }

    #[test]
    fn json_renders_non_text_keys_as_text() {
        let input = Data::Map(vec![
            (Data::from(1i64), "one".into()),
            (Data::from(true), "yes".into()),
        ]);
        assert_eq!(to_utf8_json(&input).unwrap(), r#"{"1":"one","true":"yes"}"#);
    }

    #[test]
    fn json_writes_non_finite_floats_as_null() {
        let input = Data::Seq(vec![f64::NAN.into(), f64::INFINITY.into(), 0.5f64.into()]);
        assert_eq!(to_utf8_json(&input).unwrap(), "[null,null,0.5]");
    }

    #[test]
    fn large_unsigned_numbers_stay_integers() {
        let value = serde_json::json!({ "id": u64::MAX, "small": 7u64, "neg": -3 });
        let data = Data::from(value);
        assert_eq!(data.get("id"), Some(&Data::Scalar(Scalar::UInt(u64::MAX))));
        assert_eq!(data.get("small"), Some(&Data::from(7i64)));

        let json = to_utf8_json(&data).unwrap();
        assert!(json.contains(r#""id":18446744073709551615"#), "{json}");
        assert!(json.contains(r#""neg":-3"#), "{json}");
        assert!(!json.contains("e+19"), "{json}");
    }

    #[test]
    fn from_u64_prefers_signed_when_it_fits() {
        assert_eq!(Data::from(42u64), Data::from(42i64));
        assert_eq!(Data::from(u64::MAX), Data::Scalar(Scalar::UInt(u64::MAX)));
        assert_eq!(to_text_if_needed(&Data::from(u64::MAX)), "18446744073709551615");
    }

    #[test]
    fn text_if_needed_is_single_level() {
        assert_eq!(to_text_if_needed(&"plain".into()), "plain");
        assert_eq!(to_text_if_needed(&bytes(b"raw")), "raw");
        assert_eq!(to_text_if_needed(&42i64.into()), "42");
        assert_eq!(to_text_if_needed(&Data::null()), "null");
        assert_eq!(
            to_text_if_needed(&Data::Seq(vec![bytes(b"a"), "b".into()])),
            r#"["a","b"]"#
        );
    }

    #[test]
    fn converts_from_json_value() {
        let value = serde_json::json!({
            "name": "buffer.rs",
            "line": 12,
            "ratio": 0.25,
            "tags": ["a", null, false],
        });
        let data = Data::from(value);
        assert_eq!(data.get("name"), Some(&Data::from("buffer.rs")));
        assert_eq!(data.get("line"), Some(&Data::from(12i64)));
        assert_eq!(data.get("ratio"), Some(&Data::from(0.25f64)));
        assert_eq!(
            data.get("tags"),
            Some(&Data::Seq(vec!["a".into(), Data::null(), false.into()]))
        );
        assert_eq!(data.get("missing"), None);
    }
}
