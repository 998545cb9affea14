//! JSON body coding shared by every request and response.
//!
//! Models carry their serde names in lower camel case; the server speaks
//! snake case. With `KeyCoding::SnakeCase` every object key of an outgoing
//! body is rewritten to snake case and every key of an incoming body is
//! rewritten back to lower camel case before the typed decode. Keys that are
//! not plain identifiers (spaces, punctuation, leading underscore) pass
//! through untouched.

use heck::{ToLowerCamelCase, ToSnakeCase};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCoding {
    /// camelCase in memory, snake_case on the wire.
    #[default]
    SnakeCase,
    /// Keys are sent and decoded exactly as serde names them.
    Verbatim,
}

impl FromStr for KeyCoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snake_case" | "snake" => Ok(KeyCoding::SnakeCase),
            "verbatim" | "none" => Ok(KeyCoding::Verbatim),
            other => Err(format!("unknown key coding `{}`", other)),
        }
    }
}

/// Serialize `body` into wire bytes.
pub fn encode_body<T: Serialize + ?Sized>(
    body: &T,
    coding: KeyCoding,
) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(body)?;
    let value = match coding {
        KeyCoding::SnakeCase => convert_keys(value, to_wire_key)?,
        KeyCoding::Verbatim => value,
    };
    serde_json::to_vec(&value)
}

/// Decode wire bytes into `R`.
pub fn decode_body<R: DeserializeOwned>(
    bytes: &[u8],
    coding: KeyCoding,
) -> Result<R, serde_json::Error> {
    match coding {
        KeyCoding::SnakeCase => {
            let value: Value = serde_json::from_slice(bytes)?;
            serde_json::from_value(convert_keys(value, from_wire_key)?)
        }
        KeyCoding::Verbatim => serde_json::from_slice(bytes),
    }
}

/// `chatTone` -> `chat_tone`
pub fn to_wire_key(key: &str) -> String {
    if is_convertible(key) {
        key.to_snake_case()
    } else {
        key.to_string()
    }
}

/// `chat_tone` -> `chatTone`
pub fn from_wire_key(key: &str) -> String {
    if is_convertible(key) {
        key.to_lower_camel_case()
    } else {
        key.to_string()
    }
}

fn is_convertible(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('_')
        && !key.ends_with('_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn convert_keys(value: Value, convert: fn(&str) -> String) -> Result<Value, serde_json::Error> {
    match value {
        Value::Object(map) => {
            let mut converted = Map::with_capacity(map.len());
            for (key, value) in map {
                let new_key = convert(&key);
                if converted.contains_key(&new_key) {
                    return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                        "keys collide after case conversion: `{}` -> `{}`",
                        key, new_key
                    )));
                }
                converted.insert(new_key, convert_keys(value, convert)?);
            }
            Ok(Value::Object(converted))
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| convert_keys(item, convert))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other),
    }
}

/// Strict RFC 3339 timestamps for `DateTime<Utc>` fields.
///
/// Use with `#[serde(with = "crate::api::codec::rfc3339")]`.
pub mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub(crate) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("invalid RFC 3339 timestamp `{}`: {}", raw, e))
    }

    /// Same format for `Option<DateTime<Utc>>`; `null` and a missing field
    /// (with `#[serde(default)]`) both decode to `None`.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw).map(Some).map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
