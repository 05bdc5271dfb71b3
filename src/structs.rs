use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub mod app;
pub mod client;
pub mod fingerprint;
pub mod user;

/// Integer field as sent by the KeyAuth API.
/// The live service sends counts and timestamps either as JSON numbers or as
/// numeric strings; `null` and `""` read as 0.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| D::Error::custom(format!("expected unsigned integer, got {}", n))),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s.trim().parse::<u64>().map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "expected integer, got {}",
            other
        ))),
    }
}

/// String field that may come back as `null` or as a number.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected string, got {}", other))),
    }
}
