//! Route-specific inbound body rules, applied before anything is dispatched.
use bytes::Bytes;
use serde_json::{Map, Value, json};

use crate::core::error::GatewayError;

const MISSING_VALUE: &str = "Invalid request: provide JSON body with integer field 'value'";
const NON_INTEGER_VALUE: &str = "Invalid request: 'value' must be an integer";

/// How a route treats the inbound body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRule {
    /// Nothing is forwarded.
    Empty,
    /// Forward the caller's JSON as-is; unparseable or empty bodies become `{}`.
    PassThroughJson,
    /// Require an integer `value` field and forward exactly `{"value": n}`.
    IntegerValue,
}

impl BodyRule {
    /// Produce the upstream payload, or the 400 that short-circuits the request.
    pub fn prepare(&self, raw: &[u8]) -> Result<Option<Bytes>, GatewayError> {
        match self {
            BodyRule::Empty => Ok(None),
            BodyRule::PassThroughJson => {
                let value = match parse_lenient(raw) {
                    Value::Null => Value::Object(Map::new()),
                    other => other,
                };
                Ok(Some(encode(&value)))
            }
            BodyRule::IntegerValue => {
                let raw_value = match parse_lenient(raw) {
                    Value::Object(mut fields) => fields.remove("value"),
                    _ => None,
                }
                .ok_or_else(|| GatewayError::Validation(MISSING_VALUE.to_string()))?;

                let value = coerce_integer(&raw_value)
                    .ok_or_else(|| GatewayError::Validation(NON_INTEGER_VALUE.to_string()))?;

                Ok(Some(encode(&json!({ "value": value }))))
            }
        }
    }
}

/// Parse JSON, treating anything unparseable (including an empty body) as `null`.
fn parse_lenient(raw: &[u8]) -> Value {
    serde_json::from_slice(raw).unwrap_or(Value::Null)
}

fn encode(value: &Value) -> Bytes {
    // Serializing a `Value` cannot fail.
    Bytes::from(serde_json::to_vec(value).unwrap_or_default())
}

/// 2^63 as an `f64`; every integral float strictly inside `(-2^63, 2^63)` fits an `i64`.
const I64_FLOAT_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Accepts JSON integers, integral floats and strings holding a decimal integer.
///
/// Out-of-range integers are rejected rather than saturated: serde_json reads
/// them as `u64` or `f64`, and the float fallback excludes both bounds.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f > -I64_FLOAT_BOUND && *f < I64_FLOAT_BOUND)
                .map(|f| f as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}
