use std::collections::BTreeMap;

/// Open-schema attribute value, per spec.md §4.1 / §9's "tagged-variant
/// attribute type". Every Kubernetes unstructured field and every
/// `Logs` body/attribute value is one of these.
///
/// `Bytes` and the unsigned-integer-reinterpretation case never arise
/// from `serde_json::Value` input (JSON has no byte-string or distinct
/// integer-width types) — they exist so the type matches the spec's
/// abstract value model and are exercised directly by unit tests that
/// build `AttributeValue` trees by hand.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeValue {
    #[default]
    Null,
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Map(BTreeMap<String, AttributeValue>),
    Slice(Vec<AttributeValue>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, AttributeValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

/// Converts an arbitrary nested JSON value into the attribute tree,
/// applying spec.md §4.1's conversion table. `serde_json::Value` is the
/// concrete "open-schema nested value" this crate uses for Kubernetes
/// unstructured objects: it natively covers bool/string/nested
/// map/nested array, and represents every JSON number (the only integer
/// and float widths JSON carries) — so this conversion is total and
/// infallible.
impl From<&serde_json::Value> for AttributeValue {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::Bool(b) => AttributeValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttributeValue::Int64(i)
                } else if let Some(u) = n.as_u64() {
                    // Widen-then-signed-cast per spec.md §4.1's conversion table.
                    AttributeValue::Int64(u as i64)
                } else {
                    AttributeValue::Double(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => AttributeValue::String(s.clone()),
            serde_json::Value::Array(arr) => {
                AttributeValue::Slice(arr.iter().map(AttributeValue::from).collect())
            }
            serde_json::Value::Object(obj) => AttributeValue::Map(
                obj.iter().map(|(k, v)| (k.clone(), AttributeValue::from(v))).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(v: serde_json::Value) -> Self {
        AttributeValue::from(&v)
    }
}

/// The inverse of the conversion table above, used by the pipeline side
/// of spec.md §8's round-trip property and by JSON-rendering consumers
/// (e.g. the CLI's `--output json`). `Bytes` renders as a JSON array of
/// byte values — lossless, though round-trip equality is only claimed
/// for inputs built from JSON in the first place (JSON never produces a
/// `Bytes` value to round-trip from).
impl From<&AttributeValue> for serde_json::Value {
    fn from(v: &AttributeValue) -> Self {
        match v {
            AttributeValue::Null => serde_json::Value::Null,
            AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
            AttributeValue::Int64(i) => serde_json::Value::from(*i),
            AttributeValue::Double(d) => serde_json::json!(*d),
            AttributeValue::String(s) => serde_json::Value::String(s.clone()),
            AttributeValue::Bytes(b) => serde_json::Value::Array(b.iter().map(|byte| serde_json::Value::from(*byte)).collect()),
            AttributeValue::Map(m) => {
                serde_json::Value::Object(m.iter().map(|(k, v)| (k.clone(), serde_json::Value::from(v))).collect())
            }
            AttributeValue::Slice(items) => serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_convert_directly() {
        assert_eq!(AttributeValue::from(&json!(true)), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::from(&json!("hi")), AttributeValue::String("hi".into()));
        assert_eq!(AttributeValue::from(&json!(42)), AttributeValue::Int64(42));
        assert_eq!(AttributeValue::from(&json!(-7)), AttributeValue::Int64(-7));
        assert_eq!(AttributeValue::from(&json!(1.5)), AttributeValue::Double(1.5));
        assert_eq!(AttributeValue::from(&json!(null)), AttributeValue::Null);
    }

    #[test]
    fn large_unsigned_widens_via_signed_cast() {
        let big = u64::MAX;
        let v = json!(big);
        assert_eq!(AttributeValue::from(&v), AttributeValue::Int64(big as i64));
    }

    #[test]
    fn nested_map_and_slice_recurse_and_preserve_order() {
        let v = json!({"a": [1, 2, {"b": "c"}]});
        let converted = AttributeValue::from(&v);
        let map = converted.as_map().expect("map");
        let AttributeValue::Slice(items) = &map["a"] else { panic!("expected slice") };
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], AttributeValue::Int64(1));
        assert_eq!(items[1], AttributeValue::Int64(2));
        assert_eq!(items[2].as_map().unwrap()["b"], AttributeValue::String("c".into()));
    }

    #[test]
    fn bytes_variant_is_constructible_even_though_json_never_produces_it() {
        let v = AttributeValue::Bytes(vec![1, 2, 3]);
        assert_eq!(v, AttributeValue::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn round_trips_through_json_for_scalars_and_nested_structures() {
        let original = json!({"a": 1, "b": [true, "x", {"c": 2.5}], "d": null});
        let converted = AttributeValue::from(&original);
        let back: serde_json::Value = (&converted).into();
        assert_eq!(back, original);
    }
}
