//! Provider response normalization
//!
//! Hosted models answer with a bare string, an object, or an
//! array of objects, with the text under varying field names.
//! The shape is decided once here so nothing downstream probes
//! fields.

use log::trace;
use serde_json::{Map, Value};

/// Fields known to carry generated text, in precedence order
const TEXT_FIELDS: &[&str] = &["generated_text", "summary_text"];

/// Closed set of response shapes
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse<'a>
{   /// null or ""
    Empty
  , Text(&'a str)
  , Object(&'a Map<String, Value>)
  , Array(&'a [Value])
  , /// Numbers and booleans
    Other(&'a Value)
}

impl<'a> ProviderResponse<'a>
{   pub fn classify(raw: &'a Value) -> Self
    {   match raw
        {   Value::Null => ProviderResponse::Empty
          , Value::String(s) if s.is_empty() => ProviderResponse::Empty
          , Value::String(s) => ProviderResponse::Text(s.as_str())
          , Value::Object(map) => ProviderResponse::Object(map)
          , Value::Array(items) => ProviderResponse::Array(items.as_slice())
          , other => ProviderResponse::Other(other)
        }
    }
}

/// Plain text of a provider response. Never fails.
pub fn normalize(raw: &Value) -> String
{   let shape = ProviderResponse::classify(raw);
    trace!("Normalizing response shape: {:?}", shape);
    match shape
    {   ProviderResponse::Empty => String::new()
      , ProviderResponse::Text(s) => s.to_string()
      , ProviderResponse::Array(items) => match items.first()
        {   None => to_json(raw)
          , Some(first) if is_blank(first) => to_json(raw)
          , Some(first) => match first
            {   Value::String(s) => s.clone()
              , Value::Object(map) => {
                  known_text_field(map)
                    .map(str::to_string)
                    .or_else(|| join_string_fields(map))
                    .unwrap_or_else(|| to_json(first))
                }
              , _ => to_json(first)
            }
        }
      , ProviderResponse::Object(map) => {
          known_text_field(map)
            .map(str::to_string)
            .unwrap_or_else(|| to_json(raw))
        }
      , ProviderResponse::Other(value) => to_json(value)
    }
}

/// Leading array elements that carry nothing: null, "", false, 0
fn is_blank(value: &Value) -> bool
{   match value
    {   Value::Null => true
      , Value::String(s) => s.is_empty()
      , Value::Bool(b) => !b
      , Value::Number(n) => n.as_f64() == Some(0.0)
      , _ => false
    }
}

/// First non-empty `generated_text` / `summary_text` value
pub fn known_text_field(map: &Map<String, Value>) -> Option<&str>
{   TEXT_FIELDS
      .iter()
      .filter_map(|field| map.get(*field).and_then(Value::as_str))
      .find(|text| !text.is_empty())
}

fn join_string_fields(map: &Map<String, Value>) -> Option<String>
{   let joined = map
      .values()
      .filter_map(Value::as_str)
      .collect::<Vec<_>>()
      .join("\n");
    if joined.is_empty() { None } else { Some(joined) }
}

fn to_json(value: &Value) -> String
{   serde_json::to_string(value)
      .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests
{   use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_and_string()
    {   assert_eq!(normalize(&Value::Null), "");
        assert_eq!(normalize(&json!("")), "");
        assert_eq!(normalize(&json!("hello")), "hello");
    }

    #[test]
    fn test_array_of_generated_text()
    {   let raw = json!([{ "generated_text": "Q: one" }]);
        assert_eq!(normalize(&raw), "Q: one");
        let raw = json!([{ "summary_text": "short" }]);
        assert_eq!(normalize(&raw), "short");
        let raw = json!(["first", "second"]);
        assert_eq!(normalize(&raw), "first");
    }

    #[test]
    fn test_array_joins_string_fields()
    {   let raw = json!([{ "label": "a", "score": 0.9, "note": "b" }]);
        assert_eq!(normalize(&raw), "a\nb");
        let raw = json!([{ "score": 0.9 }]);
        assert_eq!(normalize(&raw), r#"{"score":0.9}"#);
    }

    #[test]
    fn test_object_shapes()
    {   assert_eq!(
          normalize(&json!({ "generated_text": "x", "other": 1 })),
          "x"
        );
        let raw = json!({ "error": "loading", "estimated_time": 20 });
        assert_eq!(
          normalize(&raw),
          r#"{"error":"loading","estimated_time":20}"#
        );
    }

    #[test]
    fn test_unknown_shapes_serialize()
    {   assert_eq!(normalize(&json!([])), "[]");
        assert_eq!(normalize(&json!(42)), "42");
        assert_eq!(normalize(&json!(true)), "true");
        let raw = json!({ "b": [1, 2], "a": null });
        let text = normalize(&raw);
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_array_with_blank_head_serializes_whole_array()
    {   assert_eq!(normalize(&json!(["", "later"])), r#"["","later"]"#);
        assert_eq!(normalize(&json!([null, 1])), "[null,1]");
        assert_eq!(normalize(&json!([0])), "[0]");
        assert_eq!(normalize(&json!([false, true])), "[false,true]");
    }

    #[test]
    fn test_classify()
    {   assert_eq!(
          ProviderResponse::classify(&Value::Null),
          ProviderResponse::Empty
        );
        assert!(matches!(
          ProviderResponse::classify(&json!([1])),
          ProviderResponse::Array(_)
        ));
    }
}
